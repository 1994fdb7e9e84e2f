//! Interactive walk-through of a guidance tree.
//!
//! - `state`: pure data types (App, Session, Screen, Action, Transition)
//! - `update`: pure transitions
//! - `view`: pure rendering
//! - `run`: effects (terminal, event loop)

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;

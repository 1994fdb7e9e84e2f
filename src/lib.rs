//! sanctuary-guide: found-animal guidance trees, their validation and
//! navigation, and sort/group strategies for the episode catalogue.

pub mod config;
pub mod digest;
pub mod episodes;
pub mod found_animal;
pub mod grouping;
pub mod load;
pub mod macros;
pub mod navigator;
pub mod report;
pub mod tree;
pub mod tui;
pub mod types;
pub mod validate;

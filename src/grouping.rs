//! Grouping and sorting of flat collections.
//!
//! A registry maps strategy keys to pure transforms. Each transform
//! either keeps the collection flat or partitions it into named groups
//! whose order follows the first item assigned to each. The input is
//! never mutated; results borrow from it.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

// ============================================================================
// GROUPS (ordered mapping)
// ============================================================================

/// One named group of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a, T> {
    /// Stable token for the group, usable in anchors.
    pub key: String,
    /// Display label.
    pub name: String,
    pub items: Vec<&'a T>,
}

/// Groups in first-seen key order.
///
/// Lookup by key goes through an index; iteration order is the order in
/// which keys were first inserted, never hash order.
#[derive(Debug, Clone, PartialEq)]
pub struct Groups<'a, T> {
    groups: Vec<Group<'a, T>>,
    index: HashMap<String, usize>,
}

impl<'a, T> Default for Groups<'a, T> {
    fn default() -> Self {
        Groups {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<'a, T> Groups<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to the group `key`, creating it at the end if new.
    ///
    /// The name is only used when the group is created.
    pub fn push(&mut self, key: &str, name: &str, item: &'a T) {
        match self.index.get(key) {
            Some(&i) => self.groups[i].items.push(item),
            None => {
                self.index.insert(key.to_string(), self.groups.len());
                self.groups.push(Group {
                    key: key.to_string(),
                    name: name.to_string(),
                    items: vec![item],
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Group<'a, T>> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group<'a, T>> {
        self.groups.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<'g, 'a, T> IntoIterator for &'g Groups<'a, T> {
    type Item = &'g Group<'a, T>;
    type IntoIter = std::slice::Iter<'g, Group<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Partition `items` in one stable pass.
///
/// `key_of` returns `(key, display name)` for an item. Groups appear in
/// the order their first item appears; items keep their input order
/// within a group.
pub fn group_by<'a, T, I, F>(items: I, mut key_of: F) -> Groups<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: FnMut(&T) -> (String, String),
{
    let mut groups = Groups::new();
    for item in items {
        let (key, name) = key_of(item);
        groups.push(&key, &name, item);
    }
    groups
}

// ============================================================================
// ARRANGEMENT
// ============================================================================

/// Output of a strategy: flat order or named groups.
#[derive(Debug, Clone, PartialEq)]
pub enum Arrangement<'a, T> {
    Flat(Vec<&'a T>),
    Grouped(Groups<'a, T>),
}

impl<'a, T> Arrangement<'a, T> {
    /// Every item, flat order or group after group.
    pub fn items(&self) -> Vec<&'a T> {
        match self {
            Arrangement::Flat(items) => items.clone(),
            Arrangement::Grouped(groups) => groups
                .iter()
                .flat_map(|g| g.items.iter().copied())
                .collect(),
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            Arrangement::Flat(items) => items.len(),
            Arrangement::Grouped(groups) => groups.iter().map(|g| g.items.len()).sum(),
        }
    }

    pub fn groups(&self) -> Option<&Groups<'a, T>> {
        match self {
            Arrangement::Flat(_) => None,
            Arrangement::Grouped(groups) => Some(groups),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Arrangement::Grouped(_))
    }
}

// ============================================================================
// STRATEGIES
// ============================================================================

/// A pure transform from the flat collection to an arrangement.
pub type SortFn<T> = for<'a> fn(&'a [T]) -> Arrangement<'a, T>;

/// A named, labelled strategy.
pub struct Strategy<T> {
    pub label: String,
    pub sort: SortFn<T>,
}

impl<T> fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("label", &self.label).finish()
    }
}

/// Strategies in registration order.
pub struct StrategyRegistry<T> {
    entries: Vec<(String, Strategy<T>)>,
}

impl<T> fmt::Debug for StrategyRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<T> Default for StrategyRegistry<T> {
    fn default() -> Self {
        StrategyRegistry {
            entries: Vec::new(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("unknown sort {key:?} (available: {})", .available.join(", "))]
    StrategyNotFound { key: String, available: Vec<String> },
}

impl<T> StrategyRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy. A repeated key replaces the earlier entry in place.
    pub fn with(mut self, key: &str, label: &str, sort: SortFn<T>) -> Self {
        let strategy = Strategy {
            label: label.to_string(),
            sort,
        };
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = strategy,
            None => self.entries.push((key.to_string(), strategy)),
        }
        self
    }

    /// # Errors
    /// `StrategyNotFound` when `key` was never registered.
    pub fn get(&self, key: &str) -> Result<&Strategy<T>, GroupingError> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s)
            .ok_or_else(|| GroupingError::StrategyNotFound {
                key: key.to_string(),
                available: self.keys().map(str::to_string).collect(),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(key, label)` pairs for a strategy picker.
    pub fn picker(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(k, s)| (k.as_str(), s.label.as_str()))
            .collect()
    }

    /// First registered key, the natural fallback.
    pub fn default_key(&self) -> Option<&str> {
        self.entries.first().map(|(k, _)| k.as_str())
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// Separator between strategy and group in an anchor token.
const ANCHOR_SEPARATOR: char = ':';

/// Active strategy plus an optional group, as shared in a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub strategy: String,
    pub group: Option<String>,
}

impl Selection {
    pub fn new(strategy: impl Into<String>) -> Self {
        Selection {
            strategy: strategy.into(),
            group: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Parse a fragment: `"broadcast"`, `"broadcast:2021"`, `"#broadcast:2021"`.
    ///
    /// Returns None for an empty fragment.
    pub fn parse(fragment: &str) -> Option<Selection> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        if fragment.is_empty() {
            return None;
        }
        let selection = match fragment.split_once(ANCHOR_SEPARATOR) {
            Some((strategy, "")) => Selection::new(strategy),
            Some((strategy, group)) => Selection::new(strategy).with_group(group),
            None => Selection::new(fragment),
        };
        if selection.strategy.is_empty() {
            None
        } else {
            Some(selection)
        }
    }

    /// The fragment that restores this selection.
    pub fn fragment(&self) -> String {
        match &self.group {
            Some(group) => anchor(&self.strategy, group),
            None => self.strategy.clone(),
        }
    }
}

/// Anchor token for a group under a strategy.
pub fn anchor(strategy: &str, group: &str) -> String {
    format!("{}{}{}", strategy, ANCHOR_SEPARATOR, group)
}

// ============================================================================
// ENGINE
// ============================================================================

/// A read-only projection of the collection under a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a, T> {
    /// The selection as resolved: an unknown group is dropped.
    pub selection: Selection,
    /// Label of the active strategy.
    pub label: String,
    pub arrangement: Arrangement<'a, T>,
}

impl<'a, T> Projection<'a, T> {
    /// `(group key, anchor)` for every group, in display order.
    pub fn anchors(&self) -> Vec<(String, String)> {
        match self.arrangement.groups() {
            None => Vec::new(),
            Some(groups) => groups
                .keys()
                .map(|k| (k.to_string(), anchor(&self.selection.strategy, k)))
                .collect(),
        }
    }

    /// The group the selection points at, if any.
    pub fn active_group(&self) -> Option<&Group<'a, T>> {
        let key = self.selection.group.as_deref()?;
        self.arrangement.groups()?.get(key)
    }
}

/// Run the selected strategy over `items`.
///
/// # Errors
/// `StrategyNotFound` when the selection names an unregistered strategy.
pub fn arrange<'a, T>(
    items: &'a [T],
    registry: &StrategyRegistry<T>,
    selection: &Selection,
) -> Result<Projection<'a, T>, GroupingError> {
    let strategy = registry.get(&selection.strategy)?;
    let arrangement = (strategy.sort)(items);

    let mut resolved = selection.clone();
    if let Some(group) = &selection.group {
        let known = arrangement.groups().is_some_and(|g| g.contains(group));
        if !known {
            warn!(
                strategy = %selection.strategy,
                group = %group,
                "linked group not found, showing whole arrangement"
            );
            resolved.group = None;
        }
    }

    debug!(
        strategy = %resolved.strategy,
        items = arrangement.item_count(),
        grouped = arrangement.is_grouped(),
        "arranged collection"
    );

    Ok(Projection {
        selection: resolved,
        label: strategy.label.clone(),
        arrangement,
    })
}

// ============================================================================
// TESTS
// ============================================================================

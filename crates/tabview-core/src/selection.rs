//! Selection-set operations backing a filter list.
//!
//! Every operation takes slices and returns a fresh `Vec`; inputs are never
//! modified. Outputs of the set operations contain no duplicates even when
//! the inputs do. Ordering comes from an insertion-ordered set, so results
//! are deterministic, but callers should treat them as sets.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;
use serde::Serialize;

/// Build a membership lookup for a collection of keys.
pub fn lookup<T: Eq + Hash + Clone>(items: &[T]) -> HashSet<T> {
    items.iter().cloned().collect()
}

fn ordered<T: Eq + Hash + Clone>(items: &[T]) -> IndexSet<T> {
    items.iter().cloned().collect()
}

/// Flip membership of `key`: remove it if present, otherwise append it.
pub fn toggle<T: Eq + Hash + Clone>(current: &[T], key: &T) -> Vec<T> {
    let mut set = ordered(current);
    if !set.shift_remove(key) {
        set.insert(key.clone());
    }
    set.into_iter().collect()
}

/// Select exactly `key` within the `allowed` universe.
///
/// Clears every selected key that belongs to `allowed`, keeps selected keys
/// outside it (they belong to other filters sharing the same selection),
/// then adds `key`.
pub fn select_only<T: Eq + Hash + Clone>(current: &[T], allowed: &[T], key: &T) -> Vec<T> {
    let allowed = lookup(allowed);
    let mut set: IndexSet<T> = current
        .iter()
        .filter(|k| !allowed.contains(*k))
        .cloned()
        .collect();
    set.insert(key.clone());
    set.into_iter().collect()
}

/// `current ∪ allowed`.
pub fn select_all<T: Eq + Hash + Clone>(current: &[T], allowed: &[T]) -> Vec<T> {
    let mut set = ordered(current);
    set.extend(allowed.iter().cloned());
    set.into_iter().collect()
}

/// `current \ allowed`.
pub fn select_none<T: Eq + Hash + Clone>(current: &[T], allowed: &[T]) -> Vec<T> {
    let allowed = lookup(allowed);
    let set: IndexSet<T> = current
        .iter()
        .filter(|k| !allowed.contains(*k))
        .cloned()
        .collect();
    set.into_iter().collect()
}

/// Stable partition: values present in `allowed` first, then the rest, each
/// group in its original relative order.
///
/// With no lookup (the whole control is disabled) the values come back as-is.
/// This is a display ordering, so duplicates in `values` are kept.
pub fn partition_by_sort_key<T: Eq + Hash + Clone>(
    values: &[T],
    allowed: Option<&HashSet<T>>,
) -> Vec<T> {
    let Some(allowed) = allowed else {
        return values.to_vec();
    };

    let (mut front, back): (Vec<T>, Vec<T>) =
        values.iter().cloned().partition(|v| allowed.contains(v));
    front.extend(back);
    front
}

/// How many of the `allowed` keys are currently selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SelectionTally {
    pub selected: usize,
    pub allowed: usize,
}

impl fmt::Display for SelectionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.selected, self.allowed)
    }
}

/// Count distinct keys of `selected ∩ allowed` against distinct `allowed`.
pub fn selection_tally<T: Eq + Hash + Clone>(selected: &[T], allowed: &[T]) -> SelectionTally {
    let allowed = lookup(allowed);
    let selected = lookup(selected);
    SelectionTally {
        selected: selected.intersection(&allowed).count(),
        allowed: allowed.len(),
    }
}

/// Everything a filter list needs to lay out its options.
#[derive(Clone, Debug)]
pub struct FilterInput<'a, T> {
    pub values: &'a [T],
    pub allowed: &'a [T],
    pub shown: &'a [T],
    pub selected: &'a [T],
    pub disabled: bool,
}

/// Display state of one option in a filter list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOption<T> {
    pub value: T,
    /// The checkbox can be clicked (and double-clicked to select only it).
    pub enabled: bool,
    pub checked: bool,
    /// Whole control disabled: every box shows the indeterminate state.
    pub indeterminate: bool,
    /// The value is in the `shown` subset.
    pub highlighted: bool,
}

/// Ordered option states for a filter list.
pub fn filter_options<T: Eq + Hash + Clone>(input: &FilterInput<'_, T>) -> Vec<FilterOption<T>> {
    let allowed = lookup(input.allowed);
    let selected = lookup(input.selected);
    let shown = lookup(input.shown);
    let disabled = input.disabled;

    let sort_key = if disabled { None } else { Some(&allowed) };

    partition_by_sort_key(input.values, sort_key)
        .into_iter()
        .map(|value| FilterOption {
            enabled: !disabled && allowed.contains(&value),
            checked: disabled || selected.contains(&value),
            indeterminate: disabled,
            highlighted: !disabled && shown.contains(&value),
            value,
        })
        .collect()
}

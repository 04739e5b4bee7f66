//! Search and filter projection of the collection.

use crate::types::{Filter, Todo};

/// Todos whose title contains `query` (ignoring case) and that pass `filter`
///
/// Lazy and in collection order. The iterator is `Clone`, so it can be
/// restarted without recomputing anything. An empty query matches every
/// title.
pub fn visible_todos<'a>(
    items: &'a [Todo],
    query: &str,
    filter: Filter,
) -> impl Iterator<Item = &'a Todo> + Clone + use<'a> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(move |todo| filter.matches(todo.completed) && matches_query(&todo.title, &needle))
}

/// Case-insensitive substring match; `needle` must already be lowercase
fn matches_query(title: &str, needle: &str) -> bool {
    needle.is_empty() || title.to_lowercase().contains(needle)
}

//! First-run seeding from the remote collection.
//!
//! When local storage holds no todos, the first ten remote items are
//! adopted. Their titles are replaced by a fixed list so the seed set reads
//! the same no matter what the remote payload says.

use crate::api::RemoteTodo;
use crate::types::Todo;
use std::collections::HashSet;

/// Number of remote items taken for the seed set
pub const SEED_SIZE: usize = 10;

/// Seed titles, indexed by `id % 10`
pub const SEED_TITLES: [&str; SEED_SIZE] = [
    "Water the plants",
    "Buy groceries",
    "Call the dentist",
    "Finish the quarterly report",
    "Go for a run",
    "Read a chapter of a book",
    "Clean the kitchen",
    "Pay the electricity bill",
    "Plan the weekend trip",
    "Reply to emails",
];

/// Whether a loaded collection must be seeded from the remote API
#[must_use]
pub fn needs_seed(items: &[Todo]) -> bool {
    items.is_empty()
}

/// The seed title for a todo id
#[must_use]
pub fn title_for(id: i64) -> &'static str {
    // rem_euclid keeps the index in 0..10 for negative ids
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = id.rem_euclid(10) as usize;
    SEED_TITLES[index]
}

/// Build the seed set from a remote payload
///
/// Takes the first [`SEED_SIZE`] items with distinct ids in payload order
/// and replaces each title with [`title_for`] its id. Later repeats of an id
/// are dropped.
#[must_use]
pub fn remap(remote: Vec<RemoteTodo>) -> Vec<Todo> {
    let mut seen = HashSet::new();
    remote
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .take(SEED_SIZE)
        .map(|item| {
            let mut todo = Todo::from(item);
            todo.title = title_for(todo.id).to_string();
            todo
        })
        .collect()
}

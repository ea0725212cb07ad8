// Per-user DSA sheet preferences: the store collaborator, debounced filter sync,
// and staged favorites.

pub mod favorites;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod testing;

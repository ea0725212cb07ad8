use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::preferences::store::PreferenceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Added,
    Removed,
}

/// A user's favorite item ids.
///
/// Toggles are staged: the mutation is applied to a copy, the store is called, and the
/// copy replaces the committed set only if the store call succeeded. A failed toggle
/// leaves the committed set exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    committed: HashSet<String>,
}

impl Favorites {
    pub fn new(initial: HashSet<String>) -> Self {
        Self { committed: initial }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.committed.contains(item_id)
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.committed
    }

    pub async fn toggle(
        &mut self,
        store: &dyn PreferenceStore,
        user_id: &str,
        item_id: &str,
    ) -> Result<ToggleAction, AppError> {
        let mut staged = self.committed.clone();
        let action = if staged.remove(item_id) {
            ToggleAction::Removed
        } else {
            staged.insert(item_id.to_string());
            ToggleAction::Added
        };

        let result = match action {
            ToggleAction::Added => store.add_favorite(user_id, item_id).await,
            ToggleAction::Removed => store.remove_favorite(user_id, item_id).await,
        };

        match result {
            Ok(()) => {
                self.committed = staged;
                info!("Favorite {item_id} {action:?} for user {user_id}");
                Ok(action)
            }
            Err(e) => {
                warn!("Favorite toggle for {item_id} failed for user {user_id}, discarding staged change: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::testing::RecordingStore;

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let store = RecordingStore::default();
        let mut favorites = Favorites::default();

        let action = favorites.toggle(&store, "u1", "arrays").await.unwrap();
        assert_eq!(action, ToggleAction::Added);
        assert!(favorites.contains("arrays"));
        assert!(store.stored_favorites("u1").contains("arrays"));

        let action = favorites.toggle(&store, "u1", "arrays").await.unwrap();
        assert_eq!(action, ToggleAction::Removed);
        assert!(!favorites.contains("arrays"));
        assert!(store.stored_favorites("u1").is_empty());
    }

    #[tokio::test]
    async fn test_double_toggle_restores_original_set() {
        let store = RecordingStore::default();
        let original: HashSet<String> = ["graphs".to_string(), "google".to_string()].into();
        let mut favorites = Favorites::new(original.clone());

        for item in ["graphs", "tcs"] {
            favorites.toggle(&store, "u1", item).await.unwrap();
            favorites.toggle(&store, "u1", item).await.unwrap();
            assert_eq!(favorites.ids(), &original);
        }
    }

    #[tokio::test]
    async fn test_failed_toggle_leaves_committed_set_unchanged() {
        let store = RecordingStore::default();
        let original: HashSet<String> = ["graphs".to_string()].into();
        let mut favorites = Favorites::new(original.clone());
        store.set_failing(true);

        assert!(favorites.toggle(&store, "u1", "arrays").await.is_err());
        assert_eq!(favorites.ids(), &original);

        assert!(favorites.toggle(&store, "u1", "graphs").await.is_err());
        assert_eq!(favorites.ids(), &original);
    }
}

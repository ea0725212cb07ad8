//! In-memory `PreferenceStore` double that records writes and can be told to fail.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::dsa::filter::Filter;
use crate::errors::AppError;
use crate::preferences::store::PreferenceStore;

#[derive(Default)]
pub struct RecordingStore {
    filters: Mutex<HashMap<String, Filter>>,
    favorites: Mutex<HashMap<String, HashSet<String>>>,
    completed: Mutex<HashMap<String, HashSet<String>>>,
    saved: Mutex<Vec<(String, Filter)>>,
    failing: AtomicBool,
}

impl RecordingStore {
    pub fn with_filter(user_id: &str, filter: Filter) -> Self {
        let store = Self::default();
        store
            .filters
            .lock()
            .unwrap()
            .insert(user_id.to_string(), filter);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every `save_filters` call, in order.
    pub fn saved(&self) -> Vec<(String, Filter)> {
        self.saved.lock().unwrap().clone()
    }

    pub fn stored_favorites(&self, user_id: &str) -> HashSet<String> {
        self.favorites
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for RecordingStore {
    async fn get_filters(&self, user_id: &str) -> Result<Option<Filter>, AppError> {
        self.check()?;
        Ok(self.filters.lock().unwrap().get(user_id).cloned())
    }

    async fn save_filters(&self, user_id: &str, filter: &Filter) -> Result<(), AppError> {
        self.check()?;
        self.saved
            .lock()
            .unwrap()
            .push((user_id.to_string(), filter.clone()));
        self.filters
            .lock()
            .unwrap()
            .insert(user_id.to_string(), filter.clone());
        Ok(())
    }

    async fn get_favorites(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        self.check()?;
        Ok(self.stored_favorites(user_id))
    }

    async fn add_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        self.check()?;
        self.favorites
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(item_id.to_string());
        Ok(())
    }

    async fn remove_favorite(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        self.check()?;
        if let Some(set) = self.favorites.lock().unwrap().get_mut(user_id) {
            set.remove(item_id);
        }
        Ok(())
    }

    async fn get_completed_problems(&self, user_id: &str) -> Result<HashSet<String>, AppError> {
        self.check()?;
        Ok(self
            .completed
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_problem_completed(
        &self,
        user_id: &str,
        problem_id: &str,
        completed: bool,
    ) -> Result<(), AppError> {
        self.check()?;
        let mut all = self.completed.lock().unwrap();
        let set = all.entry(user_id.to_string()).or_default();
        if completed {
            set.insert(problem_id.to_string());
        } else {
            set.remove(problem_id);
        }
        Ok(())
    }
}

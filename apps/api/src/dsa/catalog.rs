use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::dsa::models::Catalog;

const EMBEDDED_CATALOG: &str = include_str!("../../data/dsa_catalog.json");

impl Catalog {
    /// Loads the catalog from `path` when given, otherwise from the copy embedded at build time.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let catalog = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read DSA catalog from {path}"))?;
                Self::parse(&raw).with_context(|| format!("Invalid DSA catalog at {path}"))?
            }
            None => Self::parse(EMBEDDED_CATALOG).context("Invalid embedded DSA catalog")?,
        };

        info!(
            "DSA catalog loaded: {} topics, {} companies, {} company problems",
            catalog.topics.len(),
            catalog.companies.len(),
            catalog.problem_count()
        );
        Ok(catalog)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.check_unique_ids()?;
        Ok(catalog)
    }

    pub fn problem_count(&self) -> usize {
        self.companies.iter().map(|c| c.problems.len()).sum()
    }

    /// True if `item_id` names a topic or company that can be favorited.
    pub fn contains_item(&self, item_id: &str) -> bool {
        self.topics.iter().any(|t| t.id == item_id)
            || self.companies.iter().any(|c| c.id == item_id)
    }

    pub fn contains_problem(&self, problem_id: &str) -> bool {
        self.companies
            .iter()
            .flat_map(|c| c.problems.iter())
            .any(|p| p.id == problem_id)
    }

    // Favorites share one id space across topics and companies.
    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .topics
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.companies.iter().map(|c| c.id.as_str()))
            .chain(
                self.companies
                    .iter()
                    .flat_map(|c| c.problems.iter().map(|p| p.id.as_str())),
            );
        for id in ids {
            if !seen.insert(id) {
                bail!("duplicate catalog id '{id}'");
            }
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Where a sheet entry sits relative to the core DSA track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Inside,
    Outside,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub total_problems: u32,
    pub solved_problems: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    /// Falls back to the owning company's category when absent.
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub problems: Vec<Problem>,
}

impl Company {
    pub fn problem_category(&self, problem: &Problem) -> Category {
        problem.category.unwrap_or(self.category)
    }
}

/// Read-only reference data for the DSA sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub topics: Vec<Topic>,
    pub companies: Vec<Company>,
}

//! Filter derivation over the static DSA catalog.
//!
//! Every predicate treats an empty selection as "no constraint", so the default
//! `Filter` returns the whole catalog. Results keep catalog order.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::dsa::models::{Catalog, Category, Company, Difficulty, Problem, Topic};

/// The persisted part of a user's sheet selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub difficulty: BTreeSet<Difficulty>,
    #[serde(default)]
    pub category: BTreeSet<Category>,
    #[serde(default)]
    pub companies: BTreeSet<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.difficulty.is_empty() && self.category.is_empty() && self.companies.is_empty()
    }

    fn admits(&self, difficulty: Difficulty, category: Category) -> bool {
        (self.difficulty.is_empty() || self.difficulty.contains(&difficulty))
            && (self.category.is_empty() || self.category.contains(&category))
    }

    fn admits_company(&self, company_id: &str) -> bool {
        self.companies.is_empty() || self.companies.contains(company_id)
    }
}

/// Full selection for one session: the persisted filter plus transient view options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub favorites_only: bool,
}

impl FilterState {
    fn matches_search(&self, title: &str) -> bool {
        let needle = self.search.trim();
        needle.is_empty() || title.to_lowercase().contains(&needle.to_lowercase())
    }

    fn matches_favorites(&self, id: &str, favorites: &HashSet<String>) -> bool {
        !self.favorites_only || favorites.contains(id)
    }
}

pub fn filter_topics<'a>(
    topics: &'a [Topic],
    state: &FilterState,
    favorites: &HashSet<String>,
) -> Vec<&'a Topic> {
    topics
        .iter()
        .filter(|t| state.filter.admits(t.difficulty, t.category))
        .filter(|t| state.matches_search(&t.title))
        .filter(|t| state.matches_favorites(&t.id, favorites))
        .collect()
}

pub fn filter_companies<'a>(
    companies: &'a [Company],
    state: &FilterState,
    favorites: &HashSet<String>,
) -> Vec<&'a Company> {
    companies
        .iter()
        .filter(|c| state.filter.admits(c.difficulty, c.category))
        .filter(|c| state.filter.admits_company(&c.id))
        .filter(|c| state.matches_search(&c.title))
        .filter(|c| state.matches_favorites(&c.id, favorites))
        .collect()
}

/// Problems of `company` that pass the difficulty/category predicate.
/// The company predicate is not applied here; it already selected the company.
pub fn shown_problems<'a>(company: &'a Company, filter: &Filter) -> Vec<&'a Problem> {
    company
        .problems
        .iter()
        .filter(|p| filter.admits(p.difficulty, company.problem_category(p)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicView {
    #[serde(flatten)]
    pub topic: Topic,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProblemView {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub difficulty: Difficulty,
    pub category: Category,
    pub is_favorite: bool,
    pub total_problems: usize,
    pub problems_shown: usize,
    pub problems_completed: usize,
    pub problems: Vec<ProblemView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub topic_problems: u32,
    pub topic_problems_solved: u32,
    pub company_problems: usize,
    pub company_problems_completed: usize,
    /// 0 – 100, over everything visible in the view.
    pub percentage: u32,
}

/// Everything the DSA sheet renders for one user and selection.
#[derive(Debug, Clone, Serialize)]
pub struct DsaView {
    pub state: FilterState,
    pub topics: Vec<TopicView>,
    pub companies: Vec<CompanyView>,
    pub progress: ProgressSummary,
}

/// Derives the filtered view. `completed` overlays per-user progress on the read-only
/// catalog; a problem counts as completed if either source says so.
pub fn build_view(
    catalog: &Catalog,
    state: &FilterState,
    favorites: &HashSet<String>,
    completed: &HashSet<String>,
) -> DsaView {
    let topics: Vec<TopicView> = filter_topics(&catalog.topics, state, favorites)
        .into_iter()
        .map(|t| TopicView {
            topic: t.clone(),
            is_favorite: favorites.contains(&t.id),
        })
        .collect();

    let companies: Vec<CompanyView> = filter_companies(&catalog.companies, state, favorites)
        .into_iter()
        .map(|c| {
            let problems: Vec<ProblemView> = shown_problems(c, &state.filter)
                .into_iter()
                .map(|p| ProblemView {
                    id: p.id.clone(),
                    title: p.title.clone(),
                    difficulty: p.difficulty,
                    category: c.problem_category(p),
                    completed: p.completed || completed.contains(&p.id),
                })
                .collect();
            CompanyView {
                id: c.id.clone(),
                title: c.title.clone(),
                icon: c.icon.clone(),
                difficulty: c.difficulty,
                category: c.category,
                is_favorite: favorites.contains(&c.id),
                total_problems: c.problems.len(),
                problems_shown: problems.len(),
                problems_completed: problems.iter().filter(|p| p.completed).count(),
                problems,
            }
        })
        .collect();

    let progress = summarize(&topics, &companies);

    DsaView {
        state: state.clone(),
        topics,
        companies,
        progress,
    }
}

fn summarize(topics: &[TopicView], companies: &[CompanyView]) -> ProgressSummary {
    let topic_problems: u32 = topics.iter().map(|t| t.topic.total_problems).sum();
    let topic_problems_solved: u32 = topics
        .iter()
        .map(|t| t.topic.solved_problems.min(t.topic.total_problems))
        .sum();
    let company_problems: usize = companies.iter().map(|c| c.problems_shown).sum();
    let company_problems_completed: usize = companies.iter().map(|c| c.problems_completed).sum();

    let total = topic_problems as usize + company_problems;
    let done = topic_problems_solved as usize + company_problems_completed;
    let percentage = if total == 0 {
        0
    } else {
        ((done as f64 / total as f64) * 100.0).round() as u32
    };

    ProgressSummary {
        topic_problems,
        topic_problems_solved,
        company_problems,
        company_problems_completed,
        percentage,
    }
}

use entities::locations::{Category, Location};
use std::collections::{BTreeMap, BTreeSet};

/// The set of category tags currently shown on the map. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryFilter {
    active: BTreeSet<Category>,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            active: Category::ALL.into_iter().collect(),
        }
    }
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, category: Category) {
        if !self.active.remove(&category) {
            self.active.insert(category);
        }
    }

    pub fn is_active(&self, category: Category) -> bool {
        self.active.contains(&category)
    }

    pub fn active(&self) -> &BTreeSet<Category> {
        &self.active
    }

    pub fn show_all(&mut self) {
        *self = Self::default();
    }

    /// The visible subset, in the order it was given.
    pub fn apply(&self, locations: &[Location]) -> Vec<Location> {
        locations
            .iter()
            .filter(|location| self.is_active(location.category))
            .cloned()
            .collect()
    }

    /// Totals per tag over every location, hidden ones included.
    pub fn counts(&self, locations: &[Location]) -> BTreeMap<Category, usize> {
        locations.iter().fold(BTreeMap::new(), |mut counts, location| {
            *counts.entry(location.category).or_insert(0) += 1;
            counts
        })
    }
}

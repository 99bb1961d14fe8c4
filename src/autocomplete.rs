//! Autocomplete over the city catalog
//!
//! Filters the catalog by a live search term and tracks which suggestion is
//! highlighted for keyboard navigation. Committing turns the highlighted (or
//! best) suggestion into a concrete catalog city.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::Catalog;
use crate::models::CatalogCity;

/// Highlight movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

pub struct AutocompleteEngine {
    catalog: Arc<Catalog>,
    term: String,
    /// Indices into the catalog, in catalog order
    matches: Vec<usize>,
    /// `None` means nothing is highlighted
    highlighted: Option<usize>,
}

impl AutocompleteEngine {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            term: String::new(),
            matches: Vec::new(),
            highlighted: None,
        }
    }

    /// Replace the search term and recompute matches
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
        self.highlighted = None;

        if self.term.is_empty() {
            self.matches.clear();
            return;
        }

        let needle = self.term.to_lowercase();
        self.matches = self
            .catalog
            .cities()
            .iter()
            .enumerate()
            .filter(|(_, city)| city.name.to_lowercase().contains(&needle))
            .map(|(index, _)| index)
            .collect();

        debug!("Term {:?} matched {} cities", self.term, self.matches.len());
    }

    pub fn move_highlight(&mut self, direction: Direction) {
        let Some(last) = self.matches.len().checked_sub(1) else {
            return;
        };

        self.highlighted = Some(match (direction, self.highlighted) {
            (Direction::Down, None) => 0,
            (Direction::Down, Some(index)) => (index + 1).min(last),
            (Direction::Up, None) => 0,
            (Direction::Up, Some(index)) => index.saturating_sub(1),
        });
    }

    /// Resolve the current input to a catalog city.
    ///
    /// Order: highlighted suggestion, then first suggestion, then an exact
    /// case-insensitive name match against the whole catalog. A successful
    /// commit clears the search state.
    pub fn commit(&mut self) -> Option<CatalogCity> {
        let committed = match (self.highlighted, self.matches.first()) {
            (Some(index), _) if index < self.matches.len() => {
                self.catalog.cities().get(self.matches[index]).cloned()
            }
            (_, Some(&first)) => self.catalog.cities().get(first).cloned(),
            (_, None) => self.catalog.find_by_name_ignore_case(&self.term).cloned(),
        };

        if committed.is_some() {
            self.clear();
        }
        committed
    }

    /// Commit the suggestion at `index`, as picked with a pointer
    pub fn commit_at(&mut self, index: usize) -> Option<CatalogCity> {
        let committed = self
            .matches
            .get(index)
            .and_then(|&catalog_index| self.catalog.cities().get(catalog_index))
            .cloned();

        if committed.is_some() {
            self.clear();
        }
        committed
    }

    fn clear(&mut self) {
        self.term.clear();
        self.matches.clear();
        self.highlighted = None;
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn matches(&self) -> impl Iterator<Item = &CatalogCity> {
        self.matches
            .iter()
            .filter_map(|&index| self.catalog.cities().get(index))
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::Path;

use crate::domain::{Formula, NistId};
use crate::error::ScrapeError;

/// Formulas and direct identifiers read from a species list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesList {
    pub formulas: Vec<Formula>,
    pub ids: Vec<NistId>,
}

impl SpeciesList {
    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty() && self.ids.is_empty()
    }
}

pub fn load_species(path: &Path) -> Result<SpeciesList, ScrapeError> {
    let content =
        fs::read_to_string(path).map_err(|_| ScrapeError::SpeciesRead(path.to_path_buf()))?;
    Ok(parse_species(&content))
}

/// Lines with two or more fields contribute their second-to-last field as a
/// formula; anything else is taken whole as an identifier.
pub fn parse_species(content: &str) -> SpeciesList {
    let mut formulas = Vec::new();
    let mut ids = Vec::new();

    for line in content.lines() {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() >= 2 {
            if let Ok(formula) = fields[fields.len() - 2].parse::<Formula>() {
                formulas.push(formula);
            }
            continue;
        }
        // blank lines fail to parse and are dropped
        if let Ok(id) = line.parse::<NistId>() {
            ids.push(id);
        }
    }

    SpeciesList {
        formulas: dedup_preserving_order(formulas),
        ids: dedup_preserving_order(ids),
    }
}

pub fn dedup_preserving_order<T: Eq + Hash + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_is_second_to_last_field() {
        let list = parse_species("C6H6   1,2-Benzenediol   C6H6O2   123-45-6\n");
        assert_eq!(list.formulas.len(), 1);
        assert_eq!(list.formulas[0].as_str(), "C6H6O2");
        assert!(list.ids.is_empty());
    }

    #[test]
    fn single_token_is_identifier() {
        let list = parse_species("50-00-0\n");
        assert!(list.formulas.is_empty());
        assert_eq!(list.ids[0].as_str(), "50-00-0");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let list = parse_species("\n   \nC50000\n\n");
        assert_eq!(list.ids.len(), 1);
        assert!(list.formulas.is_empty());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let deduped = dedup_preserving_order(vec!["b", "a", "b", "c", "a"]);
        assert_eq!(deduped, vec!["b", "a", "c"]);
    }
}

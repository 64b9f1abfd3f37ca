use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::domain::{Formula, NistId};

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/cgi/cbook\.cgi\?ID=(.*?)&").expect("valid ID pattern"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Switches of the WebBook formula search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFlags {
    /// Allow elements not listed in the formula.
    pub allow_other: bool,
    /// Allow more atoms of the listed elements than specified.
    pub allow_extra: bool,
    pub match_isotopes: bool,
    pub exclude_ions: bool,
    /// Only return species that have IR spectra.
    pub require_ir: bool,
}

impl Default for SearchFlags {
    fn default() -> Self {
        Self {
            allow_other: false,
            allow_extra: false,
            match_isotopes: true,
            exclude_ions: false,
            require_ir: true,
        }
    }
}

impl SearchFlags {
    /// Flags the batch driver searches with.
    pub fn driver_defaults() -> Self {
        Self {
            allow_other: true,
            ..Self::default()
        }
    }

    pub fn query_params(&self, formula: &Formula) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("Formula", formula.as_str().to_string()),
            ("Units", "SI".to_string()),
        ];
        let switches = [
            ("AllowOther", self.allow_other),
            ("AllowExtra", self.allow_extra),
            ("MatchIso", self.match_isotopes),
            ("NoIon", self.exclude_ions),
            ("cIR", self.require_ir),
        ];
        for (name, enabled) in switches {
            if enabled {
                params.push((name, "on".to_string()));
            }
        }
        params
    }
}

/// Identifiers linked from a search result page, in document order.
/// Repeated links are kept.
pub fn extract_ids(html: &str) -> Vec<NistId> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| ID_RE.captures(href))
        .filter_map(|caps| caps.get(1))
        .filter_map(|value| value.as_str().parse::<NistId>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_params() {
        let formula: Formula = "C6H6O2".parse().unwrap();
        let params = SearchFlags::default().query_params(&formula);
        assert_eq!(
            params,
            vec![
                ("Formula", "C6H6O2".to_string()),
                ("Units", "SI".to_string()),
                ("MatchIso", "on".to_string()),
                ("cIR", "on".to_string()),
            ]
        );
    }

    #[test]
    fn driver_flags_allow_other() {
        let formula: Formula = "CH2O".parse().unwrap();
        let params = SearchFlags::driver_defaults().query_params(&formula);
        assert!(params.contains(&("AllowOther", "on".to_string())));
        assert!(!params.iter().any(|(name, _)| *name == "NoIon"));
        assert!(!params.iter().any(|(name, _)| *name == "AllowExtra"));
    }

    #[test]
    fn extracts_id_from_link() {
        let html = r#"<html><body><a href="/cgi/cbook.cgi?ID=C50000&Units=SI">Formaldehyde</a></body></html>"#;
        let ids = extract_ids(html);
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].as_str(), "C50000");
    }
}

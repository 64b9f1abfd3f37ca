use std::io::Write;

use assert_matches::assert_matches;

use nist_spectra_scraper::error::ScrapeError;
use nist_spectra_scraper::species::{load_species, parse_species};

#[test]
fn splits_formulas_and_identifiers() {
    let content = "\
C6H6   1,2-Benzenediol   C6H6O2   123-45-6
50-00-0
CH2O formaldehyde CH2O 50-00-0
C6H6   hydroquinone   C6H6O2   123-31-9
  C108952  
50-00-0
";
    let list = parse_species(content);

    let formulas = list
        .formulas
        .iter()
        .map(|formula| formula.as_str())
        .collect::<Vec<_>>();
    let ids = list.ids.iter().map(|id| id.as_str()).collect::<Vec<_>>();
    assert_eq!(formulas, vec!["C6H6O2", "CH2O"]);
    assert_eq!(ids, vec!["50-00-0", "C108952"]);
}

#[test]
fn two_fields_take_the_first() {
    let list = parse_species("CH4 74-82-8\n");
    assert_eq!(list.formulas[0].as_str(), "CH4");
    assert!(list.ids.is_empty());
}

#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "a b C2H6O c").unwrap();
    writeln!(file, "64-17-5").unwrap();

    let list = load_species(file.path()).unwrap();
    assert_eq!(list.formulas.len(), 1);
    assert_eq!(list.ids.len(), 1);
    assert!(!list.is_empty());
}

#[test]
fn missing_file_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let err = load_species(&temp.path().join("species.txt")).unwrap_err();
    assert_matches!(err, ScrapeError::SpeciesRead(_));
}

use std::sync::Mutex;

use camino::Utf8PathBuf;

use nist_spectra_scraper::app::FetchOptions;
use nist_spectra_scraper::domain::{ArtifactKind, Formula, NistId, SpectrumType};
use nist_spectra_scraper::error::ScrapeError;
use nist_spectra_scraper::fetch::{
    FetchAction, SPECTRUM_NOT_FOUND, STRUCTURE_NOT_FOUND, fetch_spectrum, fetch_structure,
};
use nist_spectra_scraper::nist::NistClient;
use nist_spectra_scraper::search::SearchFlags;
use nist_spectra_scraper::store::Store;

/// Answers every artifact request with the same body.
struct FixedBody {
    body: Vec<u8>,
    calls: Mutex<usize>,
}

impl FixedBody {
    fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl NistClient for FixedBody {
    fn search_formula(
        &self,
        _formula: &Formula,
        _flags: &SearchFlags,
    ) -> Result<Vec<NistId>, ScrapeError> {
        Ok(Vec::new())
    }

    fn fetch_structure(&self, _id: &NistId) -> Result<Vec<u8>, ScrapeError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.body.clone())
    }

    fn fetch_spectrum(
        &self,
        _id: &NistId,
        _spectrum_type: SpectrumType,
    ) -> Result<Vec<u8>, ScrapeError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.body.clone())
    }
}

fn temp_store(temp: &tempfile::TempDir) -> (Utf8PathBuf, Store) {
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let store = Store::new(root.join("mol"), root.join("jdx"));
    (root, store)
}

#[test]
fn structure_saved_with_exact_bytes() {
    let temp = tempfile::tempdir().unwrap();
    let (root, store) = temp_store(&temp);
    let body = b"C50000\n  binary\x00tail\n";
    let client = FixedBody::new(body);
    let id: NistId = "C50000".parse().unwrap();

    let outcome = fetch_structure(&client, &store, &id, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.kind, ArtifactKind::Structure);
    assert_eq!(outcome.action, FetchAction::Saved);
    assert_eq!(outcome.path, root.join("mol").join("C50000.mol"));
    assert_eq!(std::fs::read(outcome.path.as_std_path()).unwrap(), body);
}

#[test]
fn spectrum_path_carries_type() {
    let temp = tempfile::tempdir().unwrap();
    let (root, store) = temp_store(&temp);
    let client = FixedBody::new(b"##TITLE=Formaldehyde\n##END=\n");
    let id: NistId = "C50000".parse().unwrap();

    let outcome =
        fetch_spectrum(&client, &store, &id, SpectrumType::Ir, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.action, FetchAction::Saved);
    assert_eq!(outcome.path, root.join("jdx").join("C50000-IR.jdx"));
}

#[test]
fn structure_sentinel_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let (_root, store) = temp_store(&temp);
    let client = FixedBody::new(STRUCTURE_NOT_FOUND.as_bytes());
    let id: NistId = "C99999".parse().unwrap();

    let outcome = fetch_structure(&client, &store, &id, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.action, FetchAction::NotFound);
    assert!(!outcome.path.as_std_path().exists());
}

#[test]
fn spectrum_sentinel_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let (_root, store) = temp_store(&temp);
    let client = FixedBody::new(SPECTRUM_NOT_FOUND.as_bytes());
    let id: NistId = "C99999".parse().unwrap();

    let outcome =
        fetch_spectrum(&client, &store, &id, SpectrumType::Ir, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.action, FetchAction::NotFound);
    assert!(!outcome.path.as_std_path().exists());
}

#[test]
fn spectrum_sentinel_is_not_a_structure_sentinel() {
    let temp = tempfile::tempdir().unwrap();
    let (_root, store) = temp_store(&temp);
    let client = FixedBody::new(SPECTRUM_NOT_FOUND.as_bytes());
    let id: NistId = "C99999".parse().unwrap();

    let outcome = fetch_structure(&client, &store, &id, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.action, FetchAction::Saved);
}

#[test]
fn existing_file_skips_request() {
    let temp = tempfile::tempdir().unwrap();
    let (_root, store) = temp_store(&temp);
    let client = FixedBody::new(b"fresh");
    let id: NistId = "C50000".parse().unwrap();
    let path = store.spectrum_path(&id, SpectrumType::Ir);
    Store::write_bytes_atomic(&path, b"old").unwrap();

    let outcome =
        fetch_spectrum(&client, &store, &id, SpectrumType::Ir, &FetchOptions::default()).unwrap();

    assert_eq!(outcome.action, FetchAction::Present);
    assert_eq!(client.calls(), 0);
    assert_eq!(std::fs::read(path.as_std_path()).unwrap(), b"old");
}

/// Fails every artifact request with the given HTTP status.
struct StatusClient(u16);

impl NistClient for StatusClient {
    fn search_formula(
        &self,
        _formula: &Formula,
        _flags: &SearchFlags,
    ) -> Result<Vec<NistId>, ScrapeError> {
        Ok(Vec::new())
    }

    fn fetch_structure(&self, _id: &NistId) -> Result<Vec<u8>, ScrapeError> {
        Err(ScrapeError::NistStatus {
            status: self.0,
            message: "status".to_string(),
        })
    }

    fn fetch_spectrum(
        &self,
        id: &NistId,
        _spectrum_type: SpectrumType,
    ) -> Result<Vec<u8>, ScrapeError> {
        self.fetch_structure(id)
    }
}

#[test]
fn client_error_is_reported_as_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let (_, store) = temp_store(&temp);
    let id: NistId = "C50000".parse().unwrap();

    let outcome = fetch_spectrum(
        &StatusClient(404),
        &store,
        &id,
        SpectrumType::Ir,
        &FetchOptions::default(),
    )
    .unwrap();

    assert_eq!(outcome.action, FetchAction::Rejected);
    assert!(!outcome.path.as_std_path().exists());
}

#[test]
fn server_error_is_returned() {
    let temp = tempfile::tempdir().unwrap();
    let (_, store) = temp_store(&temp);
    let id: NistId = "C50000".parse().unwrap();

    let err = fetch_structure(&StatusClient(503), &store, &id, &FetchOptions::default())
        .unwrap_err();

    assert!(matches!(err, ScrapeError::NistStatus { status: 503, .. }));
    assert!(!store.structure_path(&id).as_std_path().exists());
}

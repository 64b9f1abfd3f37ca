use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::{Formula, NistId, SpectrumType};
use crate::error::ScrapeError;
use crate::search::{SearchFlags, extract_ids};
use crate::transport::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://webbook.nist.gov/cgi/cbook.cgi";

pub trait NistClient: Send + Sync {
    fn search_formula(
        &self,
        formula: &Formula,
        flags: &SearchFlags,
    ) -> Result<Vec<NistId>, ScrapeError>;
    fn fetch_structure(&self, id: &NistId) -> Result<Vec<u8>, ScrapeError>;
    fn fetch_spectrum(
        &self,
        id: &NistId,
        spectrum_type: SpectrumType,
    ) -> Result<Vec<u8>, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// `None` leaves requests without a deadline.
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// One pooled connection shared by every request of a run.
#[derive(Clone)]
pub struct NistHttpClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl NistHttpClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("nist-scrape/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ScrapeError::NistHttp(err.to_string()))?,
        );
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|err| ScrapeError::NistHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url,
            retry: settings.retry,
        })
    }

    fn get_bytes(&self, params: &[(&'static str, String)]) -> Result<Vec<u8>, ScrapeError> {
        let response = self
            .retry
            .send_with_retries(&Method::GET, || self.client.get(&self.base_url).query(params))?;
        let response = Self::handle_status(response)?;
        let bytes = response
            .bytes()
            .map_err(|err| ScrapeError::NistHttp(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn handle_status(response: Response) -> Result<Response, ScrapeError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "NIST request failed".to_string());
        Err(ScrapeError::NistStatus { status, message })
    }
}

impl NistClient for NistHttpClient {
    fn search_formula(
        &self,
        formula: &Formula,
        flags: &SearchFlags,
    ) -> Result<Vec<NistId>, ScrapeError> {
        let body = self.get_bytes(&flags.query_params(formula))?;
        Ok(extract_ids(&String::from_utf8_lossy(&body)))
    }

    fn fetch_structure(&self, id: &NistId) -> Result<Vec<u8>, ScrapeError> {
        self.get_bytes(&structure_query(id))
    }

    fn fetch_spectrum(
        &self,
        id: &NistId,
        spectrum_type: SpectrumType,
    ) -> Result<Vec<u8>, ScrapeError> {
        self.get_bytes(&spectrum_query(id, spectrum_type))
    }
}

pub fn structure_query(id: &NistId) -> Vec<(&'static str, String)> {
    vec![("Str2File", id.as_str().to_string())]
}

pub fn spectrum_query(id: &NistId, spectrum_type: SpectrumType) -> Vec<(&'static str, String)> {
    vec![
        ("JCAMP", id.as_str().to_string()),
        ("Type", spectrum_type.code().to_string()),
        ("Index", "0".to_string()),
    ]
}

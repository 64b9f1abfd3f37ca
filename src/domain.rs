use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// Substance identifier as used by the WebBook (`C50000`, `50-00-0`, ...).
///
/// The value is opaque: it is echoed into query strings and file names and
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NistId(String);

impl NistId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NistId {
    type Err = ScrapeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ScrapeError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Formula(String);

impl Formula {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Formula {
    type Err = ScrapeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(ScrapeError::InvalidFormula(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Parsed case-insensitively through `FromStr` from both the CLI and config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SpectrumType {
    #[default]
    #[serde(rename = "IR")]
    Ir,
    #[serde(rename = "TZ")]
    Tz,
    #[serde(rename = "MS")]
    Ms,
    #[serde(rename = "UVVis")]
    UvVis,
}

impl SpectrumType {
    /// Value of the `Type=` query parameter; also used in file names.
    pub fn code(&self) -> &'static str {
        match self {
            SpectrumType::Ir => "IR",
            SpectrumType::Tz => "TZ",
            SpectrumType::Ms => "MS",
            SpectrumType::UvVis => "UVVis",
        }
    }
}

impl fmt::Display for SpectrumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SpectrumType {
    type Err = ScrapeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IR" => Ok(SpectrumType::Ir),
            "TZ" => Ok(SpectrumType::Tz),
            "MS" => Ok(SpectrumType::Ms),
            "UVVIS" => Ok(SpectrumType::UvVis),
            _ => Err(ScrapeError::InvalidSpectrumType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Structure,
    Spectrum,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Structure => write!(f, "structure"),
            ArtifactKind::Spectrum => write!(f, "spectrum"),
        }
    }
}

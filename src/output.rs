use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink, ScrapeResult};
use crate::domain::NistId;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_result(result: &ScrapeResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_ids(ids: &[NistId]) -> io::Result<()> {
        Self::print_json(&ids)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Forwards progress events to the log.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_summary(result: &ScrapeResult) {
        use crate::fetch::FetchAction;

        println!(
            "searched {} formulas; saved {}, already present {}, not found {}, rejected {}, planned {}",
            result.searches.len(),
            result.count(FetchAction::Saved),
            result.count(FetchAction::Present),
            result.count(FetchAction::NotFound),
            result.count(FetchAction::Rejected),
            result.count(FetchAction::Planned),
        );
    }

    pub fn print_ids(ids: &[NistId]) {
        for id in ids {
            println!("{id}");
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "{}",
                event.message
            ),
            None => tracing::debug!("{}", event.message),
        }
    }
}

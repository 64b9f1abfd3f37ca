pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod nist;
pub mod output;
pub mod search;
pub mod species;
pub mod store;
pub mod transport;

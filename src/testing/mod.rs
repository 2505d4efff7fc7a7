//! Testing utilities and fixtures
//!
//! Mocks for the three outside services a run talks to, a local HTTP
//! stub for the API clients, and small builders for contacts and
//! configuration.

pub mod fixtures;
pub mod http;
pub mod mocks;

pub use fixtures::{test_config, test_contact, write_contacts_csv};
pub use http::StubServer;
pub use mocks::{MockEnricher, MockGenerator, MockMailSender, UnwritableSentLog};

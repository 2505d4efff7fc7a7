//! # Outreach
//!
//! Sends a batch of personalized emails to contacts who have not been
//! contacted before, and records each send in a durable CSV log.
//!
//! ## Usage
//!
//! ```bash
//! outreach [--dry-run] [--test] [--log-file FILE] [--contacts FILE]...
//! outreach report | cleanup [--days N] | init-log
//! ```
//!
//! ## Modules
//!
//! - `app` - Process setup: verbosity, logging, fatal error handling
//! - `bounce` - Bounce notification detection and mailbox cleanup
//! - `cli` - Argument structures and command handlers
//! - `compose` - Final HTML and plain-text message assembly
//! - `config` - Layered configuration from TOML, `.env`, environment and flags
//! - `contacts` - Contact loading, filtering and email normalization
//! - `enrich` - Best-effort organization descriptions from the web
//! - `error` - Error types with numeric codes
//! - `generate` - Prompt rendering, chat-completions client, output parsing
//! - `mail` - Gmail transport with token refresh and retry
//! - `runner` - The sequential batch loop
//! - `sentlog` - The append-only record of sent messages
//! - `testing` - Mocks and fixtures for tests
pub mod app;
pub mod bounce;
pub mod cli;
pub mod compose;
pub mod config;
pub mod contacts;
pub mod enrich;
pub mod error;
pub mod generate;
pub mod mail;
pub mod runner;
pub mod sentlog;

pub mod testing;

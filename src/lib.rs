//! model-config - spreadsheet-backed parameter editor with a change log
//!
//! Authenticated users read and adjust numeric parameters keyed by
//! tactic, vertical and segment. Every changed cell is appended to a change
//! log sheet with its old and new value.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `auth`: shared-password login and HMAC-signed bearer tokens
//! - `models`: table snapshots, cells, selection keys, update requests
//! - `services`: row matching, the diff/update algorithm, filters and legend
//! - `audit`: change log entries and the change log writer
//! - `storage`: the `SheetStore` boundary with local and Google Sheets stores
//! - `config`: path resolution and settings
//! - `server`: axum router and handlers
//! - `cli`: command handlers for the `model-config` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use model_config::config::{ConfigPaths, Settings};
//! use model_config::server::{build_router, AppState};
//! use model_config::storage::open_store;
//!
//! let paths = ConfigPaths::new()?;
//! let settings = Settings::load(&paths)?;
//! let store = open_store(&settings)?;
//! let app = build_router(AppState::new(settings, store));
//! ```

pub mod audit;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;

pub use error::{ModelConfigError, ModelConfigResult};

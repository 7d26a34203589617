//! Record desks for a small shop counter: a billing desk that keeps a running
//! bill and writes `bill.txt`, and a library desk that tracks book loans,
//! flags overdue ones and keeps a book catalog.
//!
//! The desks are plain structs with no terminal dependency, so tests and other
//! front-ends drive them directly. The `ui` module wraps them in a Ratatui TUI.
pub mod aggregate;
pub mod auth;
pub mod billing;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod models;
pub mod report;
pub mod search;
pub mod store;
pub mod ui;
pub mod validate;

pub use auth::{CredentialVerifier, StaticCredentials};
pub use billing::BillingDesk;
pub use config::{Cli, Config, DeskKind};
pub use error::{StoreError, StoreResult};
pub use library::{LibraryDesk, LoanInput};
pub use models::{Book, Product, UserRecord};
pub use store::{Entry, Keyed, RecordId, RecordStore, StoreEvent};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

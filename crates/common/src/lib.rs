//! Common utilities and shared types for the marketplace backend.
//!
//! This crate provides foundational components used across all marketplace crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Storage**: Uploaded document storage via [`StorageBackend`]
//!
//! # Example
//!
//! ```no_run
//! use marketplace_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("Listening on port {} with next id {}", config.server.port, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::{
    AuthConfig, ClientConfig, Config, DatabaseConfig, MailConfig, OtpBackend, OtpConfig,
    ReferralConfig, ServerConfig, UploadConfig,
};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, UploadedFile, document_key};

//! Common utilities and shared types for finboard.
//!
//! This crate provides foundational components used across all finboard crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Input rules**: nickname and free-text checks shared by services and endpoints
//!
//! # Example
//!
//! ```no_run
//! use finboard_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on port {} with id {}", config.server.port, id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod rules;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;

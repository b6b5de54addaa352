//! Common library for the reporting dashboard client
//!
//! This crate provides the durable key-value storage that client state is
//! persisted to, with file, in-memory and Redis backends, plus the shared
//! storage error type.
//!
//! ```rust,no_run
//! use common::storage::{FileStorage, KeyValueStorage};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = FileStorage::open(".dashboard-storage.json")?;
//!     storage.set_item("accessToken", "token")?;
//!     println!("Stored token: {:?}", storage.get_item("accessToken")?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod storage;

pub use error::{StorageError, StorageResult};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, load_json, save_json};

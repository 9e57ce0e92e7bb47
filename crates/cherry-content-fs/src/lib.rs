//! Filesystem-backed content store for Cherry document payloads.
//!
//! Each payload is one file named after its content identifier, directly
//! under the store root.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FilesystemContentStore;

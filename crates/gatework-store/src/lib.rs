//! # Gatework Store
//!
//! [`TokenStore`](gatework_protocols::TokenStore) implementations:
//!
//! - [`MemoryTokenStore`]: in-memory map, seedable, for tests and demos
//! - [`FileTokenStore`]: JSON map on disk, survives restarts

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

//! In-process store provider.

pub mod store;

pub use store::MemoryStore;

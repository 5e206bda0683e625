//! Store adapters: in-memory and file-per-height.

pub mod file;
pub mod memory;

pub use file::FileBlockStore;
pub use memory::MemoryBlockStore;

//! Response cache adapters

mod memory;

pub use memory::MemoryResponseCache;

//! Storage for Laozihao: read-only brand/timeline records on disk and
//! ephemeral chat sessions in memory.

pub mod records;
pub mod session;

pub use records::RecordStore;
pub use session::InMemorySessionStore;

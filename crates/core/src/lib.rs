//! # Laozihao Core
//!
//! Domain types, traits, and error definitions for the Laozihao heritage-brand
//! service. This crate has **no framework dependencies**: it defines the
//! domain model the storage, provider, agent and gateway crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! Each seam with more than one plausible implementation is a trait here
//! (`Provider`, `SessionStore`). Implementations live in their own crates,
//! which keeps test doubles trivial and the dependency graph pointing inward.

pub mod brand;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use brand::{Brand, TimelineEntry};
pub use error::{Error, ProviderError, Result, StoreError};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use session::{DEFAULT_SESSION_ID, SessionStore};

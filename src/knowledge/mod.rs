//! Knowledge index and static reference data
//!
//! Everything here is built once at startup and read-only afterwards; queries
//! share it by reference with no locking.

pub mod index;
pub mod reference;

pub use index::KnowledgeIndex;
pub use reference::{ReferenceData, TopicCategory};

//! Lexicon Module: frequency-banded candidate lookup
//!
//! # Components
//! - `index.rs`: (length, band) candidate buckets from corpus counts
//! - `descriptor.rs`: summarizing good words into one search target

pub mod descriptor;
pub mod index;

pub use descriptor::WordDescriptor;
pub use index::LexiconIndex;

// Error types only cross the CLI boundary boxed as dyn Error
#[allow(unused_imports)]
pub use index::LexiconError;

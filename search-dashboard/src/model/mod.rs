//! Domain and wire types

pub mod criteria;
pub mod dictionary;
pub mod result;
pub mod source;
pub mod wire;

pub use criteria::*;
pub use dictionary::DictionaryEntry;
pub use result::*;
pub use source::SourceDescriptor;
pub use wire::{ApiResponse, SearchPayload, SearchRequest};

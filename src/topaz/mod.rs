//! Topaz project records: data models, the read/write client, and the
//! conversion between the edit and update shapes.

pub mod client;
pub mod convert;
pub mod models;

pub use client::RecordClient;
pub use convert::convert;
pub use models::{PromoteCard, PromoteCards, RawRecord, TechnologyTag, WriteRecord};

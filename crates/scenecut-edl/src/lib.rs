//! SceneCut EDL - Edit Decision List assembly
//!
//! Turns a list of cut timecodes into numbered clip events and renders them
//! as a CMX-3600-style document or JSON.

pub mod builder;
pub mod document;
pub mod error;

pub use builder::{ClipRecord, EdlBuilder};
pub use document::EditDecisionList;
pub use error::{EdlError, EdlResult};

//! webxml library crate: the descriptor model, the deterministic merge
//! engine, and descriptor document reading and writing.
//!
//! The `webxml` binary is a thin CLI over these modules; integration tests
//! exercise them directly.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod merge;
pub mod version;
pub mod xml;

pub use descriptor::{ServletDef, ServletTarget, WebXml};
pub use error::DescriptorError;
pub use merge::{FragmentId, FragmentSet, MergeReport};
pub use version::SpecVersion;

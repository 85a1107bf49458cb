//! Descriptor documents: per-version grammars, a validating reader and the
//! canonical writer ([`WebXml::to_document`](crate::descriptor::WebXml::to_document)).

mod grammar;
mod read;
mod report;
mod write;

pub use grammar::{DocumentKind, Grammar};
pub use read::read_document;
pub use report::{Diagnostic, ValidationReport};

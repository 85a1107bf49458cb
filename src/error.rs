//! Error types for descriptor operations.
//!
//! Defines [`DescriptorError`], the error returned by model mutation, merge
//! and document reading. Soft merge conflicts are *not* errors: they are
//! reported through [`crate::merge::MergeReport`]. Only the hard-failure
//! channel (invalid configuration) and malformed input surface here.
//!
//! Messages are written for the person fixing the descriptor: each variant
//! names the offending key and what to change.

use std::fmt;

use crate::merge::{ConflictRecord, Field};

// ---------------------------------------------------------------------------
// DescriptorError
// ---------------------------------------------------------------------------

/// Unified error type for descriptor operations.
#[derive(Debug)]
pub enum DescriptorError {
    /// A key in a uniqueness-constrained field was bound twice, to different
    /// values, within a single descriptor.
    DuplicateBinding {
        /// The field the binding belongs to.
        field: Field,
        /// The contested key (URL pattern, servlet name, ...).
        key: String,
        /// The value already bound.
        existing: String,
        /// The value the caller tried to bind.
        requested: String,
    },

    /// Two or more fragments bound the same key of a uniqueness-constrained
    /// field to different values, and the main descriptor does not declare
    /// the key itself.
    FragmentConflict {
        /// The field being merged.
        field: Field,
        /// Every contested key, sorted by key.
        conflicts: Vec<ConflictRecord>,
    },

    /// The document is not well-formed XML.
    Xml(quick_xml::Error),

    /// The document is well-formed but cannot be turned into an element
    /// tree (no root, unclosed elements, trailing content).
    Malformed {
        /// 1-based line where the problem was detected.
        line: usize,
        /// Human-readable description.
        detail: String,
    },
}

impl DescriptorError {
    /// Returns `true` for the hard-failure configuration errors
    /// ([`Self::DuplicateBinding`] and [`Self::FragmentConflict`]).
    #[must_use]
    pub const fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateBinding { .. } | Self::FragmentConflict { .. }
        )
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateBinding {
                field,
                key,
                existing,
                requested,
            } => {
                write!(
                    f,
                    "invalid configuration: {field} key '{key}' is already bound to '{existing}', cannot also bind it to '{requested}'.\n  To fix: declare '{key}' only once in this descriptor."
                )
            }
            Self::FragmentConflict { field, conflicts } => {
                write!(
                    f,
                    "invalid configuration: fragments disagree on {} {field} key(s):",
                    conflicts.len()
                )?;
                for conflict in conflicts {
                    write!(f, "\n  - {conflict}")?;
                }
                write!(
                    f,
                    "\n  To fix: declare the contested key(s) in the main descriptor, or remove them from all but one fragment."
                )
            }
            Self::Xml(e) => write!(f, "malformed descriptor: {e}"),
            Self::Malformed { line, detail } => {
                write!(f, "malformed descriptor at line {line}: {detail}")
            }
        }
    }
}

impl std::error::Error for DescriptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Xml(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

impl From<quick_xml::Error> for DescriptorError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{ConflictSide, FragmentId};

    #[test]
    fn duplicate_binding_message_names_both_values() {
        let err = DescriptorError::DuplicateBinding {
            field: Field::ServletMappings,
            key: "/foo".to_owned(),
            existing: "a".to_owned(),
            requested: "b".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("servlet mappings"));
        assert!(msg.contains("'/foo'"));
        assert!(msg.contains("'a'") && msg.contains("'b'"));
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn fragment_conflict_lists_every_key() {
        let record = |key: &str| ConflictRecord {
            field: Field::ServletMappings,
            key: key.to_owned(),
            sides: vec![
                ConflictSide {
                    fragment: FragmentId::from_raw(0),
                    name: None,
                    value: "a".to_owned(),
                },
                ConflictSide {
                    fragment: FragmentId::from_raw(1),
                    name: Some("lib".to_owned()),
                    value: "b".to_owned(),
                },
            ],
        };
        let err = DescriptorError::FragmentConflict {
            field: Field::ServletMappings,
            conflicts: vec![record("/a"), record("/b")],
        };
        let msg = err.to_string();
        assert!(msg.contains("2 servlet mappings"));
        assert!(msg.contains("'/a'") && msg.contains("'/b'"));
        assert!(msg.contains("lib"));
    }

    #[test]
    fn malformed_is_not_a_configuration_error() {
        let err = DescriptorError::Malformed {
            line: 3,
            detail: "unclosed element <web-app>".to_owned(),
        };
        assert!(!err.is_invalid_configuration());
        assert!(err.to_string().contains("line 3"));
    }
}

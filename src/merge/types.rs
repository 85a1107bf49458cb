//! Shared types for the descriptor merge: fields, authority tiers, conflict
//! records and the merge report.

use std::fmt;

use serde::Serialize;

use super::fragments::FragmentId;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A mergeable descriptor field.
///
/// Every field is merged by one of two [`MergePolicy`] strategies; the
/// mapping is fixed by [`Field::policy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    /// Servlet definitions, keyed by servlet name.
    Servlets,
    /// Servlet mappings, keyed by URL pattern.
    ServletMappings,
    /// Context parameters, keyed by parameter name.
    ContextParams,
    /// MIME mappings, keyed by file extension.
    MimeMappings,
    /// Locale encoding mappings, keyed by locale.
    LocaleEncodingMappings,
    /// Post-construct lifecycle callbacks, keyed by class name.
    PostConstructMethods,
    /// Pre-destroy lifecycle callbacks, keyed by class name.
    PreDestroyMethods,
}

impl Field {
    /// Every mergeable field, in merge order.
    pub const ALL: [Self; 7] = [
        Self::Servlets,
        Self::ServletMappings,
        Self::ContextParams,
        Self::MimeMappings,
        Self::LocaleEncodingMappings,
        Self::PostConstructMethods,
        Self::PreDestroyMethods,
    ];

    /// The merge strategy for this field.
    #[must_use]
    pub const fn policy(self) -> MergePolicy {
        match self {
            Self::Servlets | Self::ServletMappings => MergePolicy::OverrideHard,
            Self::ContextParams
            | Self::MimeMappings
            | Self::LocaleEncodingMappings
            | Self::PostConstructMethods
            | Self::PreDestroyMethods => MergePolicy::OverrideSoft,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Servlets => "servlets",
            Self::ServletMappings => "servlet mappings",
            Self::ContextParams => "context params",
            Self::MimeMappings => "mime mappings",
            Self::LocaleEncodingMappings => "locale encoding mappings",
            Self::PostConstructMethods => "post-construct methods",
            Self::PreDestroyMethods => "pre-destroy methods",
        })
    }
}

/// The two merge strategies shared by all keyed fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// A non-empty main map wins wholesale; otherwise fragment contributions
    /// are unioned and disagreeing keys are dropped (soft conflict).
    OverrideSoft,
    /// Main wins per key; fragment disagreement on any other key aborts the
    /// merge (hard failure).
    OverrideHard,
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Authority of a fragment's contributions.
///
/// When a key is contributed from both tiers only the higher tier is
/// considered, so regular fragments override an overridable baseline without
/// conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// A baseline fragment marked `overridable` (e.g. container defaults).
    Overridable,
    /// A regular fragment.
    Declared,
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// One fragment's value for a contested key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConflictSide {
    /// The contributing fragment.
    pub fragment: FragmentId,
    /// The fragment's declared name, if it has one.
    pub name: Option<String>,
    /// Rendered value.
    pub value: String,
}

impl fmt::Display for ConflictSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name}) = '{}'", self.fragment, self.value),
            None => write!(f, "{} = '{}'", self.fragment, self.value),
        }
    }
}

/// A key that fragments disagree on.
///
/// `sides` are sorted by value, then fragment, so two records for the same
/// disagreement compare equal regardless of the order fragments were
/// supplied in (modulo fragment ids).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    /// The field being merged.
    pub field: Field,
    /// The contested key.
    pub key: String,
    /// Every contribution from the winning tier.
    pub sides: Vec<ConflictSide>,
}

impl ConflictRecord {
    /// The distinct contested values, sorted.
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        let mut values: Vec<&str> = self.sides.iter().map(|s| s.value.as_str()).collect();
        values.dedup();
        values
    }
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': ", self.field, self.key)?;
        for (i, side) in self.sides.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{side}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MergeReport
// ---------------------------------------------------------------------------

/// Outcome of a merge that did not hard-fail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Soft conflicts, in field order then key order. Each listed key was
    /// left out of the merged model.
    pub conflicts: Vec<ConflictRecord>,
}

impl MergeReport {
    /// Returns `true` if no soft conflict was detected.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts recorded for one field.
    pub fn conflicts_for(&self, field: Field) -> impl Iterator<Item = &ConflictRecord> {
        self.conflicts.iter().filter(move |c| c.field == field)
    }
}

//! The unordered set of fragment descriptors fed to a merge.
//!
//! Fragments have no meaningful order: two fragment sets with the same
//! members must merge identically no matter how they were built. Each
//! fragment is keyed by an opaque [`FragmentId`] handed out on insertion;
//! the id gives fragments identity (two equal descriptors are still two
//! fragments) and is used only for diagnostics.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::descriptor::WebXml;

use super::types::Tier;

// ---------------------------------------------------------------------------
// FragmentId
// ---------------------------------------------------------------------------

/// Opaque identity token of a fragment within a [`FragmentSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FragmentId(u64);

impl FragmentId {
    /// Build an id from its raw value. Only meaningful for diagnostics and
    /// tests; ids are normally obtained from [`FragmentSet::insert`].
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fragment#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FragmentSet
// ---------------------------------------------------------------------------

/// An unordered collection of fragment descriptors.
///
/// Merge results never depend on iteration order; [`FragmentSet::iter`]
/// yields fragments in id order only so that logs are stable.
#[derive(Clone, Debug, Default)]
pub struct FragmentSet {
    next_id: u64,
    fragments: BTreeMap<FragmentId, WebXml>,
}

impl FragmentSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment, returning its identity token.
    pub fn insert(&mut self, fragment: WebXml) -> FragmentId {
        let id = FragmentId(self.next_id);
        self.next_id += 1;
        self.fragments.insert(id, fragment);
        id
    }

    /// Remove a fragment by id.
    pub fn remove(&mut self, id: FragmentId) -> Option<WebXml> {
        self.fragments.remove(&id)
    }

    /// Look up a fragment by id.
    #[must_use]
    pub fn get(&self, id: FragmentId) -> Option<&WebXml> {
        self.fragments.get(&id)
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if the set holds no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Iterate over `(id, fragment)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (FragmentId, &WebXml)> {
        self.fragments.iter().map(|(id, f)| (*id, f))
    }

    /// Collect one keyed field from every fragment, tagged with the
    /// fragment's id, name and authority tier.
    pub(crate) fn sources<'a, V>(
        &'a self,
        field: impl Fn(&'a WebXml) -> &'a BTreeMap<String, V>,
    ) -> Vec<Source<'a, V>> {
        self.fragments
            .iter()
            .map(|(id, fragment)| Source {
                id: *id,
                name: fragment.name(),
                tier: if fragment.is_overridable() {
                    Tier::Overridable
                } else {
                    Tier::Declared
                },
                entries: field(fragment),
            })
            .collect()
    }
}

impl FromIterator<WebXml> for FragmentSet {
    fn from_iter<I: IntoIterator<Item = WebXml>>(iter: I) -> Self {
        let mut set = Self::new();
        for fragment in iter {
            set.insert(fragment);
        }
        set
    }
}

/// One fragment's contribution to a single keyed field.
#[derive(Debug)]
pub(crate) struct Source<'a, V> {
    pub id: FragmentId,
    pub name: Option<&'a str>,
    pub tier: Tier,
    pub entries: &'a BTreeMap<String, V>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The two keyed-field merge strategies.
//!
//! Both strategies first build an index from key to every fragment
//! contribution for that key (a [`BTreeMap`], so keys are visited in
//! lexicographic order), then decide each key from the complete set of
//! contributions. No decision is taken while fragments are still being
//! visited, so the outcome cannot depend on fragment order.
//!
//! Per key, only contributions from the highest [`Tier`] present are
//! considered. If they all agree the value is adopted; otherwise the key is
//! contested and the strategy decides what a contest means:
//!
//! - [`override_soft`]: drop the key, record a [`ConflictRecord`], continue.
//! - [`override_hard`]: collect every contested key and fail the merge.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, error, warn};

use crate::error::DescriptorError;

use super::fragments::{FragmentId, Source};
use super::types::{ConflictRecord, ConflictSide, Field, Tier};

/// Result of a soft-conflict field merge.
#[derive(Debug)]
pub(crate) struct SoftMerge<V> {
    pub values: BTreeMap<String, V>,
    pub conflicts: Vec<ConflictRecord>,
}

struct Candidate<'a, V> {
    tier: Tier,
    id: FragmentId,
    name: Option<&'a str>,
    value: &'a V,
}

enum Decision<'a, V> {
    Agreed(&'a V),
    Contested(ConflictRecord),
}

/// Override-wins merge with soft conflicts.
///
/// A non-empty `main` is returned unchanged and every fragment contribution
/// is discarded. Otherwise fragment contributions are unioned; keys the
/// winning tier disagrees on are excluded and reported.
pub(crate) fn override_soft<V>(
    field: Field,
    main: &BTreeMap<String, V>,
    sources: &[Source<'_, V>],
) -> SoftMerge<V>
where
    V: Clone + Eq + fmt::Display,
{
    if !main.is_empty() {
        let discarded: usize = sources.iter().map(|s| s.entries.len()).sum();
        if discarded > 0 {
            debug!(%field, discarded, "main descriptor declares field; fragment entries ignored");
        }
        return SoftMerge {
            values: main.clone(),
            conflicts: Vec::new(),
        };
    }

    let mut values = BTreeMap::new();
    let mut conflicts = Vec::new();
    for (key, candidates) in index(sources, |_| false) {
        match decide(field, key, candidates) {
            Decision::Agreed(value) => {
                values.insert(key.to_owned(), value.clone());
            }
            Decision::Contested(record) => {
                warn!(%field, key, conflict = %record, "fragments disagree; key dropped");
                conflicts.push(record);
            }
        }
    }
    SoftMerge { values, conflicts }
}

/// Override-wins merge with hard conflicts.
///
/// Keys present in `main` keep the main value and fragment contributions for
/// them are never inspected. Any other key the winning tier disagrees on
/// fails the merge with [`DescriptorError::FragmentConflict`] listing every
/// contested key.
pub(crate) fn override_hard<V>(
    field: Field,
    main: &BTreeMap<String, V>,
    sources: &[Source<'_, V>],
) -> Result<BTreeMap<String, V>, DescriptorError>
where
    V: Clone + Eq + fmt::Display,
{
    let mut values = main.clone();
    let mut conflicts = Vec::new();
    for (key, candidates) in index(sources, |key| main.contains_key(key)) {
        match decide(field, key, candidates) {
            Decision::Agreed(value) => {
                values.insert(key.to_owned(), value.clone());
            }
            Decision::Contested(record) => conflicts.push(record),
        }
    }

    if conflicts.is_empty() {
        Ok(values)
    } else {
        error!(%field, contested = conflicts.len(), "fragments disagree on uniquely-bound keys");
        Err(DescriptorError::FragmentConflict { field, conflicts })
    }
}

/// Build the key → contributions index, skipping keys `owned` reports true
/// for.
fn index<'a, V>(
    sources: &[Source<'a, V>],
    owned: impl Fn(&str) -> bool,
) -> BTreeMap<&'a str, Vec<Candidate<'a, V>>> {
    let mut index: BTreeMap<&'a str, Vec<Candidate<'a, V>>> = BTreeMap::new();
    for source in sources {
        for (key, value) in source.entries {
            if owned(key.as_str()) {
                continue;
            }
            index.entry(key.as_str()).or_default().push(Candidate {
                tier: source.tier,
                id: source.id,
                name: source.name,
                value,
            });
        }
    }
    index
}

fn decide<'a, V>(field: Field, key: &str, candidates: Vec<Candidate<'a, V>>) -> Decision<'a, V>
where
    V: Eq + fmt::Display,
{
    let top = candidates
        .iter()
        .map(|c| c.tier)
        .max()
        .unwrap_or(Tier::Declared);
    let winners: Vec<Candidate<'a, V>> = candidates.into_iter().filter(|c| c.tier == top).collect();

    let Some((first, rest)) = winners.split_first() else {
        // The index never holds an empty candidate list.
        return Decision::Contested(ConflictRecord {
            field,
            key: key.to_owned(),
            sides: Vec::new(),
        });
    };
    if rest.iter().all(|c| c.value == first.value) {
        return Decision::Agreed(first.value);
    }

    let mut sides: Vec<ConflictSide> = winners
        .iter()
        .map(|c| ConflictSide {
            fragment: c.id,
            name: c.name.map(str::to_owned),
            value: c.value.to_string(),
        })
        .collect();
    sides.sort_by(|a, b| a.value.cmp(&b.value).then(a.fragment.cmp(&b.fragment)));
    Decision::Contested(ConflictRecord {
        field,
        key: key.to_owned(),
        sides,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Deterministic descriptor merge.
//!
//! Merges a main [`WebXml`] with an unordered [`FragmentSet`] into the
//! effective configuration. Every keyed field follows one of two strategies
//! (see [`MergePolicy`]):
//!
//! - **override-soft** (scalar maps): a non-empty main field wins wholesale;
//!   otherwise fragment entries are unioned and keys fragments disagree on
//!   are dropped and reported in the [`MergeReport`].
//! - **override-hard** (uniqueness-constrained mappings): main wins per key;
//!   fragment disagreement on any other key aborts the merge with
//!   [`DescriptorError::FragmentConflict`].
//!
//! # Determinism guarantee
//!
//! The same main descriptor and the same fragment members always produce the
//! same merged model, regardless of the order fragments were inserted:
//!
//! - Keys are processed in lexicographic order.
//! - Each key is decided from the complete set of contributions.
//! - Welcome files contributed by fragments are appended in sorted order.
//!
//! # Atomicity
//!
//! Field results are computed into a staged copy and committed only when no
//! hard failure occurred, so a failed merge leaves the main model untouched.

mod fragments;
mod strategy;
mod types;


pub use fragments::{FragmentId, FragmentSet};
pub use types::{ConflictRecord, ConflictSide, Field, MergePolicy, MergeReport, Tier};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::{debug, info};

use crate::descriptor::WebXml;
use crate::error::DescriptorError;

use fragments::Source;
use strategy::{SoftMerge, override_hard, override_soft};

impl WebXml {
    /// Merge `fragments` into this descriptor.
    ///
    /// Returns `Ok(true)` if every field merged cleanly and `Ok(false)` if
    /// at least one soft conflict dropped a key.
    ///
    /// # Errors
    /// Returns [`DescriptorError::FragmentConflict`] if fragments disagree on
    /// a uniqueness-constrained key the main descriptor does not declare.
    /// The model is left unchanged in that case.
    pub fn merge(&mut self, fragments: &FragmentSet) -> Result<bool, DescriptorError> {
        self.merge_with_report(fragments).map(|report| report.is_clean())
    }

    /// Merge `fragments` into this descriptor, returning every soft conflict.
    ///
    /// # Errors
    /// See [`WebXml::merge`].
    pub fn merge_with_report(
        &mut self,
        fragments: &FragmentSet,
    ) -> Result<MergeReport, DescriptorError> {
        let _span = tracing::info_span!("merge", fragments = fragments.len()).entered();

        let mut staged = self.clone();
        let mut report = MergeReport::default();

        // Hard-conflict fields first: any failure aborts before staging is
        // committed.
        staged.servlets = merge_field(
            &mut report,
            Field::Servlets,
            &self.servlets,
            &fragments.sources(|f| &f.servlets),
        )?;
        staged.servlet_mappings = merge_field(
            &mut report,
            Field::ServletMappings,
            &self.servlet_mappings,
            &fragments.sources(|f| &f.servlet_mappings),
        )?;
        staged.context_params = merge_field(
            &mut report,
            Field::ContextParams,
            &self.context_params,
            &fragments.sources(|f| &f.context_params),
        )?;
        staged.mime_mappings = merge_field(
            &mut report,
            Field::MimeMappings,
            &self.mime_mappings,
            &fragments.sources(|f| &f.mime_mappings),
        )?;
        staged.locale_encoding_mappings = merge_field(
            &mut report,
            Field::LocaleEncodingMappings,
            &self.locale_encoding_mappings,
            &fragments.sources(|f| &f.locale_encoding_mappings),
        )?;
        staged.post_construct_methods = merge_field(
            &mut report,
            Field::PostConstructMethods,
            &self.post_construct_methods,
            &fragments.sources(|f| &f.post_construct_methods),
        )?;
        staged.pre_destroy_methods = merge_field(
            &mut report,
            Field::PreDestroyMethods,
            &self.pre_destroy_methods,
            &fragments.sources(|f| &f.pre_destroy_methods),
        )?;

        staged.distributable =
            self.distributable && fragments.iter().all(|(_, f)| f.is_distributable());

        merge_welcome_files(&mut staged, self.welcome_files.is_empty(), fragments);

        *self = staged;
        info!(conflicts = report.conflicts.len(), "merge complete");
        Ok(report)
    }
}

/// Merge one keyed field with the strategy [`Field::policy`] assigns it.
/// Soft conflicts are appended to `report`.
fn merge_field<V>(
    report: &mut MergeReport,
    field: Field,
    main: &BTreeMap<String, V>,
    sources: &[Source<'_, V>],
) -> Result<BTreeMap<String, V>, DescriptorError>
where
    V: Clone + Eq + fmt::Display,
{
    match field.policy() {
        MergePolicy::OverrideHard => override_hard(field, main, sources),
        MergePolicy::OverrideSoft => {
            let SoftMerge { values, conflicts } = override_soft(field, main, sources);
            report.conflicts.extend(conflicts);
            Ok(values)
        }
    }
}

/// Append fragment welcome files to `staged`.
///
/// A fragment contributes when it is flagged `always_add_welcome_files` or
/// when the main descriptor declared none. If main declared none and every
/// contributing fragment asks for replacement, the merged list stays
/// replaceable by the next welcome file added.
fn merge_welcome_files(staged: &mut WebXml, main_empty: bool, fragments: &FragmentSet) {
    let contributors: Vec<&WebXml> = fragments
        .iter()
        .map(|(_, f)| f)
        .filter(|f| !f.welcome_files.is_empty())
        .filter(|f| f.always_add_welcome_files || main_empty)
        .collect();

    let additions: BTreeSet<&str> = contributors
        .iter()
        .flat_map(|f| f.welcome_files.iter().map(String::as_str))
        .collect();
    if additions.is_empty() {
        return;
    }
    debug!(count = additions.len(), "adding fragment welcome files");
    for file in additions {
        staged.add_welcome_file(file);
    }

    if main_empty && contributors.iter().all(|f| f.replace_welcome_files) {
        staged.replace_welcome_files = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

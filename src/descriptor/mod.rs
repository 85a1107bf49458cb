//! The in-memory web application descriptor.
//!
//! [`WebXml`] holds one descriptor's declarations: its specification
//! version, boolean flags, keyed scalar maps (merged with the soft-conflict
//! strategy) and uniqueness-constrained mappings (merged with the
//! hard-conflict strategy). The merge itself lives in [`crate::merge`];
//! serialization lives in [`crate::xml`].
//!
//! A model is created empty, populated through the mutators below (directly
//! or by [`crate::xml::read_document`]), optionally merged against a
//! [`crate::merge::FragmentSet`], then inspected or serialized.

mod servlet;

pub use servlet::{ServletDef, ServletTarget};

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use tracing::{debug, warn};

use crate::error::DescriptorError;
use crate::merge::Field;
use crate::version::SpecVersion;

// ---------------------------------------------------------------------------
// WebXml
// ---------------------------------------------------------------------------

/// A web application (or web fragment) descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebXml {
    pub(crate) version: SpecVersion,
    pub(crate) public_id: Option<String>,
    pub(crate) name: Option<String>,

    pub(crate) overridable: bool,
    pub(crate) distributable: bool,
    pub(crate) always_add_welcome_files: bool,
    pub(crate) replace_welcome_files: bool,

    pub(crate) context_params: BTreeMap<String, String>,
    pub(crate) mime_mappings: BTreeMap<String, String>,
    pub(crate) locale_encoding_mappings: BTreeMap<String, String>,
    pub(crate) post_construct_methods: BTreeMap<String, String>,
    pub(crate) pre_destroy_methods: BTreeMap<String, String>,

    pub(crate) servlets: BTreeMap<String, ServletDef>,
    pub(crate) servlet_mappings: BTreeMap<String, String>,

    pub(crate) welcome_files: Vec<String>,
}

impl Default for WebXml {
    fn default() -> Self {
        Self {
            version: SpecVersion::default(),
            public_id: None,
            name: None,
            overridable: false,
            distributable: false,
            always_add_welcome_files: true,
            replace_welcome_files: false,
            context_params: BTreeMap::new(),
            mime_mappings: BTreeMap::new(),
            locale_encoding_mappings: BTreeMap::new(),
            post_construct_methods: BTreeMap::new(),
            pre_destroy_methods: BTreeMap::new(),
            servlets: BTreeMap::new(),
            servlet_mappings: BTreeMap::new(),
            welcome_files: Vec::new(),
        }
    }
}

impl WebXml {
    /// Create an empty descriptor with default settings (version 3.1).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- version ------------------------------------------------------------

    /// Set the version from an explicit version string.
    ///
    /// Unrecognized or absent input leaves the current version unchanged.
    pub fn set_version(&mut self, version: Option<&str>) {
        let Some(raw) = version else {
            return;
        };
        match SpecVersion::from_version_str(raw) {
            Some(v) => self.set_spec_version(v),
            None => warn!(version = raw, "unrecognized descriptor version ignored"),
        }
    }

    /// Set the version directly.
    ///
    /// A legacy public identifier that no longer matches the version is
    /// cleared.
    pub fn set_spec_version(&mut self, version: SpecVersion) {
        if self
            .public_id
            .as_deref()
            .and_then(SpecVersion::from_public_id)
            .is_some_and(|v| v != version)
        {
            self.public_id = None;
        }
        self.version = version;
    }

    /// Set the legacy DTD public identifier.
    ///
    /// Recognized identifiers also set the version (2.2 or 2.3).
    /// Unrecognized identifiers are ignored.
    pub fn set_public_id(&mut self, public_id: &str) {
        match SpecVersion::from_public_id(public_id) {
            Some(v) => {
                self.version = v;
                self.public_id = Some(public_id.to_owned());
            }
            None => warn!(public_id, "unrecognized public identifier ignored"),
        }
    }

    #[must_use]
    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }

    #[must_use]
    pub const fn spec_version(&self) -> SpecVersion {
        self.version
    }

    #[must_use]
    pub const fn major_version(&self) -> u32 {
        self.version.major()
    }

    #[must_use]
    pub const fn minor_version(&self) -> u32 {
        self.version.minor()
    }

    /// The version as `"major.minor"`.
    #[must_use]
    pub const fn version_string(&self) -> &'static str {
        self.version.as_str()
    }

    // -- identity and flags -------------------------------------------------

    /// Fragment name (`<name>` in a web fragment), used in diagnostics.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_owned);
    }

    /// An overridable descriptor is a baseline (such as container defaults)
    /// whose fragment contributions yield to regular fragments.
    #[must_use]
    pub const fn is_overridable(&self) -> bool {
        self.overridable
    }

    pub const fn set_overridable(&mut self, overridable: bool) {
        self.overridable = overridable;
    }

    #[must_use]
    pub const fn is_distributable(&self) -> bool {
        self.distributable
    }

    pub const fn set_distributable(&mut self, distributable: bool) {
        self.distributable = distributable;
    }

    /// When set on a fragment, its welcome files are added even if the main
    /// descriptor already declares some.
    #[must_use]
    pub const fn always_add_welcome_files(&self) -> bool {
        self.always_add_welcome_files
    }

    pub const fn set_always_add_welcome_files(&mut self, always: bool) {
        self.always_add_welcome_files = always;
    }

    /// When set, the next welcome file added replaces the current list.
    #[must_use]
    pub const fn replace_welcome_files(&self) -> bool {
        self.replace_welcome_files
    }

    pub const fn set_replace_welcome_files(&mut self, replace: bool) {
        self.replace_welcome_files = replace;
    }

    // -- scalar maps --------------------------------------------------------

    pub fn add_post_construct_method(
        &mut self,
        class: impl Into<String>,
        method: impl Into<String>,
    ) {
        put(
            Field::PostConstructMethods,
            &mut self.post_construct_methods,
            class.into(),
            method.into(),
        );
    }

    #[must_use]
    pub const fn post_construct_methods(&self) -> &BTreeMap<String, String> {
        &self.post_construct_methods
    }

    pub fn add_pre_destroy_method(&mut self, class: impl Into<String>, method: impl Into<String>) {
        put(
            Field::PreDestroyMethods,
            &mut self.pre_destroy_methods,
            class.into(),
            method.into(),
        );
    }

    #[must_use]
    pub const fn pre_destroy_methods(&self) -> &BTreeMap<String, String> {
        &self.pre_destroy_methods
    }

    pub fn add_context_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        put(Field::ContextParams, &mut self.context_params, name.into(), value.into());
    }

    #[must_use]
    pub const fn context_params(&self) -> &BTreeMap<String, String> {
        &self.context_params
    }

    pub fn add_mime_mapping(&mut self, extension: impl Into<String>, mime_type: impl Into<String>) {
        put(Field::MimeMappings, &mut self.mime_mappings, extension.into(), mime_type.into());
    }

    #[must_use]
    pub const fn mime_mappings(&self) -> &BTreeMap<String, String> {
        &self.mime_mappings
    }

    pub fn add_locale_encoding_mapping(
        &mut self,
        locale: impl Into<String>,
        encoding: impl Into<String>,
    ) {
        put(
            Field::LocaleEncodingMappings,
            &mut self.locale_encoding_mappings,
            locale.into(),
            encoding.into(),
        );
    }

    #[must_use]
    pub const fn locale_encoding_mappings(&self) -> &BTreeMap<String, String> {
        &self.locale_encoding_mappings
    }

    // -- uniqueness-constrained mappings ------------------------------------

    /// Declare a servlet. A blank name or target is ignored.
    ///
    /// # Errors
    /// Returns [`DescriptorError::DuplicateBinding`] if a different servlet
    /// with the same name is already declared.
    pub fn add_servlet(&mut self, servlet: ServletDef) -> Result<(), DescriptorError> {
        if is_blank(Field::Servlets, "name", servlet.name())
            || servlet
                .target()
                .is_some_and(|t| is_blank(Field::Servlets, "target", t.value()))
        {
            return Ok(());
        }
        let name = servlet.name().to_owned();
        bind_unique(Field::Servlets, &mut self.servlets, name, servlet)
    }

    #[must_use]
    pub const fn servlets(&self) -> &BTreeMap<String, ServletDef> {
        &self.servlets
    }

    #[must_use]
    pub fn servlet(&self, name: &str) -> Option<&ServletDef> {
        self.servlets.get(name)
    }

    /// Map a URL pattern to a servlet.
    ///
    /// Re-adding an identical mapping is a no-op, and so is a blank pattern
    /// or servlet name.
    ///
    /// # Errors
    /// Returns [`DescriptorError::DuplicateBinding`] if `url_pattern` is
    /// already mapped to a different servlet in this descriptor.
    pub fn add_servlet_mapping(
        &mut self,
        url_pattern: impl Into<String>,
        servlet_name: impl Into<String>,
    ) -> Result<(), DescriptorError> {
        let (url_pattern, servlet_name) = (url_pattern.into(), servlet_name.into());
        if is_blank(Field::ServletMappings, "url pattern", &url_pattern)
            || is_blank(Field::ServletMappings, "servlet name", &servlet_name)
        {
            return Ok(());
        }
        bind_unique(Field::ServletMappings, &mut self.servlet_mappings, url_pattern, servlet_name)
    }

    #[must_use]
    pub const fn servlet_mappings(&self) -> &BTreeMap<String, String> {
        &self.servlet_mappings
    }

    // -- welcome files ------------------------------------------------------

    /// Append a welcome file.
    ///
    /// If `replace_welcome_files` is set, the existing list is cleared first
    /// and the flag is reset. Duplicates and blank names are ignored.
    pub fn add_welcome_file(&mut self, file: impl Into<String>) {
        let file = file.into();
        if is_blank("welcome files", "file name", &file) {
            return;
        }
        if self.replace_welcome_files {
            debug!(replaced = self.welcome_files.len(), "replacing welcome files");
            self.welcome_files.clear();
            self.replace_welcome_files = false;
        }
        if !self.welcome_files.contains(&file) {
            self.welcome_files.push(file);
        }
    }

    #[must_use]
    pub fn welcome_files(&self) -> &[String] {
        &self.welcome_files
    }
}

/// `true` if `text` is blank, which no descriptor can express; logs the
/// dropped entry.
fn is_blank(field: impl fmt::Display, part: &str, text: &str) -> bool {
    let blank = text.trim().is_empty();
    if blank {
        warn!(%field, part, "blank {part} ignored");
    }
    blank
}

/// Insert into a scalar map; a later declaration of the same key replaces
/// the earlier one. Blank keys are dropped, and so are blank values except
/// for context params.
fn put(field: Field, map: &mut BTreeMap<String, String>, key: String, value: String) {
    if is_blank(field, "key", &key)
        || (field != Field::ContextParams && is_blank(field, "value", &value))
    {
        return;
    }
    if let Some(previous) = map.get(&key)
        && *previous != value
    {
        debug!(%field, %key, %previous, %value, "redeclared key replaces earlier value");
    }
    map.insert(key, value);
}

/// Insert into a uniqueness-constrained mapping.
fn bind_unique<V>(
    field: Field,
    map: &mut BTreeMap<String, V>,
    key: String,
    value: V,
) -> Result<(), DescriptorError>
where
    V: Eq + fmt::Display,
{
    match map.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(slot) if *slot.get() == value => Ok(()),
        Entry::Occupied(slot) => Err(DescriptorError::DuplicateBinding {
            field,
            key: slot.key().clone(),
            existing: slot.get().to_string(),
            requested: value.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{WEB_22_PUBLIC, WEB_23_PUBLIC};

    #[test]
    fn defaults() {
        let webxml = WebXml::new();
        assert_eq!(webxml.major_version(), 3);
        assert_eq!(webxml.minor_version(), 1);
        assert!(webxml.always_add_welcome_files());
        assert!(!webxml.replace_welcome_files());
        assert!(!webxml.is_overridable());
        assert!(!webxml.is_distributable());
    }

    #[test]
    fn unknown_and_absent_versions_are_ignored() {
        let mut webxml = WebXml::new();
        webxml.set_version(Some("2.5"));
        assert_eq!((webxml.major_version(), webxml.minor_version()), (2, 5));

        webxml.set_version(Some("0.0"));
        assert_eq!((webxml.major_version(), webxml.minor_version()), (2, 5));

        webxml.set_version(None);
        assert_eq!((webxml.major_version(), webxml.minor_version()), (2, 5));
    }

    #[test]
    fn each_recognized_version_string() {
        for (raw, major, minor) in [("2.4", 2, 4), ("2.5", 2, 5), ("3.0", 3, 0), ("3.1", 3, 1)] {
            let mut webxml = WebXml::new();
            webxml.set_version(Some(raw));
            assert_eq!(webxml.major_version(), major);
            assert_eq!(webxml.minor_version(), minor);
            assert_eq!(webxml.version_string(), raw);
        }
    }

    #[test]
    fn public_id_sets_version() {
        let mut webxml = WebXml::new();
        webxml.set_public_id(WEB_22_PUBLIC);
        assert_eq!((webxml.major_version(), webxml.minor_version()), (2, 2));
        assert_eq!(webxml.version_string(), "2.2");

        let mut webxml = WebXml::new();
        webxml.set_public_id(WEB_23_PUBLIC);
        assert_eq!(webxml.version_string(), "2.3");
        assert_eq!(webxml.public_id(), Some(WEB_23_PUBLIC));
    }

    #[test]
    fn unknown_public_id_is_ignored() {
        let mut webxml = WebXml::new();
        webxml.set_public_id("-//Example//DTD Nothing//EN");
        assert_eq!(webxml.version_string(), "3.1");
        assert_eq!(webxml.public_id(), None);
    }

    #[test]
    fn schema_version_clears_stale_public_id() {
        let mut webxml = WebXml::new();
        webxml.set_public_id(WEB_23_PUBLIC);
        webxml.set_version(Some("2.3"));
        assert_eq!(webxml.public_id(), Some(WEB_23_PUBLIC));
        webxml.set_version(Some("3.0"));
        assert_eq!(webxml.public_id(), None);
        assert_eq!(webxml.version_string(), "3.0");
    }

    #[test]
    fn duplicate_servlet_mapping_to_other_servlet_fails() {
        let mut webxml = WebXml::new();
        webxml.add_servlet_mapping("/foo", "a").unwrap();
        let err = webxml.add_servlet_mapping("/foo", "b").unwrap_err();
        assert!(err.is_invalid_configuration());
        assert_eq!(webxml.servlet_mappings().get("/foo").map(String::as_str), Some("a"));
    }

    #[test]
    fn blank_entries_are_ignored() {
        let mut webxml = WebXml::new();
        webxml.add_mime_mapping("", "text/plain");
        webxml.add_mime_mapping("txt", " ");
        webxml.add_post_construct_method("A", "");
        webxml.add_welcome_file("");
        webxml.add_servlet_mapping("", "s").unwrap();
        webxml.add_servlet_mapping("/s", "").unwrap();
        webxml.add_servlet(ServletDef::without_target(" ")).unwrap();
        webxml
            .add_servlet(ServletDef::new("s", ServletTarget::Class(String::new())))
            .unwrap();
        assert!(webxml.mime_mappings().is_empty());
        assert!(webxml.post_construct_methods().is_empty());
        assert!(webxml.welcome_files().is_empty());
        assert!(webxml.servlet_mappings().is_empty());
        assert!(webxml.servlets().is_empty());

        // A context param may carry an empty value.
        webxml.add_context_param("flag", "");
        assert_eq!(webxml.context_params()["flag"], "");
    }

    #[test]
    fn blank_welcome_file_keeps_replaceable_list() {
        let mut webxml = WebXml::new();
        webxml.add_welcome_file("default.html");
        webxml.set_replace_welcome_files(true);
        webxml.add_welcome_file("  ");
        assert_eq!(webxml.welcome_files(), ["default.html"]);
        webxml.add_welcome_file("index.html");
        assert_eq!(webxml.welcome_files(), ["index.html"]);
    }

    #[test]
    fn repeated_identical_mapping_is_a_no_op() {
        let mut webxml = WebXml::new();
        webxml.add_servlet_mapping("/foo", "a").unwrap();
        webxml.add_servlet_mapping("/foo", "a").unwrap();
        assert_eq!(webxml.servlet_mappings().len(), 1);
    }

    #[test]
    fn conflicting_servlet_definition_fails() {
        let mut webxml = WebXml::new();
        webxml
            .add_servlet(ServletDef::new("s", ServletTarget::Class("A".into())))
            .unwrap();
        let err = webxml
            .add_servlet(ServletDef::new("s", ServletTarget::Class("B".into())))
            .unwrap_err();
        assert!(matches!(
            err,
            DescriptorError::DuplicateBinding {
                field: Field::Servlets,
                ..
            }
        ));
    }

    #[test]
    fn scalar_map_redeclaration_replaces() {
        let mut webxml = WebXml::new();
        webxml.add_context_param("k", "1");
        webxml.add_context_param("k", "2");
        assert_eq!(webxml.context_params().len(), 1);
        assert_eq!(webxml.context_params()["k"], "2");
    }

    #[test]
    fn replace_welcome_files_clears_once() {
        let mut webxml = WebXml::new();
        webxml.add_welcome_file("index.html");
        webxml.add_welcome_file("index.jsp");
        webxml.set_replace_welcome_files(true);
        webxml.add_welcome_file("home.html");
        webxml.add_welcome_file("home.html");
        webxml.add_welcome_file("main.html");
        assert_eq!(webxml.welcome_files(), ["home.html", "main.html"]);
        assert!(!webxml.replace_welcome_files());
    }
}

//! Per-version descriptor grammars.
//!
//! A [`Grammar`] answers three questions for a given (version, document
//! kind) pair: which top-level elements are legal and in what order, which
//! identifiers (DOCTYPE, namespace, schema location) the document must carry,
//! and what child sequence each modelled element has.
//!
//! Only elements the model reads get a child content model. Legal but
//! unmodelled elements are checked for presence at the top level and
//! otherwise skipped.

use std::fmt;

use serde::Serialize;

use crate::version::SpecVersion;

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// Which root element a document uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentKind {
    /// A complete application descriptor (`<web-app>`).
    #[serde(rename = "web-app")]
    Application,
    /// A library fragment (`<web-fragment>`, 3.0 and later).
    #[serde(rename = "web-fragment")]
    Fragment,
}

impl DocumentKind {
    /// The root element name.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::Application => "web-app",
            Self::Fragment => "web-fragment",
        }
    }

    /// Resolve a root element name.
    #[must_use]
    pub fn from_root(name: &str) -> Option<Self> {
        match name {
            "web-app" => Some(Self::Application),
            "web-fragment" => Some(Self::Fragment),
            _ => None,
        }
    }

    /// Oldest version that defines this document kind.
    #[must_use]
    pub const fn since(self) -> SpecVersion {
        match self {
            Self::Application => SpecVersion::V2_2,
            Self::Fragment => SpecVersion::V3_0,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root())
    }
}

// ---------------------------------------------------------------------------
// Top-level element table
// ---------------------------------------------------------------------------

/// What the reader does with a top-level element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Handling {
    /// Legal but not modelled.
    Skip,
    /// Populates the model.
    Model,
    /// An ordering directive: read, reported, not applied.
    Directive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Both,
    Application,
    Fragment,
}

/// A top-level element definition.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TopLevel {
    pub name: &'static str,
    since: SpecVersion,
    until: SpecVersion,
    scope: Scope,
    pub handling: Handling,
    /// At most one occurrence in DTD-era documents.
    dtd_once: bool,
    /// At most one occurrence in schema-era documents.
    schema_once: bool,
}

const fn el(name: &'static str, since: SpecVersion, handling: Handling) -> TopLevel {
    TopLevel {
        name,
        since,
        until: SpecVersion::V3_1,
        scope: Scope::Both,
        handling,
        dtd_once: false,
        schema_once: false,
    }
}

impl TopLevel {
    const fn until(mut self, until: SpecVersion) -> Self {
        self.until = until;
        self
    }

    const fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    const fn dtd_once(mut self) -> Self {
        self.dtd_once = true;
        self
    }

    const fn once(mut self) -> Self {
        self.dtd_once = true;
        self.schema_once = true;
        self
    }
}

use Handling::{Directive, Model, Skip};
use SpecVersion::{V2_2, V2_3, V2_4, V2_5, V3_0, V3_1};

/// Every top-level element, DTD-era elements in DTD order first.
const TOP_LEVEL: &[TopLevel] = &[
    el("icon", V2_2, Skip).dtd_once(),
    el("display-name", V2_2, Skip).dtd_once(),
    el("description", V2_2, Skip).dtd_once(),
    el("distributable", V2_2, Model).dtd_once(),
    el("context-param", V2_2, Model),
    el("filter", V2_3, Skip),
    el("filter-mapping", V2_3, Skip),
    el("listener", V2_3, Skip),
    el("servlet", V2_2, Model),
    el("servlet-mapping", V2_2, Model),
    el("session-config", V2_2, Skip).once(),
    el("mime-mapping", V2_2, Model),
    el("welcome-file-list", V2_2, Model).dtd_once(),
    el("error-page", V2_2, Skip),
    el("taglib", V2_2, Skip).until(V2_3),
    el("resource-env-ref", V2_3, Skip),
    el("resource-ref", V2_2, Skip),
    el("security-constraint", V2_2, Skip),
    el("login-config", V2_2, Skip).once(),
    el("security-role", V2_2, Skip),
    el("env-entry", V2_2, Skip),
    el("ejb-ref", V2_2, Skip),
    el("ejb-local-ref", V2_3, Skip),
    // Schema era: any order.
    el("jsp-config", V2_4, Skip).once(),
    el("service-ref", V2_4, Skip),
    el("message-destination-ref", V2_4, Skip),
    el("message-destination", V2_4, Skip),
    el("locale-encoding-mapping-list", V2_4, Model),
    el("persistence-context-ref", V2_5, Skip),
    el("persistence-unit-ref", V2_5, Skip),
    el("post-construct", V2_5, Model),
    el("pre-destroy", V2_5, Model),
    el("data-source", V3_0, Skip),
    el("module-name", V3_0, Skip).scope(Scope::Application).once(),
    el("absolute-ordering", V3_0, Directive)
        .scope(Scope::Application)
        .once(),
    el("name", V3_0, Model).scope(Scope::Fragment).once(),
    el("ordering", V3_0, Directive).scope(Scope::Fragment).once(),
    el("deny-uncovered-http-methods", V3_1, Skip).once(),
];

// ---------------------------------------------------------------------------
// Child content models
// ---------------------------------------------------------------------------

/// One position in an element's child sequence.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChildRule {
    /// Accepted element names (more than one for a choice).
    pub names: &'static [&'static str],
    pub min: usize,
    /// `None` for unbounded.
    pub max: Option<usize>,
}

const fn one(names: &'static [&'static str]) -> ChildRule {
    ChildRule {
        names,
        min: 1,
        max: Some(1),
    }
}

const fn optional(names: &'static [&'static str]) -> ChildRule {
    ChildRule {
        names,
        min: 0,
        max: Some(1),
    }
}

const fn many(names: &'static [&'static str]) -> ChildRule {
    ChildRule {
        names,
        min: 0,
        max: None,
    }
}

const fn at_least_one(names: &'static [&'static str]) -> ChildRule {
    ChildRule {
        names,
        min: 1,
        max: None,
    }
}

impl ChildRule {
    pub fn accepts(&self, name: &str) -> bool {
        self.names.contains(&name)
    }

    pub fn label(&self) -> String {
        self.names.join("|")
    }
}

const SERVLET_TARGET: &[&str] = &["servlet-class", "jsp-file"];

const SERVLET_22: &[ChildRule] = &[
    optional(&["icon"]),
    one(&["servlet-name"]),
    optional(&["display-name"]),
    optional(&["description"]),
    one(SERVLET_TARGET),
    many(&["init-param"]),
    optional(&["load-on-startup"]),
    many(&["security-role-ref"]),
];

const SERVLET_23: &[ChildRule] = &[
    optional(&["icon"]),
    one(&["servlet-name"]),
    optional(&["display-name"]),
    optional(&["description"]),
    one(SERVLET_TARGET),
    many(&["init-param"]),
    optional(&["load-on-startup"]),
    optional(&["run-as"]),
    many(&["security-role-ref"]),
];

const SERVLET_24: &[ChildRule] = &[
    many(&["description"]),
    many(&["display-name"]),
    many(&["icon"]),
    one(&["servlet-name"]),
    one(SERVLET_TARGET),
    many(&["init-param"]),
    optional(&["load-on-startup"]),
    optional(&["run-as"]),
    many(&["security-role-ref"]),
];

const SERVLET_30: &[ChildRule] = &[
    many(&["description"]),
    many(&["display-name"]),
    many(&["icon"]),
    one(&["servlet-name"]),
    optional(SERVLET_TARGET),
    many(&["init-param"]),
    optional(&["load-on-startup"]),
    optional(&["enabled"]),
    optional(&["async-supported"]),
    optional(&["run-as"]),
    many(&["security-role-ref"]),
    optional(&["multipart-config"]),
];

const PARAM_DTD: &[ChildRule] = &[
    one(&["param-name"]),
    one(&["param-value"]),
    optional(&["description"]),
];

const PARAM_SCHEMA: &[ChildRule] = &[
    many(&["description"]),
    one(&["param-name"]),
    one(&["param-value"]),
];

const MAPPING_SINGLE: &[ChildRule] = &[one(&["servlet-name"]), one(&["url-pattern"])];

const MAPPING_MULTI: &[ChildRule] = &[one(&["servlet-name"]), at_least_one(&["url-pattern"])];

const MIME_MAPPING: &[ChildRule] = &[one(&["extension"]), one(&["mime-type"])];

const WELCOME_FILE_LIST: &[ChildRule] = &[at_least_one(&["welcome-file"])];

const LOCALE_LIST: &[ChildRule] = &[at_least_one(&["locale-encoding-mapping"])];

const LOCALE_MAPPING: &[ChildRule] = &[one(&["locale"]), one(&["encoding"])];

const LIFECYCLE_CALLBACK: &[ChildRule] = &[
    one(&["lifecycle-callback-class"]),
    one(&["lifecycle-callback-method"]),
];

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// The grammar of one descriptor version and document kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grammar {
    version: SpecVersion,
    kind: DocumentKind,
}

impl Grammar {
    /// Select the grammar for a document.
    #[must_use]
    pub const fn for_document(version: SpecVersion, kind: DocumentKind) -> Self {
        Self { version, kind }
    }

    #[must_use]
    pub const fn version(&self) -> SpecVersion {
        self.version
    }

    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The required root element name.
    #[must_use]
    pub const fn root(&self) -> &'static str {
        self.kind.root()
    }

    /// `true` if the document kind exists in this version.
    #[must_use]
    pub fn defines_kind(&self) -> bool {
        self.version >= self.kind.since()
    }

    /// DOCTYPE public and system identifiers (DTD era only).
    #[must_use]
    pub const fn dtd_identifiers(&self) -> Option<(&'static str, &'static str)> {
        self.version.dtd_identifiers()
    }

    /// Root element namespace (schema era only).
    #[must_use]
    pub const fn namespace(&self) -> Option<&'static str> {
        self.version.namespace()
    }

    /// The canonical `xsi:schemaLocation` value: namespace, space, schema URL.
    #[must_use]
    pub fn schema_location(&self) -> Option<String> {
        let ns = self.namespace()?;
        let url = self.version.schema_url(self.root())?;
        Some(format!("{ns} {url}"))
    }

    /// `true` if top-level elements must follow DTD order.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.version.is_dtd()
    }

    /// Look up a top-level element by name, ignoring version.
    pub(crate) fn lookup(name: &str) -> Option<(usize, &'static TopLevel)> {
        TOP_LEVEL.iter().enumerate().find(|(_, t)| t.name == name)
    }

    /// `true` if `element` is legal at the top level of this grammar.
    pub(crate) fn allows(&self, element: &TopLevel) -> bool {
        let in_scope = match element.scope {
            Scope::Both => true,
            Scope::Application => self.kind == DocumentKind::Application,
            Scope::Fragment => self.kind == DocumentKind::Fragment,
        };
        in_scope && self.version >= element.since && self.version <= element.until
    }

    /// `true` if `element` may appear at most once.
    pub(crate) const fn is_once(&self, element: &TopLevel) -> bool {
        if self.version.is_dtd() {
            element.dtd_once
        } else {
            element.schema_once
        }
    }

    /// Child content model of a modelled element, if it has one.
    pub(crate) fn content(&self, element: &str) -> Option<&'static [ChildRule]> {
        let v = self.version;
        let rules = match element {
            "servlet" => match v {
                V2_2 => SERVLET_22,
                V2_3 => SERVLET_23,
                V2_4 | V2_5 => SERVLET_24,
                V3_0 | V3_1 => SERVLET_30,
            },
            "init-param" | "context-param" if v.is_dtd() => PARAM_DTD,
            "init-param" | "context-param" => PARAM_SCHEMA,
            "servlet-mapping" if v >= V2_5 => MAPPING_MULTI,
            "servlet-mapping" => MAPPING_SINGLE,
            "mime-mapping" => MIME_MAPPING,
            "welcome-file-list" => WELCOME_FILE_LIST,
            "locale-encoding-mapping-list" => LOCALE_LIST,
            "locale-encoding-mapping" => LOCALE_MAPPING,
            "post-construct" | "pre-destroy" => LIFECYCLE_CALLBACK,
            _ => return None,
        };
        Some(rules)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.version)
    }
}

// ---------------------------------------------------------------------------
// Sequence checking
// ---------------------------------------------------------------------------

/// A violation of a child content model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SequenceViolation {
    /// A required child is missing before `index` (or at the end).
    Missing { expected: String, index: usize },
    /// A child appears more often than allowed.
    TooMany { name: String, index: usize },
    /// A child is legal in the element but appears out of order.
    OutOfOrder { name: String, index: usize },
    /// A child is not part of the content model.
    Unexpected { name: String, index: usize },
}

/// Check `children` against `rules` with a greedy left-to-right match.
///
/// Indices refer to positions in `children`; a missing-child violation at
/// the end uses `children.len()`.
pub(crate) fn check_sequence<S: AsRef<str>>(
    rules: &[ChildRule],
    children: &[S],
) -> Vec<SequenceViolation> {
    let mut violations = Vec::new();
    let mut pos = 0;
    let mut count = 0;

    for (index, child) in children.iter().enumerate() {
        let name = child.as_ref();
        let Some(offset) = rules[pos..].iter().position(|r| r.accepts(name)) else {
            if rules[..pos].iter().any(|r| r.accepts(name)) {
                violations.push(SequenceViolation::OutOfOrder {
                    name: name.to_owned(),
                    index,
                });
            } else {
                violations.push(SequenceViolation::Unexpected {
                    name: name.to_owned(),
                    index,
                });
            }
            continue;
        };

        if offset > 0 {
            if count < rules[pos].min {
                violations.push(SequenceViolation::Missing {
                    expected: rules[pos].label(),
                    index,
                });
            }
            for skipped in &rules[pos + 1..pos + offset] {
                if skipped.min > 0 {
                    violations.push(SequenceViolation::Missing {
                        expected: skipped.label(),
                        index,
                    });
                }
            }
            pos += offset;
            count = 0;
        }

        count += 1;
        if rules[pos].max.is_some_and(|max| count > max) {
            violations.push(SequenceViolation::TooMany {
                name: name.to_owned(),
                index,
            });
        }
    }

    if let Some(current) = rules.get(pos)
        && count < current.min
    {
        violations.push(SequenceViolation::Missing {
            expected: current.label(),
            index: children.len(),
        });
    }
    for rest in rules.iter().skip(pos + 1) {
        if rest.min > 0 {
            violations.push(SequenceViolation::Missing {
                expected: rest.label(),
                index: children.len(),
            });
        }
    }
    violations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

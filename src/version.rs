//! Descriptor specification versions.
//!
//! A descriptor declares its version one of two ways:
//!
//! - schema-era documents (2.4 and later) carry an explicit `version="x.y"`
//!   attribute on the root element;
//! - DTD-era documents (2.2, 2.3) carry no version attribute, only a
//!   `DOCTYPE` with a well-known public identifier.
//!
//! [`SpecVersion`] normalizes both encodings into a single (major, minor)
//! pair. Unrecognized input is never an error here: callers decide whether to
//! ignore it (the model does) or report it (the reader does).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Well-known identifiers
// ---------------------------------------------------------------------------

/// Public identifier of the 2.2 DTD.
pub const WEB_22_PUBLIC: &str = "-//Sun Microsystems, Inc.//DTD Web Application 2.2//EN";
/// System identifier of the 2.2 DTD.
pub const WEB_22_SYSTEM: &str = "http://java.sun.com/j2ee/dtds/web-app_2_2.dtd";
/// Public identifier of the 2.3 DTD.
pub const WEB_23_PUBLIC: &str = "-//Sun Microsystems, Inc.//DTD Web Application 2.3//EN";
/// System identifier of the 2.3 DTD.
pub const WEB_23_SYSTEM: &str = "http://java.sun.com/dtd/web-app_2_3.dtd";

/// J2EE 1.4 namespace (2.4).
pub const J2EE_NS: &str = "http://java.sun.com/xml/ns/j2ee";
/// Java EE 5/6 namespace (2.5, 3.0).
pub const JAVAEE_NS: &str = "http://java.sun.com/xml/ns/javaee";
/// Java EE 7 namespace (3.1).
pub const JAVAEE_7_NS: &str = "http://xmlns.jcp.org/xml/ns/javaee";

/// XML Schema instance namespace, used for `xsi:schemaLocation`.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

// ---------------------------------------------------------------------------
// SpecVersion
// ---------------------------------------------------------------------------

/// A recognized descriptor specification version.
///
/// Ordering follows release order, so `v >= SpecVersion::V2_5` reads as
/// "2.5 or later".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SpecVersion {
    /// 2.2 (DTD).
    V2_2,
    /// 2.3 (DTD).
    V2_3,
    /// 2.4 (J2EE schema).
    V2_4,
    /// 2.5 (Java EE 5 schema).
    V2_5,
    /// 3.0 (Java EE 6 schema).
    V3_0,
    /// 3.1 (Java EE 7 schema). The default for a fresh model.
    #[default]
    V3_1,
}

impl SpecVersion {
    /// Every recognized version, oldest first.
    pub const ALL: [Self; 6] = [
        Self::V2_2,
        Self::V2_3,
        Self::V2_4,
        Self::V2_5,
        Self::V3_0,
        Self::V3_1,
    ];

    /// Resolve an explicit `"<major>.<minor>"` version string.
    ///
    /// Returns `None` for anything outside the recognized set, including
    /// well-formed but unknown versions such as `"0.0"` or `"4.0"`.
    #[must_use]
    pub fn from_version_str(s: &str) -> Option<Self> {
        match s {
            "2.2" => Some(Self::V2_2),
            "2.3" => Some(Self::V2_3),
            "2.4" => Some(Self::V2_4),
            "2.5" => Some(Self::V2_5),
            "3.0" => Some(Self::V3_0),
            "3.1" => Some(Self::V3_1),
            _ => None,
        }
    }

    /// Resolve a legacy DTD public identifier.
    #[must_use]
    pub fn from_public_id(id: &str) -> Option<Self> {
        match id {
            WEB_22_PUBLIC => Some(Self::V2_2),
            WEB_23_PUBLIC => Some(Self::V2_3),
            _ => None,
        }
    }

    /// Major version number.
    #[must_use]
    pub const fn major(self) -> u32 {
        match self {
            Self::V2_2 | Self::V2_3 | Self::V2_4 | Self::V2_5 => 2,
            Self::V3_0 | Self::V3_1 => 3,
        }
    }

    /// Minor version number.
    #[must_use]
    pub const fn minor(self) -> u32 {
        match self {
            Self::V3_0 => 0,
            Self::V3_1 => 1,
            Self::V2_2 => 2,
            Self::V2_3 => 3,
            Self::V2_4 => 4,
            Self::V2_5 => 5,
        }
    }

    /// Canonical `"major.minor"` form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_2 => "2.2",
            Self::V2_3 => "2.3",
            Self::V2_4 => "2.4",
            Self::V2_5 => "2.5",
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
        }
    }

    /// `true` for the DTD-era versions (2.2, 2.3).
    #[must_use]
    pub const fn is_dtd(self) -> bool {
        matches!(self, Self::V2_2 | Self::V2_3)
    }

    /// DTD public and system identifiers, for DTD-era versions.
    #[must_use]
    pub const fn dtd_identifiers(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::V2_2 => Some((WEB_22_PUBLIC, WEB_22_SYSTEM)),
            Self::V2_3 => Some((WEB_23_PUBLIC, WEB_23_SYSTEM)),
            _ => None,
        }
    }

    /// XML namespace of the descriptor schema, for schema-era versions.
    #[must_use]
    pub const fn namespace(self) -> Option<&'static str> {
        match self {
            Self::V2_2 | Self::V2_3 => None,
            Self::V2_4 => Some(J2EE_NS),
            Self::V2_5 | Self::V3_0 => Some(JAVAEE_NS),
            Self::V3_1 => Some(JAVAEE_7_NS),
        }
    }

    /// Suffix used in schema file names (`web-app_<suffix>.xsd`).
    const fn file_suffix(self) -> &'static str {
        match self {
            Self::V2_2 => "2_2",
            Self::V2_3 => "2_3",
            Self::V2_4 => "2_4",
            Self::V2_5 => "2_5",
            Self::V3_0 => "3_0",
            Self::V3_1 => "3_1",
        }
    }

    /// Schema document URL for a root element (`web-app` or `web-fragment`).
    ///
    /// Returns `None` for DTD-era versions.
    #[must_use]
    pub fn schema_url(self, root: &str) -> Option<String> {
        self.namespace()
            .map(|ns| format!("{ns}/{root}_{}.xsd", self.file_suffix()))
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized version string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownVersion(pub String);

impl fmt::Display for UnknownVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unrecognized descriptor version '{}' (expected one of 2.2, 2.3, 2.4, 2.5, 3.0, 3.1)",
            self.0
        )
    }
}

impl std::error::Error for UnknownVersion {}

impl FromStr for SpecVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_version_str(s).ok_or_else(|| UnknownVersion(s.to_owned()))
    }
}

impl TryFrom<String> for SpecVersion {
    type Error = UnknownVersion;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SpecVersion> for String {
    fn from(v: SpecVersion) -> Self {
        v.as_str().to_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

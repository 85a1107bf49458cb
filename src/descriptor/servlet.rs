//! Servlet definitions.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

/// What a servlet declaration points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServletTarget {
    /// A fully-qualified servlet class (`<servlet-class>`).
    Class(String),
    /// A JSP page compiled into a servlet (`<jsp-file>`).
    JspFile(String),
}

impl ServletTarget {
    /// The class name or JSP path.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Class(text) | Self::JspFile(text) => text,
        }
    }
}

impl fmt::Display for ServletTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => f.write_str(class),
            Self::JspFile(path) => write!(f, "jsp:{path}"),
        }
    }
}

/// A `<servlet>` declaration.
///
/// Two definitions are equal only if every attribute matches; the merge
/// treats any difference between fragments as a conflict.
///
/// From 3.0 a declaration may omit the target and only carry settings
/// (init params, load-on-startup) for a servlet registered elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServletDef {
    name: String,
    target: Option<ServletTarget>,
    init_params: BTreeMap<String, String>,
    load_on_startup: Option<i32>,
    async_supported: Option<bool>,
}

impl ServletDef {
    /// Create a servlet definition with no init params.
    pub fn new(name: impl Into<String>, target: ServletTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::without_target(name)
        }
    }

    /// Create a definition with no servlet class or JSP file (3.0+).
    pub fn without_target(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            init_params: BTreeMap::new(),
            load_on_startup: None,
            async_supported: None,
        }
    }

    /// Add (or replace) an init parameter. A blank name is ignored.
    #[must_use]
    pub fn with_init_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            warn!(servlet = %self.name, "blank init-param name ignored");
        } else {
            self.init_params.insert(name, value.into());
        }
        self
    }

    /// Set the load-on-startup order.
    #[must_use]
    pub const fn with_load_on_startup(mut self, order: i32) -> Self {
        self.load_on_startup = Some(order);
        self
    }

    /// Set async support (3.0+ descriptors only).
    #[must_use]
    pub const fn with_async_supported(mut self, supported: bool) -> Self {
        self.async_supported = Some(supported);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn target(&self) -> Option<&ServletTarget> {
        self.target.as_ref()
    }

    #[must_use]
    pub const fn init_params(&self) -> &BTreeMap<String, String> {
        &self.init_params
    }

    #[must_use]
    pub const fn load_on_startup(&self) -> Option<i32> {
        self.load_on_startup
    }

    #[must_use]
    pub const fn async_supported(&self) -> Option<bool> {
        self.async_supported
    }
}

impl fmt::Display for ServletDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{target}")?,
            None => f.write_str("(no target)")?,
        }
        if !self.init_params.is_empty() {
            write!(f, " [{} init-param(s)]", self.init_params.len())?;
        }
        if let Some(order) = self.load_on_startup {
            write!(f, " load-on-startup={order}")?;
        }
        if let Some(supported) = self.async_supported {
            write!(f, " async={supported}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_summarizes_definition() {
        let def = ServletDef::new("jsp", ServletTarget::Class("org.example.JspServlet".into()))
            .with_init_param("fork", "false")
            .with_load_on_startup(3);
        assert_eq!(
            def.to_string(),
            "org.example.JspServlet [1 init-param(s)] load-on-startup=3"
        );
        let jsp = ServletDef::new("index", ServletTarget::JspFile("/index.jsp".into()));
        assert_eq!(jsp.to_string(), "jsp:/index.jsp");
        let settings = ServletDef::without_target("jsp").with_init_param("fork", "true");
        assert_eq!(settings.to_string(), "(no target) [1 init-param(s)]");
    }

    #[test]
    fn equality_covers_every_attribute() {
        let a = ServletDef::new("s", ServletTarget::Class("A".into()));
        assert_eq!(a, a.clone());
        assert_ne!(a, a.clone().with_async_supported(true));
        assert_ne!(a, a.clone().with_init_param("k", "v"));
        assert_ne!(a, ServletDef::without_target("s"));
    }

    #[test]
    fn blank_init_param_name_is_ignored() {
        let def = ServletDef::without_target("s").with_init_param(" ", "v");
        assert!(def.init_params().is_empty());
    }
}

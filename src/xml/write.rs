//! Canonical descriptor serialization.
//!
//! The output is always a `<web-app>` document in the canonical form of the
//! model's version: a DOCTYPE for the DTD era, namespace plus schema location
//! plus `version` for the schema era. Elements are written in DTD order,
//! which every schema-era grammar also accepts. Keyed fields are written in
//! key order, so equal models serialize identically.

use std::borrow::Cow;

use quick_xml::escape::escape;
use tracing::debug;

use crate::descriptor::{ServletDef, ServletTarget, WebXml};
use crate::version::{SpecVersion, XSI_NS};

use super::grammar::{DocumentKind, Grammar};

const INDENT: &str = "  ";

#[derive(Default)]
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn line(&mut self, content: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(content);
        self.out.push('\n');
    }

    fn open(&mut self, name: &str) {
        self.line(&format!("<{name}>"));
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("</{name}>"));
    }

    fn empty(&mut self, name: &str) {
        self.line(&format!("<{name}/>"));
    }

    fn leaf(&mut self, name: &str, text: &str) {
        let text: Cow<'_, str> = escape(text);
        self.line(&format!("<{name}>{text}</{name}>"));
    }

    fn pair(&mut self, name: &str, (first, a): (&str, &str), (second, b): (&str, &str)) {
        self.open(name);
        self.leaf(first, a);
        self.leaf(second, b);
        self.close(name);
    }

    fn finish(self) -> String {
        self.out
    }
}

impl WebXml {
    /// Serialize the model as a descriptor document for its version.
    ///
    /// Fields the version's grammar cannot express are omitted (and logged
    /// at `debug`): locale encoding mappings before 2.4, lifecycle callbacks
    /// before 2.5, `async-supported` before 3.0. Merge-control flags
    /// (`overridable`, welcome-file flags) are not part of the document.
    #[must_use]
    pub fn to_document(&self) -> String {
        let version = self.spec_version();
        let grammar = Grammar::for_document(version, DocumentKind::Application);
        let root = grammar.root();

        let mut w = XmlWriter::default();
        w.line(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        if let Some((public_id, system_id)) = grammar.dtd_identifiers() {
            w.line(&format!(r#"<!DOCTYPE {root} PUBLIC "{public_id}" "{system_id}">"#));
            w.open(root);
        } else {
            let ns = grammar.namespace().unwrap_or_default();
            let location = grammar.schema_location().unwrap_or_default();
            w.line(&format!(r#"<{root} xmlns="{ns}""#));
            w.line(&format!(r#"    xmlns:xsi="{XSI_NS}""#));
            w.line(&format!(r#"    xsi:schemaLocation="{location}""#));
            w.line(&format!(r#"    version="{version}">"#));
            w.depth += 1;
        }

        if self.distributable {
            w.empty("distributable");
        }
        for (name, value) in &self.context_params {
            w.pair("context-param", ("param-name", name.as_str()), ("param-value", value.as_str()));
        }
        for servlet in self.servlets.values() {
            write_servlet(&mut w, servlet, version);
        }
        for (pattern, servlet) in &self.servlet_mappings {
            w.pair(
                "servlet-mapping",
                ("servlet-name", servlet.as_str()),
                ("url-pattern", pattern.as_str()),
            );
        }
        for (extension, mime_type) in &self.mime_mappings {
            w.pair(
                "mime-mapping",
                ("extension", extension.as_str()),
                ("mime-type", mime_type.as_str()),
            );
        }
        if !self.welcome_files.is_empty() {
            w.open("welcome-file-list");
            for file in &self.welcome_files {
                w.leaf("welcome-file", file);
            }
            w.close("welcome-file-list");
        }

        if !self.locale_encoding_mappings.is_empty() {
            if version >= SpecVersion::V2_4 {
                w.open("locale-encoding-mapping-list");
                for (locale, encoding) in &self.locale_encoding_mappings {
                    w.pair(
                        "locale-encoding-mapping",
                        ("locale", locale.as_str()),
                        ("encoding", encoding.as_str()),
                    );
                }
                w.close("locale-encoding-mapping-list");
            } else {
                debug!(
                    %version,
                    count = self.locale_encoding_mappings.len(),
                    "locale encoding mappings not expressible; omitted"
                );
            }
        }

        for (element, methods) in [
            ("post-construct", &self.post_construct_methods),
            ("pre-destroy", &self.pre_destroy_methods),
        ] {
            if methods.is_empty() {
                continue;
            }
            if version < SpecVersion::V2_5 {
                debug!(
                    %version,
                    element,
                    count = methods.len(),
                    "lifecycle callbacks not expressible; omitted"
                );
                continue;
            }
            for (class, method) in methods {
                w.pair(
                    element,
                    ("lifecycle-callback-class", class.as_str()),
                    ("lifecycle-callback-method", method.as_str()),
                );
            }
        }

        w.close(root);
        w.finish()
    }
}

fn write_servlet(w: &mut XmlWriter, servlet: &ServletDef, version: SpecVersion) {
    if servlet.target().is_none() && version < SpecVersion::V3_0 {
        debug!(
            %version,
            servlet = servlet.name(),
            "servlet without target not expressible; omitted"
        );
        return;
    }
    w.open("servlet");
    w.leaf("servlet-name", servlet.name());
    match servlet.target() {
        Some(ServletTarget::Class(class)) => w.leaf("servlet-class", class),
        Some(ServletTarget::JspFile(path)) => w.leaf("jsp-file", path),
        None => {}
    }
    for (name, value) in servlet.init_params() {
        w.pair("init-param", ("param-name", name.as_str()), ("param-value", value.as_str()));
    }
    if let Some(order) = servlet.load_on_startup() {
        w.leaf("load-on-startup", &order.to_string());
    }
    if let Some(supported) = servlet.async_supported() {
        if version >= SpecVersion::V3_0 {
            w.leaf("async-supported", if supported { "true" } else { "false" });
        } else {
            debug!(%version, servlet = servlet.name(), "async-supported not expressible; omitted");
        }
    }
    w.close("servlet");
}

//! Validating descriptor reader.
//!
//! Reading happens in two passes. The first turns the text into an element
//! tree (malformed XML is a hard error). The second resolves the declared
//! version, checks the tree against that version's [`Grammar`], and
//! populates the model through its public mutators.
//!
//! Grammar problems are collected into a [`ValidationReport`] rather than
//! returned as errors, so one pass reports everything wrong with a document.
//! Elements with structural errors are not populated.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, info_span};

use crate::descriptor::{ServletDef, ServletTarget, WebXml};
use crate::error::DescriptorError;
use crate::version::{SpecVersion, XSI_NS};

use super::grammar::{DocumentKind, Grammar, Handling, SequenceViolation, check_sequence};
use super::report::ValidationReport;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Read a descriptor document into `model`.
///
/// The declared version (DOCTYPE public id or `version` attribute) is applied
/// to the model, then every modelled element is added through the model's
/// mutators. Grammar errors and warnings are returned in the report.
///
/// The model is updated only if reading succeeds.
///
/// # Errors
/// Returns [`DescriptorError::Xml`] or [`DescriptorError::Malformed`] if the
/// text is not a well-formed XML document, and
/// [`DescriptorError::DuplicateBinding`] if the document binds a servlet
/// name or URL pattern twice.
pub fn read_document(text: &str, model: &mut WebXml) -> Result<ValidationReport, DescriptorError> {
    let Document { doctype, root } = parse(text)?;
    let _span = info_span!("read", root = %root.name).entered();
    let mut report = ValidationReport::default();

    let Some(kind) = DocumentKind::from_root(&root.name) else {
        report.error(
            root.line,
            format!(
                "root element must be <web-app> or <web-fragment>, found <{}>",
                root.name
            ),
        );
        return Ok(report);
    };
    report.kind = Some(kind);

    let declared = resolve_version(doctype.as_ref(), &root, &mut report);
    report.version = declared;
    let grammar = Grammar::for_document(declared.unwrap_or_default(), kind);
    check_header(&grammar, declared.is_some(), doctype.as_ref(), &root, &mut report);

    let mut staged = model.clone();
    match (declared, doctype.as_ref().and_then(|d| d.public_id.as_deref())) {
        (Some(v), Some(public_id)) if v.is_dtd() => staged.set_public_id(public_id),
        (Some(v), _) => staged.set_spec_version(v),
        (None, _) => {}
    }

    let mut body = BodyReader {
        grammar,
        report: &mut report,
        model: &mut staged,
        mapped: Vec::new(),
    };
    body.read(&root)?;

    *model = staged;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

struct Document {
    doctype: Option<Doctype>,
    root: Node,
}

#[derive(Debug)]
struct Node {
    prefix: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    text: String,
    line: usize,
}

impl Node {
    fn open(start: &BytesStart<'_>, line: usize) -> Result<Self, DescriptorError> {
        let qname = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let (prefix, name) = match qname.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_owned()), local.to_owned()),
            None => (None, qname),
        };
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            prefix,
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            line,
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The namespace bound to this element's prefix on the element itself.
    fn namespace(&self) -> Option<&str> {
        match &self.prefix {
            Some(prefix) => self.attribute(&format!("xmlns:{prefix}")),
            None => self.attribute("xmlns"),
        }
    }

    fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text(&self) -> &str {
        self.text.trim()
    }
}

#[derive(Debug, Default)]
struct Doctype {
    root: String,
    public_id: Option<String>,
    system_id: Option<String>,
}

impl Doctype {
    fn parse(raw: &str) -> Self {
        let mut words = raw.split_whitespace();
        let root = words.next().unwrap_or_default().to_owned();
        let literals = quoted_literals(raw);
        match words.next() {
            Some("PUBLIC") => Self {
                root,
                public_id: literals.first().map(|s| (*s).to_owned()),
                system_id: literals.get(1).map(|s| (*s).to_owned()),
            },
            Some("SYSTEM") => Self {
                root,
                public_id: None,
                system_id: literals.first().map(|s| (*s).to_owned()),
            },
            _ => Self {
                root,
                ..Self::default()
            },
        }
    }
}

fn quoted_literals(raw: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find(['"', '\'']) {
        let quote = &rest[open..=open];
        let body = &rest[open + 1..];
        let Some(close) = body.find(quote) else {
            break;
        };
        literals.push(&body[..close]);
        rest = &body[close + 1..];
    }
    literals
}

/// Byte offset → line lookup.
struct LineIndex(Vec<usize>);

impl LineIndex {
    fn new(text: &str) -> Self {
        Self(text.match_indices('\n').map(|(i, _)| i).collect())
    }

    fn line_at(&self, offset: usize) -> usize {
        self.0.partition_point(|&n| n < offset) + 1
    }

    fn last_line(&self) -> usize {
        self.0.len() + 1
    }
}

fn malformed(line: usize, detail: impl Into<String>) -> DescriptorError {
    DescriptorError::Malformed {
        line,
        detail: detail.into(),
    }
}

fn parse(text: &str) -> Result<Document, DescriptorError> {
    let lines = LineIndex::new(text);
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut doctype = None;
    let mut stack: Vec<Node> = Vec::new();
    let mut root = None;

    loop {
        let event = reader.read_event()?;
        let line = lines.line_at(usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX));
        match event {
            Event::Start(start) => stack.push(Node::open(&start, line)?),
            Event::Empty(start) => {
                let node = Node::open(&start, line)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| malformed(line, "closing tag without an opening tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                let t = t.unescape().map_err(quick_xml::Error::from)?;
                push_text(&mut stack, &t, line)?;
            }
            Event::CData(c) => push_text(&mut stack, &String::from_utf8_lossy(&c), line)?,
            Event::DocType(d) => {
                if root.is_some() || !stack.is_empty() {
                    return Err(malformed(line, "DOCTYPE must precede the root element"));
                }
                doctype = Some(Doctype::parse(&String::from_utf8_lossy(&d)));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            lines.last_line(),
            format!("<{}> opened at line {} is never closed", open.name, open.line),
        ));
    }
    let root = root.ok_or_else(|| malformed(lines.last_line(), "document has no root element"))?;
    Ok(Document { doctype, root })
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), DescriptorError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_some() {
        Err(malformed(
            node.line,
            format!("second root element <{}>", node.name),
        ))
    } else {
        *root = Some(node);
        Ok(())
    }
}

fn push_text(stack: &mut [Node], text: &str, line: usize) -> Result<(), DescriptorError> {
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(malformed(line, "text outside the root element")),
    }
}

// ---------------------------------------------------------------------------
// Header checks
// ---------------------------------------------------------------------------

fn resolve_version(
    doctype: Option<&Doctype>,
    root: &Node,
    report: &mut ValidationReport,
) -> Option<SpecVersion> {
    let attribute = root.attribute("version");
    let public_id = doctype.and_then(|d| d.public_id.as_deref());

    if let Some(v) = public_id.and_then(SpecVersion::from_public_id) {
        if attribute.is_some() {
            report.error(
                root.line,
                format!("a version attribute is not allowed in a {v} DTD document"),
            );
        }
        return Some(v);
    }
    if let Some(id) = public_id {
        report.warning(
            root.line,
            format!("unrecognized DOCTYPE public identifier '{id}'"),
        );
    }

    match attribute.map(str::trim) {
        None => {
            report.error(root.line, "missing version attribute; assuming 3.1");
            None
        }
        Some(raw) => match SpecVersion::from_version_str(raw) {
            Some(v) if v.is_dtd() => {
                report.error(
                    root.line,
                    format!("version {v} is declared with a DOCTYPE, not a version attribute"),
                );
                None
            }
            Some(v) => Some(v),
            None => {
                report.error(
                    root.line,
                    format!("unrecognized version '{raw}'; assuming 3.1"),
                );
                None
            }
        },
    }
}

fn check_header(
    grammar: &Grammar,
    declared: bool,
    doctype: Option<&Doctype>,
    root: &Node,
    report: &mut ValidationReport,
) {
    if !grammar.defines_kind() {
        report.error(
            root.line,
            format!(
                "<{}> requires version {} or later",
                grammar.root(),
                grammar.kind().since()
            ),
        );
    }

    if let Some((public_id, system_id)) = grammar.dtd_identifiers() {
        if let Some(doctype) = doctype {
            if doctype.root != root.name {
                report.error(
                    root.line,
                    format!(
                        "DOCTYPE names <{}> but the root element is <{}>",
                        doctype.root, root.name
                    ),
                );
            }
            if doctype.system_id.as_deref() != Some(system_id) {
                report.warning(
                    root.line,
                    format!(
                        "DOCTYPE system identifier {} does not match '{public_id}'; expected '{system_id}'",
                        doctype
                            .system_id
                            .as_deref()
                            .map_or_else(|| "(none)".to_owned(), |s| format!("'{s}'"))
                    ),
                );
            }
        }
        if let Some(ns) = root.namespace() {
            report.error(
                root.line,
                format!("DTD documents take no namespace, found '{ns}'"),
            );
        }
        return;
    }

    if !declared {
        return;
    }
    let version = grammar.version();
    match (root.namespace(), grammar.namespace()) {
        (Some(found), Some(expected)) if found != expected => report.error(
            root.line,
            format!("namespace '{found}' does not match version {version}; expected '{expected}'"),
        ),
        (None, Some(expected)) => report.error(
            root.line,
            format!("missing namespace; version {version} requires '{expected}'"),
        ),
        _ => {}
    }

    let location = root
        .attributes
        .iter()
        .find(|(k, v)| k.starts_with("xmlns:") && v == XSI_NS)
        .and_then(|(k, _)| root.attribute(&format!("{}:schemaLocation", &k["xmlns:".len()..])));
    if let (Some(location), Some(expected)) = (location, grammar.schema_location()) {
        let tokens: Vec<&str> = location.split_whitespace().collect();
        let names_schema = tokens
            .chunks(2)
            .any(|pair| pair.join(" ") == expected);
        if !names_schema {
            report.warning(
                root.line,
                format!("xsi:schemaLocation does not name the {grammar} schema; expected '{expected}'"),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

struct BodyReader<'a> {
    grammar: Grammar,
    report: &'a mut ValidationReport,
    model: &'a mut WebXml,
    /// (servlet name, line) for every mapping read.
    mapped: Vec<(String, usize)>,
}

impl BodyReader<'_> {
    fn read(&mut self, root: &Node) -> Result<(), DescriptorError> {
        if !root.text().is_empty() {
            self.report.error(
                root.line,
                format!("unexpected text content in <{}>", root.name),
            );
        }

        let mut seen: Vec<&str> = Vec::new();
        let mut last: Option<(usize, &str)> = None;

        for node in &root.children {
            let Some((index, element)) = Grammar::lookup(&node.name) else {
                self.report
                    .error(node.line, format!("unknown element <{}>", node.name));
                continue;
            };
            if !self.grammar.allows(element) {
                self.report.error(
                    node.line,
                    format!("<{}> is not allowed in a {} document", node.name, self.grammar),
                );
                continue;
            }
            if self.grammar.is_ordered() {
                match last {
                    Some((prev, prev_name)) if index < prev => self.report.error(
                        node.line,
                        format!("<{}> must appear before <{prev_name}>", node.name),
                    ),
                    _ => last = Some((index, element.name)),
                }
            }
            if seen.contains(&element.name) {
                if self.grammar.is_once(element) {
                    self.report
                        .error(node.line, format!("<{}> may appear only once", node.name));
                    continue;
                }
            } else {
                seen.push(element.name);
            }

            match element.handling {
                Handling::Skip => {
                    debug!(
                        element = element.name,
                        line = node.line,
                        "element not modelled; skipped"
                    );
                }
                Handling::Directive => self.report.warning(
                    node.line,
                    format!("<{}> ordering directive is read but not applied", node.name),
                ),
                Handling::Model => self.populate(node)?,
            }
        }

        for (servlet, line) in std::mem::take(&mut self.mapped) {
            if self.model.servlet(&servlet).is_none() {
                self.report.warning(
                    line,
                    format!("servlet mapping references undeclared servlet '{servlet}'"),
                );
            }
        }
        Ok(())
    }

    fn populate(&mut self, node: &Node) -> Result<(), DescriptorError> {
        if !self.check_content(node) {
            return Ok(());
        }
        match node.name.as_str() {
            "distributable" => self.model.set_distributable(true),
            "context-param" => {
                if let Some((name, value)) = self.param(node) {
                    self.model.add_context_param(name, value);
                }
            }
            "servlet" => self.servlet(node)?,
            "servlet-mapping" => self.servlet_mapping(node)?,
            "mime-mapping" => {
                let extension = self.required(node, "extension");
                let mime_type = self.required(node, "mime-type");
                if let (Some(extension), Some(mime_type)) = (extension, mime_type) {
                    self.model.add_mime_mapping(extension, mime_type);
                }
            }
            "welcome-file-list" => {
                for file in node.children_named("welcome-file") {
                    if let Some(file) = self.required_text(file) {
                        self.model.add_welcome_file(file);
                    }
                }
            }
            "locale-encoding-mapping-list" => {
                for mapping in node.children_named("locale-encoding-mapping") {
                    if !self.check_content(mapping) {
                        continue;
                    }
                    let locale = self.required(mapping, "locale");
                    let encoding = self.required(mapping, "encoding");
                    if let (Some(locale), Some(encoding)) = (locale, encoding) {
                        self.model.add_locale_encoding_mapping(locale, encoding);
                    }
                }
            }
            "post-construct" => {
                if let Some((class, method)) = self.lifecycle(node) {
                    self.model.add_post_construct_method(class, method);
                }
            }
            "pre-destroy" => {
                if let Some((class, method)) = self.lifecycle(node) {
                    self.model.add_pre_destroy_method(class, method);
                }
            }
            "name" => {
                if let Some(name) = self.required_text(node) {
                    self.model.set_name(Some(name));
                }
            }
            other => debug!(element = other, "no population rule"),
        }
        Ok(())
    }

    fn servlet(&mut self, node: &Node) -> Result<(), DescriptorError> {
        let Some(name) = self.required(node, "servlet-name") else {
            return Ok(());
        };
        // The content model already bounds the target to at most one, and
        // requires it before 3.0.
        let mut def = match node
            .children
            .iter()
            .find(|c| matches!(c.name.as_str(), "servlet-class" | "jsp-file"))
        {
            Some(target) => {
                let Some(value) = self.required_text(target) else {
                    return Ok(());
                };
                let target = if target.name == "jsp-file" {
                    ServletTarget::JspFile(value.to_owned())
                } else {
                    ServletTarget::Class(value.to_owned())
                };
                ServletDef::new(name, target)
            }
            None => ServletDef::without_target(name),
        };
        for param in node.children_named("init-param") {
            if !self.check_content(param) {
                continue;
            }
            if let Some((key, value)) = self.param(param) {
                def = def.with_init_param(key, value);
            }
        }
        if let Some(load) = node.child("load-on-startup") {
            match load.text().parse::<i32>() {
                Ok(order) => def = def.with_load_on_startup(order),
                Err(_) => self.report.error(
                    load.line,
                    format!("<load-on-startup> must be an integer, found '{}'", load.text()),
                ),
            }
        }
        if let Some(flag) = node.child("async-supported") {
            match parse_bool(flag.text()) {
                Some(supported) => def = def.with_async_supported(supported),
                None => self.report.error(
                    flag.line,
                    format!("<async-supported> must be true or false, found '{}'", flag.text()),
                ),
            }
        }
        self.model.add_servlet(def)
    }

    fn servlet_mapping(&mut self, node: &Node) -> Result<(), DescriptorError> {
        let Some(servlet) = self.required(node, "servlet-name") else {
            return Ok(());
        };
        for pattern in node.children_named("url-pattern") {
            let Some(pattern) = self.required_text(pattern) else {
                continue;
            };
            self.model.add_servlet_mapping(pattern, servlet)?;
        }
        self.mapped.push((servlet.to_owned(), node.line));
        Ok(())
    }

    fn param<'n>(&mut self, node: &'n Node) -> Option<(&'n str, &'n str)> {
        let name = self.required(node, "param-name")?;
        let value = node.child("param-value").map_or("", Node::text);
        Some((name, value))
    }

    fn lifecycle<'n>(&mut self, node: &'n Node) -> Option<(&'n str, &'n str)> {
        let class = self.required(node, "lifecycle-callback-class");
        let method = self.required(node, "lifecycle-callback-method");
        Some((class?, method?))
    }

    /// Text of a required child. Absence was already reported by the
    /// sequence check.
    fn required<'n>(&mut self, node: &'n Node, child: &str) -> Option<&'n str> {
        node.child(child).and_then(|c| self.required_text(c))
    }

    fn required_text<'n>(&mut self, node: &'n Node) -> Option<&'n str> {
        let text = node.text();
        if text.is_empty() {
            self.report
                .error(node.line, format!("<{}> must not be empty", node.name));
            None
        } else {
            Some(text)
        }
    }

    /// Check `node`'s children against its content model. Returns `false`
    /// if any violation was reported.
    fn check_content(&mut self, node: &Node) -> bool {
        let Some(rules) = self.grammar.content(&node.name) else {
            return true;
        };
        let names: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
        let violations = check_sequence(rules, &names);
        for violation in &violations {
            let (index, message) = match violation {
                SequenceViolation::Missing { expected, index } => (
                    *index,
                    format!("<{}> is missing required <{expected}>", node.name),
                ),
                SequenceViolation::TooMany { name, index } => {
                    (*index, format!("too many <{name}> in <{}>", node.name))
                }
                SequenceViolation::OutOfOrder { name, index } => {
                    (*index, format!("<{name}> is out of order in <{}>", node.name))
                }
                SequenceViolation::Unexpected { name, index } => (
                    *index,
                    format!("<{name}> is not allowed in <{}> ({})", node.name, self.grammar),
                ),
            };
            let line = node.children.get(index).map_or(node.line, |c| c.line);
            self.report.error(line, message);
        }
        violations.is_empty()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{WEB_23_PUBLIC, WEB_23_SYSTEM};

    fn read(text: &str) -> (WebXml, ValidationReport) {
        let mut model = WebXml::new();
        let report = read_document(text, &mut model).unwrap();
        (model, report)
    }

    fn messages(report: &ValidationReport) -> Vec<&str> {
        report.errors.iter().map(|d| d.message.as_str()).collect()
    }

    const APP_31: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://xmlns.jcp.org/xml/ns/javaee http://xmlns.jcp.org/xml/ns/javaee/web-app_3_1.xsd"
         version="3.1">
  <distributable/>
  <context-param>
    <param-name>mode</param-name>
    <param-value>prod</param-value>
  </context-param>
  <servlet>
    <servlet-name>api</servlet-name>
    <servlet-class>org.example.Api</servlet-class>
    <init-param>
      <param-name>debug</param-name>
      <param-value>0</param-value>
    </init-param>
    <load-on-startup>1</load-on-startup>
    <async-supported>true</async-supported>
  </servlet>
  <servlet-mapping>
    <servlet-name>api</servlet-name>
    <url-pattern>/api/*</url-pattern>
    <url-pattern>/v1/*</url-pattern>
  </servlet-mapping>
  <mime-mapping>
    <extension>json</extension>
    <mime-type>application/json</mime-type>
  </mime-mapping>
  <welcome-file-list>
    <welcome-file>index.html</welcome-file>
  </welcome-file-list>
  <locale-encoding-mapping-list>
    <locale-encoding-mapping>
      <locale>ja</locale>
      <encoding>Shift_JIS</encoding>
    </locale-encoding-mapping>
  </locale-encoding-mapping-list>
  <post-construct>
    <lifecycle-callback-class>org.example.Init</lifecycle-callback-class>
    <lifecycle-callback-method>start</lifecycle-callback-method>
  </post-construct>
  <filter>
    <filter-name>ignored</filter-name>
  </filter>
</web-app>
"#;

    #[test]
    fn reads_schema_document() {
        let (model, report) = read(APP_31);
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.kind, Some(DocumentKind::Application));
        assert_eq!(report.version, Some(SpecVersion::V3_1));
        assert!(model.is_distributable());
        assert_eq!(model.context_params()["mode"], "prod");
        let api = model.servlet("api").unwrap();
        assert_eq!(api.target(), Some(&ServletTarget::Class("org.example.Api".into())));
        assert_eq!(api.init_params()["debug"], "0");
        assert_eq!(api.load_on_startup(), Some(1));
        assert_eq!(api.async_supported(), Some(true));
        assert_eq!(model.servlet_mappings().len(), 2);
        assert_eq!(model.mime_mappings()["json"], "application/json");
        assert_eq!(model.welcome_files(), ["index.html"]);
        assert_eq!(model.locale_encoding_mappings()["ja"], "Shift_JIS");
        assert_eq!(model.post_construct_methods()["org.example.Init"], "start");
    }

    #[test]
    fn reads_dtd_document() {
        let text = format!(
            r#"<!DOCTYPE web-app PUBLIC "{WEB_23_PUBLIC}" "{WEB_23_SYSTEM}">
<web-app>
  <servlet>
    <servlet-name>index</servlet-name>
    <jsp-file>/index.jsp</jsp-file>
  </servlet>
  <servlet-mapping>
    <servlet-name>index</servlet-name>
    <url-pattern>/</url-pattern>
  </servlet-mapping>
</web-app>"#
        );
        let (model, report) = read(&text);
        assert!(report.is_clean(), "{report}");
        assert_eq!(model.version_string(), "2.3");
        assert_eq!(model.public_id(), Some(WEB_23_PUBLIC));
        assert_eq!(
            model.servlet("index").unwrap().target(),
            Some(&ServletTarget::JspFile("/index.jsp".into()))
        );
    }

    #[test]
    fn dtd_order_is_enforced() {
        let text = format!(
            r#"<!DOCTYPE web-app PUBLIC "{WEB_23_PUBLIC}" "{WEB_23_SYSTEM}">
<web-app>
  <mime-mapping><extension>a</extension><mime-type>b</mime-type></mime-mapping>
  <context-param><param-name>k</param-name><param-value>v</param-value></context-param>
</web-app>"#
        );
        let (_, report) = read(&text);
        assert_eq!(messages(&report), vec!["<context-param> must appear before <mime-mapping>"]);
        assert_eq!(report.errors[0].line, 4);
    }

    #[test]
    fn version_attribute_rejected_in_dtd_document() {
        let text = format!(
            r#"<!DOCTYPE web-app PUBLIC "{WEB_23_PUBLIC}" "{WEB_23_SYSTEM}">
<web-app version="2.3"/>"#
        );
        let (_, report) = read(&text);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn missing_and_unknown_versions_fall_back() {
        let (model, report) = read(r#"<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee"/>"#);
        assert_eq!(messages(&report), vec!["missing version attribute; assuming 3.1"]);
        assert_eq!(report.version, None);
        assert_eq!(model.version_string(), "3.1");

        let mut model = WebXml::new();
        model.set_version(Some("2.5"));
        let report = read_document(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee" version="9.9"/>"#,
            &mut model,
        )
        .unwrap();
        assert_eq!(messages(&report), vec!["unrecognized version '9.9'; assuming 3.1"]);
        // The model keeps its version.
        assert_eq!(model.version_string(), "2.5");
    }

    #[test]
    fn namespace_must_match_version() {
        let (_, report) =
            read(r#"<web-app xmlns="http://java.sun.com/xml/ns/j2ee" version="3.0"/>"#);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.contains("does not match version 3.0"));
    }

    #[test]
    fn schema_location_mismatch_warns() {
        let (_, report) = read(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee"
                 xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                 xsi:schemaLocation="http://java.sun.com/xml/ns/javaee http://java.sun.com/xml/ns/javaee/web-app_2_5.xsd"
                 version="3.0"/>"#,
        );
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn element_availability_and_unknown_elements() {
        let (_, report) = read(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/j2ee" version="2.4">
  <post-construct>
    <lifecycle-callback-class>A</lifecycle-callback-class>
    <lifecycle-callback-method>m</lifecycle-callback-method>
  </post-construct>
  <bogus/>
</web-app>"#,
        );
        assert_eq!(
            messages(&report),
            vec![
                "<post-construct> is not allowed in a web-app 2.4 document",
                "unknown element <bogus>",
            ]
        );
        assert_eq!(report.errors[1].line, 6);
    }

    #[test]
    fn servlet_value_checks() {
        let (model, report) = read(
            r#"<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="3.1">
  <servlet>
    <servlet-name>bad</servlet-name>
    <servlet-class>A</servlet-class>
    <load-on-startup>soon</load-on-startup>
    <async-supported>maybe</async-supported>
  </servlet>
  <servlet>
    <servlet-name>both</servlet-name>
    <servlet-class>B</servlet-class>
    <jsp-file>/b.jsp</jsp-file>
  </servlet>
</web-app>"#,
        );
        assert_eq!(
            messages(&report),
            vec![
                "<load-on-startup> must be an integer, found 'soon'",
                "<async-supported> must be true or false, found 'maybe'",
                "too many <jsp-file> in <servlet>",
            ]
        );
        assert!(model.servlet("bad").is_some());
        assert!(model.servlet("both").is_none());
    }

    #[test]
    fn servlet_without_target_from_30() {
        let (model, report) = read(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee" version="3.0">
  <servlet>
    <servlet-name>jsp</servlet-name>
    <init-param>
      <param-name>development</param-name>
      <param-value>false</param-value>
    </init-param>
  </servlet>
</web-app>"#,
        );
        assert!(report.is_clean(), "{report}");
        let jsp = model.servlet("jsp").unwrap();
        assert_eq!(jsp.target(), None);
        assert_eq!(jsp.init_params()["development"], "false");
    }

    #[test]
    fn servlet_target_required_before_30() {
        let (model, report) = read(
            r#"<web-app xmlns="http://java.sun.com/xml/ns/javaee" version="2.5">
  <servlet>
    <servlet-name>jsp</servlet-name>
  </servlet>
</web-app>"#,
        );
        assert_eq!(
            messages(&report),
            vec!["<servlet> is missing required <servlet-class|jsp-file>"]
        );
        assert_eq!(report.errors[0].line, 2);
        assert!(model.servlet("jsp").is_none());
    }

    #[test]
    fn sequence_violations_skip_population() {
        let (model, report) = read(
            r#"<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="3.1">
  <mime-mapping>
    <mime-type>text/plain</mime-type>
    <extension>txt</extension>
  </mime-mapping>
  <welcome-file-list>
    <welcome-file>  </welcome-file>
  </welcome-file-list>
</web-app>"#,
        );
        assert_eq!(
            messages(&report),
            vec![
                "<mime-mapping> is missing required <extension>",
                "<extension> is out of order in <mime-mapping>",
                "<welcome-file> must not be empty",
            ]
        );
        assert!(model.mime_mappings().is_empty());
        assert!(model.welcome_files().is_empty());
    }

    #[test]
    fn once_elements_and_directives() {
        let (model, report) = read(
            r#"<web-fragment xmlns="http://java.sun.com/xml/ns/javaee" version="3.0">
  <name>lib</name>
  <name>again</name>
  <ordering><after><others/></after></ordering>
</web-fragment>"#,
        );
        assert_eq!(messages(&report), vec!["<name> may appear only once"]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(model.name(), Some("lib"));
    }

    #[test]
    fn fragment_requires_three_zero() {
        let (_, report) =
            read(r#"<web-fragment xmlns="http://java.sun.com/xml/ns/javaee" version="2.5"/>"#);
        assert_eq!(messages(&report), vec!["<web-fragment> requires version 3.0 or later"]);
    }

    #[test]
    fn dangling_mapping_warns() {
        let (_, report) = read(
            r#"<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="3.1">
  <servlet-mapping>
    <servlet-name>ghost</servlet-name>
    <url-pattern>/x</url-pattern>
  </servlet-mapping>
</web-app>"#,
        );
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line, 2);
    }

    #[test]
    fn duplicate_pattern_is_a_hard_error_and_model_is_untouched() {
        let mut model = WebXml::new();
        let err = read_document(
            r#"<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="3.1">
  <context-param><param-name>k</param-name><param-value>v</param-value></context-param>
  <servlet-mapping><servlet-name>a</servlet-name><url-pattern>/x</url-pattern></servlet-mapping>
  <servlet-mapping><servlet-name>b</servlet-name><url-pattern>/x</url-pattern></servlet-mapping>
</web-app>"#,
            &mut model,
        )
        .unwrap_err();
        assert!(err.is_invalid_configuration());
        assert!(model.context_params().is_empty());
    }

    #[test]
    fn malformed_documents_are_errors() {
        let mut model = WebXml::new();
        assert!(read_document("<web-app><servlet></web-app>", &mut model).is_err());
        assert!(read_document("", &mut model).is_err());
        assert!(read_document("<web-app/><web-app/>", &mut model).is_err());
    }

    #[test]
    fn wrong_root_is_reported() {
        let (_, report) = read("<beans/>");
        assert_eq!(report.kind, None);
        assert_eq!(
            messages(&report),
            vec!["root element must be <web-app> or <web-fragment>, found <beans>"]
        );
    }

    #[test]
    fn doctype_literals() {
        let d = Doctype::parse(r#" web-app PUBLIC "-//A//B" 'http://x/y.dtd'"#);
        assert_eq!(d.root, "web-app");
        assert_eq!(d.public_id.as_deref(), Some("-//A//B"));
        assert_eq!(d.system_id.as_deref(), Some("http://x/y.dtd"));
    }
}

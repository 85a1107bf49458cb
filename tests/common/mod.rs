//! Shared test helpers for webxml integration tests.
//!
//! All tests use temp directories, never the real working tree.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Create a fresh temp directory for descriptor files.
pub fn setup_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Write `content` to `<dir>/<rel_path>`, creating parent directories.
pub fn write_file(dir: &Path, rel_path: &str, content: &str) -> PathBuf {
    let path = dir.join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dirs");
    }
    std::fs::write(&path, content).expect("failed to write file");
    path
}

/// A 3.1 `<web-app>` document wrapping `body`.
pub fn app_31(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://xmlns.jcp.org/xml/ns/javaee http://xmlns.jcp.org/xml/ns/javaee/web-app_3_1.xsd"
         version="3.1">
{body}
</web-app>
"#
    )
}

/// A 3.1 `<web-fragment>` document wrapping `body`.
pub fn fragment_31(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<web-fragment xmlns="http://xmlns.jcp.org/xml/ns/javaee"
              xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
              xsi:schemaLocation="http://xmlns.jcp.org/xml/ns/javaee http://xmlns.jcp.org/xml/ns/javaee/web-fragment_3_1.xsd"
              version="3.1">
{body}
</web-fragment>
"#
    )
}

/// `<servlet>` plus `<servlet-mapping>` for one class-backed servlet.
pub fn servlet(name: &str, class: &str, pattern: &str) -> String {
    format!(
        "<servlet><servlet-name>{name}</servlet-name><servlet-class>{class}</servlet-class></servlet>\n\
         <servlet-mapping><servlet-name>{name}</servlet-name><url-pattern>{pattern}</url-pattern></servlet-mapping>"
    )
}

/// `<context-param>` element.
pub fn context_param(name: &str, value: &str) -> String {
    format!("<context-param><param-name>{name}</param-name><param-value>{value}</param-value></context-param>")
}

/// Run webxml with the given args in the given directory.
///
/// `WEBXML_CONFIG` is cleared so the host environment cannot leak in.
pub fn webxml_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_webxml"))
        .args(args)
        .current_dir(dir)
        .env_remove("WEBXML_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute webxml")
}

/// Run webxml and assert it succeeds. Returns stdout as string.
pub fn webxml_ok(dir: &Path, args: &[&str]) -> String {
    let out = webxml_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "webxml {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run webxml and assert it fails. Returns stderr as string.
pub fn webxml_fails(dir: &Path, args: &[&str]) -> String {
    let out = webxml_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected webxml {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

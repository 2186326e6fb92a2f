//! Output file naming, file preambles, stale-file removal and writes.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::render::Rendered;
use crate::templates::TemplateKind;

use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;

/// First line of every generated file
pub const DISCLAIMER: &str = "// Code generated by clientgen. DO NOT EDIT.";

/// The frontend client class
pub const CLIENT_FILE: &str = "client.gen.ts";

/// Bootstrap and re-export module of a frontend directory
pub const INDEX_FILE: &str = "index.ts";

/// Names this generator owns; anything else in an output directory is left alone
static GENERATED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:op|type|core)\.[A-Za-z0-9_]+\.gen(?:_test|\.mock)?|client\.gen)\.(?:go|ts)$")
        .expect("generated file name pattern is valid")
});

/// A file ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

pub fn operation_file_name(operation_id: &str, kind: TemplateKind) -> String {
    format!("op.{}.gen.{}", operation_id, kind.extension())
}

pub fn test_file_name(operation_id: &str, kind: TemplateKind) -> String {
    format!("op.{}.gen_test.{}", operation_id, kind.extension())
}

pub fn mock_file_name(operation_id: &str) -> String {
    format!("op.{}.gen.mock.ts", operation_id)
}

pub fn type_file_name(type_name: &str, kind: TemplateKind) -> String {
    format!("type.{}.gen.{}", type_name, kind.extension())
}

/// `core.<name>.gen.<ext>`; Go files only compiled into tests take the `_test` suffix
pub fn static_file_name(name: &str, kind: TemplateKind, test_only: bool) -> String {
    if test_only && kind == TemplateKind::Golang {
        format!("core.{}.gen_test.go", name)
    } else {
        format!("core.{}.gen.{}", name, kind.extension())
    }
}

/// Whether `file_name` follows one of the generated naming patterns
pub fn is_generated_name(file_name: &str) -> bool {
    GENERATED_NAME_RE.is_match(file_name)
}

/// Disclaimer, package clause, import block, body
pub fn go_source(package_name: &str, rendered: &Rendered) -> String {
    let mut out = format!("{}\n\npackage {}\n\n", DISCLAIMER, package_name);
    let imports = rendered.imports.render_go();
    if !imports.is_empty() {
        out.push_str(&imports);
        out.push('\n');
    }
    out.push_str(rendered.body.trim_end());
    out.push('\n');
    out
}

/// Disclaimer, import lines, body
pub fn ts_source(rendered: &Rendered) -> String {
    let mut out = format!("{}\n\n", DISCLAIMER);
    let imports = rendered.imports.render_typescript();
    if !imports.is_empty() {
        out.push_str(&imports);
        out.push('\n');
    }
    out.push_str(rendered.body.trim_end());
    out.push('\n');
    out
}

/// Static templates carry their own preamble; only the disclaimer is added
pub fn static_source(body: &str) -> String {
    format!("{}\n\n{}\n", DISCLAIMER, body.trim_end())
}

/// Create `dir` if needed and delete generated files a previous run left in it
pub async fn remove_stale(dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).await?;

    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().map_or(false, is_generated_name) {
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    log::debug!("Removed {} stale file(s) from {}", removed, dir.display());
    Ok(removed)
}

/// Write every file concurrently, creating parent directories as needed
pub async fn write_all(files: &[GeneratedFile]) -> Result<usize> {
    try_join_all(files.iter().map(write_file)).await?;
    Ok(files.len())
}

async fn write_file(file: &GeneratedFile) -> Result<()> {
    let write_error = |source| Error::Write {
        path: file.path.clone(),
        source,
    };

    if let Some(parent) = file.path.parent() {
        fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    fs::write(&file.path, &file.contents)
        .await
        .map_err(write_error)?;

    log::debug!("Wrote {}", file.path.display());
    Ok(())
}

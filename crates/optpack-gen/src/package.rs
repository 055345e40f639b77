use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// A set of parsed source files sharing one module identity.
///
/// The analyzer depends only on this shape, so tests can hand it syntax trees
/// without touching the filesystem.
pub trait Package {
    fn name(&self) -> &str;
    fn path(&self) -> &str;
    fn syntax(&self) -> &[syn::File];
}

#[derive(Debug, Clone)]
pub struct SourcePackage {
    name: String,
    path: String,
    files: Vec<PathBuf>,
    syntax: Vec<syn::File>,
}

impl SourcePackage {
    /// Parses every `*.rs` file directly inside `dir`, in file-name order.
    /// Subdirectories are not descended into.
    pub fn load(dir: &Path, name: Option<&str>) -> Result<Self> {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read package dir: {}", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("read package dir: {}", dir.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
                files.push(path);
            }
        }
        files.sort();

        let mut syntax = Vec::with_capacity(files.len());
        for path in &files {
            let src = std::fs::read_to_string(path)
                .with_context(|| format!("read Rust source: {}", path.display()))?;
            syntax.push(parse_source(&path.display().to_string(), &src)?);
        }

        let name = match name {
            Some(name) => name.to_string(),
            None => default_package_name(dir)?,
        };
        tracing::debug!(package = %name, dir = %dir.display(), files = files.len(), "loaded package");

        Ok(SourcePackage {
            name,
            path: dir.display().to_string(),
            files,
            syntax,
        })
    }

    /// Builds a package from in-memory `(label, source)` pairs.
    pub fn from_sources(name: &str, path: &str, sources: &[(&str, &str)]) -> Result<Self> {
        let mut files = Vec::with_capacity(sources.len());
        let mut syntax = Vec::with_capacity(sources.len());
        for (label, src) in sources {
            files.push(PathBuf::from(label));
            syntax.push(parse_source(label, src)?);
        }
        Ok(SourcePackage {
            name: name.to_string(),
            path: path.to_string(),
            files,
            syntax,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Package for SourcePackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn syntax(&self) -> &[syn::File] {
        &self.syntax
    }
}

fn parse_source(label: &str, src: &str) -> Result<syn::File> {
    syn::parse_file(src).map_err(|e| {
        anyhow::Error::new(Diagnostic::error(
            DiagnosticCode::OPG0001ParseError,
            format!("{label}: {e}"),
        ))
        .context("optpack-gen parse failed")
    })
}

/// Directory name with `-` mapped to `_`.
pub fn default_package_name(dir: &Path) -> Result<String> {
    let abs = dir
        .canonicalize()
        .with_context(|| format!("resolve package dir: {}", dir.display()))?;
    let base = abs
        .file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("package dir has no usable name: {}", abs.display()))?;
    Ok(base.replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_top_level_rs_files_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("b.rs"), "pub struct B;").expect("write");
        std::fs::write(dir.path().join("a.rs"), "pub struct A;").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "not rust").expect("write");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
        std::fs::write(dir.path().join("nested/c.rs"), "pub struct C;").expect("write");

        let pkg = SourcePackage::load(dir.path(), Some("fixture")).expect("load");
        assert_eq!(pkg.name(), "fixture");
        assert_eq!(pkg.syntax().len(), 2);
        let names: Vec<_> = pkg
            .files()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn default_name_maps_dashes() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = root.path().join("my-types");
        std::fs::create_dir(&dir).expect("mkdir");
        let pkg = SourcePackage::load(&dir, None).expect("load");
        assert_eq!(pkg.name(), "my_types");
        assert!(pkg.syntax().is_empty());
    }

    #[test]
    fn parse_errors_carry_diagnostic() {
        let err = SourcePackage::from_sources("p", "p", &[("broken.rs", "struct {")]).unwrap_err();
        let d = err.downcast_ref::<Diagnostic>().expect("diagnostic");
        assert_eq!(d.code, DiagnosticCode::OPG0001ParseError);
        assert!(d.message.starts_with("broken.rs: "));
    }
}

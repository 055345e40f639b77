use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use optpack_contracts::{
    DEFAULT_RUNTIME_CRATE, EXTERNAL_PATH_SEPARATOR, GENERATED_FILE_SUFFIX, GENERATED_HEADER,
    MARSHAL_METHOD, OPTIONAL_TYPE_PREFIX, UNMARSHAL_METHOD, VALUE_NOT_SET,
};
use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::template::{render, OPTIONAL_EXT_TEMPLATE, OPTIONAL_EXT_TEST_TEMPLATE};
use crate::util::{sha256_hex, snake_case};

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Target type. A `::`-qualified name is external to the analyzed package.
    pub type_name: String,
    /// Must fit in `i8`; kept wide so out-of-range requests can be reported.
    pub ext_code: i64,
    pub package_name: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub custom_marshal_func: Option<String>,
    #[serde(default)]
    pub custom_unmarshal_func: Option<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default = "default_emit_tests")]
    pub emit_tests: bool,
    #[serde(default = "default_runtime_crate")]
    pub runtime_crate: String,
    #[serde(default)]
    pub derives: Vec<String>,
}

fn default_emit_tests() -> bool {
    true
}

fn default_runtime_crate() -> String {
    DEFAULT_RUNTIME_CRATE.to_string()
}

impl GenerateOptions {
    pub fn new(type_name: &str, ext_code: i64, package_name: &str) -> Self {
        GenerateOptions {
            type_name: type_name.to_string(),
            ext_code,
            package_name: package_name.to_string(),
            imports: Vec::new(),
            custom_marshal_func: None,
            custom_unmarshal_func: None,
            force: false,
            emit_tests: default_emit_tests(),
            runtime_crate: default_runtime_crate(),
            derives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub type_name: String,
    pub source: String,
}

/// `geo::Point<u8>` -> `Point`.
pub fn unqualified_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name).trim();
    base.rsplit(EXTERNAL_PATH_SEPARATOR).next().unwrap_or(base).trim()
}

pub fn construct_type_name(type_name: &str) -> String {
    format!("{OPTIONAL_TYPE_PREFIX}{}", unqualified_name(type_name))
}

pub fn construct_file_name(type_name: &str) -> String {
    format!(
        "{}{GENERATED_FILE_SUFFIX}",
        snake_case(unqualified_name(type_name))
    )
}

pub fn check_ext_code(code: i64) -> Option<i8> {
    i8::try_from(code).ok()
}

/// Qualified names refer to types outside the analyzed package; their methods
/// cannot be checked.
pub fn is_external_dep(type_name: &str) -> bool {
    type_name
        .split('<')
        .next()
        .is_some_and(|base| base.contains(EXTERNAL_PATH_SEPARATOR))
}

/// Validates `opts` against `analyzer` and renders the specialized type.
///
/// Nothing is rendered unless every check passes. Errors carry a [`Diagnostic`].
pub fn generate(opts: &GenerateOptions, analyzer: &Analyzer) -> Result<GeneratedFile> {
    let Some(ext_code) = check_ext_code(opts.ext_code) else {
        anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0100ExtCodeOutOfRange,
            format!("invalid extension code: {}", opts.ext_code),
        ));
    };

    let type_name = opts.type_name.trim();
    check_type_name(type_name)?;
    let imports = normalize_imports(&opts.imports)?;
    let runtime = check_path(&opts.runtime_crate, "runtime crate")?;
    let marshal_func = opts
        .custom_marshal_func
        .as_deref()
        .map(|f| check_path(f, "marshal function"))
        .transpose()?;
    let unmarshal_func = opts
        .custom_unmarshal_func
        .as_deref()
        .map(|f| check_path(f, "unmarshal function"))
        .transpose()?;
    let derives = opts
        .derives
        .iter()
        .map(|d| check_path(d, "derive"))
        .collect::<Result<Vec<_>>>()?;

    if is_external_dep(type_name) {
        tracing::info!(type_name, "qualified type name, skipping method checks");
    } else {
        let local = unqualified_name(type_name);
        let Some(entry) = analyzer.entry(local) else {
            anyhow::bail!(Diagnostic::error(
                DiagnosticCode::OPG0101TypeNotFound,
                format!(
                    "failed to find type {local} in package {}",
                    analyzer.package_name()
                ),
            ));
        };
        if !opts.force && !(entry.has_method(MARSHAL_METHOD) && entry.has_method(UNMARSHAL_METHOD))
        {
            anyhow::bail!(Diagnostic::error(
                DiagnosticCode::OPG0102MissingCodecMethods,
                format!("failed to find {MARSHAL_METHOD} or {UNMARSHAL_METHOD} method for type {local}"),
            ));
        }
    }

    let name = construct_type_name(type_name);
    let digest = request_digest(opts, &imports)?;
    tracing::debug!(type_name, optional = %name, ext_code, digest = %digest, "rendering");

    let mut import_lines = String::new();
    for import in &imports {
        import_lines.push_str(&format!("use {import};\n"));
    }
    if marshal_func.is_none() || unmarshal_func.is_none() {
        import_lines.push_str(&format!(
            "#[allow(unused_imports)]\nuse {runtime}::MsgpackExt as _;\n"
        ));
    }
    if !import_lines.is_empty() {
        import_lines.insert(0, '\n');
    }

    let marshal_expr = match marshal_func {
        Some(f) => format!("{f}(&self.value)"),
        None => format!("self.value.{MARSHAL_METHOD}()"),
    };
    let unmarshal_expr = match unmarshal_func {
        Some(f) => format!("{f}(&mut self.value, payload)"),
        None => format!("self.value.{UNMARSHAL_METHOD}(payload)"),
    };
    let derive_attr = if derives.is_empty() {
        String::new()
    } else {
        format!("#[derive({})]\n", derives.join(", "))
    };

    let mut vars: BTreeMap<&str, String> = BTreeMap::new();
    vars.insert(
        "Header",
        format!(
            "{GENERATED_HEADER}\n// package: {} request: sha256:{digest}",
            opts.package_name
        ),
    );
    vars.insert("Imports", import_lines);
    vars.insert("Rt", runtime.to_string());
    vars.insert("Name", name.clone());
    vars.insert("Type", type_name.to_string());
    vars.insert("ExtCode", ext_code.to_string());
    vars.insert("OtherExtCode", ext_code.wrapping_add(1).to_string());
    vars.insert("Derives", derive_attr);
    vars.insert("MarshalExpr", marshal_expr);
    vars.insert("UnmarshalExpr", unmarshal_expr);
    vars.insert("NotSet", VALUE_NOT_SET.to_string());
    vars.insert(
        "TestMod",
        format!("{}_gen_tests", snake_case(unqualified_name(type_name))),
    );

    let mut source = render(OPTIONAL_EXT_TEMPLATE, &vars).context("render optional type")?;
    if opts.emit_tests {
        source.push_str(&render(OPTIONAL_EXT_TEST_TEMPLATE, &vars).context("render tests")?);
    }

    if let Err(e) = syn::parse_file(&source) {
        anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0201RenderedSourceInvalid,
            format!("{name}: {e}"),
        ));
    }

    Ok(GeneratedFile {
        file_name: construct_file_name(type_name),
        type_name: name,
        source,
    })
}

fn check_type_name(type_name: &str) -> Result<()> {
    match syn::parse_str::<syn::TypePath>(type_name) {
        Ok(tp) if tp.qself.is_none() => Ok(()),
        Ok(_) => anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0103InvalidTypeName,
            format!("qualified self types are not supported: {type_name:?}"),
        )),
        Err(e) => anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0103InvalidTypeName,
            format!("{type_name:?}: {e}"),
        )),
    }
}

fn check_path<'a>(path: &'a str, what: &str) -> Result<&'a str> {
    let path = path.trim();
    if let Err(e) = syn::parse_str::<syn::Path>(path) {
        anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0105InvalidPath,
            format!("{what} {path:?}: {e}"),
        ));
    }
    Ok(path)
}

/// Trimmed, deduplicated and sorted; each must parse as a `use` tree.
fn normalize_imports(imports: &[String]) -> Result<Vec<String>> {
    let mut out: BTreeSet<String> = BTreeSet::new();
    for import in imports {
        let import = import.trim().trim_end_matches(';').trim();
        if let Err(e) = syn::parse_str::<syn::UseTree>(import) {
            anyhow::bail!(Diagnostic::error(
                DiagnosticCode::OPG0104InvalidImport,
                format!("{import:?}: {e}"),
            ));
        }
        out.insert(import.to_string());
    }
    Ok(out.into_iter().collect())
}

fn request_digest(opts: &GenerateOptions, imports: &[String]) -> Result<String> {
    let mut canonical = opts.clone();
    canonical.type_name = canonical.type_name.trim().to_string();
    canonical.imports = imports.to_vec();
    let bytes = serde_json::to_vec(&canonical).context("encode generation request")?;
    Ok(sha256_hex(&bytes))
}

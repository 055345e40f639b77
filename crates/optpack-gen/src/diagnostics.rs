use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Validate,
    Render,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    OPG0001ParseError,
    OPG0100ExtCodeOutOfRange,
    OPG0101TypeNotFound,
    OPG0102MissingCodecMethods,
    OPG0103InvalidTypeName,
    OPG0104InvalidImport,
    OPG0105InvalidPath,
    OPG0200TemplateError,
    OPG0201RenderedSourceInvalid,
    OPG0901InternalBug,
}

impl DiagnosticCode {
    pub fn code_str(self) -> &'static str {
        match self {
            DiagnosticCode::OPG0001ParseError => "OPG0001",
            DiagnosticCode::OPG0100ExtCodeOutOfRange => "OPG0100",
            DiagnosticCode::OPG0101TypeNotFound => "OPG0101",
            DiagnosticCode::OPG0102MissingCodecMethods => "OPG0102",
            DiagnosticCode::OPG0103InvalidTypeName => "OPG0103",
            DiagnosticCode::OPG0104InvalidImport => "OPG0104",
            DiagnosticCode::OPG0105InvalidPath => "OPG0105",
            DiagnosticCode::OPG0200TemplateError => "OPG0200",
            DiagnosticCode::OPG0201RenderedSourceInvalid => "OPG0201",
            DiagnosticCode::OPG0901InternalBug => "OPG0901",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            DiagnosticCode::OPG0001ParseError => Phase::Parse,
            DiagnosticCode::OPG0200TemplateError | DiagnosticCode::OPG0201RenderedSourceInvalid => {
                Phase::Render
            }
            DiagnosticCode::OPG0901InternalBug => Phase::Internal,
            _ => Phase::Validate,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            DiagnosticCode::OPG0001ParseError => "failed to parse source file",
            DiagnosticCode::OPG0100ExtCodeOutOfRange => "extension code out of range",
            DiagnosticCode::OPG0101TypeNotFound => "type not found in package",
            DiagnosticCode::OPG0102MissingCodecMethods => {
                "type is missing marshal_msgpack or unmarshal_msgpack"
            }
            DiagnosticCode::OPG0103InvalidTypeName => "invalid type name",
            DiagnosticCode::OPG0104InvalidImport => "invalid import path",
            DiagnosticCode::OPG0105InvalidPath => "invalid path argument",
            DiagnosticCode::OPG0200TemplateError => "template render error",
            DiagnosticCode::OPG0201RenderedSourceInvalid => "generated source does not parse",
            DiagnosticCode::OPG0901InternalBug => "internal optpack-gen bug",
        }
    }

    pub fn default_help(self) -> Option<&'static str> {
        match self {
            DiagnosticCode::OPG0001ParseError => {
                Some("Ensure every *.rs file in the package directory parses as Rust.")
            }
            DiagnosticCode::OPG0100ExtCodeOutOfRange => {
                Some("Extension codes must be in range [-128, 127].")
            }
            DiagnosticCode::OPG0102MissingCodecMethods => Some(
                "Implement both methods on the type, pass --marshal-func/--unmarshal-func, or pass --force.",
            ),
            DiagnosticCode::OPG0201RenderedSourceInvalid | DiagnosticCode::OPG0901InternalBug => {
                Some("This is a bug in optpack-gen. Please report it with the generation request.")
            }
            _ => None,
        }
    }
}

/// A generator failure. Attached to `anyhow::Error` as the root cause, so callers
/// can recover it with `downcast_ref::<Diagnostic>()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            phase: code.phase(),
            severity: Severity::Error,
            message: message.into(),
            help: code.default_help().map(|s| s.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?}: {}",
            self.code.code_str(),
            self.phase,
            self.severity,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

pub fn render_diagnostics_md() -> String {
    let mut rows: Vec<(&'static str, Phase, Severity, &'static str, &'static str)> = all_codes()
        .iter()
        .map(|&code| {
            (
                code.code_str(),
                code.phase(),
                Severity::Error,
                code.default_message(),
                code.default_help().unwrap_or(""),
            )
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    out.push_str("# optpack-gen diagnostics catalog\n\n");
    out.push_str("This document is generated from `crates/optpack-gen/src/diagnostics.rs`.\n\n");
    out.push_str("| Code | Phase | Severity | Message | Help |\n");
    out.push_str("| ---- | ----- | -------- | ------- | ---- |\n");
    for (code, phase, sev, msg, help) in rows {
        out.push_str(&format!(
            "| {code} | {phase:?} | {sev:?} | {msg} | {help} |\n"
        ));
    }
    out
}

fn all_codes() -> &'static [DiagnosticCode] {
    &[
        DiagnosticCode::OPG0001ParseError,
        DiagnosticCode::OPG0100ExtCodeOutOfRange,
        DiagnosticCode::OPG0101TypeNotFound,
        DiagnosticCode::OPG0102MissingCodecMethods,
        DiagnosticCode::OPG0103InvalidTypeName,
        DiagnosticCode::OPG0104InvalidImport,
        DiagnosticCode::OPG0105InvalidPath,
        DiagnosticCode::OPG0200TemplateError,
        DiagnosticCode::OPG0201RenderedSourceInvalid,
        DiagnosticCode::OPG0901InternalBug,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_help() {
        let d = Diagnostic::error(DiagnosticCode::OPG0100ExtCodeOutOfRange, "got 200");
        assert_eq!(d.phase, Phase::Validate);
        assert_eq!(
            d.to_string(),
            "OPG0100 Validate Error: got 200\n  help: Extension codes must be in range [-128, 127]."
        );
    }

    #[test]
    fn downcast_through_anyhow() {
        let err: anyhow::Error = Diagnostic::error(DiagnosticCode::OPG0101TypeNotFound, "Foo").into();
        let err = err.context("generate OptionalFoo");
        let d = err.downcast_ref::<Diagnostic>().expect("diagnostic");
        assert_eq!(d.code, DiagnosticCode::OPG0101TypeNotFound);
    }

    #[test]
    fn catalog_lists_every_code() {
        let md = render_diagnostics_md();
        for code in all_codes() {
            assert!(md.contains(code.code_str()), "missing {}", code.code_str());
        }
        assert!(md.starts_with("# optpack-gen diagnostics catalog"));
    }
}

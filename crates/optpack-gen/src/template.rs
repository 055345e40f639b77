use std::collections::BTreeMap;

use anyhow::Result;

use crate::diagnostics::{Diagnostic, DiagnosticCode};

pub(crate) const OPTIONAL_EXT_TEMPLATE: &str = include_str!("templates/optional_ext.rs.tpl");
pub(crate) const OPTIONAL_EXT_TEST_TEMPLATE: &str =
    include_str!("templates/optional_ext_test.rs.tpl");

/// Replaces every `{{Key}}` with its value. Values are inserted verbatim and never
/// rescanned. A key missing from `vars` is an error.
pub(crate) fn render(template: &str, vars: &BTreeMap<&str, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            anyhow::bail!(Diagnostic::error(
                DiagnosticCode::OPG0200TemplateError,
                "unterminated placeholder",
            ));
        };
        let key = after[..end].trim();
        let Some(value) = vars.get(key) else {
            anyhow::bail!(Diagnostic::error(
                DiagnosticCode::OPG0200TemplateError,
                format!("unknown template key {key:?}"),
            ));
        };
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

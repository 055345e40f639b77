//! Source analysis and code generation for extension-coded optional types.
//!
//! [`Analyzer`] walks the syntax trees of a [`Package`] and records which functions
//! each declared type carries. [`generate`] uses that record to validate a
//! [`GenerateOptions`] request and renders a monomorphized `Optional<Type>` that
//! speaks the `optpack` extension wire protocol.

pub mod analyzer;
pub mod diagnostics;
mod extract;
pub mod generator;
pub mod package;
pub mod receiver;
mod template;
mod util;

pub use analyzer::{Analyzer, DeclEntry};
pub use diagnostics::{render_diagnostics_md, Diagnostic, DiagnosticCode, Phase, Severity};
pub use generator::{
    check_ext_code, construct_file_name, construct_type_name, generate, is_external_dep,
    unqualified_name, GenerateOptions, GeneratedFile,
};
pub use package::{default_package_name, Package, SourcePackage};
pub use receiver::{BareReceiverNormalizer, ReceiverNormalizer, RustReceiverNormalizer};

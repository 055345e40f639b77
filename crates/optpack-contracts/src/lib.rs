//! Shared, version-pinned identifiers.
//!
//! These constants are the single source of truth for strings that appear both in
//! the runtime and in source emitted by `optpack-gen`. Changing any of them changes
//! generated output, so the manifest schema version must be bumped alongside.

pub const GENERATED_HEADER: &str = "// Code generated by optpack-gen; DO NOT EDIT.";
pub const GENERATED_FILE_SUFFIX: &str = "_gen.rs";

pub const OPTIONAL_TYPE_PREFIX: &str = "Optional";

pub const MARSHAL_METHOD: &str = "marshal_msgpack";
pub const UNMARSHAL_METHOD: &str = "unmarshal_msgpack";

/// Panic message of `must_get` on an absent value.
pub const VALUE_NOT_SET: &str = "optional value is not set";

/// Separator marking a type name as external to the analyzed package.
pub const EXTERNAL_PATH_SEPARATOR: &str = "::";

pub const DEFAULT_RUNTIME_CRATE: &str = "optpack";

pub const GEN_MANIFEST_SCHEMA_VERSION: &str = "optpack-gen.manifest@0.1.0";

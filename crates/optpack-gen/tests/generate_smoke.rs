use std::path::Path;

use optpack_gen::{
    generate, Analyzer, Diagnostic, DiagnosticCode, GenerateOptions, Package, SourcePackage,
};

const FULL_TYPE: &str = r#"
use optpack::{BoxError, MsgpackExt};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FullMsgpackExtType {
    pub a: i64,
    pub b: String,
}

impl MsgpackExt for FullMsgpackExtType {
    const EXT_TYPE: i8 = 1;

    fn marshal_msgpack(&self) -> Result<Vec<u8>, BoxError> {
        Ok(Vec::new())
    }

    fn unmarshal_msgpack(&mut self, _data: &[u8]) -> Result<(), BoxError> {
        Ok(())
    }
}
"#;

const ALIAS: &str = r#"
pub type HiddenTypeAlias = crate::subpackage::Hidden;
"#;

fn write(dir: &Path, name: &str, src: &str) {
    std::fs::write(dir.join(name), src).expect("write source");
}

/// In-memory package with a fixed identity.
struct FakePackage {
    files: Vec<syn::File>,
}

impl Package for FakePackage {
    fn name(&self) -> &str {
        "fake"
    }

    fn path(&self) -> &str {
        "example.com/fake"
    }

    fn syntax(&self) -> &[syn::File] {
        &self.files
    }
}

#[test]
fn directory_package_to_generated_sources() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "full.rs", FULL_TYPE);
    write(dir.path(), "alias.rs", ALIAS);

    let pkg = SourcePackage::load(dir.path(), Some("types")).expect("load");
    let analyzer = Analyzer::from_package(&pkg);
    assert!(analyzer.entry("FullMsgpackExtType").is_some());
    assert!(analyzer.entry("HiddenTypeAlias").is_some());

    let full = generate(
        &GenerateOptions::new("FullMsgpackExtType", 1, analyzer.package_name()),
        &analyzer,
    )
    .expect("generate full");
    assert_eq!(full.file_name, "full_msgpack_ext_type_gen.rs");
    syn::parse_file(&full.source).expect("generated source parses");

    let err = generate(
        &GenerateOptions::new("HiddenTypeAlias", 2, "types"),
        &analyzer,
    )
    .unwrap_err();
    let d = err.downcast_ref::<Diagnostic>().expect("diagnostic");
    assert_eq!(d.code, DiagnosticCode::OPG0102MissingCodecMethods);

    let mut forced = GenerateOptions::new("HiddenTypeAlias", 2, "types");
    forced.force = true;
    let alias = generate(&forced, &analyzer).expect("forced alias");
    assert_eq!(alias.file_name, "hidden_type_alias_gen.rs");
    assert!(alias.source.contains("pub struct OptionalHiddenTypeAlias {"));
}

#[test]
fn analyzer_only_needs_the_package_shape() {
    let pkg = FakePackage {
        files: vec![syn::parse_str(FULL_TYPE).expect("parse")],
    };
    let analyzer = Analyzer::from_package(&pkg);
    assert_eq!(analyzer.package_name(), "fake");
    assert_eq!(analyzer.package_path(), "example.com/fake");
    let entry = analyzer.entry("FullMsgpackExtType").expect("entry");
    assert_eq!(entry.methods(), ["marshal_msgpack", "unmarshal_msgpack"]);

    let dyn_pkg: &dyn Package = &pkg;
    let again = Analyzer::from_package(dyn_pkg);
    assert_eq!(again.entry("FullMsgpackExtType"), Some(entry));
}

#[test]
fn rejected_requests_render_nothing() {
    let pkg = FakePackage {
        files: vec![syn::parse_str(FULL_TYPE).expect("parse")],
    };
    let analyzer = Analyzer::from_package(&pkg);

    for code in [200, -129, 128] {
        let err = generate(
            &GenerateOptions::new("FullMsgpackExtType", code, "fake"),
            &analyzer,
        )
        .unwrap_err();
        let d = err.downcast_ref::<Diagnostic>().expect("diagnostic");
        assert_eq!(d.code, DiagnosticCode::OPG0100ExtCodeOutOfRange);
    }
}

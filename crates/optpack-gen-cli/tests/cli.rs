use std::path::Path;
use std::process::{Command, Output};

const TYPES: &str = r#"
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn marshal_msgpack(&self) -> Result<Vec<u8>, std::io::Error> {
        Ok(Vec::new())
    }

    pub fn unmarshal_msgpack(&mut self, _data: &[u8]) -> Result<(), std::io::Error> {
        Ok(())
    }
}

pub struct Bare;
"#;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_optpack-gen"))
}

fn run(args: &[&str]) -> Output {
    bin().args(args).output().expect("spawn optpack-gen")
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

fn package_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("types.rs"), TYPES).expect("write types");
    dir
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 path")
}

#[test]
fn ext_writes_generated_file() {
    let dir = package_dir();
    let out = run(&[
        "ext",
        "--package",
        path_str(dir.path()),
        "--package-name",
        "geo",
        "--ext-code",
        "-5",
        "Point",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let generated = std::fs::read_to_string(dir.path().join("point_gen.rs")).expect("read output");
    assert!(generated.starts_with("// Code generated by optpack-gen; DO NOT EDIT."));
    assert!(generated.contains("// package: geo request: sha256:"));
    assert!(generated.contains("pub struct OptionalPoint {"));
    assert!(generated.contains("pub const EXT_CODE: i8 = -5;"));
}

#[test]
fn check_mode_detects_stale_output() {
    let dir = package_dir();
    let base = ["ext", "--package", path_str(dir.path()), "--ext-code", "3"];

    let mut args = base.to_vec();
    args.push("Point");
    let out = run(&args);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let mut check = args.clone();
    check.push("--check");
    let out = run(&check);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let mut changed = base.to_vec();
    changed[4] = "4";
    changed.extend(["--check", "Point"]);
    let out = run(&changed);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("generated output differs"));
}

#[test]
fn out_of_range_ext_code_fails_without_output() {
    let dir = package_dir();
    let out = run(&["ext", "--package", path_str(dir.path()), "--ext-code", "200", "Point"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("OPG0100"));
    assert!(!dir.path().join("point_gen.rs").exists());
}

#[test]
fn missing_methods_need_force() {
    let dir = package_dir();
    let out = run(&["ext", "--package", path_str(dir.path()), "--ext-code", "1", "Bare"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("OPG0102"));
    assert!(!dir.path().join("bare_gen.rs").exists());

    let out = run(&[
        "ext",
        "--package",
        path_str(dir.path()),
        "--ext-code",
        "1",
        "--force",
        "Bare",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(dir.path().join("bare_gen.rs").exists());
}

#[test]
fn external_type_with_custom_funcs() {
    let dir = package_dir();
    let out = run(&[
        "ext",
        "--package",
        path_str(dir.path()),
        "--ext-code",
        "7",
        "--imports",
        "std::time",
        "--marshal-func",
        "encode_duration",
        "--unmarshal-func",
        "decode_duration",
        "time::Duration",
    ]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let generated =
        std::fs::read_to_string(dir.path().join("duration_gen.rs")).expect("read output");
    assert!(generated.contains("use std::time;"));
    assert!(generated.contains("encode_duration(&self.value)"));
    assert!(generated.contains("decode_duration(&mut self.value, payload)"));
}

#[test]
fn batch_resolves_packages_relative_to_manifest() {
    let root = tempfile::tempdir().expect("tempdir");
    let pkg = root.path().join("geo");
    std::fs::create_dir(&pkg).expect("mkdir");
    std::fs::write(pkg.join("types.rs"), TYPES).expect("write types");

    let manifest = root.path().join("optpack-gen.json");
    std::fs::write(
        &manifest,
        r#"{
          "schema_version": "optpack-gen.manifest@0.1.0",
          "entries": [
            { "package": "geo", "type_name": "Point", "ext_code": 1 },
            { "package": "geo", "type_name": "Bare", "ext_code": 2, "force": true, "no_tests": true }
          ]
        }"#,
    )
    .expect("write manifest");

    let out = run(&["batch", "--manifest", path_str(&manifest)]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(pkg.join("point_gen.rs").exists());
    let bare = std::fs::read_to_string(pkg.join("bare_gen.rs")).expect("read output");
    assert!(!bare.contains("#[cfg(test)]"));

    let out = run(&["batch", "--manifest", path_str(&manifest), "--check"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn batch_rejects_unknown_schema() {
    let root = tempfile::tempdir().expect("tempdir");
    let manifest = root.path().join("m.json");
    std::fs::write(&manifest, r#"{"schema_version":"other@1","entries":[]}"#).expect("write");
    let out = run(&["batch", "--manifest", path_str(&manifest)]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("schema_version mismatch"));
}

#[test]
fn diagnostics_prints_catalog() {
    let out = run(&["diagnostics"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("# optpack-gen diagnostics catalog"));
    assert!(stdout.contains("| OPG0102 |"));
}

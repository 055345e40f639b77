use std::path::PathBuf;

use anyhow::{Context, Result};
use optpack_gen::{generate, Analyzer, GenerateOptions, SourcePackage};

const DERIVES: [&str; 3] = ["Debug", "Clone", "PartialEq"];

fn request(type_name: &str, ext_code: i64) -> GenerateOptions {
    let mut opts = GenerateOptions::new(type_name, ext_code, "types");
    opts.derives = DERIVES.iter().map(|d| d.to_string()).collect();
    opts
}

fn main() -> Result<()> {
    let manifest_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").context("OUT_DIR")?);
    let types_dir = manifest_dir.join("src").join("types");
    println!("cargo:rerun-if-changed={}", types_dir.display());

    let pkg = SourcePackage::load(&types_dir, Some("types"))?;
    let analyzer = Analyzer::from_package(&pkg);

    let mut full = request("FullMsgpackExtType", 1);
    full.imports = vec!["crate::types::FullMsgpackExtType".into()];

    // The alias target lives in a subdirectory the analyzer does not read.
    let mut hidden = request("HiddenTypeAlias", 2);
    hidden.imports = vec!["crate::types::HiddenTypeAlias".into()];
    hidden.force = true;

    let mut duration = request("time::Duration", 3);
    duration.imports = vec!["std::time".into()];
    duration.custom_marshal_func = Some("crate::types::encode_duration".into());
    duration.custom_unmarshal_func = Some("crate::types::decode_duration".into());

    for opts in [full, hidden, duration] {
        let out = generate(&opts, &analyzer)
            .with_context(|| format!("generate optional for {}", opts.type_name))?;
        let path = out_dir.join(&out.file_name);
        std::fs::write(&path, out.source)
            .with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

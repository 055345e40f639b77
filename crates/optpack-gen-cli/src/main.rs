use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use optpack_contracts::{DEFAULT_RUNTIME_CRATE, GEN_MANIFEST_SCHEMA_VERSION};
use optpack_gen::{
    check_ext_code, generate, render_diagnostics_md, Analyzer, Diagnostic, DiagnosticCode,
    GenerateOptions, Package, SourcePackage,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "optpack-gen")]
#[command(about = "Generates optional types for MessagePack extension-coded Rust types.", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the optional type for one extension-coded type.
    Ext(ExtArgs),
    /// Generate multiple optional types from a manifest.
    Batch {
        #[arg(long)]
        manifest: PathBuf,
        /// If set, fail if any output differs; do not write.
        #[arg(long, default_value_t = false)]
        check: bool,
    },
    /// Print the diagnostics catalog as markdown.
    Diagnostics,
}

#[derive(Args, Debug)]
struct ExtArgs {
    /// Package directory; sources are read from and output written to it.
    #[arg(long, default_value = "./")]
    package: PathBuf,
    /// Package name recorded in the output header (default: directory name).
    #[arg(long)]
    package_name: Option<String>,
    /// Extension type code, in range [-128, 127].
    #[arg(long, allow_hyphen_values = true)]
    ext_code: i64,
    /// Generate even if the type lacks marshal_msgpack/unmarshal_msgpack.
    #[arg(long, default_value_t = false)]
    force: bool,
    /// `use` paths to add to the generated file (repeatable).
    #[arg(long)]
    imports: Vec<String>,
    /// Free function `fn(&T) -> Result<Vec<u8>, E>` used instead of the method.
    #[arg(long)]
    marshal_func: Option<String>,
    /// Free function `fn(&mut T, &[u8]) -> Result<(), E>` used instead of the method.
    #[arg(long)]
    unmarshal_func: Option<String>,
    /// Path of the optpack runtime crate as seen from the package.
    #[arg(long, default_value = DEFAULT_RUNTIME_CRATE)]
    runtime_crate: String,
    /// Derive added to the generated type (repeatable).
    #[arg(long = "derive")]
    derives: Vec<String>,
    /// Do not append the generated test module.
    #[arg(long, default_value_t = false)]
    no_tests: bool,
    /// If set, fail if output differs; do not write.
    #[arg(long, default_value_t = false)]
    check: bool,
    /// Type to generate an optional for; `::`-qualified names are treated as external.
    type_name: String,
}

/// One generation, from either the command line or a manifest entry.
#[derive(Debug)]
struct Job {
    package: PathBuf,
    package_name: Option<String>,
    type_name: String,
    ext_code: i64,
    imports: Vec<String>,
    marshal_func: Option<String>,
    unmarshal_func: Option<String>,
    force: bool,
    runtime_crate: String,
    derives: Vec<String>,
    emit_tests: bool,
}

impl From<ExtArgs> for Job {
    fn from(a: ExtArgs) -> Self {
        Job {
            package: a.package,
            package_name: a.package_name,
            type_name: a.type_name,
            ext_code: a.ext_code,
            imports: a.imports,
            marshal_func: a.marshal_func,
            unmarshal_func: a.unmarshal_func,
            force: a.force,
            runtime_crate: a.runtime_crate,
            derives: a.derives,
            emit_tests: !a.no_tests,
        }
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ext(args) => {
            let check = args.check;
            run_job(&Job::from(args), check)
        }
        Command::Batch { manifest, check } => run_batch(&manifest, check),
        Command::Diagnostics => {
            print!("{}", render_diagnostics_md());
            Ok(())
        }
    }
}

fn run_job(job: &Job, check: bool) -> Result<()> {
    // Rejected before the package is parsed.
    if check_ext_code(job.ext_code).is_none() {
        anyhow::bail!(Diagnostic::error(
            DiagnosticCode::OPG0100ExtCodeOutOfRange,
            format!("invalid extension code: {}", job.ext_code),
        ));
    }

    let pkg = SourcePackage::load(&job.package, job.package_name.as_deref())
        .with_context(|| format!("load package: {}", job.package.display()))?;
    let analyzer = Analyzer::from_package(&pkg);

    let mut opts = GenerateOptions::new(&job.type_name, job.ext_code, pkg.name());
    opts.imports = job.imports.clone();
    opts.custom_marshal_func = job.marshal_func.clone();
    opts.custom_unmarshal_func = job.unmarshal_func.clone();
    opts.force = job.force;
    opts.runtime_crate = job.runtime_crate.clone();
    opts.derives = job.derives.clone();
    opts.emit_tests = job.emit_tests;

    tracing::info!(type_name = %job.type_name, package = pkg.name(), "generating optional");
    let generated = generate(&opts, &analyzer)
        .with_context(|| format!("generate optional for {}", job.type_name))?;
    write_generated(&job.package, &generated.file_name, &generated.source, check)
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    schema_version: String,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    package: String,
    type_name: String,
    ext_code: i64,
    #[serde(default)]
    package_name: Option<String>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    marshal_func: Option<String>,
    #[serde(default)]
    unmarshal_func: Option<String>,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    runtime_crate: Option<String>,
    #[serde(default)]
    derives: Vec<String>,
    #[serde(default)]
    no_tests: bool,
}

fn run_batch(manifest_path: &Path, check: bool) -> Result<()> {
    let bytes = std::fs::read(manifest_path)
        .with_context(|| format!("read manifest: {}", manifest_path.display()))?;
    let m: Manifest = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse manifest JSON: {}", manifest_path.display()))?;
    if m.schema_version.trim() != GEN_MANIFEST_SCHEMA_VERSION {
        anyhow::bail!(
            "manifest schema_version mismatch: expected {GEN_MANIFEST_SCHEMA_VERSION} got {:?}",
            m.schema_version
        );
    }

    let base = manifest_path.parent().unwrap_or(Path::new("."));
    for (idx, e) in m.entries.into_iter().enumerate() {
        let job = Job {
            package: base.join(&e.package),
            package_name: e.package_name,
            type_name: e.type_name,
            ext_code: e.ext_code,
            imports: e.imports,
            marshal_func: e.marshal_func,
            unmarshal_func: e.unmarshal_func,
            force: e.force,
            runtime_crate: e
                .runtime_crate
                .unwrap_or_else(|| DEFAULT_RUNTIME_CRATE.to_string()),
            derives: e.derives,
            emit_tests: !e.no_tests,
        };
        run_job(&job, check)
            .with_context(|| format!("manifest entry[{idx}] {}", job.type_name))?;
    }
    Ok(())
}

fn write_generated(package_dir: &Path, file_name: &str, src: &str, check: bool) -> Result<()> {
    let out_path = package_dir.join(file_name);

    if check {
        let cur = std::fs::read_to_string(&out_path)
            .with_context(|| format!("read existing output: {}", out_path.display()))?;
        if cur != src {
            anyhow::bail!("generated output differs: {}", out_path.display());
        }
        return Ok(());
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    std::fs::write(&out_path, src.as_bytes())
        .with_context(|| format!("write output: {}", out_path.display()))?;
    tracing::info!(path = %out_path.display(), "wrote generated source");
    Ok(())
}

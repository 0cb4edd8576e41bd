use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use apkpatch::run::{version, LogSink, RunConfig, Runner, DEFAULT_PATCH_BASE_URL};

/// Patch a compiled Android package using a version-keyed patch list.
#[derive(Parser, Debug)]
#[command(name = "apkpatch", version, about)]
struct Cli {
    /// Package to patch.
    input: PathBuf,

    /// Output path; defaults to `<input>_patched.apk` next to the input.
    output: Option<PathBuf>,

    /// App version used to look up the patch list; detected from the input
    /// file name when omitted.
    #[arg(long)]
    app_version: Option<String>,

    /// Keystore for signing the output; omitted leaves it unsigned.
    #[arg(long)]
    keystore: Option<PathBuf>,

    /// Local directory of `<version>.json` patch documents, preferred over
    /// the remote lookup when it holds the requested version.
    #[arg(long)]
    patches: Option<PathBuf>,

    /// Remote patch document root.
    #[arg(long, default_value = DEFAULT_PATCH_BASE_URL)]
    patch_url: String,

    /// Also rewrite the manifest application class and restore reference
    /// checksums. These steps carry no structural guarantees.
    #[arg(long)]
    experimental: bool,

    /// Enable debug logging; RUST_LOG overrides.
    #[arg(short, long)]
    verbose: bool,
}

fn default_output(input: &std::path::Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "patched".into(), |s| s.to_string_lossy().into_owned());
    input.with_file_name(format!("{stem}_patched.apk"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let file_name = cli.input.file_name().map(|n| n.to_string_lossy().into_owned());
    let Some(app_version) = cli
        .app_version
        .or_else(|| file_name.as_deref().and_then(version::from_file_name))
    else {
        bail!("could not detect a version from the file name; pass --app-version");
    };

    let config = RunConfig {
        output: cli.output.unwrap_or_else(|| default_output(&cli.input)),
        input: cli.input,
        version: app_version,
        keystore: cli.keystore,
        patch_dir: cli.patches,
        patch_base_url: cli.patch_url,
        experimental: cli.experimental,
    };

    let report = Runner::new(&config, &LogSink)
        .run()
        .with_context(|| format!("patching {} failed", config.input.display()))?;

    print!("{report}");
    if report.errored() > 0 {
        log::warn!("{} patch(es) errored, package may be incomplete", report.errored());
    }

    Ok(())
}

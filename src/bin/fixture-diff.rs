use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docfixture_harness::archive::{Archive, ArchiveDiffer, XmlCanonicalizer, GENERATED_ARCHIVE_NAME};
use docfixture_harness::config::HarnessConfig;
use docfixture_harness::error::{ComparisonFailure, ErrorCode, GoldenError};
use docfixture_harness::fixtures::{DiscoveryReport, FixtureLoader};
use docfixture_harness::golden::GoldenComparator;
use docfixture_harness::logging::init_tracing;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "fixture-diff",
    about = "Structural comparison of generated document archives against golden fixtures"
)]
struct Cli {
    /// Harness configuration file (defaults to fixtures/harness.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two archives member by member
    Compare {
        #[arg(long)]
        actual: PathBuf,
        #[arg(long)]
        expected: PathBuf,
    },
    /// Load every fixture under a root and list what was found
    Discover {
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Compare an archive against a loaded fixture, persisting it on mismatch
    Verify {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        actual: PathBuf,
        #[arg(long)]
        expected_name: String,
    },
}

#[derive(Serialize)]
struct MatchReport<'a> {
    status: &'static str,
    expected: &'a str,
    members: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(HarnessConfig::load_from_file)
        .unwrap_or_else(HarnessConfig::load);
    init_tracing(&config.logging);

    match cli.command {
        Commands::Compare { actual, expected } => run_compare(&config, &actual, &expected),
        Commands::Discover { root } => {
            let root = root.unwrap_or_else(|| config.fixtures.root.clone());
            let (_, report) = discover(&config, &root)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::from(0))
        }
        Commands::Verify {
            root,
            actual,
            expected_name,
        } => {
            let root = root.unwrap_or_else(|| config.fixtures.root.clone());
            run_verify(&config, &root, &actual, &expected_name)
        }
    }
}

fn read_archive(path: &Path, name: &str) -> Result<Archive> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Archive::from_bytes(name, &bytes).with_context(|| format!("parsing {}", path.display()))
}

fn run_compare(config: &HarnessConfig, actual: &Path, expected: &Path) -> Result<ExitCode> {
    let expected_name = expected
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| expected.display().to_string());
    let actual = read_archive(actual, GENERATED_ARCHIVE_NAME)?;
    let expected = read_archive(expected, &expected_name)?;

    let differ = ArchiveDiffer::new(config.compare.clone(), XmlCanonicalizer::default());
    match differ.compare(&actual, &expected) {
        Ok(()) => {
            emit_match(&expected_name, &actual)?;
            Ok(ExitCode::from(0))
        }
        Err(failure) => {
            emit_failure(&failure)?;
            Ok(ExitCode::from(2))
        }
    }
}

fn discover(config: &HarnessConfig, root: &Path) -> Result<(FixtureLoader, DiscoveryReport)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    let loader = FixtureLoader::new(&config.fixtures);
    let fixtures = loader.fixtures().clone();
    loader.configure_barrier(move || {
        tracing::info!(fixtures = fixtures.len(), "all fixtures loaded");
    });
    let report = runtime
        .block_on(loader.begin_discovery(root))
        .with_context(|| format!("loading fixtures from {}", root.display()))?;
    Ok((loader, report))
}

fn run_verify(
    config: &HarnessConfig,
    root: &Path,
    actual: &Path,
    expected_name: &str,
) -> Result<ExitCode> {
    let (loader, _) = discover(config, root)?;
    let actual = read_archive(actual, GENERATED_ARCHIVE_NAME)?;
    let comparator = GoldenComparator::new(
        loader.fixtures().clone(),
        root,
        config.compare.clone(),
        config.diagnostics.persist_failures,
    );

    match comparator.should_be_same(&actual, expected_name) {
        Ok(()) => {
            emit_match(expected_name, &actual)?;
            Ok(ExitCode::from(0))
        }
        Err(GoldenError::Comparison(failure)) => {
            emit_failure(&failure)?;
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(anyhow::anyhow!("[{}] {}", err.code(), err.message())),
    }
}

fn emit_match(expected: &str, actual: &Archive) -> Result<()> {
    let report = MatchReport {
        status: "match",
        expected,
        members: actual.len(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn emit_failure(failure: &ComparisonFailure) -> Result<()> {
    let mut record = serde_json::to_value(failure.to_record())?;
    if let Some(object) = record.as_object_mut() {
        object.insert("code".to_string(), failure.code().into());
    }
    eprintln!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

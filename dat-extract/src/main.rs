//! Command-line extractor for TT-era DAT archives

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info, warn};

use dat_codec::CodecRegistry;
use dat_parser::{ArchiveBuffer, DatArchive, Error};

#[derive(Parser)]
#[command(
    name = "datex",
    about = "Extractor for TT-era DAT game archives",
    version
)]
struct Cli {
    /// Archive files to process
    archives: Vec<PathBuf>,

    /// List entries instead of writing payloads
    #[arg(short, long)]
    list: bool,

    /// Directory extracted files are written under
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.archives.is_empty() {
        error!("No archive provided at command line");
        return ExitCode::FAILURE;
    }

    let registry = CodecRegistry::with_default_codecs();
    let mut failed = false;

    for path in &cli.archives {
        if let Err(e) = process_archive(path, &cli, &registry) {
            error!("{}: {e}", path.display());
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Decode one archive and list or extract its contents.
///
/// A fatal error aborts this archive only; the caller carries on with
/// the rest of the batch.
fn process_archive(path: &Path, cli: &Cli, registry: &CodecRegistry) -> dat_parser::Result<()> {
    info!("Reading archive {}", path.display());
    let archive = DatArchive::parse(ArchiveBuffer::open(path)?)?;
    info!("Magic header: {}", archive.magic_header()?);

    if cli.list {
        list_entries(&archive);
        return Ok(());
    }
    extract_all(&archive, registry, &cli.output)
}

fn list_entries(archive: &DatArchive) {
    let by_index: HashMap<usize, _> = archive
        .resolved()
        .iter()
        .map(|file| (file.entry_index, file))
        .collect();

    for (index, entry) in archive.entries().iter().enumerate() {
        if entry.is_dir {
            println!("{:>5}  {:>10}  {:>10}  {}/", entry.id, "-", "-", entry.path);
        } else if let Some(file) = by_index.get(&index) {
            println!(
                "{:>5}  {:>10}  {:>10}  {}",
                entry.id, file.location.compressed_size, file.location.raw_size, entry.path
            );
        } else {
            println!("{:>5}  {:>10}  {:>10}  {}", entry.id, "?", "?", entry.path);
        }
    }
}

/// Write every resolved payload under `output`.
///
/// Codec failures are per-entry: the entry is skipped with a warning
/// and extraction moves on. IO and bounds errors abort the archive.
fn extract_all(
    archive: &DatArchive,
    registry: &CodecRegistry,
    output: &Path,
) -> dat_parser::Result<()> {
    for file in archive.resolved() {
        let Some(entry) = archive.entries().get(file.entry_index) else {
            continue;
        };
        if !is_safe_path(&entry.path) {
            warn!("Skipping {}: unsafe path", entry.path);
            continue;
        }

        let data = match archive.extract(file, registry) {
            Ok(data) => data,
            Err(Error::Codec(e)) => {
                warn!("Skipping {}: {e}", entry.path);
                continue;
            }
            Err(e) => return Err(e),
        };

        let target = output.join(&entry.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &data)?;
        info!("Extracted {} ({} bytes)", target.display(), data.len());
    }
    Ok(())
}

/// Entry paths come from archive data; refuse components that could
/// escape the output directory.
fn is_safe_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|component| !component.is_empty() && component != "." && component != "..")
}

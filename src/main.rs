//! marksync - a markdown document synchronization engine.
//!
//! # Usage
//!
//! ```bash
//! marksync README.md              # chunk/canonicalization summary
//! marksync --chunks README.md    # print the chunk partition
//! marksync --normalize README.md # print the canonical form
//! marksync --watch README.md     # live session applying external reloads
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use marksync::chunker;
use marksync::codec;
use marksync::config::{self, Theme};
use marksync::host::FsHost;
use marksync::session::{LoadState, Session};

/// A markdown document synchronization engine
#[derive(Parser, Debug)]
#[command(name = "marksync", version, about, long_about = None)]
struct Cli {
    /// Markdown file to operate on
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the chunk partition instead of a summary
    #[arg(long)]
    chunks: bool,

    /// Print the canonical (normalized) form of the document
    #[arg(short, long)]
    normalize: bool,

    /// With --normalize, rewrite the file in place
    #[arg(long, requires = "normalize")]
    write: bool,

    /// Keep a session alive and apply external changes as reloads
    #[arg(short, long)]
    watch: bool,

    /// Override the configured theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marksync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.normalize {
        normalize(&cli.file, cli.write)
    } else if cli.chunks {
        print_chunks(&cli.file)
    } else if cli.watch {
        watch(&cli)
    } else {
        summary(&cli.file)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print the canonical serialization, optionally rewriting the file.
fn normalize(path: &Path, write: bool) -> Result<()> {
    let source = read_file(path)?;
    let canonical = codec::serialize(&codec::deserialize(&source))
        .with_context(|| format!("Failed to serialize {}", path.display()))?;

    if write {
        // Files get a trailing newline; the in-memory canonical form has none.
        std::fs::write(path, format!("{canonical}\n"))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "rewritten in canonical form");
    } else {
        println!("{canonical}");
    }
    Ok(())
}

fn print_chunks(path: &Path) -> Result<()> {
    let source = read_file(path)?;
    for chunk in chunker::split(&source) {
        println!("── chunk {} ──", chunk.index);
        println!("{}", chunk.text);
    }
    Ok(())
}

fn summary(path: &Path) -> Result<()> {
    let source = read_file(path)?;
    let chunks = chunker::split(&source);
    let canonical = codec::serialize(&codec::deserialize(&source))?;

    let is_canonical = source.strip_suffix('\n').unwrap_or(&source) == canonical;
    println!("{}", path.display());
    println!("  chunks:    {}", chunks.len());
    println!(
        "  canonical: {}",
        if is_canonical {
            "yes"
        } else {
            "no (see --normalize)"
        }
    );
    Ok(())
}

/// Run a live session against the file: external modifications arrive as
/// reload events and replace the document; Ctrl+C exits.
fn watch(cli: &Cli) -> Result<()> {
    let mut host_config = config::load_config(&config::config_path());
    if let Some(theme) = cli.theme {
        host_config.theme = theme;
    }
    let host = FsHost::for_path(&cli.file)
        .with_config(host_config)
        .with_watch(true);

    let mut session = Session::new(host);
    if let LoadState::Failed(cause) = &session.model.load_state {
        anyhow::bail!("load failed: {cause}");
    }
    tracing::info!(
        file = %cli.file.display(),
        chunks = session.model.document.len(),
        theme = ?session.model.theme,
        "session started, watching for changes"
    );

    let start = Instant::now();
    let mut last_revision = session.model.document.revision();
    loop {
        let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        session.pump(now_ms);

        let revision = session.model.document.revision();
        if revision != last_revision {
            tracing::info!(
                revision,
                chunks = session.model.document.len(),
                "document reloaded"
            );
            last_revision = revision;
        }
        if let Some(notice) = session.model.notice.take() {
            tracing::warn!(%notice, "session notice");
        }

        std::thread::sleep(Duration::from_millis(250));
    }
}

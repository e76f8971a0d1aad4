//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unnest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract every archive under a directory, including nested archives
    Extract(ExtractArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Directory to scan, or a file whose directory is scanned
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Delete each archive after it was extracted
    #[arg(short, long)]
    pub delete: bool,

    /// Create symlinks and hardlinks stored in TAR archives
    #[arg(long)]
    pub allow_links: bool,

    /// Directory for temporary staging areas (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Stop after this many passes
    #[arg(long, value_name = "N", value_parser = parse_pass_limit)]
    pub max_passes: Option<usize>,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parses a pass limit, which must be at least 1
fn parse_pass_limit(s: &str) -> Result<usize, String> {
    let limit = s
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid pass limit: {s}"))?;
    if limit == 0 {
        return Err("pass limit must be at least 1".to_string());
    }
    Ok(limit)
}

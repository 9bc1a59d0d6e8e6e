use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

/// relpack - reproducible job, package, and release archives
#[derive(Parser)]
#[command(name = "relpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a job archive from a spec file, monit file, and templates
  Job {
    /// Path to the job spec file (embedded as ./job.MF)
    #[arg(long)]
    manifest: PathBuf,

    /// Path to the job monit file
    #[arg(long)]
    monit: PathBuf,

    /// Template file for the job (repeatable)
    #[arg(long = "template")]
    templates: Vec<PathBuf>,

    /// Path to place the archive (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Build a package archive from a set of files
  Package {
    /// Path to place the archive
    #[arg(short, long)]
    output: PathBuf,

    /// File to add to the package (repeatable)
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// Make an uncompiled package (injects a packaging script)
    #[arg(long)]
    uncompiled: bool,
  },

  /// Build a release archive with an embedded release.MF manifest
  Release {
    /// Name of the release
    #[arg(long)]
    name: String,

    /// Job archive for the release (repeatable)
    #[arg(long = "job")]
    jobs: Vec<PathBuf>,

    /// Package archive for the release (repeatable)
    #[arg(long = "package")]
    packages: Vec<PathBuf>,

    /// Make an uncompiled release
    #[arg(long)]
    uncompiled: bool,

    /// Distro of the stemcell packages were compiled against
    #[arg(long)]
    stemcell_distro: Option<String>,

    /// Version of the stemcell packages were compiled against
    #[arg(long)]
    stemcell_version: Option<String>,

    /// Path to place the archive (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Job {
      manifest,
      monit,
      templates,
      output,
    } => cmd::cmd_job(&manifest, &monit, templates, output.as_deref()),
    Commands::Package {
      output,
      files,
      uncompiled,
    } => cmd::cmd_package(&output, files, uncompiled),
    Commands::Release {
      name,
      jobs,
      packages,
      uncompiled,
      stemcell_distro,
      stemcell_version,
      output,
    } => cmd::cmd_release(
      &name,
      jobs,
      packages,
      uncompiled,
      stemcell_distro,
      stemcell_version,
      output.as_deref(),
    ),
  }
}

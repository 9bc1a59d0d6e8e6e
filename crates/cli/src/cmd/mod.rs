mod job;
mod package;
mod release;

pub use job::cmd_job;
pub use package::cmd_package;
pub use release::cmd_release;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::{Compression, write::GzEncoder};

/// Open the archive sink: the given file, or stdout when no output path was
/// requested, wrapped in a fast-level gzip encoder.
fn open_sink(output: Option<&Path>) -> Result<GzEncoder<Box<dyn Write>>> {
  let sink: Box<dyn Write> = match output {
    Some(path) => Box::new(
      File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
    ),
    None => Box::new(io::stdout()),
  };
  Ok(GzEncoder::new(sink, Compression::fast()))
}

use std::path::{Path, PathBuf};

use anyhow::Result;
use relpack_core::{AddOption, Builder};
use tracing::debug;

use super::open_sink;

pub fn cmd_job(
  manifest: &Path,
  monit: &Path,
  mut templates: Vec<PathBuf>,
  output: Option<&Path>,
) -> Result<()> {
  templates.sort();

  let mut builder = Builder::new(open_sink(output)?);

  builder.add_file(
    manifest,
    &[
      AddOption::Hermetic,
      AddOption::Prefix("./".to_string()),
      AddOption::Rename("job.MF".to_string()),
      AddOption::Mode(0o644),
    ],
  )?;
  builder.add_file(
    monit,
    &[
      AddOption::Hermetic,
      AddOption::Prefix("./".to_string()),
      AddOption::Mode(0o644),
    ],
  )?;
  for template in &templates {
    builder.add_file(
      template,
      &[
        AddOption::Hermetic,
        AddOption::Prefix("./templates/".to_string()),
        AddOption::Mode(0o644),
      ],
    )?;
  }

  builder.close()?.finish()?;
  debug!(templates = templates.len(), "job archive complete");
  Ok(())
}

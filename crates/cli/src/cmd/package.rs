use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use relpack_core::{AddOption, Builder};
use tracing::debug;

use super::open_sink;

/// Stub packaging script embedded in uncompiled packages. The deploy agent
/// runs it at compile time; for pre-built content it only has to move the
/// files into place.
const PACKAGING_SCRIPT: &str = r#"#!/bin/bash

set -e
set -u

cp -r ${BOSH_COMPILE_TARGET}/* ${BOSH_INSTALL_TARGET}
rm ${BOSH_INSTALL_TARGET}/packaging
"#;

pub fn cmd_package(output: &Path, mut files: Vec<PathBuf>, uncompiled: bool) -> Result<()> {
  files.sort();

  let mut builder = Builder::new(open_sink(Some(output))?);

  let opts = [
    AddOption::Hermetic,
    AddOption::Prefix("./".to_string()),
    AddOption::Mode(0o755),
  ];

  if uncompiled {
    // Removed automatically once embedded.
    let mut script = tempfile::NamedTempFile::new()?;
    script.write_all(PACKAGING_SCRIPT.as_bytes())?;
    script.flush()?;

    let mut script_opts = opts.to_vec();
    script_opts.push(AddOption::Rename("packaging".to_string()));
    builder.add_file(script.path(), &script_opts)?;
  }

  for file in &files {
    builder.add_file(file, &opts)?;
  }

  builder.close()?.finish()?;
  debug!(files = files.len(), output = %output.display(), "package archive complete");
  Ok(())
}

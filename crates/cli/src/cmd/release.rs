use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use relpack_core::{AddOption, Builder, Manifest, PackageMode, Stemcell};
use tracing::debug;

use super::open_sink;

pub fn cmd_release(
  name: &str,
  mut jobs: Vec<PathBuf>,
  mut packages: Vec<PathBuf>,
  uncompiled: bool,
  stemcell_distro: Option<String>,
  stemcell_version: Option<String>,
  output: Option<&Path>,
) -> Result<()> {
  // Stemcell identity only makes sense for compiled packages; uncompiled
  // releases skip the check entirely.
  let mode = if uncompiled {
    PackageMode::Uncompiled
  } else {
    let Some(distro) = stemcell_distro else {
      bail!("--stemcell-distro must be specified");
    };
    let Some(version) = stemcell_version else {
      bail!("--stemcell-version must be specified");
    };
    PackageMode::Compiled(Stemcell { distro, version })
  };

  jobs.sort();
  packages.sort();

  let mut builder = Builder::new(open_sink(output)?);
  let mut manifest = Manifest::new(name);

  for job in &jobs {
    builder.add_file(
      job,
      &[
        AddOption::Hermetic,
        AddOption::Prefix("./jobs/".to_string()),
        AddOption::Mode(0o644),
      ],
    )?;
    manifest.add_job(job)?;
  }

  let prefix = match &mode {
    PackageMode::Compiled(_) => "./compiled_packages/",
    PackageMode::Uncompiled => "./packages/",
  };
  for package in &packages {
    builder.add_file(
      package,
      &[
        AddOption::Hermetic,
        AddOption::Prefix(prefix.to_string()),
        AddOption::Mode(0o644),
      ],
    )?;
    manifest.add_package(package, &mode)?;
  }

  // Serialize via a temp file so the builder's stat/stream path applies to
  // the manifest entry too; the file is removed once embedded.
  let mut mf = tempfile::NamedTempFile::new()?;
  mf.write_all(&manifest.to_json()?)?;
  mf.flush()?;
  builder.add_file(
    mf.path(),
    &[
      AddOption::Hermetic,
      AddOption::Prefix("./".to_string()),
      AddOption::Rename("release.MF".to_string()),
      AddOption::Mode(0o644),
    ],
  )?;

  builder.close()?.finish()?;
  debug!(
    jobs = jobs.len(),
    packages = packages.len(),
    "release archive complete"
  );
  Ok(())
}

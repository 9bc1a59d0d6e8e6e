//! Release manifest types and assembly
//!
//! The manifest is the release's structured description, embedded in the
//! archive as `release.MF`. Records are appended in the order their paths
//! arrive; callers sort the path lists before assembly.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::{Result, fingerprint};

/// Placeholder version for one-shot dev builds.
const DEV_VERSION: &str = "0.0.0+dev.1";
/// Placeholder commit identifier for one-shot dev builds.
const DEV_COMMIT_HASH: &str = "0000000";

/// A stemcell identity: the base OS image packages were compiled against.
#[derive(Debug, Clone)]
pub struct Stemcell {
    pub distro: String,
    pub version: String,
}

impl fmt::Display for Stemcell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.distro, self.version)
    }
}

/// Whether a release carries source packages or packages compiled against
/// a specific stemcell.
#[derive(Debug, Clone)]
pub enum PackageMode {
    Uncompiled,
    Compiled(Stemcell),
}

/// One job reference inside the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub name: String,
    pub fingerprint: String,
    /// Historical field name; holds a `sha256:`-prefixed digest. Archive
    /// consumers key on the literal name, so it is kept as-is.
    pub sha1: String,
}

/// One package reference inside the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub fingerprint: String,
    pub sha1: String,
    /// `distro/version`, present only for compiled packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stemcell: Option<String>,
    /// Always empty; dependency resolution happens elsewhere.
    pub dependencies: Vec<String>,
}

/// A release manifest, serialized to JSON as the archive's trailing
/// `release.MF` entry.
///
/// The `packages` and `compiled_packages` lists are mutually exclusive in
/// practice: a release is built entirely in one [`PackageMode`], and only
/// the populated list is serialized.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub uncommitted_changes: bool,
    pub commit_hash: String,
    pub jobs: Vec<JobRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub compiled_packages: Vec<PackageRecord>,
}

impl Manifest {
    /// Create an empty manifest with the fixed dev-build placeholders.
    pub fn new(name: &str) -> Self {
        Manifest {
            name: name.to_string(),
            version: DEV_VERSION.to_string(),
            uncommitted_changes: true,
            commit_hash: DEV_COMMIT_HASH.to_string(),
            jobs: Vec::new(),
            packages: Vec::new(),
            compiled_packages: Vec::new(),
        }
    }

    /// Fingerprint a job archive and append its record.
    pub fn add_job(&mut self, path: &Path) -> Result<()> {
        let fp = fingerprint(path)?;
        self.jobs.push(JobRecord {
            name: derived_name(path),
            sha1: format!("sha256:{fp}"),
            fingerprint: fp,
        });
        Ok(())
    }

    /// Fingerprint a package archive and append its record to the list
    /// selected by `mode`.
    pub fn add_package(&mut self, path: &Path, mode: &PackageMode) -> Result<()> {
        let fp = fingerprint(path)?;
        let record = PackageRecord {
            name: derived_name(path),
            sha1: format!("sha256:{fp}"),
            fingerprint: fp,
            stemcell: match mode {
                PackageMode::Compiled(stemcell) => Some(stemcell.to_string()),
                PackageMode::Uncompiled => None,
            },
            dependencies: Vec::new(),
        };
        match mode {
            PackageMode::Compiled(_) => self.compiled_packages.push(record),
            PackageMode::Uncompiled => self.packages.push(record),
        }
        Ok(())
    }

    /// Build a complete manifest from pre-sorted job and package path
    /// lists. Record order follows input order; no reordering happens here.
    pub fn assemble(
        name: &str,
        jobs: &[impl AsRef<Path>],
        packages: &[impl AsRef<Path>],
        mode: &PackageMode,
    ) -> Result<Self> {
        let mut manifest = Manifest::new(name);
        for job in jobs {
            manifest.add_job(job.as_ref())?;
        }
        for package in packages {
            manifest.add_package(package.as_ref(), mode)?;
        }
        Ok(manifest)
    }

    /// Serialize to JSON with a trailing newline.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Record name for a path: the base filename minus its extension.
fn derived_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! Deterministic tar archive construction
//!
//! Tar headers embed timestamps and numeric/textual ownership by default,
//! so two builds of identical content on different machines would produce
//! byte-different archives. The builder here stamps every entry through an
//! ordered chain of [`AddOption`] transforms; the `Hermetic` option forces
//! the environment-dependent fields to fixed values.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::time::UNIX_EPOCH;

use tracing::debug;

use crate::{CoreError, Result};

/// A single header transform applied before an entry is written.
///
/// Options form an ordered chain; later options overwrite fields set by
/// earlier ones. `Hermetic` is conventionally first in every chain so that
/// a category-specific `Mode` can override its restrictive default.
#[derive(Debug, Clone)]
pub enum AddOption {
    /// Prepend a prefix to the logical path. Repeated prefixes stack.
    Prefix(String),
    /// Replace the final path segment, keeping any directory segments
    /// established by an earlier `Prefix`. The last rename wins.
    Rename(String),
    /// Set the permission bits to exactly this value, discarding whatever
    /// the filesystem reported.
    Mode(u32),
    /// Stamp fixed metadata so output is independent of the build
    /// environment: zero mtime, uid/gid 0, `root`/`root` ownership,
    /// mode 0o400.
    Hermetic,
}

impl AddOption {
    fn apply(&self, mut hdr: EntryHeader) -> EntryHeader {
        match self {
            AddOption::Prefix(prefix) => {
                hdr.path = format!("{}{}", prefix, hdr.path);
            }
            AddOption::Rename(name) => {
                let mut parts: Vec<&str> = hdr.path.split('/').collect();
                if let Some(last) = parts.last_mut() {
                    *last = name;
                }
                hdr.path = parts.join("/");
            }
            AddOption::Mode(mode) => {
                hdr.mode = *mode;
            }
            AddOption::Hermetic => {
                hdr.mode = 0o400;
                hdr.uid = 0;
                hdr.gid = 0;
                hdr.uname = "root".to_string();
                hdr.gname = "root".to_string();
                hdr.mtime = 0;
            }
        }
        hdr
    }
}

/// The header fields the option chain operates on.
///
/// Seeded from filesystem metadata, folded through the options, then
/// written out as a GNU tar header. The logical path is always
/// forward-slash-separated regardless of the host filesystem.
#[derive(Debug, Clone)]
struct EntryHeader {
    path: String,
    mode: u32,
    uid: u64,
    gid: u64,
    uname: String,
    gname: String,
    mtime: u64,
}

impl EntryHeader {
    fn from_metadata(path: &Path, metadata: &fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (mode, uid, gid) = fs_fields(metadata);
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0);

        EntryHeader {
            path: name,
            mode,
            uid,
            gid,
            uname: String::new(),
            gname: String::new(),
            mtime,
        }
    }
}

#[cfg(unix)]
fn fs_fields(metadata: &fs::Metadata) -> (u32, u64, u64) {
    use std::os::unix::fs::MetadataExt;
    (
        metadata.mode() & 0o7777,
        metadata.uid() as u64,
        metadata.gid() as u64,
    )
}

#[cfg(not(unix))]
fn fs_fields(_metadata: &fs::Metadata) -> (u32, u64, u64) {
    (0o644, 0, 0)
}

/// Streams files into a tar archive on top of an arbitrary byte sink.
///
/// The builder writes entries sequentially and is not safe for concurrent
/// use. A failed [`add_file`](Builder::add_file) leaves the sink in an
/// unspecified state; the caller must discard the whole output.
pub struct Builder<W: Write> {
    inner: tar::Builder<W>,
}

impl<W: Write> Builder<W> {
    /// Wrap a writable byte sink.
    pub fn new(sink: W) -> Self {
        Builder {
            inner: tar::Builder::new(sink),
        }
    }

    /// Read metadata and content from `path` and append one archive entry,
    /// applying `opts` to the header in order.
    pub fn add_file(&mut self, path: &Path, opts: &[AddOption]) -> Result<()> {
        let metadata = fs::metadata(path).map_err(|e| CoreError::file(path, e))?;
        let hdr = opts
            .iter()
            .fold(EntryHeader::from_metadata(path, &metadata), |hdr, opt| {
                opt.apply(hdr)
            });
        debug!(entry = %hdr.path, size = metadata.len(), "adding archive entry");

        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(metadata.len());
        header.set_mode(hdr.mode);
        header.set_uid(hdr.uid);
        header.set_gid(hdr.gid);
        header.set_mtime(hdr.mtime);
        header.set_username(&hdr.uname)?;
        header.set_groupname(&hdr.gname)?;

        let file = File::open(path).map_err(|e| CoreError::file(path, e))?;
        let name = hdr.path.as_bytes();
        // `append_data` normalizes away the leading `./` the option chain
        // establishes, so write the logical path into the header verbatim
        // when it fits the GNU name field.
        if name.len() < 100 {
            let gnu = header.as_gnu_mut().expect("gnu header");
            gnu.name[..name.len()].copy_from_slice(name);
            header.set_cksum();
            self.inner.append(&header, file)?;
        } else {
            self.inner.append_data(&mut header, Path::new(&hdr.path), file)?;
        }
        Ok(())
    }

    /// Write the tar end-of-archive marker and return the inner sink so the
    /// caller can finish any wrapping compression stream. Must be the last
    /// call on the builder.
    pub fn close(self) -> Result<W> {
        Ok(self.inner.into_inner()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tar::Archive;

    fn header() -> EntryHeader {
        EntryHeader {
            path: "manifest.yml".to_string(),
            mode: 0o664,
            uid: 1000,
            gid: 1000,
            uname: String::new(),
            gname: String::new(),
            mtime: 1_700_000_000,
        }
    }

    fn fold(hdr: EntryHeader, opts: &[AddOption]) -> EntryHeader {
        opts.iter().fold(hdr, |hdr, opt| opt.apply(hdr))
    }

    #[test]
    fn prefix_then_rename_composes() {
        let hdr = fold(
            header(),
            &[
                AddOption::Prefix("./jobs/".to_string()),
                AddOption::Rename("job.MF".to_string()),
            ],
        );
        assert_eq!(hdr.path, "./jobs/job.MF");
    }

    #[test]
    fn repeated_prefixes_stack() {
        let hdr = fold(
            header(),
            &[
                AddOption::Prefix("templates/".to_string()),
                AddOption::Prefix("./".to_string()),
            ],
        );
        assert_eq!(hdr.path, "./templates/manifest.yml");
    }

    #[test]
    fn last_rename_wins() {
        let hdr = fold(
            header(),
            &[
                AddOption::Rename("first".to_string()),
                AddOption::Rename("second".to_string()),
            ],
        );
        assert_eq!(hdr.path, "second");
    }

    #[test]
    fn hermetic_stamps_fixed_metadata() {
        let hdr = fold(header(), &[AddOption::Hermetic]);
        assert_eq!(hdr.mode, 0o400);
        assert_eq!(hdr.uid, 0);
        assert_eq!(hdr.gid, 0);
        assert_eq!(hdr.uname, "root");
        assert_eq!(hdr.gname, "root");
        assert_eq!(hdr.mtime, 0);
    }

    #[test]
    fn mode_after_hermetic_overrides_default() {
        let hdr = fold(
            header(),
            &[
                AddOption::Hermetic,
                AddOption::Prefix("./".to_string()),
                AddOption::Mode(0o755),
            ],
        );
        assert_eq!(hdr.mode, 0o755);
        assert_eq!(hdr.uid, 0);
        assert_eq!(hdr.path, "./manifest.yml");
    }

    #[test]
    fn written_entry_carries_stamped_header() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("ctl.erb");
        std::fs::write(&input, b"#!/bin/bash\n")?;

        let mut builder = Builder::new(Vec::new());
        builder.add_file(
            &input,
            &[
                AddOption::Hermetic,
                AddOption::Prefix("./templates/".to_string()),
                AddOption::Mode(0o644),
            ],
        )?;
        let buf = builder.close()?;

        let mut archive = Archive::new(&buf[..]);
        let mut entries = archive.entries()?;
        let entry = entries.next().expect("one entry")?;
        let header = entry.header();
        assert_eq!(entry.path()?.to_string_lossy(), "./templates/ctl.erb");
        assert_eq!(header.mode()?, 0o644);
        assert_eq!(header.uid()?, 0);
        assert_eq!(header.gid()?, 0);
        assert_eq!(header.username().unwrap(), Some("root"));
        assert_eq!(header.groupname().unwrap(), Some("root"));
        assert_eq!(header.mtime()?, 0);
        assert!(entries.next().is_none());
        Ok(())
    }

    #[test]
    fn duplicate_logical_paths_are_written_twice() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("monit");
        std::fs::write(&input, b"check process\n")?;

        let mut builder = Builder::new(Vec::new());
        let opts = [AddOption::Hermetic, AddOption::Prefix("./".to_string())];
        builder.add_file(&input, &opts)?;
        builder.add_file(&input, &opts)?;
        let buf = builder.close()?;

        let mut archive = Archive::new(&buf[..]);
        assert_eq!(archive.entries()?.count(), 2);
        Ok(())
    }

    #[test]
    fn output_is_independent_of_source_metadata() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("a.bin");
        let second = dir.path().join("b.bin");
        std::fs::write(&first, b"payload")?;
        std::fs::write(&second, b"payload")?;

        let opts = [
            AddOption::Hermetic,
            AddOption::Prefix("./".to_string()),
            AddOption::Rename("payload.bin".to_string()),
            AddOption::Mode(0o755),
        ];

        let mut builder = Builder::new(Vec::new());
        builder.add_file(&first, &opts)?;
        let a = builder.close()?;

        let mut builder = Builder::new(Vec::new());
        builder.add_file(&second, &opts)?;
        let b = builder.close()?;

        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let mut builder = Builder::new(Vec::new());
        let err = builder
            .add_file(Path::new("/nonexistent/input"), &[AddOption::Hermetic])
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/input"));
    }
}

//! Block storage volume holding the log tables.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A mountable volume on which log tables are created.
///
/// Mounting happens once at startup. A failed mount is not retried.
pub trait StorageVolume {
    /// Byte sink backing one table.
    type Sink: Write + Send + 'static;

    /// Mount the volume.
    fn mount(&mut self) -> Result<()>;

    /// Create (truncate) a table named `name` on the mounted volume.
    fn create(&mut self, name: &str) -> Result<Self::Sink>;
}

/// A host directory standing in for the removable card.
///
/// The directory must already exist; formatting is not this crate's job.
#[derive(Debug, Clone)]
pub struct DirectoryVolume {
    root: PathBuf,
    mounted: bool,
}

impl DirectoryVolume {
    /// Volume rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mounted: false,
        }
    }

    /// Mount point directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StorageVolume for DirectoryVolume {
    type Sink = File;

    fn mount(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(Error::Mount {
                mount_point: self.root.display().to_string(),
                reason: "not a directory".into(),
            });
        }
        self.mounted = true;
        log::info!(target: "SD_CARD", "Storage mounted at {}", self.root.display());
        Ok(())
    }

    fn create(&mut self, name: &str) -> Result<File> {
        if !self.mounted {
            return Err(Error::Mount {
                mount_point: self.root.display().to_string(),
                reason: "volume not mounted".into(),
            });
        }
        Ok(File::create(self.root.join(name))?)
    }
}

use std::fs;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use log::debug;

use crate::error::ctx;

/// Interactor with the actual physical file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSystemInteractor;

/// This defines all interactions of `relaunch` with the filesystem.
pub trait FileOperations {
    /// Read a file into raw bytes.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Read a file into a utf8 string.
    fn read_utf8(&self, path: &Path) -> Result<String>;

    /// Write all bytes to a file.
    fn write_bytes_truncate(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Write a [String] to a file.
    fn write_utf8_truncate(&self, path: &Path, data: &str) -> Result<()>;

    /// Truncates the file and then runs [FileOperations::canonicalize].
    fn truncate_and_canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Make a file possible to execute.
    fn set_permissions(&self, path: &Path, perms: u32) -> Result<()>;

    /// Given a path try to canonicalize it.
    ///
    /// This will fail for files that do not exist.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

impl FileOperations for FileSystemInteractor {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(ctx!(
          "Could not read the file {path:?}", ;
          "Ensure that the file exists and you have permissions to access it",
        ))
    }

    fn read_utf8(&self, path: &Path) -> Result<String> {
        String::from_utf8(self.read_bytes(path)?).with_context(ctx!(
          "{path:?} is not valid UTF-8", ;
          "The file doesn't seem to be human readable?",
        ))
    }

    fn write_utf8_truncate(&self, path: &Path, data: &str) -> Result<()> {
        self.write_bytes_truncate(path, data.as_bytes())
    }

    fn write_bytes_truncate(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        fs::write(self.truncate_and_canonicalize(path)?, bytes).with_context(ctx!(
          "Could not write to the file {path:?}", ;
          "Ensure that you have permissions to write it",
        ))?;

        Ok(())
    }

    fn truncate_and_canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                debug!("Creating directories for {:?}", parent);
            }

            fs::create_dir_all(parent).with_context(ctx!(
              "Could not create parent directories for {parent:?}", ;
              "Ensure that you have sufficient permissions",
            ))?;
        }

        debug!("Creating a file at {:?}", path);
        File::create(path).with_context(ctx!(
           "Could not create {path:?}", ;
           "Ensure that you have sufficient permissions",
        ))?;

        self.canonicalize(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        path.canonicalize().with_context(ctx!(
          "Could not canonicalize {path:?}", ;
          "Ensure that your path is valid",
        ))
    }

    fn set_permissions(&self, path: &Path, perms: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, Permissions::from_mode(perms)).with_context(ctx!(
              "Could not make {path:?} executable", ;
              "Ensure that you have sufficient permissions",
            ))
        }
        #[cfg(not(unix))]
        {
            let _ = (path, perms);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "tests/file_system.rs"]
mod tests;

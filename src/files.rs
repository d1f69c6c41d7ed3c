//! The file collaborator.
//!
//! The compiler never touches the filesystem itself; it reads and writes through a
//! [FileHandler]. [FsFileHandler] is the real implementation; tests construct an in-memory one.

use std::{
    fs::{create_dir_all, read_to_string, write},
    path::PathBuf,
};

use crate::{error::DoculispError, paths::DocPath};

pub trait FileHandler {
    fn load(&self, path: &DocPath) -> Result<String, DoculispError>;

    /// Write `text` to `path`, returning the text that was written.
    fn write(&self, path: &DocPath, text: String) -> Result<String, DoculispError>;

    /// The directory relative command line paths resolve against.
    fn working_directory(&self) -> Result<PathBuf, DoculispError>;
}

#[derive(Debug, Default, Clone)]
pub struct FsFileHandler;

impl FileHandler for FsFileHandler {
    fn load(&self, path: &DocPath) -> Result<String, DoculispError> {
        tracing::debug!("Reading {}", path);
        read_to_string(path.full_name()).map_err(|e| {
            DoculispError::general(
                format!("Unable to read file: {e}"),
                Some(path.full_name().to_path_buf()),
            )
        })
    }

    fn write(&self, path: &DocPath, text: String) -> Result<String, DoculispError> {
        tracing::debug!("Writing {}", path);
        let dir = path.directory();
        create_dir_all(dir.full_name())?;
        write(path.full_name(), &text).map_err(|e| {
            DoculispError::general(
                format!("Unable to write file: {e}"),
                Some(path.full_name().to_path_buf()),
            )
        })?;
        Ok(text)
    }

    fn working_directory(&self) -> Result<PathBuf, DoculispError> {
        Ok(std::env::current_dir()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let handler = FsFileHandler;
        let path = DocPath::new("out/nested/readme.md", dir.path());
        let written = handler.write(&path, "hello".to_string()).unwrap();
        assert_eq!(written, "hello");
        assert_eq!(handler.load(&path).unwrap(), "hello");
    }

    #[test]
    fn test_missing_file_is_general_failure() {
        let dir = tempdir().unwrap();
        let err = FsFileHandler
            .load(&DocPath::new("missing.md", dir.path()))
            .unwrap_err();
        assert!(err.is_general());
        assert!(err.to_string().contains("missing.md"));
    }
}

//! Shared test utilities for compiler tests

use std::{
    cell::RefCell,
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{error::DoculispError, files::FileHandler, paths::DocPath};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// An in-memory [FileHandler] keyed by absolute path.
#[derive(Debug, Default)]
pub struct MemoryFileHandler {
    files: RefCell<BTreeMap<PathBuf, String>>,
    working_directory: PathBuf,
}

impl MemoryFileHandler {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        MemoryFileHandler {
            files: RefCell::new(
                files
                    .iter()
                    .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                    .collect(),
            ),
            working_directory: PathBuf::from("/"),
        }
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl FileHandler for MemoryFileHandler {
    fn load(&self, path: &DocPath) -> Result<String, DoculispError> {
        self.get(path.full_name()).ok_or_else(|| {
            DoculispError::general(
                "Unable to read file: not found",
                Some(path.full_name().to_path_buf()),
            )
        })
    }

    fn write(&self, path: &DocPath, text: String) -> Result<String, DoculispError> {
        self.files
            .borrow_mut()
            .insert(path.full_name().to_path_buf(), text.clone());
        Ok(text)
    }

    fn working_directory(&self) -> Result<PathBuf, DoculispError> {
        Ok(self.working_directory.clone())
    }
}

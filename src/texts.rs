use crate::config::TextSelection;
use crate::error::TextError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEXT_FILE_EXTENSION: &str = "txt";

/// Target texts on disk, looked up by the references used in the config.
#[derive(Debug, Clone)]
pub struct TextLibrary {
    dir: PathBuf,
    selection: TextSelection,
}

impl TextLibrary {
    pub fn new<P: AsRef<Path>>(dir: P, selection: TextSelection) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            selection,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn selection(&self) -> TextSelection {
        self.selection
    }

    /// Tries `reference` verbatim, then `reference.txt`.
    pub fn locate(&self, reference: &str) -> Result<PathBuf, TextError> {
        let verbatim = self.dir.join(reference);
        if verbatim.is_file() {
            return Ok(verbatim);
        }
        let with_ext = self.dir.join(format!("{reference}.{TEXT_FILE_EXTENSION}"));
        if with_ext.is_file() {
            return Ok(with_ext);
        }
        Err(TextError::NotFound {
            reference: reference.to_string(),
            dir: self.dir.clone(),
        })
    }

    pub fn resolve(&self, reference: &str) -> Result<String, TextError> {
        self.resolve_with(reference, &mut rand::thread_rng())
    }

    pub fn resolve_with<R: Rng + ?Sized>(
        &self,
        reference: &str,
        rng: &mut R,
    ) -> Result<String, TextError> {
        let path = self.locate(reference)?;
        let contents =
            fs::read_to_string(&path).map_err(|source| TextError::Io { path, source })?;

        let text = match self.selection {
            TextSelection::WholeFile => contents.trim_end(),
            TextSelection::RandomLine => {
                let lines: Vec<&str> = contents
                    .lines()
                    .map(str::trim_end)
                    .filter(|l| !l.is_empty())
                    .collect();
                lines.choose(rng).copied().unwrap_or_default()
            }
        };
        Ok(text.to_string())
    }
}

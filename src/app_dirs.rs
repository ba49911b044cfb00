use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "TYPETRIAL_DATA_DIR";

/// Centralized experiment directory resolution.
///
/// Everything lives under one data root: the config document, the text
/// files it references, and the per-round results and discards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Explicit override, then `TYPETRIAL_DATA_DIR`, then the platform data dir.
    pub fn resolve(override_root: Option<PathBuf>) -> Self {
        if let Some(root) = override_root {
            return Self::with_root(root);
        }
        if let Some(root) = std::env::var_os(DATA_DIR_ENV) {
            return Self::with_root(PathBuf::from(root));
        }
        let root = ProjectDirs::from("", "", "typetrial")
            .map(|pd| pd.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("typetrial_data"));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn texts_dir(&self) -> PathBuf {
        self.root.join("Texts")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join("Results")
    }

    pub fn discarded_dir(&self) -> PathBuf {
        self.root.join("Discarded")
    }
}

use crate::error::ConfigError;
use crate::modality::Modality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// How a referenced text file becomes a round's target text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSelection {
    /// One line of the file, picked at random.
    #[default]
    RandomLine,
    /// The whole file.
    WholeFile,
}

/// One experiment's ordered rounds: `modes[i]` is paired with `texts[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    pub modes: Vec<Modality>,
    pub texts: Vec<String>,
}

/// Experiment id to sequence mapping; the array position is the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub permutations: Vec<SequenceDefinition>,
    #[serde(default)]
    pub text_selection: TextSelection,
}

impl ExperimentConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let cfg: ExperimentConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Every sequence must pair each modality with exactly one text.
    pub fn validate(&self) -> Result<(), String> {
        for (id, seq) in self.permutations.iter().enumerate() {
            if seq.modes.len() != seq.texts.len() {
                return Err(format!(
                    "experiment {id} lists {} modalities but {} texts",
                    seq.modes.len(),
                    seq.texts.len()
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.permutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutations.is_empty()
    }

    pub fn sequence(&self, experiment_id: i64) -> Option<&SequenceDefinition> {
        usize::try_from(experiment_id)
            .ok()
            .and_then(|idx| self.permutations.get(idx))
    }

    /// Starter document written by `--init-config`.
    pub fn example() -> Self {
        Self {
            permutations: vec![
                SequenceDefinition {
                    modes: vec![
                        Modality::Visual,
                        Modality::VisualAudio,
                        Modality::VisualAudioTactile,
                    ],
                    texts: vec!["text1".into(), "text2".into(), "text3".into()],
                },
                SequenceDefinition {
                    modes: vec![
                        Modality::VisualAudioTactile,
                        Modality::VisualAudio,
                        Modality::Visual,
                    ],
                    texts: vec!["text1".into(), "text2".into(), "text3".into()],
                },
            ],
            text_selection: TextSelection::default(),
        }
    }
}

pub trait ConfigStore {
    fn location(&self) -> &Path;
    fn load(&self) -> Result<&ExperimentConfig, ConfigError>;
    fn save(&self, cfg: &ExperimentConfig) -> std::io::Result<()>;
}

/// JSON config file, read at most once successfully per store.
///
/// A failed load is not cached, so fixing the file and retrying works.
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    cached: OnceLock<ExperimentConfig>,
}

impl FileConfigStore {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
            cached: OnceLock::new(),
        }
    }

    fn read(&self) -> Result<ExperimentConfig, ConfigError> {
        let json = fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(self.path.clone()),
            _ => ConfigError::Io {
                path: self.path.clone(),
                source,
            },
        })?;
        ExperimentConfig::from_json(&json).map_err(|reason| ConfigError::Malformed {
            path: self.path.clone(),
            reason,
        })
    }
}

impl ConfigStore for FileConfigStore {
    fn location(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<&ExperimentConfig, ConfigError> {
        if let Some(cfg) = self.cached.get() {
            return Ok(cfg);
        }
        let cfg = self.read()?;
        Ok(self.cached.get_or_init(|| cfg))
    }

    fn save(&self, cfg: &ExperimentConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

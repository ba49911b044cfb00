use crate::app_dirs::AppDirs;
use crate::error::LogError;
use crate::keys::{Finger, Hand, KeyAction, KeyInput};
use crate::metrics::{error_rate, words_per_minute};
use crate::modality::Modality;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

static SAFE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[^.<>:;,?\\"*|/]+$"#).expect("Valid regex pattern"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Keystroke {
    /// Seconds since the round's first keystroke.
    pub time: f64,
    pub key: String,
    pub hand: Option<Hand>,
    pub finger: Option<Finger>,
}

/// Everything persisted about one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoundRecord {
    pub exp_id: String,
    pub round: usize,
    pub modus: String,
    pub text: String,
    pub typed_keys: Vec<String>,
    pub keystrokes: Vec<Keystroke>,
    pub words_per_minute: f64,
    pub error_rate: f64,
}

impl RoundRecord {
    pub fn new(experiment_id: &str, round: usize, modality: Modality, target: &str) -> Self {
        Self {
            exp_id: experiment_id.to_string(),
            round,
            modus: modality.to_string(),
            text: target.to_string(),
            typed_keys: Vec::new(),
            keystrokes: Vec::new(),
            words_per_minute: 0.0,
            error_rate: 0.0,
        }
    }

    pub fn typed_text(&self) -> String {
        self.typed_keys.concat()
    }

    /// The typed buffer with every space dropped, as used by both metrics.
    ///
    /// Units are concatenated, so WPM counts the chars of a multi-char label
    /// one by one, the same way the error rate compares them.
    pub fn typed_without_spaces(&self) -> String {
        self.typed_keys
            .iter()
            .filter(|unit| unit.as_str() != " ")
            .map(String::as_str)
            .collect()
    }

    fn apply(&mut self, action: KeyAction<'_>) {
        match action {
            KeyAction::Backspace => {
                self.typed_keys.pop();
            }
            KeyAction::Space => self.typed_keys.push(" ".to_string()),
            KeyAction::Ignored => {}
            KeyAction::Insert(unit) => self.typed_keys.push(unit.to_string()),
        }
    }

    fn refresh_metrics(&mut self, elapsed: std::time::Duration) {
        let typed = self.typed_without_spaces();
        self.error_rate = error_rate(&self.text, &typed);
        self.words_per_minute = words_per_minute(typed.chars().count(), elapsed);
    }
}

/// Where round records live: results and discards, each split by modality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsLayout {
    pub results_dir: PathBuf,
    pub discarded_dir: PathBuf,
}

impl ResultsLayout {
    pub fn new(results_dir: impl Into<PathBuf>, discarded_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            discarded_dir: discarded_dir.into(),
        }
    }

    pub fn result_path(&self, modality: Modality, file_name: &str) -> PathBuf {
        self.results_dir.join(modality.to_string()).join(file_name)
    }

    pub fn discard_path(&self, modality: Modality, file_name: &str) -> PathBuf {
        self.discarded_dir.join(modality.to_string()).join(file_name)
    }
}

impl From<&AppDirs> for ResultsLayout {
    fn from(dirs: &AppDirs) -> Self {
        Self::new(dirs.results_dir(), dirs.discarded_dir())
    }
}

/// Record filename; ids that are unsafe in a path fall back to timestamp + round.
pub fn record_file_name(experiment_id: &str, round: usize, at: DateTime<Local>) -> String {
    let time = at.format(TIMESTAMP_FORMAT);
    if SAFE_ID_REGEX.is_match(experiment_id) {
        format!("{time}-expid-{experiment_id}-round-{round}.json")
    } else {
        error!(
            "Using fallback filename, experiment id {:?} contains illegal characters",
            experiment_id
        );
        format!("{time}-round-{round}.json")
    }
}

/// Owns the record of the one open round and keeps its file current.
///
/// Every mutation rewrites the whole file before returning.
#[derive(Debug)]
pub struct RoundLogger {
    record: RoundRecord,
    modality: Modality,
    file_name: String,
    layout: ResultsLayout,
    path: PathBuf,
    first_input: Option<Instant>,
    discarded: bool,
}

impl RoundLogger {
    pub fn open(
        layout: &ResultsLayout,
        experiment_id: &str,
        round: usize,
        modality: Modality,
        target: &str,
    ) -> Result<Self, LogError> {
        let file_name = record_file_name(experiment_id, round, Local::now());
        let logger = Self {
            record: RoundRecord::new(experiment_id, round, modality, target),
            modality,
            path: layout.result_path(modality, &file_name),
            file_name,
            layout: layout.clone(),
            first_input: None,
            discarded: false,
        };
        logger.persist()?;
        info!("Input data will be logged in {}", logger.path.display());
        Ok(logger)
    }

    pub fn record(&mut self, input: &KeyInput) -> Result<(), LogError> {
        self.record_at(input, Instant::now())
    }

    /// Logs one keystroke observed at `at`; the first one defines t=0.
    pub fn record_at(&mut self, input: &KeyInput, at: Instant) -> Result<(), LogError> {
        let first = *self.first_input.get_or_insert(at);
        let elapsed = at.saturating_duration_since(first);

        self.record.keystrokes.push(Keystroke {
            time: elapsed.as_secs_f64(),
            key: input.label.clone(),
            hand: input.hand,
            finger: input.finger,
        });
        self.record.apply(input.action());
        self.record.refresh_metrics(elapsed);

        debug!(
            key = %input.label,
            wpm = self.record.words_per_minute,
            error_rate = self.record.error_rate,
            "keystroke recorded"
        );
        self.persist()
    }

    /// Moves the file into the discard archive under the same name.
    ///
    /// Later writes go to the archived file. Discarding twice is a caller bug
    /// and is refused without touching the disk.
    pub fn discard(&mut self) -> Result<&Path, LogError> {
        if self.discarded {
            return Err(LogError::AlreadyDiscarded(self.path.clone()));
        }
        let target = self.layout.discard_path(self.modality, &self.file_name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| LogError::io(parent, e))?;
        }
        move_file(&self.path, &target)?;
        info!(
            "Discarded {} into {}",
            self.path.display(),
            target.display()
        );
        self.path = target;
        self.discarded = true;
        Ok(self.path.as_path())
    }

    /// Rewrites the file from the in-memory record.
    pub fn flush(&self) -> Result<(), LogError> {
        self.persist()
    }

    /// Closes the round and hands back where its record lives.
    ///
    /// Every mutation is already on disk, so nothing is written here. An
    /// archived round cannot be finalized.
    pub fn finalize(self) -> Result<PathBuf, LogError> {
        if self.discarded {
            return Err(LogError::AlreadyDiscarded(self.path));
        }
        Ok(self.path)
    }

    pub fn round_record(&self) -> &RoundRecord {
        &self.record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    fn persist(&self) -> Result<(), LogError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LogError::io(parent, e))?;
        }
        let data = serde_json::to_vec_pretty(&self.record)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| LogError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| LogError::io(&self.path, e))
    }
}

fn move_file(from: &Path, to: &Path) -> Result<(), LogError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems
    fs::copy(from, to).map_err(|e| LogError::io(to, e))?;
    if let Err(e) = fs::remove_file(from) {
        // the record must end up in exactly one place
        let _ = fs::remove_file(to);
        return Err(LogError::io(from, e));
    }
    Ok(())
}

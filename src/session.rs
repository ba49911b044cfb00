use crate::app_dirs::AppDirs;
use crate::config::{ConfigStore, FileConfigStore};
use crate::error::{ConfigError, LogError, SequenceError, SessionError};
use crate::keys::{InputSource, KeyInput};
use crate::modality::Modality;
use crate::round_log::{ResultsLayout, RoundLogger, RoundRecord};
use crate::sequence::{Position, RoundSlot, SequenceCursor};
use crate::stage::{LogStage, Stage};
use crate::texts::TextLibrary;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperimentState {
    #[default]
    Inactive,
    Standby,
    Active,
}

/// Everything the host can feed into a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start(i64),
    Advance,
    Reset,
    /// Edge from the finish gesture: the participant is done with the round.
    Finish,
    Keystroke(KeyInput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyRunning,
    NotActive,
    NotInStandby,
    /// Physical keyboard input outside the no-VR modality.
    InputDisabled,
    /// The round is active but a failed reset left it without a record.
    NoOpenRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Entered(ExperimentState),
    Recorded,
    Rejected(Rejection),
}

/// Drives one experiment at a time: sequence cursor, round logger and stage.
///
/// At most one round logger is open, and only while `Active`.
pub struct SessionController<C: ConfigStore = FileConfigStore, S: Stage = LogStage> {
    store: C,
    texts_dir: PathBuf,
    layout: ResultsLayout,
    stage: S,
    state: ExperimentState,
    cursor: Option<SequenceCursor>,
    logger: Option<RoundLogger>,
}

impl<S: Stage> SessionController<FileConfigStore, S> {
    pub fn new(dirs: &AppDirs, stage: S) -> Self {
        Self::with_store(
            FileConfigStore::with_path(dirs.config_path()),
            dirs.texts_dir(),
            ResultsLayout::from(dirs),
            stage,
        )
    }
}

impl<C: ConfigStore, S: Stage> SessionController<C, S> {
    pub fn with_store(store: C, texts_dir: PathBuf, layout: ResultsLayout, stage: S) -> Self {
        let mut controller = Self {
            store,
            texts_dir,
            layout,
            stage,
            state: ExperimentState::Inactive,
            cursor: None,
            logger: None,
        };
        controller.stage.apply_modality(Modality::Deactivated);
        controller
    }

    /// Loads the config now so problems surface before the first `start`.
    pub fn preload(&self) -> Result<usize, ConfigError> {
        self.store.load().map(|cfg| cfg.len())
    }

    /// Single entry point for host commands and signals.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Outcome, SessionError> {
        let result = match event {
            SessionEvent::Start(id) => self.start(id),
            SessionEvent::Advance => self.advance(),
            SessionEvent::Reset => self.reset(),
            SessionEvent::Finish => self.finish(),
            SessionEvent::Keystroke(input) => self.keystroke(&input),
        };
        if let Err(e) = &result {
            error!("{e}");
        }
        result
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn current_modality(&self) -> Modality {
        self.cursor
            .as_ref()
            .map_or(Modality::Deactivated, |c| c.current().modality)
    }

    pub fn position(&self) -> Option<Position<'_>> {
        self.cursor.as_ref().map(SequenceCursor::current)
    }

    pub fn config_location(&self) -> &Path {
        self.store.location()
    }

    pub fn current_record(&self) -> Option<&RoundRecord> {
        self.logger.as_ref().map(RoundLogger::round_record)
    }

    pub fn current_record_path(&self) -> Option<&Path> {
        self.logger.as_ref().map(RoundLogger::path)
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    fn start(&mut self, experiment_id: i64) -> Result<Outcome, SessionError> {
        if self.state != ExperimentState::Inactive {
            warn!(
                "Another experiment has already been started and is still running. \
                 Finish it before starting experiment {experiment_id}"
            );
            return Ok(Outcome::Rejected(Rejection::AlreadyRunning));
        }

        info!("### STARTING EXPERIMENT ###");
        info!(
            "Loading experiment from config file {}",
            self.store.location().display()
        );
        let config = self.store.load()?;
        let texts = TextLibrary::new(&self.texts_dir, config.text_selection);
        let mut cursor = SequenceCursor::build(experiment_id, config, &texts)?;

        info!("Loaded experiment with ID {experiment_id}, sequence:");
        for slot in cursor.rounds() {
            info!("  {} ({})", slot.modality, slot.text_name);
        }

        let logger = match cursor.peek_next() {
            Some((round, slot)) => open_logger(&self.layout, experiment_id, round, slot)?,
            None => return Err(SequenceError::Exhausted.into()),
        };
        let slot = cursor.advance()?.clone();

        self.cursor = Some(cursor);
        self.logger = Some(logger);
        self.enter_round(&slot);
        Ok(Outcome::Entered(ExperimentState::Active))
    }

    fn advance(&mut self) -> Result<Outcome, SessionError> {
        if self.state != ExperimentState::Standby {
            warn!("The experiment needs to be in STANDBY to switch to the next modality");
            return Ok(Outcome::Rejected(Rejection::NotInStandby));
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(Outcome::Rejected(Rejection::NotInStandby));
        };

        let Some((round, slot)) = cursor.peek_next() else {
            return Err(SequenceError::Exhausted.into());
        };
        let logger = open_logger(&self.layout, cursor.experiment_id(), round, slot)?;
        let slot = cursor.advance()?.clone();

        self.logger = Some(logger);
        self.enter_round(&slot);
        Ok(Outcome::Entered(ExperimentState::Active))
    }

    fn finish(&mut self) -> Result<Outcome, SessionError> {
        if self.state != ExperimentState::Active {
            warn!("Finish signal ignored, no round is active");
            return Ok(Outcome::Rejected(Rejection::NotActive));
        }
        let Some(logger) = self.logger.as_ref() else {
            warn!("Finish signal ignored, the round has no open record. Use `modereset`");
            return Ok(Outcome::Rejected(Rejection::NoOpenRecord));
        };
        logger.flush()?;
        if let Some(logger) = self.logger.take() {
            let path = logger.finalize()?;
            info!("Round saved to {}", path.display());
        }

        let has_next = self.cursor.as_ref().is_some_and(SequenceCursor::has_next);
        if !has_next {
            self.end_experiment();
            return Ok(Outcome::Entered(ExperimentState::Inactive));
        }

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.deactivate();
        }
        self.state = ExperimentState::Standby;
        self.stage.apply_modality(Modality::Deactivated);
        self.stage.show_standby();
        info!(
            "Round finished, experiment now in STANDBY! Please ask the participant to \
             answer the questionnaires now. To continue, enter the `modenext` command"
        );
        Ok(Outcome::Entered(ExperimentState::Standby))
    }

    fn reset(&mut self) -> Result<Outcome, SessionError> {
        if self.state != ExperimentState::Active {
            warn!("You need to be in an active experiment state to reset the round");
            return Ok(Outcome::Rejected(Rejection::NotActive));
        }
        let Some(cursor) = self.cursor.as_ref() else {
            return Ok(Outcome::Rejected(Rejection::NotActive));
        };
        let (Some(round), Some(slot)) = (cursor.round_index(), cursor.current_slot()) else {
            return Ok(Outcome::Rejected(Rejection::NotActive));
        };

        info!("Resetting the current round for modality {}", slot.modality);
        // A failed discard keeps the logger; once archived it is never reused.
        if let Some(logger) = self.logger.as_mut() {
            logger.discard()?;
        }
        self.logger = None;
        self.stage.clear_typed();

        let fresh = open_logger(&self.layout, cursor.experiment_id(), round, slot)?;
        self.logger = Some(fresh);
        Ok(Outcome::Entered(ExperimentState::Active))
    }

    fn keystroke(&mut self, input: &KeyInput) -> Result<Outcome, SessionError> {
        if self.state != ExperimentState::Active {
            debug!(key = %input.label, "keystroke outside an active round ignored");
            return Ok(Outcome::Rejected(Rejection::NotActive));
        }
        if input.source == InputSource::Physical && self.current_modality() != Modality::NoVr {
            debug!(key = %input.label, "physical keyboard disabled in this modality");
            return Ok(Outcome::Rejected(Rejection::InputDisabled));
        }
        let Some(logger) = self.logger.as_mut() else {
            debug!(key = %input.label, "keystroke dropped, the round has no open record");
            return Ok(Outcome::Rejected(Rejection::NoOpenRecord));
        };
        logger.record(input)?;
        Ok(Outcome::Recorded)
    }

    fn enter_round(&mut self, slot: &RoundSlot) {
        self.state = ExperimentState::Active;
        self.stage.clear_typed();
        self.stage.apply_modality(slot.modality);
        self.stage.show_target(&slot.text);
        info!("Entered modality: {}", slot.modality);
    }

    fn end_experiment(&mut self) {
        info!("Experiment over! You can start another experiment or close the program");
        self.state = ExperimentState::Inactive;
        self.cursor = None;
        self.logger = None;
        self.stage.apply_modality(Modality::Deactivated);
        self.stage.show_idle();
    }
}

fn open_logger(
    layout: &ResultsLayout,
    experiment_id: i64,
    round: usize,
    slot: &RoundSlot,
) -> Result<RoundLogger, LogError> {
    RoundLogger::open(
        layout,
        &experiment_id.to_string(),
        round,
        slot.modality,
        &slot.text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExperimentConfig, SequenceDefinition, TextSelection};
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    #[derive(Debug, Default)]
    struct RecordingStage {
        calls: Vec<String>,
    }

    impl Stage for RecordingStage {
        fn apply_modality(&mut self, modality: Modality) {
            self.calls.push(format!("modality {modality}"));
        }
        fn show_target(&mut self, text: &str) {
            self.calls.push(format!("target {text}"));
        }
        fn show_standby(&mut self) {
            self.calls.push("standby".into());
        }
        fn show_idle(&mut self) {
            self.calls.push("idle".into());
        }
        fn clear_typed(&mut self) {
            self.calls.push("clear".into());
        }
    }

    fn setup(sequences: Vec<Vec<Modality>>) -> (TempDir, AppDirs) {
        let dir = tempdir().unwrap();
        let dirs = AppDirs::with_root(dir.path());
        fs::create_dir_all(dirs.texts_dir()).unwrap();
        fs::write(dirs.texts_dir().join("cat.txt"), "cat\n").unwrap();
        fs::write(dirs.texts_dir().join("dog.txt"), "dog\n").unwrap();
        let cfg = ExperimentConfig {
            permutations: sequences
                .into_iter()
                .map(|modes| SequenceDefinition {
                    texts: modes
                        .iter()
                        .enumerate()
                        .map(|(i, _)| if i % 2 == 0 { "cat" } else { "dog" }.to_string())
                        .collect(),
                    modes,
                })
                .collect(),
            text_selection: TextSelection::WholeFile,
        };
        FileConfigStore::with_path(dirs.config_path())
            .save(&cfg)
            .unwrap();
        (dir, dirs)
    }

    fn controller(dirs: &AppDirs) -> SessionController<FileConfigStore, RecordingStage> {
        SessionController::new(dirs, RecordingStage::default())
    }

    fn files_in(dir: PathBuf) -> usize {
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn test_start_unknown_id_stays_inactive() {
        let (_dir, dirs) = setup(vec![
            vec![Modality::Visual],
            vec![Modality::VisualAudio],
            vec![Modality::NoVr],
        ]);
        let mut c = controller(&dirs);

        for id in [5, 3, -1] {
            let err = c.dispatch(SessionEvent::Start(id)).unwrap_err();
            assert_matches!(
                err,
                SessionError::Sequence(SequenceError::UnknownId { available: 3, .. })
            );
            assert_eq!(c.state(), ExperimentState::Inactive);
        }
        assert_eq!(c.current_modality(), Modality::Deactivated);
        assert_eq!(files_in(dirs.results_dir()), 0);
    }

    #[test]
    fn test_start_opens_round_zero() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::VisualAudio]]);
        let mut c = controller(&dirs);

        assert_eq!(
            c.dispatch(SessionEvent::Start(0)).unwrap(),
            Outcome::Entered(ExperimentState::Active)
        );
        assert_eq!(c.current_modality(), Modality::Visual);
        assert_eq!(c.position().unwrap().round, 0);
        let record = c.current_record().unwrap();
        assert_eq!(record.text, "cat");
        assert_eq!(record.exp_id, "0");
        assert!(c.current_record_path().unwrap().exists());
        assert_eq!(files_in(dirs.results_dir().join("VISUAL")), 1);
        assert_eq!(
            c.stage().calls,
            vec!["modality DEACTIVATED", "clear", "modality VISUAL", "target cat"]
        );
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();

        assert_eq!(
            c.dispatch(SessionEvent::Start(0)).unwrap(),
            Outcome::Rejected(Rejection::AlreadyRunning)
        );
        assert_eq!(c.state(), ExperimentState::Active);

        c.dispatch(SessionEvent::Finish).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Start(0)).unwrap(),
            Outcome::Rejected(Rejection::AlreadyRunning)
        );
        assert_eq!(c.state(), ExperimentState::Standby);
    }

    #[test]
    fn test_walks_every_round_and_ends_inactive() {
        let modes = vec![Modality::Visual, Modality::VisualAudio, Modality::VisualAudioTactile];
        let (_dir, dirs) = setup(vec![modes.clone()]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();

        for (round, modality) in modes.iter().enumerate() {
            assert_eq!(c.state(), ExperimentState::Active);
            assert_eq!(c.current_modality(), *modality);
            assert_eq!(c.position().unwrap().round, round as i64);
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("c")))
                .unwrap();

            let next = c.dispatch(SessionEvent::Finish).unwrap();
            if round + 1 < modes.len() {
                assert_eq!(next, Outcome::Entered(ExperimentState::Standby));
                assert_eq!(c.current_modality(), Modality::Deactivated);
                c.dispatch(SessionEvent::Advance).unwrap();
            } else {
                assert_eq!(next, Outcome::Entered(ExperimentState::Inactive));
            }
        }

        assert_eq!(c.state(), ExperimentState::Inactive);
        assert!(c.position().is_none());
        for m in &modes {
            assert_eq!(files_in(dirs.results_dir().join(m.to_string())), 1);
        }
        assert_eq!(
            c.dispatch(SessionEvent::Advance).unwrap(),
            Outcome::Rejected(Rejection::NotInStandby)
        );
        assert_eq!(c.stage().calls.last().unwrap(), "idle");
    }

    #[test]
    fn test_experiment_can_restart_after_completion() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        c.dispatch(SessionEvent::Finish).unwrap();
        assert_eq!(c.state(), ExperimentState::Inactive);

        assert_eq!(
            c.dispatch(SessionEvent::Start(0)).unwrap(),
            Outcome::Entered(ExperimentState::Active)
        );
    }

    #[test]
    fn test_reset_discards_and_reopens_same_round() {
        let (_dir, dirs) = setup(vec![vec![Modality::VisualAudio, Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        c.dispatch(SessionEvent::Keystroke(KeyInput::new("x")))
            .unwrap();
        let old_path = c.current_record_path().unwrap().to_path_buf();
        let old_bytes = fs::read(&old_path).unwrap();

        assert_eq!(
            c.dispatch(SessionEvent::Reset).unwrap(),
            Outcome::Entered(ExperimentState::Active)
        );

        let archived = dirs
            .discarded_dir()
            .join("VISUAL_AUDIO")
            .join(old_path.file_name().unwrap());
        assert_eq!(fs::read(&archived).unwrap(), old_bytes);
        let record = c.current_record().unwrap();
        assert!(record.typed_keys.is_empty());
        assert_eq!(record.round, 0);
        assert!(c.current_record_path().unwrap().exists());
        assert_eq!(c.position().unwrap().round, 0);
    }

    #[test]
    fn test_reset_outside_active_is_rejected() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::Visual]]);
        let mut c = controller(&dirs);
        assert_eq!(
            c.dispatch(SessionEvent::Reset).unwrap(),
            Outcome::Rejected(Rejection::NotActive)
        );

        c.dispatch(SessionEvent::Start(0)).unwrap();
        c.dispatch(SessionEvent::Finish).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Reset).unwrap(),
            Outcome::Rejected(Rejection::NotActive)
        );
        assert_eq!(c.state(), ExperimentState::Standby);
        assert_eq!(files_in(dirs.discarded_dir()), 0);
    }

    #[test]
    fn test_keystrokes_only_reach_active_round() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::Visual]]);
        let mut c = controller(&dirs);
        assert_eq!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("a"))).unwrap(),
            Outcome::Rejected(Rejection::NotActive)
        );

        c.dispatch(SessionEvent::Start(0)).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("c"))).unwrap(),
            Outcome::Recorded
        );
        c.dispatch(SessionEvent::Finish).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("a"))).unwrap(),
            Outcome::Rejected(Rejection::NotActive)
        );
        assert!(c.current_record().is_none());
    }

    #[test]
    fn test_physical_keyboard_only_in_no_vr() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::NoVr]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::from_char('c'))).unwrap(),
            Outcome::Rejected(Rejection::InputDisabled)
        );

        c.dispatch(SessionEvent::Finish).unwrap();
        c.dispatch(SessionEvent::Advance).unwrap();
        assert_eq!(c.current_modality(), Modality::NoVr);
        for ch in "dog".chars() {
            assert_eq!(
                c.dispatch(SessionEvent::Keystroke(KeyInput::from_char(ch))).unwrap(),
                Outcome::Recorded
            );
        }
        assert_eq!(c.current_record().unwrap().error_rate, 0.0);
    }

    #[test]
    fn test_missing_config_then_retry() {
        let dir = tempdir().unwrap();
        let dirs = AppDirs::with_root(dir.path());
        let mut c = controller(&dirs);

        assert_matches!(
            c.dispatch(SessionEvent::Start(0)),
            Err(SessionError::Config(ConfigError::NotFound(_)))
        );
        assert_matches!(c.preload(), Err(ConfigError::NotFound(_)));
        assert_eq!(c.state(), ExperimentState::Inactive);

        fs::create_dir_all(dirs.texts_dir()).unwrap();
        fs::write(dirs.texts_dir().join("t.txt"), "t").unwrap();
        fs::write(
            dirs.config_path(),
            r#"{"permutations":[{"modes":[2],"texts":["t"]}]}"#,
        )
        .unwrap();
        assert_eq!(c.preload().unwrap(), 1);
        assert_eq!(
            c.dispatch(SessionEvent::Start(0)).unwrap(),
            Outcome::Entered(ExperimentState::Active)
        );
        assert_eq!(c.config_location(), dirs.config_path());
    }

    #[test]
    fn test_missing_text_rejects_start() {
        let dir = tempdir().unwrap();
        let dirs = AppDirs::with_root(dir.path());
        fs::write(
            dirs.config_path(),
            r#"{"permutations":[{"modes":[2,3],"texts":["t","gone"]}]}"#,
        )
        .unwrap();
        fs::create_dir_all(dirs.texts_dir()).unwrap();
        fs::write(dirs.texts_dir().join("t.txt"), "t").unwrap();
        let mut c = controller(&dirs);

        assert_matches!(
            c.dispatch(SessionEvent::Start(0)),
            Err(SessionError::Sequence(SequenceError::Invalid { .. }))
        );
        assert_eq!(c.state(), ExperimentState::Inactive);
        assert_eq!(files_in(dirs.results_dir()), 0);
    }

    #[test]
    fn test_failed_reopen_after_discard_blocks_finish() {
        let (dir, dirs) = setup(vec![vec![Modality::Visual, Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        c.dispatch(SessionEvent::Keystroke(KeyInput::new("c"))).unwrap();

        let blocked = dir.path().join("blocked");
        fs::write(&blocked, "not a directory").unwrap();
        c.layout.results_dir = blocked;

        assert_matches!(
            c.dispatch(SessionEvent::Reset),
            Err(SessionError::Log(LogError::Io { .. }))
        );
        assert_eq!(c.state(), ExperimentState::Active);
        assert!(c.current_record().is_none());
        assert_eq!(files_in(dirs.discarded_dir().join("VISUAL")), 1);
        assert_eq!(files_in(dirs.results_dir().join("VISUAL")), 0);

        assert_eq!(
            c.dispatch(SessionEvent::Finish).unwrap(),
            Outcome::Rejected(Rejection::NoOpenRecord)
        );
        assert_eq!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("a"))).unwrap(),
            Outcome::Rejected(Rejection::NoOpenRecord)
        );
        assert_eq!(c.state(), ExperimentState::Active);

        c.layout.results_dir = dirs.results_dir();
        assert_eq!(
            c.dispatch(SessionEvent::Reset).unwrap(),
            Outcome::Entered(ExperimentState::Active)
        );
        assert_eq!(c.current_record().unwrap().round, 0);
        assert_eq!(
            c.dispatch(SessionEvent::Finish).unwrap(),
            Outcome::Entered(ExperimentState::Standby)
        );
        assert_eq!(files_in(dirs.results_dir().join("VISUAL")), 1);
        assert_eq!(files_in(dirs.discarded_dir().join("VISUAL")), 1);
    }

    #[test]
    fn test_keystroke_write_failure_is_surfaced() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();

        let modality_dir = dirs.results_dir().join("VISUAL");
        fs::remove_dir_all(&modality_dir).unwrap();
        fs::write(&modality_dir, "not a directory").unwrap();

        assert_matches!(
            c.dispatch(SessionEvent::Keystroke(KeyInput::new("c"))),
            Err(SessionError::Log(LogError::Io { .. }))
        );
        assert_eq!(c.state(), ExperimentState::Active);
        assert_matches!(
            c.dispatch(SessionEvent::Finish),
            Err(SessionError::Log(LogError::Io { .. }))
        );
        assert_eq!(c.state(), ExperimentState::Active);
        assert!(c.current_record().is_some());
    }

    #[test]
    fn test_advance_after_last_round_is_rejected() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        assert_eq!(
            c.dispatch(SessionEvent::Finish).unwrap(),
            Outcome::Entered(ExperimentState::Inactive)
        );
        assert_eq!(
            c.dispatch(SessionEvent::Advance).unwrap(),
            Outcome::Rejected(Rejection::NotInStandby)
        );
    }

    #[test]
    fn test_standby_shows_notice_and_advance_shows_next_target() {
        let (_dir, dirs) = setup(vec![vec![Modality::Visual, Modality::VisualAudio]]);
        let mut c = controller(&dirs);
        c.dispatch(SessionEvent::Start(0)).unwrap();
        c.dispatch(SessionEvent::Finish).unwrap();
        c.dispatch(SessionEvent::Advance).unwrap();

        let calls = &c.stage().calls;
        let tail: Vec<&str> = calls[calls.len() - 5..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "modality DEACTIVATED",
                "standby",
                "clear",
                "modality VISUAL_AUDIO",
                "target dog",
            ]
        );
    }
}

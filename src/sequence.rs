use crate::config::ExperimentConfig;
use crate::error::SequenceError;
use crate::modality::Modality;
use crate::texts::TextLibrary;

/// One resolved round of an experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSlot {
    pub modality: Modality,
    pub text: String,
    pub text_name: String,
}

/// Read-only view of where the cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    pub modality: Modality,
    pub text: Option<&'a str>,
    /// -1 until the first `advance`.
    pub round: i64,
}

/// Forward-only walk over a fully resolved experiment sequence.
#[derive(Debug, Clone)]
pub struct SequenceCursor {
    experiment_id: i64,
    rounds: Vec<RoundSlot>,
    round: Option<usize>,
    modality: Modality,
}

impl SequenceCursor {
    /// Resolves every text up front; any failure rejects the whole sequence.
    pub fn build(
        experiment_id: i64,
        config: &ExperimentConfig,
        texts: &TextLibrary,
    ) -> Result<Self, SequenceError> {
        let definition = config
            .sequence(experiment_id)
            .ok_or(SequenceError::UnknownId {
                id: experiment_id,
                available: config.len(),
            })?;

        let invalid = |reason: String| SequenceError::Invalid {
            id: experiment_id,
            reason,
        };

        if definition.modes.len() != definition.texts.len() {
            return Err(invalid(format!(
                "{} modalities but {} texts",
                definition.modes.len(),
                definition.texts.len()
            )));
        }
        if definition.modes.is_empty() {
            return Err(invalid("sequence has no rounds".to_string()));
        }

        let rounds = definition
            .modes
            .iter()
            .zip(&definition.texts)
            .map(|(&modality, name)| {
                texts
                    .resolve(name)
                    .map(|text| RoundSlot {
                        modality,
                        text,
                        text_name: name.clone(),
                    })
                    .map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            experiment_id,
            rounds,
            round: None,
            modality: Modality::Deactivated,
        })
    }

    pub fn experiment_id(&self) -> i64 {
        self.experiment_id
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn rounds(&self) -> &[RoundSlot] {
        &self.rounds
    }

    fn next_index(&self) -> usize {
        self.round.map_or(0, |r| r + 1)
    }

    pub fn has_next(&self) -> bool {
        self.next_index() < self.rounds.len()
    }

    /// The round `advance` would move to, without moving.
    pub fn peek_next(&self) -> Option<(usize, &RoundSlot)> {
        let next = self.next_index();
        self.rounds.get(next).map(|slot| (next, slot))
    }

    pub fn advance(&mut self) -> Result<&RoundSlot, SequenceError> {
        let next = self.next_index();
        let slot = self.rounds.get(next).ok_or(SequenceError::Exhausted)?;
        self.round = Some(next);
        self.modality = slot.modality;
        Ok(slot)
    }

    pub fn current(&self) -> Position<'_> {
        Position {
            modality: self.modality,
            text: self.current_slot().map(|s| s.text.as_str()),
            round: self.round.map_or(-1, |r| r as i64),
        }
    }

    pub fn round_index(&self) -> Option<usize> {
        self.round
    }

    pub fn current_slot(&self) -> Option<&RoundSlot> {
        self.round.and_then(|r| self.rounds.get(r))
    }

    /// Standby: channels off, round index kept.
    pub fn deactivate(&mut self) {
        self.modality = Modality::Deactivated;
    }
}

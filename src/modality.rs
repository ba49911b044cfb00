use serde::{Deserialize, Serialize};
use std::fmt;

/// Combination of interaction channels applied during a round.
///
/// Config files encode modalities as small integers; anything outside the
/// known range is rejected rather than coerced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    #[default]
    Deactivated,
    NoVr,
    Visual,
    VisualAudio,
    VisualAudioTactile,
}

/// Which channels a modality switches on in the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub interactions: bool,
    pub audio: bool,
    pub haptics: bool,
    pub no_vr: bool,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::Deactivated,
        Modality::NoVr,
        Modality::Visual,
        Modality::VisualAudio,
        Modality::VisualAudioTactile,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn channels(self) -> Channels {
        let (interactions, audio, haptics, no_vr) = match self {
            Modality::Deactivated => (false, false, false, false),
            Modality::NoVr => (false, false, false, true),
            Modality::Visual => (true, false, false, false),
            Modality::VisualAudio => (true, true, false, false),
            Modality::VisualAudioTactile => (true, true, true, false),
        };
        Channels {
            interactions,
            audio,
            haptics,
            no_vr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownModality(pub u8);

impl fmt::Display for UnknownModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown modality code {} (expected 0..={})",
            self.0,
            Modality::ALL.len() - 1
        )
    }
}

impl std::error::Error for UnknownModality {}

impl TryFrom<u8> for Modality {
    type Error = UnknownModality;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Modality::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(UnknownModality(code))
    }
}

impl From<Modality> for u8 {
    fn from(m: Modality) -> Self {
        m.code()
    }
}

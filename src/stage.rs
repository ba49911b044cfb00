use crate::modality::Modality;
use tracing::info;

pub const STANDBY_NOTICE: &str =
    "Round complete! Please ask the experimenter for the next instructions to continue.";

/// Host scene the controller drives: channels, target text, typed field.
///
/// Rendering, glove haptics, audio and camera switching live behind this.
pub trait Stage {
    fn apply_modality(&mut self, modality: Modality);
    fn show_target(&mut self, text: &str);
    fn show_standby(&mut self);
    fn show_idle(&mut self);
    fn clear_typed(&mut self);
}

/// Stage that only reports what it would show.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStage;

impl Stage for LogStage {
    fn apply_modality(&mut self, modality: Modality) {
        let ch = modality.channels();
        info!(
            interactions = ch.interactions,
            audio = ch.audio,
            haptics = ch.haptics,
            no_vr = ch.no_vr,
            "modality applied: {modality}"
        );
    }

    fn show_target(&mut self, text: &str) {
        info!("Using text: {text}");
    }

    fn show_standby(&mut self) {
        info!("{STANDBY_NOTICE}");
    }

    fn show_idle(&mut self) {
        info!("Waiting for the next experiment");
    }

    fn clear_typed(&mut self) {}
}

impl<S: Stage + ?Sized> Stage for &mut S {
    fn apply_modality(&mut self, modality: Modality) {
        (**self).apply_modality(modality)
    }

    fn show_target(&mut self, text: &str) {
        (**self).show_target(text)
    }

    fn show_standby(&mut self) {
        (**self).show_standby()
    }

    fn show_idle(&mut self) {
        (**self).show_idle()
    }

    fn clear_typed(&mut self) {
        (**self).clear_typed()
    }
}

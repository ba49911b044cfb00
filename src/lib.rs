// Library surface for the host binary and integration tests.
pub mod app_dirs;
pub mod config;
pub mod console;
pub mod error;
pub mod finish_gesture;
pub mod keys;
pub mod logging;
pub mod metrics;
pub mod modality;
pub mod round_log;
pub mod sequence;
pub mod session;
pub mod stage;
pub mod texts;

pub use session::{ExperimentState, Outcome, Rejection, SessionController, SessionEvent};

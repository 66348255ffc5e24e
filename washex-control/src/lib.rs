pub mod input;
pub mod session;
pub mod stimulus;

pub use input::OperatorInput;
pub use session::ControlSession;
pub use stimulus::{FixedDurationPlayer, POSTER_CAPTURE_FILE, StimulusPlayer, stimulus_asset};

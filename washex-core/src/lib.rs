pub mod message;
pub mod metadata;
pub mod path;
pub mod state;

pub use message::LifecycleMessage;
pub use metadata::{ArmbandPosition, MetadataError, StimulusMode, TrialMetadata};
pub use path::{ensure_output_dir, output_path};
pub use state::TrialState;

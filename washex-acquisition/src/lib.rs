pub mod machine;
pub mod run;
pub mod sample;
pub mod sink;
pub mod source;

pub use machine::{Applied, TrialError, TrialStateMachine};
pub use run::run;
pub use sample::EmgSample;
pub use sink::{CsvSink, SAMPLE_FILE, Sink, SinkError};
pub use source::{SampleSource, SyntheticArmband, spawn_sampler};

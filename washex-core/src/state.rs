/// Lifecycle of the single active trial. Owned by the acquisition process
/// and mutated only by messages received over the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    /// No trial running; initial state and the state between trials.
    #[default]
    Idle,
    /// StartTrial accepted, sink and sample source still confirming.
    Armed,
    /// Samples are being persisted to the trial's output path.
    Recording,
}

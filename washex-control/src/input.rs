use washex_core::{ArmbandPosition, MetadataError, StimulusMode, TrialMetadata};

/// Raw operator-surface values, exactly as entered. Validation happens
/// here, at the boundary: if it fails, no message is ever constructed and
/// no directory is created.
#[derive(Debug, Clone)]
pub struct OperatorInput {
    pub participant: String,
    pub trial: String,
    pub position: ArmbandPosition,
    pub mode: StimulusMode,
}

impl OperatorInput {
    pub fn into_metadata(self) -> Result<TrialMetadata, MetadataError> {
        TrialMetadata::new(self.participant, self.trial, self.position, self.mode)
    }
}

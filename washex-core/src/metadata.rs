use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("participant name must not be empty")]
    EmptyParticipant,
    #[error("trial index must not be empty")]
    EmptyTrial,
}

/// The four three-band placements offered by the operator surface.
///
/// The display labels are a persisted contract: downstream analysis tooling
/// matches on the exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmbandPosition {
    LeftUpperLeftLowerRightUpper,
    LeftUpperLeftLowerRightLower,
    LeftUpperRightUpperRightLower,
    LeftLowerRightUpperRightLower,
}

impl ArmbandPosition {
    pub const ALL: [ArmbandPosition; 4] = [
        ArmbandPosition::LeftUpperLeftLowerRightUpper,
        ArmbandPosition::LeftUpperLeftLowerRightLower,
        ArmbandPosition::LeftUpperRightUpperRightLower,
        ArmbandPosition::LeftLowerRightUpperRightLower,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ArmbandPosition::LeftUpperLeftLowerRightUpper => {
                "left-UpperArm left-LowerArm right-UpperArm"
            }
            ArmbandPosition::LeftUpperLeftLowerRightLower => {
                "left-UpperArm left-LowerArm right-LowerArm"
            }
            ArmbandPosition::LeftUpperRightUpperRightLower => {
                "left-UpperArm right-UpperArm right-LowerArm"
            }
            ArmbandPosition::LeftLowerRightUpperRightLower => {
                "left-LowerArm right-UpperArm right-LowerArm"
            }
        }
    }

    /// Position by operator-surface index (the combo box order).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// What the participant watches while the armband records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StimulusMode {
    WithDemonstration,
    WithoutDemonstration,
    StaticPoster,
}

impl StimulusMode {
    pub const ALL: [StimulusMode; 3] = [
        StimulusMode::WithDemonstration,
        StimulusMode::WithoutDemonstration,
        StimulusMode::StaticPoster,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StimulusMode::WithDemonstration => "With Demonstration",
            StimulusMode::WithoutDemonstration => "Without Demonstration",
            StimulusMode::StaticPoster => "Poster",
        }
    }
}

/// Everything the acquisition side needs to know about one trial.
/// Immutable once constructed; construction enforces the identifier
/// invariants so no message can ever carry empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialMetadata {
    participant: String,
    trial: String,
    position: ArmbandPosition,
    mode: StimulusMode,
}

impl TrialMetadata {
    pub fn new(
        participant: impl Into<String>,
        trial: impl Into<String>,
        position: ArmbandPosition,
        mode: StimulusMode,
    ) -> Result<Self, MetadataError> {
        let meta = Self {
            participant: participant.into(),
            trial: trial.into(),
            position,
            mode,
        };
        meta.validate()?;
        Ok(meta)
    }

    /// Re-checks the identifier invariants. Deserialized metadata has not
    /// been through `new`, so the receiving side calls this before acting.
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.participant.trim().is_empty() {
            return Err(MetadataError::EmptyParticipant);
        }
        if self.trial.trim().is_empty() {
            return Err(MetadataError::EmptyTrial);
        }
        Ok(())
    }

    pub fn participant(&self) -> &str {
        &self.participant
    }

    pub fn trial(&self) -> &str {
        &self.trial
    }

    pub fn position(&self) -> ArmbandPosition {
        self.position
    }

    pub fn mode(&self) -> StimulusMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(participant: &str, trial: &str) -> Result<TrialMetadata, MetadataError> {
        TrialMetadata::new(
            participant,
            trial,
            ArmbandPosition::LeftUpperLeftLowerRightUpper,
            StimulusMode::WithDemonstration,
        )
    }

    #[test]
    fn rejects_empty_participant() {
        assert_eq!(meta("", "1").unwrap_err(), MetadataError::EmptyParticipant);
        assert_eq!(meta("  ", "1").unwrap_err(), MetadataError::EmptyParticipant);
    }

    #[test]
    fn rejects_empty_trial() {
        assert_eq!(meta("P1", "").unwrap_err(), MetadataError::EmptyTrial);
    }

    #[test]
    fn accepts_valid_identifiers() {
        let meta = meta("P1", "1").unwrap();
        assert_eq!(meta.participant(), "P1");
        assert_eq!(meta.trial(), "1");
    }

    #[test]
    fn position_labels_match_operator_surface() {
        assert_eq!(
            ArmbandPosition::from_index(0).unwrap().label(),
            "left-UpperArm left-LowerArm right-UpperArm"
        );
        assert_eq!(ArmbandPosition::from_index(4), None);
        assert_eq!(ArmbandPosition::ALL.len(), 4);
    }
}

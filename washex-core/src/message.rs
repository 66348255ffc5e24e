use crate::metadata::TrialMetadata;
use serde::{Deserialize, Serialize};

/// The only cross-process wire contract. One message per transition,
/// control side to acquisition side; nothing flows the other way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum LifecycleMessage {
    #[serde(rename = "start")]
    StartTrial(TrialMetadata),
    #[serde(rename = "stop")]
    StopTrial,
}

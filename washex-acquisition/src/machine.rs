use crate::sample::EmgSample;
use crate::sink::{CsvSink, Sink, SinkError};
use crossbeam::channel::Receiver;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use washex_core::{LifecycleMessage, MetadataError, TrialState, ensure_output_dir};

/// Bounded wait for the first sample after a StartTrial. A source that
/// produces nothing in this window fails the trial instead of stalling
/// the whole process.
pub const DEFAULT_ARM_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TrialError {
    #[error("invalid metadata in StartTrial: {0}")]
    Metadata(#[from] MetadataError),
    #[error("could not create the output directory: {0}")]
    OutputDir(#[source] io::Error),
    #[error("armband produced no sample within the arm timeout")]
    ArmTimeout,
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// What applying one lifecycle message did.
#[derive(Debug)]
pub enum Applied {
    /// StartTrial accepted; the sink confirmed and recording is live.
    Recording,
    /// StopTrial accepted; the recording is flushed and closed.
    Finished,
    /// A legal transition failed partway; the machine is back in `Idle`.
    Rejected(TrialError),
    /// Out-of-protocol message, discarded without a state change.
    Ignored,
}

/// Owns the trial lifecycle on the acquisition side. State changes only
/// through [`TrialStateMachine::apply`]; the control process has no other
/// way in.
pub struct TrialStateMachine<K: Sink = CsvSink> {
    state: TrialState,
    sink: K,
    data_root: PathBuf,
    arm_timeout: Duration,
}

impl TrialStateMachine<CsvSink> {
    pub fn new(data_root: PathBuf) -> Self {
        Self::with_sink(data_root, CsvSink::new())
    }
}

impl<K: Sink> TrialStateMachine<K> {
    pub fn with_sink(data_root: PathBuf, sink: K) -> Self {
        Self {
            state: TrialState::Idle,
            sink,
            data_root,
            arm_timeout: DEFAULT_ARM_TIMEOUT,
        }
    }

    pub fn with_arm_timeout(mut self, arm_timeout: Duration) -> Self {
        self.arm_timeout = arm_timeout;
        self
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Applies one received message. Messages that do not match the
    /// current state are discarded and logged; they never abort the
    /// process and never change state.
    pub fn apply(&mut self, message: LifecycleMessage, samples: &Receiver<EmgSample>) -> Applied {
        match (self.state, message) {
            (TrialState::Idle, LifecycleMessage::StartTrial(meta)) => {
                match self.start(meta, samples) {
                    Ok(()) => Applied::Recording,
                    Err(err) => {
                        log::error!("trial start failed: {err}");
                        self.reset();
                        Applied::Rejected(err)
                    }
                }
            }
            (TrialState::Recording, LifecycleMessage::StopTrial) => match self.stop() {
                Ok(()) => Applied::Finished,
                Err(err) => {
                    log::error!("trial stop failed: {err}");
                    self.reset();
                    Applied::Rejected(err)
                }
            },
            (state, message) => {
                log::warn!("ignoring out-of-protocol message {message:?} in state {state:?}");
                Applied::Ignored
            }
        }
    }

    /// Persists one sample while recording; a no-op otherwise. An error
    /// here is unrecoverable for the trial and the caller is expected to
    /// flush and shut the acquisition side down.
    pub fn record(&mut self, sample: &EmgSample) -> Result<(), TrialError> {
        if self.state == TrialState::Recording {
            self.sink.write(sample)?;
        }
        Ok(())
    }

    /// End-of-stream handling: the peer is gone, so stop any active
    /// recording and flush before the process exits.
    pub fn shutdown(&mut self) {
        if self.state == TrialState::Recording {
            log::info!("channel closed while recording, flushing");
        }
        self.reset();
    }

    fn start(
        &mut self,
        meta: washex_core::TrialMetadata,
        samples: &Receiver<EmgSample>,
    ) -> Result<(), TrialError> {
        meta.validate()?;
        self.state = TrialState::Armed;
        let dir = ensure_output_dir(&self.data_root, &meta).map_err(TrialError::OutputDir)?;

        // Samples queued before this trial belong to no recording window.
        while samples.try_recv().is_ok() {}
        let first = samples
            .recv_timeout(self.arm_timeout)
            .map_err(|_| TrialError::ArmTimeout)?;

        self.sink.begin(&dir)?;
        self.sink.write(&first)?;
        self.state = TrialState::Recording;
        log::info!(
            "recording trial {} for participant {} ({}, {}) -> {}",
            meta.trial(),
            meta.participant(),
            meta.position().label(),
            meta.mode().label(),
            dir.display(),
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TrialError> {
        // Flush before reporting Idle; a failed flush is a failed stop.
        self.sink.end()?;
        self.state = TrialState::Idle;
        log::info!("trial finished, sink flushed");
        Ok(())
    }

    fn reset(&mut self) {
        if let Err(err) = self.sink.end() {
            log::error!("sink close failed: {err}");
        }
        self.state = TrialState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SAMPLE_FILE;
    use crossbeam::channel::{Sender, unbounded};
    use std::fs;
    use std::thread;
    use washex_core::{ArmbandPosition, StimulusMode, TrialMetadata, output_path};

    fn meta() -> TrialMetadata {
        TrialMetadata::new(
            "P1",
            "1",
            ArmbandPosition::LeftUpperLeftLowerRightUpper,
            StimulusMode::WithDemonstration,
        )
        .unwrap()
    }

    /// Emulates the sampler thread: a steady stream until dropped.
    fn ticking_samples() -> Receiver<EmgSample> {
        let (tx, rx): (Sender<EmgSample>, _) = unbounded();
        thread::spawn(move || {
            let mut elapsed_us = 0;
            loop {
                elapsed_us += 2_000;
                let sample = EmgSample {
                    elapsed_us,
                    channels: [0; 8],
                };
                if tx.send(sample).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(2));
            }
        });
        rx
    }

    #[test]
    fn full_lifecycle_records_and_flushes() {
        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let mut machine = TrialStateMachine::new(root.path().to_path_buf());
        assert_eq!(machine.state(), TrialState::Idle);

        let applied = machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert!(matches!(applied, Applied::Recording), "{applied:?}");
        assert_eq!(machine.state(), TrialState::Recording);

        let marker = EmgSample {
            elapsed_us: 999_999,
            channels: [7; 8],
        };
        machine.record(&marker).unwrap();

        let applied = machine.apply(LifecycleMessage::StopTrial, &samples);
        assert!(matches!(applied, Applied::Finished), "{applied:?}");
        assert_eq!(machine.state(), TrialState::Idle);

        let file = output_path(root.path(), &meta()).join(SAMPLE_FILE);
        let written = fs::read_to_string(file).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "elapsed_us,ch1,ch2,ch3,ch4,ch5,ch6,ch7,ch8");
        // the arming sample plus the explicitly recorded one
        assert!(lines.len() >= 3);
        assert_eq!(*lines.last().unwrap(), "999999,7,7,7,7,7,7,7,7");
    }

    #[test]
    fn second_start_while_recording_is_discarded() {
        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let mut machine = TrialStateMachine::new(root.path().to_path_buf());

        machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert_eq!(machine.state(), TrialState::Recording);

        let applied = machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert!(matches!(applied, Applied::Ignored), "{applied:?}");
        assert_eq!(machine.state(), TrialState::Recording);
    }

    #[test]
    fn stop_while_idle_is_discarded() {
        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let mut machine = TrialStateMachine::new(root.path().to_path_buf());

        let applied = machine.apply(LifecycleMessage::StopTrial, &samples);
        assert!(matches!(applied, Applied::Ignored), "{applied:?}");
        assert_eq!(machine.state(), TrialState::Idle);
    }

    #[test]
    fn wire_metadata_with_empty_participant_is_rejected() {
        // Deserialized metadata bypasses the validating constructor, so the
        // machine must re-check it before touching the filesystem.
        let bad: TrialMetadata = serde_json::from_str(
            r#"{"participant":"","trial":"1",
                "position":"LeftUpperLeftLowerRightUpper",
                "mode":"WithDemonstration"}"#,
        )
        .unwrap();

        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let mut machine = TrialStateMachine::new(root.path().to_path_buf());

        let applied = machine.apply(LifecycleMessage::StartTrial(bad), &samples);
        assert!(
            matches!(applied, Applied::Rejected(TrialError::Metadata(_))),
            "{applied:?}"
        );
        assert_eq!(machine.state(), TrialState::Idle);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn silent_source_times_out_back_to_idle() {
        let root = tempfile::tempdir().unwrap();
        let (_tx, samples): (Sender<EmgSample>, _) = unbounded();
        let mut machine = TrialStateMachine::new(root.path().to_path_buf())
            .with_arm_timeout(Duration::from_millis(50));

        let applied = machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert!(
            matches!(applied, Applied::Rejected(TrialError::ArmTimeout)),
            "{applied:?}"
        );
        assert_eq!(machine.state(), TrialState::Idle);
        // no partial recording: the sink is only opened after the source
        // confirms, so a timed-out arm leaves no file behind
        let file = output_path(root.path(), &meta()).join(SAMPLE_FILE);
        assert!(!file.exists());
    }

    /// Sink whose flush blows up, standing in for a dying disk.
    #[derive(Default)]
    struct FlakyFlushSink {
        open: bool,
    }

    impl Sink for FlakyFlushSink {
        fn begin(&mut self, _dir: &std::path::Path) -> Result<(), SinkError> {
            self.open = true;
            Ok(())
        }

        fn write(&mut self, _sample: &EmgSample) -> Result<(), SinkError> {
            Ok(())
        }

        fn end(&mut self) -> Result<(), SinkError> {
            if self.open {
                self.open = false;
                return Err(SinkError::Io(io::Error::other("flush failed")));
            }
            Ok(())
        }
    }

    #[test]
    fn failed_stop_flush_is_a_rejected_stop() {
        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let mut machine =
            TrialStateMachine::with_sink(root.path().to_path_buf(), FlakyFlushSink::default());

        machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert_eq!(machine.state(), TrialState::Recording);

        let applied = machine.apply(LifecycleMessage::StopTrial, &samples);
        assert!(
            matches!(applied, Applied::Rejected(TrialError::Sink(_))),
            "{applied:?}"
        );
    }

    #[test]
    fn leftover_recording_fails_the_start() {
        let root = tempfile::tempdir().unwrap();
        let samples = ticking_samples();
        let dir = ensure_output_dir(root.path(), &meta()).unwrap();
        fs::write(dir.join(SAMPLE_FILE), "previous trial").unwrap();

        let mut machine = TrialStateMachine::new(root.path().to_path_buf());
        let applied = machine.apply(LifecycleMessage::StartTrial(meta()), &samples);
        assert!(
            matches!(
                applied,
                Applied::Rejected(TrialError::Sink(SinkError::AlreadyRecorded { .. }))
            ),
            "{applied:?}"
        );
        assert_eq!(machine.state(), TrialState::Idle);
        assert_eq!(
            fs::read_to_string(dir.join(SAMPLE_FILE)).unwrap(),
            "previous trial"
        );
    }
}

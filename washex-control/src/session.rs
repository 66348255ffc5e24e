use crate::input::OperatorInput;
use crate::stimulus::{StimulusPlayer, stimulus_asset};
use anyhow::Context;
use std::path::PathBuf;
use washex_channel::Duplex;
use washex_core::{LifecycleMessage, ensure_output_dir};

/// Control-side owner of the experiment: validates operator input, derives
/// the output location, and drives the lifecycle protocol around the
/// stimulus.
pub struct ControlSession<P: StimulusPlayer> {
    channel: Duplex<LifecycleMessage>,
    data_root: PathBuf,
    resource_root: PathBuf,
    player: P,
}

impl<P: StimulusPlayer> ControlSession<P> {
    pub fn new(
        channel: Duplex<LifecycleMessage>,
        data_root: PathBuf,
        resource_root: PathBuf,
        player: P,
    ) -> Self {
        Self {
            channel,
            data_root,
            resource_root,
            player,
        }
    }

    /// Runs one trial to completion: StartTrial, stimulus, StopTrial.
    /// Invalid input fails before anything is sent or created on disk.
    pub fn run_trial(&mut self, input: OperatorInput) -> anyhow::Result<()> {
        let meta = input.into_metadata()?;
        let dir = ensure_output_dir(&self.data_root, &meta)
            .context("creating the trial output directory")?;
        let asset = stimulus_asset(meta.mode(), &self.resource_root, &dir);

        self.channel
            .send(&LifecycleMessage::StartTrial(meta.clone()))
            .context("sending StartTrial")?;
        log::info!(
            "trial {} for participant {} started, stimulus {}",
            meta.trial(),
            meta.participant(),
            asset.display(),
        );

        let played = self.player.play(&asset);

        // Stop recording even when the stimulus failed partway; the window
        // that was shown is still a bounded recording.
        self.channel
            .send(&LifecycleMessage::StopTrial)
            .context("sending StopTrial")?;
        log::info!("trial {} stopped", meta.trial());

        played
    }
}

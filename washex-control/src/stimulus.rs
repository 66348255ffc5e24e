use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use washex_core::StimulusMode;

/// File the poster variant records its camera capture into, inside the
/// trial's own output directory.
pub const POSTER_CAPTURE_FILE: &str = "video.avi";

/// Opaque stimulus component. `play` begins playback of `asset` and blocks
/// until the stimulus ends; returning is the completion signal the control
/// session turns into a StopTrial.
pub trait StimulusPlayer {
    fn play(&mut self, asset: &Path) -> anyhow::Result<()>;
}

/// Resolves what the stimulus component should open for this trial. The
/// two video modes use fixed demonstration assets; the poster mode points
/// at its capture target under the trial's output directory.
pub fn stimulus_asset(mode: StimulusMode, resource_root: &Path, output_dir: &Path) -> PathBuf {
    match mode {
        StimulusMode::WithDemonstration => resource_root.join("Video_withDemon.mp4"),
        StimulusMode::WithoutDemonstration => resource_root.join("Video_withoutDemon.mp4"),
        StimulusMode::StaticPoster => output_dir.join(POSTER_CAPTURE_FILE),
    }
}

/// Stimulus stand-in that "plays" for a fixed wall-clock duration. Used by
/// the demo binary and tests in place of the real video window.
pub struct FixedDurationPlayer {
    duration: Duration,
}

impl FixedDurationPlayer {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl StimulusPlayer for FixedDurationPlayer {
    fn play(&mut self, asset: &Path) -> anyhow::Result<()> {
        log::info!(
            "stimulus {} for {:.1}s",
            asset.display(),
            self.duration.as_secs_f64()
        );
        thread::sleep(self.duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_mode_resolves_its_own_asset() {
        let resources = Path::new("resource");
        let output = Path::new("data/person-P1/Experiment-1");
        assert_eq!(
            stimulus_asset(StimulusMode::WithDemonstration, resources, output),
            Path::new("resource/Video_withDemon.mp4")
        );
        assert_eq!(
            stimulus_asset(StimulusMode::WithoutDemonstration, resources, output),
            Path::new("resource/Video_withoutDemon.mp4")
        );
        assert_eq!(
            stimulus_asset(StimulusMode::StaticPoster, resources, output),
            Path::new("data/person-P1/Experiment-1/video.avi")
        );
    }
}

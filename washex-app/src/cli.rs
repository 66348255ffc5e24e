use washex_core::StimulusMode;

/// Loopback endpoint both processes agree on by default.
pub const ADDR: &str = "127.0.0.1:8723";
pub const DATA_ROOT: &str = "data";
pub const RESOURCE_ROOT: &str = "resource";
pub const SAMPLE_RATE_HZ: u32 = 200;
/// How long the stand-in stimulus runs when no real player is wired up.
pub const STIMULUS_SECS: u64 = 30;

pub fn parse_mode(arg: &str) -> Option<StimulusMode> {
    match arg {
        "with-demo" => Some(StimulusMode::WithDemonstration),
        "without-demo" => Some(StimulusMode::WithoutDemonstration),
        "poster" => Some(StimulusMode::StaticPoster),
        _ => None,
    }
}

use anyhow::Context;
use std::env;
use std::path::PathBuf;
use washex_acquisition::{SyntheticArmband, TrialStateMachine, run, spawn_sampler};
use washex_app::cli;
use washex_channel::Binding;

/// Acquisition process: waits for the control process, then records EMG
/// samples into each trial's output directory as directed over the
/// lifecycle channel.
///
/// Usage: washex-acquire [addr] [data-root]
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| cli::ADDR.into());
    let data_root = PathBuf::from(args.next().unwrap_or_else(|| cli::DATA_ROOT.into()));

    let binding = Binding::bind(addr.as_str()).with_context(|| format!("binding {addr}"))?;
    log::info!("acquisition listening on {}", binding.local_addr()?);

    let channel = binding.accept().context("waiting for the control process")?;
    let samples = spawn_sampler(SyntheticArmband::new(cli::SAMPLE_RATE_HZ));
    run(channel, samples, TrialStateMachine::new(data_root))?;
    Ok(())
}

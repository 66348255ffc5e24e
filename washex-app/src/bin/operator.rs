use anyhow::{Context, bail};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use washex_app::cli;
use washex_channel::Duplex;
use washex_control::{ControlSession, FixedDurationPlayer, OperatorInput};
use washex_core::ArmbandPosition;

const USAGE: &str = "usage: washex-operator <participant> <trial> <position 0-3> \
                     <with-demo|without-demo|poster> [addr] [data-root] [resource-root]";

/// Control process: runs one trial end to end against a listening
/// acquisition process.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        bail!("{USAGE}");
    }

    let participant = args[0].clone();
    let trial = args[1].clone();
    let position_index: usize = args[2]
        .parse()
        .with_context(|| format!("bad position index {:?}\n{USAGE}", args[2]))?;
    let position = ArmbandPosition::from_index(position_index)
        .with_context(|| format!("position index {position_index} out of range\n{USAGE}"))?;
    let mode = cli::parse_mode(&args[3])
        .with_context(|| format!("unknown stimulus mode {:?}\n{USAGE}", args[3]))?;

    let addr = args.get(4).cloned().unwrap_or_else(|| cli::ADDR.into());
    let data_root = PathBuf::from(args.get(5).cloned().unwrap_or_else(|| cli::DATA_ROOT.into()));
    let resource_root = PathBuf::from(
        args.get(6)
            .cloned()
            .unwrap_or_else(|| cli::RESOURCE_ROOT.into()),
    );

    let channel =
        Duplex::connect(addr.as_str()).with_context(|| format!("connecting to {addr}"))?;
    let player = FixedDurationPlayer::new(Duration::from_secs(cli::STIMULUS_SECS));
    let mut session = ControlSession::new(channel, data_root, resource_root, player);
    session.run_trial(OperatorInput {
        participant,
        trial,
        position,
        mode,
    })
}

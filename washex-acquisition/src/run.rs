use crate::machine::{Applied, TrialError, TrialStateMachine};
use crate::sample::EmgSample;
use crate::sink::Sink;
use crossbeam::channel::{Receiver, bounded};
use crossbeam::select;
use std::thread;
use washex_channel::Duplex;
use washex_core::LifecycleMessage;

/// Acquisition-process main loop: joins the lifecycle channel and the
/// sample stream so a StopTrial is never stuck behind sample handling.
///
/// Returns when the control process closes its end of the channel (after
/// flushing any active recording) or on an unrecoverable sink failure.
pub fn run<K: Sink>(
    mut channel: Duplex<LifecycleMessage>,
    samples: Receiver<EmgSample>,
    mut machine: TrialStateMachine<K>,
) -> Result<(), TrialError> {
    let (message_tx, message_rx) = bounded(16);
    let reader = thread::Builder::new()
        .name("channel-reader".into())
        .spawn(move || {
            loop {
                match channel.recv() {
                    Ok(Some(message)) => {
                        if message_tx.send(message).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        log::info!("control process closed the channel");
                        break;
                    }
                    Err(err) => {
                        log::error!("channel receive failed: {err}");
                        break;
                    }
                }
            }
        })
        .expect("spawning the channel-reader thread");

    let result = loop {
        select! {
            recv(message_rx) -> message => match message {
                Ok(message) => {
                    let stopping = matches!(message, LifecycleMessage::StopTrial);
                    if let Applied::Rejected(err) = machine.apply(message, &samples) {
                        // A failed start leaves the machine Idle and the
                        // process usable; a failed stop-flush means the
                        // sink is gone and the trial data is at risk.
                        if stopping {
                            log::error!("stop flush failed, shutting down: {err}");
                            break Err(err);
                        }
                    }
                }
                // reader thread is done: end-of-stream
                Err(_) => break Ok(()),
            },
            recv(samples) -> sample => match sample {
                Ok(sample) => {
                    if let Err(err) = machine.record(&sample) {
                        log::error!("recording failed, shutting down: {err}");
                        break Err(err);
                    }
                }
                Err(_) => {
                    log::error!("sample source disconnected");
                    break Ok(());
                }
            },
        }
    };

    machine.shutdown();
    let _ = reader.join();
    result
}

use crate::sample::EmgSample;
use crossbeam::channel::{Receiver, bounded};
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

/// Boundary to the armband hardware. An implementation is polled on a
/// dedicated sampler thread for the process lifetime; `None` means the
/// sensor stream has ended.
pub trait SampleSource: Send {
    fn next_sample(&mut self) -> Option<EmgSample>;
}

/// Moves the source onto its own thread and returns the stream of samples.
/// The thread exits when the source ends or the receiver is dropped.
pub fn spawn_sampler<S: SampleSource + 'static>(mut source: S) -> Receiver<EmgSample> {
    let (tx, rx) = bounded(1024);
    thread::Builder::new()
        .name("sampler".into())
        .spawn(move || {
            while let Some(sample) = source.next_sample() {
                if tx.send(sample).is_err() {
                    break;
                }
            }
            log::info!("sample source ended");
        })
        .expect("spawning the sampler thread");
    rx
}

/// Stand-in for the vendor SDK: eight channels of noise at a fixed rate.
/// The real armband binding implements [`SampleSource`] the same way.
pub struct SyntheticArmband {
    period: Duration,
    origin: Instant,
}

impl SyntheticArmband {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            period: Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1))),
            origin: Instant::now(),
        }
    }
}

impl SampleSource for SyntheticArmband {
    fn next_sample(&mut self) -> Option<EmgSample> {
        thread::sleep(self.period);
        let mut rng = rand::rng();
        let mut channels = [0i8; 8];
        for channel in &mut channels {
            *channel = rng.random();
        }
        Some(EmgSample {
            elapsed_us: self.origin.elapsed().as_micros() as u64,
            channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_armband_streams_monotonic_timestamps() {
        let rx = spawn_sampler(SyntheticArmband::new(1000));
        let first = rx.recv().unwrap();
        let second = rx.recv().unwrap();
        assert!(second.elapsed_us >= first.elapsed_us);
    }
}

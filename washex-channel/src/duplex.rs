use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// How long `connect` keeps retrying while the peer process is still
/// starting up. Both processes are launched together, so either may win
/// the startup race.
const CONNECT_RETRY: Duration = Duration::from_millis(250);
const CONNECT_ATTEMPTS: u32 = 20;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed frame: {0}")]
    Frame(#[from] serde_json::Error),
}

/// Listening half of channel setup. The channel has exactly two fixed
/// endpoints, so a binding accepts one peer and is consumed doing so.
pub struct Binding {
    listener: TcpListener,
}

impl Binding {
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, ChannelError> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ChannelError> {
        Ok(self.listener.local_addr()?)
    }

    /// Blocks until the peer connects.
    pub fn accept<M>(self) -> Result<Duplex<M>, ChannelError> {
        let (stream, peer) = self.listener.accept()?;
        log::info!("peer connected from {peer}");
        Duplex::over(stream)
    }
}

/// One endpoint of the typed duplex channel between the control and
/// acquisition processes. Messages are newline-delimited JSON frames over
/// a loopback TCP stream; delivery is reliable and in send order.
pub struct Duplex<M> {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    _message: PhantomData<M>,
}

impl<M> Duplex<M> {
    fn over(stream: TcpStream) -> Result<Self, ChannelError> {
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            writer: stream,
            reader,
            _message: PhantomData,
        })
    }

    /// Connects to a listening peer, retrying briefly if it is not up yet.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, ChannelError> {
        for attempt in 1..=CONNECT_ATTEMPTS {
            match TcpStream::connect(&addr) {
                Ok(stream) => return Self::over(stream),
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    log::debug!("connect attempt {attempt} failed: {err}");
                    thread::sleep(CONNECT_RETRY);
                }
                Err(err) => return Err(err.into()),
            }
        }
        unreachable!("loop returns on the last attempt")
    }
}

impl<M: Serialize + DeserializeOwned> Duplex<M> {
    /// Sends one message. Writes into the OS socket buffer and returns;
    /// never blocks on the peer's processing.
    pub fn send(&mut self, message: &M) -> Result<(), ChannelError> {
        let mut frame = serde_json::to_vec(message)?;
        frame.push(b'\n');
        self.writer.write_all(&frame)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Blocks until the next message arrives. `Ok(None)` is end-of-stream:
    /// the peer closed its end, which is a normal shutdown, not an error.
    pub fn recv(&mut self) -> Result<Option<M>, ChannelError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(line.trim_end())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use washex_core::{ArmbandPosition, LifecycleMessage, StimulusMode, TrialMetadata};

    fn start_message(trial: &str) -> LifecycleMessage {
        LifecycleMessage::StartTrial(
            TrialMetadata::new(
                "P1",
                trial,
                ArmbandPosition::LeftUpperLeftLowerRightUpper,
                StimulusMode::WithDemonstration,
            )
            .unwrap(),
        )
    }

    #[test]
    fn delivers_in_send_order_and_signals_end_of_stream() {
        let binding = Binding::bind("127.0.0.1:0").unwrap();
        let addr = binding.local_addr().unwrap();

        let receiver = thread::spawn(move || {
            let mut channel: Duplex<LifecycleMessage> = binding.accept().unwrap();
            let mut seen = Vec::new();
            while let Some(message) = channel.recv().unwrap() {
                seen.push(message);
            }
            seen
        });

        let mut channel: Duplex<LifecycleMessage> = Duplex::connect(addr).unwrap();
        channel.send(&start_message("1")).unwrap();
        channel.send(&LifecycleMessage::StopTrial).unwrap();
        channel.send(&start_message("2")).unwrap();
        drop(channel);

        let seen = receiver.join().unwrap();
        assert_eq!(
            seen,
            vec![
                start_message("1"),
                LifecycleMessage::StopTrial,
                start_message("2"),
            ]
        );
    }

    #[test]
    fn malformed_frame_is_an_error_not_end_of_stream() {
        let binding = Binding::bind("127.0.0.1:0").unwrap();
        let addr = binding.local_addr().unwrap();

        let receiver = thread::spawn(move || {
            let mut channel: Duplex<LifecycleMessage> = binding.accept().unwrap();
            channel.recv()
        });

        let mut raw = TcpStream::connect(addr).unwrap();
        raw.write_all(b"not json\n").unwrap();
        drop(raw);

        assert!(matches!(
            receiver.join().unwrap(),
            Err(ChannelError::Frame(_))
        ));
    }
}

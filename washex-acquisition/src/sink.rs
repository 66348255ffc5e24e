use crate::sample::EmgSample;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File the sink writes under the trial's output directory. Part of the
/// persisted layout alongside the directory names.
pub const SAMPLE_FILE: &str = "emg.csv";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("a recording already exists at {}", .path.display())]
    AlreadyRecorded { path: PathBuf },
    #[error("sink I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Destination for the active trial's samples. `begin` opens the output
/// under the trial directory, `write` persists one sample, `end` flushes
/// and closes and is idempotent. The trial state machine drives this
/// interface only; the concrete sink owns the file format.
pub trait Sink {
    fn begin(&mut self, dir: &Path) -> Result<(), SinkError>;
    fn write(&mut self, sample: &EmgSample) -> Result<(), SinkError>;
    fn end(&mut self) -> Result<(), SinkError>;
}

/// Owns the output stream for the active trial. Between a successful
/// `begin` and the matching `end`, every sample handed to `write` is
/// persisted.
#[derive(Default)]
pub struct CsvSink {
    writer: Option<BufWriter<std::fs::File>>,
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }
}

impl Sink for CsvSink {
    /// Opens `emg.csv` under `dir` and writes the header. Refuses to
    /// overwrite: a leftover recording for the same trial is an error.
    fn begin(&mut self, dir: &Path) -> Result<(), SinkError> {
        let path = dir.join(SAMPLE_FILE);
        let file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SinkError::AlreadyRecorded { path });
            }
            Err(err) => return Err(err.into()),
        };
        let mut writer = BufWriter::new(file);
        writeln!(writer, "elapsed_us,ch1,ch2,ch3,ch4,ch5,ch6,ch7,ch8")?;
        self.writer = Some(writer);
        Ok(())
    }

    fn write(&mut self, sample: &EmgSample) -> Result<(), SinkError> {
        if let Some(writer) = &mut self.writer {
            write!(writer, "{}", sample.elapsed_us)?;
            for channel in sample.channels {
                write!(writer, ",{channel}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Flushes and closes the destination. Idempotent; a no-op when no
    /// recording is open.
    fn end(&mut self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// One frame from the armband: eight signed 8-bit channels, the format the
/// Myo-class devices deliver, stamped relative to the source's origin.
/// Samples stay inside the acquisition process; they never cross the
/// lifecycle channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmgSample {
    pub elapsed_us: u64,
    pub channels: [i8; 8],
}

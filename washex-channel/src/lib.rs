pub mod duplex;

pub use duplex::{Binding, ChannelError, Duplex};

//! Forward DMX channel values to the OLA daemon.
//!
//! [`OlaOutput`] owns one 512 channel [`Frame`] and a [`DmxClient`]. Every
//! change is sent as a full universe; connection changes and errors come
//! back as [`Notice`]s on a channel.

pub mod config;
pub mod dmx;
pub mod error;
pub mod frame;
pub mod message;
pub mod output;

pub use config::{Config, load_config};
pub use dmx::{DmxClient, OlaClient};
pub use error::{MessageError, OutputError};
pub use frame::{DMX_CHANNELS, Frame};
pub use message::{Atom, Message};
pub use output::{Notice, OlaOutput};

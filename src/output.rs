use std::sync::mpsc::Sender;

use log::{debug, error, info, trace, warn};
use serde::Serialize;

use crate::config::OutputConfig;
use crate::dmx::DmxClient;
use crate::error::OutputError;
use crate::frame::{DMX_CHANNELS, Frame, MAX_CHANNEL};
use crate::message::{Atom, Message};

/// What the output reports back to whoever drives it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Connection state, sent on every change and on explicit request.
    State { connected: bool },
    Info { message: String },
    Error { message: String },
}

impl From<&OutputError> for Notice {
    fn from(err: &OutputError) -> Self {
        Notice::Error {
            message: err.to_string(),
        }
    }
}

/// A DMX universe buffer bound to an OLA client.
///
/// Every change to the buffer, the universe or the blackout flag pushes the
/// whole frame downstream. The connection flag only ever moves as a result
/// of a handshake or a send, and each change is reported once on the outlet.
pub struct OlaOutput<C: DmxClient> {
    client: C,
    frame: Frame,
    universe: u32,
    blackout: bool,
    connected: bool,
    outlet: Sender<Notice>,
}

impl<C: DmxClient> OlaOutput<C> {
    pub fn new(client: C, universe: u32, outlet: Sender<Notice>) -> Self {
        OlaOutput {
            client,
            frame: Frame::new(),
            universe,
            blackout: false,
            connected: false,
            outlet,
        }
    }

    pub fn from_config(client: C, config: &OutputConfig, outlet: Sender<Notice>) -> Self {
        let mut output = OlaOutput::new(client, config.universe, outlet);
        output.blackout = config.blackout;
        output
    }

    pub fn universe(&self) -> u32 {
        self.universe
    }

    pub fn is_blackout(&self) -> bool {
        self.blackout
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn channel(&self, index: usize) -> Option<u8> {
        self.frame.get(index)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Apply an inbound message, turning validation failures into error
    /// notices.
    pub fn handle(&mut self, message: Message) {
        trace!("Handling {:?}", message);
        if let Err(err) = message.apply(self) {
            warn!("{}", err);
            self.emit(Notice::from(&err));
        }
    }

    /// Store one clamped value at a 0-based index and send. An index past
    /// the last channel stores nothing.
    pub fn set_channel(&mut self, index: usize, value: i64) -> bool {
        let stored = self.frame.set(index, value);
        if !stored {
            debug!("Ignoring write to channel index {}", index);
        }
        self.send();
        stored
    }

    /// Write `values` to consecutive channels from DMX channel 1 and send
    /// once. Symbols leave their slot alone; values past channel 512 are
    /// ignored.
    pub fn set_channels(&mut self, values: &[Atom]) -> usize {
        let written = self.frame.write_from(0, values.iter().map(Atom::level));
        self.send();
        written
    }

    /// Write `values` from the 1-based `start_channel` and send once.
    ///
    /// A start channel that is not an integer in 1..=512 rejects the whole
    /// call: nothing is written and nothing is sent. Values running past
    /// channel 512 are dropped.
    pub fn set_channels_from_offset(
        &mut self,
        start_channel: &Atom,
        values: &[Atom],
    ) -> Result<usize, OutputError> {
        let channel = match start_channel {
            Atom::Int(channel) => *channel,
            _ => return Err(OutputError::ChannelNotInteger),
        };
        if !(1..=MAX_CHANNEL).contains(&channel) {
            return Err(OutputError::ChannelOutOfRange(channel));
        }

        let start = (channel - 1) as usize;
        let written = self.frame.write_from(start, values.iter().map(Atom::level));
        if written < values.len() && start + values.len() > DMX_CHANNELS {
            debug!(
                "Dropped {} values past channel {}",
                start + values.len() - DMX_CHANNELS,
                DMX_CHANNELS
            );
        }
        self.send();
        Ok(written)
    }

    /// Stored values are kept; only what goes on the wire changes.
    pub fn set_blackout(&mut self, enabled: bool) {
        if enabled != self.blackout {
            info!("Blackout {}", if enabled { "on" } else { "off" });
        }
        self.blackout = enabled;
        self.send();
    }

    /// Retarget the output. Anything outside the u32 range is rejected and
    /// the current universe kept.
    pub fn set_universe(&mut self, universe: i64) -> Result<(), OutputError> {
        let universe = u32::try_from(universe).map_err(|_| OutputError::UniverseOutOfRange(universe))?;
        self.universe = universe;
        self.send();
        Ok(())
    }

    /// Handshake with the daemon and report the resulting state, whether or
    /// not it changed.
    pub fn connect(&mut self) -> bool {
        match self.client.setup() {
            Ok(()) => self.mark_connected(),
            Err(e) => {
                let err = OutputError::setup(&e);
                error!("{}", err);
                self.connected = false;
                self.emit(Notice::from(&err));
            }
        }
        self.report_state();
        self.connected
    }

    /// Push the current frame downstream, reconnecting first if needed.
    ///
    /// Returns whether the daemon accepted the frame. Failures are reported
    /// on the outlet rather than returned.
    pub fn send(&mut self) -> bool {
        if !self.connected {
            match self.client.setup() {
                Ok(()) => {
                    self.mark_connected();
                    self.report_state();
                }
                Err(e) => debug!("Reconnect before send failed: {:#}", e),
            }
        }

        let data = self.frame.output(self.blackout);
        match self.client.send_dmx(self.universe, &data) {
            Ok(()) => {
                trace!("Sent universe {}", self.universe);
                true
            }
            Err(e) if self.connected => {
                let err = OutputError::connection_lost(&e);
                warn!("{}", err);
                self.connected = false;
                self.report_state();
                self.emit(Notice::from(&err));
                false
            }
            Err(e) => {
                let err = OutputError::not_connected(&e);
                debug!("{}", err);
                self.emit(Notice::from(&err));
                false
            }
        }
    }

    pub fn report_state(&self) {
        self.emit(Notice::State {
            connected: self.connected,
        });
    }

    fn mark_connected(&mut self) {
        info!("Connected to OLA");
        self.connected = true;
        self.emit(Notice::Info {
            message: "Connected to OLA".to_string(),
        });
    }

    fn emit(&self, notice: Notice) {
        // Nobody listening is not an error for the output.
        let _ = self.outlet.send(notice);
    }
}

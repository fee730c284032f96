/// Number of channels in one DMX universe.
pub const DMX_CHANNELS: usize = 512;

/// Highest 1-based channel number a caller may address.
pub const MAX_CHANNEL: i64 = DMX_CHANNELS as i64;

/// Clamp an integer level into the 0-255 DMX range.
pub fn clamp_level(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Round a floating point level to the nearest integer, halves rounding up.
///
/// NaN becomes 0 and infinities saturate, so the result can always be clamped.
pub fn round_level(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// The 512 channel values of one universe, index 0 being DMX channel 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    channels: [u8; DMX_CHANNELS],
}

impl Frame {
    pub fn new() -> Self {
        Frame {
            channels: [0; DMX_CHANNELS],
        }
    }

    /// Store `value` clamped to 0-255 at `index`.
    ///
    /// Returns false and leaves the frame untouched when `index` is past the
    /// last channel.
    pub fn set(&mut self, index: usize, value: i64) -> bool {
        match self.channels.get_mut(index) {
            Some(slot) => {
                *slot = clamp_level(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.channels.get(index).copied()
    }

    /// Write `values` to consecutive channels starting at `start`.
    ///
    /// `None` entries leave their slot alone but still take up a position.
    /// Entries that would land past the last channel are dropped. Returns the
    /// number of channels written.
    pub fn write_from<I>(&mut self, start: usize, values: I) -> usize
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        let mut written = 0;
        for (offset, value) in values.into_iter().enumerate() {
            let Some(index) = start.checked_add(offset) else {
                break;
            };
            if index >= DMX_CHANNELS {
                break;
            }
            if let Some(value) = value {
                if self.set(index, value) {
                    written += 1;
                }
            }
        }
        written
    }

    pub fn as_bytes(&self) -> &[u8; DMX_CHANNELS] {
        &self.channels
    }

    /// The data to put on the wire: the stored values, or all zero when
    /// blacked out. Stored values are never touched.
    pub fn output(&self, blackout: bool) -> [u8; DMX_CHANNELS] {
        if blackout {
            [0; DMX_CHANNELS]
        } else {
            self.channels
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_is_dark() {
        let frame = Frame::new();
        assert!(frame.as_bytes().iter().all(|v| *v == 0));
    }

    #[test]
    fn set_clamps_values() {
        let mut frame = Frame::new();
        for (value, expected) in [(-40, 0), (0, 0), (128, 128), (255, 255), (999, 255), (i64::MAX, 255), (i64::MIN, 0)] {
            assert!(frame.set(7, value));
            assert_eq!(frame.get(7), Some(expected), "value {}", value);
        }
    }

    #[test]
    fn set_out_of_range_is_rejected() {
        let mut frame = Frame::new();
        frame.set(511, 42);
        let before = frame.clone();

        assert!(!frame.set(512, 200));
        assert!(!frame.set(usize::MAX, 200));
        assert_eq!(frame, before);
        assert_eq!(frame.get(512), None);
    }

    #[test]
    fn rounding_follows_half_up() {
        assert_eq!(round_level(1.4), 1);
        assert_eq!(round_level(1.5), 2);
        assert_eq!(round_level(-0.5), 0);
        assert_eq!(round_level(-0.6), -1);
        assert_eq!(round_level(f64::NAN), 0);
        assert_eq!(clamp_level(round_level(f64::INFINITY)), 255);
    }

    #[test]
    fn write_from_skips_missing_entries() {
        let mut frame = Frame::new();
        frame.set(1, 77);

        let written = frame.write_from(0, [Some(10), None, Some(300)]);

        assert_eq!(written, 2);
        assert_eq!(&frame.as_bytes()[..3], &[10, 77, 255]);
    }

    #[test]
    fn write_from_never_passes_the_end() {
        let mut frame = Frame::new();

        let written = frame.write_from(510, [Some(10), Some(20), Some(30)]);

        assert_eq!(written, 2);
        assert_eq!(frame.get(510), Some(10));
        assert_eq!(frame.get(511), Some(20));
        assert_eq!(frame.as_bytes()[..510].iter().filter(|v| **v != 0).count(), 0);
    }

    #[test]
    fn blackout_output_keeps_stored_values() {
        let mut frame = Frame::new();
        frame.set(0, 255);
        frame.set(100, 12);

        assert!(frame.output(true).iter().all(|v| *v == 0));
        assert_eq!(frame.get(0), Some(255));
        assert_eq!(frame.output(false), *frame.as_bytes());
    }
}

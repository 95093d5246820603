use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new RGBA color.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build a color from raw script integers, reporting the first channel
    /// that falls outside `[0, 255]`.
    pub fn from_channels(values: [i64; 4]) -> Result<Self, (Channel, i64)> {
        let mut out = [0u8; 4];
        for (slot, (channel, value)) in out.iter_mut().zip(Channel::ALL.into_iter().zip(values)) {
            *slot = channel.check(value).ok_or((channel, value))?;
        }
        Ok(Self::rgba(out[0], out[1], out[2], out[3]))
    }

    /// Convert to RGBA u8 array.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    // --- Named constants ---

    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
}

impl Default for Color {
    /// Canvas background when a script does not specify one.
    fn default() -> Self {
        Color::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// One channel of an RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::Alpha];

    /// Narrow a script integer to a channel value, if it is in range.
    pub fn check(self, value: i64) -> Option<u8> {
        u8::try_from(value).ok()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Alpha => "alpha",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default_is_opaque_white() {
        assert_eq!(Color::default().to_rgba8(), [255, 255, 255, 255]);
    }

    #[test]
    fn test_from_channels_in_range() {
        let c = Color::from_channels([255, 136, 0, 128]).unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 128]);
    }

    #[test]
    fn test_from_channels_reports_first_bad_channel() {
        assert_eq!(
            Color::from_channels([0, 256, -1, 0]),
            Err((Channel::Green, 256))
        );
        assert_eq!(
            Color::from_channels([0, 0, 0, -5]),
            Err((Channel::Alpha, -5))
        );
    }

    #[test]
    fn test_channel_check_bounds() {
        assert_eq!(Channel::Red.check(0), Some(0));
        assert_eq!(Channel::Red.check(255), Some(255));
        assert_eq!(Channel::Red.check(256), None);
        assert_eq!(Channel::Red.check(-1), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(format!("{}", Color::RED), "#FF0000");
        assert_eq!(format!("{}", Color::rgba(255, 0, 0, 127)), "#FF00007F");
    }
}

use crate::{Error, Scalar};
use std::{fmt, str::FromStr};

/// Non-premultiplied sRGBA color, packed as ABGR `u32`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Rgba(u32);

impl Rgba {
    /// IconVG default palette color
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((b as u32) << 16) | ((g as u32) << 8) | (r as u32))
    }

    pub const fn alpha(self) -> u8 {
        ((self.0 >> 24) & 0xff) as u8
    }

    pub const fn blue(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub const fn green(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    pub fn to_rgba(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    /// Alpha-premultiplied components, IconVG stores colors premultiplied
    pub fn premultiplied(self) -> [u8; 4] {
        let [r, g, b, a] = self.to_rgba();
        let mul = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        [mul(r), mul(g), mul(b), a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)?;
        if a != 255 {
            write!(f, "{:02x}", a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` color
    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let error = || Error::MarkupParse(format!("invalid color: {color:?}"));
        let hex = color.trim().strip_prefix('#').ok_or_else(error)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let digits = |index: usize, len: usize| {
            u8::from_str_radix(&hex[index..index + len], 16).map_err(|_| error())
        };
        match hex.len() {
            3 => Ok(Rgba::new(
                digits(0, 1)? * 0x11,
                digits(1, 1)? * 0x11,
                digits(2, 1)? * 0x11,
                255,
            )),
            6 | 8 => Ok(Rgba::new(
                digits(0, 2)?,
                digits(2, 2)?,
                digits(4, 2)?,
                if hex.len() == 8 { digits(6, 2)? } else { 255 },
            )),
            _ => Err(error()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(color: String) -> Result<Self, Self::Error> {
        color.parse()
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

/// Component levels addressable by 1 byte colors
const LEVELS: [u8; 5] = [0x00, 0x40, 0x80, 0xc0, 0xff];

/// 1 byte color referring to transparent black
pub const COLOR1_TRANSPARENT: u8 = 0x7f;
/// 1 byte color referring to the first custom palette entry
pub const COLOR1_PALETTE0: u8 = 0x80;

/// Encode color with one of the IconVG direct color forms (1, 2, 3 or 4 bytes),
/// returns encoding index `0..=3` and the bytes, shortest form is chosen.
pub fn encode_color(color: Rgba) -> (u8, Vec<u8>) {
    let [r, g, b, a] = color.premultiplied();
    let level = |c: u8| LEVELS.iter().position(|l| *l == c);
    if a == 0xff {
        if let (Some(r), Some(g), Some(b)) = (level(r), level(g), level(b)) {
            return (0, vec![(r * 25 + g * 5 + b) as u8]);
        }
    }
    match [r, g, b, a] {
        [0xc0, 0xc0, 0xc0, 0xc0] => return (0, vec![125]),
        [0x80, 0x80, 0x80, 0x80] => return (0, vec![126]),
        [0, 0, 0, 0] => return (0, vec![COLOR1_TRANSPARENT]),
        _ => (),
    }
    if [r, g, b, a].iter().all(|c| c % 0x11 == 0) {
        return (1, vec![(r & 0xf0) | (g >> 4), (b & 0xf0) | (a >> 4)]);
    }
    if a == 0xff {
        return (2, vec![r, g, b]);
    }
    (3, vec![r, g, b, a])
}

/// Opacity converted to the blend weight of IconVG indirect colors
pub fn opacity_weight(opacity: Scalar) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

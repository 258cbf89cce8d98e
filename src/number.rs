//! IconVG variable width numbers
//!
//! All numbers are little-endian, the lowest bits of the first byte select the width:
//!  - `xxxxxxx0` - 1 byte
//!  - `xxxxxx01` - 2 bytes
//!  - `xxxxxx11` - 4 bytes
//!
//! Coordinates and zero-to-one numbers reuse the same layout, 1 and 2 byte forms
//! store exact integers or fixed point fractions, 4 byte form stores an `f32` whose
//! two lowest mantissa bits are occupied by the width tag.
use crate::Scalar;

/// Byte buffer holding encoded IconVG data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn push(&mut self, byte: u8) {
        self.0.push(byte);
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    /// Overwrite already written byte
    pub fn set(&mut self, index: usize, byte: u8) {
        self.0[index] = byte;
    }

    /// Encode natural number, returns number of bytes written
    pub fn encode_natural(&mut self, value: u32) -> usize {
        if value < 1 << 7 {
            self.push((value << 1) as u8);
            1
        } else if value < 1 << 14 {
            let value = (value << 2) | 0b01;
            self.extend_from_slice(&(value as u16).to_le_bytes());
            2
        } else {
            let value = (value << 2) | 0b11;
            self.extend_from_slice(&value.to_le_bytes());
            4
        }
    }

    /// Encode coordinate, returns number of bytes written
    pub fn encode_coordinate(&mut self, value: Scalar) -> usize {
        match Tier::coordinate(value) {
            Tier::One(byte) => self.push(byte),
            Tier::Two(word) => self.extend_from_slice(&word.to_le_bytes()),
            Tier::Four(bits) => self.extend_from_slice(&bits.to_le_bytes()),
        }
        coordinate_len(value)
    }

    /// Encode number from `[0, 1]` range, returns number of bytes written
    pub fn encode_zero_to_one(&mut self, value: Scalar) -> usize {
        match Tier::zero_to_one(value) {
            Tier::One(byte) => self.push(byte),
            Tier::Two(word) => self.extend_from_slice(&word.to_le_bytes()),
            Tier::Four(bits) => self.extend_from_slice(&bits.to_le_bytes()),
        }
        zero_to_one_len(value)
    }
}

/// Encoded representation of a real number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    One(u8),
    Two(u16),
    Four(u32),
}

impl Tier {
    fn len(self) -> usize {
        match self {
            Tier::One(_) => 1,
            Tier::Two(_) => 2,
            Tier::Four(_) => 4,
        }
    }

    fn coordinate(value: Scalar) -> Self {
        // integers in [-64, 64)
        if value.fract() == 0.0 && (-64.0..64.0).contains(&value) {
            return Tier::One((((value as i32) + 64) << 1) as u8);
        }
        // multiples of 1/64 in [-128, 128), scaling by a power of two is exact
        let scaled = value * 64.0;
        if scaled.fract() == 0.0 && (-128.0 * 64.0..128.0 * 64.0).contains(&scaled) {
            let word = ((((scaled as i32) + 128 * 64) as u32) << 2) | 0b01;
            return Tier::Two(word as u16);
        }
        Tier::Four(real_bits(value))
    }

    fn zero_to_one(value: Scalar) -> Self {
        // 1 byte holds `n / 120` and 2 bytes hold `n / 15120`, both slightly exceed 1,
        // a tier is used only if the decoder division yields exactly the same value
        let n = (value * 15120.0).round();
        if (0.0..16384.0).contains(&n) && n / 15120.0 == value {
            let n = n as u32;
            let short = n / 126;
            if n % 126 == 0 && short < 128 && short as Scalar / 120.0 == value {
                return Tier::One((short << 1) as u8);
            }
            return Tier::Two(((n << 2) | 0b01) as u16);
        }
        Tier::Four(real_bits(value))
    }
}

/// `f32` bits with the lowest two mantissa bits rounded away and replaced by the width tag
fn real_bits(value: Scalar) -> u32 {
    let bits = value.to_bits();
    let mut mantissa = bits & 0x007f_ffff;
    // round half up, never overflowing into the exponent
    if mantissa < 0x007f_fffe {
        mantissa += 2;
    }
    (bits & 0xff80_0000) | mantissa | 0b11
}

/// Number of bytes used to encode coordinate
pub fn coordinate_len(value: Scalar) -> usize {
    Tier::coordinate(value).len()
}

/// Number of bytes used to encode zero-to-one number
pub fn zero_to_one_len(value: Scalar) -> usize {
    Tier::zero_to_one(value).len()
}

/// Value decoder would recover from the encoded coordinate
pub fn quantize_coordinate(value: Scalar) -> Scalar {
    match Tier::coordinate(value) {
        Tier::Four(bits) => Scalar::from_bits(bits & !0b11),
        _ => value,
    }
}

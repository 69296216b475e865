//! Per-frame digital input vector and its wire encoding.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Size in bytes of one encoded input record (netplay payload and replay record)
pub const WIRE_INPUT_SIZE: usize = 4;

bitflags::bitflags! {
    /// Digital input state for one player for one frame.
    ///
    /// Bit positions are part of the wire and replay format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct InputBits: u16 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const A = 1 << 4;
        const B = 1 << 5;
        const C = 1 << 6;
        const X = 1 << 7;
        const Y = 1 << 8;
        const Z = 1 << 9;
        const START = 1 << 10;

        const ANY_BUTTON = Self::A.bits()
            | Self::B.bits()
            | Self::C.bits()
            | Self::X.bits()
            | Self::Y.bits()
            | Self::Z.bits();
    }
}

impl Default for InputBits {
    fn default() -> Self {
        Self::empty()
    }
}

impl InputBits {
    /// Build from the eleven individual switches, in wire bit order.
    #[allow(clippy::too_many_arguments)]
    pub fn from_switches(
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        a: bool,
        b: bool,
        c: bool,
        x: bool,
        y: bool,
        z: bool,
        start: bool,
    ) -> Self {
        let mut bits = Self::empty();
        bits.set(Self::UP, up);
        bits.set(Self::DOWN, down);
        bits.set(Self::LEFT, left);
        bits.set(Self::RIGHT, right);
        bits.set(Self::A, a);
        bits.set(Self::B, b);
        bits.set(Self::C, c);
        bits.set(Self::X, x);
        bits.set(Self::Y, y);
        bits.set(Self::Z, z);
        bits.set(Self::START, start);
        bits
    }

    /// Encode as the 4-byte little-endian wire record.
    pub fn to_wire(self) -> [u8; WIRE_INPUT_SIZE] {
        i32::from(self.bits()).to_le_bytes()
    }

    /// Decode a wire record. Unknown high bits are dropped.
    pub fn from_wire(bytes: [u8; WIRE_INPUT_SIZE]) -> Self {
        Self::from_raw(i32::from_le_bytes(bytes))
    }

    /// Interpret a raw signed record value.
    pub fn from_raw(raw: i32) -> Self {
        Self::from_bits_truncate(raw as u16)
    }
}

/// Netplay input payload.
///
/// Carries the `InputBits` of one player as the signed 32-bit value used on
/// the wire, so the payload layout does not depend on the flag type's width.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct NetInput {
    pub raw: i32,
}

impl NetInput {
    pub fn new(bits: InputBits) -> Self {
        Self {
            raw: i32::from(bits.bits()),
        }
    }

    pub fn bits(self) -> InputBits {
        InputBits::from_raw(self.raw)
    }
}

impl From<InputBits> for NetInput {
    fn from(bits: InputBits) -> Self {
        Self::new(bits)
    }
}

impl From<NetInput> for InputBits {
    fn from(input: NetInput) -> Self {
        input.bits()
    }
}

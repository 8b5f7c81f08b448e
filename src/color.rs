//! Color codes of the supported panels
//!
//! The driver itself only deals with raw codes (`u8`). These types name the
//! codes of the common panel families and let [`VarDisplay`](crate::graphics::VarDisplay)
//! pick the right bit depth.

use crate::encoder::BitDepth;

#[cfg(feature = "graphics")]
use embedded_graphics_core::pixelcolor::PixelColor;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Color {}
    impl Sealed for super::QuadColor {}
    impl Sealed for super::OctColor {}
}

/// A color that maps onto a code of a fixed bit depth
///
/// Sealed: every code of the implementors fits into [`ColorCode::DEPTH`].
pub trait ColorCode: Copy + sealed::Sealed {
    /// Depth the codes are meant for
    const DEPTH: BitDepth;

    /// The panel code of the color
    fn code(self) -> u8;

    /// The color behind a panel code
    fn from_code(code: u8) -> Option<Self>;
}

/// Black/white colors of the monochrome panels
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum Color {
    /// Black color
    Black = 0,
    /// White color
    #[default]
    White = 1,
}

impl Color {
    /// Gets a full byte of black or white pixels
    pub fn get_byte_value(self) -> u8 {
        match self {
            Color::Black => 0x00,
            Color::White => 0xff,
        }
    }

    /// Inverts the color
    pub fn inverse(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl ColorCode for Color {
    const DEPTH: BitDepth = BitDepth::One;

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Color::Black),
            1 => Some(Color::White),
            _ => None,
        }
    }
}

/// Colors of the four color "G" panels
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum QuadColor {
    /// Black
    Black = 0x0,
    /// White
    #[default]
    White = 0x1,
    /// Yellow
    Yellow = 0x2,
    /// Red
    Red = 0x3,
}

impl ColorCode for QuadColor {
    const DEPTH: BitDepth = BitDepth::Two;

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0x0 => Some(QuadColor::Black),
            0x1 => Some(QuadColor::White),
            0x2 => Some(QuadColor::Yellow),
            0x3 => Some(QuadColor::Red),
            _ => None,
        }
    }
}

/// Colors of the seven color ACeP panels
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[repr(u8)]
pub enum OctColor {
    /// Black
    Black = 0x00,
    /// White
    #[default]
    White = 0x01,
    /// Green
    Green = 0x02,
    /// Blue
    Blue = 0x03,
    /// Red
    Red = 0x04,
    /// Yellow
    Yellow = 0x05,
    /// Orange
    Orange = 0x06,
    /// HiZ / Clean
    HiZ = 0x07,
}

impl OctColor {
    /// Takes two colors and returns the byte holding both pixels
    pub fn colors_byte(a: OctColor, b: OctColor) -> u8 {
        (a.code() << 4) | b.code()
    }

    /// Splits a byte into the colors of its two pixels
    pub fn split_byte(byte: u8) -> Option<(OctColor, OctColor)> {
        Some((Self::from_code(byte >> 4)?, Self::from_code(byte & 0x0f)?))
    }
}

impl ColorCode for OctColor {
    const DEPTH: BitDepth = BitDepth::Four;

    fn code(self) -> u8 {
        self as u8
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(OctColor::Black),
            0x01 => Some(OctColor::White),
            0x02 => Some(OctColor::Green),
            0x03 => Some(OctColor::Blue),
            0x04 => Some(OctColor::Red),
            0x05 => Some(OctColor::Yellow),
            0x06 => Some(OctColor::Orange),
            0x07 => Some(OctColor::HiZ),
            _ => None,
        }
    }
}

#[cfg(feature = "graphics")]
impl PixelColor for Color {
    type Raw = ();
}

#[cfg(feature = "graphics")]
impl PixelColor for QuadColor {
    type Raw = ();
}

#[cfg(feature = "graphics")]
impl PixelColor for OctColor {
    type Raw = ();
}

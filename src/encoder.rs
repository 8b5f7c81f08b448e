//! Packing of logical pixels into the byte stream of a panel
//!
//! Every panel stores its pixels row by row, most significant bits first.
//! Depending on the bit depth one byte carries 8, 4 or 2 pixels:
//!
//! | depth | pixels per byte | uniform fill of code `c`         |
//! |-------|-----------------|----------------------------------|
//! | 1     | 8               | `c` repeated in all 8 bits       |
//! | 2     | 4               | `(c<<6) \| (c<<4) \| (c<<2) \| c` |
//! | 4     | 2               | `(c<<4) \| c`                    |
//!
//! Rows whose width is not a multiple of the pixels per byte are padded up to
//! the next full byte.

use bit_field::BitField;
use core::fmt::{Display, Formatter};
use core::ops::Range;

/// Side length of the QR matrices rendered by [`Overlay`]
pub const QR_SIDE: u32 = 32;

/// Native color depth of a panel
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BitDepth {
    /// Monochrome, 8 pixels per byte
    One = 1,
    /// Four colors, 4 pixels per byte
    Two = 2,
    /// Up to 16 colors, 2 pixels per byte
    Four = 4,
}

impl BitDepth {
    /// Bits used by a single pixel
    pub const fn bits(self) -> usize {
        self as usize
    }

    /// Number of pixels packed into one byte
    pub const fn pixels_per_byte(self) -> usize {
        8 / self.bits()
    }

    /// Largest color code a pixel can hold
    pub const fn max_code(self) -> u8 {
        ((1u16 << self.bits()) - 1) as u8
    }

    // bit range of the pixel in slot `slot` of a byte, slot 0 being the MSBs
    fn slot_bits(self, slot: usize) -> Range<usize> {
        let start = 8 - self.bits() * (slot + 1);
        start..start + self.bits()
    }

    fn check_code(self, code: u8) -> Result<u8, EncodeError> {
        if code > self.max_code() {
            return Err(EncodeError::ColorOutOfRange { code, depth: self });
        }
        Ok(code)
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = EncodeError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(BitDepth::One),
            2 => Ok(BitDepth::Two),
            4 => Ok(BitDepth::Four),
            bits => Err(EncodeError::UnsupportedBitDepth(bits)),
        }
    }
}

/// Errors of the pixel encoder
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// Only 1, 2 and 4 bits per pixel can be packed
    UnsupportedBitDepth(u8),
    /// A buffer does not have the size computed from width, height and depth
    DimensionMismatch {
        /// Size computed from the geometry
        expected: usize,
        /// Size that was handed in
        actual: usize,
    },
    /// The color code needs more bits than the panel has per pixel
    ColorOutOfRange {
        /// Offending code
        code: u8,
        /// Depth of the target
        depth: BitDepth,
    },
    /// An overlay can't be scaled by zero
    ZeroScale,
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedBitDepth(bits) => write!(f, "{bits} bits per pixel are not supported"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "buffer holds {actual} bytes, {expected} bytes expected")
            }
            Self::ColorOutOfRange { code, depth } => {
                write!(f, "color {code:#x} does not fit into {} bits", depth.bits())
            }
            Self::ZeroScale => write!(f, "overlay scale must be at least 1"),
        }
    }
}

/// count the number of bytes per line knowing that it may contains padding bits
pub const fn line_bytes(width: u32, depth: BitDepth) -> usize {
    // round to upper 8 bit count
    (width as usize * depth.bits() + 7) / 8
}

/// Size of a packed plane: `ceil(width * bits / 8) * height`
pub const fn plane_len(width: u32, height: u32, depth: BitDepth) -> usize {
    line_bytes(width, depth) * height as usize
}

/// Fails with [`EncodeError::DimensionMismatch`] unless `len` matches the plane size
pub fn check_len(len: usize, width: u32, height: u32, depth: BitDepth) -> Result<(), EncodeError> {
    let expected = plane_len(width, height, depth);
    if len != expected {
        return Err(EncodeError::DimensionMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// A byte where every pixel slot holds `code`
pub fn fill_byte(depth: BitDepth, code: u8) -> Result<u8, EncodeError> {
    let code = depth.check_code(code)?;
    let mut byte = 0u8;
    for slot in 0..depth.pixels_per_byte() {
        byte.set_bits(depth.slot_bits(slot), code);
    }
    Ok(byte)
}

/// Fills a whole packed plane with one color
pub fn fill(buffer: &mut [u8], depth: BitDepth, code: u8) -> Result<(), EncodeError> {
    let byte = fill_byte(depth, code)?;
    buffer.fill(byte);
    Ok(())
}

// byte index and bit range of pixel (x, y)
fn locate(width: u32, depth: BitDepth, x: u32, y: u32) -> (usize, Range<usize>) {
    let ppb = depth.pixels_per_byte();
    let index = y as usize * line_bytes(width, depth) + x as usize / ppb;
    (index, depth.slot_bits(x as usize % ppb))
}

/// Reads the code of pixel (x, y) from a packed plane of `width` pixels per row
///
/// Returns `None` for coordinates outside of the buffer.
pub fn pixel(buffer: &[u8], width: u32, depth: BitDepth, x: u32, y: u32) -> Option<u8> {
    if x >= width {
        return None;
    }
    let (index, bits) = locate(width, depth, x, y);
    buffer.get(index).map(|byte| byte.get_bits(bits))
}

/// Writes `code` into pixel (x, y) of a packed plane
///
/// Coordinates outside of the buffer are ignored.
pub fn set_pixel(
    buffer: &mut [u8],
    width: u32,
    depth: BitDepth,
    x: u32,
    y: u32,
    code: u8,
) -> Result<(), EncodeError> {
    let code = depth.check_code(code)?;
    if x >= width {
        return Ok(());
    }
    let (index, bits) = locate(width, depth, x, y);
    if let Some(byte) = buffer.get_mut(index) {
        byte.set_bits(bits, code);
    }
    Ok(())
}

/// Square 1-bit bitmap, e.g. a QR matrix
///
/// Bits are stored row by row without padding, MSB first:
/// `bit = (data[index / 8] >> (7 - index % 8)) & 1` with `index = row * side + col`.
#[derive(Copy, Clone, Debug)]
pub struct Overlay<'a> {
    data: &'a [u8],
    side: u32,
}

impl<'a> Overlay<'a> {
    /// Wraps `data` as a `side` x `side` bitmap
    pub fn new(data: &'a [u8], side: u32) -> Result<Self, EncodeError> {
        let bits = (side as usize).checked_mul(side as usize);
        let expected = bits.map_or(usize::MAX, |bits| bits / 8 + usize::from(bits % 8 != 0));
        if data.len() != expected {
            return Err(EncodeError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, side })
    }

    /// Wraps a [`QR_SIDE`] sized QR matrix
    pub fn qr(data: &'a [u8]) -> Result<Self, EncodeError> {
        Self::new(data, QR_SIDE)
    }

    /// Side length in source cells
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Whether the cell at (row, col) is set
    pub fn bit(&self, row: u32, col: u32) -> bool {
        let index = row as usize * self.side as usize + col as usize;
        (self.data[index / 8] >> (7 - index % 8)) & 1 == 1
    }
}

/// How an [`Overlay`] is mapped onto the panel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Every source cell becomes a `scale` x `scale` square
    pub scale: u32,
    /// Code for set cells
    pub foreground: u8,
    /// Code for cleared cells, padding and everything outside the footprint
    pub background: u8,
}

impl OverlayStyle {
    fn code_at(&self, overlay: &Overlay<'_>, row: u32, col: u64) -> u8 {
        // side * scale always fits into u64
        let scale = u64::from(self.scale);
        let footprint = u64::from(overlay.side) * scale;
        if u64::from(row) >= footprint || col >= footprint {
            return self.background;
        }
        // inside the footprint both cells are below `side`
        if overlay.bit(row / self.scale, (col / scale) as u32) {
            self.foreground
        } else {
            self.background
        }
    }
}

/// Streams the packed bytes of a scaled overlay, row by row
///
/// The overlay is anchored at the top left corner of the panel. `x_offset`
/// selects the first panel column when only a column segment is rendered.
pub struct OverlayBytes<'a> {
    overlay: Overlay<'a>,
    style: OverlayStyle,
    depth: BitDepth,
    x_offset: u32,
    width: u32,
    height: u32,
    row: u32,
    byte: usize,
}

impl<'a> OverlayBytes<'a> {
    /// Renders a plane of `width` x `height` pixels
    pub fn new(
        overlay: Overlay<'a>,
        style: OverlayStyle,
        depth: BitDepth,
        width: u32,
        height: u32,
    ) -> Result<Self, EncodeError> {
        if style.scale == 0 {
            return Err(EncodeError::ZeroScale);
        }
        depth.check_code(style.foreground)?;
        depth.check_code(style.background)?;
        Ok(Self {
            overlay,
            style,
            depth,
            x_offset: 0,
            width,
            height,
            row: 0,
            byte: 0,
        })
    }

    /// Renders columns starting at `x_offset` instead of column 0
    pub fn with_offset(mut self, x_offset: u32) -> Self {
        self.x_offset = x_offset;
        self
    }

    fn remaining(&self) -> usize {
        let line = line_bytes(self.width, self.depth);
        let rows_left = self.height.saturating_sub(self.row) as usize;
        (rows_left * line).saturating_sub(self.byte)
    }
}

impl Iterator for OverlayBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.row >= self.height {
            return None;
        }
        let ppb = self.depth.pixels_per_byte();
        let mut packed = 0u8;
        for slot in 0..ppb {
            let col = (self.byte * ppb + slot) as u32;
            let code = if col >= self.width {
                self.style.background
            } else {
                self.style
                    .code_at(&self.overlay, self.row, u64::from(self.x_offset) + u64::from(col))
            };
            packed.set_bits(self.depth.slot_bits(slot), code);
        }

        self.byte += 1;
        if self.byte == line_bytes(self.width, self.depth) {
            self.byte = 0;
            self.row += 1;
        }
        Some(packed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for OverlayBytes<'_> {}

/// Renders a scaled overlay into a caller supplied plane buffer
pub fn encode_overlay_into(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    depth: BitDepth,
    overlay: Overlay<'_>,
    style: OverlayStyle,
) -> Result<(), EncodeError> {
    check_len(buffer.len(), width, height, depth)?;
    let bytes = OverlayBytes::new(overlay, style, depth, width, height)?;
    for (dst, src) in buffer.iter_mut().zip(bytes) {
        *dst = src;
    }
    Ok(())
}

/// Streams the bytes of a column window `x..x + width` out of a full-width plane
///
/// Wide panels driven by two controllers take one window each. Padding bits at
/// the end of a window row are zero.
pub struct SegmentBytes<'a> {
    buffer: &'a [u8],
    full_width: u32,
    depth: BitDepth,
    x: u32,
    width: u32,
    height: u32,
    row: u32,
    byte: usize,
}

impl<'a> SegmentBytes<'a> {
    /// `buffer` must be a full plane of `full_width` x `height` pixels
    pub fn new(
        buffer: &'a [u8],
        full_width: u32,
        height: u32,
        depth: BitDepth,
        x: u32,
        width: u32,
    ) -> Result<Self, EncodeError> {
        check_len(buffer.len(), full_width, height, depth)?;
        Ok(Self {
            buffer,
            full_width,
            depth,
            x,
            width,
            height,
            row: 0,
            byte: 0,
        })
    }
}

impl Iterator for SegmentBytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.row >= self.height {
            return None;
        }
        let ppb = self.depth.pixels_per_byte();
        let line = line_bytes(self.width, self.depth);
        let first = self.x as usize;

        let packed = if first % ppb == 0 {
            // window starts on a byte boundary, copy through
            let src = self.row as usize * line_bytes(self.full_width, self.depth)
                + first / ppb
                + self.byte;
            let mut value = self.buffer.get(src).copied().unwrap_or(0);
            let used = self.width as usize - self.byte * ppb;
            if used < ppb {
                value.set_bits(0..(ppb - used) * self.depth.bits(), 0);
            }
            value
        } else {
            let mut value = 0u8;
            for slot in 0..ppb {
                let col = (self.byte * ppb + slot) as u32;
                if col >= self.width {
                    break;
                }
                let code = pixel(
                    self.buffer,
                    self.full_width,
                    self.depth,
                    self.x + col,
                    self.row,
                )
                .unwrap_or(0);
                value.set_bits(self.depth.slot_bits(slot), code);
            }
            value
        };

        self.byte += 1;
        if self.byte == line {
            self.byte = 0;
            self.row += 1;
        }
        Some(packed)
    }
}

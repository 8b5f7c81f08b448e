//! Graphics Support for EPDs

use crate::color::ColorCode;
use crate::descriptor::PanelDescriptor;
use crate::encoder;
use core::marker::PhantomData;
use embedded_graphics_core::prelude::*;

/// Display rotation, only 90° increments supported
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate by 90 degrees clockwise
    Rotate90,
    /// Rotate by 180 degrees clockwise
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

/// Error found during usage of VarDisplay
#[derive(Debug, PartialEq, Eq)]
pub enum VarDisplayError {
    /// The provided buffer was too small
    BufferTooSmall,
    /// The color type has a different bit depth than the panel
    DepthMismatch,
}

/// Packed frame buffer for drawing with embedded graphics
///
/// The buffer holds one plane at the native depth of `COLOR`, so it can be
/// handed to [`PanelDriver::update_frame`](crate::driver::PanelDriver::update_frame)
/// as it is. You must allocate the buffer by yourself.
pub struct VarDisplay<'a, COLOR: ColorCode> {
    width: u32,
    height: u32,
    buffer: &'a mut [u8],
    rotation: DisplayRotation,
    _color: PhantomData<COLOR>,
}

/// For use with embedded_grahics
impl<COLOR> DrawTarget for VarDisplay<'_, COLOR>
where
    COLOR: ColorCode + PixelColor,
{
    type Color = COLOR;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for pixel in pixels {
            self.set_pixel(pixel);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}

/// For use with embedded_grahics
impl<COLOR> OriginDimensions for VarDisplay<'_, COLOR>
where
    COLOR: ColorCode + PixelColor,
{
    fn size(&self) -> Size {
        match self.rotation {
            DisplayRotation::Rotate0 | DisplayRotation::Rotate180 => {
                Size::new(self.width, self.height)
            }
            DisplayRotation::Rotate90 | DisplayRotation::Rotate270 => {
                Size::new(self.height, self.width)
            }
        }
    }
}

impl<'a, COLOR: ColorCode + PixelColor> VarDisplay<'a, COLOR> {
    /// Wraps `buffer`, it must be large enough to contain all pixels.
    pub fn new(width: u32, height: u32, buffer: &'a mut [u8]) -> Result<Self, VarDisplayError> {
        let myself = Self {
            width,
            height,
            buffer,
            rotation: DisplayRotation::default(),
            _color: PhantomData,
        };
        // enfore some constraints dynamicly
        if myself.buffer_size() > myself.buffer.len() {
            return Err(VarDisplayError::BufferTooSmall);
        }
        Ok(myself)
    }

    /// A display with the size of a whole panel
    pub fn for_panel(
        descriptor: &PanelDescriptor,
        buffer: &'a mut [u8],
    ) -> Result<Self, VarDisplayError> {
        if descriptor.depth != COLOR::DEPTH {
            return Err(VarDisplayError::DepthMismatch);
        }
        Self::new(descriptor.width, descriptor.height, buffer)
    }

    /// get the number of used bytes in the buffer
    fn buffer_size(&self) -> usize {
        encoder::plane_len(self.width, self.height, COLOR::DEPTH)
    }

    /// get internal buffer to use it (to draw in epd)
    pub fn buffer(&self) -> &[u8] {
        &self.buffer[..self.buffer_size()]
    }

    /// Set the display rotation.
    ///
    /// This only concerns future drawing made to it. Anything aready drawn
    /// stays as it is in the buffer.
    pub fn set_rotation(&mut self, rotation: DisplayRotation) {
        self.rotation = rotation;
    }

    /// Get current rotation
    pub fn rotation(&self) -> DisplayRotation {
        self.rotation
    }

    /// Fills the whole buffer with one color
    pub fn fill(&mut self, color: COLOR) {
        let size = self.buffer_size();
        // sealed colors always fit their depth
        let _ = encoder::fill(&mut self.buffer[..size], COLOR::DEPTH, color.code());
    }

    /// Color of the pixel at a point of the unrotated buffer
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<COLOR> {
        if y >= self.height {
            return None;
        }
        encoder::pixel(self.buffer(), self.width, COLOR::DEPTH, x, y).and_then(COLOR::from_code)
    }

    /// Set a specific pixel color on this display
    pub fn set_pixel(&mut self, pixel: Pixel<COLOR>) {
        let Pixel(point, color) = pixel;

        // final coordinates
        let (width, height) = (self.width as i32, self.height as i32);
        let (x, y) = match self.rotation {
            // as i32 = never use more than 2 billion pixel per line or per column
            DisplayRotation::Rotate0 => (point.x, point.y),
            DisplayRotation::Rotate90 => (width - 1 - point.y, point.x),
            DisplayRotation::Rotate180 => (width - 1 - point.x, height - 1 - point.y),
            DisplayRotation::Rotate270 => (point.y, height - 1 - point.x),
        };

        // Out of range check
        if (x < 0) || (x >= width) || (y < 0) || (y >= height) {
            // don't do anything in case of out of range
            return;
        }

        let size = self.buffer_size();
        // sealed colors always fit their depth
        let _ = encoder::set_pixel(
            &mut self.buffer[..size],
            self.width,
            COLOR::DEPTH,
            x as u32,
            y as u32,
            color.code(),
        );
    }
}

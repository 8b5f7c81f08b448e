//! Chunked upload of a single plane
//!
//! Frames of the larger panels rarely fit into the RAM of the host. A
//! [`FrameWriter`] takes the plane in pieces, e.g. one image block at a time as
//! they come in, and makes sure the panel receives exactly one plane.

use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::trace;

use crate::driver::PanelDriver;
use crate::encoder::EncodeError;
use crate::error::ErrorKind;

/// Open upload into one refresh step, see [`PanelDriver::start_frame`]
pub struct FrameWriter<'a, SPI, BUSY, DC, RST> {
    driver: &'a mut PanelDriver<SPI, BUSY, DC, RST>,
    spi: &'a mut SPI,
    expected: usize,
    written: usize,
}

impl<'a, SPI, BUSY, DC, RST> FrameWriter<'a, SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    pub(crate) fn new(
        driver: &'a mut PanelDriver<SPI, BUSY, DC, RST>,
        spi: &'a mut SPI,
        expected: usize,
    ) -> Self {
        FrameWriter {
            driver,
            spi,
            expected,
            written: 0,
        }
    }

    /// Sends the next piece of the plane
    ///
    /// A piece that would run past the end of the plane is rejected as a whole.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let total = self.written + chunk.len();
        if total > self.expected {
            return Err(EncodeError::DimensionMismatch {
                expected: self.expected,
                actual: total,
            }
            .into());
        }
        self.driver.stream_chunk(self.spi, chunk)?;
        self.written = total;
        Ok(())
    }

    /// Bytes still missing
    pub fn remaining(&self) -> usize {
        self.expected - self.written
    }

    /// Closes the upload, failing if the plane is incomplete
    pub fn finish(self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        if self.written != self.expected {
            return Err(EncodeError::DimensionMismatch {
                expected: self.expected,
                actual: self.written,
            }
            .into());
        }
        trace!("upload of {} bytes complete", self.written);
        Ok(())
    }
}

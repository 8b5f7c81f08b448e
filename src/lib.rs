//! A data-driven driver for e-paper panels via SPI
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! Every supported panel is a static [`PanelDescriptor`](descriptor::PanelDescriptor):
//! geometry, pixel depth, how the busy and data/command lines behave and the
//! command scripts for reset, configuration, waveform loading, refresh and
//! sleep. One generic [`PanelDriver`](driver::PanelDriver) runs them, so adding a
//! model is adding data.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1.0
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//! - chip select is handled by the [`SpiDevice`](embedded_hal::spi::SpiDevice)
//!
//! ### Other....
//!
//! - Buffersize: Wherever a buffer is used it always needs to be of the size
//!   `ceil(width * bits_per_pixel / 8) * height`, see [`encoder::plane_len`]
//!
//! # Examples
//!
//! ```rust, ignore
//! use epd_panels::prelude::*;
//!
//! let mut epd = PanelDriver::new(busy, dc, rst, Model::Epd7in3f.descriptor(), DriverConfig::default());
//! epd.init(&mut spi, &mut delay)?;
//!
//! let mut buffer = [0u8; 800 * 480 / 2];
//! let mut display = VarDisplay::<OctColor>::for_panel(epd.descriptor(), &mut buffer)?;
//!
//! // draw something into the display
//!
//! epd.update_and_display_frame(&mut spi, &mut delay, display.buffer())?;
//!
//! // wait and look at the image
//!
//! epd.clear(&mut spi, &mut delay, OctColor::White.code())?;
//!
//! epd.sleep(&mut spi, &mut delay)?;
//! ```
#![no_std]

#[cfg(feature = "graphics")]
pub mod graphics;

mod traits;

pub mod color;
pub mod config;
pub mod descriptor;
pub mod driver;
pub mod encoder;
pub mod error;
pub mod panels;
pub mod stream;

/// Interface for the physical connection between display and the controlling device
mod interface;

#[cfg(test)]
mod test_support;

pub use traits::RefreshLut;

/// Includes everything important besides the chosen panel
pub mod prelude {
    pub use crate::color::{Color, ColorCode, OctColor, QuadColor};
    pub use crate::config::DriverConfig;
    pub use crate::driver::{PanelDriver, PanelState};
    pub use crate::encoder::{BitDepth, Overlay, OverlayStyle};
    pub use crate::error::ErrorKind;
    pub use crate::panels::Model;
    pub use crate::traits::RefreshLut;
    pub use crate::SPI_MODE;

    #[cfg(feature = "graphics")]
    pub use crate::graphics::{DisplayRotation, VarDisplay};
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode -
/// For more infos see [Requirements: SPI](index.html#spi)
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

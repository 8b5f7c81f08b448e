use core::fmt::{Debug, Display, Formatter};

use embedded_hal::{
    digital::{ErrorType as PinErrorType, InputPin, OutputPin},
    spi::{ErrorType as SpiErrorType, SpiDevice},
};

use crate::driver::PanelState;
use crate::encoder::EncodeError;

/// Epd error type
pub enum ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Encountered an SPI error
    SpiError(<SPI as SpiErrorType>::Error),

    /// Encountered an error on Busy GPIO
    BusyError(<BUSY as PinErrorType>::Error),

    /// Encountered an error on DC GPIO
    DcError(<DC as PinErrorType>::Error),

    /// Encountered an error on RST GPIO
    RstError(<RST as PinErrorType>::Error),

    /// The bus could not be brought up before the reset pulse
    BusInit(<SPI as SpiErrorType>::Error),

    /// The busy line was not released within the configured bound
    BusyTimeout {
        /// Milliseconds spent polling before giving up
        waited_ms: u32,
    },

    /// The operation needs an initialised panel
    NotReady(PanelState),

    /// The panel has no refresh step with this index
    InvalidStep(usize),

    /// The panel does not offer the requested feature
    Unsupported,

    /// A buffer or color could not be encoded for this panel
    Encode(EncodeError),
}

impl<SPI, BUSY, DC, RST> From<EncodeError> for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl<SPI, BUSY, DC, RST> Display for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => write!(f, "spi transfer failed: {err:?}"),
            Self::BusyError(err) => write!(f, "busy pin could not be read: {err:?}"),
            Self::DcError(err) => write!(f, "dc pin could not be set: {err:?}"),
            Self::RstError(err) => write!(f, "reset pin could not be set: {err:?}"),
            Self::BusInit(err) => write!(f, "bus initialisation failed: {err:?}"),
            Self::BusyTimeout { waited_ms } => {
                write!(f, "panel still busy after {waited_ms}ms")
            }
            Self::NotReady(state) => write!(f, "panel is not ready (state: {state:?})"),
            Self::InvalidStep(index) => write!(f, "panel has no refresh step {index}"),
            Self::Unsupported => write!(f, "operation is not supported by this panel"),
            Self::Encode(err) => Display::fmt(err, f),
        }
    }
}

impl<SPI, BUSY, DC, RST> Debug for ErrorKind<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SpiError(err) => f.debug_tuple("SpiError").field(err).finish(),
            Self::BusyError(err) => f.debug_tuple("BusyError").field(err).finish(),
            Self::DcError(err) => f.debug_tuple("DcError").field(err).finish(),
            Self::RstError(err) => f.debug_tuple("RstError").field(err).finish(),
            Self::BusInit(err) => f.debug_tuple("BusInit").field(err).finish(),
            Self::BusyTimeout { waited_ms } => f
                .debug_struct("BusyTimeout")
                .field("waited_ms", waited_ms)
                .finish(),
            Self::NotReady(state) => f.debug_tuple("NotReady").field(state).finish(),
            Self::InvalidStep(index) => f.debug_tuple("InvalidStep").field(index).finish(),
            Self::Unsupported => write!(f, "Unsupported"),
            Self::Encode(err) => f.debug_tuple("Encode").field(err).finish(),
        }
    }
}

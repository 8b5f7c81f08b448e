use crate::config::DriverConfig;
use crate::descriptor::{BusyPolicy, DcPolicy, Level, PanelDescriptor};
use crate::{error::ErrorKind, traits::Command};
use core::marker::PhantomData;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::{trace, warn};

/// Size of the stack buffer used to batch generated data
const CHUNK: usize = 64;

/// The connection interface of all panels
///
/// How the control lines behave is taken from the panel descriptor, so the
/// same interface drives every model.
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST> {
    /// SPI
    _spi: PhantomData<SPI>,
    /// Busy line, its idle level depends on the panel
    busy: BUSY,
    /// Data/Command Control Pin
    dc: DC,
    /// Pin for Resetting
    rst: RST,
    dc_policy: DcPolicy,
    busy_policy: BusyPolicy,
    /// write data one byte per transaction
    single_byte_write: bool,
    busy_timeout_ms: Option<u32>,
}

impl<SPI, BUSY, DC, RST> DisplayInterface<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Creates a new `DisplayInterface` struct
    pub fn new(
        busy: BUSY,
        dc: DC,
        rst: RST,
        descriptor: &PanelDescriptor,
        config: &DriverConfig,
    ) -> Self {
        let mut busy_policy = descriptor.busy;
        if let Some(poll_ms) = config.poll_interval_ms {
            busy_policy.poll_ms = poll_ms;
        }
        DisplayInterface {
            _spi: PhantomData,
            busy,
            dc,
            rst,
            dc_policy: descriptor.dc,
            busy_policy,
            single_byte_write: descriptor.single_byte_write,
            busy_timeout_ms: config.busy_timeout_ms,
        }
    }

    /// Brings the bus up with an empty transaction, toggling chip select once
    pub(crate) fn init_bus(&mut self, spi: &mut SPI) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        spi.transaction(&mut []).map_err(ErrorKind::BusInit)
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of [data()](DisplayInterface::data())
    pub(crate) fn cmd<T: Command, DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        command: T,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        match self.dc_policy {
            DcPolicy::Toggle => {
                // low for commands
                self.dc.set_low().map_err(ErrorKind::DcError)?;
                self.write(spi, &[command.address()])
            }
            DcPolicy::Latched {
                lead_ms,
                setup_ms,
                hold_ms,
            } => {
                delay.delay_ms(lead_ms);
                self.dc.set_low().map_err(ErrorKind::DcError)?;
                delay.delay_ms(setup_ms);
                self.write(spi, &[command.address()])?;
                delay.delay_ms(hold_ms);
                self.dc.set_high().map_err(ErrorKind::DcError)
            }
        }
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.data_mode()?;

        if self.single_byte_write {
            for val in data.iter().copied() {
                // Transfer data one u8 at a time over spi
                self.write(spi, &[val])?;
            }
        } else {
            self.write(spi, data)?;
        }

        Ok(())
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command, DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        command: T,
        data: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.cmd(spi, delay, command)?;
        if data.is_empty() {
            return Ok(());
        }
        self.data(spi, data)
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    pub(crate) fn data_x_times(
        &mut self,
        spi: &mut SPI,
        val: u8,
        repetitions: usize,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let chunk = [val; CHUNK];
        let mut left = repetitions;
        while left > 0 {
            let len = left.min(CHUNK);
            self.data(spi, &chunk[..len])?;
            left -= len;
        }
        Ok(())
    }

    /// Sends generated data, batched through a small stack buffer
    pub(crate) fn data_iter<I>(
        &mut self,
        spi: &mut SPI,
        bytes: I,
    ) -> Result<usize, ErrorKind<SPI, BUSY, DC, RST>>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut chunk = [0u8; CHUNK];
        let mut filled = 0;
        let mut sent = 0;
        for byte in bytes {
            chunk[filled] = byte;
            filled += 1;
            if filled == CHUNK {
                self.data(spi, &chunk)?;
                sent += filled;
                filled = 0;
            }
        }
        if filled > 0 {
            self.data(spi, &chunk[..filled])?;
            sent += filled;
        }
        Ok(sent)
    }

    fn data_mode(&mut self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        match self.dc_policy {
            // high for data
            DcPolicy::Toggle => self.dc.set_high().map_err(ErrorKind::DcError),
            // already released after the last command
            DcPolicy::Latched { .. } => Ok(()),
        }
    }

    // spi write helper/abstraction function
    fn write(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // transfer spi data
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        if cfg!(target_os = "linux") {
            for data_chunk in data.chunks(4096) {
                spi.write(data_chunk).map_err(ErrorKind::SpiError)?;
            }
            Ok(())
        } else {
            spi.write(data).map_err(ErrorKind::SpiError)
        }
    }

    /// Waits until device isn't busy anymore
    ///
    /// This is normally handled by the more complicated commands themselves,
    /// but in the case you send data and commands directly you might need to check
    /// if the device is still busy
    pub(crate) fn wait_until_idle<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let policy = self.busy_policy;
        if policy.lead_ms > 0 {
            delay.delay_ms(policy.lead_ms);
        }
        self.poll_until(spi, delay, policy.idle)?;
        if policy.settle_ms > 0 {
            delay.delay_ms(policy.settle_ms);
        }
        Ok(())
    }

    /// Polls until the busy line reads `level`, regardless of the idle level
    pub(crate) fn wait_for_level<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        level: Level,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.poll_until(spi, delay, level)
    }

    fn poll_until<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        level: Level,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let poll_ms = self.busy_policy.poll_ms;
        let mut waited_ms: u32 = 0;
        loop {
            if let Some(status) = self.busy_policy.status_command {
                self.cmd(spi, delay, status)?;
            }
            if self.read_busy()? == level {
                break;
            }
            if let Some(limit) = self.busy_timeout_ms {
                if waited_ms >= limit {
                    warn!("busy line stuck after {}ms", waited_ms);
                    return Err(ErrorKind::BusyTimeout { waited_ms });
                }
            }
            delay.delay_ms(poll_ms);
            waited_ms = waited_ms.saturating_add(poll_ms);
        }
        trace!("busy line {:?} after {}ms", level, waited_ms);
        Ok(())
    }

    fn read_busy(&mut self) -> Result<Level, ErrorKind<SPI, BUSY, DC, RST>> {
        let high = self.busy.is_high().map_err(ErrorKind::BusyError)?;
        Ok(if high { Level::High } else { Level::Low })
    }

    /// Checks if device is still busy
    ///
    /// This is normally handled by the more complicated commands themselves,
    /// but in the case you send data and commands directly you might need to check
    /// if the device is still busy
    pub(crate) fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        Ok(self.read_busy()? != self.busy_policy.idle)
    }

    /// Drives the reset line
    pub(crate) fn set_reset(&mut self, level: Level) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        match level {
            Level::High => self.rst.set_high(),
            Level::Low => self.rst.set_low(),
        }
        .map_err(ErrorKind::RstError)
    }

    /// Gives the pins back
    pub(crate) fn release(self) -> (BUSY, DC, RST) {
        (self.busy, self.dc, self.rst)
    }
}

//! The panel driver
//!
//! [`PanelDriver`] runs the scripts of a [`PanelDescriptor`] over the bus and
//! keeps track of the panel's life cycle:
//!
//! ```text
//! Uninit -> Resetting -> SoftReset -> Configuring -> LutLoaded -> Ready
//! Ready -> Refreshing -> Ready
//! Ready -> Sleeping -> (init) -> ...
//! ```
//!
//! Everything but `init`/`wake_up` and the raw accessors needs a `Ready` panel.
//! A failing transfer or busy wait in the middle of a script leaves the driver
//! `Uninit`, only a new `init` brings it back.
//!
//! # Example
//!
//! ```rust, ignore
//! use epd_panels::prelude::*;
//!
//! let mut epd = PanelDriver::new(busy, dc, rst, Model::Epd1in54V2.descriptor(), DriverConfig::default());
//! epd.init(&mut spi, &mut delay)?;
//! epd.clear(&mut spi, &mut delay, Color::White.code())?;
//! epd.update_and_display_frame(&mut spi, &mut delay, &buffer)?;
//! epd.sleep(&mut spi, &mut delay)?;
//! ```

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};
use log::{debug, trace};

use crate::config::DriverConfig;
use crate::descriptor::{Op, PanelDescriptor, PlaneFill};
use crate::encoder::{self, Overlay, OverlayBytes, OverlayStyle, SegmentBytes};
use crate::error::ErrorKind;
use crate::interface::DisplayInterface;
use crate::stream::FrameWriter;
use crate::traits::RefreshLut;

/// Life cycle of a panel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PanelState {
    /// Not initialised, or a previous operation failed
    Uninit,
    /// Reset pulse in progress
    Resetting,
    /// Software reset in progress
    SoftReset,
    /// Registers are programmed
    Configuring,
    /// The waveform has been loaded
    LutLoaded,
    /// Accepting frames
    Ready,
    /// A refresh is running
    Refreshing,
    /// Deep sleep, needs `init` to come back
    Sleeping,
}

/// Driver for every panel that can be described by a [`PanelDescriptor`]
pub struct PanelDriver<SPI, BUSY, DC, RST> {
    /// Connection Interface
    interface: DisplayInterface<SPI, BUSY, DC, RST>,
    descriptor: &'static PanelDescriptor,
    state: PanelState,
    /// Color code of the last `clear`
    last_color: Option<u8>,
    /// Refresh LUT
    refresh: RefreshLut,
}

impl<SPI, BUSY, DC, RST> PanelDriver<SPI, BUSY, DC, RST>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Takes ownership of the pins. Nothing is sent before [`init`](Self::init).
    pub fn new(
        busy: BUSY,
        dc: DC,
        rst: RST,
        descriptor: &'static PanelDescriptor,
        config: DriverConfig,
    ) -> Self {
        PanelDriver {
            interface: DisplayInterface::new(busy, dc, rst, descriptor, &config),
            descriptor,
            state: PanelState::Uninit,
            last_color: None,
            refresh: RefreshLut::Full,
        }
    }

    /// Resets and configures the panel, loading its full waveform
    ///
    /// Works from every state. On failure the driver is left `Uninit`.
    pub fn init<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let result = self.run_init(spi, delay);
        self.settle(result)
    }

    fn run_init<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let descriptor = self.descriptor;
        self.last_color = None;
        self.refresh = RefreshLut::Full;

        self.set_state(PanelState::Resetting);
        self.interface.init_bus(spi)?;
        self.run_script(spi, delay, descriptor.reset)?;

        self.set_state(PanelState::SoftReset);
        self.run_script(spi, delay, descriptor.soft_reset)?;

        self.set_state(PanelState::Configuring);
        self.run_script(spi, delay, descriptor.init)?;
        self.run_script(spi, delay, descriptor.lut)?;
        self.set_state(PanelState::LutLoaded);

        self.set_state(PanelState::Ready);
        Ok(())
    }

    /// Wakes the panel from deep sleep, which takes a full [`init`](Self::init)
    pub fn wake_up<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.init(spi, delay)
    }

    /// Fills every RAM plane and refreshes the panel
    ///
    /// `color` is a code of the panel's bit depth. Planes with a constant fill get
    /// their constant instead, e.g. the red plane of a tricolor panel.
    pub fn clear<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        color: u8,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let fill = encoder::fill_byte(self.descriptor.depth, color)?;
        let result = self.write_fill(spi, delay, fill);
        self.settle(result)?;
        self.last_color = Some(color);
        self.turn_on_display(spi, delay)
    }

    fn write_fill<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        fill: u8,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let descriptor = self.descriptor;
        self.run_script(spi, delay, descriptor.pre_write)?;
        for plane in descriptor.planes {
            let byte = match plane.fill {
                PlaneFill::Color => fill,
                PlaneFill::Constant(byte) => byte,
            };
            let len = descriptor.plane_len(plane);
            self.interface.cmd(spi, delay, plane.command)?;
            self.interface.data_x_times(spi, byte, len)?;
            trace!("plane {:#04x}: {} x {:#04x}", plane.command, len, byte);
        }
        Ok(())
    }

    /// Starts a refresh with the active waveform and waits until it is done
    pub fn turn_on_display<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let script = match (self.refresh, self.descriptor.quick) {
            (RefreshLut::Quick, Some(quick)) => quick.refresh,
            _ => self.descriptor.refresh,
        };
        self.set_state(PanelState::Refreshing);
        let result = self.run_script(spi, delay, script);
        self.settle(result)?;
        self.set_state(PanelState::Ready);
        Ok(())
    }

    /// Puts the panel into deep sleep
    ///
    /// Only [`init`](Self::init) or [`wake_up`](Self::wake_up) bring it back.
    pub fn sleep<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let result = self.run_script(spi, delay, self.descriptor.sleep);
        self.settle(result)?;
        self.set_state(PanelState::Sleeping);
        Ok(())
    }

    /// Writes a packed plane to the refresh step `index`
    ///
    /// The buffer must have the size of the step's plane, see
    /// [`PanelDescriptor::plane_len`].
    pub fn write_step<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        index: usize,
        buffer: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let descriptor = self.descriptor;
        let plane = descriptor
            .step(index)
            .ok_or(ErrorKind::InvalidStep(index))?;
        encoder::check_len(
            buffer.len(),
            descriptor.plane_width(plane),
            descriptor.height,
            descriptor.depth,
        )?;

        let result = self
            .run_script(spi, delay, descriptor.pre_write)
            .and_then(|_| self.interface.cmd(spi, delay, plane.command))
            .and_then(|_| self.interface.data(spi, buffer));
        trace!("step {}: {} bytes to {:#04x}", index, buffer.len(), plane.command);
        self.settle(result)
    }

    /// Writes a frame covering the whole panel
    ///
    /// Panels driven by several controllers get their column window of the
    /// frame each.
    pub fn update_frame<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        buffer: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let descriptor = self.descriptor;
        encoder::check_len(
            buffer.len(),
            descriptor.width,
            descriptor.height,
            descriptor.depth,
        )?;
        let result = self.write_frame(spi, delay, buffer);
        self.settle(result)
    }

    fn write_frame<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        buffer: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let descriptor = self.descriptor;
        self.run_script(spi, delay, descriptor.pre_write)?;
        for plane in descriptor.frame_targets() {
            self.interface.cmd(spi, delay, plane.command)?;
            match plane.segment {
                None => self.interface.data(spi, buffer)?,
                Some(segment) => {
                    let bytes = SegmentBytes::new(
                        buffer,
                        descriptor.width,
                        descriptor.height,
                        descriptor.depth,
                        segment.x,
                        segment.width,
                    )?;
                    let sent = self.interface.data_iter(spi, bytes)?;
                    trace!("segment {}+{}: {} bytes", segment.x, segment.width, sent);
                }
            }
        }
        Ok(())
    }

    /// Writes a frame and refreshes the panel
    pub fn update_and_display_frame<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        buffer: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.update_frame(spi, delay, buffer)?;
        self.turn_on_display(spi, delay)
    }

    /// Renders a scaled overlay, e.g. a QR code, straight into the panel RAM
    ///
    /// The overlay sits in the top left corner, everything else gets the
    /// background code. No frame buffer is needed.
    pub fn draw_overlay<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        overlay: Overlay<'_>,
        style: OverlayStyle,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let descriptor = self.descriptor;
        // reject bad styles before anything is sent
        OverlayBytes::new(overlay, style, descriptor.depth, 0, 0)?;
        let result = self.write_overlay(spi, delay, overlay, style);
        self.settle(result)
    }

    fn write_overlay<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        overlay: Overlay<'_>,
        style: OverlayStyle,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        let descriptor = self.descriptor;
        self.run_script(spi, delay, descriptor.pre_write)?;
        for plane in descriptor.frame_targets() {
            let x = plane.segment.map_or(0, |segment| segment.x);
            let bytes = OverlayBytes::new(
                overlay,
                style,
                descriptor.depth,
                descriptor.plane_width(plane),
                descriptor.height,
            )?
            .with_offset(x);
            self.interface.cmd(spi, delay, plane.command)?;
            self.interface.data_iter(spi, bytes)?;
        }
        Ok(())
    }

    /// Draws an overlay and refreshes the panel
    pub fn show_overlay<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        overlay: Overlay<'_>,
        style: OverlayStyle,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.draw_overlay(spi, delay, overlay, style)?;
        self.turn_on_display(spi, delay)
    }

    /// Opens the refresh step `index` for a chunked upload
    ///
    /// The returned writer takes the plane in pieces of any size and checks that
    /// exactly [`PanelDescriptor::plane_len`] bytes arrive.
    pub fn start_frame<'a, DELAY: DelayNs>(
        &'a mut self,
        spi: &'a mut SPI,
        delay: &mut DELAY,
        index: usize,
    ) -> Result<FrameWriter<'a, SPI, BUSY, DC, RST>, ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let descriptor = self.descriptor;
        let plane = descriptor
            .step(index)
            .ok_or(ErrorKind::InvalidStep(index))?;
        let result = self
            .run_script(spi, delay, descriptor.pre_write)
            .and_then(|_| self.interface.cmd(spi, delay, plane.command));
        self.settle(result)?;
        Ok(FrameWriter::new(self, spi, descriptor.plane_len(plane)))
    }

    /// Sends one chunk of an open upload
    pub(crate) fn stream_chunk(
        &mut self,
        spi: &mut SPI,
        chunk: &[u8],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        // a failed chunk ends the upload
        self.require_ready()?;
        let result = self.interface.data(spi, chunk);
        self.settle(result)
    }

    /// Switches between the full and the quick waveform
    ///
    /// `None` reloads the active one. Panels without a quick waveform return
    /// [`ErrorKind::Unsupported`] for [`RefreshLut::Quick`].
    pub fn set_lut<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        refresh_rate: Option<RefreshLut>,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.require_ready()?;
        let lut = refresh_rate.unwrap_or(self.refresh);
        let script = match lut {
            RefreshLut::Full => self.descriptor.lut,
            RefreshLut::Quick => self.descriptor.quick.ok_or(ErrorKind::Unsupported)?.lut,
        };
        let result = self.run_script(spi, delay, script);
        self.settle(result)?;
        debug!("{}: {:?} waveform", self.descriptor.name, lut);
        self.refresh = lut;
        Ok(())
    }

    /// Sends a raw command, regardless of the state
    pub fn send_command<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        command: u8,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.cmd(spi, delay, command)
    }

    /// Sends raw data, regardless of the state
    pub fn send_data(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.data(spi, data)
    }

    /// Waits until the panel releases the busy line
    pub fn wait_until_idle<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.wait_until_idle(spi, delay)
    }

    /// Checks the busy line once
    pub fn is_busy(&mut self) -> Result<bool, ErrorKind<SPI, BUSY, DC, RST>> {
        self.interface.is_busy()
    }

    /// Current life cycle state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// The panel this driver runs
    pub fn descriptor(&self) -> &'static PanelDescriptor {
        self.descriptor
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    /// Color code of the last `clear`
    pub fn last_color(&self) -> Option<u8> {
        self.last_color
    }

    /// Waveform used by the next refresh
    pub fn refresh_lut(&self) -> RefreshLut {
        self.refresh
    }

    /// Gives the pins back. The panel is left as it is.
    pub fn release(self) -> (BUSY, DC, RST) {
        self.interface.release()
    }

    fn run_script<DELAY: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        script: &[Op],
    ) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        for op in script {
            match *op {
                Op::Cmd(command, data) => self.interface.cmd_with_data(spi, delay, command, data)?,
                Op::Reset(level) => self.interface.set_reset(level)?,
                Op::DelayMs(ms) => delay.delay_ms(ms),
                Op::WaitIdle => self.interface.wait_until_idle(spi, delay)?,
                Op::WaitLevel(level) => self.interface.wait_for_level(spi, delay, level)?,
            }
        }
        Ok(())
    }

    fn require_ready(&self) -> Result<(), ErrorKind<SPI, BUSY, DC, RST>> {
        match self.state {
            PanelState::Ready => Ok(()),
            state => Err(ErrorKind::NotReady(state)),
        }
    }

    // a failure half way through a script leaves the panel in an unknown state
    fn settle<T>(
        &mut self,
        result: Result<T, ErrorKind<SPI, BUSY, DC, RST>>,
    ) -> Result<T, ErrorKind<SPI, BUSY, DC, RST>> {
        if let Err(err) = &result {
            debug!("{}: {}", self.descriptor.name, err);
            self.set_state(PanelState::Uninit);
        }
        result
    }

    fn set_state(&mut self, state: PanelState) {
        if self.state != state {
            debug!("{}: {:?} -> {:?}", self.descriptor.name, self.state, state);
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::descriptor::Level;
    use crate::encoder::EncodeError;
    use crate::panels::{
        Model, EPD1IN54B_V2, EPD1IN54_V2, EPD2IN7, EPD4IN01F, EPD5IN79, EPD7IN3F, EPD7IN5B_V2,
    };
    use crate::test_support::{data_after, Event, Rig};
    use std::vec;
    use std::vec::Vec;

    fn ready(descriptor: &'static PanelDescriptor) -> Rig {
        let mut rig = Rig::new(descriptor, DriverConfig::default());
        rig.prime(&[]);
        rig.driver.init(&mut rig.spi, &mut rig.delay).unwrap();
        rig.take();
        rig
    }

    #[test]
    fn not_ready_before_init() {
        let mut rig = Rig::new(&EPD1IN54_V2, DriverConfig::default());
        rig.take();
        assert_eq!(rig.driver.state(), PanelState::Uninit);
        assert!(matches!(
            rig.driver.clear(&mut rig.spi, &mut rig.delay, 1),
            Err(ErrorKind::NotReady(PanelState::Uninit))
        ));
        assert!(matches!(
            rig.driver.update_frame(&mut rig.spi, &mut rig.delay, &[0; 5000]),
            Err(ErrorKind::NotReady(PanelState::Uninit))
        ));
        assert!(matches!(
            rig.driver.sleep(&mut rig.spi, &mut rig.delay),
            Err(ErrorKind::NotReady(PanelState::Uninit))
        ));
        assert!(rig.take().is_empty());
    }

    #[test]
    fn init_follows_descriptor_scripts() {
        for model in Model::ALL {
            let descriptor = model.descriptor();
            let mut rig = Rig::new(descriptor, DriverConfig::default());
            rig.take();
            let expected = rig.prime(&[
                descriptor.reset,
                descriptor.soft_reset,
                descriptor.init,
                descriptor.lut,
            ]);

            rig.driver.init(&mut rig.spi, &mut rig.delay).unwrap();
            assert_eq!(rig.driver.state(), PanelState::Ready, "{}", descriptor.name);

            let events = rig.take();
            // the bus comes up before the reset pulse
            assert_eq!(events[0], Event::Cs(Level::Low), "{}", descriptor.name);
            assert_eq!(events[1], Event::Cs(Level::High), "{}", descriptor.name);
            assert_eq!(Rig::wire(&events), expected, "{}", descriptor.name);
        }
    }

    #[test]
    fn epd1in54_v2_init_bytes() {
        let mut rig = Rig::new(&EPD1IN54_V2, DriverConfig::default());
        rig.driver.init(&mut rig.spi, &mut rig.delay).unwrap();
        let wire = Rig::wire(&rig.take());
        let head = [
            Event::Rst(Level::High),
            Event::DelayMs(20),
            Event::Rst(Level::Low),
            Event::DelayMs(5),
            Event::Rst(Level::High),
            Event::DelayMs(20),
            Event::BusyRead,
            Event::DelayMs(200),
            Event::cmd(0x12),
            Event::BusyRead,
            Event::DelayMs(200),
            Event::cmd(0x01),
            Event::data(0xC7),
            Event::data(0x00),
            Event::data(0x01),
            Event::cmd(0x11),
            Event::data(0x01),
        ];
        assert_eq!(&wire[..head.len()], &head);
        // full waveform at the end
        assert_eq!(data_after(&wire, 0x32).len(), 153);
        assert_eq!(data_after(&wire, 0x2C), vec![0x20]);
    }

    #[test]
    fn clear_monochrome_panel() {
        let mut rig = ready(&EPD1IN54_V2);
        rig.driver.clear(&mut rig.spi, &mut rig.delay, 0).unwrap();
        let wire = Rig::wire(&rig.take());

        let mut expected = vec![Event::cmd(0x24)];
        expected.extend(core::iter::repeat(Event::data(0x00)).take(5000));
        expected.push(Event::cmd(0x26));
        expected.extend(core::iter::repeat(Event::data(0x00)).take(5000));
        expected.extend([
            Event::cmd(0x22),
            Event::data(0xC7),
            Event::cmd(0x20),
            Event::BusyRead,
            Event::DelayMs(200),
        ]);
        assert_eq!(wire, expected);
        assert_eq!(rig.driver.last_color(), Some(0));
        assert_eq!(rig.driver.state(), PanelState::Ready);
    }

    #[test]
    fn clear_seven_color_panel() {
        let mut rig = ready(&EPD4IN01F);
        rig.prime(&[EPD4IN01F.refresh]);
        rig.driver.clear(&mut rig.spi, &mut rig.delay, 0x3).unwrap();
        let wire = Rig::wire(&rig.take());

        // resolution first, then the plane
        assert_eq!(wire[0], Event::cmd(0x61));
        assert_eq!(data_after(&wire, 0x61), vec![0x02, 0x80, 0x01, 0x90]);
        let plane = data_after(&wire, 0x10);
        assert_eq!(plane.len(), 128_000);
        assert!(plane.iter().all(|byte| *byte == 0x33));
        // power off pulls busy low again
        assert_eq!(
            &wire[wire.len() - 3..],
            &[Event::cmd(0x02), Event::BusyRead, Event::DelayMs(200)]
        );
        assert_eq!(rig.driver.last_color(), Some(0x3));
    }

    #[test]
    fn clear_constant_planes() {
        let mut rig = ready(&EPD5IN79);
        rig.driver.clear(&mut rig.spi, &mut rig.delay, 1).unwrap();
        let wire = Rig::wire(&rig.take());
        assert!(data_after(&wire, 0x24).iter().all(|byte| *byte == 0xFF));
        assert!(data_after(&wire, 0xA4).iter().all(|byte| *byte == 0xFF));
        for shadow in [0x26, 0xA6] {
            let plane = data_after(&wire, shadow);
            assert_eq!(plane.len(), 50 * 272);
            assert!(plane.iter().all(|byte| *byte == 0x00));
        }
    }

    #[test]
    fn clear_rejects_wide_color() {
        let mut rig = ready(&EPD1IN54_V2);
        assert!(matches!(
            rig.driver.clear(&mut rig.spi, &mut rig.delay, 2),
            Err(ErrorKind::Encode(EncodeError::ColorOutOfRange { code: 2, .. }))
        ));
        assert!(rig.take().is_empty());
        assert_eq!(rig.driver.state(), PanelState::Ready);
    }

    #[test]
    fn init_timeout_leaves_uninit() {
        let mut rig = Rig::new(&EPD1IN54_V2, DriverConfig::with_busy_timeout(300));
        rig.busy(&[Level::High; 4]);
        let result = rig.driver.init(&mut rig.spi, &mut rig.delay);
        assert!(matches!(result, Err(ErrorKind::BusyTimeout { waited_ms: 300 })));
        assert_eq!(rig.driver.state(), PanelState::Uninit);

        let reads = rig
            .take()
            .iter()
            .filter(|event| **event == Event::BusyRead)
            .count();
        assert_eq!(reads, 4);
        assert!(matches!(
            rig.driver.clear(&mut rig.spi, &mut rig.delay, 0),
            Err(ErrorKind::NotReady(PanelState::Uninit))
        ));

        // a new init recovers
        rig.driver.init(&mut rig.spi, &mut rig.delay).unwrap();
        assert_eq!(rig.driver.state(), PanelState::Ready);
    }

    #[test]
    fn refresh_timeout_leaves_uninit() {
        let mut rig = Rig::new(&EPD2IN7, DriverConfig::with_busy_timeout(1_000));
        rig.prime(&[]);
        rig.driver.init(&mut rig.spi, &mut rig.delay).unwrap();
        // idle high, stuck low
        rig.busy(&[Level::Low; 11]);
        let result = rig.driver.turn_on_display(&mut rig.spi, &mut rig.delay);
        assert!(matches!(result, Err(ErrorKind::BusyTimeout { waited_ms: 1_000 })));
        assert_eq!(rig.driver.state(), PanelState::Uninit);
    }

    #[test]
    fn latched_dc_stays_high_for_data() {
        let mut rig = ready(&EPD7IN3F);
        rig.driver.send_command(&mut rig.spi, &mut rig.delay, 0x10).unwrap();
        rig.driver.send_data(&mut rig.spi, &[1, 2, 3]).unwrap();
        let events = rig.take();

        let dc: Vec<Event> = events
            .iter()
            .filter(|event| matches!(event, Event::Dc(_)))
            .cloned()
            .collect();
        assert_eq!(dc, vec![Event::Dc(Level::Low), Event::Dc(Level::High)]);
        assert_eq!(
            Rig::wire(&events),
            vec![
                Event::DelayMs(200),
                Event::DelayMs(2),
                Event::cmd(0x10),
                Event::DelayMs(20),
                Event::data(1),
                Event::data(2),
                Event::data(3),
            ]
        );
    }

    #[test]
    fn latched_dc_during_clear() {
        let mut rig = ready(&EPD7IN3F);
        rig.driver.clear(&mut rig.spi, &mut rig.delay, 1).unwrap();
        let events = rig.take();
        let commands = events
            .iter()
            .filter(|event| matches!(event, Event::Byte { dc: Level::Low, .. }))
            .count();
        let toggles = events
            .iter()
            .filter(|event| matches!(event, Event::Dc(_)))
            .count();
        // one pull and one release per command, nothing for 192000 data bytes
        assert_eq!(toggles, 2 * commands);
        assert_eq!(data_after(&Rig::wire(&events), 0x10).len(), 192_000);
    }

    #[test]
    fn segmented_frame() {
        let mut rig = ready(&EPD5IN79);
        // every byte holds its column index
        let mut frame = vec![0u8; 99 * 272];
        for (index, byte) in frame.iter_mut().enumerate() {
            *byte = (index % 99) as u8;
        }
        rig.driver
            .update_frame(&mut rig.spi, &mut rig.delay, &frame)
            .unwrap();
        let wire = Rig::wire(&rig.take());

        let master = data_after(&wire, 0x24);
        let slave = data_after(&wire, 0xA4);
        assert_eq!(master.len(), 50 * 272);
        assert_eq!(slave.len(), 50 * 272);
        assert!(data_after(&wire, 0x26).is_empty());
        for row in 0..272 {
            let master_row = &master[row * 50..(row + 1) * 50];
            let slave_row = &slave[row * 50..(row + 1) * 50];
            assert!(master_row.iter().copied().eq(0..50u8));
            assert!(slave_row.iter().copied().eq(49..99u8));
        }
    }

    #[test]
    fn write_single_step() {
        let mut rig = ready(&EPD5IN79);
        let half = vec![0xAAu8; 50 * 272];
        rig.driver
            .write_step(&mut rig.spi, &mut rig.delay, 1, &half)
            .unwrap();
        let wire = Rig::wire(&rig.take());
        assert_eq!(wire[0], Event::cmd(0xA4));
        assert_eq!(data_after(&wire, 0xA4), half);

        assert!(matches!(
            rig.driver.write_step(&mut rig.spi, &mut rig.delay, 2, &half),
            Err(ErrorKind::InvalidStep(2))
        ));
        assert!(matches!(
            rig.driver.write_step(&mut rig.spi, &mut rig.delay, 0, &half[1..]),
            Err(ErrorKind::Encode(EncodeError::DimensionMismatch {
                expected: 13_600,
                actual: 13_599
            }))
        ));
        assert!(rig.take().is_empty());
        assert_eq!(rig.driver.state(), PanelState::Ready);
    }

    #[test]
    fn frame_goes_to_last_step() {
        // the 2.7" only shows the second data plane
        let mut rig = ready(&EPD2IN7);
        let frame = vec![0x0Fu8; 22 * 264];
        rig.prime(&[EPD2IN7.refresh]);
        rig.driver
            .update_and_display_frame(&mut rig.spi, &mut rig.delay, &frame)
            .unwrap();
        let wire = Rig::wire(&rig.take());
        assert_eq!(wire[0], Event::cmd(0x13));
        assert_eq!(data_after(&wire, 0x13), frame);
        assert!(data_after(&wire, 0x10).is_empty());
        assert!(wire.contains(&Event::cmd(0x12)));
    }

    #[test]
    fn red_plane_is_a_step() {
        for (panel, black, red) in [(&EPD1IN54B_V2, 0x24, 0x26), (&EPD7IN5B_V2, 0x10, 0x13)] {
            let mut rig = ready(panel);
            let plane = vec![0x5Au8; panel.block_size()];
            rig.driver
                .write_step(&mut rig.spi, &mut rig.delay, 1, &plane)
                .unwrap();
            let wire = Rig::wire(&rig.take());
            assert_eq!(wire[0], Event::cmd(red), "{}", panel.name);
            assert_eq!(data_after(&wire, red), plane);

            // a whole frame only goes to the black/white plane
            let frame = vec![0xF0u8; panel.frame_len()];
            rig.driver
                .update_frame(&mut rig.spi, &mut rig.delay, &frame)
                .unwrap();
            let wire = Rig::wire(&rig.take());
            assert_eq!(data_after(&wire, black), frame);
            assert!(!wire.contains(&Event::cmd(red)), "{}", panel.name);
        }
    }

    #[test]
    fn clear_blanks_red_plane() {
        let mut rig = ready(&EPD1IN54B_V2);
        rig.driver.clear(&mut rig.spi, &mut rig.delay, 1).unwrap();
        let wire = Rig::wire(&rig.take());
        assert!(data_after(&wire, 0x24).iter().all(|byte| *byte == 0xFF));
        let red = data_after(&wire, 0x26);
        assert_eq!(red.len(), 5000);
        assert!(red.iter().all(|byte| *byte == 0x00));
    }

    #[test]
    fn overlay_is_streamed() {
        let mut rig = ready(&EPD1IN54_V2);
        let qr = [0xFFu8; 128];
        let style = OverlayStyle {
            scale: 2,
            foreground: 0,
            background: 1,
        };
        rig.driver
            .show_overlay(
                &mut rig.spi,
                &mut rig.delay,
                Overlay::qr(&qr).unwrap(),
                style,
            )
            .unwrap();
        let wire = Rig::wire(&rig.take());
        let plane = data_after(&wire, 0x24);
        assert_eq!(plane.len(), 5000);
        // 64 dark pixels, then background
        assert!(plane[..8].iter().all(|byte| *byte == 0x00));
        assert!(plane[8..25].iter().all(|byte| *byte == 0xFF));
        assert!(plane[25 * 64..].iter().all(|byte| *byte == 0xFF));
        assert!(wire.contains(&Event::cmd(0x20)));

        let zero = OverlayStyle { scale: 0, ..style };
        assert!(matches!(
            rig.driver.draw_overlay(
                &mut rig.spi,
                &mut rig.delay,
                Overlay::qr(&qr).unwrap(),
                zero
            ),
            Err(ErrorKind::Encode(EncodeError::ZeroScale))
        ));
    }

    #[test]
    fn chunked_upload() {
        let mut rig = ready(&EPD1IN54_V2);
        let mut writer = rig
            .driver
            .start_frame(&mut rig.spi, &mut rig.delay, 0)
            .unwrap();
        assert_eq!(writer.remaining(), 5000);
        writer.write(&[0x11; 2000]).unwrap();
        writer.write(&[0x22; 3000]).unwrap();
        assert_eq!(writer.remaining(), 0);
        writer.finish().unwrap();

        let plane = data_after(&Rig::wire(&rig.take()), 0x24);
        assert_eq!(plane.len(), 5000);
        assert_eq!(plane[1999], 0x11);
        assert_eq!(plane[2000], 0x22);
    }

    #[test]
    fn chunked_upload_checks_size() {
        let mut rig = ready(&EPD1IN54_V2);
        let mut writer = rig
            .driver
            .start_frame(&mut rig.spi, &mut rig.delay, 0)
            .unwrap();
        writer.write(&[0; 4000]).unwrap();
        assert!(matches!(
            writer.write(&[0; 1001]),
            Err(ErrorKind::Encode(EncodeError::DimensionMismatch {
                expected: 5000,
                actual: 5001
            }))
        ));
        assert!(matches!(
            writer.finish(),
            Err(ErrorKind::Encode(EncodeError::DimensionMismatch {
                expected: 5000,
                actual: 4000
            }))
        ));
        assert!(matches!(
            rig.driver.start_frame(&mut rig.spi, &mut rig.delay, 1),
            Err(ErrorKind::InvalidStep(1))
        ));
    }

    #[test]
    fn upload_stops_after_bus_error() {
        let mut rig = ready(&EPD1IN54_V2);
        let fault = rig.fault_switch();
        let mut writer = rig
            .driver
            .start_frame(&mut rig.spi, &mut rig.delay, 0)
            .unwrap();
        writer.write(&[0x11; 1000]).unwrap();
        fault.set(true);
        assert!(matches!(
            writer.write(&[0x22; 1000]),
            Err(ErrorKind::SpiError(_))
        ));
        fault.set(false);
        assert!(matches!(
            writer.write(&[0x33; 1000]),
            Err(ErrorKind::NotReady(PanelState::Uninit))
        ));
        assert_eq!(writer.remaining(), 4000);
        drop(writer);

        let plane = data_after(&Rig::wire(&rig.take()), 0x24);
        assert_eq!(plane, vec![0x11; 1000]);
        assert_eq!(rig.driver.state(), PanelState::Uninit);
    }

    #[test]
    fn quick_waveform() {
        let mut rig = ready(&EPD1IN54_V2);
        rig.driver
            .set_lut(&mut rig.spi, &mut rig.delay, Some(RefreshLut::Quick))
            .unwrap();
        assert_eq!(rig.driver.refresh_lut(), RefreshLut::Quick);
        let wire = Rig::wire(&rig.take());
        assert_eq!(data_after(&wire, 0x04), vec![0x41, 0xB0, 0x32]);

        rig.driver
            .turn_on_display(&mut rig.spi, &mut rig.delay)
            .unwrap();
        let wire = Rig::wire(&rig.take());
        assert_eq!(data_after(&wire, 0x22), vec![0xCF]);

        // reload the active one
        rig.driver.set_lut(&mut rig.spi, &mut rig.delay, None).unwrap();
        assert_eq!(data_after(&Rig::wire(&rig.take()), 0x2C), vec![0x28]);

        rig.driver
            .set_lut(&mut rig.spi, &mut rig.delay, Some(RefreshLut::Full))
            .unwrap();
        rig.take();
        rig.driver
            .turn_on_display(&mut rig.spi, &mut rig.delay)
            .unwrap();
        assert_eq!(data_after(&Rig::wire(&rig.take()), 0x22), vec![0xC7]);
    }

    #[test]
    fn quick_waveform_unsupported() {
        let mut rig = ready(&EPD2IN7);
        assert!(matches!(
            rig.driver
                .set_lut(&mut rig.spi, &mut rig.delay, Some(RefreshLut::Quick)),
            Err(ErrorKind::Unsupported)
        ));
        assert_eq!(rig.driver.refresh_lut(), RefreshLut::Full);
        assert_eq!(rig.driver.state(), PanelState::Ready);
    }

    #[test]
    fn sleep_and_wake_up() {
        let mut rig = ready(&EPD1IN54_V2);
        rig.driver.sleep(&mut rig.spi, &mut rig.delay).unwrap();
        assert_eq!(rig.driver.state(), PanelState::Sleeping);
        assert_eq!(
            Rig::wire(&rig.take()),
            vec![
                Event::cmd(0x10),
                Event::data(0x01),
                Event::DelayMs(200),
                Event::Rst(Level::Low),
            ]
        );
        assert!(matches!(
            rig.driver.clear(&mut rig.spi, &mut rig.delay, 1),
            Err(ErrorKind::NotReady(PanelState::Sleeping))
        ));
        rig.driver.wake_up(&mut rig.spi, &mut rig.delay).unwrap();
        assert_eq!(rig.driver.state(), PanelState::Ready);
        assert_eq!(rig.driver.last_color(), None);
    }

    #[test]
    fn accessors() {
        let rig = Rig::new(&EPD5IN79, DriverConfig::default());
        assert_eq!(rig.driver.width(), 792);
        assert_eq!(rig.driver.height(), 272);
        assert_eq!(rig.driver.descriptor().name, "epd5in79");
        assert_eq!(rig.driver.refresh_lut(), RefreshLut::Full);
        assert_eq!(rig.driver.state(), PanelState::Uninit);

        let (_busy, _dc, _rst) = rig.driver.release();
    }
}

//! Panels driven by UltraChip UC81xx style controllers
//!
//! These controllers have no software reset, pull the busy line low while
//! working and are put to sleep with the check code 0xA5. The color panels in
//! this family store 2 or 4 bits per pixel in a single RAM plane.

use super::lut;
use crate::descriptor::{BusyPolicy, DcPolicy, Level, Op, PanelDescriptor, Plane, PlaneFill};
use crate::encoder::BitDepth;
use crate::traits;

/// UC81xx commands
///
/// Should rarely (never?) be needed directly.
///
/// For more infos about the addresses and what they are doing look into the pdfs
#[allow(dead_code)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Set Resolution, LUT selection, BWR pixels, gate scan direction, source shift
    /// direction, booster switch, soft reset.
    PanelSetting = 0x00,
    /// Selecting internal and external power
    PowerSetting = 0x01,
    /// After the Power Off command, the driver will power off following the Power Off
    /// Sequence; BUSY signal will become "0".
    PowerOff = 0x02,
    /// Setting Power OFF sequence
    PowerOffSequenceSetting = 0x03,
    /// Turning On the Power
    ///
    /// After the Power ON command, the driver will power on following the Power ON
    /// sequence. Once complete, the BUSY signal will become "1".
    PowerOn = 0x04,
    /// Driving strength of the panel
    PowerSetting2 = 0x05,
    /// Starting data transmission
    BoosterSoftStart = 0x06,
    /// After this command is transmitted, the chip would enter the deep-sleep mode to save power.
    ///
    /// The deep sleep mode would return to standby by hardware reset.
    ///
    /// The only one parameter is a check code, the command would be excuted if check code = 0xA5.
    DeepSleep = 0x07,
    BoosterSoftStart2 = 0x08,
    /// This command starts transmitting data and write them into SRAM. To complete data
    /// transmission, command DSP (Data transmission Stop) must be issued. Then the chip will
    /// start to send data/VCOM for panel.
    DataStartTransmission1 = 0x10,
    /// To stop data transmission, this command must be issued to check the `data_flag`.
    DataStop = 0x11,
    /// After this command is issued, driver will refresh display (data/VCOM) according to
    /// SRAM data and LUT.
    DisplayRefresh = 0x12,
    /// This command starts transmitting data and write them into SRAM.
    DataStartTransmission2 = 0x13,
    /// Dual SPI mode
    DualSpi = 0x15,
    PartialDisplayRefresh = 0x16,
    LutForVcom = 0x20,
    LutWhiteToWhite = 0x21,
    LutBlackToWhite = 0x22,
    LutWhiteToBlack = 0x23,
    LutBlackToBlack = 0x24,
    /// The command controls the PLL clock frequency.
    PllControl = 0x30,
    TemperatureSensorSelection = 0x41,
    /// This command indicates the interval of Vcom and data output. When setting the
    /// vertical back porch, the total blanking will be kept (20 Hsync).
    VcomAndDataIntervalSetting = 0x50,
    /// This command defines non-overlap period of Gate and Source.
    TconSetting = 0x60,
    /// This command defines alternative resolution and this setting is of higher priority
    /// than the RES\[1:0\] in R00H (PSR).
    TconResolution = 0x61,
    SourceAndGateSetting = 0x62,
    GateSourceStartSetting = 0x65,
    /// The LUT_REV / Chip Revision is read from OTP address = 0x001.
    ///
    /// Also forces the busy line to reflect the current state.
    GetStatus = 0x71,
    /// This command sets `VCOM_DC` value.
    VcmDcSetting = 0x82,
    Cmd84 = 0x84,
    Cmd86 = 0x86,
    CmdAA = 0xAA,
    CmdB4 = 0xB4,
    CmdB5 = 0xB5,
    CmdE0 = 0xE0,
    CmdE5 = 0xE5,
    /// This command is used for setting the PLL clock frequency.
    PowerSaving = 0xE3,
    CmdE6 = 0xE6,
    CmdE7 = 0xE7,
    CmdE9 = 0xE9,
    CmdF8 = 0xF8,
    CmdMode = 0x4D,
}

impl traits::Command for Command {
    /// Returns the address of the command
    fn address(self) -> u8 {
        self as u8
    }
}

const fn cmd(command: Command, data: &'static [u8]) -> Op {
    Op::Cmd(command as u8, data)
}

const fn hold(command: Command) -> Op {
    Op::Cmd(command as u8, &[])
}

const DATA_1: u8 = Command::DataStartTransmission1 as u8;
const DATA_2: u8 = Command::DataStartTransmission2 as u8;

const POWER_ON: [Op; 2] = [hold(Command::PowerOn), Op::WaitIdle];

const POWER_OFF_AND_SLEEP: [Op; 3] = [
    hold(Command::PowerOff),
    Op::WaitIdle,
    cmd(Command::DeepSleep, &[0xA5]),
];

const FOUR_COLOR_SLEEP: [Op; 2] = [
    cmd(Command::PowerOff, &[0x00]),
    cmd(Command::DeepSleep, &[0xA5]),
];

const FOUR_COLOR_REFRESH: [Op; 4] = [
    cmd(Command::DisplayRefresh, &[0x01]),
    Op::WaitIdle,
    cmd(Command::PowerOff, &[0x00]),
    Op::WaitIdle,
];

const RESET_20_2_20: [Op; 6] = [
    Op::Reset(Level::High),
    Op::DelayMs(20),
    Op::Reset(Level::Low),
    Op::DelayMs(2),
    Op::Reset(Level::High),
    Op::DelayMs(20),
];

const RESET_200_10_200: [Op; 6] = [
    Op::Reset(Level::High),
    Op::DelayMs(200),
    Op::Reset(Level::Low),
    Op::DelayMs(10),
    Op::Reset(Level::High),
    Op::DelayMs(200),
];

// 2.7" (IL91874), 176x264

/// Waveshare 2.7", black/white
///
/// The waveform is uploaded by the host. The image goes into the second data
/// plane, the first one only gets cleared.
pub static EPD2IN7: PanelDescriptor = PanelDescriptor {
    name: "epd2in7",
    width: 176,
    height: 264,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy {
        idle: Level::High,
        poll_ms: 100,
        lead_ms: 200,
        settle_ms: 0,
        status_command: None,
    },
    single_byte_write: false,
    reset: &RESET_200_10_200,
    soft_reset: &[],
    init: &[
        // VDS_EN, VDG_EN, VCOM_HV, VDH, VDL, VDHR
        cmd(Command::PowerSetting, &[0x03, 0x00, 0x2B, 0x2B, 0x09]),
        cmd(Command::BoosterSoftStart, &[0x07, 0x07, 0x17]),
        // power optimisation
        cmd(Command::CmdF8, &[0x60, 0xA5]),
        cmd(Command::CmdF8, &[0x89, 0xA5]),
        cmd(Command::CmdF8, &[0x90, 0x00]),
        cmd(Command::CmdF8, &[0x93, 0x2A]),
        cmd(Command::CmdF8, &[0xA0, 0xA5]),
        cmd(Command::CmdF8, &[0xA1, 0x00]),
        cmd(Command::CmdF8, &[0x73, 0x41]),
        cmd(Command::PartialDisplayRefresh, &[0x00]),
        hold(Command::PowerOn),
        Op::WaitIdle,
        // KW-BF KWR-AF BWROTP 0f
        cmd(Command::PanelSetting, &[0xAF]),
        // 3A 100HZ 29 150Hz 39 200HZ 31 171HZ
        cmd(Command::PllControl, &[0x3A]),
        cmd(Command::VcmDcSetting, &[0x12]),
        Op::DelayMs(2),
    ],
    lut: &[
        cmd(Command::LutForVcom, &lut::IL91874_VCOM_DC),
        cmd(Command::LutWhiteToWhite, &lut::IL91874_TO_WHITE),
        cmd(Command::LutBlackToWhite, &lut::IL91874_TO_WHITE),
        cmd(Command::LutWhiteToBlack, &lut::IL91874_TO_BLACK),
        cmd(Command::LutBlackToBlack, &lut::IL91874_TO_BLACK),
    ],
    quick: None,
    planes: &[
        Plane::shadow(DATA_1, PlaneFill::Color),
        Plane::step(DATA_2),
    ],
    pre_write: &[],
    refresh: &[
        Op::DelayMs(2),
        hold(Command::DisplayRefresh),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    sleep: &[cmd(Command::DeepSleep, &[0xA5])],
};

// 7.5" (UC8159), 640x384

/// Waveshare 7.5" V1, black/white
///
/// The controller takes 4 bits per pixel, 0x0 being black and 0x3 white.
pub static EPD7IN5: PanelDescriptor = PanelDescriptor {
    name: "epd7in5",
    width: 640,
    height: 384,
    depth: BitDepth::Four,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 100),
    single_byte_write: false,
    reset: &RESET_200_10_200,
    soft_reset: &[],
    init: &[
        cmd(Command::PowerSetting, &[0x37, 0x00]),
        cmd(Command::PanelSetting, &[0xCF, 0x08]),
        cmd(Command::BoosterSoftStart, &[0xC7, 0xCC, 0x28]),
        hold(Command::PowerOn),
        Op::WaitIdle,
        cmd(Command::PllControl, &[0x3C]),
        cmd(Command::TemperatureSensorSelection, &[0x00]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x77]),
        cmd(Command::TconSetting, &[0x22]),
        // 640x384
        cmd(Command::TconResolution, &[0x02, 0x80, 0x01, 0x80]),
        cmd(Command::VcmDcSetting, &[0x1E]),
        // flash mode
        cmd(Command::CmdE5, &[0x03]),
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &[],
    refresh: &[hold(Command::DisplayRefresh), Op::WaitIdle],
    sleep: &POWER_OFF_AND_SLEEP,
};

// 7.5" B V2 (UC8179), 800x480

/// Waveshare 7.5" B V2, black/white/red
///
/// The busy line only reflects the controller state after a status request, so
/// the status command is sent before every read. The red plane is step 1 and
/// blanked by `clear`.
pub static EPD7IN5B_V2: PanelDescriptor = PanelDescriptor {
    name: "epd7in5b_V2",
    width: 800,
    height: 480,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy {
        idle: Level::High,
        poll_ms: 1,
        lead_ms: 0,
        settle_ms: 20,
        status_command: Some(Command::GetStatus as u8),
    },
    single_byte_write: false,
    reset: &[
        Op::DelayMs(40),
        Op::Reset(Level::Low),
        Op::DelayMs(4),
        Op::Reset(Level::High),
        Op::DelayMs(200),
    ],
    soft_reset: &[],
    init: &[
        cmd(Command::PowerSetting, &[0x07, 0x07, 0x3F, 0x3F]),
        hold(Command::PowerOn),
        Op::DelayMs(100),
        Op::WaitIdle,
        // KW-3f KWR-2F BWROTP 0f BWOTP 1f
        cmd(Command::PanelSetting, &[0x0F]),
        // source 800, gate 480
        cmd(Command::TconResolution, &[0x03, 0x20, 0x01, 0xE0]),
        cmd(Command::DualSpi, &[0x00]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x10, 0x07]),
        cmd(Command::TconSetting, &[0x22]),
    ],
    lut: &[],
    quick: None,
    planes: &[
        Plane::step(DATA_1),
        Plane::layer(DATA_2, PlaneFill::Constant(0x00)),
    ],
    pre_write: &[],
    refresh: &[
        hold(Command::DisplayRefresh),
        Op::DelayMs(100),
        Op::WaitIdle,
    ],
    sleep: &POWER_OFF_AND_SLEEP,
};

// 4.01" F (ACeP 7 color), 640x400

/// Waveshare 4.01" F, 7 colors
///
/// The resolution has to be sent again before every frame. After the refresh
/// the panel is powered off, which pulls the busy line low again.
pub static EPD4IN01F: PanelDescriptor = PanelDescriptor {
    name: "epd4in01f",
    width: 640,
    height: 400,
    depth: BitDepth::Four,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 1),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(1),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    soft_reset: &[],
    init: &[
        cmd(Command::PanelSetting, &[0x2F, 0x00]),
        cmd(Command::PowerSetting, &[0x37, 0x00, 0x05, 0x05]),
        cmd(Command::PowerOffSequenceSetting, &[0x00]),
        cmd(Command::BoosterSoftStart, &[0xC7, 0xC7, 0x1D]),
        cmd(Command::TemperatureSensorSelection, &[0x00]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x37]),
        cmd(Command::TconSetting, &[0x22]),
        cmd(Command::TconResolution, &[0x02, 0x80, 0x01, 0x90]),
        cmd(Command::PowerSaving, &[0xAA]),
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &[cmd(Command::TconResolution, &[0x02, 0x80, 0x01, 0x90])],
    refresh: &[
        hold(Command::PowerOn),
        Op::WaitIdle,
        hold(Command::DisplayRefresh),
        Op::WaitIdle,
        hold(Command::PowerOff),
        Op::WaitLevel(Level::Low),
        Op::DelayMs(200),
    ],
    sleep: &[
        Op::DelayMs(100),
        cmd(Command::DeepSleep, &[0xA5]),
        Op::DelayMs(100),
        Op::Reset(Level::Low),
    ],
};

// 7.3" F (ACeP 7 color), 800x480

/// Waveshare 7.3" F, 7 colors
///
/// The data/command line rests high. Every command pulls it low for the
/// duration of the command byte only.
pub static EPD7IN3F: PanelDescriptor = PanelDescriptor {
    name: "epd7in3f",
    width: 800,
    height: 480,
    depth: BitDepth::Four,
    dc: DcPolicy::Latched {
        lead_ms: 200,
        setup_ms: 2,
        hold_ms: 20,
    },
    busy: BusyPolicy::idle_on(Level::High, 1),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::Low),
        Op::DelayMs(1),
        Op::Reset(Level::High),
        Op::DelayMs(1),
        Op::Reset(Level::Low),
        Op::DelayMs(1),
        Op::Reset(Level::High),
        Op::WaitIdle,
    ],
    soft_reset: &[],
    init: &[
        hold(Command::PowerOn),
        Op::WaitIdle,
        cmd(Command::CmdAA, &[0x49, 0x55, 0x20, 0x08, 0x09, 0x18]),
        cmd(Command::PowerSetting, &[0x3F, 0x00, 0x32, 0x2A, 0x0E, 0x2A]),
        cmd(Command::PanelSetting, &[0x5F, 0x69]),
        cmd(Command::PowerOffSequenceSetting, &[0x00, 0x54, 0x00, 0x44]),
        cmd(Command::PowerSetting2, &[0x40, 0x1F, 0x1F, 0x2C]),
        cmd(Command::BoosterSoftStart, &[0x6F, 0x1F, 0x16, 0x25]),
        cmd(Command::BoosterSoftStart2, &[0x6F, 0x1F, 0x1F, 0x22]),
        cmd(Command::DataStartTransmission2, &[0x00, 0x04]),
        cmd(Command::PllControl, &[0x02]),
        cmd(Command::TemperatureSensorSelection, &[0x00]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x3F]),
        cmd(Command::TconSetting, &[0x02, 0x00]),
        cmd(Command::TconResolution, &[0x03, 0x20, 0x01, 0xE0]),
        cmd(Command::VcmDcSetting, &[0x1E]),
        cmd(Command::Cmd84, &[0x00]),
        cmd(Command::Cmd86, &[0x00]),
        cmd(Command::PowerSaving, &[0x2F]),
        cmd(Command::CmdE0, &[0x00]),
        cmd(Command::CmdE6, &[0x00]),
        Op::DelayMs(2000),
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &[],
    refresh: &[
        hold(Command::PowerOn),
        Op::WaitIdle,
        cmd(Command::DisplayRefresh, &[0x01]),
        Op::WaitIdle,
    ],
    sleep: &[
        cmd(Command::DeepSleep, &[0xA5]),
        Op::DelayMs(1000),
        Op::Reset(Level::Low),
    ],
};

// 7.3" G (4 color), 800x480

/// Waveshare 7.3" G, black/white/yellow/red
pub static EPD7IN3G: PanelDescriptor = PanelDescriptor {
    name: "epd7in3g",
    width: 800,
    height: 480,
    depth: BitDepth::Two,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 5),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::Reset(Level::Low),
        Op::DelayMs(2),
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::WaitIdle,
    ],
    soft_reset: &[],
    init: &[
        cmd(Command::CmdAA, &[0x49, 0x55, 0x20, 0x08, 0x09, 0x18]),
        cmd(Command::PowerSetting, &[0x3F]),
        cmd(Command::PanelSetting, &[0x4F, 0x69]),
        cmd(Command::PowerSetting2, &[0x40, 0x1F, 0x1F, 0x2C]),
        cmd(Command::BoosterSoftStart2, &[0x6F, 0x1F, 0x1F, 0x22]),
        cmd(Command::BoosterSoftStart, &[0x6F, 0x1F, 0x14, 0x14]),
        cmd(Command::PowerOffSequenceSetting, &[0x00, 0x54, 0x00, 0x44]),
        cmd(Command::TconSetting, &[0x02, 0x00]),
        cmd(Command::PllControl, &[0x08]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x3F]),
        cmd(Command::TconResolution, &[0x03, 0x20, 0x01, 0xE0]),
        cmd(Command::PowerSaving, &[0x2F]),
        cmd(Command::Cmd84, &[0x01]),
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &POWER_ON,
    refresh: &FOUR_COLOR_REFRESH,
    sleep: &FOUR_COLOR_SLEEP,
};

// 2.13" G and 2.66" G (4 color) share everything but the resolution

const fn four_color_small_init(resolution: &'static [u8; 4]) -> [Op; 16] {
    [
        cmd(Command::CmdMode, &[0x78]),
        cmd(Command::PanelSetting, &[0x0F, 0x29]),
        cmd(Command::PowerSetting, &[0x07, 0x00]),
        cmd(Command::PowerOffSequenceSetting, &[0x10, 0x54, 0x44]),
        cmd(
            Command::BoosterSoftStart,
            &[0x05, 0x00, 0x3F, 0x0A, 0x25, 0x12, 0x1A],
        ),
        cmd(Command::VcomAndDataIntervalSetting, &[0x37]),
        cmd(Command::TconSetting, &[0x02, 0x02]),
        cmd(Command::TconResolution, resolution),
        cmd(Command::CmdE7, &[0x1C]),
        cmd(Command::PowerSaving, &[0x22]),
        cmd(Command::CmdB4, &[0xD0]),
        cmd(Command::CmdB5, &[0x03]),
        cmd(Command::CmdE9, &[0x01]),
        cmd(Command::PllControl, &[0x08]),
        hold(Command::PowerOn),
        Op::WaitIdle,
    ]
}

const EPD2IN13G_INIT: [Op; 16] = four_color_small_init(&[0x00, 0x80, 0x00, 0xFA]);
const EPD2IN66G_INIT: [Op; 16] = four_color_small_init(&[0x00, 0xB8, 0x01, 0x68]);

/// Waveshare 2.13" G, black/white/yellow/red
pub static EPD2IN13G: PanelDescriptor = PanelDescriptor {
    name: "epd2in13g",
    width: 128,
    height: 250,
    depth: BitDepth::Two,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 5),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(2),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    soft_reset: &[],
    init: &EPD2IN13G_INIT,
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &[],
    refresh: &[cmd(Command::DisplayRefresh, &[0x00]), Op::WaitIdle],
    sleep: &[
        hold(Command::PowerOff),
        Op::WaitIdle,
        Op::DelayMs(100),
        cmd(Command::DeepSleep, &[0xA5]),
    ],
};

/// Waveshare 2.66" G, black/white/yellow/red
pub static EPD2IN66G: PanelDescriptor = PanelDescriptor {
    name: "epd2in66g",
    width: 184,
    height: 360,
    depth: BitDepth::Two,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 5),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::Reset(Level::Low),
        Op::DelayMs(2),
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::WaitIdle,
    ],
    soft_reset: &[],
    init: &EPD2IN66G_INIT,
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &[],
    refresh: &[cmd(Command::DisplayRefresh, &[0x00]), Op::WaitIdle],
    sleep: &[
        cmd(Command::PowerOff, &[0x00]),
        Op::WaitIdle,
        cmd(Command::DeepSleep, &[0xA5]),
    ],
};

// 3.97" G (4 color), 800x480

/// Waveshare 3.97" G, black/white/yellow/red
pub static EPD3IN97G: PanelDescriptor = PanelDescriptor {
    name: "epd3in97g",
    width: 800,
    height: 480,
    depth: BitDepth::Two,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::High, 5),
    single_byte_write: false,
    reset: &RESET_20_2_20,
    soft_reset: &[],
    init: &[
        cmd(Command::PanelSetting, &[0x2B, 0x29]),
        cmd(Command::BoosterSoftStart, &[0x0F, 0x8B, 0x93, 0xC1]),
        cmd(Command::VcomAndDataIntervalSetting, &[0x37]),
        cmd(Command::PllControl, &[0x08]),
        // source 800, gate 680
        cmd(Command::TconResolution, &[0x03, 0x20, 0x02, 0xA8]),
        cmd(
            Command::SourceAndGateSetting,
            &[0x76, 0x76, 0x76, 0x5A, 0x9D, 0x8A, 0x76, 0x62],
        ),
        cmd(Command::GateSourceStartSetting, &[0x00, 0x00, 0x00, 0x00]),
        cmd(Command::CmdE0, &[0x10]),
        cmd(Command::CmdE7, &[0xA4]),
        cmd(Command::CmdE9, &[0x01]),
        hold(Command::PowerOn),
        Op::WaitIdle,
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(DATA_1)],
    pre_write: &POWER_ON,
    refresh: &FOUR_COLOR_REFRESH,
    sleep: &FOUR_COLOR_SLEEP,
};

//! Panels driven by Solomon Systech SSD16xx controllers
//!
//! These controllers have a software reset, hold the busy line high while
//! working and keep the image in one or two RAM planes that are addressed
//! through a window (0x44/0x45) and a RAM counter (0x4E/0x4F).

use super::lut;
use crate::descriptor::{
    window, BusyPolicy, DcPolicy, Level, Op, PanelDescriptor, Plane, PlaneFill, QuickRefresh,
};
use crate::encoder::BitDepth;
use crate::traits;

/// SSD16xx commands
///
/// Should rarely (never?) be needed directly.
///
/// For more infos about the addresses and what they are doing look into the pdfs
#[allow(dead_code)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Driver Output control
    ///     3 Databytes:
    ///     A[7:0]
    ///     0.. A[8]
    ///     0.. B[2:0]
    DriverOutputControl = 0x01,
    GateDrivingVoltage = 0x03,
    SourceDrivingVoltage = 0x04,
    /// Deep Sleep Mode Control
    ///     1 Databyte:
    ///     A[0] = 1: Enter Deep Sleep Mode
    DeepSleepMode = 0x10,
    DataEntryModeSetting = 0x11,
    SwReset = 0x12,
    TemperatureSensorControl = 0x18,
    MasterActivation = 0x20,
    DisplayUpdateControl1 = 0x21,
    DisplayUpdateControl2 = 0x22,
    WriteRam = 0x24,
    WriteRam2 = 0x26,
    WriteVcomRegister = 0x2C,
    WriteLutRegister = 0x32,
    SetDummyLinePeriod = 0x3A,
    SetGateLineWidth = 0x3B,
    BorderWaveformControl = 0x3C,
    EndOption = 0x3F,
    SetRamXAddressStartEndPosition = 0x44,
    SetRamYAddressStartEndPosition = 0x45,
    SetRamXAddressCounter = 0x4E,
    SetRamYAddressCounter = 0x4F,
    AnalogBlockControl = 0x74,
    DigitalBlockControl = 0x7E,
    /// Selects the RAM of the second controller on dual controller panels
    SlaveRamSelect = 0x91,
    SlaveSetRamXAddressStartEndPosition = 0xC4,
    SlaveSetRamYAddressStartEndPosition = 0xC5,
    SlaveSetRamXAddressCounter = 0xCE,
    SlaveSetRamYAddressCounter = 0xCF,
    SlaveWriteRam = 0xA4,
    SlaveWriteRam2 = 0xA6,
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

const SOFT_RESET: [Op; 2] = [hold(Command::SwReset), Op::WaitIdle];

const REFRESH_C7: [Op; 3] = [
    cmd(Command::DisplayUpdateControl2, &[0xC7]),
    hold(Command::MasterActivation),
    Op::WaitIdle,
];

const REFRESH_F7: [Op; 3] = [
    cmd(Command::DisplayUpdateControl2, &[0xF7]),
    hold(Command::MasterActivation),
    Op::WaitIdle,
];

const SLEEP_DROP_RESET: [Op; 3] = [
    cmd(Command::DeepSleepMode, &[0x01]),
    Op::DelayMs(200),
    Op::Reset(Level::Low),
];

// 1.54" V2 (SSD1681), 200x200

const EPD1IN54_V2_LUT_FULL: [Op; 6] = ssd1681_lut(&lut::SSD1681_FULL);
const EPD1IN54_V2_LUT_QUICK: [Op; 6] = ssd1681_lut(&lut::SSD1681_QUICK);

const fn ssd1681_lut(table: &'static [u8; 159]) -> [Op; 6] {
    [
        cmd(Command::WriteLutRegister, window(table, 0, 153)),
        Op::WaitIdle,
        cmd(Command::EndOption, window(table, 153, 154)),
        cmd(Command::GateDrivingVoltage, window(table, 154, 155)),
        cmd(Command::SourceDrivingVoltage, window(table, 155, 158)),
        cmd(Command::WriteVcomRegister, window(table, 158, 159)),
    ]
}

/// Waveshare 1.54" V2, black/white
pub static EPD1IN54_V2: PanelDescriptor = PanelDescriptor {
    name: "epd1in54_V2",
    width: 200,
    height: 200,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy {
        idle: Level::Low,
        poll_ms: 100,
        lead_ms: 0,
        settle_ms: 200,
        status_command: None,
    },
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::Reset(Level::Low),
        Op::DelayMs(5),
        Op::Reset(Level::High),
        Op::DelayMs(20),
        Op::WaitIdle,
    ],
    soft_reset: &SOFT_RESET,
    init: &[
        cmd(Command::DriverOutputControl, &[0xC7, 0x00, 0x01]),
        cmd(Command::DataEntryModeSetting, &[0x01]),
        // 0x18 --> (24 + 1) * 8 = 200
        cmd(Command::SetRamXAddressStartEndPosition, &[0x00, 0x18]),
        // 0xC7 --> 199 + 1 = 200
        cmd(Command::SetRamYAddressStartEndPosition, &[0xC7, 0x00, 0x00, 0x00]),
        cmd(Command::BorderWaveformControl, &[0x01]),
        cmd(Command::TemperatureSensorControl, &[0x80]),
        // load temperature and waveform
        cmd(Command::DisplayUpdateControl2, &[0xB1]),
        hold(Command::MasterActivation),
        cmd(Command::SetRamXAddressCounter, &[0x00]),
        cmd(Command::SetRamYAddressCounter, &[0xC7, 0x00]),
        Op::WaitIdle,
    ],
    lut: &EPD1IN54_V2_LUT_FULL,
    quick: Some(QuickRefresh {
        lut: &EPD1IN54_V2_LUT_QUICK,
        refresh: &[
            cmd(Command::DisplayUpdateControl2, &[0xCF]),
            hold(Command::MasterActivation),
            Op::WaitIdle,
        ],
    }),
    planes: &[
        Plane::step(Command::WriteRam as u8),
        Plane::shadow(Command::WriteRam2 as u8, PlaneFill::Color),
    ],
    pre_write: &[],
    refresh: &REFRESH_C7,
    sleep: &SLEEP_DROP_RESET,
};

// 1.54" B V2 (SSD1681 with red RAM), 200x200

/// Waveshare 1.54" B V2, black/white/red
///
/// Step 0 is the black/white plane, step 1 the red plane, which `clear` blanks.
pub static EPD1IN54B_V2: PanelDescriptor = PanelDescriptor {
    name: "epd1in54b_V2",
    width: 200,
    height: 200,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::Low, 100),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(10),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(10),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(10),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    soft_reset: &SOFT_RESET,
    init: &[
        cmd(Command::DriverOutputControl, &[0xC7, 0x00, 0x01]),
        cmd(Command::DataEntryModeSetting, &[0x01]),
        cmd(Command::SetRamXAddressStartEndPosition, &[0x00, 0x18]),
        cmd(Command::SetRamYAddressStartEndPosition, &[0xC7, 0x00, 0x00, 0x00]),
        cmd(Command::BorderWaveformControl, &[0x05]),
        cmd(Command::TemperatureSensorControl, &[0x80]),
        cmd(Command::SetRamXAddressCounter, &[0x00]),
        cmd(Command::SetRamYAddressCounter, &[0xC7, 0x00]),
        Op::WaitIdle,
    ],
    lut: &[],
    quick: None,
    planes: &[
        Plane::step(Command::WriteRam as u8),
        Plane::layer(Command::WriteRam2 as u8, PlaneFill::Constant(0x00)),
    ],
    pre_write: &[],
    refresh: &REFRESH_F7,
    sleep: &[cmd(Command::DeepSleepMode, &[0x01]), Op::DelayMs(100)],
};

// 2.13" V2 (SSD1675), 128x250

const fn ssd1675_lut(table: &'static [u8; 76]) -> [Op; 4] {
    [
        cmd(Command::WriteLutRegister, window(table, 0, 70)),
        // the RAM counter has to be set after the waveform
        cmd(Command::SetRamXAddressCounter, &[0x00]),
        cmd(Command::SetRamYAddressCounter, &[0xF9, 0x00]),
        Op::WaitIdle,
    ]
}

const EPD2IN13_V2_LUT_FULL: [Op; 4] = ssd1675_lut(&lut::SSD1675_FULL);
const EPD2IN13_V2_LUT_QUICK: [Op; 4] = ssd1675_lut(&lut::SSD1675_QUICK);

/// Waveshare 2.13" V2, black/white
pub static EPD2IN13_V2: PanelDescriptor = PanelDescriptor {
    name: "epd2in13_V2",
    width: 128,
    height: 250,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::Low, 100),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::Reset(Level::Low),
        Op::DelayMs(10),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    soft_reset: &SOFT_RESET,
    init: &[
        cmd(Command::AnalogBlockControl, &[0x54]),
        cmd(Command::DigitalBlockControl, &[0x3B]),
        cmd(Command::DriverOutputControl, &[0xF9, 0x00, 0x00]),
        cmd(Command::DataEntryModeSetting, &[0x01]),
        // 0x0F --> (15 + 1) * 8 = 128
        cmd(Command::SetRamXAddressStartEndPosition, &[0x00, 0x0F]),
        // 0xF9 --> 249 + 1 = 250
        cmd(Command::SetRamYAddressStartEndPosition, &[0xF9, 0x00, 0x00, 0x00]),
        cmd(Command::BorderWaveformControl, &[0x03]),
        cmd(Command::WriteVcomRegister, &[0x55]),
        cmd(Command::GateDrivingVoltage, window(&lut::SSD1675_FULL, 70, 71)),
        cmd(Command::SourceDrivingVoltage, window(&lut::SSD1675_FULL, 71, 74)),
        cmd(Command::SetDummyLinePeriod, window(&lut::SSD1675_FULL, 74, 75)),
        cmd(Command::SetGateLineWidth, window(&lut::SSD1675_FULL, 75, 76)),
    ],
    lut: &EPD2IN13_V2_LUT_FULL,
    quick: Some(QuickRefresh {
        lut: &EPD2IN13_V2_LUT_QUICK,
        refresh: &[
            cmd(Command::DisplayUpdateControl2, &[0x0C]),
            hold(Command::MasterActivation),
            Op::WaitIdle,
        ],
    }),
    planes: &[Plane::step(Command::WriteRam as u8)],
    pre_write: &[],
    refresh: &REFRESH_C7,
    sleep: &SLEEP_DROP_RESET,
};

// 2.13" V3 (SSD1680), 122x250

/// Waveshare 2.13" V3, black/white
///
/// Rows are 122 pixels wide and padded to 16 bytes.
pub static EPD2IN13_V3: PanelDescriptor = PanelDescriptor {
    name: "epd2in13_V3",
    width: 122,
    height: 250,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::Low, 10),
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
    soft_reset: &SOFT_RESET,
    init: &[
        cmd(Command::DriverOutputControl, &[0xF9, 0x00, 0x00]),
        cmd(Command::DataEntryModeSetting, &[0x03]),
        cmd(Command::BorderWaveformControl, &[0x05]),
        cmd(Command::DisplayUpdateControl1, &[0x00, 0x80]),
        cmd(Command::TemperatureSensorControl, &[0x80]),
        Op::WaitIdle,
    ],
    lut: &[],
    quick: None,
    planes: &[Plane::step(Command::WriteRam as u8)],
    pre_write: &[],
    refresh: &REFRESH_C7,
    sleep: &SLEEP_DROP_RESET,
};

// 5.79" (two SSD1683), 792x272

/// Waveshare 5.79", black/white
///
/// The panel is driven by two controllers. Each one owns a window of 400
/// columns, the windows overlap by 8 columns in the middle of the panel.
pub static EPD5IN79: PanelDescriptor = PanelDescriptor {
    name: "epd5in79",
    width: 792,
    height: 272,
    depth: BitDepth::One,
    dc: DcPolicy::Toggle,
    busy: BusyPolicy::idle_on(Level::Low, 100),
    single_byte_write: false,
    reset: &[
        Op::Reset(Level::Low),
        Op::DelayMs(200),
        Op::Reset(Level::High),
        Op::DelayMs(200),
        Op::WaitIdle,
    ],
    soft_reset: &SOFT_RESET,
    init: &[
        cmd(Command::DataEntryModeSetting, &[0x01]),
        cmd(Command::SetRamXAddressStartEndPosition, &[0x00, 0x31]),
        cmd(Command::SetRamYAddressStartEndPosition, &[0x0F, 0x01, 0x00, 0x00]),
        cmd(Command::SetRamXAddressCounter, &[0x00]),
        cmd(Command::SetRamYAddressCounter, &[0x0F, 0x01]),
        Op::WaitIdle,
        cmd(Command::SlaveRamSelect, &[0x00]),
        cmd(Command::SlaveSetRamXAddressStartEndPosition, &[0x31, 0x00]),
        cmd(Command::SlaveSetRamYAddressStartEndPosition, &[0x0F, 0x01, 0x00, 0x00]),
        cmd(Command::SlaveSetRamXAddressCounter, &[0x31]),
        cmd(Command::SlaveSetRamYAddressCounter, &[0x0F, 0x01]),
        Op::WaitIdle,
    ],
    lut: &[],
    quick: None,
    planes: &[
        Plane::step(Command::WriteRam as u8).segment(0, 400),
        Plane::shadow(Command::WriteRam2 as u8, PlaneFill::Constant(0x00)).segment(0, 400),
        Plane::step(Command::SlaveWriteRam as u8).segment(392, 400),
        Plane::shadow(Command::SlaveWriteRam2 as u8, PlaneFill::Constant(0x00)).segment(392, 400),
    ],
    pre_write: &[],
    refresh: &REFRESH_F7,
    sleep: &[cmd(Command::DeepSleepMode, &[0x01])],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Command as _;

    #[test]
    fn command_addresses() {
        assert_eq!(Command::SwReset.address(), 0x12);
        assert_eq!(Command::WriteRam.address(), 0x24);
        assert_eq!(Command::SlaveWriteRam2.address(), 0xA6);
    }

    #[test]
    fn epd1in54_v2_waveform_split() {
        let lut = EPD1IN54_V2.lut;
        assert_eq!(lut[0], Op::Cmd(0x32, window(&lut::SSD1681_FULL, 0, 153)));
        assert_eq!(lut[2], Op::Cmd(0x3F, &[0x22]));
        assert_eq!(lut[3], Op::Cmd(0x03, &[0x17]));
        assert_eq!(lut[4], Op::Cmd(0x04, &[0x41, 0x00, 0x32]));
        assert_eq!(lut[5], Op::Cmd(0x2C, &[0x20]));

        let quick = EPD1IN54_V2.quick.unwrap().lut;
        assert_eq!(quick[4], Op::Cmd(0x04, &[0x41, 0xB0, 0x32]));
        assert_eq!(quick[5], Op::Cmd(0x2C, &[0x28]));
    }

    #[test]
    fn epd2in13_v2_voltages() {
        assert!(EPD2IN13_V2.init.contains(&Op::Cmd(0x03, &[0x15])));
        assert!(EPD2IN13_V2.init.contains(&Op::Cmd(0x04, &[0x41, 0xA8, 0x32])));
        assert!(EPD2IN13_V2.init.contains(&Op::Cmd(0x3A, &[0x30])));
        assert!(EPD2IN13_V2.init.contains(&Op::Cmd(0x3B, &[0x0A])));
        assert_eq!(EPD2IN13_V2.lut[0], Op::Cmd(0x32, window(&lut::SSD1675_FULL, 0, 70)));
    }

    #[test]
    fn epd_size() {
        assert_eq!(EPD2IN13_V3.line_bytes(), 16);
        assert_eq!(EPD2IN13_V3.frame_len(), 4000);
        assert_eq!(EPD1IN54_V2.frame_len(), 5000);
        assert_eq!(EPD5IN79.block_size(), 50 * 272);
        assert_eq!(EPD5IN79.steps().count(), 2);
    }
}

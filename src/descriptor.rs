//! Static description of a panel model
//!
//! A [`PanelDescriptor`] holds everything the [`PanelDriver`](crate::driver::PanelDriver)
//! needs to know about a model: geometry, pixel format, how the control lines
//! behave and the command scripts for every phase of its life cycle. The driver
//! itself has no model specific code.

use crate::encoder::{self, BitDepth};
use crate::traits::RefreshLut;

/// Logic level of a control line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Level {
    /// Driven or read low
    Low,
    /// Driven or read high
    High,
}

impl Level {
    /// The opposite level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// One instruction of a panel script
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Send a command byte followed by its data bytes
    Cmd(u8, &'static [u8]),
    /// Drive the reset line
    Reset(Level),
    /// Block for the given number of milliseconds
    DelayMs(u32),
    /// Poll the busy line until the panel is idle
    WaitIdle,
    /// Poll the busy line until it reads the given level
    WaitLevel(Level),
}

/// How the data/command line is driven
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DcPolicy {
    /// Low before every command, high before every data block
    Toggle,
    /// The line rests high. A command pulls it low and releases it right after,
    /// data is sent without touching the line.
    Latched {
        /// Delay before pulling the line low
        lead_ms: u32,
        /// Delay between pulling the line low and sending the command
        setup_ms: u32,
        /// Delay between sending the command and releasing the line
        hold_ms: u32,
    },
}

/// How the busy line is read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusyPolicy {
    /// Level of the busy line while the panel is idle
    pub idle: Level,
    /// Delay between two reads
    pub poll_ms: u32,
    /// Delay before the first read
    pub lead_ms: u32,
    /// Delay after the panel became idle
    pub settle_ms: u32,
    /// Command that has to be sent before every read to refresh the line
    pub status_command: Option<u8>,
}

impl BusyPolicy {
    /// Plain polling without extra delays
    pub const fn idle_on(idle: Level, poll_ms: u32) -> Self {
        Self {
            idle,
            poll_ms,
            lead_ms: 0,
            settle_ms: 0,
            status_command: None,
        }
    }
}

/// Column window of a plane on panels driven by two controllers
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// First panel column of the window
    pub x: u32,
    /// Width of the window in pixels
    pub width: u32,
}

/// What `clear` writes into a plane
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaneFill {
    /// The requested color, expanded to the panel depth
    Color,
    /// Always this byte, e.g. a blank red plane
    Constant(u8),
}

/// A RAM plane of the panel and the command that writes it
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    /// Data start command of the plane
    pub command: u8,
    /// Column window, `None` for the full width
    pub segment: Option<Segment>,
    /// Content written by `clear`
    pub fill: PlaneFill,
    /// Whether the plane receives image data. Planes that are no steps only get
    /// cleared.
    pub step: bool,
    /// Whether a frame drawn for the whole panel goes to this plane
    pub target: bool,
}

impl Plane {
    /// A full width plane that receives image data
    pub const fn step(command: u8) -> Self {
        Self {
            command,
            segment: None,
            fill: PlaneFill::Color,
            step: true,
            target: true,
        }
    }

    /// An extra color plane, e.g. red, written only through its step index
    pub const fn layer(command: u8, fill: PlaneFill) -> Self {
        Self {
            command,
            segment: None,
            fill,
            step: true,
            target: false,
        }
    }

    /// A full width plane that is only cleared
    pub const fn shadow(command: u8, fill: PlaneFill) -> Self {
        Self {
            command,
            segment: None,
            fill,
            step: false,
            target: false,
        }
    }

    /// Restricts the plane to a column window
    pub const fn segment(mut self, x: u32, width: u32) -> Self {
        self.segment = Some(Segment { x, width });
        self
    }
}

/// Alternative waveform with its own refresh sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct QuickRefresh {
    /// Script loading the quick waveform
    pub lut: &'static [Op],
    /// Script starting a refresh with the quick waveform
    pub refresh: &'static [Op],
}

/// Everything the driver needs to know about a panel model
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PanelDescriptor {
    /// Model name
    pub name: &'static str,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Native pixel depth
    pub depth: BitDepth,
    /// Data/command line behaviour
    pub dc: DcPolicy,
    /// Busy line behaviour
    pub busy: BusyPolicy,
    /// Send data one byte per bus transaction
    pub single_byte_write: bool,
    /// Hardware reset pulse
    pub reset: &'static [Op],
    /// Software reset, empty for controllers without one
    pub soft_reset: &'static [Op],
    /// Register programming
    pub init: &'static [Op],
    /// Waveform loading, empty for panels using their OTP waveform
    pub lut: &'static [Op],
    /// Faster waveform, if the panel has one
    pub quick: Option<QuickRefresh>,
    /// RAM planes in the order they are written
    pub planes: &'static [Plane],
    /// Sent before any plane is written
    pub pre_write: &'static [Op],
    /// Starts a refresh and waits for its end
    pub refresh: &'static [Op],
    /// Enters deep sleep
    pub sleep: &'static [Op],
}

impl PanelDescriptor {
    /// Number of pixels packed into one byte
    pub const fn pixels_per_byte(&self) -> usize {
        self.depth.pixels_per_byte()
    }

    /// Bytes per row of the full panel, including padding
    pub const fn line_bytes(&self) -> usize {
        encoder::line_bytes(self.width, self.depth)
    }

    /// Width of the plane in pixels
    pub const fn plane_width(&self, plane: &Plane) -> u32 {
        match plane.segment {
            Some(segment) => segment.width,
            None => self.width,
        }
    }

    /// Size in bytes of one plane
    pub const fn plane_len(&self, plane: &Plane) -> usize {
        encoder::plane_len(self.plane_width(plane), self.height, self.depth)
    }

    /// Size in bytes of a full frame buffer
    pub const fn frame_len(&self) -> usize {
        encoder::plane_len(self.width, self.height, self.depth)
    }

    /// Bytes per image step, taken from the first step
    pub fn block_size(&self) -> usize {
        self.steps()
            .next()
            .map(|plane| self.plane_len(plane))
            .unwrap_or_else(|| self.frame_len())
    }

    /// Planes that receive image data, in write order
    pub fn steps(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.planes.iter().filter(|plane| plane.step)
    }

    /// The step with the given index
    pub fn step(&self, index: usize) -> Option<&Plane> {
        self.steps().nth(index)
    }

    /// Steps that receive a frame drawn for the whole panel
    ///
    /// Color layers are skipped. When a model has several targets for the same
    /// column window (e.g. old and new image), the last one holds the visible
    /// frame.
    pub fn frame_targets(&self) -> impl Iterator<Item = &Plane> + '_ {
        let planes = self.planes;
        planes.iter().enumerate().filter_map(move |(index, plane)| {
            let shadowed = planes[index + 1..]
                .iter()
                .any(|later| later.step && later.target && later.segment == plane.segment);
            (plane.step && plane.target && !shadowed).then_some(plane)
        })
    }

    /// Whether the panel has a waveform for the given refresh mode
    pub fn supports(&self, lut: RefreshLut) -> bool {
        match lut {
            RefreshLut::Full => true,
            RefreshLut::Quick => self.quick.is_some(),
        }
    }
}

/// Borrow `table[start..end]` in a const context
pub(crate) const fn window(table: &'static [u8], start: usize, end: usize) -> &'static [u8] {
    let (head, _) = table.split_at(end);
    let (_, tail) = head.split_at(start);
    tail
}

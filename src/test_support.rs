//! Recording hardware for whole-sequence tests
//!
//! The bus, the pins and the delay all append to one shared event log, so a
//! test can compare what reached the wire (with the level of the DC line for
//! every byte) against the scripts of a descriptor.

extern crate std;

use core::cell::RefCell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, SpiBus};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};

use crate::config::DriverConfig;
use crate::descriptor::{DcPolicy, Level, Op, PanelDescriptor};
use crate::driver::PanelDriver;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    /// A byte on the bus and the DC level while it was sent
    Byte { dc: Level, value: u8 },
    Dc(Level),
    Rst(Level),
    Cs(Level),
    DelayMs(u32),
    DelayNs(u32),
    BusyRead,
}

impl Event {
    pub(crate) fn cmd(value: u8) -> Self {
        Event::Byte {
            dc: Level::Low,
            value,
        }
    }

    pub(crate) fn data(value: u8) -> Self {
        Event::Byte {
            dc: Level::High,
            value,
        }
    }
}

struct Recorder {
    events: Vec<Event>,
    dc: Level,
    busy: VecDeque<Level>,
    idle: Level,
    bus_fault: bool,
}

type Shared = Rc<RefCell<Recorder>>;

pub(crate) struct Bus(Shared);

impl spi::ErrorType for Bus {
    type Error = spi::ErrorKind;
}

impl SpiBus for Bus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut recorder = self.0.borrow_mut();
        if recorder.bus_fault {
            return Err(spi::ErrorKind::Other);
        }
        let dc = recorder.dc;
        recorder
            .events
            .extend(words.iter().map(|value| Event::Byte { dc, value: *value }));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let copy: Vec<u8> = words.to_vec();
        words.fill(0);
        self.write(&copy)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Copy, Clone)]
enum Role {
    Dc,
    Rst,
    Cs,
}

pub(crate) struct Pin {
    shared: Shared,
    role: Role,
}

impl Pin {
    fn set(&mut self, level: Level) {
        let mut recorder = self.shared.borrow_mut();
        let event = match self.role {
            Role::Dc => {
                recorder.dc = level;
                Event::Dc(level)
            }
            Role::Rst => Event::Rst(level),
            Role::Cs => Event::Cs(level),
        };
        recorder.events.push(event);
    }
}

impl digital::ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(Level::High);
        Ok(())
    }
}

/// Reads queued levels, then the idle level of the panel
pub(crate) struct BusyPin(Shared);

impl BusyPin {
    fn read(&mut self) -> Level {
        let mut recorder = self.0.borrow_mut();
        recorder.events.push(Event::BusyRead);
        let idle = recorder.idle;
        recorder.busy.pop_front().unwrap_or(idle)
    }
}

impl digital::ErrorType for BusyPin {
    type Error = Infallible;
}

impl InputPin for BusyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() == Level::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read() == Level::Low)
    }
}

pub(crate) struct Delay(Shared);

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().events.push(Event::DelayNs(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().events.push(Event::DelayMs(ms));
    }
}

/// Makes every bus write fail while set
pub(crate) struct FaultSwitch(Shared);

impl FaultSwitch {
    pub(crate) fn set(&self, fault: bool) {
        self.0.borrow_mut().bus_fault = fault;
    }
}

pub(crate) type Device = ExclusiveDevice<Bus, Pin, NoDelay>;

/// A driver wired to recording hardware
pub(crate) struct Rig {
    shared: Shared,
    descriptor: &'static PanelDescriptor,
    pub(crate) spi: Device,
    pub(crate) delay: Delay,
    pub(crate) driver: PanelDriver<Device, BusyPin, Pin, Pin>,
}

impl Rig {
    pub(crate) fn new(descriptor: &'static PanelDescriptor, config: DriverConfig) -> Self {
        let shared = Rc::new(RefCell::new(Recorder {
            events: Vec::new(),
            dc: Level::High,
            busy: VecDeque::new(),
            idle: descriptor.busy.idle,
            bus_fault: false,
        }));
        let pin = |role| Pin {
            shared: shared.clone(),
            role,
        };
        let spi = ExclusiveDevice::new_no_delay(Bus(shared.clone()), pin(Role::Cs)).unwrap();
        let driver = PanelDriver::new(
            BusyPin(shared.clone()),
            pin(Role::Dc),
            pin(Role::Rst),
            descriptor,
            config,
        );
        Rig {
            delay: Delay(shared.clone()),
            shared,
            descriptor,
            spi,
            driver,
        }
    }

    /// Drains the event log
    pub(crate) fn take(&self) -> Vec<Event> {
        core::mem::take(&mut self.shared.borrow_mut().events)
    }

    /// Handle that breaks the bus while the driver is borrowed
    pub(crate) fn fault_switch(&self) -> FaultSwitch {
        FaultSwitch(self.shared.clone())
    }

    /// Queues levels for the next busy reads
    pub(crate) fn busy(&self, levels: &[Level]) {
        self.shared.borrow_mut().busy.extend(levels.iter().copied());
    }

    /// Queues the busy levels that release every wait of `scripts` on the first
    /// read and returns the wire events running them must produce
    pub(crate) fn prime(&self, scripts: &[&[Op]]) -> Vec<Event> {
        let mut events = Vec::new();
        let mut levels = Vec::new();
        for script in scripts {
            for op in script.iter() {
                self.expect_op(op, &mut events, &mut levels);
            }
        }
        let mut recorder = self.shared.borrow_mut();
        recorder.busy.clear();
        recorder.busy.extend(levels);
        events
    }

    fn expect_op(&self, op: &Op, events: &mut Vec<Event>, levels: &mut Vec<Level>) {
        let busy = self.descriptor.busy;
        match *op {
            Op::Cmd(command, data) => {
                self.expect_cmd(command, events);
                events.extend(data.iter().map(|byte| Event::data(*byte)));
            }
            Op::Reset(level) => events.push(Event::Rst(level)),
            Op::DelayMs(ms) => events.push(Event::DelayMs(ms)),
            Op::WaitIdle => {
                if busy.lead_ms > 0 {
                    events.push(Event::DelayMs(busy.lead_ms));
                }
                self.expect_poll(events);
                levels.push(busy.idle);
                if busy.settle_ms > 0 {
                    events.push(Event::DelayMs(busy.settle_ms));
                }
            }
            Op::WaitLevel(level) => {
                self.expect_poll(events);
                levels.push(level);
            }
        }
    }

    fn expect_poll(&self, events: &mut Vec<Event>) {
        if let Some(status) = self.descriptor.busy.status_command {
            self.expect_cmd(status, events);
        }
        events.push(Event::BusyRead);
    }

    fn expect_cmd(&self, command: u8, events: &mut Vec<Event>) {
        match self.descriptor.dc {
            DcPolicy::Toggle => events.push(Event::cmd(command)),
            DcPolicy::Latched {
                lead_ms,
                setup_ms,
                hold_ms,
            } => events.extend([
                Event::DelayMs(lead_ms),
                Event::DelayMs(setup_ms),
                Event::cmd(command),
                Event::DelayMs(hold_ms),
            ]),
        }
    }

    /// What the panel sees: bytes, reset levels, delays and busy reads
    pub(crate) fn wire(events: &[Event]) -> Vec<Event> {
        events
            .iter()
            .filter(|event| !matches!(event, Event::Dc(_) | Event::Cs(_)))
            .cloned()
            .collect()
    }
}

/// Data bytes following the first occurrence of `command`
pub(crate) fn data_after(wire: &[Event], command: u8) -> Vec<u8> {
    wire.iter()
        .skip_while(|event| **event != Event::cmd(command))
        .skip(1)
        .filter(|event| !matches!(event, Event::DelayMs(_) | Event::BusyRead))
        .map_while(|event| match event {
            Event::Byte {
                dc: Level::High,
                value,
            } => Some(*value),
            _ => None,
        })
        .collect()
}

/// Runtime knobs of a [`PanelDriver`](crate::driver::PanelDriver)
///
/// The defaults keep the timing of the panel scripts untouched and wait on the
/// busy line for as long as the panel needs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DriverConfig {
    /// Delay between two reads of the busy line.
    ///
    /// `None` uses the interval of the panel descriptor.
    pub poll_interval_ms: Option<u32>,
    /// Upper bound for a single busy wait.
    ///
    /// `None` polls until the panel releases the line. With a bound, a panel that
    /// stays busy fails with [`ErrorKind::BusyTimeout`](crate::error::ErrorKind::BusyTimeout).
    pub busy_timeout_ms: Option<u32>,
}

impl DriverConfig {
    /// Default config with a bounded busy wait
    pub const fn with_busy_timeout(timeout_ms: u32) -> Self {
        Self {
            poll_interval_ms: None,
            busy_timeout_ms: Some(timeout_ms),
        }
    }
}

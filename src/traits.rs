/// All commands need to have this trait which gives the address of the command
/// which needs to be send via SPI with activated CommandsPin (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// Raw register addresses, as they are stored in the panel scripts
impl Command for u8 {
    fn address(self) -> u8 {
        self
    }
}

/// Seperates the different LUT for the Display Refresh process
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum RefreshLut {
    /// The "normal" full Lookuptable for the Refresh-Sequence
    #[default]
    Full,
    /// The quick LUT where not the full refresh sequence is followed.
    /// This might lead to some ghosting on the panel
    Quick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplayState {
    #[default]
    Idle,
    Running,
    Finished,
    Cancelled,
}

impl ReplayState {
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

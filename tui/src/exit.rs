/// Summary information produced when a Parley session exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppExitInfo {
    /// Messages left in the transcript when the session ended.
    pub message_count: usize,
    /// Why the session ended.
    pub exit_reason: ExitReason,
}

/// Reason why the Parley session terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user requested exit.
    UserRequested,
    /// The terminal stopped delivering input events.
    InputClosed,
}

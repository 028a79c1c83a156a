//! Application-level events used to coordinate UI actions.

/// Events delivered to the app loop from timers and background tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A reveal delay elapsed. Stale generations are ignored by the reveal engine.
    RevealTick { generation: u64 },

    /// Hide the transient notice (for example "Copied") if it is still the one with `id`.
    ExpireNotice { id: u64 },
}

//! Session lifecycle states.

use std::fmt;

/// Where a session is in its lifecycle.
///
/// ```text
/// New ──reset──▶ Ready ──step──▶ Running ──step(done)──▶ Done
///                  ▲                │                      │
///                  └─────reset──────┴─────────reset────────┘
/// any ──close──▶ Closed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Constructed; buffers may be bound; no engine context yet.
    New,
    /// Freshly reset, no step taken in this episode.
    Ready,
    /// At least one step taken and the episode is live.
    Running,
    /// The engine reported the episode finished.
    Done,
    /// The engine context and recording handle are released.
    Closed,
}

impl SessionState {
    /// Whether an engine context can exist in this state.
    pub fn has_context(self) -> bool {
        matches!(self, Self::Ready | Self::Running | Self::Done)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Done => "done",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

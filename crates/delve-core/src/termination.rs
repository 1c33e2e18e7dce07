//! Why an episode ended.

use std::fmt;

/// Closed set of termination causes reported by the engine in `how_done`.
///
/// Discriminants are the engine's wire codes.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// Killed.
    Died = 0,
    /// Choked on food.
    Choking = 1,
    /// Died of poison.
    Poisoning = 2,
    /// Starved.
    Starving = 3,
    /// Drowned.
    Drowning = 4,
    /// Burned.
    Burning = 5,
    /// Dissolved in lava.
    Dissolved = 6,
    /// Crushed.
    Crushing = 7,
    /// Turned to stone.
    Stoning = 8,
    /// Turned into slime.
    TurnedSlime = 9,
    /// Genocided.
    Genocided = 10,
    /// Engine panic.
    Panicked = 11,
    /// Engine detected tampering.
    Tricked = 12,
    /// Player quit.
    Quit = 13,
    /// Left the dungeon.
    Escaped = 14,
    /// Won.
    Ascended = 15,
}

impl TerminationReason {
    /// Every reason, in code order.
    pub const ALL: [TerminationReason; 16] = [
        Self::Died,
        Self::Choking,
        Self::Poisoning,
        Self::Starving,
        Self::Drowning,
        Self::Burning,
        Self::Dissolved,
        Self::Crushing,
        Self::Stoning,
        Self::TurnedSlime,
        Self::Genocided,
        Self::Panicked,
        Self::Tricked,
        Self::Quit,
        Self::Escaped,
        Self::Ascended,
    ];

    /// Decode an engine `how_done` code. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The engine code for this reason.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Upper-case name as the engine spells it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Died => "DIED",
            Self::Choking => "CHOKING",
            Self::Poisoning => "POISONING",
            Self::Starving => "STARVING",
            Self::Drowning => "DROWNING",
            Self::Burning => "BURNING",
            Self::Dissolved => "DISSOLVED",
            Self::Crushing => "CRUSHING",
            Self::Stoning => "STONING",
            Self::TurnedSlime => "TURNED_SLIME",
            Self::Genocided => "GENOCIDED",
            Self::Panicked => "PANICKED",
            Self::Tricked => "TRICKED",
            Self::Quit => "QUIT",
            Self::Escaped => "ESCAPED",
            Self::Ascended => "ASCENDED",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for TerminationReason {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        Self::from_code(code).ok_or(code)
    }
}

//! Python-visible termination reasons.

use delve_core::TerminationReason as Core;
use pyo3::prelude::*;

/// How an episode ended.
#[pyclass(name = "TerminationReason", eq, eq_int, from_py_object)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub(crate) enum TerminationReason {
    DIED = 0,
    CHOKING = 1,
    POISONING = 2,
    STARVING = 3,
    DROWNING = 4,
    BURNING = 5,
    DISSOLVED = 6,
    CRUSHING = 7,
    STONING = 8,
    TURNED_SLIME = 9,
    GENOCIDED = 10,
    PANICKED = 11,
    TRICKED = 12,
    QUIT = 13,
    ESCAPED = 14,
    ASCENDED = 15,
}

impl From<Core> for TerminationReason {
    fn from(r: Core) -> Self {
        match r {
            Core::Died => Self::DIED,
            Core::Choking => Self::CHOKING,
            Core::Poisoning => Self::POISONING,
            Core::Starving => Self::STARVING,
            Core::Drowning => Self::DROWNING,
            Core::Burning => Self::BURNING,
            Core::Dissolved => Self::DISSOLVED,
            Core::Crushing => Self::CRUSHING,
            Core::Stoning => Self::STONING,
            Core::TurnedSlime => Self::TURNED_SLIME,
            Core::Genocided => Self::GENOCIDED,
            Core::Panicked => Self::PANICKED,
            Core::Tricked => Self::TRICKED,
            Core::Quit => Self::QUIT,
            Core::Escaped => Self::ESCAPED,
            Core::Ascended => Self::ASCENDED,
        }
    }
}

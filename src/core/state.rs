//! Disease states of an infected individual.

use derive_more::Display;
use serde::Serialize;

/// Number of distinct disease states.
pub const N_STATES: usize = 8;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum State {
    #[display("latent")]
    #[serde(rename = "latent")]
    Latent,
    #[display("symptoms_non_infectious")]
    #[serde(rename = "symptoms_non_infectious")]
    SymptomaticNonInfectious,
    #[display("latent_infectious")]
    #[serde(rename = "latent_infectious")]
    PresymptomaticInfectious,
    #[display("symptoms")]
    #[serde(rename = "symptoms")]
    SymptomaticInfectious,
    #[display("recovering")]
    #[serde(rename = "recovering")]
    Recovering,
    #[display("dying")]
    #[serde(rename = "dying")]
    Dying,
    #[display("recovered")]
    #[serde(rename = "recovered")]
    Recovered,
    #[display("dead")]
    #[serde(rename = "dead")]
    Dead,
}

impl State {
    pub const ALL: [State; N_STATES] = [
        State::Latent,
        State::SymptomaticNonInfectious,
        State::PresymptomaticInfectious,
        State::SymptomaticInfectious,
        State::Recovering,
        State::Dying,
        State::Recovered,
        State::Dead,
    ];

    /// Numeric identifier of the state, also its column in the counters table.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<State> {
        Self::ALL.get(index).copied()
    }

    pub fn is_infectious(&self) -> bool {
        matches!(
            self,
            State::PresymptomaticInfectious | State::SymptomaticInfectious
        )
    }

    /// Whether an individual in this state would be observed as a case.
    pub fn is_reported(&self) -> bool {
        !matches!(self, State::Latent | State::PresymptomaticInfectious)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Recovered | State::Dead)
    }

    /// Whether the infectious period lies behind an individual in this state.
    pub fn is_past_infectious(&self) -> bool {
        *self > State::SymptomaticInfectious
    }
}

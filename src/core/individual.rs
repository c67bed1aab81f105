//! Infected individuals and the progression of their infection.
//!
//! An `Individual` draws its complete progression schedule when it is infected. Afterwards the
//! simulation only moves a cursor along the drawn trajectory and decides whether the individual
//! transmits the disease.

use derive_more::Display;
use itertools::Itertools;
use rand::prelude::*;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

use super::state::{N_STATES, State};
use crate::config::{Samplers, Transmitter};

/// Every trajectory passes through exactly five states.
pub const TRAJECTORY_LENGTH: usize = 5;

pub type Trajectory = [State; TRAJECTORY_LENGTH];

/// Infections caused by a single update. The stochastic policy never causes more than one.
pub type Infections = SmallVec<[Individual; 1]>;

/// Position of an individual in the registry of its outbreak.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[display("#{_0}")]
pub struct IndividualId(usize);

impl IndividualId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }

    fn offset(&self, n: usize) -> Self {
        Self(self.0 + n)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    id: IndividualId,
    infector: Option<IndividualId>,
    infection_time: f64,
    trajectory: Trajectory,
    end_times: [Option<f64>; N_STATES],
    cursor: usize,
    offspring: Vec<IndividualId>,
    time_last_infection: f64,
}

impl Individual {
    /// Infect a new individual at `infection_time` and draw its progression.
    ///
    /// The draws happen in a fixed order: latent period, incubation factor, infectious period,
    /// outcome and finally the duration of the outcome phase.
    pub fn new<R: Rng + ?Sized>(
        id: IndividualId,
        infector: Option<IndividualId>,
        infection_time: f64,
        rng: &mut R,
        samplers: &Samplers,
    ) -> Self {
        let mut end_times = [None; N_STATES];

        let latent_period = samplers.latent_period.sample(rng);
        let incubation_factor = samplers.incubation_factor.sample(rng);

        // incubation time may differ from latent time
        let onset = if incubation_factor > 1. {
            end_times[State::Latent.index()] = Some(latent_period);
            end_times[State::SymptomaticNonInfectious.index()] =
                Some(incubation_factor * latent_period);
            State::SymptomaticNonInfectious
        } else {
            end_times[State::Latent.index()] = Some(incubation_factor * latent_period);
            end_times[State::PresymptomaticInfectious.index()] = Some(latent_period);
            State::PresymptomaticInfectious
        };

        let infectious_period = samplers.infectious_period.sample(rng);
        let two_periods = latent_period + infectious_period;
        end_times[State::SymptomaticInfectious.index()] = Some(two_periods);

        let (outcome, terminal, outcome_period) = if samplers.recovery.sample(rng) {
            (
                State::Recovering,
                State::Recovered,
                samplers.recovering_period.sample(rng),
            )
        } else {
            (State::Dying, State::Dead, samplers.dying_period.sample(rng))
        };
        end_times[outcome.index()] = Some(two_periods + outcome_period);

        end_times
            .iter_mut()
            .flatten()
            .for_each(|end_time| *end_time += infection_time);

        Self {
            id,
            infector,
            infection_time,
            trajectory: [
                State::Latent,
                onset,
                State::SymptomaticInfectious,
                outcome,
                terminal,
            ],
            end_times,
            cursor: 0,
            offspring: Vec::new(),
            time_last_infection: infection_time,
        }
    }

    pub fn id(&self) -> IndividualId {
        self.id
    }

    pub fn infector(&self) -> Option<IndividualId> {
        self.infector
    }

    pub fn infection_time(&self) -> f64 {
        self.infection_time
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Time at which `state` ends, if the individual passes through it and it is not terminal.
    pub fn end_time(&self, state: State) -> Option<f64> {
        self.end_times[state.index()]
    }

    pub fn offspring(&self) -> &[IndividualId] {
        &self.offspring
    }

    pub fn n_offspring(&self) -> usize {
        self.offspring.len()
    }

    /// Time of the latest transmission, or the infection time if there was none.
    pub fn time_last_infection(&self) -> f64 {
        self.time_last_infection
    }

    pub fn current_state(&self) -> State {
        self.trajectory[self.cursor]
    }

    /// The terminal state this individual will end up in.
    pub fn outcome(&self) -> State {
        self.trajectory[TRAJECTORY_LENGTH - 1]
    }

    pub fn will_recover(&self) -> bool {
        self.outcome() == State::Recovered
    }

    pub fn can_transmit(&self) -> bool {
        self.current_state().is_infectious()
    }

    pub fn is_reported(&self) -> bool {
        self.current_state().is_reported()
    }

    /// Whether a transition out of the current state is scheduled at or before `time`.
    fn transition_elapsed(&self, time: f64) -> bool {
        match self.end_time(self.current_state()) {
            Some(end_time) => end_time <= time,
            None => false,
        }
    }

    /// Progress the infection up to `time` and possibly infect others.
    ///
    /// Each elapsed transition moves the individual exactly one state along its trajectory. If
    /// the individual was infectious at any point during the call, even only in a state it
    /// passed through, it gets the chance to transmit. New individuals receive consecutive ids
    /// starting at `next_id`.
    pub fn advance_to<R: Rng + ?Sized>(
        &mut self,
        time: f64,
        next_id: IndividualId,
        rng: &mut R,
        samplers: &Samplers,
    ) -> Infections {
        let mut was_infectious = self.can_transmit();
        while self.transition_elapsed(time) {
            assert!(
                self.cursor + 1 < TRAJECTORY_LENGTH,
                "Individual {} advanced past its terminal state.",
                self.id
            );
            self.cursor += 1;
            was_infectious |= self.can_transmit();
        }

        let mut infections = Infections::new();
        if !was_infectious {
            return infections;
        }

        match &samplers.transmitter {
            Transmitter::Stochastic(trial) => {
                if trial.sample(rng) {
                    infections.push(self.infect(next_id, time, rng, samplers));
                    self.time_last_infection = time;
                }
            }
            Transmitter::Periodic { interval } => {
                while time - self.time_last_infection > *interval {
                    self.time_last_infection += interval;
                    let id = next_id.offset(infections.len());
                    infections.push(self.infect(id, time, rng, samplers));
                }
            }
        }
        infections
    }

    /// Create the individual infected by self and remember it.
    fn infect<R: Rng + ?Sized>(
        &mut self,
        id: IndividualId,
        time: f64,
        rng: &mut R,
        samplers: &Samplers,
    ) -> Individual {
        log::trace!("t={time:.2}: {} infects {}", self.id, id);
        self.offspring.push(id);
        Individual::new(id, Some(self.id), time, rng, samplers)
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Individual {} was infected at t={:.3}",
            self.id, self.infection_time
        )?;
        if let Some(infector) = self.infector {
            write!(f, " by {}", infector)?;
        }
        write!(
            f,
            " and has infected {} others: [{}]",
            self.n_offspring(),
            self.offspring.iter().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Parameters, Transmission, TransmissionPolicy};
    use rand::rngs::StdRng;

    fn samplers(parameters: &Parameters) -> Samplers {
        parameters.validate().unwrap()
    }

    fn index_case(rng: &mut StdRng, samplers: &Samplers) -> Individual {
        Individual::new(IndividualId::new(0), None, 0., rng, samplers)
    }

    /// Times along the realized path that are ordered regardless of the drawn periods.
    fn assert_ordered(individual: &Individual) {
        let end = |state| individual.end_time(state).unwrap();
        let t0 = individual.infection_time();
        let trajectory = individual.trajectory();
        assert!(t0 < end(State::Latent));
        match trajectory[1] {
            State::SymptomaticNonInfectious => {
                assert!(end(State::Latent) < end(State::SymptomaticNonInfectious));
                assert_eq!(individual.end_time(State::PresymptomaticInfectious), None);
            }
            State::PresymptomaticInfectious => {
                assert!(end(State::Latent) <= end(State::PresymptomaticInfectious));
                assert!(end(State::PresymptomaticInfectious) < end(State::SymptomaticInfectious));
                assert_eq!(individual.end_time(State::SymptomaticNonInfectious), None);
            }
            other => panic!("unexpected onset state {other}"),
        }
        assert!(end(State::Latent) < end(State::SymptomaticInfectious));
        assert!(end(State::SymptomaticInfectious) < end(trajectory[3]));
        assert_eq!(individual.end_time(State::Recovered), None);
        assert_eq!(individual.end_time(State::Dead), None);
    }

    #[test]
    fn trajectories() {
        let mut rng = StdRng::seed_from_u64(0);
        let samplers = samplers(&Parameters::default());
        for i in 0..1000 {
            let individual =
                Individual::new(IndividualId::new(i), None, i as f64, &mut rng, &samplers);
            let trajectory = individual.trajectory();
            assert_eq!(trajectory[0], State::Latent);
            assert_eq!(trajectory[2], State::SymptomaticInfectious);
            match trajectory[3] {
                State::Recovering => assert_eq!(trajectory[4], State::Recovered),
                State::Dying => assert_eq!(trajectory[4], State::Dead),
                other => panic!("unexpected outcome state {other}"),
            }
            assert!(individual.outcome().is_terminal());
            assert_eq!(individual.current_state(), State::Latent);
            assert_ordered(&individual);
        }
    }

    #[test]
    fn symptoms_after_latency() {
        let parameters = Parameters {
            incub_factor_min: 1.5,
            incub_factor_max: 1.5,
            ..Parameters::with_fixed_periods(2., 4., 6., 8.)
        };
        let mut rng = StdRng::seed_from_u64(1);
        let individual = Individual::new(
            IndividualId::new(3),
            None,
            10.,
            &mut rng,
            &samplers(&parameters),
        );
        assert_eq!(individual.trajectory()[1], State::SymptomaticNonInfectious);
        let latent_end = individual.end_time(State::Latent).unwrap() - 10.;
        let symptom_end = individual.end_time(State::SymptomaticNonInfectious).unwrap() - 10.;
        assert!((latent_end - 2.).abs() < 0.05);
        assert!((symptom_end - 1.5 * latent_end).abs() < 1e-9);
    }

    #[test]
    fn infectiousness_before_symptoms() {
        // an incubation factor of exactly one takes the infectious-first branch
        let parameters = Parameters {
            incub_factor_min: 1.,
            incub_factor_max: 1.,
            ..Parameters::with_fixed_periods(2., 4., 6., 8.)
        };
        let mut rng = StdRng::seed_from_u64(2);
        let individual = index_case(&mut rng, &samplers(&parameters));
        assert_eq!(individual.trajectory()[1], State::PresymptomaticInfectious);
        assert_eq!(
            individual.end_time(State::Latent),
            individual.end_time(State::PresymptomaticInfectious)
        );
    }

    #[test]
    fn end_times_are_absolute() {
        let samplers = samplers(&Parameters::default());
        let early = Individual::new(
            IndividualId::new(0),
            None,
            0.,
            &mut StdRng::seed_from_u64(7),
            &samplers,
        );
        let late = Individual::new(
            IndividualId::new(0),
            None,
            25.,
            &mut StdRng::seed_from_u64(7),
            &samplers,
        );
        assert_eq!(early.trajectory(), late.trajectory());
        for state in State::ALL {
            match (early.end_time(state), late.end_time(state)) {
                (Some(a), Some(b)) => assert!((b - a - 25.).abs() < 1e-9),
                (None, None) => {}
                other => panic!("inconsistent end times for {state}: {other:?}"),
            }
        }
    }

    #[test]
    fn outcome_follows_recovery_probability() {
        let mut rng = StdRng::seed_from_u64(3);
        let always = samplers(&Parameters {
            p_recovery: 1.,
            ..Parameters::default()
        });
        let never = samplers(&Parameters {
            p_recovery: 0.,
            ..Parameters::default()
        });
        for _ in 0..100 {
            assert!(index_case(&mut rng, &always).will_recover());
            assert_eq!(index_case(&mut rng, &never).outcome(), State::Dead);
        }
    }

    #[test]
    fn advances_one_state_per_transition() {
        let mut rng = StdRng::seed_from_u64(4);
        let parameters = Parameters {
            transmission: Transmission::MeanInterval(1e9),
            ..Parameters::default()
        };
        let samplers = samplers(&parameters);
        let mut individual = index_case(&mut rng, &samplers);
        let next_id = IndividualId::new(1);

        // a call long after recovery or death walks the whole trajectory
        individual.advance_to(1e6, next_id, &mut rng, &samplers);
        assert_eq!(individual.current_state(), individual.outcome());

        // terminal states are never left
        individual.advance_to(1e7, next_id, &mut rng, &samplers);
        assert_eq!(individual.current_state(), individual.outcome());
    }

    #[test]
    fn predicates_along_trajectory() {
        let mut rng = StdRng::seed_from_u64(5);
        let parameters = Parameters {
            transmission: Transmission::MeanInterval(1e9),
            ..Parameters::default()
        };
        let samplers = samplers(&parameters);
        for _ in 0..100 {
            let mut individual = index_case(&mut rng, &samplers);
            let mut visited = vec![individual.current_state()];
            let mut time = 0.;
            while !individual.current_state().is_terminal() {
                time += 0.05;
                individual.advance_to(time, IndividualId::new(1), &mut rng, &samplers);
                let state = individual.current_state();
                assert_eq!(
                    individual.can_transmit(),
                    matches!(state.index(), 2 | 3)
                );
                assert_eq!(
                    individual.is_reported(),
                    matches!(state.index(), 1 | 3 | 4 | 5 | 6 | 7)
                );
                if visited.last() != Some(&state) {
                    visited.push(state);
                }
            }
            // states are only ever visited in trajectory order
            assert!(
                visited
                    .iter()
                    .all(|state| individual.trajectory().contains(state))
            );
            assert!(visited.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn latent_individuals_do_not_draw() {
        let mut rng = StdRng::seed_from_u64(6);
        let parameters = Parameters::with_fixed_periods(10., 4., 6., 8.);
        let samplers = samplers(&parameters);
        let mut individual = index_case(&mut rng, &samplers);

        let mut reference = rng.clone();
        let infections = individual.advance_to(1., IndividualId::new(1), &mut rng, &samplers);
        assert!(infections.is_empty());
        assert_eq!(individual.current_state(), State::Latent);
        assert_eq!(rng.random::<u64>(), reference.random::<u64>());
    }

    #[test]
    fn transient_infectiousness_transmits() {
        let mut rng = StdRng::seed_from_u64(8);
        // certain transmission at every infectious update
        let parameters = Parameters {
            transmission: Transmission::MeanInterval(0.2),
            timestep: 0.2,
            ..Parameters::with_fixed_periods(1., 1., 1., 1.)
        };
        let samplers = samplers(&parameters);
        let mut individual = index_case(&mut rng, &samplers);

        // the whole infectious period lies between the start and the end of this call
        let infections = individual.advance_to(10., IndividualId::new(1), &mut rng, &samplers);
        assert!(individual.current_state().is_terminal());
        assert_eq!(infections.len(), 1);

        let infectee = &infections[0];
        assert_eq!(infectee.id(), IndividualId::new(1));
        assert_eq!(infectee.infector(), Some(IndividualId::new(0)));
        assert_eq!(infectee.infection_time(), 10.);
        assert_eq!(infectee.current_state(), State::Latent);
        assert_eq!(individual.offspring(), &[IndividualId::new(1)]);
        assert_eq!(individual.time_last_infection(), 10.);

        // once recovered or dead there is no further transmission
        let infections = individual.advance_to(11., IndividualId::new(2), &mut rng, &samplers);
        assert!(infections.is_empty());
        assert_eq!(individual.n_offspring(), 1);
    }

    #[test]
    fn periodic_transmission() {
        let mut rng = StdRng::seed_from_u64(9);
        let parameters = Parameters {
            transmission: Transmission::MeanInterval(1.),
            transmission_policy: TransmissionPolicy::Periodic,
            ..Parameters::with_fixed_periods(2., 10., 1., 1.)
        };
        let samplers = samplers(&parameters);
        let mut individual = index_case(&mut rng, &samplers);

        let infections = individual.advance_to(5., IndividualId::new(1), &mut rng, &samplers);
        assert!(individual.can_transmit());
        let ids: Vec<usize> = infections.iter().map(|i| i.id().index()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(individual.n_offspring(), 4);
        assert_eq!(individual.time_last_infection(), 4.);

        let infections = individual.advance_to(5.5, IndividualId::new(5), &mut rng, &samplers);
        assert_eq!(infections.len(), 1);
        assert_eq!(individual.time_last_infection(), 5.);
    }

    #[test]
    fn display() {
        let mut rng = StdRng::seed_from_u64(10);
        let parameters = Parameters {
            transmission: Transmission::MeanInterval(0.2),
            timestep: 0.2,
            ..Parameters::with_fixed_periods(1., 1., 1., 1.)
        };
        let samplers = samplers(&parameters);
        let mut individual = index_case(&mut rng, &samplers);
        let infections = individual.advance_to(10., IndividualId::new(1), &mut rng, &samplers);

        assert_eq!(
            individual.to_string(),
            "Individual #0 was infected at t=0.000 and has infected 1 others: [#1]"
        );
        assert_eq!(
            infections[0].to_string(),
            "Individual #1 was infected at t=10.000 by #0 and has infected 0 others: []"
        );
    }
}

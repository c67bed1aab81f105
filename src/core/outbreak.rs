//! Outbreak module
//!
//! The `Outbreak` owns every individual that was ever infected and advances them in fixed time
//! steps. Individuals infected during a step are collected and only join the registry once all
//! individuals of the step have been updated, so the registry is never mutated while it is
//! traversed.

use itertools::Itertools;
use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;

use super::individual::{Individual, IndividualId};
use super::state::{N_STATES, State};
use crate::config::{Parameters, ParametersError, Samplers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The horizon has not been reached yet.
    Running,
    /// The horizon has been reached.
    Completed,
    /// The population cap was exceeded before the horizon; all statistics are partial.
    Truncated,
}

#[derive(Clone, Debug)]
pub struct Outbreak {
    parameters: Parameters,
    samplers: Samplers,
    individuals: Vec<Individual>,
    counters: Array2<u64>,
    step: usize,
    n_steps: usize,
    output_row: usize,
    status: Status,
}

impl Outbreak {
    /// Start an outbreak with a single index case infected at time zero.
    pub fn new<R: Rng + ?Sized>(
        parameters: Parameters,
        rng: &mut R,
    ) -> Result<Self, ParametersError> {
        let samplers = parameters.validate()?;
        let index_case = Individual::new(IndividualId::new(0), None, 0., rng, &samplers);
        let counters = Array2::zeros((parameters.n_outputs(), N_STATES));
        let n_steps = parameters.n_steps();

        Ok(Self {
            parameters,
            samplers,
            individuals: vec![index_case],
            counters,
            step: 0,
            n_steps,
            output_row: 0,
            status: if n_steps == 0 {
                Status::Completed
            } else {
                Status::Running
            },
        })
    }

    /// Run a complete outbreak.
    pub fn simulate<R: Rng + ?Sized>(
        parameters: Parameters,
        rng: &mut R,
    ) -> Result<Self, ParametersError> {
        let mut outbreak = Self::new(parameters, rng)?;
        outbreak.run(rng);
        Ok(outbreak)
    }

    /// Advance until the horizon is reached or the population cap is exceeded.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Status {
        while self.status == Status::Running {
            self.next_step(rng);
        }
        self.status
    }

    /// Advance every individual by one time step.
    pub fn next_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Status {
        if self.status != Status::Running {
            return self.status;
        }

        self.step += 1;
        let time = self.time();
        let n_visited = self.individuals.len();

        // update all individuals present at the start of the step
        let mut infected: Vec<Individual> = Vec::new();
        for individual in self.individuals.iter_mut() {
            let next_id = IndividualId::new(n_visited + infected.len());
            infected.extend(individual.advance_to(time, next_id, rng, &self.samplers));
        }

        // tally states at the end of each output interval
        if self.is_output_step() && self.output_row < self.counters.nrows() {
            let mut row = self.counters.row_mut(self.output_row);
            for individual in &self.individuals {
                row[individual.current_state().index()] += 1;
            }
            log::debug!(
                r###"
    t={time:.2}
    counts=[{}]"###,
                row.iter().join(", ")
            );
            self.output_row += 1;
        }

        // new infections join the registry once the step is complete
        self.individuals.append(&mut infected);

        if self.individuals.len() > self.parameters.max_population {
            log::warn!(
                "t={time:.2}: {} infected exceed the maximum population of {}. Stopping.",
                self.individuals.len(),
                self.parameters.max_population
            );
            self.status = Status::Truncated;
        } else if self.step >= self.n_steps {
            self.status = Status::Completed;
        }
        self.status
    }

    /// Whether the current step is the first one at or after the end of an output interval.
    fn is_output_step(&self) -> bool {
        crosses_output_boundary(
            self.step,
            self.parameters.timestep,
            self.parameters.output_interval,
        )
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.step as f64 * self.parameters.timestep
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_truncated(&self) -> bool {
        self.status == Status::Truncated
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// All individuals infected so far, ordered by id.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn get(&self, id: IndividualId) -> Option<&Individual> {
        self.individuals.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Counts of each state (columns) at the end of each output interval (rows).
    pub fn counters(&self) -> &Array2<u64> {
        &self.counters
    }

    /// Number of output rows that have been tallied.
    pub fn n_outputs_filled(&self) -> usize {
        self.output_row
    }

    /// Number of individuals per output interval in any state but the two non-reported latent
    /// states.
    pub fn active_counts(&self) -> Array1<u64> {
        self.counters.sum_axis(Axis(1))
            - &self.counters.column(State::Latent.index())
            - &self.counters.column(State::PresymptomaticInfectious.index())
    }
}

/// Tolerance for step times that should fall exactly onto the end of an output interval.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Whether the interval count changes between the previous step and `step`.
///
/// Counting intervals on step indices avoids accumulated rounding, so every boundary is crossed
/// by exactly one step as long as the output interval is not shorter than the time step.
fn crosses_output_boundary(step: usize, timestep: f64, output_interval: f64) -> bool {
    let n_intervals = |step: usize| {
        (step as f64 * timestep / output_interval + BOUNDARY_TOLERANCE).floor()
    };
    step > 0 && n_intervals(step) > n_intervals(step - 1)
}

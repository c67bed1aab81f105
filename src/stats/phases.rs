//! Realized phase durations compared with the configured distributions.

use std::fmt;

use crate::config::Parameters;
use crate::core::{Individual, Outbreak, State};

const N_PHASES: usize = 4;

const PHASE_NAMES: [&str; N_PHASES] = [
    "Latent period",
    "Infectious period",
    "Recovering period",
    "Dying period",
];

const LATENT: usize = 0;
const INFECTIOUS: usize = 1;
const RECOVERING: usize = 2;
const DYING: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct PhaseDiagnostics {
    /// Mean realized duration of each phase, NaN for phases nobody went through.
    pub means: [f64; N_PHASES],
    /// Mean of the configured distribution of each phase.
    pub expected: [f64; N_PHASES],
    /// Number of individuals that contributed to each phase.
    pub counts: [usize; N_PHASES],
    /// Fraction of individuals whose outcome is recovery.
    pub p_recovery: f64,
    pub expected_p_recovery: f64,
}

impl PhaseDiagnostics {
    pub fn new(individuals: &[Individual], parameters: &Parameters) -> Self {
        let mut sums = [0.; N_PHASES];
        let mut counts = [0; N_PHASES];

        for (latent, infectious, outcome, outcome_period) in
            individuals.iter().filter_map(phase_durations)
        {
            sums[LATENT] += latent;
            counts[LATENT] += 1;
            sums[INFECTIOUS] += infectious;
            counts[INFECTIOUS] += 1;
            let phase = match outcome {
                State::Recovering => RECOVERING,
                _ => DYING,
            };
            sums[phase] += outcome_period;
            counts[phase] += 1;
        }

        Self {
            means: std::array::from_fn(|phase| sums[phase] / counts[phase] as f64),
            expected: [
                parameters.latent_period_shape * parameters.latent_period_scale,
                parameters.infect_period_shape * parameters.infect_period_scale,
                parameters.recover_period_shape * parameters.recover_period_scale,
                parameters.dying_period_shape * parameters.dying_period_scale,
            ],
            counts,
            p_recovery: counts[RECOVERING] as f64 / (counts[RECOVERING] + counts[DYING]) as f64,
            expected_p_recovery: parameters.p_recovery,
        }
    }

    /// Relative deviation of each realized mean from its expectation.
    pub fn relative_errors(&self) -> [f64; N_PHASES] {
        std::array::from_fn(|phase| {
            (self.means[phase] - self.expected[phase]).abs() / self.expected[phase]
        })
    }
}

/// Latent, infectious and outcome durations of an individual together with its outcome phase.
fn phase_durations(individual: &Individual) -> Option<(f64, f64, State, f64)> {
    let trajectory = individual.trajectory();
    let latent_end = match trajectory[1] {
        State::SymptomaticNonInfectious => individual.end_time(State::Latent)?,
        _ => individual.end_time(State::PresymptomaticInfectious)?,
    };
    let infectious_end = individual.end_time(State::SymptomaticInfectious)?;
    let outcome_end = individual.end_time(trajectory[3])?;
    Some((
        latent_end - individual.infection_time(),
        infectious_end - latent_end,
        trajectory[3],
        outcome_end - infectious_end,
    ))
}

impl fmt::Display for PhaseDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>20}", "Means:")?;
        for name in PHASE_NAMES {
            write!(f, "{name:>20}")?;
        }
        writeln!(f)?;
        write!(f, "{:>20}", "")?;
        for mean in self.means {
            write!(f, "{mean:>20.5}")?;
        }
        writeln!(f)?;
        write!(f, "{:>20}", "Expected:")?;
        for expected in self.expected {
            write!(f, "{expected:>20.5}")?;
        }
        writeln!(f)?;
        write!(
            f,
            "Pr(recovery): {:.5} Expected {}",
            self.p_recovery, self.expected_p_recovery
        )
    }
}

/// Trait extension to diagnose the phase durations drawn during an outbreak
pub trait PhaseStatistics {
    fn phase_diagnostics(&self) -> PhaseDiagnostics;
}

impl PhaseStatistics for Outbreak {
    fn phase_diagnostics(&self) -> PhaseDiagnostics {
        PhaseDiagnostics::new(self.individuals(), self.parameters())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::IndividualId;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn draw_individuals(parameters: &Parameters, n: usize, seed: u64) -> Vec<Individual> {
        let samplers = parameters.validate().unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|i| Individual::new(IndividualId::new(i), None, i as f64, &mut rng, &samplers))
            .collect()
    }

    #[test]
    fn calibration() {
        let parameters = Parameters::default();
        let individuals = draw_individuals(&parameters, 50_000, 0);
        let diagnostics = PhaseDiagnostics::new(&individuals, &parameters);

        for (expected, mean) in diagnostics.expected.iter().zip([10., 5., 12., 4.]) {
            assert!((expected - mean).abs() < 1e-12);
        }
        assert_eq!(diagnostics.counts[LATENT], 50_000);
        assert_eq!(diagnostics.counts[INFECTIOUS], 50_000);
        assert_eq!(diagnostics.counts[RECOVERING] + diagnostics.counts[DYING], 50_000);
        for (phase, error) in diagnostics.relative_errors().iter().enumerate() {
            assert!(*error < 0.05, "{} is off by {error}", PHASE_NAMES[phase]);
        }
        assert!((diagnostics.p_recovery - 0.3).abs() < 0.02);
    }

    #[test]
    fn calibration_with_other_parameters() {
        let parameters = Parameters {
            latent_period_shape: 3.,
            latent_period_scale: 1.5,
            incub_factor_min: 0.5,
            incub_factor_max: 2.,
            infect_period_shape: 2.,
            infect_period_scale: 2.,
            p_recovery: 0.6,
            ..Parameters::default()
        };
        let individuals = draw_individuals(&parameters, 50_000, 1);
        let diagnostics = PhaseDiagnostics::new(&individuals, &parameters);
        for error in diagnostics.relative_errors() {
            assert!(error < 0.05);
        }
        assert!((diagnostics.p_recovery - 0.6).abs() < 0.02);
    }

    #[test]
    fn empty_phases_are_undefined() {
        let parameters = Parameters {
            p_recovery: 0.,
            ..Parameters::default()
        };
        let individuals = draw_individuals(&parameters, 100, 2);
        let diagnostics = PhaseDiagnostics::new(&individuals, &parameters);
        assert_eq!(diagnostics.counts[RECOVERING], 0);
        assert!(diagnostics.means[RECOVERING].is_nan());
        assert_eq!(diagnostics.p_recovery, 0.);
    }

    #[test]
    fn outbreak_diagnostics() {
        let parameters = Parameters {
            max_time: 70.,
            ..Parameters::default()
        };
        let outbreak = Outbreak::simulate(parameters, &mut StdRng::seed_from_u64(3)).unwrap();
        let diagnostics = outbreak.phase_diagnostics();
        assert_eq!(diagnostics.counts[LATENT], outbreak.len());
        assert_eq!(diagnostics.expected_p_recovery, 0.3);
    }

    #[test]
    fn display() {
        let parameters = Parameters::default();
        let individuals = draw_individuals(&parameters, 10, 4);
        let table = PhaseDiagnostics::new(&individuals, &parameters).to_string();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("              Means:"));
        assert_eq!(lines[0].len(), 100);
        assert_eq!(lines[1].len(), lines[0].len());
        assert_eq!(
            lines[2],
            format!(
                "{:>20}{:>20.5}{:>20.5}{:>20.5}{:>20.5}",
                "Expected:", 10., 5., 12., 4.
            )
        );
        assert!(lines[3].starts_with("Pr(recovery): "));
        assert!(lines[3].ends_with(" Expected 0.3"));
    }
}

//! Batches of independent outbreaks, one per reproduction number.
//!
//! The batch reduces each outbreak to its active counts per output interval, the summary used
//! for likelihood-free inference of the reproduction number.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{Parameters, ParametersError};
use crate::core::Outbreak;

/// Simulate one outbreak for each reproduction number.
///
/// Row `i` of the result holds the active counts of the outbreak simulated with
/// `reproduction_numbers[i]` and a generator seeded with `seed + i`. All scenarios are validated
/// before the first one is simulated.
pub fn simulate_reproduction_numbers(
    reproduction_numbers: &[f64],
    seed: u64,
    parameters: &Parameters,
) -> Result<Array2<u64>, ParametersError> {
    let scenarios = reproduction_numbers
        .iter()
        .map(|&reproduction_number| {
            let scenario = parameters.with_reproduction_number(reproduction_number);
            scenario.validate().map(|_| scenario)
        })
        .collect::<Result<Vec<Parameters>, ParametersError>>()?;

    log::info!(
        "Simulating a batch of {} outbreaks with seed {seed}.",
        scenarios.len()
    );

    #[cfg(feature = "parallel")]
    let rows = scenarios
        .into_par_iter()
        .enumerate()
        .map(|(index, scenario)| simulate_scenario(index, seed, scenario))
        .collect::<Result<Vec<Array1<u64>>, ParametersError>>()?;

    #[cfg(not(feature = "parallel"))]
    let rows = scenarios
        .into_iter()
        .enumerate()
        .map(|(index, scenario)| simulate_scenario(index, seed, scenario))
        .collect::<Result<Vec<Array1<u64>>, ParametersError>>()?;

    let mut matrix = Array2::zeros((rows.len(), parameters.n_outputs()));
    for (mut target, row) in matrix.rows_mut().into_iter().zip(rows) {
        target.assign(&row);
    }
    Ok(matrix)
}

fn simulate_scenario(
    index: usize,
    seed: u64,
    parameters: Parameters,
) -> Result<Array1<u64>, ParametersError> {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
    let outbreak = Outbreak::simulate(parameters, &mut rng)?;
    if outbreak.is_truncated() {
        log::warn!(
            "Outbreak {index} was truncated at t={:.2}.",
            outbreak.time()
        );
    }
    Ok(outbreak.active_counts())
}

extern crate outbreak;

use outbreak::batch::simulate_reproduction_numbers;
use outbreak::config::{Parameters, TransmissionPolicy};
use outbreak::core::Outbreak;
use outbreak::stats::{PhaseStatistics, ReproductionNumber};
use rand::prelude::*;
use rand::rngs::StdRng;

fn main() {
    let parameters = Parameters {
        max_time: 140.,
        max_population: 10_000,
        ..Parameters::default().with_reproduction_number(2.)
    };

    for policy in [TransmissionPolicy::Stochastic, TransmissionPolicy::Periodic] {
        let parameters = Parameters {
            transmission_policy: policy,
            ..parameters.clone()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let outbreak = Outbreak::simulate(parameters, &mut rng).unwrap();

        println!("{policy:?} transmission");
        println!("infected: {} ({:?})", outbreak.len(), outbreak.status());
        println!("active counts: {}", outbreak.active_counts());
        println!("estimated R0: {:.3}", outbreak.reproduction_number());
        println!("{}\n", outbreak.phase_diagnostics());
    }

    let matrix = simulate_reproduction_numbers(&[1.2, 1.7, 2.5], 0, &parameters).unwrap();
    println!("batch of active counts:\n{matrix}");
}

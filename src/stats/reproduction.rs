use crate::core::{Individual, Outbreak};

/// Trait extension to estimate the basic reproduction number
pub trait ReproductionNumber {
    fn reproduction_number(&self) -> f64;
}

impl ReproductionNumber for [Individual] {
    /// Estimate the basic reproduction number from individuals whose infectious period is over.
    ///
    /// Only offspring that would be observed as cases are counted. Returns NaN if no individual
    /// has finished its infectious period yet.
    fn reproduction_number(&self) -> f64 {
        let (n_infectors, n_infected) = self
            .iter()
            .filter(|individual| individual.current_state().is_past_infectious())
            .fold((0usize, 0usize), |(n_infectors, n_infected), infector| {
                let n_reported = infector
                    .offspring()
                    .iter()
                    .filter_map(|id| self.get(id.index()))
                    .filter(|infected| infected.is_reported())
                    .count();
                (n_infectors + 1, n_infected + n_reported)
            });
        n_infected as f64 / n_infectors as f64
    }
}

impl ReproductionNumber for Outbreak {
    fn reproduction_number(&self) -> f64 {
        self.individuals().reproduction_number()
    }
}

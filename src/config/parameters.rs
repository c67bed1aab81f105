use serde::{Deserialize, Serialize};
use std::fs;

use super::samplers::Samplers;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Shape of the gamma distributed latent period.
    pub latent_period_shape: f64,

    /// Scale of the gamma distributed latent period.
    pub latent_period_scale: f64,

    /// Lower bound of the uniformly distributed incubation factor. The incubation factor relates
    /// the onset of symptoms to the latent period.
    pub incub_factor_min: f64,

    /// Upper bound of the uniformly distributed incubation factor.
    pub incub_factor_max: f64,

    /// Shape of the gamma distributed infectious period.
    pub infect_period_shape: f64,

    /// Scale of the gamma distributed infectious period.
    pub infect_period_scale: f64,

    /// Probability that an infected individual recovers instead of dying.
    pub p_recovery: f64,

    /// Shape of the gamma distributed recovering period.
    pub recover_period_shape: f64,

    /// Scale of the gamma distributed recovering period.
    pub recover_period_scale: f64,

    /// Shape of the gamma distributed dying period.
    pub dying_period_shape: f64,

    /// Scale of the gamma distributed dying period.
    pub dying_period_scale: f64,

    /// The rate at which infectious individuals cause new infections.
    pub transmission: Transmission,

    /// The way infectious individuals space their transmissions in time.
    pub transmission_policy: TransmissionPolicy,

    /// The simulated horizon (e.g. days).
    pub max_time: f64,

    /// The interval at which the state of the population is tallied (e.g. a week).
    pub output_interval: f64,

    /// The time step of the simulation.
    pub timestep: f64,

    /// The simulation stops early once the number of infected individuals exceeds this cap.
    pub max_population: usize,
}

/// Transmission rate, either given directly or derived from the basic reproduction number.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Transmission {
    /// Mean number of secondary infections during the infectious period.
    ReproductionNumber(f64),
    /// Mean time between two infections caused by the same infectious individual.
    MeanInterval(f64),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransmissionPolicy {
    /// One Bernoulli trial per step with probability `timestep / mean_transmission_interval`.
    #[default]
    Stochastic,
    /// Transmissions are spaced exactly `mean_transmission_interval` apart.
    Periodic,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            latent_period_shape: 2.,
            latent_period_scale: 5.,
            incub_factor_min: 0.8,
            incub_factor_max: 1.2,
            infect_period_shape: 1.,
            infect_period_scale: 5.,
            p_recovery: 0.3,
            recover_period_shape: 4.,
            recover_period_scale: 3.,
            dying_period_shape: 4. / 9.,
            dying_period_scale: 9.,
            transmission: Transmission::ReproductionNumber(1.7),
            transmission_policy: TransmissionPolicy::Stochastic,
            max_time: 364.,
            output_interval: 7.,
            timestep: 0.2,
            max_population: 100_000,
        }
    }
}

#[derive(Debug)]
pub enum ParametersError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

impl ParametersError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl ToString) -> Self {
        ParametersError::InvalidParameter {
            parameter,
            reason: reason.to_string(),
        }
    }
}

impl std::error::Error for ParametersError {}

impl std::fmt::Display for ParametersError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParametersError::IoError(error) => write!(formatter, "IO error: {}", error),
            ParametersError::YamlError(error) => write!(formatter, "YAML error: {}", error),
            ParametersError::InvalidParameter { parameter, reason } => {
                write!(formatter, "Invalid parameter `{}`: {}", parameter, reason)
            }
        }
    }
}

impl std::fmt::Display for Parameters {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        write!(
            formatter,
            "{}",
            String::from_utf8(output).map_err(|_| std::fmt::Error)?
        )
    }
}

impl Parameters {
    /// Copy of the parameters with the transmission rate derived from `reproduction_number`.
    pub fn with_reproduction_number(&self, reproduction_number: f64) -> Self {
        Self {
            transmission: Transmission::ReproductionNumber(reproduction_number),
            ..self.clone()
        }
    }

    /// Mean of the infectious period distribution.
    pub fn mean_infectious_period(&self) -> f64 {
        self.infect_period_shape * self.infect_period_scale
    }

    /// Mean time between two transmissions of one infectious individual.
    pub fn mean_transmission_interval(&self) -> f64 {
        match self.transmission {
            Transmission::ReproductionNumber(r0) => self.mean_infectious_period() / r0,
            Transmission::MeanInterval(interval) => interval,
        }
    }

    /// Number of output intervals within the horizon.
    pub fn n_outputs(&self) -> usize {
        (self.max_time / self.output_interval).round() as usize
    }

    /// Number of time steps within the horizon.
    pub fn n_steps(&self) -> usize {
        (self.max_time / self.timestep).round() as usize
    }

    /// Check the parameters and prepare all distributions needed by the simulation.
    ///
    /// Anything that would make a draw undefined is reported here, before the first draw.
    pub fn validate(&self) -> Result<Samplers, ParametersError> {
        check_positive("timestep", self.timestep)?;
        check_positive("max_time", self.max_time)?;
        check_positive("output_interval", self.output_interval)?;
        if self.output_interval < self.timestep {
            return Err(ParametersError::invalid(
                "output_interval",
                format!(
                    "{} is shorter than the time step {}",
                    self.output_interval, self.timestep
                ),
            ));
        }
        if self.max_population == 0 {
            return Err(ParametersError::invalid("max_population", "must be positive"));
        }
        match self.transmission {
            Transmission::ReproductionNumber(r0) => {
                check_positive("transmission.reproduction_number", r0)?
            }
            Transmission::MeanInterval(interval) => {
                check_positive("transmission.mean_interval", interval)?
            }
        }
        Samplers::new(self)
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), ParametersError> {
        serde_yaml::to_writer(writer, self).map_err(ParametersError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Parameters, ParametersError> {
        serde_yaml::from_reader(reader).map_err(ParametersError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), ParametersError> {
        let file = fs::File::create(filename).map_err(ParametersError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Parameters, ParametersError> {
        let file = fs::File::open(filename).map_err(ParametersError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}

/// Shape of the gamma distributions that make periods practically deterministic in tests.
#[cfg(test)]
const FIXED_SHAPE: f64 = 1e6;

#[cfg(test)]
impl Parameters {
    /// Parameters whose periods have a relative standard deviation of 0.1%.
    pub(crate) fn with_fixed_periods(
        latent: f64,
        infectious: f64,
        recovering: f64,
        dying: f64,
    ) -> Self {
        Self {
            latent_period_shape: FIXED_SHAPE,
            latent_period_scale: latent / FIXED_SHAPE,
            infect_period_shape: FIXED_SHAPE,
            infect_period_scale: infectious / FIXED_SHAPE,
            recover_period_shape: FIXED_SHAPE,
            recover_period_scale: recovering / FIXED_SHAPE,
            dying_period_shape: FIXED_SHAPE,
            dying_period_scale: dying / FIXED_SHAPE,
            ..Self::default()
        }
    }
}

pub(super) fn check_positive(parameter: &'static str, value: f64) -> Result<(), ParametersError> {
    if value.is_finite() && value > 0. {
        Ok(())
    } else {
        Err(ParametersError::invalid(
            parameter,
            format!("{value} is not a positive number"),
        ))
    }
}

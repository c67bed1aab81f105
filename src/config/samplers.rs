//! Prepared distributions of a validated parameter set.

use rand::distr::{Bernoulli, Uniform};
use rand_distr::Gamma;

use super::parameters::{Parameters, ParametersError, TransmissionPolicy, check_positive};

/// How an infectious individual decides to transmit.
#[derive(Debug, Clone)]
pub enum Transmitter {
    /// One trial per update with probability `timestep / mean_transmission_interval`.
    Stochastic(Bernoulli),
    /// Deterministic spacing of transmissions.
    Periodic { interval: f64 },
}

/// All distributions an individual draws from.
///
/// `Samplers` can only be obtained through [`Parameters::validate`], so holding one proves that
/// every draw of the simulation is well defined.
#[derive(Debug, Clone)]
pub struct Samplers {
    pub(crate) latent_period: Gamma<f64>,
    pub(crate) incubation_factor: Uniform<f64>,
    pub(crate) infectious_period: Gamma<f64>,
    pub(crate) recovery: Bernoulli,
    pub(crate) recovering_period: Gamma<f64>,
    pub(crate) dying_period: Gamma<f64>,
    pub(crate) transmitter: Transmitter,
}

impl Samplers {
    pub(super) fn new(parameters: &Parameters) -> Result<Self, ParametersError> {
        if !(parameters.incub_factor_min > 0.) {
            return Err(ParametersError::invalid(
                "incub_factor_min",
                format!("{} is not a positive number", parameters.incub_factor_min),
            ));
        }

        let latent_period = gamma(
            "latent_period",
            parameters.latent_period_shape,
            parameters.latent_period_scale,
        )?;
        let incubation_factor =
            Uniform::new_inclusive(parameters.incub_factor_min, parameters.incub_factor_max)
                .map_err(|err| ParametersError::invalid("incub_factor", err))?;
        let infectious_period = gamma(
            "infect_period",
            parameters.infect_period_shape,
            parameters.infect_period_scale,
        )?;
        let recovery = Bernoulli::new(parameters.p_recovery)
            .map_err(|err| ParametersError::invalid("p_recovery", err))?;
        let recovering_period = gamma(
            "recover_period",
            parameters.recover_period_shape,
            parameters.recover_period_scale,
        )?;
        let dying_period = gamma(
            "dying_period",
            parameters.dying_period_shape,
            parameters.dying_period_scale,
        )?;

        // derived from the infectious period when given as a reproduction number
        let interval = parameters.mean_transmission_interval();
        check_positive("transmission", interval)?;
        let transmitter = match parameters.transmission_policy {
            TransmissionPolicy::Stochastic => {
                let p = parameters.timestep / interval;
                Transmitter::Stochastic(Bernoulli::new(p).map_err(|err| {
                    ParametersError::invalid(
                        "transmission",
                        format!("transmission probability per step {p}: {err}"),
                    )
                })?)
            }
            TransmissionPolicy::Periodic => Transmitter::Periodic { interval },
        };

        Ok(Self {
            latent_period,
            incubation_factor,
            infectious_period,
            recovery,
            recovering_period,
            dying_period,
            transmitter,
        })
    }

    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }
}

fn gamma(parameter: &'static str, shape: f64, scale: f64) -> Result<Gamma<f64>, ParametersError> {
    // an infinite scale is accepted by `Gamma::new` but yields infinite periods
    if !(shape.is_finite() && scale.is_finite()) {
        return Err(ParametersError::invalid(
            parameter,
            format!("(shape={shape}, scale={scale}) is not finite"),
        ));
    }
    Gamma::new(shape, scale).map_err(|err| {
        ParametersError::invalid(parameter, format!("(shape={shape}, scale={scale}) {err}"))
    })
}

use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::{Individual, Outbreak, State};
use crate::errors::Result;

pub trait OutbreakIO {
    /// Write the state counts of every tallied output interval as CSV.
    fn write_counts(&self, writer: &mut impl Write) -> Result<()>;
    /// Write one CSV line per infected individual.
    fn write_individuals(&self, writer: &mut impl Write) -> Result<()>;

    fn write_counts_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        self.write_counts(&mut writer)
    }

    fn write_individuals_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        self.write_individuals(&mut writer)
    }
}

#[derive(Serialize)]
struct CountsRecord {
    interval: usize,
    time: f64,
    latent: u64,
    symptoms_non_infectious: u64,
    latent_infectious: u64,
    symptoms: u64,
    recovering: u64,
    dying: u64,
    recovered: u64,
    dead: u64,
}

#[derive(Serialize)]
struct IndividualRecord {
    id: usize,
    infector: Option<usize>,
    infection_time: f64,
    state: State,
    outcome: State,
    n_offspring: usize,
}

impl From<&Individual> for IndividualRecord {
    fn from(individual: &Individual) -> Self {
        Self {
            id: individual.id().index(),
            infector: individual.infector().map(|infector| infector.index()),
            infection_time: individual.infection_time(),
            state: individual.current_state(),
            outcome: individual.outcome(),
            n_offspring: individual.n_offspring(),
        }
    }
}

impl OutbreakIO for Outbreak {
    fn write_counts(&self, writer: &mut impl Write) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
        let output_interval = self.parameters().output_interval;
        for (interval, row) in self
            .counters()
            .rows()
            .into_iter()
            .take(self.n_outputs_filled())
            .enumerate()
        {
            csv_writer.serialize(CountsRecord {
                interval,
                time: (interval + 1) as f64 * output_interval,
                latent: row[State::Latent.index()],
                symptoms_non_infectious: row[State::SymptomaticNonInfectious.index()],
                latent_infectious: row[State::PresymptomaticInfectious.index()],
                symptoms: row[State::SymptomaticInfectious.index()],
                recovering: row[State::Recovering.index()],
                dying: row[State::Dying.index()],
                recovered: row[State::Recovered.index()],
                dead: row[State::Dead.index()],
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn write_individuals(&self, writer: &mut impl Write) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
        for individual in self.individuals() {
            csv_writer.serialize(IndividualRecord::from(individual))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

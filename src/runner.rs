use anyhow::Result;

use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;

use crate::args::{Args, Command};
use crate::batch::simulate_reproduction_numbers;
use crate::config::Parameters;
use crate::core::{Outbreak, State, Status};
use crate::readwrite::{MatrixIO, OutbreakIO};
use crate::stats::{PhaseStatistics, ReproductionNumber};

/// Number of individuals shown in the report.
const N_REPORTED_INDIVIDUALS: usize = 3;

pub struct Runner {
    args: Args,
    parameters: Parameters,
    seed: u64,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args)?;
        Self::setup_rayon(&args)?;

        let parameters = Self::load_parameters(args.settings.as_deref())?;
        let seed = match args.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                println!("Using random seed {seed}.");
                seed
            }
        };
        log::info!("Seed: {seed}");

        Ok(Self {
            args,
            parameters,
            seed,
        })
    }

    pub fn start(&self) -> Result<()> {
        match &self.args.command {
            Command::Run {
                reproduction_number,
                outdir,
            } => self.run(*reproduction_number, outdir.as_deref()),
            Command::Batch {
                reproduction_numbers,
                output,
            } => self.batch(reproduction_numbers, output),
        }
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) -> Result<()> {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        match &args.log_file {
            Some(log_file) => simple_logging::log_to_file(log_file, log_level)?,
            None => simple_logging::log_to_stderr(log_level),
        }
        Ok(())
    }

    /// Setup rayon thread pool
    #[cfg(feature = "parallel")]
    fn setup_rayon(args: &Args) -> Result<()> {
        if let Some(n_threads) = args.threads {
            println!("Setting number of threads to {}.", n_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build_global()?;
        }
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn setup_rayon(args: &Args) -> Result<()> {
        if args.threads.is_some() {
            log::warn!("Ignoring the number of threads, batches run sequentially.");
        }
        Ok(())
    }

    /// Load parameters from file, or use the defaults
    fn load_parameters(path: Option<&str>) -> Result<Parameters> {
        let parameters = match path {
            Some(path) => Parameters::read_from_file(path)?,
            None => Parameters::default(),
        };
        log::info!("Loaded parameters\n{}", parameters);
        Ok(parameters)
    }

    fn progress_bar(&self, length: usize) -> Result<Option<ProgressBar>> {
        if self.args.disable_progress_bar {
            return Ok(None);
        }
        let bar = ProgressBar::new(length as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{bar:40}] {pos:>7}/{len:7} [{elapsed_precise} / {duration_precise}] {msg}",
                )?
                .progress_chars("=> "),
        );
        Ok(Some(bar))
    }

    fn run(&self, reproduction_number: Option<f64>, outdir: Option<&str>) -> Result<()> {
        let parameters = match reproduction_number {
            Some(reproduction_number) => self.parameters.with_reproduction_number(reproduction_number),
            None => self.parameters.clone(),
        };
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut outbreak = Outbreak::new(parameters, &mut rng)?;
        let bar = self.progress_bar(outbreak.n_steps())?;

        log::info!("Starting simulation...");
        while outbreak.next_step(&mut rng) == Status::Running {
            if let Some(bar) = bar.as_ref() {
                bar.set_position(outbreak.step() as u64);
                bar.set_message(format!("infected={}", outbreak.len()));
            }
        }
        if let Some(bar) = bar {
            bar.finish_with_message("Done.");
        }
        log::info!(
            r###"
        Finished simulation.
        time={:.2}
        infected={}
        status={:?}"###,
            outbreak.time(),
            outbreak.len(),
            outbreak.status()
        );

        println!("{}", report(&outbreak));

        if let Some(outdir) = outdir {
            Self::write_outputs(&outbreak, Path::new(outdir))?;
        }
        Ok(())
    }

    fn write_outputs(outbreak: &Outbreak, outdir: &Path) -> Result<()> {
        log::info!("Storing results in {}...", outdir.display());
        fs::create_dir_all(outdir)?;
        outbreak.write_counts_to_file(&outdir.join("counts.csv"))?;
        outbreak.write_individuals_to_file(&outdir.join("individuals.csv"))?;
        outbreak
            .parameters()
            .write_to_file(&outdir.join("parameters.yaml").to_string_lossy())?;
        log::info!("Finished storing results.");
        Ok(())
    }

    fn batch(&self, reproduction_numbers: &[f64], output: &str) -> Result<()> {
        let matrix = simulate_reproduction_numbers(reproduction_numbers, self.seed, &self.parameters)?;
        matrix.write_npy_to_file(Path::new(output))?;
        log::info!("Stored active counts of {} outbreaks in {output}.", matrix.nrows());
        println!(
            "Stored {}x{} active counts in {output}.",
            matrix.nrows(),
            matrix.ncols()
        );
        Ok(())
    }
}

/// Table of the state counts at the end of every tallied output interval.
fn counts_table(outbreak: &Outbreak) -> String {
    let output_interval = outbreak.parameters().output_interval;
    let header = format!(
        "{:>10}{}",
        "time",
        State::ALL
            .iter()
            .map(|state| format!("{:>25}", state.to_string()))
            .join("")
    );
    let rows = outbreak
        .counters()
        .rows()
        .into_iter()
        .take(outbreak.n_outputs_filled())
        .enumerate()
        .map(|(interval, row)| {
            format!(
                "{:>10.2}{}",
                (interval + 1) as f64 * output_interval,
                row.iter().map(|count| format!("{count:>25}")).join("")
            )
        });
    std::iter::once(header).chain(rows).join("\n")
}

/// Textual summary of a simulated outbreak.
fn report(outbreak: &Outbreak) -> String {
    let mut lines = vec![counts_table(outbreak), String::new()];
    lines.extend(
        outbreak
            .individuals()
            .iter()
            .take(N_REPORTED_INDIVIDUALS)
            .map(|individual| individual.to_string()),
    );
    lines.push(String::new());
    lines.push(format!(
        "Estimated R0: {:.4}",
        outbreak.reproduction_number()
    ));
    lines.push(outbreak.phase_diagnostics().to_string());
    if outbreak.is_truncated() {
        lines.push(format!(
            "The outbreak was stopped at t={:.2} after exceeding {} infected individuals.",
            outbreak.time(),
            outbreak.parameters().max_population
        ));
    }
    lines.join("\n")
}

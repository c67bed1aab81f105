use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = None,
    name = "outbreak",
)]
pub struct Args {
    /// Path to settings (yaml file). Defaults are used if absent.
    #[clap(long, global = true)]
    pub settings: Option<String>,

    /// Seed of the random number generator. A random seed is chosen if absent.
    #[clap(long, global = true)]
    pub seed: Option<u64>,

    /// Path to log file. Logs are written to stderr if absent.
    #[clap(long, global = true)]
    pub log_file: Option<String>,

    /// Verbosity level, repeat for more.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[clap(long, global = true)]
    pub disable_progress_bar: bool,

    /// Number of threads used for batches.
    #[clap(long, global = true)]
    pub threads: Option<usize>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate a single outbreak and report its statistics.
    Run {
        /// Basic reproduction number, overrides the transmission in the settings.
        #[clap(short, long)]
        reproduction_number: Option<f64>,

        /// Directory for counts, individuals and the effective settings.
        #[clap(short, long)]
        outdir: Option<String>,
    },

    /// Simulate one outbreak per reproduction number and store their active counts.
    Batch {
        /// Comma separated reproduction numbers.
        #[clap(short, long, value_delimiter = ',', required = true)]
        reproduction_numbers: Vec<f64>,

        /// Path to output (npy file).
        #[clap(short, long)]
        output: String,
    },
}

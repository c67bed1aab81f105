use clap::Parser;
use outbreak::args::Args;
use outbreak::runner::Runner;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let runner = Runner::new(args)?;
    runner.start()
}

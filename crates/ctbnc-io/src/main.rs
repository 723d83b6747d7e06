use clap::Parser;
use ctbnc_io::cli::{run_learn_predict_command, run_sample_command, Cli, Commands};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::LearnPredict(args) => run_learn_predict_command(&args)?,
        Commands::Sample { sequences, duration, seed, time_column, out } => {
            run_sample_command(sequences, duration, seed, &time_column, &out)?;
        }
    }

    Ok(())
}

use boa_bench::cli::BoaBenchArgs;
use boa_bench::{execute_command, BenchmarkingOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = BoaBenchArgs::parse();
    let options = BenchmarkingOptions {
        cache_dir: args.cache_dir,
        results_dir: args.results_dir,
    };
    execute_command(options, args.command).await?;
    Ok(())
}

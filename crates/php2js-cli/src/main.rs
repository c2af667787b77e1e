use clap::Parser;
use php2js_cli::{Cli, Job, Summary, run};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn print_stats(summary: &Summary) {
    println!("Processed: {}", summary.processed);
    println!("Written: {}", summary.written);
    println!("Errors: {}", summary.errors);
    if let Some(t) = summary.timings() {
        println!("--- Processing Statistics ---");
        println!("Total files: {}", t.count);
        println!("Average time: {:.2}ms", t.average.as_secs_f64() * 1000.0);
        println!("Min time: {:.2}ms", t.min.as_secs_f64() * 1000.0);
        println!("Max time: {:.2}ms", t.max.as_secs_f64() * 1000.0);
        println!("P90 time: {:.2}ms", t.p90.as_secs_f64() * 1000.0);
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let (src, dst) = cli.paths()?;
    let config = cli.resolve_config(&std::env::current_dir()?)?;
    tracing::debug!(?config, "resolved config");

    let job = Job {
        src,
        dst,
        recurse: !cli.no_recurse,
    };
    let summary = run(&job, &config)?;
    if cli.stats {
        print_stats(&summary);
    }

    Ok(if summary.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

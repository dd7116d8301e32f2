use clap::Parser;
use stocksignal::cli::{run, Cli};
use stocksignal::logging::init_tracing;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    run(cli)
}

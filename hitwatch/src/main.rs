use clap::{Parser, Subcommand};
use hitwatch_core::cli;
use hitwatch_core::cli::conf::ConfigCmd;
use hitwatch_core::cli::watch::WatchArgs;

#[derive(Parser, Debug)]
#[command(
    name = "hitwatch",
    version,
    about = "hitwatch: live traffic summaries and alerts for HTTP access logs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow an access log and show live window summaries
    Watch(WatchArgs),

    /// Configuration tooling
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Watch(args) => cli::watch::run_watch(args),
        Command::Config { cmd } => cli::conf::run(cmd),
    };

    if let Err(e) = result {
        eprintln!("hitwatch error: {e:#}");
        std::process::exit(1);
    }
}

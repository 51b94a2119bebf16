mod check;
mod dump;
mod init;

pub use check::*;
use clap::Subcommand;
pub use dump::*;
pub use init::*;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Validate configuration and exit
    Check {
        /// Path to config file
        #[arg(default_value = "hitwatch.hcl")]
        path: PathBuf,

        /// Print errors without diagnostic formatting
        #[arg(short, long, default_value = "false")]
        plain: bool,
    },

    /// Print resolved configuration
    Dump {
        /// Path to config file; defaults are printed when omitted
        path: Option<PathBuf>,

        /// Output as JSON instead of HCL
        #[arg(long)]
        json: bool,
    },

    /// Write a config file containing the defaults
    Init {
        /// Path of the file to create
        #[arg(default_value = "hitwatch.hcl")]
        path: PathBuf,
    },
}

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Check { path, plain } => check(path, plain),
        ConfigCmd::Dump { path, json } => dump(path, json),
        ConfigCmd::Init { path } => init(path),
    }
}

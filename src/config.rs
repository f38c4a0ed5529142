use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use env_logger::{Builder, Env};
use log::LevelFilter;

use crate::pipeline::ARTIFACTS_DIR;

pub static DEFAULT_HOST: &str = "0.0.0.0";
pub static DEFAULT_PORT: u16 = 8000;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, action = ArgAction::Count, help = "Verbose level")]
    pub verbose: u8,
    #[arg(
        long,
        env = "STUDENT_PERFORMANCE_ARTIFACTS",
        default_value = ARTIFACTS_DIR,
        help = "Directory holding preprocessor.json and model.json"
    )]
    pub artifacts_dir: PathBuf,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve the prediction form over HTTP (default)
    Serve {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Score every record of a CSV or Parquet file
    Predict {
        #[arg(short, long, help = "Input path")]
        input: PathBuf,
        #[arg(short, long, help = "Output path")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        })
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Crate logs go out at `level`; `STUDENT_PERFORMANCE_LOG` can override
/// per target using the usual env_logger syntax.
pub fn init_logging(level: LevelFilter) {
    let env = Env::new().filter("STUDENT_PERFORMANCE_LOG");
    Builder::new()
        .filter(Some("student_performance"), level)
        .parse_env(env)
        .init();
}

use std::time::Instant;

use clap::Parser;
use log::{debug, info};
use student_performance::batch::predict_file;
use student_performance::config::{init_logging, Cli, Command};
use student_performance::pipeline::PredictPipeline;
use student_performance::server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    debug!("Arguments {:#?}", cli);

    match cli.command_or_default() {
        Command::Serve { host, port } => {
            serve(&host, port, AppState::new(&cli.artifacts_dir)).await?;
        }
        Command::Predict { input, output } => {
            let start_time = Instant::now();
            let pipeline = PredictPipeline::with_artifacts_dir(&cli.artifacts_dir);
            let artifacts_dir = cli.artifacts_dir.clone();
            let rows = tokio::task::spawn_blocking(move || {
                predict_file(&pipeline, &input, &output)
            })
            .await??;
            info!(
                "scored {} rows with artifacts from {} in {:?}",
                rows,
                artifacts_dir.display(),
                start_time.elapsed()
            );
        }
    }

    Ok(())
}

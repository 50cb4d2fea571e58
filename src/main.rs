// src/main.rs

use stagehand::errors::PipelineError;
use stagehand::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("stagehand: failed to initialise logging: {err}");
        std::process::exit(2);
    }

    if let Err(err) = run(args).await {
        match err {
            PipelineError::PipelineFailed(failures) => {
                for f in &failures {
                    eprintln!("stagehand: task '{}' failed: {}", f.task, f.reason);
                }
            }
            other => eprintln!("stagehand error: {other:#}"),
        }
        std::process::exit(1);
    }
}

use crate::cli::Cli;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use elecdecomp::engine::progress::ProgressReporter;
use elecdecomp::workflows;
use tracing::info;

pub async fn run(args: &Cli) -> Result<()> {
    let working_dir = std::env::current_dir()?;
    let partial_config = PartialRunConfig::discover(args.config.as_deref(), &working_dir)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(args)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Decomposing electrostatic energy of {} over '{}' in {}...",
        config.selector,
        config.snapshots,
        config.snapshots.directory.display()
    );
    info!("Invoking the core decomposition workflow...");

    let result =
        tokio::task::block_in_place(|| workflows::decompose::run(&config, &reporter))?;

    info!(
        "Workflow finished after {} frame(s).",
        result.frame_count()
    );
    print!("{}", result.summary());
    println!(
        "Energy logs and run log written to: {}",
        config.output.directory.display()
    );

    Ok(())
}

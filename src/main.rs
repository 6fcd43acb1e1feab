use dialoguer::{Input, Select};
use item_duplicator::adapters::gate::{AutoApprove, InteractiveGate};
use item_duplicator::app::report::{self, ConsoleReporter};
use item_duplicator::config::cli::LogFormat;
use item_duplicator::config::workflow_config::Workflow;
use item_duplicator::core::workflow::RunMode;
use item_duplicator::domain::ports::ConfirmationGate;
use item_duplicator::utils::{logger, validation::Validate};
use item_duplicator::{
    CliConfig, DuplicationEngine, DuplicatorError, MondayClient, Result, WorkflowConfig,
    WorkflowRunner,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let config = CliConfig::load();

    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting item-duplicator");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(config).await {
        Ok(()) => {}
        Err(DuplicatorError::UserAbortError) => println!("\n👋 Goodbye!"),
        Err(e) => report_failure(e),
    }
}

fn report_failure(e: DuplicatorError) {
    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = e.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

async fn run(config: CliConfig) -> Result<()> {
    config.validate()?;

    tracing::info!("📁 Loading configuration from: {}", config.config);
    let workflows = WorkflowConfig::from_file(&config.config)?;
    workflows.validate()?;

    if config.list {
        println!("{}", report::workflow_table(&workflows.list_workflows()));
        return Ok(());
    }

    let client = MondayClient::with_timeout(
        config.require_api_key()?,
        config.api_url.as_str(),
        Some(Duration::from_secs(config.timeout_seconds)),
    )?;

    let workflow = match &config.workflow {
        Some(id) => workflows.require_enabled_workflow(id)?,
        None => select_workflow(&workflows)?,
    };

    let mode = match config.run_mode() {
        Some(mode) => mode,
        None => prompt_run_mode()?,
    };

    let gate: Arc<dyn ConfirmationGate> = if config.yes {
        Arc::new(AutoApprove)
    } else {
        Arc::new(InteractiveGate::new())
    };
    let engine = DuplicationEngine::new(client, gate)
        .with_reporter(Arc::new(ConsoleReporter::new(config.account.clone())));

    let runner = WorkflowRunner::new(&workflows, &engine);
    let outcome = runner.run(workflow, &mode).await?;

    report::print_workflow_report(&outcome, config.account.as_deref());
    if outcome.aborted {
        return Err(DuplicatorError::UserAbortError);
    }
    if outcome.failed_destinations() > 0 {
        tracing::warn!(
            "{} of {} destination(s) failed",
            outcome.failed_destinations(),
            outcome.destinations.len()
        );
    }

    Ok(())
}

fn prompt_error(e: dialoguer::Error) -> DuplicatorError {
    DuplicatorError::IoError(std::io::Error::other(e))
}

fn select_workflow(workflows: &WorkflowConfig) -> Result<&Workflow> {
    let enabled = workflows.enabled_workflows();
    if enabled.is_empty() {
        return Err(DuplicatorError::ConfigError {
            message: "No enabled workflows found; enable at least one and try again".to_string(),
        });
    }

    let labels: Vec<String> = enabled
        .iter()
        .map(|w| {
            let destinations: Vec<&str> =
                w.destinations.iter().map(|d| d.board_name.as_str()).collect();
            format!(
                "{}  ({} → {})",
                w.name,
                w.source.board_name,
                destinations.join(", ")
            )
        })
        .collect();

    let selection = Select::new()
        .with_prompt("Select workflow (Esc to quit)")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    selection
        .map(|index| enabled[index])
        .ok_or(DuplicatorError::UserAbortError)
}

fn prompt_run_mode() -> Result<RunMode> {
    println!("\n📝 Item Selection");
    println!("  • Enter an item name to process a single item");
    println!("  • Enter 'batch' to process all items from the source group");
    println!("  • Enter 'q' to quit");

    let input: String = Input::new()
        .with_prompt("Enter item name or 'batch'")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("Please enter a valid item name or 'batch'")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(prompt_error)?;

    let input = input.trim();
    match input.to_lowercase().as_str() {
        "q" => Err(DuplicatorError::UserAbortError),
        "batch" => Ok(RunMode::Batch),
        _ => Ok(RunMode::SingleItem(input.to_string())),
    }
}

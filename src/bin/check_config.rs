use clap::Parser;
use item_duplicator::config::cli::load_env_file;
use item_duplicator::config::workflow_config::{WorkflowConfig, DEFAULT_CONFIG_PATH};
use item_duplicator::utils::{logger, validation::Validate};

#[derive(Parser)]
#[command(name = "check-config")]
#[command(about = "Load and validate a workflow configuration without touching any board")]
struct Args {
    /// Path to the workflow configuration (JSON, or TOML by extension)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match WorkflowConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    println!("✅ Config file parsed");
    print_templates(&config);
    print_workflows(&config);

    if let Err(e) = config.validate() {
        eprintln!("\n❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code().max(1));
    }

    println!("\n✅ Configuration is valid");
    Ok(())
}

fn print_templates(config: &WorkflowConfig) {
    println!("\n📋 Templates ({}):", config.templates.len());
    for (name, template) in &config.templates {
        println!(
            "  • {}: {} ({} mappings)",
            name,
            template.description,
            template.column_mappings.len()
        );
        for mapping in template.column_mappings.iter().take(3) {
            println!("      {} → {} ({})", mapping.source, mapping.dest, mapping.name);
        }
        if template.column_mappings.len() > 3 {
            println!("      ... and {} more", template.column_mappings.len() - 3);
        }
    }
}

fn print_workflows(config: &WorkflowConfig) {
    println!("\n🔄 Workflows ({}):", config.workflows.len());
    for workflow in &config.workflows {
        let status = if workflow.enabled { "✓" } else { "✗" };
        println!("  {} {} [{}]", status, workflow.name, workflow.id);
        println!(
            "      Source: {} (board {}, group '{}')",
            workflow.source.board_name, workflow.source.board_id, workflow.source.group_id
        );

        if !workflow.enabled {
            continue;
        }

        for destination in &workflow.destinations {
            let mapping = config.resolve(destination);
            println!(
                "      → {} (board {}, group '{}', template: {}) - {} column(s)",
                destination.board_name,
                destination.board_id,
                destination.group_id,
                destination.template.as_deref().unwrap_or("None"),
                mapping.len()
            );
            for (source_col, dest_col) in mapping.columns.iter().take(5) {
                println!(
                    "          {} → {}",
                    mapping.display_name(source_col),
                    mapping.display_name(dest_col)
                );
            }
            if mapping.len() > 5 {
                println!("          ... and {} more", mapping.len() - 5);
            }
        }
    }
}

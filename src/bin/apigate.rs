//! `apigate` command line.
//!
//! ```text
//! apigate create --spec swagger.yml [--profile NAME] [--region REGION] [--endpoint URL] [--verbose]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use apigate::auth::profile::load_credentials;
use apigate::deploy::CleanupOutcome;
use apigate::{
    ApiSpecification, DeployConfig, DeployReport, DeploymentOrchestrator, EndpointUrl,
    ManagementApiClient,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Deploy Swagger-style API descriptions to AWS API Gateway.
#[derive(Debug, Parser)]
#[command(name = "apigate")]
#[command(version)]
#[command(about = "Deploy Swagger-style API descriptions to AWS API Gateway")]
struct Cli {
    /// Log every management API call.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new REST API from a specification file.
    Create(CreateArgs),
}

#[derive(Debug, clap::Args)]
struct CreateArgs {
    /// Specification file (YAML or JSON).
    #[arg(long, value_name = "FILE")]
    spec: PathBuf,

    /// Shared credentials profile (defaults to AWS_PROFILE or "default").
    #[arg(long)]
    profile: Option<String>,

    /// Region (defaults to AWS_REGION, the profile's region, or us-east-1).
    #[arg(long)]
    region: Option<String>,

    /// Management API endpoint, overriding the regional default.
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
}

fn init_tracing(verbose: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) if !verbose => filter,
        _ if verbose => "info,apigate=debug".to_string(),
        _ => "info".to_string(),
    };
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

async fn create(args: CreateArgs) -> anyhow::Result<()> {
    let credentials = load_credentials(args.profile.as_deref(), args.region.as_deref())
        .context("failed to load AWS credentials")?;

    let mut builder = DeployConfig::builder().credentials(credentials);
    if let Some(endpoint) = args.endpoint {
        builder = builder.endpoint(EndpointUrl::new(endpoint)?);
    }
    let config = builder.build()?;

    let spec = ApiSpecification::load_from_file(&args.spec)?;
    let client = ManagementApiClient::new(&config)?;

    let report = DeploymentOrchestrator::new(&client, &config)
        .run(&spec)
        .await
        .map_err(|e| {
            let message = format!(
                "deployment of '{}' finished in state {}",
                spec.title,
                e.state()
            );
            anyhow::Error::new(e).context(message)
        })?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &DeployReport) {
    println!(
        "Created REST API {} ({})",
        report.rest_api.name, report.rest_api.id
    );
    for cleanup in &report.artifact_cleanup {
        match &cleanup.outcome {
            CleanupOutcome::Deleted => println!("  deleted model {}", cleanup.model_name),
            CleanupOutcome::Failed { reason } => {
                println!("  kept model {} ({reason})", cleanup.model_name);
            }
        }
    }
    for node in &report.created_resources {
        println!("  created resource {} ({})", node.path, node.id);
    }
    for attachment in &report.attachments {
        println!(
            "  attached {} {}",
            attachment.http_method, attachment.path
        );
    }
    println!("Finished: {}", report.final_state);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Create(args) => create(args).await,
    }
}

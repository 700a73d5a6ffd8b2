//! kube-inventory - workload inventory for OpenShift and Kubernetes clusters
//!
//! Logs in, walks every user namespace, correlates pods, services, routes,
//! autoscalers, quotas, volumes, secrets and configmaps to their workloads,
//! and writes the result as dated CSV and JSON reports.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kube_inventory::cli::{self, ConfigSubcommand, LoginArgs};
use kube_inventory::cluster::{self, KubeResourceClient};
use kube_inventory::collect::InventoryCollector;
use kube_inventory::config::ConfigLoader;
use kube_inventory::correlate::SiblingAttachment;
use kube_inventory::error::WarningStage;
use kube_inventory::report::{FileReportSink, ReportSink};
use std::path::PathBuf;
use std::sync::Arc;

/// kube-inventory - workload inventory for OpenShift and Kubernetes clusters
#[derive(Parser, Debug)]
#[command(name = "kube-inventory", version)]
#[command(about = "Inventory cluster workloads into CSV and JSON reports", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// API server URL (prompted when omitted)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Username for basic authentication (prompted when omitted)
    #[arg(long, short = 'u')]
    username: Option<String>,

    /// Prompt for a bearer token instead of a password
    #[arg(long, conflicts_with = "username")]
    token: bool,

    /// Directory for the CSV and JSON reports
    #[arg(long, short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure_skip_tls_verify: bool,

    /// Use the current kubeconfig context instead of prompting for credentials
    #[arg(long, conflicts_with_all = ["server", "username", "token"])]
    use_kubeconfig: bool,

    /// Which workload rows carry namespace-wide columns (fan-out, last-group)
    #[arg(long, value_name = "POLICY")]
    attach: Option<SiblingAttachment>,

    /// Configuration subcommand
    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle config subcommand
    if let Some(Command::Config { subcommand }) = args.command {
        return cli::handle_config_command(subcommand);
    }

    let log_file = cli::init_logging(args.debug)?;
    if let Some(ref log_path) = log_file {
        eprintln!(
            "Debug logging enabled. Logs written to: {}",
            log_path.display()
        );
    }

    // Load configuration, then let flags win
    let mut config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {:#}, using defaults", e);
        ConfigLoader::load_defaults()
    });
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if args.insecure_skip_tls_verify {
        config.insecure_skip_tls_verify = true;
    }
    if let Some(attach) = args.attach {
        config.sibling_attachment = attach;
    }
    ConfigLoader::check(&config).context("Invalid configuration")?;
    tracing::debug!(
        output_dir = %config.output_dir.display(),
        attachment = %config.sibling_attachment,
        max_concurrent_queries = config.collector.max_concurrent_queries,
        "Configuration loaded"
    );

    let client = if args.use_kubeconfig {
        cluster::create_client(config.insecure_skip_tls_verify).await?
    } else {
        let credentials = cli::prompt_credentials(&LoginArgs {
            server: args.server,
            username: args.username,
            token: args.token,
        })?;
        let credentials =
            cluster::exchange_password(credentials, config.insecure_skip_tls_verify)
                .await
                .context("Login failed")?;
        cluster::connect(&credentials, config.insecure_skip_tls_verify)?
    };

    cluster::verify_session(&client)
        .await
        .context("Login failed")?;
    tracing::info!("Session verified");

    let resource_client = Arc::new(KubeResourceClient::new(
        client,
        config.collector.page_size,
    ));
    let collector = InventoryCollector::new(resource_client, config.collector_settings());
    let report = collector
        .collect()
        .await
        .context("Inventory collection failed")?;

    let sink = FileReportSink::new(&config.output_dir);
    let written = sink
        .write(&report.schema, &report.rows)
        .context("Failed to write inventory report")?;

    println!(
        "Inventoried {} rows across {} namespaces",
        report.rows.len(),
        report.namespaces.len()
    );
    for path in &written {
        println!("  {}", path.display());
    }

    if report.has_warnings() {
        let failed = report
            .warnings
            .iter()
            .filter(|w| w.stage == WarningStage::Query)
            .count();
        let dropped = report.warnings.len() - failed;
        eprintln!(
            "\n{} queries failed, {} records dropped:",
            failed, dropped
        );
        for warning in &report.warnings {
            eprintln!("  {}", warning);
        }
    }

    Ok(())
}

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;

use tlc_snmp::config::{AppConfig, HostEntry};
use tlc_snmp::controller::FieldMap;
use tlc_snmp::formatter::JsonFormatter;
use tlc_snmp::{Command, HostResponse, OidCatalog};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    tlc_snmp::logging::init_logging(args.verbose)?;

    let config = AppConfig::load(&args.config)?;
    let catalog = config.load_catalog()?;
    tracing::debug!(target: "tlc_snmp::cli", { hosts = config.hosts.len(), config = %args.config.display() }, "конфигурация загружена");

    let output = match args.command.controller_command() {
        None => {
            let hosts = poll_all(Arc::new(config), catalog).await;
            let report = JsonFormatter::format_poll(hosts);
            render(&report, args.compact)?
        }
        Some((ip, command)) => {
            let entry = config.find_host(ip)?;
            let response = run_command(&config, entry, catalog, command).await;
            let failed = !response.is_ok();
            let report = JsonFormatter::format_command(command, response);
            println!("{}", render(&report, args.compact)?);
            return Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS });
        }
    };

    println!("{output}");
    Ok(ExitCode::SUCCESS)
}

/// Опрашивает все хосты параллельно, по задаче на хост
async fn poll_all(config: Arc<AppConfig>, catalog: Arc<OidCatalog>) -> Vec<HostResponse> {
    let mut tasks = JoinSet::new();
    for (index, entry) in config.hosts.iter().cloned().enumerate() {
        let config = Arc::clone(&config);
        let catalog = Arc::clone(&catalog);
        tasks.spawn(async move {
            let response = match config.connect(&entry, catalog).await {
                Ok(mut host) => host.get_states().await,
                Err(e) => unreachable_host(&entry, e),
            };
            (index, response)
        });
    }

    let mut responses = Vec::with_capacity(config.hosts.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => responses.push(result),
            Err(e) => tracing::error!(target: "tlc_snmp::cli", { error = %e }, "задача опроса упала"),
        }
    }
    // Порядок как в конфигурации
    responses.sort_by_key(|(index, _)| *index);
    responses.into_iter().map(|(_, response)| response).collect()
}

async fn run_command(
    config: &AppConfig,
    entry: &HostEntry,
    catalog: Arc<OidCatalog>,
    command: Command,
) -> HostResponse {
    match config.connect(entry, catalog).await {
        Ok(mut host) => host.send_command(command).await,
        Err(e) => unreachable_host(entry, e),
    }
}

/// Ответ для хоста, к которому не удалось даже создать сессию
fn unreachable_host(entry: &HostEntry, error: anyhow::Error) -> HostResponse {
    tracing::warn!(target: "tlc_snmp::cli", { ip = %entry.ip, error = %error }, "хост недоступен");
    HostResponse {
        protocol: entry.profile.dialect().to_string(),
        ip_address: entry.ip.to_string(),
        errors: vec![format!("{error:#}")],
        data: FieldMap::new(),
    }
}

fn render<T: serde::Serialize>(report: &T, compact: bool) -> Result<String> {
    if compact {
        JsonFormatter::to_json_compact(report)
    } else {
        JsonFormatter::to_json_string(report)
    }
}

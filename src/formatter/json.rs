use serde::{Deserialize, Serialize};

use crate::controller::{Command, HostResponse};

/// JSON опроса состояния всех хостов
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollReport {
    pub timestamp: String,
    pub summary: PollSummary,
    pub hosts: Vec<HostResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSummary {
    pub total_hosts: usize,
    pub successful_hosts: usize,
    pub failed_hosts: usize,
    /// Хосты, ответившие частично (есть и данные, и ошибки)
    pub partial_hosts: usize,
}

/// JSON результата одной команды
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReport {
    pub timestamp: String,
    pub command: String,
    pub status: String, // "success" | "error"
    pub response: HostResponse,
}

/// JSON форматтер для ответов хостов
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format_poll(hosts: Vec<HostResponse>) -> PollReport {
        let successful_hosts = hosts.iter().filter(|h| h.is_ok()).count();
        let partial_hosts = hosts
            .iter()
            .filter(|h| !h.is_ok() && !h.data.is_empty())
            .count();

        PollReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: PollSummary {
                total_hosts: hosts.len(),
                successful_hosts,
                failed_hosts: hosts.len() - successful_hosts,
                partial_hosts,
            },
            hosts,
        }
    }

    pub fn format_command(command: Command, response: HostResponse) -> CommandReport {
        let status = if response.is_ok() { "success" } else { "error" };
        CommandReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            command: command.to_string(),
            status: status.to_string(),
            response,
        }
    }

    /// Сериализует отчёт в JSON строку
    pub fn to_json_string<T: Serialize>(report: &T) -> anyhow::Result<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }

    /// Сериализует отчёт в компактный JSON
    pub fn to_json_compact<T: Serialize>(report: &T) -> anyhow::Result<String> {
        serde_json::to_string(report)
            .map_err(|e| anyhow::anyhow!("Ошибка сериализации в JSON: {}", e))
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::snmp::RequestSettings;

/// Общие настройки опроса
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Настройки подключения
    pub connection: ConnectionSettings,
    /// Community для SNMPv2c
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Таймаут одной попытки (секунды)
    pub timeout: u64,
    /// Количество повторов после первой попытки
    pub retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub read_community: String,
    pub write_community: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            timeout: 3,
            retries: 1,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            read_community: "public".to_string(),
            write_community: "private".to_string(),
        }
    }
}

impl ConnectionSettings {
    pub fn request_settings(&self) -> RequestSettings {
        RequestSettings {
            timeout: Duration::from_secs(self.timeout),
            retries: self.retries,
        }
    }
}

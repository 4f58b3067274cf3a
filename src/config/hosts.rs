use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::controller::ControllerProfile;

/// Строка инвентаря: один контроллер.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    pub ip: Ipv4Addr,
    pub profile: ControllerProfile,
    /// Известный SCN (UG405). Без него SCN обнаруживается при первом запросе.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scn: Option<String>,
    /// Read community этого хоста вместо общей
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_community: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    161
}

impl HostEntry {
    /// Адрес агента для транспорта
    pub fn target(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

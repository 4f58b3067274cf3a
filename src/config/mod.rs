use std::collections::HashSet;
use std::env;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::controller::Host;
use crate::snmp::{OidCatalog, RequestSettings, V2cTransport};

pub mod hosts;
pub mod settings;

pub use hosts::HostEntry;
pub use settings::Settings;

/// Главная конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Базовые настройки
    #[serde(default)]
    pub settings: Settings,
    /// Файл с полной таблицей OID вместо встроенной
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    /// Инвентарь контроллеров
    pub hosts: Vec<HostEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl AppConfig {
    /// Загружает конфигурацию из YAML файла
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Не удалось прочитать файл: {}", path.display()))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Конфигурация {} невалидна", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yml::from_str(content).context("Не удалось распарсить YAML")?;

        if config.hosts.is_empty() {
            anyhow::bail!("В конфигурации нет ни одного хоста");
        }
        let mut seen = HashSet::new();
        for host in &config.hosts {
            if !seen.insert(host.ip) {
                anyhow::bail!("Хост {} указан в конфигурации дважды", host.ip);
            }
        }

        Ok(config)
    }

    /// Каталог OID: из файла, если он задан, иначе встроенный
    pub fn load_catalog(&self) -> Result<Arc<OidCatalog>> {
        match &self.catalog {
            Some(path) => {
                let path = self.base_dir.join(path);
                Ok(Arc::new(OidCatalog::load(path)?))
            }
            None => Ok(OidCatalog::builtin()),
        }
    }

    pub fn find_host(&self, ip: Ipv4Addr) -> Result<&HostEntry> {
        self.hosts
            .iter()
            .find(|host| host.ip == ip)
            .with_context(|| format!("Хост {ip} не найден в конфигурации"))
    }

    /// Получает timeout из переменной окружения или из настроек
    pub fn get_timeout(&self) -> u64 {
        env_override("SNMP_TIMEOUT").unwrap_or(self.settings.connection.timeout)
    }

    /// Получает число повторов из переменной окружения или из настроек
    pub fn get_retries(&self) -> u32 {
        env_override("SNMP_RETRIES").unwrap_or(self.settings.connection.retries)
    }

    pub fn request_settings(&self) -> RequestSettings {
        let mut connection = self.settings.connection.clone();
        connection.timeout = self.get_timeout();
        connection.retries = self.get_retries();
        connection.request_settings()
    }

    /// Read community: хост, затем переменная окружения, затем общие настройки
    pub fn get_read_community(&self, host: &HostEntry) -> Vec<u8> {
        host.community
            .clone()
            .or_else(|| env::var("SNMP_READ_COMMUNITY").ok())
            .unwrap_or_else(|| self.settings.auth.read_community.clone())
            .into_bytes()
    }

    pub fn get_write_community(&self, host: &HostEntry) -> Vec<u8> {
        host.write_community
            .clone()
            .or_else(|| env::var("SNMP_WRITE_COMMUNITY").ok())
            .unwrap_or_else(|| self.settings.auth.write_community.clone())
            .into_bytes()
    }

    /// Создаёт хост поверх SNMPv2c транспорта
    pub async fn connect(
        &self,
        host: &HostEntry,
        catalog: Arc<OidCatalog>,
    ) -> Result<Host<V2cTransport>> {
        let transport = V2cTransport::new(
            &host.target(),
            &self.get_read_community(host),
            &self.get_write_community(host),
        )
        .await?;

        let controller = Host::new(host.profile, host.ip, transport, catalog)
            .with_settings(self.request_settings())
            .with_known_scn(host.scn.as_deref())
            .with_context(|| format!("Неверный SCN для хоста {}", host.ip))?;
        Ok(controller)
    }
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

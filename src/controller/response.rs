use std::fmt::Display;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::parser::FieldMap;
use super::profile::Dialect;

/// Ответ хоста на одну логическую операцию.
///
/// При непустом `errors` данные могут быть неполными.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub protocol: String,
    pub ip_address: String,
    pub errors: Vec<String>,
    pub data: FieldMap,
}

impl HostResponse {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Собирает ошибки и данные подзапросов одной операции.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    errors: Vec<String>,
    data: Option<FieldMap>,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сброс перед новой операцией.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.data = None;
    }

    pub fn add_error(&mut self, error: impl Display) {
        self.errors.push(error.to_string());
    }

    /// Данные операции. Повторный вызов заменяет предыдущие.
    pub fn set_data(&mut self, data: FieldMap) {
        self.data = Some(data);
    }

    pub fn build(&self, dialect: Dialect, ip: Ipv4Addr) -> HostResponse {
        HostResponse {
            protocol: dialect.to_string(),
            ip_address: ip.to_string(),
            errors: self.errors.clone(),
            data: self.data.clone().unwrap_or_default(),
        }
    }
}

//! Граница с SNMP-стеком.
//!
//! Повторы запросов целиком на стороне транспорта: оркестратор считает
//! любую ошибку вызова окончательной.

use std::future::Future;
use std::time::Duration;

use super::varbinds::Varbind;
use crate::error::Error;

/// Ответ транспорта в форме SNMP-стека.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportReply {
    /// Сбой до получения ответа (таймаут, сокет).
    pub error_indication: Option<String>,
    pub error_status: u32,
    pub error_index: u32,
    pub varbinds: Vec<Varbind>,
}

impl TransportReply {
    pub fn ok(varbinds: Vec<Varbind>) -> Self {
        Self {
            varbinds,
            ..Self::default()
        }
    }

    pub fn failed(indication: impl Into<String>) -> Self {
        Self {
            error_indication: Some(indication.into()),
            ..Self::default()
        }
    }

    /// Varbind'ы ответа или ошибка, если вызов неуспешен.
    pub fn into_result(self) -> Result<Vec<Varbind>, Error> {
        if let Some(indication) = self.error_indication {
            return Err(Error::Transport(indication));
        }
        if self.error_status != 0 || self.error_index != 0 {
            return Err(Error::Agent {
                status: self.error_status,
                index: self.error_index,
            });
        }
        Ok(self.varbinds)
    }
}

/// Таймаут и число повторов одного вызова.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSettings {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            retries: 0,
        }
    }
}

/// SNMP-транспорт до одного агента.
pub trait SnmpTransport: Send + Sync {
    fn get(
        &self,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> impl Future<Output = TransportReply> + Send;

    fn get_next(
        &self,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> impl Future<Output = TransportReply> + Send;

    fn set(
        &self,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> impl Future<Output = TransportReply> + Send;
}

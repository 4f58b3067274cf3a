//! Ошибки движка.
//!
//! Ошибки, которые видит вызывающий код `get_states` / `set_stage`, не
//! возвращаются как `Err`: они складываются строками в `HostResponse.errors`.
//! `Error` нужен внутри движка и при сборке каталога/хостов.

use crate::controller::ControllerProfile;

/// Результат с ошибкой движка.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Таймаут или сбой соединения (errorIndication транспорта).
    #[error("ошибка транспорта: {0}")]
    Transport(String),

    /// Агент ответил ненулевым errorStatus/errorIndex.
    #[error("агент вернул ошибку: errorStatus={status}, errorIndex={index}")]
    Agent { status: u32, index: u32 },

    /// Ответ не разобран ни в одно поле: профиль не совпадает с устройством.
    #[error("ответ не соответствует профилю {profile}: неверный тип контроллера или прошивка")]
    ProtocolMismatch { profile: ControllerProfile },

    #[error("ошибка декодирования: {0}")]
    Decode(String),

    /// Не удалось перевести контроллер в режим, в котором он принимает команды.
    #[error("не выполнено предусловие режима работы: {0}")]
    PreconditionFailure(String),

    #[error("невалидный OID '{input}': {reason}")]
    InvalidOid { input: String, reason: String },

    /// В каталоге OID не хватает объектов.
    #[error("в каталоге OID отсутствуют объекты: {}", .0.join(", "))]
    MissingOids(Vec<String>),

    #[error("фаза {stage} вне диапазона 0..={max} для профиля {profile}")]
    StageOutOfRange {
        stage: u32,
        max: u32,
        profile: ControllerProfile,
    },

    #[error("команда '{command}' не поддерживается профилем {profile}")]
    UnsupportedCommand {
        command: String,
        profile: ControllerProfile,
    },
}

impl Error {
    pub(crate) fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_oids_lists_every_name() {
        let err = Error::MissingOids(vec!["utcReplyGn".into(), "utcControlFn".into()]);
        assert_eq!(
            err.to_string(),
            "в каталоге OID отсутствуют объекты: utcReplyGn, utcControlFn"
        );
    }

    #[test]
    fn agent_error_shows_status_and_index() {
        let err = Error::Agent { status: 2, index: 1 };
        assert_eq!(err.to_string(), "агент вернул ошибку: errorStatus=2, errorIndex=1");
    }
}

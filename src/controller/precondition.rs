//! Перевод контроллера Peek в режим UTC перед командой.
//!
//! Peek принимает команды только в режиме 3 и переходит в него из режима 1
//! лишь через режим 2. Последовательность: прочитать режим, выставить
//! недостающие шаги, перечитать и убедиться, что режим 3. Любой сбой
//! прерывает всю операцию, сама команда после этого не отправляется.

use crate::error::{Error, Result};
use crate::snmp::varbinds::operation_mode::{LOCAL, STANDBY, UTC_CONTROL};
use crate::snmp::{Oid, RequestSettings, SnmpTransport, Value, Varbind};

/// Какие режимы нужно выставить по очереди, чтобы из `current` попасть в UTC.
pub fn plan_mode_transition(current: i64) -> Result<Vec<i64>> {
    match current {
        UTC_CONTROL => Ok(Vec::new()),
        LOCAL => Ok(vec![STANDBY, UTC_CONTROL]),
        STANDBY => Ok(vec![UTC_CONTROL]),
        other => Err(Error::PreconditionFailure(format!(
            "неизвестный режим работы {other}"
        ))),
    }
}

/// Состояния подавтомата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionStep {
    ReadMode,
    WriteMode(i64),
    ConfirmMode,
}

/// Выполняет перевод в режим UTC. Возвращает выставленные режимы.
pub async fn ensure_utc_control<T: SnmpTransport>(
    transport: &T,
    operation_mode: &Oid,
    settings: RequestSettings,
) -> Result<Vec<i64>> {
    let current = read_mode(transport, operation_mode, settings, PreconditionStep::ReadMode).await?;
    let writes = plan_mode_transition(current)?;
    if writes.is_empty() {
        return Ok(writes);
    }

    for mode in &writes {
        let step = PreconditionStep::WriteMode(*mode);
        tracing::debug!(target: "tlc_snmp::precondition", { mode = *mode }, "выставляем режим работы");
        let request = [Varbind::new(operation_mode.clone(), Value::Integer(*mode))];
        transport
            .set(&request, settings.timeout, settings.retries)
            .await
            .into_result()
            .map_err(|e| failed(step, e))?;
    }

    let confirmed =
        read_mode(transport, operation_mode, settings, PreconditionStep::ConfirmMode).await?;
    if confirmed != UTC_CONTROL {
        return Err(Error::PreconditionFailure(format!(
            "после перевода режим работы {confirmed}, ожидался {UTC_CONTROL}"
        )));
    }
    Ok(writes)
}

async fn read_mode<T: SnmpTransport>(
    transport: &T,
    operation_mode: &Oid,
    settings: RequestSettings,
    step: PreconditionStep,
) -> Result<i64> {
    let varbinds = transport
        .get(
            &[Varbind::get(operation_mode.clone())],
            settings.timeout,
            settings.retries,
        )
        .await
        .into_result()
        .map_err(|e| failed(step, e))?;

    varbinds
        .iter()
        .find(|vb| &vb.oid == operation_mode)
        .and_then(|vb| vb.value.to_text().trim().parse().ok())
        .ok_or_else(|| {
            Error::PreconditionFailure(format!("{step:?}: в ответе нет режима работы"))
        })
}

fn failed(step: PreconditionStep, error: Error) -> Error {
    Error::PreconditionFailure(format!("{step:?}: {error}"))
}

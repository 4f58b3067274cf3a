use std::time::Duration;

use anyhow::{Context, Result};
use snmp2::AsyncSession;
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::oid::{Oid, parse_oid};
use super::transport::{SnmpTransport, TransportReply};
use super::varbinds::{Value, Varbind};

/// SNMPv2c транспорт поверх `snmp2`.
///
/// Чтение идёт через сессию с read community, запись через write community.
pub struct V2cTransport {
    target: String,
    read: Mutex<AsyncSession>,
    write: Mutex<AsyncSession>,
}

#[derive(Clone, Copy)]
enum Op {
    Get,
    GetNext,
}

impl V2cTransport {
    pub async fn new(target: &str, read_community: &[u8], write_community: &[u8]) -> Result<Self> {
        let read = AsyncSession::new_v2c(target, read_community, 2)
            .await
            .with_context(|| format!("Не удалось создать SNMP сессию чтения к {target}"))?;
        let write = AsyncSession::new_v2c(target, write_community, 2)
            .await
            .with_context(|| format!("Не удалось создать SNMP сессию записи к {target}"))?;

        Ok(Self {
            target: target.to_string(),
            read: Mutex::new(read),
            write: Mutex::new(write),
        })
    }

    /// GET/GETNEXT по одному объекту, ответы склеиваются в порядке запроса.
    async fn read_each(
        &self,
        op: Op,
        varbinds: &[Varbind],
        per_try: Duration,
        retries: u32,
    ) -> TransportReply {
        let mut session = self.read.lock().await;
        let mut collected = Vec::with_capacity(varbinds.len());

        for (position, varbind) in varbinds.iter().enumerate() {
            let oid = match to_snmp2_oid(&varbind.oid) {
                Ok(oid) => oid,
                Err(e) => return TransportReply::failed(e.to_string()),
            };

            let mut attempt = 0;
            let reply = loop {
                let call = async {
                    match op {
                        Op::Get => session.get(&oid).await,
                        Op::GetNext => session.getnext(&oid).await,
                    }
                    .map(|pdu| {
                        let varbinds: Vec<Varbind> = pdu
                            .varbinds
                            .filter_map(|(oid, value)| from_snmp2(oid.to_string(), value))
                            .collect();
                        (pdu.error_status, pdu.error_index, varbinds)
                    })
                };
                match timeout(per_try, call).await {
                    Ok(Ok(reply)) => break Ok(reply),
                    Ok(Err(e)) if attempt >= retries => break Err(format!("{e:?}")),
                    Err(_) if attempt >= retries => {
                        break Err("No SNMP response received before timeout".to_string())
                    }
                    _ => {
                        attempt += 1;
                        tracing::debug!(target: "tlc_snmp::transport", { target = %self.target, attempt }, "повтор запроса");
                    }
                }
            };

            match reply {
                Ok((0, 0, received)) => collected.extend(received),
                Ok((status, index, _)) => {
                    // Индекс ошибки относится ко всему запросу, а не к одиночному GET
                    let index = if index == 0 { 0 } else { position as u32 + 1 };
                    return TransportReply {
                        error_status: status,
                        error_index: index,
                        ..TransportReply::default()
                    };
                }
                Err(indication) => return TransportReply::failed(indication),
            }
        }

        TransportReply::ok(collected)
    }
}

impl SnmpTransport for V2cTransport {
    async fn get(&self, varbinds: &[Varbind], timeout: Duration, retries: u32) -> TransportReply {
        self.read_each(Op::Get, varbinds, timeout, retries).await
    }

    async fn get_next(
        &self,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> TransportReply {
        self.read_each(Op::GetNext, varbinds, timeout, retries).await
    }

    async fn set(&self, varbinds: &[Varbind], per_try: Duration, retries: u32) -> TransportReply {
        let oids: Vec<snmp2::Oid<'static>> = match varbinds
            .iter()
            .map(|vb| to_snmp2_oid(&vb.oid))
            .collect::<Result<_>>()
        {
            Ok(oids) => oids,
            Err(e) => return TransportReply::failed(e.to_string()),
        };
        let values: Vec<(&snmp2::Oid<'static>, snmp2::Value<'_>)> = oids
            .iter()
            .zip(varbinds)
            .map(|(oid, vb)| (oid, to_snmp2_value(&vb.value)))
            .collect();

        let mut session = self.write.lock().await;
        let mut attempt = 0;
        loop {
            let call = async {
                session.set(&values).await.map(|pdu| {
                    let varbinds: Vec<Varbind> = pdu
                        .varbinds
                        .filter_map(|(oid, value)| from_snmp2(oid.to_string(), value))
                        .collect();
                    TransportReply {
                        error_indication: None,
                        error_status: pdu.error_status,
                        error_index: pdu.error_index,
                        varbinds,
                    }
                })
            };
            match timeout(per_try, call).await {
                Ok(Ok(reply)) => return reply,
                Ok(Err(e)) if attempt >= retries => return TransportReply::failed(format!("{e:?}")),
                Err(_) if attempt >= retries => {
                    return TransportReply::failed("No SNMP response received before timeout")
                }
                _ => {
                    attempt += 1;
                    tracing::debug!(target: "tlc_snmp::transport", { target = %self.target, attempt }, "повтор SET");
                }
            }
        }
    }
}

fn to_snmp2_oid(oid: &Oid) -> Result<snmp2::Oid<'static>> {
    snmp2::Oid::from(oid.arcs())
        .map_err(|e| anyhow::anyhow!("Не удалось создать Oid из '{}': {:?}", oid, e))
}

fn to_snmp2_value(value: &Value) -> snmp2::Value<'_> {
    match value {
        Value::Integer(v) => snmp2::Value::Integer(*v),
        Value::Unsigned(v) => snmp2::Value::Unsigned32(*v),
        Value::OctetString(bytes) => snmp2::Value::OctetString(bytes),
        _ => snmp2::Value::Null,
    }
}

fn from_snmp2(oid: String, value: snmp2::Value<'_>) -> Option<Varbind> {
    let oid = match parse_oid(&oid) {
        Ok(oid) => oid,
        Err(e) => {
            tracing::debug!(target: "tlc_snmp::transport", { oid = %oid, error = %e }, "varbind ответа с нечитаемым OID отброшен");
            return None;
        }
    };
    let value = match value {
        snmp2::Value::Integer(v) => Value::Integer(v),
        snmp2::Value::Unsigned32(v) | snmp2::Value::Counter32(v) | snmp2::Value::Timeticks(v) => {
            Value::Unsigned(v)
        }
        snmp2::Value::OctetString(bytes) => Value::OctetString(bytes.to_vec()),
        snmp2::Value::Null => Value::Unspecified,
        snmp2::Value::NoSuchObject => Value::NoSuchObject,
        snmp2::Value::NoSuchInstance => Value::NoSuchInstance,
        snmp2::Value::EndOfMibView => Value::EndOfMibView,
        other => Value::Other(format!("{other:?}")),
    };
    Some(Varbind::new(oid, value))
}

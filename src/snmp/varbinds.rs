//! Пары (OID, значение) и сборка наборов запросов по профилю.

use std::collections::HashMap;
use std::fmt;

use super::catalog::{OidCatalog, OidName};
use super::oid::Oid;
use super::scn::Scn;
use crate::controller::{Command, ControllerProfile, Dialect};
use crate::error::{Error, Result};

/// Значение varbind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Пустое значение GET-запроса.
    Unspecified,
    Integer(i64),
    Unsigned(u32),
    OctetString(Vec<u8>),
    NoSuchObject,
    NoSuchInstance,
    EndOfMibView,
    /// Прочие типы SNMP в текстовом виде.
    Other(String),
}

impl Value {
    /// Текстовая форма значения.
    ///
    /// Октетная строка из печатных ASCII отдаётся как есть, иначе в hex.
    pub fn to_text(&self) -> String {
        match self {
            Value::Unspecified => String::new(),
            Value::Integer(v) => v.to_string(),
            Value::Unsigned(v) => v.to_string(),
            Value::OctetString(bytes) => {
                if !bytes.is_empty() && bytes.iter().all(|b| (0x20..=0x7e).contains(b)) {
                    String::from_utf8_lossy(bytes).into_owned()
                } else {
                    hex::encode(bytes)
                }
            }
            Value::NoSuchObject => "noSuchObject".to_string(),
            Value::NoSuchInstance => "noSuchInstance".to_string(),
            Value::EndOfMibView => "endOfMibView".to_string(),
            Value::Other(s) => s.clone(),
        }
    }

    /// Исключения SNMPv2: объекта на агенте нет.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varbind {
    pub oid: Oid,
    pub value: Value,
}

impl Varbind {
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Varbind для GET.
    pub fn get(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Unspecified,
        }
    }
}

impl fmt::Display for Varbind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Значения `utcType2OperationMode`.
pub mod operation_mode {
    /// Локальное управление.
    pub const LOCAL: i64 = 1;
    /// Промежуточный режим, через который Peek переходит в UTC.
    pub const STANDBY: i64 = 2;
    /// Управление от центра (UTC).
    pub const UTC_CONTROL: i64 = 3;
}

/// Сборщик varbind-наборов с кэшем.
///
/// Наборы состояния кэшируются по (профиль, SCN): для STCIP ключ без SCN,
/// для UG405 свой набор на каждый обнаруженный SCN.
#[derive(Debug, Default)]
pub struct VarbindBuilder {
    state_cache: HashMap<(ControllerProfile, Option<String>), Vec<Varbind>>,
}

impl VarbindBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// GET-набор для чтения состояния.
    pub fn current_state(
        &mut self,
        catalog: &OidCatalog,
        profile: ControllerProfile,
        scn: Option<&Scn>,
    ) -> Result<Vec<Varbind>> {
        let scn = scn_for(profile, scn)?;
        let key = (profile, scn.map(|s| s.chars().to_string()));
        if let Some(cached) = self.state_cache.get(&key) {
            return Ok(cached.clone());
        }

        let varbinds: Vec<Varbind> = catalog
            .state_oids(profile)
            .into_iter()
            .map(|oid| Varbind::get(address(catalog, oid, scn)))
            .collect();
        self.state_cache.insert(key, varbinds.clone());
        Ok(varbinds)
    }

    /// SET-набор для смены фазы.
    pub fn set_stage(
        &self,
        catalog: &OidCatalog,
        profile: ControllerProfile,
        scn: Option<&Scn>,
        stage: u32,
    ) -> Result<Vec<Varbind>> {
        self.command(catalog, profile, scn, Command::Stage(stage))
    }

    /// SET-набор для произвольной команды.
    pub fn command(
        &self,
        catalog: &OidCatalog,
        profile: ControllerProfile,
        scn: Option<&Scn>,
        command: Command,
    ) -> Result<Vec<Varbind>> {
        let scn = scn_for(profile, scn)?;
        let spec = profile.spec();
        if !spec.supports(command) {
            return Err(Error::UnsupportedCommand {
                command: command.to_string(),
                profile,
            });
        }
        let at = |name: OidName| address(catalog, catalog.oid(name), scn);

        let varbinds = match (spec.dialect, command) {
            (_, Command::Stage(stage)) => {
                let wire = spec.codec.encode_for_set(stage).ok_or(Error::StageOutOfRange {
                    stage,
                    max: spec.codec.max_stage(),
                    profile,
                })?;
                match spec.dialect {
                    Dialect::Stcip => vec![Varbind::new(at(OidName::SwarcoPhaseCommand), wire)],
                    Dialect::Ug405 if stage == 0 => vec![
                        Varbind::new(
                            at(OidName::Ug405OperationMode),
                            Value::Integer(operation_mode::LOCAL),
                        ),
                        Varbind::new(at(OidName::Ug405OperationModeTimeout), Value::Integer(0)),
                    ],
                    Dialect::Ug405 => vec![
                        Varbind::new(
                            at(OidName::Ug405OperationMode),
                            Value::Integer(operation_mode::UTC_CONTROL),
                        ),
                        Varbind::new(at(OidName::Ug405OperationModeTimeout), Value::Integer(1)),
                        Varbind::new(at(OidName::Ug405ControlFn), wire),
                    ],
                }
            }
            (Dialect::Stcip, Command::Flash(on)) => {
                vec![Varbind::new(at(OidName::SwarcoCommandFlash), stcip_switch(on))]
            }
            (Dialect::Stcip, Command::Dark(on)) => {
                vec![Varbind::new(at(OidName::SwarcoCommandDark), stcip_switch(on))]
            }
            (Dialect::Stcip, Command::AllRed(on)) => {
                vec![Varbind::new(at(OidName::PotokSCommandAllRed), stcip_switch(on))]
            }
            (Dialect::Stcip, Command::RestartProgram) => {
                vec![Varbind::new(at(OidName::PotokSCommandRestart), Value::Unsigned(1))]
            }
            (Dialect::Ug405, Command::Flash(on)) => {
                vec![Varbind::new(at(OidName::Ug405ControlFf), Value::Integer(i64::from(on)))]
            }
            (Dialect::Ug405, Command::Dark(on)) => {
                vec![Varbind::new(at(OidName::Ug405ControlLo), Value::Integer(i64::from(on)))]
            }
            (Dialect::Ug405, Command::RestartProgram) => {
                vec![Varbind::new(at(OidName::PotokPControlRestart), Value::Integer(1))]
            }
            (Dialect::Ug405, Command::AllRed(_)) => {
                return Err(Error::UnsupportedCommand {
                    command: command.to_string(),
                    profile,
                });
            }
        };
        Ok(varbinds)
    }
}

/// Включение/выключение в STCIP: 2 включить, 0 снять.
fn stcip_switch(on: bool) -> Value {
    Value::Unsigned(if on { 2 } else { 0 })
}

fn scn_for(profile: ControllerProfile, scn: Option<&Scn>) -> Result<Option<&Scn>> {
    match (profile.spec().dialect, scn) {
        (Dialect::Stcip, _) => Ok(None),
        (Dialect::Ug405, Some(scn)) => Ok(Some(scn)),
        (Dialect::Ug405, None) => Err(Error::decode(format!(
            "профиль {profile} требует SCN для адресации"
        ))),
    }
}

fn address(catalog: &OidCatalog, oid: &Oid, scn: Option<&Scn>) -> Oid {
    match scn {
        Some(scn) if catalog.is_scn_required(oid) => oid.with_suffix(scn.arcs()),
        _ => oid.clone(),
    }
}

//! Разбор ответов контроллера в именованные поля.
//!
//! Первый проход раскладывает varbind'ы по таблице полей профиля, второй
//! вычисляет производные поля (режим работы, состояние оборудования).
//! Неразобранное значение попадает в результат как есть, неизвестный OID
//! попадает под своим же именем. Фатален только пустой результат.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Value as Json, json};

use super::profile::{ControllerProfile, Decode, FieldSpec, fields};
use crate::error::{Error, Result};
use crate::snmp::{Oid, OidCatalog, Scn, Varbind};

/// Поля ответа: имя → значение.
pub type FieldMap = BTreeMap<String, Json>;

/// Режим работы контроллера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperatingMode {
    /// Жёсткий план.
    #[serde(rename = "FT")]
    FixedTime,
    /// Адаптивное управление от детекторов.
    #[serde(rename = "VA")]
    VehicleActuated,
    #[serde(rename = "MANUAL")]
    Manual,
    /// Управление из центра.
    #[serde(rename = "CENTRAL")]
    Central,
    /// Координация.
    #[serde(rename = "SYNC")]
    Sync,
}

impl OperatingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingMode::FixedTime => "FT",
            OperatingMode::VehicleActuated => "VA",
            OperatingMode::Manual => "MANUAL",
            OperatingMode::Central => "CENTRAL",
            OperatingMode::Sync => "SYNC",
        }
    }
}

/// Разбор ответов одного профиля с учётом SCN хоста.
#[derive(Debug)]
pub struct ResponseParser {
    profile: ControllerProfile,
    dispatch: HashMap<Oid, &'static FieldSpec>,
}

impl ResponseParser {
    pub fn new(catalog: &OidCatalog, profile: ControllerProfile, scn: Option<&Scn>) -> Self {
        let spec = profile.spec();
        let dispatch = spec
            .state_fields
            .iter()
            .chain(spec.command_fields)
            .map(|field| {
                let base = catalog.oid(field.object);
                let oid = match scn {
                    Some(scn) if field.object.scn_required() => base.with_suffix(scn.arcs()),
                    _ => base.clone(),
                };
                (oid, field)
            })
            .collect();
        Self { profile, dispatch }
    }

    /// Ответ на чтение состояния: поля плюс производные.
    pub fn parse_state(&self, varbinds: &[Varbind]) -> Result<FieldMap> {
        let mut data = self.decode_fields(varbinds)?;
        let extras = (self.profile.spec().extras)(&data);
        data.extend(extras);
        Ok(data)
    }

    /// Ответ на SET: только поля, без производных.
    pub fn parse_reply(&self, varbinds: &[Varbind]) -> Result<FieldMap> {
        self.decode_fields(varbinds)
    }

    fn decode_fields(&self, varbinds: &[Varbind]) -> Result<FieldMap> {
        let mut data = FieldMap::new();
        for varbind in varbinds {
            if varbind.value.is_exception() {
                tracing::debug!(target: "tlc_snmp::parser", { oid = %varbind.oid, value = %varbind.value }, "объект отсутствует на агенте");
                continue;
            }
            let raw = varbind.value.to_text();
            match self.dispatch.get(&varbind.oid) {
                Some(field) => {
                    data.insert(field.field.to_string(), self.decode(field, &raw));
                }
                None => {
                    data.insert(varbind.oid.to_string(), Json::String(raw));
                }
            }
        }

        if data.is_empty() {
            return Err(Error::ProtocolMismatch {
                profile: self.profile,
            });
        }
        Ok(data)
    }

    fn decode(&self, field: &FieldSpec, raw: &str) -> Json {
        let decoded = match field.decode {
            Decode::Stage => self
                .profile
                .spec()
                .codec
                .decode_from_get(raw)
                .ok()
                .map(Json::from),
            Decode::Integer => parse_int(raw).map(Json::from),
            Decode::EquipmentStatus => parse_int(raw)
                .and_then(equipment_status_name)
                .map(Json::from),
            Decode::SoftFlags180To181 => soft_flags_180_181(raw).map(Json::from),
        };
        decoded.unwrap_or_else(|| {
            tracing::debug!(target: "tlc_snmp::parser", { field = field.field, raw = %raw }, "значение не разобрано, передано как есть");
            Json::String(raw.to_string())
        })
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Состояние оборудования STCIP.
fn equipment_status_name(code: i64) -> Option<&'static str> {
    let name = match code {
        0 => "noInformation",
        1 => "workingProperly",
        2 => "powerUp",
        3 => "dark",
        4 => "flash",
        5 => "partialFlash",
        6 => "allRed",
        _ => return None,
    };
    Some(name)
}

/// Символы программных входов 180 и 181 (нумерация с единицы).
fn soft_flags_180_181(raw: &str) -> Option<String> {
    raw.get(179..181).map(str::to_string)
}

fn int(data: &FieldMap, name: &str) -> Option<i64> {
    match data.get(name)? {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => parse_int(s),
        _ => None,
    }
}

fn text<'a>(data: &'a FieldMap, name: &str) -> Option<&'a str> {
    data.get(name)?.as_str()
}

fn mode_field(mode: Option<OperatingMode>) -> FieldMap {
    let value = mode.map_or(Json::Null, |m| json!(m.as_str()));
    FieldMap::from([(fields::CURRENT_MODE.to_string(), value)])
}

/// Swarco STCIP: первое совпавшее правило.
pub fn swarco_stcip_mode(data: &FieldMap) -> Option<OperatingMode> {
    let plan = int(data, fields::CURRENT_PLAN);
    let source = int(data, fields::PLAN_SOURCE);
    // Контроллеры без объекта жёсткого плана считаются не в жёстком плане
    let fixed_time = int(data, fields::FIXED_TIME_STATUS).unwrap_or(0);
    // Без разобранных флагов в поле лежит сырая строка, она не флаги
    let soft_flags =
        text(data, fields::SOFT_FLAG_180_181).filter(|flags| flags.chars().count() == 2);
    let detectors = int(data, fields::NUM_DETECTORS);

    if plan == Some(16) && source == Some(3) {
        return Some(OperatingMode::Central);
    }
    if fixed_time == 0 && soft_flags == Some("00") && detectors.is_some_and(|n| n > 0) {
        return Some(OperatingMode::VehicleActuated);
    }
    if source == Some(7)
        && (fixed_time == 1
            || soft_flags.is_some_and(|flags| flags.contains('1'))
            || detectors == Some(0))
    {
        return Some(OperatingMode::FixedTime);
    }
    match (plan, source) {
        (Some(15), Some(3)) => Some(OperatingMode::Manual),
        (Some(13), Some(3 | 6)) => Some(OperatingMode::Sync),
        _ => None,
    }
}

pub fn swarco_stcip_extras(data: &FieldMap) -> FieldMap {
    mode_field(swarco_stcip_mode(data))
}

/// Поток-S: режим берётся из одного поля.
pub fn potok_stcip_mode(data: &FieldMap) -> Option<OperatingMode> {
    match int(data, fields::STATUS_MODE)? {
        8 => Some(OperatingMode::VehicleActuated),
        10 => Some(OperatingMode::Manual),
        11 => Some(OperatingMode::Central),
        12 => Some(OperatingMode::FixedTime),
        _ => None,
    }
}

pub fn potok_stcip_extras(data: &FieldMap) -> FieldMap {
    mode_field(potok_stcip_mode(data))
}

/// Поток-P: режим по режиму работы, адаптиву, детекторам и флагу ручного.
pub fn potok_ug405_mode(data: &FieldMap) -> Option<OperatingMode> {
    let operation_mode = int(data, fields::OPERATION_MODE);
    let local_adaptive = int(data, fields::LOCAL_ADAPTIVE_STATUS);
    let detectors = int(data, fields::NUM_DETECTORS);
    let det_faults = int(data, fields::HAS_DET_FAULTS);
    let manual = int(data, fields::IS_MODE_MAN);

    match (operation_mode, local_adaptive, detectors, det_faults) {
        (Some(1), Some(1), Some(n), Some(0)) if n > 0 => Some(OperatingMode::VehicleActuated),
        (Some(1), Some(0), Some(0), _) => Some(OperatingMode::FixedTime),
        (Some(1), Some(0), Some(n), _) if n > 0 => Some(OperatingMode::FixedTime),
        (Some(3), ..) => Some(OperatingMode::Central),
        _ if manual == Some(1) => Some(OperatingMode::Manual),
        _ => None,
    }
}

/// Поток-P: состояние оборудования по флагам тёмного и жёлтого мигания.
pub fn potok_ug405_status(data: &FieldMap) -> Option<&'static str> {
    let dark = int(data, fields::STATUS_DARK);
    let flash = int(data, fields::STATUS_FLASH);
    match (dark, flash) {
        (Some(0), Some(0)) => Some("3-light"),
        (_, Some(1)) => Some("flash"),
        (Some(1), _) => Some("dark"),
        _ => None,
    }
}

pub fn potok_ug405_extras(data: &FieldMap) -> FieldMap {
    let mut extras = mode_field(potok_ug405_mode(data));
    extras.insert(
        fields::CURRENT_STATUS.to_string(),
        potok_ug405_status(data).map_or(Json::Null, Json::from),
    );
    extras
}

/// Peek UG405: вывод режима не реализован, производных полей нет.
pub fn peek_ug405_extras(_data: &FieldMap) -> FieldMap {
    FieldMap::new()
}

//! Каталог OID для диалектов STCIP и UG405.
//!
//! Набор объектов закрыт (`OidName`), значения берутся из встроенной таблицы
//! или из YAML-файла. Файл должен перечислять все объекты: при отсутствии
//! хотя бы одного или при кривом OID каталог не собирается.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::oid::{Oid, parse_oid};
use crate::controller::ControllerProfile;
use crate::error::{Error, Result};

macro_rules! oid_names {
    ($( $variant:ident => $name:literal, $default:literal, scn = $scn:literal; )+) => {
        /// Объект MIB, известный движку.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum OidName {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl OidName {
            pub const ALL: &'static [OidName] = &[$(OidName::$variant,)+];

            /// Имя объекта в MIB.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(OidName::$variant => $name,)+
                }
            }

            /// OID встроенной таблицы.
            pub fn default_oid(self) -> &'static str {
                match self {
                    $(OidName::$variant => $default,)+
                }
            }

            /// Адресуется ли объект с суффиксом SCN.
            pub fn scn_required(self) -> bool {
                match self {
                    $(OidName::$variant => $scn,)+
                }
            }

            pub fn from_name(name: &str) -> Option<OidName> {
                match name {
                    $($name => Some(OidName::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

oid_names! {
    // STCIP, общие для Swarco и Поток
    SwarcoStatusEquipment => "swarcoUTCStatusEquipment", "1.3.6.1.4.1.1618.3.6.2.1.2.0", scn = false;
    SwarcoPhaseStatus => "swarcoUTCTrafftechPhaseStatus", "1.3.6.1.4.1.1618.3.7.2.11.2.0", scn = false;
    SwarcoPhaseCommand => "swarcoUTCTrafftechPhaseCommand", "1.3.6.1.4.1.1618.3.7.2.11.1.0", scn = false;
    SwarcoPlanCurrent => "swarcoUTCTrafftechPlanCurrent", "1.3.6.1.4.1.1618.3.7.2.1.2.0", scn = false;
    SwarcoPlanSource => "swarcoUTCTrafftechPlanSource", "1.3.6.1.4.1.1618.3.7.2.1.3.0", scn = false;
    SwarcoFixedTimeStatus => "swarcoUTCTrafftechFixedTimeStatus", "1.3.6.1.4.1.1618.3.7.2.2.2.0", scn = false;
    SwarcoDetectorQty => "swarcoUTCDetectorQty", "1.3.6.1.4.1.1618.3.3.2.2.2.0", scn = false;
    SwarcoSoftIoStatus => "swarcoSoftIOStatus", "1.3.6.1.4.1.1618.5.1.1.1.1.0", scn = false;
    SwarcoCommandFlash => "swarcoUTCCommandFlash", "1.3.6.1.4.1.1618.3.2.2.1.1.0", scn = false;
    SwarcoCommandDark => "swarcoUTCCommandDark", "1.3.6.1.4.1.1618.3.2.2.2.1.0", scn = false;
    // STCIP, расширения Поток-S
    PotokSStatusMode => "potokS_UTCStatusMode", "1.3.6.1.4.1.1618.3.6.2.2.2.0", scn = false;
    PotokSCommandAllRed => "potokS_UTCCommandAllRed", "1.3.6.1.4.1.1618.3.2.2.4.1.0", scn = false;
    PotokSCommandRestart => "potokS_UTCCommandRestartProgramm", "1.3.6.1.4.1.1618.3.2.2.3.1.0", scn = false;
    // UG405, скаляры
    Ug405OperationMode => "utcType2OperationMode", "1.3.6.1.4.1.13267.3.2.4.1.0", scn = false;
    Ug405OperationModeTimeout => "utcType2OperationModeTimeout", "1.3.6.1.4.1.13267.3.2.2.4.0", scn = false;
    Ug405ScootDetectorCount => "utcType2ScootDetectorCount", "1.3.6.1.4.1.13267.3.2.1.3.0", scn = false;
    Ug405SiteId => "utcReplySiteID", "1.3.6.1.4.1.13267.3.2.3.2.0", scn = false;
    // UG405, строки таблиц управления и ответов (индекс = SCN)
    Ug405ControlFn => "utcControlFn", "1.3.6.1.4.1.13267.3.2.4.2.1.5", scn = true;
    Ug405ControlLo => "utcControlLO", "1.3.6.1.4.1.13267.3.2.4.2.1.11", scn = true;
    Ug405ControlFf => "utcControlFF", "1.3.6.1.4.1.13267.3.2.4.2.1.20", scn = true;
    Ug405ReplyGn => "utcReplyGn", "1.3.6.1.4.1.13267.3.2.5.1.1.3", scn = true;
    Ug405ReplyDf => "utcReplyDF", "1.3.6.1.4.1.13267.3.2.5.1.1.5", scn = true;
    Ug405ReplyMc => "utcReplyMC", "1.3.6.1.4.1.13267.3.2.5.1.1.15", scn = true;
    Ug405ReplyFr => "utcReplyFR", "1.3.6.1.4.1.13267.3.2.5.1.1.36", scn = true;
    // UG405, расширения Поток-P
    PotokPReplyPlanStatus => "potokP_utcReplyPlanStatus", "1.3.6.1.4.1.13267.3.2.5.1.1.24", scn = true;
    PotokPReplyPlanSource => "potokP_utcReplyPlanSource", "1.3.6.1.4.1.13267.3.2.5.1.1.25", scn = true;
    PotokPReplyDarkStatus => "potokP_utcReplyDarkStatus", "1.3.6.1.4.1.13267.3.2.5.1.1.45", scn = true;
    PotokPReplyLocalAdaptiv => "potokP_utcReplyLocalAdaptiv", "1.3.6.1.4.1.13267.3.2.5.1.1.21", scn = true;
    PotokPControlRestart => "potokP_utcControRestartProgramm", "1.3.6.1.4.1.13267.3.2.4.2.1.31", scn = true;
}

impl fmt::Display for OidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static BUILTIN: LazyLock<Arc<OidCatalog>> = LazyLock::new(|| {
    let entries = OidName::ALL
        .iter()
        .map(|name| (name.as_str().to_string(), name.default_oid().to_string()));
    // Встроенная таблица проверяется тестом `builtin_table_is_complete`
    Arc::new(OidCatalog::from_entries(entries).expect("встроенная таблица OID валидна"))
});

/// Неизменяемый после старта реестр OID.
#[derive(Debug, Clone)]
pub struct OidCatalog {
    oids: BTreeMap<OidName, Oid>,
    scn_required: HashSet<Oid>,
}

impl OidCatalog {
    /// Встроенный каталог.
    pub fn builtin() -> Arc<OidCatalog> {
        Arc::clone(&BUILTIN)
    }

    /// Собирает каталог из пар (имя объекта, OID).
    ///
    /// Ошибка, если не хватает хотя бы одного объекта или OID не парсится.
    /// Неизвестные имена пропускаются с предупреждением.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut oids = BTreeMap::new();
        for (name, raw) in entries {
            let Some(key) = OidName::from_name(name.trim()) else {
                tracing::warn!(target: "tlc_snmp::catalog", { name = %name }, "неизвестный объект в каталоге OID, пропущен");
                continue;
            };
            let oid = parse_oid(&raw)?;
            oids.insert(key, oid);
        }

        let missing: Vec<String> = OidName::ALL
            .iter()
            .filter(|name| !oids.contains_key(*name))
            .map(|name| name.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingOids(missing));
        }

        let scn_required = oids
            .iter()
            .filter(|(name, _)| name.scn_required())
            .map(|(_, oid)| oid.clone())
            .collect();

        Ok(Self { oids, scn_required })
    }

    /// Загружает каталог из YAML вида `имяОбъекта: 1.3.6.1...`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Не удалось прочитать каталог OID: {}", path.display()))?;
        let entries: HashMap<String, String> =
            serde_yml::from_str(&content).context("Не удалось распарсить YAML каталога OID")?;

        let catalog = Self::from_entries(entries)
            .with_context(|| format!("Каталог OID {} невалиден", path.display()))?;
        Ok(catalog)
    }

    pub fn oid(&self, name: OidName) -> &Oid {
        // Полнота гарантирована конструктором
        &self.oids[&name]
    }

    /// Объекты состояния профиля в порядке опроса (без суффикса SCN).
    pub fn state_oids(&self, profile: ControllerProfile) -> Vec<&Oid> {
        profile
            .spec()
            .state_fields
            .iter()
            .map(|field| self.oid(field.object))
            .collect()
    }

    /// Требует ли OID суффикса SCN.
    pub fn is_scn_required(&self, oid: &Oid) -> bool {
        self.scn_required.contains(oid)
    }
}

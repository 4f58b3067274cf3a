use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Идентификатор объекта в точечной нотации.
///
/// Хранится как последовательность дуг, печатается без ведущей точки.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    arcs: Vec<u64>,
}

impl Oid {
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// OID с дописанным суффиксом (например, SCN в проводной форме).
    pub fn with_suffix(&self, suffix: &[u64]) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(suffix);
        Oid { arcs }
    }
}

/// Парсит строку OID.
///
/// Допускает ведущую точку (".1.3.6...") и пробелы по краям.
pub fn parse_oid(s: &str) -> Result<Oid> {
    let arcs: std::result::Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let arcs = arcs.map_err(|e| Error::InvalidOid {
        input: s.to_string(),
        reason: e.to_string(),
    })?;
    if arcs.len() < 2 {
        return Err(Error::InvalidOid {
            input: s.to_string(),
            reason: "нужно минимум две дуги".to_string(),
        });
    }
    Ok(Oid { arcs })
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_oid(s)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{arc}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for Oid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_oid(&s).map_err(serde::de::Error::custom)
    }
}

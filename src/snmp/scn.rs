//! SCN: суффикс адресации объектов UG405, получаемый из идентификатора объекта.
//!
//! Символьная форма `CO1111`, проводная `.1.6.67.79.49.49.49.49`:
//! единица, длина строки, затем ASCII-коды символов.

use std::fmt;

use crate::error::{Error, Result};

/// Префикс, с которым идентификатор объекта становится SCN.
pub const SITE_PREFIX: &str = "CO";

/// SCN в обеих формах.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scn {
    chars: String,
    wire: String,
    arcs: Vec<u64>,
}

impl Scn {
    /// SCN из символьной формы.
    pub fn from_chars(chars: &str) -> Result<Self> {
        let chars = chars.trim();
        if chars.is_empty() || !chars.is_ascii() {
            return Err(Error::decode(format!(
                "SCN '{chars}' должен быть непустой ASCII-строкой"
            )));
        }
        let wire = encode(chars);
        // Контроль: проводная форма обязана разворачиваться обратно
        let back = decode(&wire)?;
        if back != chars {
            return Err(Error::decode(format!(
                "SCN '{chars}' не прошёл проверку кодирования: получено '{back}'"
            )));
        }
        let arcs = wire_arcs(chars);
        Ok(Self {
            chars: chars.to_string(),
            wire,
            arcs,
        })
    }

    /// SCN из проводной формы.
    pub fn from_wire(wire: &str) -> Result<Self> {
        let chars = decode(wire)?;
        Self::from_chars(&chars)
    }

    /// SCN из ответа контроллера: проводная форма, голый номер или готовый SCN.
    pub fn from_reply(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.starts_with(".1.") {
            Self::from_wire(raw)
        } else if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Self::from_chars(&with_site_prefix(raw))
        } else {
            Self::from_chars(raw)
        }
    }

    pub fn chars(&self) -> &str {
        &self.chars
    }

    pub fn wire(&self) -> &str {
        &self.wire
    }

    /// Проводная форма как дуги OID, для дописывания к базовому OID.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }
}

impl fmt::Display for Scn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.chars)
    }
}

fn wire_arcs(chars: &str) -> Vec<u64> {
    let mut arcs = Vec::with_capacity(chars.len() + 2);
    arcs.push(1);
    arcs.push(chars.len() as u64);
    arcs.extend(chars.bytes().map(u64::from));
    arcs
}

/// Кодирует символьную форму в проводную.
pub fn encode(chars: &str) -> String {
    wire_arcs(chars)
        .iter()
        .map(|arc| format!(".{arc}"))
        .collect()
}

/// Декодирует проводную форму в символьную.
///
/// Поле длины обязано совпасть с числом символов.
pub fn decode(wire: &str) -> Result<String> {
    let arcs: Vec<&str> = wire.trim().split('.').filter(|p| !p.is_empty()).collect();
    let [_, len, codes @ ..] = arcs.as_slice() else {
        return Err(Error::decode(format!("SCN '{wire}': слишком короткая проводная форма")));
    };
    let len: usize = len
        .parse()
        .map_err(|_| Error::decode(format!("SCN '{wire}': поле длины '{len}' не число")))?;

    let chars = codes
        .iter()
        .map(|code| {
            code.parse::<u8>()
                .ok()
                .filter(u8::is_ascii)
                .map(char::from)
                .ok_or_else(|| Error::decode(format!("SCN '{wire}': '{code}' не ASCII-код")))
        })
        .collect::<Result<String>>()?;

    if chars.len() != len {
        return Err(Error::decode(format!(
            "SCN '{wire}': длина {len} не совпадает с числом символов {}",
            chars.len()
        )));
    }
    Ok(chars)
}

/// Дописывает префикс `CO` к голому номеру объекта.
pub fn with_site_prefix(numeric_id: &str) -> String {
    format!("{SITE_PREFIX}{}", numeric_id.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_reference_site() {
        assert_eq!(encode("CO1111"), ".1.6.67.79.49.49.49.49");
        assert_eq!(decode(".1.6.67.79.49.49.49.49").unwrap(), "CO1111");
    }

    #[test]
    fn length_mismatch_is_a_decode_error() {
        assert!(matches!(decode(".1.5.67.79.49.49.49.49"), Err(Error::Decode(_))));
        assert!(matches!(decode(".1"), Err(Error::Decode(_))));
        assert!(matches!(decode(".1.2.67.999"), Err(Error::Decode(_))));
    }

    #[test]
    fn site_prefix_is_applied_to_numeric_ids() {
        assert_eq!(with_site_prefix("2390"), "CO2390");
        assert_eq!(Scn::from_reply("2390").unwrap().chars(), "CO2390");
        assert_eq!(Scn::from_reply("CO2390").unwrap().chars(), "CO2390");
        assert_eq!(
            Scn::from_reply(".1.6.67.79.50.51.57.48").unwrap().chars(),
            "CO2390"
        );
    }

    #[test]
    fn scn_exposes_oid_arcs() {
        let scn = Scn::from_chars("CO1111").unwrap();
        assert_eq!(scn.arcs(), &[1, 6, 67, 79, 49, 49, 49, 49]);
        assert_eq!(scn.wire(), ".1.6.67.79.49.49.49.49");
    }

    #[test]
    fn empty_or_non_ascii_is_rejected() {
        assert!(Scn::from_chars("").is_err());
        assert!(Scn::from_chars("СО1111").is_err());
    }

    proptest! {
        #[test]
        fn wire_form_round_trips(chars in "[A-Z0-9]{1,12}") {
            let wire = encode(&chars);
            prop_assert_eq!(decode(&wire).unwrap(), chars);
        }
    }
}

//! SNMP-слой: OID, каталог объектов, кодеки SCN и фаз, varbind'ы, транспорт.

pub mod catalog;
pub mod oid;
pub mod scn;
pub mod stage;
pub mod transport;
pub mod v2c;
pub mod varbinds;

#[cfg(test)]
pub(crate) mod mock;

pub use catalog::{OidCatalog, OidName};
pub use oid::{Oid, parse_oid};
pub use scn::Scn;
pub use stage::StageCodec;
pub use transport::{RequestSettings, SnmpTransport, TransportReply};
pub use v2c::V2cTransport;
pub use varbinds::{Value, Varbind, VarbindBuilder};

//! SNMP-движок для контроллеров дорожного движения.
//!
//! Опрос состояния и управление фазами контроллеров Swarco и Поток (STCIP),
//! Поток и Peek (UG405). Точка входа: [`Host`].

pub mod config;
pub mod controller;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod snmp;

pub use controller::{Command, ControllerProfile, Dialect, Host, HostResponse, HostState};
pub use error::{Error, Result};
pub use snmp::{OidCatalog, RequestSettings, SnmpTransport, V2cTransport};

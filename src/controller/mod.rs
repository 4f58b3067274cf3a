//! Контроллеры: профили, разбор ответов и последовательность запросов к хосту.

pub mod host;
pub mod parser;
pub mod precondition;
pub mod profile;
pub mod response;

pub use host::{Host, HostState};
pub use parser::{FieldMap, OperatingMode, ResponseParser};
pub use profile::{Command, ControllerProfile, Dialect, ProfileSpec, fields};
pub use response::{HostResponse, ResponseAccumulator};

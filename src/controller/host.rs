//! Хост: один контроллер и последовательность запросов к нему.
//!
//! Операция идёт строго последовательно:
//! `Idle → ResolvingDependencies → Requesting → Parsing → Done | Failed`.
//! Точки приостановки только вызовы транспорта. Ошибка любого вызова
//! завершает операцию, повторов на этом уровне нет.

use std::net::Ipv4Addr;
use std::sync::Arc;

use serde::Serialize;

use super::parser::{FieldMap, ResponseParser};
use super::precondition::ensure_utc_control;
use super::profile::{Command, ControllerProfile};
use super::response::{HostResponse, ResponseAccumulator};
use crate::error::{Error, Result};
use crate::snmp::{
    OidCatalog, OidName, RequestSettings, Scn, SnmpTransport, Varbind, VarbindBuilder,
};

/// Состояние последней операции хоста.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HostState {
    Idle,
    ResolvingDependencies,
    Requesting,
    Parsing,
    Done,
    Failed,
}

pub struct Host<T> {
    ip: Ipv4Addr,
    profile: ControllerProfile,
    transport: T,
    catalog: Arc<OidCatalog>,
    settings: RequestSettings,
    /// Живёт всё время жизни хоста, повторно не обнаруживается.
    scn: Option<Scn>,
    builder: VarbindBuilder,
    accumulator: ResponseAccumulator,
    state: HostState,
}

impl<T: SnmpTransport> Host<T> {
    pub fn new(
        profile: ControllerProfile,
        ip: Ipv4Addr,
        transport: T,
        catalog: Arc<OidCatalog>,
    ) -> Self {
        Self {
            ip,
            profile,
            transport,
            catalog,
            settings: RequestSettings::default(),
            scn: None,
            builder: VarbindBuilder::new(),
            accumulator: ResponseAccumulator::new(),
            state: HostState::Idle,
        }
    }

    pub fn swarco_stcip(ip: Ipv4Addr, transport: T) -> Self {
        Self::new(ControllerProfile::SwarcoStcip, ip, transport, OidCatalog::builtin())
    }

    pub fn potok_stcip(ip: Ipv4Addr, transport: T) -> Self {
        Self::new(ControllerProfile::PotokStcip, ip, transport, OidCatalog::builtin())
    }

    /// Поток UG405. Известный SCN (или голый номер объекта) избавляет от обнаружения.
    pub fn potok_ug405(ip: Ipv4Addr, transport: T, scn: Option<&str>) -> Result<Self> {
        Self::new(ControllerProfile::PotokUg405, ip, transport, OidCatalog::builtin())
            .with_known_scn(scn)
    }

    pub fn peek_ug405(ip: Ipv4Addr, transport: T, scn: Option<&str>) -> Result<Self> {
        Self::new(ControllerProfile::PeekUg405, ip, transport, OidCatalog::builtin())
            .with_known_scn(scn)
    }

    pub fn with_settings(mut self, settings: RequestSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Задаёт SCN заранее. Для STCIP игнорируется.
    pub fn with_known_scn(mut self, scn: Option<&str>) -> Result<Self> {
        if let Some(raw) = scn {
            if self.profile.requires_scn() {
                self.scn = Some(Scn::from_reply(raw)?);
            }
        }
        Ok(self)
    }

    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub fn profile(&self) -> ControllerProfile {
        self.profile
    }

    pub fn scn(&self) -> Option<&Scn> {
        self.scn.as_ref()
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    /// Чтение текущего состояния.
    pub async fn get_states(&mut self) -> HostResponse {
        self.begin();
        let result = self.run_get_states().await;
        self.finish(result)
    }

    /// Вызов фазы. 0 возвращает контроллер в локальный режим.
    pub async fn set_stage(&mut self, stage: u32) -> HostResponse {
        self.send_command(Command::Stage(stage)).await
    }

    pub async fn send_command(&mut self, command: Command) -> HostResponse {
        self.begin();
        let result = self.run_command(command).await;
        self.finish(result)
    }

    async fn run_get_states(&mut self) -> Result<FieldMap> {
        self.transition(HostState::ResolvingDependencies);
        self.resolve_scn().await?;

        self.transition(HostState::Requesting);
        let request = self
            .builder
            .current_state(&self.catalog, self.profile, self.scn.as_ref())?;
        let reply = self
            .transport
            .get(&request, self.settings.timeout, self.settings.retries)
            .await
            .into_result()?;

        self.transition(HostState::Parsing);
        self.parser().parse_state(&reply)
    }

    async fn run_command(&mut self, command: Command) -> Result<FieldMap> {
        let spec = self.profile.spec();
        if !spec.supports(command) {
            return Err(Error::UnsupportedCommand {
                command: command.to_string(),
                profile: self.profile,
            });
        }
        if let Command::Stage(stage) = command {
            if stage > self.profile.max_stage() {
                return Err(Error::StageOutOfRange {
                    stage,
                    max: self.profile.max_stage(),
                    profile: self.profile,
                });
            }
        }

        self.transition(HostState::ResolvingDependencies);
        self.resolve_scn().await?;
        if spec.mode_precondition {
            let operation_mode = self.catalog.oid(OidName::Ug405OperationMode);
            let writes = ensure_utc_control(&self.transport, operation_mode, self.settings).await?;
            tracing::debug!(target: "tlc_snmp::host", { ip = %self.ip, writes = ?writes }, "режим UTC подтверждён");
        }

        self.transition(HostState::Requesting);
        let request = self
            .builder
            .command(&self.catalog, self.profile, self.scn.as_ref(), command)?;
        tracing::info!(target: "tlc_snmp::host", { ip = %self.ip, command = %command }, "отправка команды");
        let reply = self
            .transport
            .set(&request, self.settings.timeout, self.settings.retries)
            .await
            .into_result()?;

        self.transition(HostState::Parsing);
        self.parser().parse_reply(&reply)
    }

    /// Обнаружение SCN для UG405, если он ещё не известен.
    async fn resolve_scn(&mut self) -> Result<()> {
        if !self.profile.requires_scn() || self.scn.is_some() {
            return Ok(());
        }

        let site_id = self.catalog.oid(OidName::Ug405SiteId).clone();
        let reply = self
            .transport
            .get(
                &[Varbind::get(site_id.clone())],
                self.settings.timeout,
                self.settings.retries,
            )
            .await
            .into_result()?;

        let raw = reply
            .iter()
            .find(|vb| vb.oid == site_id && !vb.value.is_exception())
            .map(|vb| vb.value.to_text())
            .ok_or_else(|| Error::decode("в ответе нет идентификатора объекта для SCN"))?;
        let scn = Scn::from_reply(&raw)?;

        tracing::info!(target: "tlc_snmp::host", { ip = %self.ip, scn = %scn }, "SCN обнаружен");
        self.scn = Some(scn);
        Ok(())
    }

    fn parser(&self) -> ResponseParser {
        ResponseParser::new(&self.catalog, self.profile, self.scn.as_ref())
    }

    fn begin(&mut self) {
        self.accumulator.reset();
        self.state = HostState::Idle;
    }

    fn transition(&mut self, next: HostState) {
        tracing::debug!(target: "tlc_snmp::host", { ip = %self.ip, profile = ?self.profile, from = ?self.state, to = ?next }, "переход состояния");
        self.state = next;
    }

    fn finish(&mut self, result: Result<FieldMap>) -> HostResponse {
        match result {
            Ok(data) => {
                self.accumulator.set_data(data);
                self.transition(HostState::Done);
            }
            Err(e) => {
                tracing::warn!(target: "tlc_snmp::host", { ip = %self.ip, profile = ?self.profile, error = %e }, "операция не выполнена");
                self.accumulator.add_error(&e);
                self.transition(HostState::Failed);
            }
        }
        self.accumulator.build(self.profile.dialect(), self.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fields;
    use crate::snmp::mock::{MockTransport, Operation};
    use crate::snmp::{TransportReply, Value};
    use serde_json::json;
    use std::time::Duration;

    const IP: Ipv4Addr = Ipv4Addr::new(10, 45, 154, 16);

    fn catalog() -> Arc<OidCatalog> {
        OidCatalog::builtin()
    }

    fn vb(name: OidName, value: Value) -> Varbind {
        Varbind::new(catalog().oid(name).clone(), value)
    }

    fn scn_vb(name: OidName, scn: &Scn, value: Value) -> Varbind {
        Varbind::new(catalog().oid(name).with_suffix(scn.arcs()), value)
    }

    fn soft_io_zeros() -> Value {
        Value::OctetString(vec![b'0'; 200])
    }

    #[tokio::test]
    async fn swarco_get_states() {
        let mock = MockTransport::new();
        mock.queue_ok(vec![
            vb(OidName::SwarcoStatusEquipment, Value::Integer(1)),
            vb(OidName::SwarcoPhaseStatus, Value::Unsigned(3)),
            vb(OidName::SwarcoPlanCurrent, Value::Unsigned(2)),
            vb(OidName::SwarcoDetectorQty, Value::Unsigned(5)),
            vb(OidName::SwarcoSoftIoStatus, soft_io_zeros()),
        ]);
        let mut host = Host::swarco_stcip(IP, mock.clone());

        let response = host.get_states().await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(response.protocol, "STCIP");
        assert_eq!(response.ip_address, "10.45.154.16");
        assert_eq!(response.data[fields::CURRENT_STAGE], json!(2));
        assert_eq!(response.data[fields::CURRENT_MODE], json!("VA"));
        assert_eq!(host.state(), HostState::Done);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].operation, Operation::Get);
        assert_eq!(
            requests[0].varbinds.len(),
            ControllerProfile::SwarcoStcip.spec().state_fields.len()
        );
    }

    #[tokio::test]
    async fn transport_settings_reach_every_call() {
        let mock = MockTransport::new();
        mock.queue_echo();
        let settings = RequestSettings {
            timeout: Duration::from_millis(750),
            retries: 2,
        };
        let mut host = Host::potok_stcip(IP, mock.clone()).with_settings(settings);

        let response = host.set_stage(4).await;
        assert!(response.is_ok());
        assert_eq!(response.data[fields::SET_STAGE], json!(4));
        let request = &mock.requests()[0];
        assert_eq!(request.timeout, Duration::from_millis(750));
        assert_eq!(request.retries, 2);
        assert_eq!(request.varbinds[0].value, Value::Unsigned(5));
    }

    #[tokio::test]
    async fn ug405_discovers_scn_once() {
        let mock = MockTransport::new();
        let scn = Scn::from_chars("CO1111").unwrap();
        let state = vec![
            vb(OidName::Ug405OperationMode, Value::Integer(1)),
            scn_vb(OidName::Ug405ReplyGn, &scn, Value::OctetString(vec![0x04])),
            scn_vb(OidName::PotokPReplyLocalAdaptiv, &scn, Value::Integer(1)),
            scn_vb(OidName::Ug405ReplyDf, &scn, Value::Integer(0)),
            scn_vb(OidName::Ug405ReplyFr, &scn, Value::Integer(0)),
            scn_vb(OidName::PotokPReplyDarkStatus, &scn, Value::Integer(0)),
            vb(OidName::Ug405ScootDetectorCount, Value::Integer(12)),
        ];
        mock.queue_ok(vec![vb(OidName::Ug405SiteId, Value::OctetString(b"1111".to_vec()))]);
        mock.queue_ok(state.clone());
        mock.queue_ok(state);
        let mut host = Host::potok_ug405(IP, mock.clone(), None).unwrap();

        let first = host.get_states().await;
        assert!(first.is_ok(), "{:?}", first.errors);
        assert_eq!(host.scn().map(Scn::chars), Some("CO1111"));
        assert_eq!(first.data[fields::CURRENT_STAGE], json!(3));
        assert_eq!(first.data[fields::CURRENT_MODE], json!("VA"));
        assert_eq!(first.data[fields::CURRENT_STATUS], json!("3-light"));

        let second = host.get_states().await;
        assert_eq!(first, second);

        let gets = mock.requests_of(Operation::Get);
        assert_eq!(gets.len(), 3);
        assert_eq!(gets[0].varbinds, vec![Varbind::get(catalog().oid(OidName::Ug405SiteId).clone())]);
        let gn = catalog().oid(OidName::Ug405ReplyGn).with_suffix(scn.arcs());
        assert!(gets[1].varbinds.iter().any(|vb| vb.oid == gn));
    }

    #[tokio::test]
    async fn known_scn_skips_discovery() {
        let mock = MockTransport::new();
        mock.queue_echo();
        let mut host = Host::potok_ug405(IP, mock.clone(), Some("2390")).unwrap();

        let response = host.set_stage(1).await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert!(mock.requests_of(Operation::Get).is_empty());
        let scn = Scn::from_chars("CO2390").unwrap();
        assert_eq!(
            mock.requests()[0].varbinds[2].oid,
            catalog().oid(OidName::Ug405ControlFn).with_suffix(scn.arcs())
        );
    }

    #[tokio::test]
    async fn discovery_failure_never_sends_stage() {
        let mock = MockTransport::new();
        mock.queue_timeout();
        let mut host = Host::potok_ug405(IP, mock.clone(), None).unwrap();

        let response = host.set_stage(2).await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].starts_with("ошибка транспорта"));
        assert!(response.data.is_empty());
        assert!(mock.requests_of(Operation::Set).is_empty());
        assert_eq!(host.state(), HostState::Failed);
        assert!(host.scn().is_none());
    }

    #[tokio::test]
    async fn peek_from_local_mode_sets_two_modes_before_stage() {
        let mock = MockTransport::new();
        mock.queue_ok(vec![vb(OidName::Ug405SiteId, Value::OctetString(b"CO1111".to_vec()))]);
        mock.queue_ok(vec![vb(OidName::Ug405OperationMode, Value::Integer(1))]);
        mock.queue_echo();
        mock.queue_echo();
        mock.queue_ok(vec![vb(OidName::Ug405OperationMode, Value::Integer(3))]);
        mock.queue_echo();
        let mut host = Host::peek_ug405(IP, mock.clone(), None).unwrap();

        let response = host.set_stage(2).await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(response.data[fields::SET_STAGE], json!(2));
        assert_eq!(response.data[fields::OPERATION_MODE], json!(3));

        let sets = mock.requests_of(Operation::Set);
        assert_eq!(sets.len(), 3);
        let mode = catalog().oid(OidName::Ug405OperationMode).clone();
        assert_eq!(sets[0].varbinds, vec![Varbind::new(mode.clone(), Value::Integer(2))]);
        assert_eq!(sets[1].varbinds, vec![Varbind::new(mode, Value::Integer(3))]);
        assert_eq!(sets[2].varbinds.len(), 3);
        assert_eq!(mock.queued_reply_count(), 0);
    }

    #[tokio::test]
    async fn peek_already_in_utc_sends_only_stage() {
        let mock = MockTransport::new();
        mock.queue_ok(vec![vb(OidName::Ug405OperationMode, Value::Integer(3))]);
        mock.queue_echo();
        let mut host = Host::peek_ug405(IP, mock.clone(), Some("CO1111")).unwrap();

        let response = host.set_stage(5).await;
        assert!(response.is_ok(), "{:?}", response.errors);
        let sets = mock.requests_of(Operation::Set);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].varbinds.len(), 3);
    }

    #[tokio::test]
    async fn peek_precondition_failure_aborts_command() {
        let mock = MockTransport::new();
        mock.queue_ok(vec![vb(OidName::Ug405OperationMode, Value::Integer(2))]);
        mock.queue_reply(TransportReply {
            error_status: 4,
            error_index: 1,
            ..TransportReply::default()
        });
        let mut host = Host::peek_ug405(IP, mock.clone(), Some("CO1111")).unwrap();

        let response = host.set_stage(5).await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].starts_with("не выполнено предусловие"));
        assert!(response.data.is_empty());
        // Только попытка выставить режим 3, команда фазы не ушла
        assert_eq!(mock.requests_of(Operation::Set).len(), 1);
    }

    #[tokio::test]
    async fn peek_state_has_no_mode() {
        let mock = MockTransport::new();
        let scn = Scn::from_chars("CO1111").unwrap();
        mock.queue_ok(vec![
            vb(OidName::Ug405OperationMode, Value::Integer(3)),
            scn_vb(OidName::Ug405ReplyGn, &scn, Value::OctetString(vec![0x02])),
        ]);
        let mut host = Host::peek_ug405(IP, mock, Some("CO1111")).unwrap();

        let response = host.get_states().await;
        assert!(response.is_ok());
        assert_eq!(response.data[fields::CURRENT_STAGE], json!(2));
        assert!(!response.data.contains_key(fields::CURRENT_MODE));
    }

    #[tokio::test]
    async fn errors_do_not_leak_between_operations() {
        let mock = MockTransport::new();
        mock.queue_timeout();
        mock.queue_ok(vec![vb(OidName::PotokSStatusMode, Value::Integer(11))]);
        let mut host = Host::potok_stcip(IP, mock);

        let failed = host.get_states().await;
        assert_eq!(failed.errors.len(), 1);
        let ok = host.get_states().await;
        assert!(ok.is_ok());
        assert_eq!(ok.data[fields::CURRENT_MODE], json!("CENTRAL"));
    }

    #[tokio::test]
    async fn wrong_vendor_is_protocol_mismatch() {
        let mock = MockTransport::new();
        mock.queue_ok(vec![
            vb(OidName::SwarcoPhaseStatus, Value::NoSuchObject),
            vb(OidName::SwarcoPlanCurrent, Value::NoSuchObject),
        ]);
        let mut host = Host::swarco_stcip(IP, mock);

        let response = host.get_states().await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].contains("Swarco STCIP"));
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn agent_error_status_is_reported() {
        let mock = MockTransport::new();
        mock.queue_reply(TransportReply {
            error_status: 2,
            error_index: 1,
            ..TransportReply::default()
        });
        let mut host = Host::swarco_stcip(IP, mock);

        let response = host.set_stage(3).await;
        assert_eq!(
            response.errors,
            vec!["агент вернул ошибку: errorStatus=2, errorIndex=1".to_string()]
        );
    }

    #[tokio::test]
    async fn invalid_commands_touch_nothing() {
        let mock = MockTransport::new();
        let mut host = Host::swarco_stcip(IP, mock.clone());

        let out_of_range = host.set_stage(9).await;
        assert_eq!(out_of_range.errors.len(), 1);
        let unsupported = host.send_command(Command::RestartProgram).await;
        assert_eq!(unsupported.errors.len(), 1);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn potok_ug405_restart_program() {
        let mock = MockTransport::new();
        mock.queue_echo();
        let mut host = Host::potok_ug405(IP, mock.clone(), Some("CO1111")).unwrap();

        let response = host.send_command(Command::RestartProgram).await;
        assert!(response.is_ok(), "{:?}", response.errors);
        assert_eq!(response.data[fields::RESTART_PROGRAM], json!(1));
    }
}

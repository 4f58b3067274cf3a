//! Имитация SNMP-агента контроллера для интеграционных тестов.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tlc_snmp::snmp::{
    Oid, OidCatalog, OidName, Scn, SnmpTransport, TransportReply, Value, Varbind,
};

/// Агент с таблицей объектов: GET читает её, SET пишет и возвращает записанное.
#[derive(Clone, Default)]
pub struct FakeAgent {
    objects: Arc<Mutex<BTreeMap<Oid, Value>>>,
    sets: Arc<Mutex<Vec<Vec<Varbind>>>>,
    gets: Arc<Mutex<usize>>,
    /// Агент не отвечает вовсе
    silent: bool,
}

#[allow(dead_code)]
impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn with(self, name: OidName, value: Value) -> Self {
        let oid = OidCatalog::builtin().oid(name).clone();
        self.with_oid(oid, value)
    }

    pub fn with_oid(self, oid: Oid, value: Value) -> Self {
        self.objects.lock().unwrap().insert(oid, value);
        self
    }

    pub fn with_scn(self, name: OidName, scn: &str, value: Value) -> Self {
        let scn = Scn::from_chars(scn).unwrap();
        let oid = OidCatalog::builtin().oid(name).with_suffix(scn.arcs());
        self.objects.lock().unwrap().insert(oid, value);
        self
    }

    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.objects.lock().unwrap().get(oid).cloned()
    }

    pub fn value_at(&self, name: OidName, scn: Option<&str>) -> Option<Value> {
        let base = OidCatalog::builtin().oid(name).clone();
        let oid = match scn {
            Some(scn) => base.with_suffix(Scn::from_chars(scn).unwrap().arcs()),
            None => base,
        };
        self.value(&oid)
    }

    pub fn sets(&self) -> Vec<Vec<Varbind>> {
        self.sets.lock().unwrap().clone()
    }

    pub fn get_count(&self) -> usize {
        *self.gets.lock().unwrap()
    }

    fn read(&self, varbinds: &[Varbind]) -> TransportReply {
        *self.gets.lock().unwrap() += 1;
        if self.silent {
            return TransportReply::failed("No SNMP response received before timeout");
        }
        let objects = self.objects.lock().unwrap();
        let reply = varbinds
            .iter()
            .map(|vb| {
                let value = objects.get(&vb.oid).cloned().unwrap_or(Value::NoSuchObject);
                Varbind::new(vb.oid.clone(), value)
            })
            .collect();
        TransportReply::ok(reply)
    }
}

impl SnmpTransport for FakeAgent {
    async fn get(&self, varbinds: &[Varbind], _timeout: Duration, _retries: u32) -> TransportReply {
        self.read(varbinds)
    }

    async fn get_next(
        &self,
        varbinds: &[Varbind],
        _timeout: Duration,
        _retries: u32,
    ) -> TransportReply {
        let objects = self.objects.lock().unwrap();
        let reply = varbinds
            .iter()
            .map(|vb| match objects.range(vb.oid.clone()..).find(|(oid, _)| **oid != vb.oid) {
                Some((oid, value)) => Varbind::new(oid.clone(), value.clone()),
                None => Varbind::new(vb.oid.clone(), Value::EndOfMibView),
            })
            .collect();
        TransportReply::ok(reply)
    }

    async fn set(&self, varbinds: &[Varbind], _timeout: Duration, _retries: u32) -> TransportReply {
        if self.silent {
            return TransportReply::failed("No SNMP response received before timeout");
        }
        self.sets.lock().unwrap().push(varbinds.to_vec());
        let mut objects = self.objects.lock().unwrap();
        for vb in varbinds {
            objects.insert(vb.oid.clone(), vb.value.clone());
        }
        TransportReply::ok(varbinds.to_vec())
    }
}

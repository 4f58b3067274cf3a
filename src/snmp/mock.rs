//! Программируемый транспорт для тестов.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::transport::{SnmpTransport, TransportReply};
use super::varbinds::Varbind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    GetNext,
    Set,
}

/// Запрос, прошедший через транспорт.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: Operation,
    pub varbinds: Vec<Varbind>,
    pub timeout: Duration,
    pub retries: u32,
}

#[derive(Debug, Clone)]
enum MockReply {
    Reply(TransportReply),
    /// Вернуть varbind'ы запроса (так агент отвечает на успешный SET).
    Echo,
}

#[derive(Default)]
struct Inner {
    replies: VecDeque<MockReply>,
    requests: Vec<RecordedRequest>,
}

/// Клоны делят очередь ответов и журнал запросов.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_reply(&self, reply: TransportReply) {
        self.inner
            .lock()
            .unwrap()
            .replies
            .push_back(MockReply::Reply(reply));
    }

    pub fn queue_ok(&self, varbinds: Vec<Varbind>) {
        self.queue_reply(TransportReply::ok(varbinds));
    }

    pub fn queue_timeout(&self) {
        self.queue_reply(TransportReply::failed(
            "No SNMP response received before timeout",
        ));
    }

    pub fn queue_echo(&self) {
        self.inner.lock().unwrap().replies.push_back(MockReply::Echo);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_of(&self, operation: Operation) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }

    pub fn queued_reply_count(&self) -> usize {
        self.inner.lock().unwrap().replies.len()
    }

    fn respond(
        &self,
        operation: Operation,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> TransportReply {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(RecordedRequest {
            operation,
            varbinds: varbinds.to_vec(),
            timeout,
            retries,
        });
        match inner.replies.pop_front() {
            Some(MockReply::Reply(reply)) => reply,
            Some(MockReply::Echo) => TransportReply::ok(varbinds.to_vec()),
            None => TransportReply::failed("mock: очередь ответов пуста"),
        }
    }
}

impl SnmpTransport for MockTransport {
    async fn get(&self, varbinds: &[Varbind], timeout: Duration, retries: u32) -> TransportReply {
        self.respond(Operation::Get, varbinds, timeout, retries)
    }

    async fn get_next(
        &self,
        varbinds: &[Varbind],
        timeout: Duration,
        retries: u32,
    ) -> TransportReply {
        self.respond(Operation::GetNext, varbinds, timeout, retries)
    }

    async fn set(&self, varbinds: &[Varbind], timeout: Duration, retries: u32) -> TransportReply {
        self.respond(Operation::Set, varbinds, timeout, retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snmp::{Value, parse_oid};

    #[tokio::test]
    async fn replays_queue_and_records_requests() {
        let mock = MockTransport::new();
        let vb = Varbind::new(parse_oid("1.3.6.1.2.1.1.5.0").unwrap(), Value::Integer(7));
        mock.queue_ok(vec![vb.clone()]);
        mock.queue_echo();

        let first = mock.get_next(&[Varbind::get(vb.oid.clone())], Duration::from_secs(1), 2).await;
        assert_eq!(first.varbinds, vec![vb.clone()]);
        let echoed = mock.set(&[vb.clone()], Duration::from_secs(1), 0).await;
        assert_eq!(echoed.varbinds, vec![vb]);
        let empty = mock.get(&[], Duration::from_secs(1), 0).await;
        assert!(empty.error_indication.is_some());

        assert_eq!(mock.requests().len(), 3);
        assert_eq!(mock.requests_of(Operation::GetNext)[0].retries, 2);
    }
}

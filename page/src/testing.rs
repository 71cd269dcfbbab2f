use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::transport::{Transport, TransportError};

#[derive(Clone)]
pub enum Reply {
    Body(String),
    Unreachable,
    BrokenBody,
}

impl Reply {
    pub fn body(text: &str) -> Self {
        Reply::Body(text.to_string())
    }
}

/// Transport that answers every request with the same canned reply and
/// remembers what was sent. With a gate, replies wait for a notification.
pub struct ScriptedTransport {
    reply: Reply,
    gate: Option<Arc<Notify>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn gated(reply: Reply, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(reply)
        }
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn post_json(
        &self,
        path: &str,
        body: String,
    ) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.requests.lock().unwrap().push((path.to_string(), body));
        let reply = self.reply.clone();
        let gate = self.gate.clone();
        let url = format!("http://test{}", path);
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            match reply {
                Reply::Body(text) => Ok(text),
                Reply::Unreachable => Err(TransportError::Connect {
                    url,
                    reason: "connection refused".to_string(),
                }),
                Reply::BrokenBody => Err(TransportError::Body {
                    url,
                    reason: "stream reset".to_string(),
                }),
            }
        }
    }
}

use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use legal_common::gateway::{GatewayError, ModelGateway, ModelRequest};

/// What a `ScriptedGateway` answers with.
#[derive(Clone)]
pub enum Script {
    Reply(String),
    Timeout,
    Empty,
}

/// In-memory gateway double returning a fixed answer and recording every request.
pub struct ScriptedGateway {
    script: Script,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedGateway {
    pub fn replying(text: &str) -> Self {
        Self::new(Script::Reply(text.to_string()))
    }

    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ModelGateway for ScriptedGateway {
    fn model_label(&self) -> &str {
        "scripted-model"
    }

    fn invoke<'a>(&'a self, request: &'a ModelRequest) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            match &self.script {
                Script::Reply(text) => Ok(text.clone()),
                Script::Timeout => Err(GatewayError::Timeout(Duration::from_secs(30))),
                Script::Empty => Err(GatewayError::EmptyCompletion),
            }
        })
    }
}

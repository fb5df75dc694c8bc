//! Scripted text generator for tests. Replies are consumed in order and every
//! request is recorded for inspection.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};

/// A request as seen by the generator, with owned fields.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub prompt: String,
    pub document_base64: Option<String>,
    pub max_tokens: u32,
}

pub enum ScriptedReply {
    Text(String),
    Fail { status: u16, message: String },
}

#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Text(text.into()));
        self
    }

    pub fn fail(self, status: u16, message: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(ScriptedReply::Fail {
            status,
            message: message.into(),
        });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            document_base64: request.document.map(|d| d.base64_data.clone()),
            max_tokens: request.max_tokens,
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Fail { status, message }) => Err(LlmError::Api { status, message }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

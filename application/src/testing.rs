//! Test doubles shared by the use case tests.

use crate::ports::learning_store::{LearningStore, StoreError};
use crate::ports::llm_backend::{BackendError, CompletionRequest, LlmBackend};
use crate::ports::progress::{ProgressNotifier, WorkflowEvent};
use crate::ports::response_cache::{CacheKey, ResponseCache};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use warroom_domain::LearningRecord;

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, BackendError> + Send + Sync>;

/// Backend that replays queued replies, then falls back to a responder.
pub struct ScriptedBackend {
    name: String,
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    responder: Responder,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(name: &str) -> Self {
        let label = name.to_string();
        Self {
            name: name.to_string(),
            replies: Mutex::new(VecDeque::new()),
            responder: Box::new(move |_| Ok(format!("Answer from {}.", label))),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(self, reply: Result<String, BackendError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_responder(
        mut self,
        responder: impl Fn(&CompletionRequest) -> Result<String, BackendError> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Box::new(responder);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let queued = self.replies.lock().unwrap().pop_front();
        match queued {
            Some(reply) => reply,
            None => (self.responder)(request),
        }
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, String>>,
}

impl ResponseCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: CacheKey, text: String) {
        self.entries.lock().unwrap().insert(key, text);
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Learning store keeping records in insertion order.
pub struct VecLearningStore {
    records: Mutex<Vec<LearningRecord>>,
    threshold: f64,
}

impl Default for VecLearningStore {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            threshold: 0.5,
        }
    }
}

impl VecLearningStore {
    pub fn records(&self) -> Vec<LearningRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl LearningStore for VecLearningStore {
    fn record(&self, record: LearningRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn find(&self, task: &str) -> Option<LearningRecord> {
        let keywords = warroom_domain::extract_keywords(task);
        self.records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.matches(&keywords, self.threshold))
            .cloned()
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<WorkflowEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name()).collect()
    }
}

impl ProgressNotifier for RecordingProgress {
    fn on_event(&self, event: &WorkflowEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// Test doubles shared by the service tests
use crate::application::completion_service::{Completion, CompletionRequest, CompletionService};
use crate::application::dashboard_repository::ConfigRepository;
use crate::domain::dashboard::DashboardConfig;
use crate::infrastructure::sqlite_store::SqliteStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned completions in order and records every request.
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<anyhow::Result<Completion>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    pub fn new(replies: Vec<anyhow::Result<Completion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<Completion> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted completion left")))
    }
}

#[derive(Default)]
pub struct MemoryConfigRepository {
    current: Mutex<Option<DashboardConfig>>,
}

impl MemoryConfigRepository {
    pub fn with(config: DashboardConfig) -> Self {
        Self {
            current: Mutex::new(Some(config)),
        }
    }

    pub fn current(&self) -> Option<DashboardConfig> {
        self.current.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigRepository for MemoryConfigRepository {
    async fn load_current(&self) -> anyhow::Result<Option<DashboardConfig>> {
        Ok(self.current())
    }

    async fn save_current(&self, config: &DashboardConfig) -> anyhow::Result<()> {
        *self.current.lock().unwrap() = Some(config.clone());
        Ok(())
    }
}

/// In-memory store with a small bookings/calls/costs data set.
pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute_batch(
            r#"
            CREATE TABLE bookings (id TEXT PRIMARY KEY, title TEXT, date TEXT, time TEXT, status TEXT, customer TEXT);
            CREATE TABLE calls (id TEXT PRIMARY KEY, date TEXT, duration INTEGER, "from" TEXT, "to" TEXT, type TEXT);
            CREATE TABLE costs (id TEXT PRIMARY KEY, category TEXT, amount REAL, date TEXT, description TEXT);

            INSERT INTO bookings VALUES ('b1', 'Demo', '2024-01-05', '10:00', 'confirmed', 'Acme');
            INSERT INTO bookings VALUES ('b2', 'Review', '2024-02-10', '11:00', 'confirmed', 'Globex');
            INSERT INTO bookings VALUES ('b3', 'Kickoff', '2024-03-01', '09:00', 'cancelled', 'Initech');

            INSERT INTO calls VALUES ('c1', '2024-01-05', 120, 'alice', 'bob', 'inbound');
            INSERT INTO calls VALUES ('c2', '2024-01-06', 45, 'bob', 'carol', 'outbound');

            INSERT INTO costs VALUES ('k1', 'Software', 1200.0, '2024-01-15', 'Licenses');
            INSERT INTO costs VALUES ('k2', 'Travel', 350.5, '2024-02-02', 'Flights');
            "#,
        )
        .unwrap();
    store
}

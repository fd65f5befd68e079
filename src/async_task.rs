//! Background execution of API calls.
//!
//! Requests run on their own threads and report back over a crossbeam
//! channel that the UI loop drains with `try_recv()` once per tick. Results
//! arrive in completion order and nothing is cancelled, so when two fetches
//! race the last one to finish is the one that sticks.
//!
//! ```no_run
//! use vendadmin::api::{ApiClient, ListQuery};
//! use vendadmin::async_task::{ApiOperation, TaskManager};
//! use vendadmin::config::AppConfig;
//! use vendadmin::entity::Entity;
//!
//! let client = ApiClient::new(&AppConfig::default()).unwrap();
//! let mut tm = TaskManager::new();
//! tm.spawn_operation(
//!     &client,
//!     ApiOperation::FetchList {
//!         entity: Entity::Users,
//!         query: ListQuery { page: 1, limit: 10, filters: Vec::new() },
//!     },
//! );
//!
//! if let Some(done) = tm.try_recv() {
//!     println!("{} finished: {}", done.label, done.outcome.is_ok());
//! }
//! ```

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread;

use crate::api::{ApiClient, ListPage, ListQuery};
use crate::classify::ApiFailure;
use crate::entity::Entity;
use crate::export::Record;

/// Number of notifications fetched per poll.
pub const NOTIFICATION_POLL_LIMIT: usize = 20;

/// API calls that can be performed in the background
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOperation {
    FetchList { entity: Entity, query: ListQuery },
    Delete { entity: Entity, id: String },
    BulkDelete { entity: Entity, ids: Vec<String> },
    ClearCache,
    PollNotifications,
}

impl ApiOperation {
    pub fn label(&self) -> &'static str {
        match self {
            ApiOperation::FetchList { .. } => "fetch",
            ApiOperation::Delete { .. } => "delete",
            ApiOperation::BulkDelete { .. } => "bulk delete",
            ApiOperation::ClearCache => "clear cache",
            ApiOperation::PollNotifications => "poll notifications",
        }
    }

    fn run(self, client: &ApiClient) -> Result<OpOutcome, ApiFailure> {
        match self {
            ApiOperation::FetchList { entity, query } => client
                .list(entity, &query)
                .map(|page| OpOutcome::Listed { entity, page }),
            ApiOperation::Delete { entity, id } => client
                .delete(entity, &id)
                .map(|_| OpOutcome::Deleted { entity, count: 1 }),
            ApiOperation::BulkDelete { entity, ids } => client
                .bulk_delete(entity, &ids)
                .map(|_| OpOutcome::Deleted {
                    entity,
                    count: ids.len(),
                }),
            ApiOperation::ClearCache => client.clear_cache().map(|_| OpOutcome::CacheCleared),
            ApiOperation::PollNotifications => {
                let query = ListQuery {
                    page: 1,
                    limit: NOTIFICATION_POLL_LIMIT,
                    filters: Vec::new(),
                };
                client
                    .list(Entity::Notifications, &query)
                    .map(|page| OpOutcome::Notifications(page.records))
            }
        }
    }
}

/// Successful result of an `ApiOperation`
#[derive(Debug, Clone, PartialEq)]
pub enum OpOutcome {
    Listed { entity: Entity, page: ListPage },
    Deleted { entity: Entity, count: usize },
    CacheCleared,
    Notifications(Vec<Record>),
}

/// A finished operation as delivered to the UI thread
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Sequence number returned by `spawn_operation`
    pub id: u64,
    pub label: &'static str,
    pub outcome: Result<OpOutcome, ApiFailure>,
}

/// Task manager for background API calls
///
/// Handles spawning, tracking, and receiving results from worker threads
pub struct TaskManager {
    sender: Sender<TaskResult>,
    receiver: Receiver<TaskResult>,
    pending: usize,
    next_id: u64,
}

impl TaskManager {
    /// Create a new task manager
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            pending: 0,
            next_id: 0,
        }
    }

    /// Run `op` on a worker thread with a clone of `client`
    ///
    /// Returns immediately with the task's sequence number
    pub fn spawn_operation(&mut self, client: &ApiClient, op: ApiOperation) -> u64 {
        self.next_id += 1;
        self.pending += 1;
        let id = self.next_id;
        let label = op.label();
        let sender = self.sender.clone();
        let client = client.clone();

        tracing::debug!(id, op = label, "spawning api task");
        thread::spawn(move || {
            let outcome = op.run(&client);
            let _ = sender.send(TaskResult { id, label, outcome });
        });
        id
    }

    /// Check if there's a completed operation result
    ///
    /// Returns `None` when nothing has finished yet
    pub fn try_recv(&mut self) -> Option<TaskResult> {
        if self.pending == 0 {
            return None;
        }

        match self.receiver.try_recv() {
            Ok(result) => {
                self.pending -= 1;
                Some(result)
            }
            Err(_) => None,
        }
    }

    /// Get number of pending operations
    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Check if any operations are currently pending
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ApiStatus;
    use crate::config::AppConfig;
    use std::time::{Duration, Instant};

    // Nothing listens on port 9 locally, so requests fail fast with a fetch error.
    fn offline_client() -> ApiClient {
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9/api".into(),
            request_timeout_secs: 2,
            ..AppConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    fn wait_for(tm: &mut TaskManager) -> TaskResult {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = tm.try_recv() {
                return result;
            }
            assert!(Instant::now() < deadline, "task never finished");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_task_manager_creation() {
        let tm = TaskManager::new();
        assert_eq!(tm.pending_count(), 0);
        assert!(!tm.has_pending());
    }

    #[test]
    fn test_try_recv_without_tasks() {
        let mut tm = TaskManager::new();
        assert!(tm.try_recv().is_none());
    }

    #[test]
    fn test_spawn_operation_ids_increase() {
        let client = offline_client();
        let mut tm = TaskManager::new();
        let a = tm.spawn_operation(&client, ApiOperation::ClearCache);
        let b = tm.spawn_operation(&client, ApiOperation::ClearCache);
        assert!(b > a);
        assert_eq!(tm.pending_count(), 2);
    }

    #[test]
    fn test_failed_request_reports_fetch_error() {
        let client = offline_client();
        let mut tm = TaskManager::new();
        let id = tm.spawn_operation(
            &client,
            ApiOperation::FetchList {
                entity: Entity::Orders,
                query: ListQuery {
                    page: 1,
                    limit: 10,
                    filters: Vec::new(),
                },
            },
        );

        let result = wait_for(&mut tm);
        assert_eq!(result.id, id);
        assert_eq!(result.label, "fetch");
        let err = result.outcome.unwrap_err();
        assert_eq!(err.status, ApiStatus::FetchError);
        assert_eq!(tm.pending_count(), 0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ApiOperation::PollNotifications.label(), "poll notifications");
        assert_eq!(
            ApiOperation::BulkDelete {
                entity: Entity::Users,
                ids: vec!["a".into()]
            }
            .label(),
            "bulk delete"
        );
    }
}

use crate::application::notices::{self, Notice};
use crate::domain::categories;
use crate::domain::models::{DateRange, NewTimeLeak, TimeLeakPatch, TimeLeakRecord};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::logging::OperationLog;
use crate::infrastructure::store_client::TimeLeakStoreClient;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The entry form's working state. Defaults are re-applied after every
/// successful submission: current timestamp, nothing selected, empty note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub category_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
    pub note: String,
}

impl EventDraft {
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            category_id: None,
            occurred_at: now,
            duration_minutes: None,
            note: String::new(),
        }
    }
}

/// List retrieval state. `Loaded` with no rows and `LoadFailed` are
/// deliberately distinct: an empty account is not a broken one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded(Vec<TimeLeakRecord>),
    LoadFailed,
}

/// Create/list/update/delete workflow for one signed-in owner. After every
/// mutation the list is re-fetched from the store rather than patched
/// locally, so the displayed rows always reflect the authoritative remote
/// state at the cost of one extra round trip.
pub struct EventLifecycleManager<S>
where
    S: TimeLeakStoreClient,
{
    store_client: Arc<S>,
    user_id: String,
    access_token: String,
    draft: Mutex<EventDraft>,
    list: Mutex<ListState>,
    pending_delete: Mutex<Option<i64>>,
    staged_edit: Mutex<Option<TimeLeakPatch>>,
    submit_in_flight: AtomicBool,
    list_in_flight: AtomicBool,
    mutation_in_flight: AtomicBool,
    operation_log: Option<Arc<OperationLog>>,
    now_provider: NowProvider,
}

impl<S> EventLifecycleManager<S>
where
    S: TimeLeakStoreClient,
{
    pub fn new(
        store_client: Arc<S>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let now_provider: NowProvider = Arc::new(Utc::now);
        Self {
            store_client,
            user_id: user_id.into(),
            access_token: access_token.into(),
            draft: Mutex::new(EventDraft::with_defaults(now_provider())),
            list: Mutex::new(ListState::Idle),
            pending_delete: Mutex::new(None),
            staged_edit: Mutex::new(None),
            submit_in_flight: AtomicBool::new(false),
            list_in_flight: AtomicBool::new(false),
            mutation_in_flight: AtomicBool::new(false),
            operation_log: None,
            now_provider,
        }
    }

    pub fn with_operation_log(mut self, operation_log: Arc<OperationLog>) -> Self {
        self.operation_log = Some(operation_log);
        self
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn draft(&self) -> Result<EventDraft, InfraError> {
        Ok(self.lock_state(&self.draft, "draft")?.clone())
    }

    pub fn update_draft(&self, apply: impl FnOnce(&mut EventDraft)) -> Result<(), InfraError> {
        let mut draft = self.lock_state(&self.draft, "draft")?;
        apply(&mut draft);
        Ok(())
    }

    pub fn list_state(&self) -> Result<ListState, InfraError> {
        Ok(self.lock_state(&self.list, "list")?.clone())
    }

    /// The rows currently on display; empty unless the list is `Loaded`.
    pub fn records(&self) -> Result<Vec<TimeLeakRecord>, InfraError> {
        match &*self.lock_state(&self.list, "list")? {
            ListState::Loaded(records) => Ok(records.clone()),
            _ => Ok(Vec::new()),
        }
    }

    pub fn pending_delete(&self) -> Result<Option<i64>, InfraError> {
        Ok(*self.lock_state(&self.pending_delete, "pending delete")?)
    }

    pub fn staged_edit(&self) -> Result<Option<TimeLeakPatch>, InfraError> {
        Ok(self.lock_state(&self.staged_edit, "staged edit")?.clone())
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_loading(&self) -> bool {
        self.list_in_flight.load(Ordering::SeqCst)
    }

    /// Submits the current draft. A draft without a category is rejected
    /// locally; the gateway is never called for it. Returns `None` when a
    /// submission is already in flight.
    pub async fn submit_new(&self) -> Option<Notice> {
        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(error) => return Some(notices::could_not_register(&error)),
        };
        let Some(category_id) = draft
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
        else {
            return Some(Notice::error(notices::SELECT_CATEGORY));
        };
        // The column stays a free-form string, so membership is enforced
        // here at the form boundary, not in the store.
        if !categories::is_known(&category_id) {
            return Some(Notice::error(notices::UNKNOWN_CATEGORY));
        }

        if self.submit_in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }

        let input = NewTimeLeak {
            user_id: self.user_id.clone(),
            occurred_at: draft.occurred_at,
            category_id,
            duration_minutes: draft.duration_minutes,
            note: normalize_note(&draft.note),
        };
        let outcome = self.store_client.create(&self.access_token, &input).await;
        self.submit_in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(record) => {
                if let Ok(mut draft) = self.draft.lock() {
                    *draft = EventDraft::with_defaults((self.now_provider)());
                }
                self.log_info("submit_new", &format!("registered time leak id={}", record.id));
                Some(Notice::success(notices::LEAK_REGISTERED))
            }
            Err(error) => {
                // The draft is left intact so the user can retry.
                self.log_error("submit_new", &error.to_string());
                Some(notices::could_not_register(&error))
            }
        }
    }

    /// Re-fetches the owner's full list and replaces the in-memory copy.
    /// Success is silent; failure produces a "could not load" notice.
    pub async fn refresh(&self) -> Option<Notice> {
        if self.list_in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        if let Ok(mut list) = self.list.lock() {
            *list = ListState::Loading;
        }

        let outcome = self
            .store_client
            .list_by_owner(&self.access_token, &self.user_id, &DateRange::unbounded())
            .await;
        self.list_in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(records) => {
                if let Ok(mut list) = self.list.lock() {
                    *list = ListState::Loaded(records);
                }
                None
            }
            Err(error) => {
                if let Ok(mut list) = self.list.lock() {
                    *list = ListState::LoadFailed;
                }
                self.log_error("refresh", &error.to_string());
                Some(notices::could_not_load(&error))
            }
        }
    }

    /// Marks a record for deletion. Nothing is sent to the store until
    /// `confirm_delete`.
    pub fn request_delete(&self, id: i64) -> Result<(), InfraError> {
        *self.lock_state(&self.pending_delete, "pending delete")? = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&self) -> Result<(), InfraError> {
        *self.lock_state(&self.pending_delete, "pending delete")? = None;
        Ok(())
    }

    /// Deletes the pending record and re-fetches the list. The pending id
    /// is cleared whether the delete succeeds or fails.
    pub async fn confirm_delete(&self) -> Option<Notice> {
        let pending = match self.lock_state(&self.pending_delete, "pending delete") {
            Ok(mut guard) => guard.take(),
            Err(error) => return Some(notices::could_not_delete(&error)),
        };
        let Some(id) = pending else {
            return None;
        };

        if self.mutation_in_flight.swap(true, Ordering::SeqCst) {
            if let Ok(mut guard) = self.pending_delete.lock() {
                *guard = Some(id);
            }
            return None;
        }

        let outcome = self.store_client.delete_by_id(&self.access_token, id).await;
        self.mutation_in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                self.log_info("confirm_delete", &format!("deleted time leak id={id}"));
                match self.refresh().await {
                    Some(notice) if notice.is_error() => Some(notice),
                    _ => Some(Notice::success(notices::LEAK_DELETED)),
                }
            }
            Err(error) => {
                self.log_error("confirm_delete", &error.to_string());
                Some(notices::could_not_delete(&error))
            }
        }
    }

    /// Stages a full working copy of `record` for editing.
    pub fn request_edit(&self, record: &TimeLeakRecord) -> Result<(), InfraError> {
        *self.lock_state(&self.staged_edit, "staged edit")? =
            Some(TimeLeakPatch::for_record(record));
        Ok(())
    }

    pub fn cancel_edit(&self) -> Result<(), InfraError> {
        *self.lock_state(&self.staged_edit, "staged edit")? = None;
        Ok(())
    }

    pub fn update_staged_edit(
        &self,
        apply: impl FnOnce(&mut TimeLeakPatch),
    ) -> Result<(), InfraError> {
        let mut staged = self.lock_state(&self.staged_edit, "staged edit")?;
        if let Some(patch) = staged.as_mut() {
            apply(patch);
        }
        Ok(())
    }

    /// Saves the staged edit and re-fetches the list. With nothing staged,
    /// or a staged patch missing its id, this is a no-op rather than a
    /// failed remote call. On failure the staged edit is kept for retry.
    pub async fn save_edit(&self) -> Option<Notice> {
        let staged = match self.staged_edit() {
            Ok(staged) => staged,
            Err(error) => return Some(notices::could_not_update(&error)),
        };
        let Some(patch) = staged else {
            return None;
        };
        let Some(id) = patch.id else {
            return None;
        };

        if self.mutation_in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }

        let outcome = self.store_client.update(&self.access_token, id, &patch).await;
        self.mutation_in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(record) => {
                if let Ok(mut staged) = self.staged_edit.lock() {
                    *staged = None;
                }
                self.log_info("save_edit", &format!("updated time leak id={}", record.id));
                match self.refresh().await {
                    Some(notice) if notice.is_error() => Some(notice),
                    _ => Some(Notice::success(notices::LEAK_UPDATED)),
                }
            }
            Err(error) => {
                self.log_error("save_edit", &error.to_string());
                Some(notices::could_not_update(&error))
            }
        }
    }

    fn lock_state<'a, T>(
        &self,
        mutex: &'a Mutex<T>,
        what: &str,
    ) -> Result<MutexGuard<'a, T>, InfraError> {
        mutex
            .lock()
            .map_err(|error| InfraError::Store(format!("{what} lock poisoned: {error}")))
    }

    fn log_info(&self, operation: &str, message: &str) {
        if let Some(log) = &self.operation_log {
            log.info(operation, message);
        }
    }

    fn log_error(&self, operation: &str, message: &str) {
        if let Some(log) = &self.operation_log {
            log.error(operation, message);
        }
    }
}

fn normalize_note(note: &str) -> Option<String> {
    if note.trim().is_empty() {
        None
    } else {
        Some(note.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::notices::NoticeKind;
    use crate::infrastructure::store_client::InMemoryTimeLeakStoreClient;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    #[derive(Default)]
    struct RecordingStoreClient {
        inner: InMemoryTimeLeakStoreClient,
        create_calls: AtomicUsize,
        list_calls: AtomicUsize,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
    }

    #[async_trait]
    impl TimeLeakStoreClient for RecordingStoreClient {
        async fn create(
            &self,
            access_token: &str,
            input: &NewTimeLeak,
        ) -> Result<TimeLeakRecord, InfraError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(access_token, input).await
        }

        async fn list_by_owner(
            &self,
            access_token: &str,
            user_id: &str,
            range: &DateRange,
        ) -> Result<Vec<TimeLeakRecord>, InfraError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_by_owner(access_token, user_id, range).await
        }

        async fn update(
            &self,
            access_token: &str,
            id: i64,
            patch: &TimeLeakPatch,
        ) -> Result<TimeLeakRecord, InfraError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update(access_token, id, patch).await
        }

        async fn delete_by_id(&self, access_token: &str, id: i64) -> Result<(), InfraError> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_by_id(access_token, id).await
        }
    }

    struct FailingStoreClient;

    #[async_trait]
    impl TimeLeakStoreClient for FailingStoreClient {
        async fn create(
            &self,
            _access_token: &str,
            _input: &NewTimeLeak,
        ) -> Result<TimeLeakRecord, InfraError> {
            Err(InfraError::Store("connection refused".to_string()))
        }

        async fn list_by_owner(
            &self,
            _access_token: &str,
            _user_id: &str,
            _range: &DateRange,
        ) -> Result<Vec<TimeLeakRecord>, InfraError> {
            Err(InfraError::Store("connection refused".to_string()))
        }

        async fn update(
            &self,
            _access_token: &str,
            _id: i64,
            _patch: &TimeLeakPatch,
        ) -> Result<TimeLeakRecord, InfraError> {
            Err(InfraError::Store("connection refused".to_string()))
        }

        async fn delete_by_id(&self, _access_token: &str, _id: i64) -> Result<(), InfraError> {
            Err(InfraError::Store("connection refused".to_string()))
        }
    }

    fn manager_with(store: Arc<RecordingStoreClient>) -> EventLifecycleManager<RecordingStoreClient> {
        EventLifecycleManager::new(store, "user-1", "access-token")
            .with_now_provider(Arc::new(|| fixed_time("2026-03-02T12:00:00Z")))
    }

    #[tokio::test]
    async fn submit_without_category_never_reaches_the_store() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        let notice = manager.submit_new().await.expect("a notice is produced");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, notices::SELECT_CATEGORY);
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_with_an_unregistered_category_is_rejected_locally() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        manager
            .update_draft(|draft| draft.category_id = Some("daydreaming".to_string()))
            .expect("update draft");

        let notice = manager.submit_new().await.expect("a notice is produced");
        assert_eq!(notice.message, notices::UNKNOWN_CATEGORY);
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_creates_one_record_and_resets_the_draft() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        manager
            .update_draft(|draft| {
                draft.category_id = Some("interruption".to_string());
                draft.occurred_at = fixed_time("2026-03-02T10:15:00Z");
                draft.duration_minutes = Some(15);
                draft.note = "hallway question".to_string();
            })
            .expect("update draft");

        let notice = manager.submit_new().await.expect("a notice is produced");
        assert_eq!(notice, Notice::success(notices::LEAK_REGISTERED));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

        let rows = store
            .inner
            .list_by_owner("access-token", "user-1", &DateRange::unbounded())
            .await
            .expect("list rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category_id, "interruption");
        assert_eq!(rows[0].occurred_at, fixed_time("2026-03-02T10:15:00Z"));
        assert_eq!(rows[0].duration_minutes, Some(15));
        assert_eq!(rows[0].note.as_deref(), Some("hallway question"));
        assert_eq!(rows[0].user_id, "user-1");

        let draft = manager.draft().expect("read draft");
        assert_eq!(draft, EventDraft::with_defaults(fixed_time("2026-03-02T12:00:00Z")));
    }

    #[tokio::test]
    async fn submit_failure_keeps_the_draft_for_retry() {
        let manager = EventLifecycleManager::new(Arc::new(FailingStoreClient), "user-1", "token");
        manager
            .update_draft(|draft| {
                draft.category_id = Some("interruption".to_string());
                draft.duration_minutes = Some(5);
            })
            .expect("update draft");

        let notice = manager.submit_new().await.expect("a notice is produced");
        assert!(notice.is_error());
        assert_eq!(
            notice.message,
            "could not register the time leak: connection refused"
        );

        let draft = manager.draft().expect("read draft");
        assert_eq!(draft.category_id.as_deref(), Some("interruption"));
        assert_eq!(draft.duration_minutes, Some(5));
    }

    #[tokio::test]
    async fn refresh_fully_replaces_the_displayed_list() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        for occurred_at in ["2026-03-01T09:00:00Z", "2026-03-02T09:00:00Z"] {
            let leak = NewTimeLeak {
                user_id: "user-1".to_string(),
                occurred_at: fixed_time(occurred_at),
                category_id: "interruption".to_string(),
                duration_minutes: None,
                note: None,
            };
            store.inner.create("access-token", &leak).await.expect("seed row");
        }

        assert!(manager.refresh().await.is_none());
        let records = manager.records().expect("read records");
        assert_eq!(records.len(), 2);
        assert!(records[0].occurred_at > records[1].occurred_at);

        // A row disappearing remotely is reflected on the next refresh, not
        // patched around locally.
        store
            .inner
            .delete_by_id("access-token", records[0].id)
            .await
            .expect("remote delete");
        assert!(manager.refresh().await.is_none());
        assert_eq!(manager.records().expect("read records").len(), 1);
    }

    #[tokio::test]
    async fn load_failure_is_distinct_from_an_empty_list() {
        let failing = EventLifecycleManager::new(Arc::new(FailingStoreClient), "user-1", "token");
        let notice = failing.refresh().await.expect("error notice");
        assert!(notice.is_error());
        assert!(notice.message.starts_with("could not load your data:"));
        assert_eq!(failing.list_state().expect("state"), ListState::LoadFailed);

        let empty = manager_with(Arc::new(RecordingStoreClient::default()));
        assert!(empty.refresh().await.is_none());
        assert_eq!(
            empty.list_state().expect("state"),
            ListState::Loaded(Vec::new())
        );
    }

    #[tokio::test]
    async fn delete_is_two_phase_and_cancellable() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        let leak = NewTimeLeak {
            user_id: "user-1".to_string(),
            occurred_at: fixed_time("2026-03-02T10:15:00Z"),
            category_id: "interruption".to_string(),
            duration_minutes: Some(15),
            note: None,
        };
        let created = store.inner.create("access-token", &leak).await.expect("seed row");

        manager.request_delete(created.id).expect("request delete");
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
        manager.cancel_delete().expect("cancel delete");
        assert!(manager.confirm_delete().await.is_none());
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);

        manager.request_delete(created.id).expect("request delete");
        let notice = manager.confirm_delete().await.expect("a notice is produced");
        assert_eq!(notice, Notice::success(notices::LEAK_DELETED));
        assert_eq!(manager.records().expect("records").len(), 0);
        assert_eq!(manager.pending_delete().expect("pending"), None);

        // Deleting the same id again is a reported error, not a no-op.
        manager.request_delete(created.id).expect("request delete");
        let second = manager.confirm_delete().await.expect("a notice is produced");
        assert!(second.is_error());
        assert!(second.message.starts_with("could not delete the time leak:"));
    }

    #[tokio::test]
    async fn save_edit_updates_the_record_and_refreshes() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        let leak = NewTimeLeak {
            user_id: "user-1".to_string(),
            occurred_at: fixed_time("2026-03-02T10:15:00Z"),
            category_id: "interruption".to_string(),
            duration_minutes: Some(15),
            note: None,
        };
        let created = store.inner.create("access-token", &leak).await.expect("seed row");

        manager.request_edit(&created).expect("request edit");
        manager
            .update_staged_edit(|patch| patch.duration_minutes = Some(Some(30)))
            .expect("tweak staged edit");

        let notice = manager.save_edit().await.expect("a notice is produced");
        assert_eq!(notice, Notice::success(notices::LEAK_UPDATED));
        assert_eq!(manager.staged_edit().expect("staged"), None);

        let records = manager.records().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_minutes, Some(30));
        assert_eq!(records[0].id, created.id);
        assert_eq!(records[0].category_id, created.category_id);
        assert_eq!(records[0].occurred_at, created.occurred_at);
    }

    #[tokio::test]
    async fn save_edit_without_a_target_is_a_local_noop() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        assert!(manager.save_edit().await.is_none());

        let record = TimeLeakRecord {
            id: 4,
            user_id: "user-1".to_string(),
            occurred_at: fixed_time("2026-03-02T10:15:00Z"),
            created_at: fixed_time("2026-03-02T10:16:00Z"),
            category_id: "interruption".to_string(),
            duration_minutes: None,
            note: None,
        };
        manager.request_edit(&record).expect("request edit");
        manager
            .update_staged_edit(|patch| patch.id = None)
            .expect("drop id");
        assert!(manager.save_edit().await.is_none());
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn save_edit_failure_keeps_the_staged_patch() {
        let manager = EventLifecycleManager::new(Arc::new(FailingStoreClient), "user-1", "token");
        let record = TimeLeakRecord {
            id: 4,
            user_id: "user-1".to_string(),
            occurred_at: fixed_time("2026-03-02T10:15:00Z"),
            created_at: fixed_time("2026-03-02T10:16:00Z"),
            category_id: "interruption".to_string(),
            duration_minutes: None,
            note: None,
        };
        manager.request_edit(&record).expect("request edit");

        let notice = manager.save_edit().await.expect("a notice is produced");
        assert!(notice.is_error());
        assert!(notice.message.starts_with("could not update the time leak:"));
        assert!(manager.staged_edit().expect("staged").is_some());
    }

    #[tokio::test]
    async fn full_record_lifecycle_roundtrip() {
        let store = Arc::new(RecordingStoreClient::default());
        let manager = manager_with(Arc::clone(&store));

        manager
            .update_draft(|draft| {
                draft.category_id = Some("interruption".to_string());
                draft.occurred_at = fixed_time("2026-03-02T10:15:00Z");
                draft.duration_minutes = Some(15);
            })
            .expect("fill draft");
        let submitted = manager.submit_new().await.expect("submit notice");
        assert!(!submitted.is_error());

        manager.refresh().await;
        let records = manager.records().expect("records");
        assert_eq!(records.len(), 1);
        let created = records[0].clone();
        assert_eq!(created.duration_minutes, Some(15));

        manager.request_edit(&created).expect("request edit");
        manager
            .update_staged_edit(|patch| patch.duration_minutes = Some(Some(30)))
            .expect("tweak duration");
        let updated = manager.save_edit().await.expect("save notice");
        assert!(!updated.is_error());

        let records = manager.records().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_minutes, Some(30));
        assert_eq!(records[0].id, created.id);
        assert_eq!(records[0].occurred_at, created.occurred_at);

        manager.request_delete(created.id).expect("request delete");
        let deleted = manager.confirm_delete().await.expect("delete notice");
        assert!(!deleted.is_error());
        assert!(manager.records().expect("records").is_empty());
    }
}

use crate::domain::models::{DateRange, NewTimeLeak, TimeLeakPatch, TimeLeakRecord};
use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::error::InfraError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

const TIME_LEAKS_TABLE: &str = "time_leaks";

/// The record store gateway. Every failure shape coming back from the
/// remote store is normalized into `InfraError::Store` with a readable
/// message; callers never see an opaque payload.
#[async_trait]
pub trait TimeLeakStoreClient: Send + Sync {
    async fn create(
        &self,
        access_token: &str,
        input: &NewTimeLeak,
    ) -> Result<TimeLeakRecord, InfraError>;

    /// Lists the owner's events within `range`, newest first. The end date
    /// is inclusive through 23:59:59.999 of its calendar day.
    async fn list_by_owner(
        &self,
        access_token: &str,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<TimeLeakRecord>, InfraError>;

    async fn update(
        &self,
        access_token: &str,
        id: i64,
        patch: &TimeLeakPatch,
    ) -> Result<TimeLeakRecord, InfraError>;

    /// Fails when zero rows were deleted so "already removed / not owned"
    /// surfaces instead of being reported as success.
    async fn delete_by_id(&self, access_token: &str, id: i64) -> Result<(), InfraError>;
}

fn zero_rows_deleted_error() -> InfraError {
    InfraError::Store(
        "the record was not deleted; it may have been removed already, or you lack permission"
            .to_string(),
    )
}

fn zero_rows_updated_error() -> InfraError {
    InfraError::Store(
        "the record was not updated; it may have been removed, or you lack permission".to_string(),
    )
}

#[derive(Debug, Clone)]
pub struct ReqwestTimeLeakStoreClient {
    client: Client,
    base_url: String,
    anon_key: String,
    timezone: Tz,
}

#[derive(Debug, serde::Deserialize)]
struct StoreErrorPayload {
    message: Option<String>,
    details: Option<String>,
}

impl ReqwestTimeLeakStoreClient {
    pub fn new(config: &StoreConfig, timezone: Tz, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| InfraError::Store(format!("failed to build http client: {error}")))?;
        Ok(Self {
            client,
            base_url: config.project_url.clone(),
            anon_key: config.anon_key.clone(),
            timezone,
        })
    }

    fn table_endpoint(&self) -> Result<Url, InfraError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|error| InfraError::Store(format!("invalid project url: {error}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| InfraError::Store("project URL cannot be a base".to_string()))?;
            segments.pop_if_empty();
            segments.push("rest");
            segments.push("v1");
            segments.push(TIME_LEAKS_TABLE);
        }
        Ok(url)
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
        if value.trim().is_empty() {
            return Err(InfraError::Store(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn store_http_error(status: reqwest::StatusCode, body: &str) -> InfraError {
        if let Ok(parsed) = serde_json::from_str::<StoreErrorPayload>(body) {
            let message = parsed
                .message
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty());
            if let Some(message) = message {
                let details = parsed
                    .details
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty());
                return match details {
                    Some(details) => InfraError::Store(format!("{message} ({details})")),
                    None => InfraError::Store(message),
                };
            }
        }
        if body.trim().is_empty() {
            InfraError::Store(format!("store api error: http {}", status.as_u16()))
        } else {
            InfraError::Store(format!("store api error: http {}; body={body}", status.as_u16()))
        }
    }

    fn affected_count_from_content_range(value: &str) -> Option<u64> {
        value.rsplit('/').next()?.trim().parse().ok()
    }

    fn timestamp_filter(instant: DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    async fn read_body(
        response: reqwest::Response,
        stage: &str,
    ) -> Result<(reqwest::StatusCode, String), InfraError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Store(format!("failed reading {stage} response: {error}")))?;
        Ok((status, body))
    }

    fn parse_rows(body: &str, stage: &str) -> Result<Vec<TimeLeakRecord>, InfraError> {
        serde_json::from_str(body).map_err(|error| {
            InfraError::Store(format!("invalid {stage} payload: {error}; body={body}"))
        })
    }
}

#[async_trait]
impl TimeLeakStoreClient for ReqwestTimeLeakStoreClient {
    async fn create(
        &self,
        access_token: &str,
        input: &NewTimeLeak,
    ) -> Result<TimeLeakRecord, InfraError> {
        Self::ensure_non_empty(access_token, "access token")?;
        input.validate().map_err(InfraError::Store)?;

        let endpoint = self.table_endpoint()?;
        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .json(&[input])
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while inserting: {error}")))?;

        let (status, body) = Self::read_body(response, "insert").await?;
        if !status.is_success() {
            return Err(Self::store_http_error(status, &body));
        }

        Self::parse_rows(&body, "insert")?
            .into_iter()
            .next()
            .ok_or_else(|| InfraError::Store("insert response did not include a row".to_string()))
    }

    async fn list_by_owner(
        &self,
        access_token: &str,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<TimeLeakRecord>, InfraError> {
        Self::ensure_non_empty(access_token, "access token")?;
        Self::ensure_non_empty(user_id, "user id")?;

        let bounds = range.bounds(self.timezone).map_err(InfraError::Store)?;
        let mut endpoint = self.table_endpoint()?;
        {
            let mut query = endpoint.query_pairs_mut();
            query.append_pair("select", "*");
            query.append_pair("user_id", &format!("eq.{user_id}"));
            if let Some(start) = bounds.start {
                query.append_pair("occurred_at", &format!("gte.{}", Self::timestamp_filter(start)));
            }
            if let Some(end) = bounds.end {
                query.append_pair("occurred_at", &format!("lte.{}", Self::timestamp_filter(end)));
            }
            query.append_pair("order", "occurred_at.desc");
        }

        let response = self
            .client
            .get(endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while listing: {error}")))?;

        let (status, body) = Self::read_body(response, "list").await?;
        if !status.is_success() {
            return Err(Self::store_http_error(status, &body));
        }
        Self::parse_rows(&body, "list")
    }

    async fn update(
        &self,
        access_token: &str,
        id: i64,
        patch: &TimeLeakPatch,
    ) -> Result<TimeLeakRecord, InfraError> {
        Self::ensure_non_empty(access_token, "access token")?;

        let mut endpoint = self.table_endpoint()?;
        endpoint
            .query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .client
            .patch(endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while updating: {error}")))?;

        let (status, body) = Self::read_body(response, "update").await?;
        if !status.is_success() {
            return Err(Self::store_http_error(status, &body));
        }

        Self::parse_rows(&body, "update")?
            .into_iter()
            .next()
            .ok_or_else(zero_rows_updated_error)
    }

    async fn delete_by_id(&self, access_token: &str, id: i64) -> Result<(), InfraError> {
        Self::ensure_non_empty(access_token, "access token")?;

        let mut endpoint = self.table_endpoint()?;
        endpoint
            .query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));

        let response = self
            .client
            .delete(endpoint)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|error| InfraError::Store(format!("network error while deleting: {error}")))?;

        let status = response.status();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::store_http_error(status, &body));
        }

        let affected = content_range
            .as_deref()
            .and_then(Self::affected_count_from_content_range)
            .ok_or_else(|| {
                InfraError::Store("delete response did not include an affected row count".to_string())
            })?;
        if affected == 0 {
            return Err(zero_rows_deleted_error());
        }
        Ok(())
    }
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// In-memory stand-in honoring the same contract as the REST client: ids
/// and creation timestamps are assigned here, listings apply the owner
/// filter, the end-of-day range widening, and newest-first ordering, and a
/// zero-row delete is an error.
pub struct InMemoryTimeLeakStoreClient {
    records: Mutex<Vec<TimeLeakRecord>>,
    next_id: AtomicI64,
    timezone: Tz,
    now_provider: NowProvider,
}

impl Default for InMemoryTimeLeakStoreClient {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            timezone: chrono_tz::UTC,
            now_provider: Arc::new(Utc::now),
        }
    }
}

impl InMemoryTimeLeakStoreClient {
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    fn lock_records(&self) -> Result<std::sync::MutexGuard<'_, Vec<TimeLeakRecord>>, InfraError> {
        self.records
            .lock()
            .map_err(|error| InfraError::Store(format!("in-memory store lock poisoned: {error}")))
    }

    fn apply_patch(record: &mut TimeLeakRecord, patch: &TimeLeakPatch) {
        if let Some(occurred_at) = patch.occurred_at {
            record.occurred_at = occurred_at;
        }
        if let Some(category_id) = &patch.category_id {
            record.category_id = category_id.clone();
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            record.duration_minutes = duration_minutes;
        }
        if let Some(note) = &patch.note {
            record.note = note.clone();
        }
    }
}

#[async_trait]
impl TimeLeakStoreClient for InMemoryTimeLeakStoreClient {
    async fn create(
        &self,
        _access_token: &str,
        input: &NewTimeLeak,
    ) -> Result<TimeLeakRecord, InfraError> {
        input.validate().map_err(InfraError::Store)?;
        let record = TimeLeakRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: input.user_id.clone(),
            occurred_at: input.occurred_at,
            created_at: (self.now_provider)(),
            category_id: input.category_id.clone(),
            duration_minutes: input.duration_minutes,
            note: input.note.clone(),
        };
        self.lock_records()?.push(record.clone());
        Ok(record)
    }

    async fn list_by_owner(
        &self,
        _access_token: &str,
        user_id: &str,
        range: &DateRange,
    ) -> Result<Vec<TimeLeakRecord>, InfraError> {
        let bounds = range.bounds(self.timezone).map_err(InfraError::Store)?;
        let mut matches: Vec<TimeLeakRecord> = self
            .lock_records()?
            .iter()
            .filter(|record| record.user_id == user_id && bounds.contains(record.occurred_at))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        Ok(matches)
    }

    async fn update(
        &self,
        _access_token: &str,
        id: i64,
        patch: &TimeLeakPatch,
    ) -> Result<TimeLeakRecord, InfraError> {
        let mut records = self.lock_records()?;
        let Some(record) = records.iter_mut().find(|record| record.id == id) else {
            return Err(zero_rows_updated_error());
        };
        Self::apply_patch(record, patch);
        Ok(record.clone())
    }

    async fn delete_by_id(&self, _access_token: &str, id: i64) -> Result<(), InfraError> {
        let mut records = self.lock_records()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Err(zero_rows_deleted_error());
        }
        Ok(())
    }
}

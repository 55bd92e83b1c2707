use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A stored time leak row. `id` and `created_at` are assigned by the store
/// and never change; `user_id` scopes every query and mutation to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeLeakRecord {
    pub id: i64,
    pub user_id: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub category_id: String,
    pub duration_minutes: Option<u32>,
    pub note: Option<String>,
}

/// Insert shape: everything the store assigns (`id`, `created_at`) is absent.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewTimeLeak {
    pub user_id: String,
    pub occurred_at: DateTime<Utc>,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewTimeLeak {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.user_id, "leak.user_id")?;
        validate_non_empty(&self.category_id, "leak.category_id")?;
        Ok(())
    }
}

/// Partial update addressed by `id`. Outer `None` leaves the column
/// unchanged store-side; inner `None` on `duration_minutes`/`note` clears
/// the column to NULL. The id travels in the request path, not the body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimeLeakPatch {
    #[serde(skip_serializing)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Option<String>>,
}

impl TimeLeakPatch {
    /// Stages a full working copy of a record so every mutable field is
    /// resettable from the edit form.
    pub fn for_record(record: &TimeLeakRecord) -> Self {
        Self {
            id: Some(record.id),
            occurred_at: Some(record.occurred_at),
            category_id: Some(record.category_id.clone()),
            duration_minutes: Some(record.duration_minutes),
            note: Some(record.note.clone()),
        }
    }

    pub fn empty(id: i64) -> Self {
        Self {
            id: Some(id),
            occurred_at: None,
            category_id: None,
            duration_minutes: None,
            note: None,
        }
    }
}

/// Calendar-date range for listings and reports. Both bounds are optional
/// and inclusive; `end` covers its whole calendar day, so picking "today"
/// as the end date still matches entries made later today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Resolves the range to UTC instants: the start at 00:00:00 of its day
    /// in `tz`, the end widened to 23:59:59.999 of its day in `tz`.
    pub fn bounds(&self, tz: Tz) -> Result<RangeBounds, String> {
        let start = match self.start {
            Some(date) => Some(instant_in_zone(date, tz, 0, 0, 0, 0)?),
            None => None,
        };
        let end = match self.end {
            Some(date) => Some(instant_in_zone(date, tz, 23, 59, 59, 999)?),
            None => None,
        };
        Ok(RangeBounds { start, end })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl RangeBounds {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if instant < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if instant > end {
                return false;
            }
        }
        true
    }
}

fn instant_in_zone(
    date: NaiveDate,
    tz: Tz,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
) -> Result<DateTime<Utc>, String> {
    let local = date
        .and_hms_milli_opt(hour, minute, second, milli)
        .ok_or_else(|| format!("invalid time of day {hour:02}:{minute:02}:{second:02}.{milli:03}"))?;
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant,
        // An ambiguous wall time (DST fall-back) resolves to the earlier
        // reading; both candidates fall inside the same calendar day.
        LocalResult::Ambiguous(earlier, _later) => earlier,
        LocalResult::None => {
            return Err(format!("{local} does not exist in timezone {tz}"));
        }
    };
    Ok(resolved.with_timezone(&Utc))
}

/// An authenticated session as handed out by the auth endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub email: Option<String>,
}

impl AuthSession {
    pub fn is_valid_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        self.expires_at > now + Duration::seconds(leeway_seconds)
            && !self.access_token.trim().is_empty()
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

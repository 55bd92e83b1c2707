use crate::application::notices::{self, Notice};
use crate::domain::categories::{self, UNKNOWN_LABEL};
use crate::domain::models::DateRange;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::store_client::TimeLeakStoreClient;
use chrono::{Months, NaiveDate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Per-label duration totals in first-seen order. The order matters: the
/// chart breaks ties by it instead of re-sorting alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub label: String,
    pub total_minutes: u64,
}

impl CategoryTotals {
    pub fn add(&mut self, label: &str, minutes: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.label == label) {
            entry.total_minutes += minutes;
        } else {
            self.entries.push(CategoryTotal {
                label: label.to_string(),
                total_minutes: minutes,
            });
        }
    }

    pub fn get(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.total_minutes)
    }

    pub fn entries(&self) -> &[CategoryTotal] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_minutes(&self) -> u64 {
        self.entries.iter().map(|entry| entry.total_minutes).sum()
    }
}

/// Fetches a user's events for a range and folds them into per-category
/// totals. Events without a duration still count toward their category
/// with zero minutes, so the category shows up in the report.
pub struct ReportingEngine<S>
where
    S: TimeLeakStoreClient,
{
    store_client: Arc<S>,
    user_id: String,
    access_token: String,
}

impl<S> ReportingEngine<S>
where
    S: TimeLeakStoreClient,
{
    pub fn new(
        store_client: Arc<S>,
        user_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            store_client,
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }

    pub async fn aggregate(&self, range: &DateRange) -> Result<CategoryTotals, InfraError> {
        let records = self
            .store_client
            .list_by_owner(&self.access_token, &self.user_id, range)
            .await?;

        let mut totals = CategoryTotals::default();
        for record in records {
            let raw = record.category_id.trim();
            let label = if raw.is_empty() {
                UNKNOWN_LABEL
            } else {
                categories::label_for(raw)
            };
            totals.add(label, u64::from(record.duration_minutes.unwrap_or(0)));
        }
        Ok(totals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

/// Chart-ready view of a totals mapping: bars sorted by value descending
/// (stable, so ties keep the totals' insertion order) plus the scale max.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChartData {
    pub bars: Vec<Bar>,
    pub max_value: u64,
}

impl BarChartData {
    pub fn from_totals(totals: &CategoryTotals) -> Self {
        let mut bars: Vec<Bar> = totals
            .entries()
            .iter()
            .map(|entry| Bar {
                label: entry.label.clone(),
                value: entry.total_minutes,
            })
            .collect();
        bars.sort_by(|a, b| b.value.cmp(&a.value));
        let max_value = bars.first().map(|bar| bar.value).unwrap_or(0);
        Self { bars, max_value }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Pixel height of a bar. A chart where every total is zero renders
    /// all bars at zero height instead of dividing by zero.
    pub fn bar_height(&self, value: u64, chart_height: u32) -> u32 {
        if self.max_value == 0 {
            return 0;
        }
        ((value * u64::from(chart_height)) / self.max_value) as u32
    }
}

/// Statistics screen workflow: `Loading` until the first report lands,
/// then `Ready` (possibly with an empty chart) or `Failed`. An empty chart
/// and a failed fetch are never conflated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportState {
    Loading,
    Ready(BarChartData),
    Failed,
}

pub struct ReportScreen<S>
where
    S: TimeLeakStoreClient,
{
    engine: ReportingEngine<S>,
    range: Mutex<DateRange>,
    state: Mutex<ReportState>,
    in_flight: AtomicBool,
}

impl<S> ReportScreen<S>
where
    S: TimeLeakStoreClient,
{
    /// Opens the screen with the default range: one month back through
    /// today.
    pub fn new(engine: ReportingEngine<S>, today: NaiveDate) -> Self {
        Self {
            engine,
            range: Mutex::new(default_range(today)),
            state: Mutex::new(ReportState::Loading),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn range(&self) -> Result<DateRange, InfraError> {
        Ok(self.lock_range()?.clone())
    }

    pub fn set_range(&self, range: DateRange) -> Result<(), InfraError> {
        *self.lock_range()? = range;
        Ok(())
    }

    pub fn state(&self) -> Result<ReportState, InfraError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|error| InfraError::Store(format!("report state lock poisoned: {error}")))
    }

    /// Regenerates the chart for the current range. Returns `None` while a
    /// generation is already in flight or on success; failures yield the
    /// "could not load" notice and the `Failed` state.
    pub async fn generate(&self) -> Option<Notice> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return None;
        }
        if let Ok(mut state) = self.state.lock() {
            *state = ReportState::Loading;
        }

        let range = match self.range() {
            Ok(range) => range,
            Err(error) => {
                self.in_flight.store(false, Ordering::SeqCst);
                return Some(notices::could_not_load(&error));
            }
        };

        let outcome = self.engine.aggregate(&range).await;
        self.in_flight.store(false, Ordering::SeqCst);

        match outcome {
            Ok(totals) => {
                if let Ok(mut state) = self.state.lock() {
                    *state = ReportState::Ready(BarChartData::from_totals(&totals));
                }
                None
            }
            Err(error) => {
                if let Ok(mut state) = self.state.lock() {
                    *state = ReportState::Failed;
                }
                Some(notices::could_not_load(&error))
            }
        }
    }

    fn lock_range(&self) -> Result<std::sync::MutexGuard<'_, DateRange>, InfraError> {
        self.range
            .lock()
            .map_err(|error| InfraError::Store(format!("report range lock poisoned: {error}")))
    }
}

fn default_range(today: NaiveDate) -> DateRange {
    let start = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(today);
    DateRange::between(start, today)
}

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::lifecycle::{EventDraft, EventLifecycleManager, ListState};
pub use application::notices::{Notice, NoticeKind};
pub use application::reporting::{
    Bar, BarChartData, CategoryTotal, CategoryTotals, ReportScreen, ReportState, ReportingEngine,
};
pub use application::session::{EnsureSessionResult, SessionManager};
pub use domain::categories::{label_for, Category, CATEGORIES, UNKNOWN_LABEL};
pub use domain::models::{
    AuthSession, DateRange, NewTimeLeak, TimeLeakPatch, TimeLeakRecord,
};
pub use infrastructure::auth_client::{AuthHttpClient, ReqwestAuthClient};
pub use infrastructure::config::{load_store_config_from_env, StoreConfig};
pub use infrastructure::error::InfraError;
pub use infrastructure::logging::OperationLog;
pub use infrastructure::session_store::{
    InMemorySessionStore, KeyringSessionStore, SessionStore,
};
pub use infrastructure::store_client::{
    InMemoryTimeLeakStoreClient, ReqwestTimeLeakStoreClient, TimeLeakStoreClient,
};

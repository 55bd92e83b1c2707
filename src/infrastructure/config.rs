use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const APP_JSON: &str = "app.json";
const STORE_JSON: &str = "store.json";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub store: serde_json::Value,
}

/// Connection settings for the hosted store. The anon key is a secret and
/// only ever resolves from the environment, never from a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub project_url: String,
    pub anon_key: String,
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "LeakLog",
                "timezone": "UTC"
            }),
        ),
        (
            STORE_JSON,
            serde_json::json!({
                "schema": 1,
                "requestTimeoutSeconds": DEFAULT_REQUEST_TIMEOUT_SECONDS
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        store: read_config(&config_dir.join(STORE_JSON))?,
    })
}

pub fn read_timezone(config_dir: &Path) -> Result<Option<String>, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("timezone")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned))
}

/// Parses the configured timezone, defaulting to UTC when none is set.
pub fn resolve_timezone(config_dir: &Path) -> Result<Tz, InfraError> {
    match read_timezone(config_dir)? {
        Some(name) => Tz::from_str(&name)
            .map_err(|error| InfraError::InvalidConfig(format!("invalid timezone '{name}': {error}"))),
        None => Ok(chrono_tz::UTC),
    }
}

pub fn read_request_timeout_seconds(config_dir: &Path) -> Result<u64, InfraError> {
    let store = read_config(&config_dir.join(STORE_JSON))?;
    let timeout = store
        .get("requestTimeoutSeconds")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);
    if timeout == 0 {
        return Err(InfraError::InvalidConfig(
            "requestTimeoutSeconds must be > 0".to_string(),
        ));
    }
    Ok(timeout)
}

pub fn load_store_config_from_env() -> Result<StoreConfig, InfraError> {
    load_store_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn load_store_config_from_lookup<F>(lookup: F) -> Result<StoreConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let project_url = required_lookup_value(
        &lookup,
        &["LEAKLOG_SUPABASE_URL", "SUPABASE_URL"],
        "store project url",
    )?;
    let anon_key = required_lookup_value(
        &lookup,
        &["LEAKLOG_SUPABASE_ANON_KEY", "SUPABASE_ANON_KEY"],
        "store anon key",
    )?;

    Ok(StoreConfig {
        project_url,
        anon_key,
    })
}

fn required_lookup_value<F>(lookup: &F, keys: &[&str], label: &str) -> Result<String, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    for key in keys {
        if let Some(value) = lookup(key).map(|value| value.trim().to_string()) {
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    Err(InfraError::InvalidConfig(format!(
        "{label} is not configured; set {}",
        keys.join(" or ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_DIR: AtomicUsize = AtomicUsize::new(0);

    struct TempConfigDir {
        path: PathBuf,
    }

    impl TempConfigDir {
        fn new() -> Self {
            let sequence = NEXT_TEMP_DIR.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "leaklog-config-tests-{}-{}",
                std::process::id(),
                sequence
            ));
            fs::create_dir_all(&path).expect("create temp config dir");
            Self { path }
        }
    }

    impl Drop for TempConfigDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn defaults_are_written_once_and_loadable() {
        let dir = TempConfigDir::new();
        ensure_default_configs(&dir.path).expect("write defaults");
        let bundle = load_configs(&dir.path).expect("load configs");
        assert_eq!(bundle.app["appName"], "LeakLog");
        assert_eq!(
            bundle.store["requestTimeoutSeconds"],
            DEFAULT_REQUEST_TIMEOUT_SECONDS
        );

        // A second pass must not clobber user edits.
        let app_path = dir.path.join(APP_JSON);
        fs::write(
            &app_path,
            "{\"schema\": 1, \"appName\": \"Edited\", \"timezone\": \"Europe/Madrid\"}\n",
        )
        .expect("edit app config");
        ensure_default_configs(&dir.path).expect("re-run defaults");
        let bundle = load_configs(&dir.path).expect("reload configs");
        assert_eq!(bundle.app["appName"], "Edited");
    }

    #[test]
    fn unsupported_schema_is_rejected() {
        let dir = TempConfigDir::new();
        fs::write(dir.path.join(APP_JSON), "{\"schema\": 2}\n").expect("write config");
        let result = read_timezone(&dir.path);
        assert!(matches!(result, Err(InfraError::InvalidConfig(_))));
    }

    #[test]
    fn timezone_resolves_and_defaults_to_utc() {
        let dir = TempConfigDir::new();
        ensure_default_configs(&dir.path).expect("write defaults");
        assert_eq!(resolve_timezone(&dir.path).expect("resolve"), chrono_tz::UTC);

        fs::write(
            dir.path.join(APP_JSON),
            "{\"schema\": 1, \"timezone\": \"Europe/Madrid\"}\n",
        )
        .expect("edit config");
        assert_eq!(
            resolve_timezone(&dir.path).expect("resolve"),
            chrono_tz::Europe::Madrid
        );

        fs::write(
            dir.path.join(APP_JSON),
            "{\"schema\": 1, \"timezone\": \"Mars/Olympus\"}\n",
        )
        .expect("edit config");
        assert!(matches!(
            resolve_timezone(&dir.path),
            Err(InfraError::InvalidConfig(_))
        ));
    }

    #[test]
    fn store_config_lookup_prefers_app_specific_keys() {
        let config = load_store_config_from_lookup(|key| match key {
            "LEAKLOG_SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
            "SUPABASE_URL" => Some("https://ignored.supabase.co".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon-key".to_string()),
            _ => None,
        })
        .expect("load store config");
        assert_eq!(config.project_url, "https://project.supabase.co");
        assert_eq!(config.anon_key, "anon-key");
    }

    #[test]
    fn missing_store_settings_are_reported() {
        let result = load_store_config_from_lookup(|_key| None);
        let Err(InfraError::InvalidConfig(message)) = result else {
            panic!("expected invalid config error");
        };
        assert!(message.contains("LEAKLOG_SUPABASE_URL"));
    }
}

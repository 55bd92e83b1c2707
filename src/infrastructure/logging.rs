use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE: &str = "operations.log";

/// Append-only JSON-lines log of workflow outcomes. Logging must never take
/// a workflow down, so every failure in here is swallowed.
#[derive(Debug)]
pub struct OperationLog {
    path: PathBuf,
    guard: Mutex<()>,
}

impl OperationLog {
    pub fn new(logs_dir: &Path) -> Self {
        Self {
            path: logs_dir.join(LOG_FILE),
            guard: Mutex::new(()),
        }
    }

    pub fn info(&self, operation: &str, message: &str) {
        self.append("info", operation, message);
    }

    pub fn error(&self, operation: &str, message: &str) {
        self.append("error", operation, message);
    }

    fn append(&self, level: &str, operation: &str, message: &str) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "operation": operation,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(file, "{payload}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_TEMP_DIR: AtomicUsize = AtomicUsize::new(0);

    #[test]
    fn appends_one_json_line_per_entry() {
        let sequence = NEXT_TEMP_DIR.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "leaklog-log-tests-{}-{}",
            std::process::id(),
            sequence
        ));
        fs::create_dir_all(&dir).expect("create temp logs dir");

        let log = OperationLog::new(&dir);
        log.info("submit_new", "registered time leak id=1");
        log.error("refresh", "store error: boom");

        let raw = fs::read_to_string(dir.join(LOG_FILE)).expect("read log file");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json line");
        assert_eq!(first["level"], "info");
        assert_eq!(first["operation"], "submit_new");
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("valid json line");
        assert_eq!(second["level"], "error");

        let _ = fs::remove_dir_all(&dir);
    }
}

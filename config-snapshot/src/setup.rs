//! Lookup of the live configuration directory and a description of what is
//! installed in it. The description is stored verbatim in each manifest.

use crate::fs::walker::list_files_recursive;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Default live configuration directory: `$HOME/.claude`.
pub fn claude_dir() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(".claude"))
}

/// Describes the components currently installed in a configuration tree.
pub trait SetupDetector: Send + Sync {
    fn detect(&self, config_dir: &Path) -> Value;
}

impl<F> SetupDetector for F
where
    F: Fn(&Path) -> Value + Send + Sync,
{
    fn detect(&self, config_dir: &Path) -> Value {
        self(config_dir)
    }
}

/// Scans the configuration tree for agents, skills, hooks and the two
/// top-level JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryDetector;

impl SetupDetector for DirectoryDetector {
    fn detect(&self, config_dir: &Path) -> Value {
        let ecosystem_path = config_dir.join("ecosystem.json");
        let ecosystem_version = std::fs::read_to_string(&ecosystem_path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
            .and_then(|v| v.get("version").and_then(Value::as_str).map(str::to_string));

        json!({
            "exists": config_dir.is_dir(),
            "agents": count_agents(&config_dir.join("agents")),
            "skills": count_subdirs(&config_dir.join("skills")),
            "hooks": list_files_recursive(&config_dir.join("hooks")).len(),
            "settings": config_dir.join("settings.json").is_file(),
            "ecosystem": ecosystem_path.is_file(),
            "ecosystemVersion": ecosystem_version,
        })
    }
}

fn count_agents(dir: &Path) -> usize {
    list_files_recursive(dir)
        .iter()
        .filter(|p| p.ends_with(".md"))
        .count()
}

fn count_subdirs(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .count()
        })
        .unwrap_or(0)
}

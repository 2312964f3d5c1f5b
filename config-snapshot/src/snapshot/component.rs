//! Component categories used to filter what is captured or restored.

use crate::utils::SnapshotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    All,
    Agents,
    Hooks,
    Skills,
    Settings,
    Ecosystem,
}

impl Component {
    /// Every concrete category, excluding the `all` marker.
    pub const CATEGORIES: [Component; 5] = [
        Component::Agents,
        Component::Hooks,
        Component::Skills,
        Component::Settings,
        Component::Ecosystem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::All => "all",
            Component::Agents => "agents",
            Component::Hooks => "hooks",
            Component::Skills => "skills",
            Component::Settings => "settings",
            Component::Ecosystem => "ecosystem",
        }
    }

    /// Whether a `/`-separated relative path belongs to this category.
    pub fn matches(&self, relative_path: &str) -> bool {
        match self {
            Component::All => true,
            Component::Agents => relative_path.starts_with("agents/"),
            Component::Hooks => relative_path.starts_with("hooks/"),
            Component::Skills => relative_path.starts_with("skills/"),
            Component::Settings => relative_path == "settings.json",
            Component::Ecosystem => relative_path == "ecosystem.json",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Component::All),
            "agents" => Ok(Component::Agents),
            "hooks" => Ok(Component::Hooks),
            "skills" => Ok(Component::Skills),
            "settings" => Ok(Component::Settings),
            "ecosystem" => Ok(Component::Ecosystem),
            other => Err(SnapshotError::UnknownComponent(other.to_string())),
        }
    }
}

/// True when the selection means "everything": it names `all`, or is empty.
pub fn selects_all(components: &[Component]) -> bool {
    components.is_empty() || components.contains(&Component::All)
}

/// Whether `relative_path` is covered by any of `components`.
pub fn is_selected(relative_path: &str, components: &[Component]) -> bool {
    selects_all(components) || components.iter().any(|c| c.matches(relative_path))
}

/// Keep only the paths covered by `components`, preserving order.
pub fn filter_paths(paths: &[String], components: &[Component]) -> Vec<String> {
    paths
        .iter()
        .filter(|p| is_selected(p, components))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> Vec<String> {
        [
            "agents/tester.md",
            "agents-old/readme.md",
            "hooks/pre.py",
            "skills/review/SKILL.md",
            "settings.json",
            "settings.json.bak",
            "ecosystem.json",
            "projects/x/notes.md",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_prefix_and_exact_matching() {
        assert!(Component::Agents.matches("agents/a.md"));
        assert!(!Component::Agents.matches("agents"));
        assert!(!Component::Agents.matches("agents-old/readme.md"));
        assert!(Component::Settings.matches("settings.json"));
        assert!(!Component::Settings.matches("settings.json.bak"));
        assert!(!Component::Settings.matches("nested/settings.json"));
    }

    #[test]
    fn test_filter_union_of_categories() {
        let selected = filter_paths(&paths(), &[Component::Hooks, Component::Ecosystem]);
        assert_eq!(selected, vec!["hooks/pre.py", "ecosystem.json"]);
    }

    #[test]
    fn test_all_marker_selects_everything() {
        assert_eq!(filter_paths(&paths(), &[Component::Agents, Component::All]), paths());
        assert_eq!(filter_paths(&paths(), &[]), paths());
    }

    #[test]
    fn test_parse_selector_strings() {
        for c in Component::CATEGORIES {
            assert_eq!(c.as_str().parse::<Component>().unwrap(), c);
        }
        assert_eq!("all".parse::<Component>().unwrap(), Component::All);
        assert!("commands".parse::<Component>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&vec![Component::Skills, Component::All]).unwrap();
        assert_eq!(json, r#"["skills","all"]"#);
    }
}

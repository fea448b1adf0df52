use std::fmt::Display;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A scalar configuration value as it arrives from a TOML file or the
/// command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Whether the value would enable an option. `false`, `0`, `0.0` and
    /// the empty string do not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::Str(v) => !v.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

pub const SECTION_TOOLS: &str = "tools";

const SECTION_WORKFLOW: &str = "workflow";
const SECTION_MSFILE: &str = "msfile";
const SECTION_FASTA: &str = "fasta";
const SECTION_OUTPUT: &str = "output";

/// The shared parameter store for a run: core identifiers plus a
/// section -> option -> value map for every tool.
///
/// The store is cheap to clone. A run takes a clone up front so that
/// later mutation never reaches a sequence already in flight.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ms_files: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fasta_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(flatten)]
    sections: IndexMap<String, IndexMap<String, Value>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value. Four reserved section names route to the core
    /// fields instead of the section map.
    pub fn set<V: Into<Value>>(&mut self, section: &str, key: &str, value: V) {
        let value = value.into();
        match section {
            SECTION_WORKFLOW => self.workflow = Some(value.to_string()),
            SECTION_MSFILE => self.ms_files.push(PathBuf::from(value.to_string())),
            SECTION_FASTA => self.fasta_path = Some(PathBuf::from(value.to_string())),
            SECTION_OUTPUT => self.output_dir = Some(PathBuf::from(value.to_string())),
            _ => {
                self.sections
                    .entry(section.to_string())
                    .or_default()
                    .insert(key.to_string(), value);
            }
        }
    }

    /// Look up a value. Unknown sections and keys are not an error,
    /// they just come back empty.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|s| s.get(key))
    }

    /// The value rendered to its command line spelling, if set.
    pub fn get_str(&self, section: &str, key: &str) -> Option<String> {
        self.get(section, key).map(|v| v.to_string())
    }

    pub fn is_truthy(&self, section: &str, key: &str) -> bool {
        self.get(section, key).map(|v| v.is_truthy()).unwrap_or(false)
    }

    /// The configured executable path for a tool, or `None` when the
    /// path was never set or left blank.
    pub fn tool_path(&self, tool: &str) -> Option<String> {
        self.get(SECTION_TOOLS, tool)
            .filter(|v| v.is_truthy())
            .map(|v| v.to_string())
    }

    pub fn add_ms_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.ms_files.push(path.into());
    }

    pub fn clear_ms_files(&mut self) {
        self.ms_files.clear();
    }

    pub fn output_dir_str(&self) -> Option<String> {
        self.output_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    pub fn fasta_path_str(&self) -> Option<String> {
        self.fasta_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Where artifacts derived from `input` land: the configured output
    /// directory when there is one, the input's own directory otherwise.
    pub fn destination_for(&self, input: &Path) -> PathBuf {
        match self.output_dir.as_ref() {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }

    pub fn sections(&self) -> &IndexMap<String, IndexMap<String, Value>> {
        &self.sections
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(Value::from(true).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0i64).is_truthy());
        assert!(Value::from(-3i64).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
        assert!(Value::from(0.5).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
    }

    #[test]
    fn test_set_get_fallback() {
        let mut config = ConfigStore::new();
        config.set("topfd", "max-charge", 30i64);
        assert_eq!(config.get("topfd", "max-charge"), Some(&Value::Int(30)));
        assert_eq!(config.get("topfd", "no-such-key"), None);
        assert_eq!(config.get("no-such-section", "max-charge"), None);
        assert_eq!(config.get_str("topfd", "max-charge").as_deref(), Some("30"));
    }

    #[test]
    fn test_reserved_sections() {
        let mut config = ConfigStore::new();
        config.set("workflow", "", "TopPIC Suite");
        config.set("msfile", "", "/data/run1.raw");
        config.set("msfile", "", "/data/run2.raw");
        config.set("fasta", "", "/data/db.fasta");
        config.set("output", "", "/data/out");

        assert_eq!(config.workflow.as_deref(), Some("TopPIC Suite"));
        assert_eq!(config.ms_files.len(), 2);
        assert_eq!(config.fasta_path.as_deref(), Some(Path::new("/data/db.fasta")));
        assert_eq!(config.output_dir.as_deref(), Some(Path::new("/data/out")));

        config.clear_ms_files();
        assert!(config.ms_files.is_empty());
    }

    #[test]
    fn test_tool_path_blank_is_unset() {
        let mut config = ConfigStore::new();
        assert_eq!(config.tool_path("topfd"), None);
        config.set("tools", "topfd", "");
        assert_eq!(config.tool_path("topfd"), None);
        config.set("tools", "topfd", "/opt/toppic/topfd");
        assert_eq!(config.tool_path("topfd").as_deref(), Some("/opt/toppic/topfd"));
    }

    #[test]
    fn test_destination_for() {
        let mut config = ConfigStore::new();
        let input = Path::new("/data/runs/sample.raw");
        assert_eq!(config.destination_for(input), Path::new("/data/runs"));
        config.output_dir = Some(PathBuf::from("/data/out"));
        assert_eq!(config.destination_for(input), Path::new("/data/out"));
    }

    #[test]
    fn test_snapshot_isolation() {
        let mut config = ConfigStore::new();
        config.set("toppic", "activation", "FILE");
        let snapshot = config.clone();
        config.set("toppic", "activation", "CID");
        assert_eq!(
            snapshot.get_str("toppic", "activation").as_deref(),
            Some("FILE")
        );
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use tdpipe::config::{ConfigStore, Value};
use tdpipe::runner::{self, RunEvent, FINISHED_SENTINEL, INTERRUPTED_LINE};
use tdpipe::workflow::{PreparedRun, WorkflowError, WorkflowKind};

use crate::progress::ProgressRecord;
use crate::sink::RunLog;

#[derive(Debug, Error)]
pub enum TDPipeError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Failed to read the configuration: {0}")]
    Config(#[from] figment::Error),
    #[error("Failed to render the configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),
}

fn default_workflow() -> String {
    WorkflowKind::default().name().to_string()
}

/// Run chains of top-down proteomics command line tools in sequence.
///
/// Assemble the command list for the selected workflow from the layered
/// configuration, execute it on a background thread, and stream the
/// surviving output lines to STDOUT and the run log.
#[derive(Parser, Debug, Deserialize, Serialize)]
#[command(author, version)]
pub struct TDPiper {
    /// The mass spectrometry data files to process
    #[arg()]
    #[serde(default)]
    pub input_files: Vec<PathBuf>,

    /// The workflow to run, by its mode name
    #[arg(short = 'w', long = "workflow", default_value = "TopPIC Suite")]
    #[serde(default = "default_workflow")]
    pub workflow: String,

    /// The protein database to search, as a FASTA file
    #[arg(short = 'd', long = "database")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// The directory that receives generated artifacts and the run log.
    ///
    /// When omitted, each stage writes next to its input file.
    #[arg(short = 'o', long = "output-dir")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// A TOML configuration file to read additional parameters from.
    ///
    /// Tool sections like `[tools]`, `[msconvert]` or `[topfd]` come from
    /// this file. Environment variables prefixed with `TDPIPER_` will be
    /// read too.
    #[arg(short = 'c', long = "config-file")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Write the merged configuration to a TOML file and exit
    #[arg(long = "save-config")]
    #[serde(skip)]
    pub save_config: Option<PathBuf>,

    /// The path to write a diagnostics log to, in addition to STDERR
    #[arg(short = 'l', long = "log-file")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Per-tool option sections gathered from the configuration sources
    #[arg(skip)]
    #[serde(flatten)]
    pub sections: IndexMap<String, IndexMap<String, Value>>,
}

impl TDPiper {
    /// Resolve the final configuration: command line values first, then
    /// the configuration file, then the environment on top.
    pub fn layered(self) -> Result<Self, TDPipeError> {
        let mut config = Figment::new().merge(Serialized::defaults(&self));
        if let Some(path) = &self.config_file {
            config = config.merge(Toml::file_exact(path));
        }
        config = config.merge(Env::prefixed("TDPIPER_"));
        let mut layered: Self = config.extract()?;
        layered.config_file = self.config_file;
        layered.save_config = self.save_config;
        Ok(layered)
    }

    /// The parameter store the command builders read from.
    pub fn config_store(&self) -> ConfigStore {
        let mut config = ConfigStore::new();
        config.workflow = Some(self.workflow.clone());
        config.ms_files = self.input_files.clone();
        config.fasta_path = self.database.clone();
        config.output_dir = self.output_dir.clone();
        for (section, options) in &self.sections {
            for (key, value) in options {
                config.set(section, key, value.clone());
            }
        }
        config
    }

    fn save_snapshot(&self, path: &Path) -> Result<(), TDPipeError> {
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        info!("Wrote configuration to {}", path.display());
        Ok(())
    }

    pub fn main(&self) -> Result<(), TDPipeError> {
        info!(
            "tdpiper v{}",
            option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
        );
        if let Some(path) = &self.save_config {
            return self.save_snapshot(path);
        }

        let workflow: WorkflowKind = self.workflow.parse()?;
        info!("Workflow: {workflow}");
        if !self.input_files.is_empty() {
            info!(
                "Inputs: {}",
                self.input_files.iter().map(|p| p.display()).join(", ")
            );
        }

        let config = self.config_store();
        let run = workflow.prepare(&config);
        self.run_commands(run, &config)
    }

    fn run_commands(&self, run: PreparedRun, config: &ConfigStore) -> Result<(), TDPipeError> {
        let mut log = RunLog::new(config.output_dir.clone());
        let mut prog = ProgressRecord::default();
        let start = Instant::now();

        let handle = runner::start(run);
        for event in handle.events().iter() {
            match event {
                RunEvent::CommandStarted(echo) => {
                    println!("{echo}");
                    log.record(&echo);
                    prog.commands_run += 1;
                }
                RunEvent::Line(line) => {
                    println!("{line}");
                    log.record(&line);
                    prog.lines_emitted += 1;
                }
                RunEvent::CommandSkipped(note) => {
                    warn!("{note}");
                    log.record(&note);
                    prog.commands_skipped += 1;
                }
                RunEvent::CommandExited(status) => {
                    if !status.success() {
                        warn!("Command exited with {status}");
                        prog.commands_failed += 1;
                    }
                }
                RunEvent::Interrupted => {
                    println!("{INTERRUPTED_LINE}");
                    log.record(INTERRUPTED_LINE);
                    log.close();
                }
                RunEvent::Finished => {
                    println!("{FINISHED_SENTINEL}");
                    log.record(FINISHED_SENTINEL);
                    log.close();
                }
            }
        }
        handle.join();

        info!(
            "Commands run: {} | Commands skipped: {}",
            prog.commands_run, prog.commands_skipped
        );
        info!("Lines emitted: {}", prog.lines_emitted);
        if prog.commands_failed > 0 {
            warn!("Commands failed: {}", prog.commands_failed);
        }
        info!("Elapsed Time: {:0.3?}", start.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_config_store_from_cli() {
        let args = TDPiper::parse_from([
            "tdpiper",
            "/data/run1.raw",
            "/data/run2.raw",
            "-w",
            "topfd",
            "-d",
            "/db/human.fasta",
            "-o",
            "/out",
        ]);
        let config = args.config_store();
        assert_eq!(config.workflow.as_deref(), Some("topfd"));
        assert_eq!(config.ms_files.len(), 2);
        assert_eq!(config.fasta_path_str().as_deref(), Some("/db/human.fasta"));
        assert_eq!(config.output_dir_str().as_deref(), Some("/out"));
    }

    #[test]
    fn test_config_file_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
workflow = "toppic"

[tools]
toppic = "/opt/toppic/toppic"

[toppic]
activation = "FILE"
num-shift = 2
"#
        )
        .unwrap();

        let args = TDPiper::parse_from([
            "tdpiper",
            "/data/run1.raw",
            "-c",
            file.path().to_str().unwrap(),
        ]);
        let layered = args.layered().unwrap();
        assert_eq!(layered.workflow, "toppic");
        assert_eq!(layered.input_files.len(), 1);

        let config = layered.config_store();
        assert_eq!(config.tool_path("toppic").as_deref(), Some("/opt/toppic/toppic"));
        assert_eq!(config.get("toppic", "num-shift"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = TDPiper::parse_from(["tdpiper", "-c", "/no/such/file.toml"]);
        assert!(matches!(args.layered(), Err(TDPipeError::Config(_))));
    }

    #[test]
    fn test_snapshot_renders_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tools]
topfd = "topfd"
"#
        )
        .unwrap();
        let args = TDPiper::parse_from([
            "tdpiper",
            "-w",
            "topfd",
            "-c",
            file.path().to_str().unwrap(),
        ]);
        let layered = args.layered().unwrap();
        let text = toml::to_string_pretty(&layered).unwrap();
        assert!(text.contains(r#"workflow = "topfd""#));
        assert!(text.contains("[tools]"));
        assert!(!text.contains("save_config"));
    }
}

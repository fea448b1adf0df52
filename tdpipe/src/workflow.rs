use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::command::CommandSpec;
use crate::config::ConfigStore;
use crate::tools::{
    build_msconvert, build_mspathfinder, build_pbfgen, build_promex, build_spectrum_sum,
    build_topfd, build_topmg, build_toppic,
};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Unsupported workflow mode: {0}")]
    Unsupported(String),
}

/// The analysis pipelines this program knows how to drive, one variant
/// per selectable mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowKind {
    MSConvert,
    TopFD,
    TopPIC,
    TopMG,
    PbfGen,
    ProMex,
    MSPathFinder,
    InformedProteomicsMS1Only,
    #[default]
    ToppicSuite,
    SpectrumSum,
    InformedProteomicsFull,
}

impl WorkflowKind {
    pub const fn name(&self) -> &'static str {
        match self {
            WorkflowKind::MSConvert => "msconvert",
            WorkflowKind::TopFD => "topfd",
            WorkflowKind::TopPIC => "toppic",
            WorkflowKind::TopMG => "topmg",
            WorkflowKind::PbfGen => "pbfgen",
            WorkflowKind::ProMex => "promex",
            WorkflowKind::MSPathFinder => "mspathfinder",
            WorkflowKind::InformedProteomicsMS1Only => "Informed Proteomics MS1-Only",
            WorkflowKind::ToppicSuite => "TopPIC Suite",
            WorkflowKind::SpectrumSum => "sum spectrum",
            WorkflowKind::InformedProteomicsFull => "Informed Proteomics Full",
        }
    }

    /// Build the ordered command list for this pipeline from a
    /// configuration snapshot. Commands that cannot be built are
    /// dropped and their skip messages collected instead.
    pub fn prepare(&self, config: &ConfigStore) -> PreparedRun {
        let mut run = PreparedRun::default();
        let inputs = config.ms_files.clone();
        if inputs.is_empty() {
            return run;
        }
        match self {
            WorkflowKind::MSConvert => run.push(build_msconvert(config, &inputs)),
            WorkflowKind::TopFD => run.push(build_topfd(config, &inputs)),
            WorkflowKind::TopPIC => run.push(build_toppic(config, &inputs)),
            WorkflowKind::TopMG => run.push(build_topmg(config, &inputs)),
            WorkflowKind::PbfGen => {
                for input in &inputs {
                    run.push(build_pbfgen(config, input));
                }
            }
            WorkflowKind::ProMex => {
                for input in &inputs {
                    run.push(build_promex(config, input));
                }
            }
            WorkflowKind::MSPathFinder => run.push(build_mspathfinder(config, &inputs)),
            WorkflowKind::SpectrumSum => {
                for input in &inputs {
                    run.push(build_spectrum_sum(config, input));
                }
            }
            WorkflowKind::ToppicSuite => {
                run.push(build_msconvert(config, &inputs));
                let mzmls = derive_all(config, &inputs, ".mzML");
                run.push(build_topfd(config, &mzmls));
                let msaligns = derive_all(config, &mzmls, "_ms2.msalign");
                run.push(build_toppic(config, &msaligns));
            }
            WorkflowKind::InformedProteomicsFull => {
                for input in &inputs {
                    run.push(build_pbfgen(config, input));
                }
                let pbfs = derive_all(config, &inputs, ".pbf");
                for pbf in &pbfs {
                    run.push(build_promex(config, pbf));
                }
                run.push(build_mspathfinder(config, &pbfs));
            }
            WorkflowKind::InformedProteomicsMS1Only => {
                for input in &inputs {
                    run.push(build_pbfgen(config, input));
                }
                let pbfs = derive_all(config, &inputs, ".pbf");
                for pbf in &pbfs {
                    run.push(build_promex(config, pbf));
                }
            }
        }
        run
    }
}

impl Display for WorkflowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WorkflowKind {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msconvert" => Ok(WorkflowKind::MSConvert),
            "topfd" => Ok(WorkflowKind::TopFD),
            "toppic" => Ok(WorkflowKind::TopPIC),
            "topmg" => Ok(WorkflowKind::TopMG),
            "pbfgen" => Ok(WorkflowKind::PbfGen),
            "promex" => Ok(WorkflowKind::ProMex),
            "mspathfinder" => Ok(WorkflowKind::MSPathFinder),
            "Informed Proteomics MS1-Only" => Ok(WorkflowKind::InformedProteomicsMS1Only),
            "TopPIC Suite" => Ok(WorkflowKind::ToppicSuite),
            "sum spectrum" => Ok(WorkflowKind::SpectrumSum),
            "Informed Proteomics Full" => Ok(WorkflowKind::InformedProteomicsFull),
            _ => Err(WorkflowError::Unsupported(s.to_string())),
        }
    }
}

/// An ordered command sequence ready for the runner, with the skip
/// messages produced while assembling it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PreparedRun {
    pub commands: Vec<CommandSpec>,
    pub notes: Vec<String>,
}

impl PreparedRun {
    fn push(&mut self, result: Result<CommandSpec, String>) {
        match result {
            Ok(command) => self.commands.push(command),
            Err(note) => self.notes.push(note),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Where a stage's artifact for `input` lands: its file stem plus
/// `suffix`, in the run's destination directory.
fn derive_artifact(config: &ConfigStore, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    config.destination_for(input).join(format!("{stem}{suffix}"))
}

fn derive_all(config: &ConfigStore, inputs: &[PathBuf], suffix: &str) -> Vec<PathBuf> {
    inputs
        .iter()
        .map(|input| derive_artifact(config, input, suffix))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn suite_config() -> ConfigStore {
        let mut config = ConfigStore::new();
        config.set("tools", "msconvert", "msconvert");
        config.set("tools", "topfd", "topfd");
        config.set("tools", "toppic", "toppic");
        config.set("fasta", "", "/db/human.fasta");
        config.set("output", "", "/out");
        config.add_ms_file("/data/run1.raw");
        config.add_ms_file("/data/run2.raw");
        config
    }

    #[test]
    fn test_mode_names_round_trip() {
        for kind in [
            WorkflowKind::MSConvert,
            WorkflowKind::TopFD,
            WorkflowKind::TopPIC,
            WorkflowKind::TopMG,
            WorkflowKind::PbfGen,
            WorkflowKind::ProMex,
            WorkflowKind::MSPathFinder,
            WorkflowKind::InformedProteomicsMS1Only,
            WorkflowKind::ToppicSuite,
            WorkflowKind::SpectrumSum,
            WorkflowKind::InformedProteomicsFull,
        ] {
            assert_eq!(kind.name().parse::<WorkflowKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_mode() {
        let err = "toppic suite".parse::<WorkflowKind>().unwrap_err();
        assert!(err.to_string().contains("toppic suite"));
    }

    #[test]
    fn test_empty_inputs_yield_no_commands() {
        let mut config = suite_config();
        config.clear_ms_files();
        let run = WorkflowKind::ToppicSuite.prepare(&config);
        assert!(run.is_empty());
        assert!(run.notes.is_empty());
    }

    #[test]
    fn test_suite_stage_chain() {
        let run = WorkflowKind::ToppicSuite.prepare(&suite_config());
        assert_eq!(run.commands.len(), 3);
        assert!(run.notes.is_empty());

        let topfd = &run.commands[1];
        assert_eq!(
            topfd.args(),
            &["/out/run1.mzML", "/out/run2.mzML"]
        );
        let toppic = &run.commands[2];
        assert_eq!(
            toppic.args(),
            &[
                "/db/human.fasta",
                "/out/run1_ms2.msalign",
                "/out/run2_ms2.msalign"
            ]
        );
    }

    #[test]
    fn test_suite_missing_tool_drops_stage_only() {
        let mut config = suite_config();
        config.set("tools", "topfd", "");
        let run = WorkflowKind::ToppicSuite.prepare(&config);
        assert_eq!(run.commands.len(), 2);
        assert_eq!(run.notes.len(), 1);
        assert!(run.notes[0].contains("TopFD path is empty"));
    }

    #[test]
    fn test_informed_proteomics_full_chain() {
        let mut config = ConfigStore::new();
        config.set("tools", "pbfgen", "PbfGen.exe");
        config.set("tools", "promex", "ProMex.exe");
        config.set("tools", "mspathfinder", "MSPathFinderT.exe");
        config.set("fasta", "", "/db/human.fasta");
        config.set("output", "", "/out");
        config.add_ms_file("/data/run1.raw");
        config.add_ms_file("/data/run2.raw");

        let run = WorkflowKind::InformedProteomicsFull.prepare(&config);
        // pbfgen x2, promex x2, mspathfinder x1
        assert_eq!(run.commands.len(), 5);
        let promex = &run.commands[2];
        assert!(promex.args().windows(2).any(|w| w == ["-i", "/out/run1.pbf"]));
        let finder = &run.commands[4];
        assert_eq!(
            &finder.args()[..3],
            &["-i", "/out/run1.pbf", "/out/run2.pbf"]
        );
    }

    #[test]
    fn test_ms1_only_omits_search() {
        let mut config = ConfigStore::new();
        config.set("tools", "pbfgen", "PbfGen.exe");
        config.set("tools", "promex", "ProMex.exe");
        config.add_ms_file("/data/run1.raw");
        let run = WorkflowKind::InformedProteomicsMS1Only.prepare(&config);
        assert_eq!(run.commands.len(), 2);
        assert!(run.notes.is_empty());
    }

    #[test]
    fn test_derived_paths_fall_back_to_input_dir() {
        let mut config = suite_config();
        config.output_dir = None;
        let run = WorkflowKind::ToppicSuite.prepare(&config);
        let topfd = &run.commands[1];
        assert_eq!(
            topfd.args(),
            &["/data/run1.mzML", "/data/run2.mzML"]
        );
    }

    #[test]
    fn test_per_file_modes_duplicate_notes() {
        let mut config = ConfigStore::new();
        config.add_ms_file("/data/a.raw");
        config.add_ms_file("/data/b.raw");
        let run = WorkflowKind::PbfGen.prepare(&config);
        assert!(run.is_empty());
        assert_eq!(run.notes.len(), 2);
    }
}

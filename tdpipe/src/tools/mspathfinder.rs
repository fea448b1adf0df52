use std::path::PathBuf;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::{extend_present_options, extend_switches, path_arg};

const SECTION: &str = "mspathfinder";

/// MSPathFinder distinguishes "not configured" from "set to zero", so
/// these are emitted on presence rather than truthiness.
const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("ic", "-ic"),
    ("MemMatches", "-MemMatches"),
    ("NumMatchesPerSpec", "-n"),
    ("ModificationFile", "-mod"),
    ("PMTolerance", "-t"),
    ("FragTolerance", "-f"),
    ("MinLength", "-MinLength"),
    ("MaxLength", "-MaxLength"),
    ("MinCharge", "-MinCharge"),
    ("MaxCharge", "-MaxCharge"),
    ("MinFragCharge", "-MinFragCharge"),
    ("MaxFragCharge", "-MaxFragCharge"),
    ("MinMass", "-MinMass"),
    ("MaxMass", "-MaxMass"),
    ("FeatureFile", "-feature"),
    ("ThreadCount", "-threads"),
    ("ActivationMethod", "-act"),
    ("ScansFile", "-scansFile"),
    ("ParamFile", "-ParamFile"),
];

const SWITCHES: &[(&str, &str)] = &[
    ("IncludeDecoys", "-IncludeDecoys"),
    ("overwrite", "-overwrite"),
    ("UseFlipScoring", "-flip"),
];

/// One MSPathFinder invocation: inputs and database first, then the
/// search options.
pub fn build_mspathfinder(
    config: &ConfigStore,
    inputs: &[PathBuf],
) -> Result<CommandSpec, String> {
    let program = config.tool_path(SECTION).ok_or_else(|| {
        "MSPathFinder path is empty, please check the configuration.".to_string()
    })?;

    let mut args = vec!["-i".to_string()];
    args.extend(inputs.iter().map(|p| path_arg(p)));

    if let Some(fasta) = config.fasta_path_str() {
        args.push("-d".to_string());
        args.push(fasta);
    }
    if let Some(dir) = config.output_dir_str() {
        args.push("-o".to_string());
        args.push(dir);
    }

    // TagSearch is rendered lowercase, the way the tool parses booleans
    if let Some(value) = config.get(SECTION, "TagSearch") {
        args.push("-TagSearch".to_string());
        args.push(value.to_string().to_lowercase());
    }

    extend_present_options(config, SECTION, VALUE_OPTIONS, &mut args);
    extend_switches(config, SECTION, SWITCHES, &mut args);

    // target-decoy analysis is tri-state: absent, on, off
    if let Some(tda) = config.get(SECTION, "tda") {
        args.push("-tda".to_string());
        args.push(if tda.is_truthy() { "1" } else { "0" }.to_string());
    }

    Ok(CommandSpec::new(program, args))
}

use std::path::PathBuf;

use crate::command::CommandSpec;
use crate::config::ConfigStore;
use crate::throttle::ProgressKind;

use super::{extend_switches, extend_value_options, path_arg};

const SECTION: &str = "topfd";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("activation", "--activation"),
    ("max-charge", "--max-charge"),
    ("max-mass", "--max-mass"),
    ("mz-error", "--mz-error"),
    ("ms-one-sn-ratio", "--ms-one-sn-ratio"),
    ("ms-two-sn-ratio", "--ms-two-sn-ratio"),
    ("precursor-window", "--precursor-window"),
    ("ecscore-cutoff", "--ecscore-cutoff"),
    ("min-scan-number", "--min-scan-number"),
    ("thread-number", "--thread-number"),
];

const SWITCHES: &[(&str, &str)] = &[
    ("missing-level-one", "--missing-level-one"),
    ("msdeconv", "--msdeconv"),
    ("single-scan-noise", "--single-scan-noise"),
    ("disable-additional-feature-search", "--disable-additional-feature-search"),
    ("disable-final-filtering", "--disable-final-filtering"),
    ("skip-html-folder", "--skip-html-folder"),
];

/// One TopFD invocation covering every input file.
pub fn build_topfd(config: &ConfigStore, inputs: &[PathBuf]) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "TopFD path is empty, please check the configuration.".to_string())?;

    let mut args = Vec::new();
    extend_value_options(config, SECTION, VALUE_OPTIONS, &mut args);
    extend_switches(config, SECTION, SWITCHES, &mut args);
    args.extend(inputs.iter().map(|p| path_arg(p)));

    Ok(CommandSpec::new(program, args).with_progress(ProgressKind::SpectrumScan))
}

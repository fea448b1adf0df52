use std::path::Path;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::{extend_switches, extend_value_options, path_arg};

const SECTION: &str = "promex";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("MinCharge", "-MinCharge"),
    ("MaxCharge", "-MaxCharge"),
    ("MinMass", "-MinMass"),
    ("MaxMass", "-MaxMass"),
    ("MaxThreads", "-MaxThreads"),
    ("BinResPPM", "-BinResPPM"),
    ("ScoreThreshold", "-ScoreThreshold"),
    ("ms1ft", "-ms1ft"),
    ("ParamFile", "-ParamFile"),
];

const SWITCHES: &[(&str, &str)] = &[("Score", "-Score"), ("csv", "-csv")];

/// One ProMex invocation per input file.
pub fn build_promex(config: &ConfigStore, input: &Path) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "Promex path is empty, please check the configuration.".to_string())?;

    let mut args = Vec::new();
    extend_value_options(config, SECTION, VALUE_OPTIONS, &mut args);
    extend_switches(config, SECTION, SWITCHES, &mut args);

    // FeatureMap defaults to on in the tool; only an explicit disable
    // is forwarded
    if let Some(value) = config.get(SECTION, "FeatureMap") {
        if !value.is_truthy() {
            args.push("-FeatureMap:false".to_string());
        }
    }

    args.push("-i".to_string());
    args.push(path_arg(input));
    if let Some(dir) = config.output_dir_str() {
        args.push("-o".to_string());
        args.push(dir);
    }

    Ok(CommandSpec::new(program, args))
}

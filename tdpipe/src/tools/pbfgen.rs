use std::path::Path;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::{extend_value_options, path_arg};

const SECTION: &str = "pbfgen";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("start", "-start"),
    ("end", "-end"),
    ("ParamFile", "-ParamFile"),
];

/// One PbfGen invocation per input file.
pub fn build_pbfgen(config: &ConfigStore, input: &Path) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "PBFGen path is empty, please check the configuration.".to_string())?;

    let mut args = Vec::new();
    extend_value_options(config, SECTION, VALUE_OPTIONS, &mut args);
    args.push("-i".to_string());
    args.push(path_arg(input));
    if let Some(dir) = config.output_dir_str() {
        args.push("-o".to_string());
        args.push(dir);
    }

    Ok(CommandSpec::new(program, args))
}

use std::path::Path;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::{extend_value_options, path_arg};

const SECTION: &str = "spectrum_sum";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("tool", "--tool"),
    ("method", "--method"),
    ("block_size", "--block-size"),
    ("start_scan", "--start-scan"),
    ("end_scan", "--end-scan"),
    ("ms_level", "--ms-level"),
    ("rt_tolerance", "--rt-tolerance"),
    ("mz_tolerance", "--mz-tolerance"),
];

/// One spectrum summing invocation per input file, run through the
/// configured python interpreter. The helper script location comes
/// from the `script` key of this section.
pub fn build_spectrum_sum(config: &ConfigStore, input: &Path) -> Result<CommandSpec, String> {
    let program = config.tool_path("python").ok_or_else(|| {
        "Python path is not set. Please configure it in the tools section.".to_string()
    })?;
    let script = config
        .get(SECTION, "script")
        .filter(|v| v.is_truthy())
        .map(|v| v.to_string())
        .ok_or_else(|| {
            "Spectrum summing script path is empty, please check the configuration.".to_string()
        })?;

    let mut args = vec![script];
    extend_value_options(config, SECTION, VALUE_OPTIONS, &mut args);
    args.push("--input".to_string());
    args.push(path_arg(input));
    if let Some(dir) = config.output_dir_str() {
        args.push("--output-dir".to_string());
        args.push(dir);
    }

    Ok(CommandSpec::new(program, args))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::testing::store_with_tool;

    #[test]
    fn test_missing_python_skips() {
        let err = build_spectrum_sum(&ConfigStore::new(), Path::new("a.mzML")).unwrap_err();
        assert!(err.contains("Python path is not set"));
    }

    #[test]
    fn test_missing_script_skips() {
        let config = store_with_tool("python", "/usr/bin/python3");
        let err = build_spectrum_sum(&config, Path::new("a.mzML")).unwrap_err();
        assert!(err.contains("script path is empty"));
    }

    #[test]
    fn test_per_file_command() {
        let mut config = store_with_tool("python", "/usr/bin/python3");
        config.set("spectrum_sum", "script", "/opt/tdpipe/spectrum_sum.py");
        config.set("spectrum_sum", "method", "block");
        config.set("spectrum_sum", "block_size", 5i64);
        config.set("output", "", "/out");
        let spec = build_spectrum_sum(&config, Path::new("/data/a.mzML")).unwrap();
        assert_eq!(
            spec.args(),
            &[
                "/opt/tdpipe/spectrum_sum.py",
                "--method",
                "block",
                "--block-size",
                "5",
                "--input",
                "/data/a.mzML",
                "--output-dir",
                "/out"
            ]
        );
    }
}

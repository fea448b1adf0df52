use std::path::PathBuf;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::toppic::CUSTOM_FIXED_MOD;
use super::{extend_switches, path_arg};

const SECTION: &str = "topmg";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("activation", "--activation"),
    ("fixed-mod", "--fixed-mod"),
    ("n-terminal-form", "--n-terminal-form"),
    ("mass-error-tolerance", "--mass-error-tolerance"),
    ("proteoform-error-tolerance", "--proteoform-error-tolerance"),
    ("max-shift", "--max-shift"),
    ("spectrum-cutoff-type", "--spectrum-cutoff-type"),
    ("spectrum-cutoff-value", "--spectrum-cutoff-value"),
    ("proteoform-cutoff-type", "--proteoform-cutoff-type"),
    ("proteoform-cutoff-value", "--proteoform-cutoff-value"),
    ("mod-file-name", "--mod-file-name"),
    ("thread-number", "--thread-number"),
    ("proteo-graph-gap", "--proteo-graph-gap"),
    ("var-ptm-in-gap", "--var-ptm-in-gap"),
    ("var-ptm", "--var-ptm"),
    ("num-shift", "--num-shift"),
    ("combined-file-name", "--combined-file-name"),
];

const SWITCHES: &[(&str, &str)] = &[
    ("decoy", "--decoy"),
    ("no-topfd-feature", "--no-topfd-feature"),
    ("use-asf-diagonal", "--use-asf-diagonal"),
    ("whole-protein-only", "--whole-protein-only"),
    ("keep-temp-files", "--keep-temp-files"),
    ("keep-decoy-ids", "--keep-decoy-ids"),
    ("skip-html-folder", "--skip-html-folder"),
];

/// One TopMG invocation: options, database, then the msalign inputs.
pub fn build_topmg(config: &ConfigStore, inputs: &[PathBuf]) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "TopMG path is empty, please check the configuration.".to_string())?;

    let mut args = Vec::new();
    for (key, flag) in VALUE_OPTIONS {
        let Some(value) = config.get(SECTION, key).filter(|v| v.is_truthy()) else {
            continue;
        };
        if *key == "fixed-mod" && value.as_str() == Some(CUSTOM_FIXED_MOD) {
            continue;
        }
        args.push(flag.to_string());
        args.push(value.to_string());
    }
    extend_switches(config, SECTION, SWITCHES, &mut args);
    if let Some(fasta) = config.fasta_path_str() {
        args.push(fasta);
    }
    args.extend(inputs.iter().map(|p| path_arg(p)));

    Ok(CommandSpec::new(program, args))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::testing::store_with_tool;

    #[test]
    fn test_missing_path_skips() {
        let err = build_topmg(&ConfigStore::new(), &[]).unwrap_err();
        assert!(err.contains("TopMG path is empty"));
    }

    #[test]
    fn test_custom_fixed_mod_excluded() {
        let mut config = store_with_tool("topmg", "topmg");
        config.set("topmg", "fixed-mod", "Custom");
        let spec = build_topmg(&config, &[]).unwrap();
        assert!(spec.args().is_empty());
    }

    #[test]
    fn test_graph_options() {
        let mut config = store_with_tool("topmg", "topmg");
        config.set("topmg", "proteo-graph-gap", 40i64);
        config.set("topmg", "use-asf-diagonal", true);
        config.set("fasta", "", "db.fasta");
        let spec = build_topmg(&config, &[PathBuf::from("a_ms2.msalign")]).unwrap();
        assert_eq!(
            spec.args(),
            &[
                "--proteo-graph-gap",
                "40",
                "--use-asf-diagonal",
                "db.fasta",
                "a_ms2.msalign"
            ]
        );
        assert!(spec.progress().is_none());
    }
}

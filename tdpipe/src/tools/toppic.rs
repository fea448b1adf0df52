use std::path::PathBuf;

use crate::command::CommandSpec;
use crate::config::ConfigStore;
use crate::throttle::ProgressKind;

use super::{extend_switches, path_arg};

const SECTION: &str = "toppic";

/// The fixed modification selector value meaning "configured through a
/// custom file", which must never reach the command line.
pub(crate) const CUSTOM_FIXED_MOD: &str = "Custom";

const VALUE_OPTIONS: &[(&str, &str)] = &[
    ("activation", "--activation"),
    ("fixed-mod", "--fixed-mod"),
    ("n-terminal-form", "--n-terminal-form"),
    ("num-shift", "--num-shift"),
    ("min-shift", "--min-shift"),
    ("max-shift", "--max-shift"),
    ("variable-ptm-num", "--variable-ptm-num"),
    ("variable-ptm-file-name", "--variable-ptm-file-name"),
    ("mass-error-tolerance", "--mass-error-tolerance"),
    ("proteoform-error-tolerance", "--proteoform-error-tolerance"),
    ("spectrum-cutoff-type", "--spectrum-cutoff-type"),
    ("spectrum-cutoff-value", "--spectrum-cutoff-value"),
    ("proteoform-cutoff-type", "--proteoform-cutoff-type"),
    ("proteoform-cutoff-value", "--proteoform-cutoff-value"),
    ("local-ptm-file-name", "--local-ptm-file-name"),
    ("miscore-threshold", "--miscore-threshold"),
    ("thread-number", "--thread-number"),
    ("num-combined-spectra", "--num-combined-spectra"),
    ("combined-file-name", "--combined-file-name"),
];

const SWITCHES: &[(&str, &str)] = &[
    ("decoy", "--decoy"),
    ("approximate-spectra", "--approximate-spectra"),
    ("lookup-table", "--lookup-table"),
    ("no-topfd-feature", "--no-topfd-feature"),
    ("keep-temp-files", "--keep-temp-files"),
    ("keep-decoy-ids", "--keep-decoy-ids"),
    ("skip-html-folder", "--skip-html-folder"),
];

/// One TopPIC invocation: options, then the protein database, then the
/// msalign inputs.
pub fn build_toppic(config: &ConfigStore, inputs: &[PathBuf]) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "TopPIC path is empty, please check the configuration.".to_string())?;

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

    Ok(CommandSpec::new(program, args).with_progress(ProgressKind::ShiftSearch))
}

//! One command builder per external tool. Every builder follows the
//! same shape: resolve the executable path from the `tools` section
//! (returning a skip message when it is blank), map set options to
//! their flags from a fixed table, append bare flags for enabled
//! booleans, then the tool's positional arguments in its own order.
//! Flag spellings match the tools' published interfaces exactly.

mod msconvert;
mod mspathfinder;
mod pbfgen;
mod promex;
mod spectrum_sum;
mod topfd;
mod topmg;
mod toppic;

pub use msconvert::build_msconvert;
pub use mspathfinder::build_mspathfinder;
pub use pbfgen::build_pbfgen;
pub use promex::build_promex;
pub use spectrum_sum::build_spectrum_sum;
pub use topfd::build_topfd;
pub use topmg::build_topmg;
pub use toppic::build_toppic;

use std::path::Path;

use crate::config::ConfigStore;

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Append `flag value` for each table entry whose config value is set
/// and truthy.
pub(crate) fn extend_value_options(
    config: &ConfigStore,
    section: &str,
    table: &[(&str, &str)],
    args: &mut Vec<String>,
) {
    for (key, flag) in table {
        if let Some(value) = config.get(section, key).filter(|v| v.is_truthy()) {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }
}

/// Append `flag value` for each table entry whose config value is set
/// at all. Zero and the empty string are emitted.
pub(crate) fn extend_present_options(
    config: &ConfigStore,
    section: &str,
    table: &[(&str, &str)],
    args: &mut Vec<String>,
) {
    for (key, flag) in table {
        if let Some(value) = config.get(section, key) {
            args.push(flag.to_string());
            args.push(value.to_string());
        }
    }
}

/// Append the bare flag for each enabled boolean option.
pub(crate) fn extend_switches(
    config: &ConfigStore,
    section: &str,
    table: &[(&str, &str)],
    args: &mut Vec<String>,
) {
    for (key, flag) in table {
        if config.is_truthy(section, key) {
            args.push(flag.to_string());
        }
    }
}

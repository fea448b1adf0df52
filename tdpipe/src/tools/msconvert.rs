use std::path::PathBuf;

use crate::command::CommandSpec;
use crate::config::ConfigStore;

use super::path_arg;

const SECTION: &str = "msconvert";

/// Always appended last so that downstream tools see spectrum titles
/// in a stable shape. The embedded quoting is what MSConvert expects to
/// receive in the argument itself.
const TITLE_MAKER: &str = r#""titleMaker <RunId>.<ScanNumber>.<ScanNumber>.<ChargeState> File:"""^<SourcePath^>""", NativeID:"""^<Id^>""""#;

/// One MSConvert invocation covering every input file.
pub fn build_msconvert(config: &ConfigStore, inputs: &[PathBuf]) -> Result<CommandSpec, String> {
    let program = config
        .tool_path(SECTION)
        .ok_or_else(|| "MSConvert path is empty, please check the configuration.".to_string())?;

    let mut args = vec!["--zlib".to_string()];

    let format_flag = match config.get_str(SECTION, "output_format").as_deref() {
        Some("mzML") => "--mzML",
        Some("mzXML") => "--mzXML",
        Some("mgf") => "--mgf",
        Some("ms1") => "--ms1",
        Some("ms2") => "--ms2",
        Some("cms1") => "--cms1",
        Some("cms2") => "--cms2",
        _ => "--mzML",
    };
    args.push(format_flag.to_string());

    let mz_flag = if config.get_str(SECTION, "mz_precision").as_deref() == Some("64") {
        "--mz64"
    } else {
        "--mz32"
    };
    args.push(mz_flag.to_string());

    let inten_flag = if config.get_str(SECTION, "intensity_precision").as_deref() == Some("64") {
        "--inten64"
    } else {
        "--inten32"
    };
    args.push(inten_flag.to_string());

    if let Some(dir) = config.output_dir_str() {
        args.push("-o".to_string());
        args.push(dir);
    }

    if config.is_truthy(SECTION, "peak_picking_enabled") {
        args.push("--filter".to_string());
        args.push(peak_picking_filter(config));
    }

    if config.is_truthy(SECTION, "scan_summing_enabled") {
        args.push("--filter".to_string());
        args.push(scan_summing_filter(config));
    }

    if config.is_truthy(SECTION, "subset_enabled") {
        extend_subset_filters(config, &mut args);
    }

    args.push("--filter".to_string());
    args.push(TITLE_MAKER.to_string());

    args.extend(inputs.iter().map(|p| path_arg(p)));

    Ok(CommandSpec::new(program, args))
}

fn truthy_str(config: &ConfigStore, key: &str) -> Option<String> {
    config
        .get(SECTION, key)
        .filter(|v| v.is_truthy())
        .map(|v| v.to_string())
}

fn peak_picking_filter(config: &ConfigStore) -> String {
    let algorithm =
        truthy_str(config, "peak_picking_algorithm").unwrap_or_else(|| "vendor".to_string());
    let ms_level_min =
        truthy_str(config, "peak_picking_ms_level_min").unwrap_or_else(|| "1".to_string());
    let ms_level_max =
        truthy_str(config, "peak_picking_ms_level_max").unwrap_or_else(|| "1000000".to_string());

    let mut filter = format!("\"peakPicking {algorithm} msLevel={ms_level_min}-{ms_level_max}");
    if algorithm == "cwt" {
        // cwt takes its own tuning knobs; zero is a meaningful setting
        if let Some(snr) = config.get(SECTION, "peak_picking_min_snr") {
            filter.push_str(&format!(" snr={snr}"));
        }
        if let Some(spacing) = config.get(SECTION, "peak_picking_peak_spacing") {
            filter.push_str(&format!(" peakSpace={spacing}"));
        }
    }
    filter.push('"');
    filter
}

fn scan_summing_filter(config: &ConfigStore) -> String {
    let mut filter = String::from("\"scanSumming ");
    if let Some(tol) = truthy_str(config, "scan_summing_precursor_tol") {
        filter.push_str(&format!("precursorTol={tol} "));
    }
    if let Some(tol) = truthy_str(config, "scan_summing_scan_time_tol") {
        filter.push_str(&format!("scanTimeTol={tol} "));
    }
    if let Some(tol) = truthy_str(config, "scan_summing_ion_mobility_tol") {
        filter.push_str(&format!("ionMobilityTol={tol} "));
    }
    if config.is_truthy(SECTION, "scan_summing_sum_ms1") {
        filter.push_str("sumMs1=1 ");
    } else {
        filter.push_str("sumMs1=0 ");
    }
    format!("{}\"", filter.trim_end())
}

fn extend_subset_filters(config: &ConfigStore, args: &mut Vec<String>) {
    subset_range_filter(config, "msLevel", "subset_ms_level_min", "subset_ms_level_max", args);
    subset_range_filter(
        config,
        "scanNumber",
        "subset_scan_number_min",
        "subset_scan_number_max",
        args,
    );

    // scanTime is an interval, not a dash range, and both ends have
    // fallbacks
    let time_min = truthy_str(config, "subset_scan_time_min");
    let time_max = truthy_str(config, "subset_scan_time_max");
    if time_min.is_some() || time_max.is_some() {
        let low = time_min.unwrap_or_else(|| "0".to_string());
        let high = time_max.unwrap_or_else(|| "1e8".to_string());
        args.push("--filter".to_string());
        args.push(format!("\"scanTime [{low},{high}]\""));
    }

    subset_range_filter(
        config,
        "scanEvent",
        "subset_scan_events_min",
        "subset_scan_events_max",
        args,
    );
    subset_range_filter(
        config,
        "chargeState",
        "subset_charge_states_min",
        "subset_charge_states_max",
        args,
    );
    subset_range_filter(
        config,
        "defaultArrayLength",
        "subset_data_points_min",
        "subset_data_points_max",
        args,
    );

    // collisionEnergy needs both bounds
    if let (Some(low), Some(high)) = (
        truthy_str(config, "subset_collision_energy_min"),
        truthy_str(config, "subset_collision_energy_max"),
    ) {
        args.push("--filter".to_string());
        args.push(format!(
            "\"collisionEnergy low={low} high={high} acceptNonCID=True acceptMissingCE=False\""
        ));
    }

    subset_choice_filter(config, "polarity", "subset_scan_polarity", args);
    subset_choice_filter(config, "activationType", "subset_activation_type", args);
    subset_choice_filter(config, "analyzerType", "subset_analysis_type", args);
}

fn subset_range_filter(
    config: &ConfigStore,
    name: &str,
    min_key: &str,
    max_key: &str,
    args: &mut Vec<String>,
) {
    let min = truthy_str(config, min_key);
    let max = truthy_str(config, max_key);
    if min.is_none() && max.is_none() {
        return;
    }
    let mut filter = format!("{name} ");
    if let Some(v) = min {
        filter.push_str(&v);
    }
    filter.push('-');
    if let Some(v) = max {
        filter.push_str(&v);
    }
    args.push("--filter".to_string());
    args.push(format!("\"{filter}\""));
}

fn subset_choice_filter(config: &ConfigStore, name: &str, key: &str, args: &mut Vec<String>) {
    if let Some(choice) = truthy_str(config, key).filter(|v| v != "Any") {
        args.push("--filter".to_string());
        args.push(format!("{name} {choice} "));
    }
}

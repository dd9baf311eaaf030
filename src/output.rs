//! Rendering of a finished calibration for the persistence side
//!
//! The core does not own a configuration store; these renderers produce the
//! text a user or a packaging script writes into one.

use std::fmt::Write as _;

use serde::Serialize;

use crate::calibration::{AxisCalibration, Padding};

/// Placeholder product name when the device name is unknown
pub const UNKNOWN_DEVICE: &str = "!!Name_Of_TouchScreen!!";

/// Output format for a calibration result
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// xorg.conf.d `InputClass` snippet
    Xorg,
    /// JSON document with the axis values, padding and storage area
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    device: &'a str,
    calibration: &'a AxisCalibration,
    padding: Padding,
    area: [f64; 4],
}

/// Render a calibration result in the requested format
pub fn render(
    axis: &AxisCalibration,
    format: OutputFormat,
    device_name: Option<&str>,
) -> Result<String, serde_json::Error> {
    let device = device_name.unwrap_or(UNKNOWN_DEVICE);
    match format {
        OutputFormat::Xorg => Ok(render_xorg_conf_d(axis, device)),
        OutputFormat::Json => serde_json::to_string_pretty(&JsonReport {
            device,
            calibration: axis,
            padding: axis.padding(),
            area: axis.area_for_storage(),
        }),
    }
}

/// Snippet for `/etc/X11/xorg.conf.d/99-calibration.conf`
///
/// `SwapXY` is only emitted when the axes need swapping.
pub fn render_xorg_conf_d(axis: &AxisCalibration, device: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Section \"InputClass\"");
    let _ = writeln!(out, "\tIdentifier\t\"calibration\"");
    let _ = writeln!(out, "\tMatchProduct\t\"{}\"", device);
    let _ = writeln!(out, "\tOption\t\"MinX\"\t\"{:.6}\"", axis.x_min);
    let _ = writeln!(out, "\tOption\t\"MaxX\"\t\"{:.6}\"", axis.x_max);
    let _ = writeln!(out, "\tOption\t\"MinY\"\t\"{:.6}\"", axis.y_min);
    let _ = writeln!(out, "\tOption\t\"MaxY\"\t\"{:.6}\"", axis.y_max);
    if axis.swap_xy {
        let _ = writeln!(
            out,
            "\tOption\t\"SwapXY\"\t\"1\" # unless it was already set to 1"
        );
    }
    let _ = writeln!(out, "EndSection");
    out
}

//! G-code metrics extraction.
//!
//! A single pass over the engine output recovers print time, layer count and
//! filament length. Parsing never fails: anything missing or malformed is
//! reported as a [`ParseWarning`] and the corresponding metric stays zero.
//!
//! Two annotation dialects are understood. `;TIME:`/`;LAYER_COUNT:` headers
//! win when present; otherwise PrusaSlicer's
//! `; estimated printing time (normal mode) = 1h 2m 3s` trailer and its
//! `;LAYER_CHANGE` markers are used.

use printquote_core::models::{GCodeMetrics, Material, ParseWarning, ParsedGCode};
use std::f64::consts::PI;

pub const FILAMENT_DIAMETER_MM: f64 = 1.75;

const TIME_MARKER: &str = ";TIME:";
const LAYER_COUNT_MARKER: &str = ";LAYER_COUNT:";
const ESTIMATED_TIME_MARKER: &str = "; estimated printing time (normal mode) =";
const LAYER_CHANGE_MARKER: &str = ";LAYER_CHANGE";

/// Malformed-value warnings beyond this many are dropped.
const MAX_MALFORMED_WARNINGS: usize = 20;

/// Parse engine output into metrics plus a completeness report.
///
/// Absolute extrusion (the default, `M82`) is cumulative, so the running
/// maximum is the filament length. Moves made after `M83` are relative and
/// are summed instead.
pub fn parse_gcode(text: &str, material: &str) -> ParsedGCode {
    let mut print_time: Option<f64> = None;
    let mut estimated_time: Option<f64> = None;
    let mut layer_count: Option<u32> = None;
    let mut layer_changes: u32 = 0;
    let mut max_extrusion = 0.0_f64;
    let mut relative_extrusion = 0.0_f64;
    let mut relative = false;
    let mut warnings = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end_matches('\r').trim_start();

        if let Some(value) = line.strip_prefix(TIME_MARKER) {
            match value.trim().parse::<f64>() {
                Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => print_time = Some(seconds),
                _ => push_malformed(&mut warnings, line_no, TIME_MARKER),
            }
            continue;
        }

        if let Some(value) = line.strip_prefix(LAYER_COUNT_MARKER) {
            match value.trim().parse::<u32>() {
                Ok(count) => layer_count = Some(count),
                Err(_) => push_malformed(&mut warnings, line_no, LAYER_COUNT_MARKER),
            }
            continue;
        }

        if let Some(value) = line.strip_prefix(ESTIMATED_TIME_MARKER) {
            match parse_duration(value) {
                Some(seconds) => estimated_time = Some(seconds),
                None => push_malformed(&mut warnings, line_no, "estimated printing time"),
            }
            continue;
        }

        if line.trim_end() == LAYER_CHANGE_MARKER {
            layer_changes = layer_changes.saturating_add(1);
            continue;
        }

        let code = match line.split_once(';') {
            Some((code, _comment)) => code,
            None => line,
        };
        let mut tokens = code.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        match command {
            "M82" | "m82" => {
                relative = false;
                continue;
            }
            "M83" | "m83" => {
                relative = true;
                continue;
            }
            _ => {}
        }
        if !is_linear_move(command) {
            continue;
        }

        for token in tokens {
            let Some(amount) = token.strip_prefix(['E', 'e']) else {
                continue;
            };
            match amount.parse::<f64>() {
                Ok(e) if e.is_finite() && relative => relative_extrusion += e,
                Ok(e) if e.is_finite() => max_extrusion = max_extrusion.max(e),
                _ => push_malformed(&mut warnings, line_no, "E"),
            }
        }
    }

    let print_time = print_time.or(estimated_time);
    let layer_count = layer_count.or((layer_changes > 0).then_some(layer_changes));
    let filament_length = max_extrusion + relative_extrusion.max(0.0);

    let mut missing = Vec::new();
    if print_time.is_none() {
        missing.push(ParseWarning::MissingPrintTime);
    }
    if layer_count.is_none() {
        missing.push(ParseWarning::MissingLayerCount);
    }
    if filament_length <= 0.0 {
        missing.push(ParseWarning::NoExtrusion);
    }
    missing.append(&mut warnings);

    let metrics = GCodeMetrics {
        print_time_seconds: print_time.unwrap_or(0.0),
        filament_length_mm: filament_length,
        filament_weight_grams: filament_weight_grams(filament_length, material),
        layer_count: layer_count.unwrap_or(0),
        material_type: material.to_string(),
    };

    ParsedGCode {
        metrics,
        warnings: missing,
    }
}

/// `1d 2h 3m 4s` style durations, any subset of units in that order.
fn parse_duration(value: &str) -> Option<f64> {
    let mut seconds = 0.0;
    let mut any = false;
    for part in value.split_whitespace() {
        let unit = part.chars().last()?;
        let amount: f64 = part[..part.len() - unit.len_utf8()].parse().ok()?;
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        seconds += amount
            * match unit {
                'd' => 86_400.0,
                'h' => 3_600.0,
                'm' => 60.0,
                's' => 1.0,
                _ => return None,
            };
        any = true;
    }
    any.then_some(seconds)
}

/// Total metrics for `text`; see [`parse_gcode`] for the completeness report.
pub fn parse(text: &str, material: &str) -> GCodeMetrics {
    parse_gcode(text, material).metrics
}

/// Weight of a 1.75 mm filament cylinder of `length_mm`, in grams.
pub fn filament_weight_grams(length_mm: f64, material: &str) -> f64 {
    let radius = FILAMENT_DIAMETER_MM / 2.0;
    let volume_cm3 = length_mm * PI * radius * radius / 1000.0;
    volume_cm3 * Material::density_for_name(material)
}

fn push_malformed(warnings: &mut Vec<ParseWarning>, line: usize, directive: &str) {
    let count = warnings
        .iter()
        .filter(|w| matches!(w, ParseWarning::MalformedValue { .. }))
        .count();
    if count < MAX_MALFORMED_WARNINGS {
        warnings.push(ParseWarning::MalformedValue {
            line,
            directive: directive.to_string(),
        });
    }
}

fn is_linear_move(command: &str) -> bool {
    matches!(command, "G0" | "G1" | "g0" | "g1" | "G00" | "G01")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
;FLAVOR:Marlin
;TIME:3600
;LAYER_COUNT:42
G28 ; home
G1 Z0.2 F3000
G1 X10 Y10 E1.5
G1 X20 Y10 E3.25 ; perimeter
G1 E2.0 ; retract
G0 X0 Y0
G1 X5 Y5 E10.0
M104 S0
";

    #[test]
    fn extracts_all_metrics() {
        let parsed = parse_gcode(SAMPLE, "PLA");
        assert!(parsed.is_complete(), "{:?}", parsed.warnings);
        let m = parsed.metrics;
        assert_eq!(m.print_time_seconds, 3600.0);
        assert_eq!(m.print_time_hours(), 1.0);
        assert_eq!(m.layer_count, 42);
        assert_eq!(m.filament_length_mm, 10.0);
        assert_eq!(m.material_type, "PLA");
    }

    #[test]
    fn extrusion_is_running_maximum_not_sum() {
        let text = "G1 X1 E5\nG1 X2 E3\nG1 X3 E4\n";
        assert_eq!(parse(text, "PLA").filament_length_mm, 5.0);
    }

    #[test]
    fn weight_matches_cylinder_volume() {
        // 1000 mm of 1.75 mm PLA: 1000 * pi * 0.875^2 / 1000 * 1.24
        let expected = PI * 0.875 * 0.875 * 1.24;
        let m = parse("G1 X1 E1000\n", "PLA");
        assert!((m.filament_weight_grams - expected).abs() < 1e-9);

        let abs = parse("G1 X1 E1000\n", "ABS");
        assert!(abs.filament_weight_grams < m.filament_weight_grams);
    }

    #[test]
    fn unknown_material_uses_pla_density() {
        let pla = parse("G1 E500\n", "PLA");
        let unknown = parse("G1 E500\n", "unobtainium");
        assert_eq!(pla.filament_weight_grams, unknown.filament_weight_grams);
    }

    #[test]
    fn weight_is_monotonic_in_length() {
        let mut last = 0.0;
        for length in [0.0, 1.0, 10.0, 250.5, 10_000.0] {
            let w = filament_weight_grams(length, "PETG");
            assert!(w >= last);
            last = w;
        }
    }

    #[test]
    fn missing_markers_degrade_to_zero_with_warnings() {
        let parsed = parse_gcode("G1 X1 E12.5\n", "PLA");
        assert_eq!(parsed.metrics.print_time_seconds, 0.0);
        assert_eq!(parsed.metrics.layer_count, 0);
        assert!(parsed.metrics.filament_length_mm > 0.0);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::MissingPrintTime, ParseWarning::MissingLayerCount]
        );
        assert!(!parsed.is_unparseable());
    }

    #[test]
    fn garbage_is_unparseable_but_total() {
        for text in ["", "not gcode at all\n\u{0}\u{1}", ";TIME:\n;LAYER_COUNT:-3\nG1 Eabc"] {
            let parsed = parse_gcode(text, "PLA");
            assert!(parsed.is_unparseable(), "{text:?}: {:?}", parsed.warnings);
            assert_eq!(parsed.metrics.print_time_seconds, 0.0);
            assert_eq!(parsed.metrics.filament_weight_grams, 0.0);
            assert_eq!(
                parsed.metrics.print_time_hours(),
                parsed.metrics.print_time_seconds / 3600.0
            );
        }
    }

    #[test]
    fn malformed_values_are_reported_with_line_numbers() {
        let parsed = parse_gcode(";TIME:soon\n;LAYER_COUNT:3\nG1 E2\n", "PLA");
        assert!(parsed.warnings.contains(&ParseWarning::MissingPrintTime));
        assert!(parsed.warnings.contains(&ParseWarning::MalformedValue {
            line: 1,
            directive: ";TIME:".to_string(),
        }));
    }

    #[test]
    fn tolerates_crlf_and_comment_extrusion_tokens() {
        let text = ";TIME:90\r\n;LAYER_COUNT:2\r\nG1 X1 E2.5\r\nG1 X2 ; E999 in a comment\r\n";
        let m = parse(text, "PLA");
        assert_eq!(m.print_time_seconds, 90.0);
        assert_eq!(m.layer_count, 2);
        assert_eq!(m.filament_length_mm, 2.5);
    }

    #[test]
    fn non_motion_commands_are_ignored() {
        let m = parse("G92 E0\nM82\nG2 X1 Y1 I1 J1 E50\n", "PLA");
        assert_eq!(m.filament_length_mm, 0.0);
    }

    const PRUSA_SAMPLE: &str = "\
; generated by PrusaSlicer 2.7.1 on 2024-03-02 at 10:15:00 UTC
M83 ; use relative distances for extrusion
G28 W
;LAYER_CHANGE
;Z:0.2
;HEIGHT:0.2
G1 Z.2 F720
G1 E.8 F2100
G1 X95.2 Y95.2 E.52
G1 E-.8 F2100
;LAYER_CHANGE
;Z:0.4
;HEIGHT:0.2
G1 Z.4 F720
G1 E.8 F2100
G1 X104.8 Y95.2 E.48 ; perimeter
G1 E-.8 F2100
M107
; filament used [mm] = 1.00
; estimated printing time (normal mode) = 1h 2m 3s
; estimated printing time (silent mode) = 1h 5m 0s
";

    #[test]
    fn reads_prusaslicer_annotations_and_relative_extrusion() {
        let parsed = parse_gcode(PRUSA_SAMPLE, "PLA");
        assert!(parsed.is_complete(), "{:?}", parsed.warnings);
        let m = parsed.metrics;
        assert_eq!(m.print_time_seconds, 3723.0);
        assert_eq!(m.layer_count, 2);
        assert!((m.filament_length_mm - 1.0).abs() < 1e-9);
        assert!(m.filament_weight_grams > 0.0);
    }

    #[test]
    fn explicit_markers_win_over_prusaslicer_annotations() {
        let text = ";TIME:60\n;LAYER_COUNT:7\n;LAYER_CHANGE\n\
; estimated printing time (normal mode) = 2d 1s\nG1 X1 E4\n";
        let m = parse(text, "PLA");
        assert_eq!(m.print_time_seconds, 60.0);
        assert_eq!(m.layer_count, 7);
    }

    #[test]
    fn switching_back_to_absolute_stops_summing() {
        let text = "M83\nG1 X1 E2\nG1 X2 E3\nM82\nG92 E0\nG1 X3 E4\n";
        assert_eq!(parse(text, "PLA").filament_length_mm, 9.0);
    }

    #[test]
    fn durations_accept_any_unit_subset() {
        assert_eq!(parse_duration(" 2d 1s"), Some(172_801.0));
        assert_eq!(parse_duration(" 45m"), Some(2_700.0));
        assert_eq!(parse_duration(" soon"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn malformed_warnings_are_capped() {
        let text = "G1 Ebad\n".repeat(100);
        let parsed = parse_gcode(&text, "PLA");
        let malformed = parsed
            .warnings
            .iter()
            .filter(|w| matches!(w, ParseWarning::MalformedValue { .. }))
            .count();
        assert_eq!(malformed, MAX_MALFORMED_WARNINGS);
    }
}

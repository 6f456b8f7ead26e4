use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

/// Physical metrics recovered from engine output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GCodeMetrics {
    pub print_time_seconds: f64,
    pub filament_length_mm: f64,
    pub filament_weight_grams: f64,
    pub layer_count: u32,
    pub material_type: String,
}

impl GCodeMetrics {
    pub fn zeroed(material_type: impl Into<String>) -> Self {
        Self {
            print_time_seconds: 0.0,
            filament_length_mm: 0.0,
            filament_weight_grams: 0.0,
            layer_count: 0,
            material_type: material_type.into(),
        }
    }

    pub fn print_time_hours(&self) -> f64 {
        self.print_time_seconds / 3600.0
    }
}

/// Something the parser could not recover from the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    MissingPrintTime,
    MissingLayerCount,
    NoExtrusion,
    MalformedValue { line: usize, directive: String },
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ParseWarning::MissingPrintTime => write!(f, "no print time annotation found"),
            ParseWarning::MissingLayerCount => write!(f, "no layer count annotation found"),
            ParseWarning::NoExtrusion => write!(f, "no extrusion moves found"),
            ParseWarning::MalformedValue { line, directive } => {
                write!(f, "malformed {} value on line {}", directive, line)
            }
        }
    }
}

/// Metrics plus a record of what was missing, so a genuine zero can be told
/// apart from a zero caused by unparseable output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGCode {
    pub metrics: GCodeMetrics,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedGCode {
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// No time marker, no layer marker and no extrusion at all.
    pub fn is_unparseable(&self) -> bool {
        [
            ParseWarning::MissingPrintTime,
            ParseWarning::MissingLayerCount,
            ParseWarning::NoExtrusion,
        ]
        .iter()
        .all(|w| self.warnings.contains(w))
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_time_hours_is_seconds_over_3600() {
        let mut metrics = GCodeMetrics::zeroed("PLA");
        metrics.print_time_seconds = 5400.0;
        assert_eq!(metrics.print_time_hours(), 1.5);
    }

    #[test]
    fn unparseable_requires_all_three_gaps() {
        let mut parsed = ParsedGCode {
            metrics: GCodeMetrics::zeroed("PLA"),
            warnings: vec![ParseWarning::MissingPrintTime, ParseWarning::MissingLayerCount],
        };
        assert!(!parsed.is_complete());
        assert!(!parsed.is_unparseable());

        parsed.warnings.push(ParseWarning::NoExtrusion);
        assert!(parsed.is_unparseable());
    }

    #[test]
    fn malformed_warning_names_line() {
        let warning = ParseWarning::MalformedValue {
            line: 12,
            directive: ";TIME".to_string(),
        };
        assert_eq!(warning.to_string(), "malformed ;TIME value on line 12");
    }
}

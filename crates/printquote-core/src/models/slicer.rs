use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::AppError;

pub const MIN_INFILL_DENSITY: u8 = 5;
pub const MAX_INFILL_DENSITY: u8 = 100;

/// Print quality preset. Each preset maps to a fixed layer height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Draft,
    Standard,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Draft,
        Quality::Standard,
        Quality::High,
        Quality::Ultra,
    ];

    pub fn layer_height_mm(&self) -> f64 {
        match self {
            Quality::Draft => 0.3,
            Quality::Standard => 0.2,
            Quality::High => 0.1,
            Quality::Ultra => 0.05,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Draft => "draft",
            Quality::Standard => "standard",
            Quality::High => "high",
            Quality::Ultra => "ultra",
        }
    }
}

impl Display for Quality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Quality::Draft),
            "standard" => Ok(Quality::Standard),
            "high" => Ok(Quality::High),
            "ultra" => Ok(Quality::Ultra),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid quality '{}'. Must be one of: draft, standard, high, ultra",
                s
            ))),
        }
    }
}

/// Filament (or resin) material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Material {
    #[serde(rename = "PLA")]
    Pla,
    #[serde(rename = "PETG")]
    Petg,
    #[serde(rename = "ABS")]
    Abs,
    #[serde(rename = "Resin")]
    Resin,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Pla,
        Material::Petg,
        Material::Abs,
        Material::Resin,
    ];

    /// Density in g/cm³.
    pub fn density(&self) -> f64 {
        match self {
            Material::Pla => 1.24,
            Material::Petg => 1.27,
            Material::Abs => 1.04,
            Material::Resin => 1.10,
        }
    }

    /// Density for a free-form material name; unknown names fall back to PLA.
    pub fn density_for_name(name: &str) -> f64 {
        name.parse::<Material>()
            .unwrap_or(Material::Pla)
            .density()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Pla => "PLA",
            Material::Petg => "PETG",
            Material::Abs => "ABS",
            Material::Resin => "Resin",
        }
    }

    /// Lowercase token used in profile file names (`filament_pla.ini`).
    pub fn profile_token(&self) -> &'static str {
        match self {
            Material::Pla => "pla",
            Material::Petg => "petg",
            Material::Abs => "abs",
            Material::Resin => "resin",
        }
    }
}

impl Display for Material {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Material {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pla" => Ok(Material::Pla),
            "petg" => Ok(Material::Petg),
            "abs" => Ok(Material::Abs),
            "resin" => Ok(Material::Resin),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid material '{}'. Must be one of: PLA, PETG, ABS, Resin",
                s
            ))),
        }
    }
}

/// Geometric pattern of interior fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InfillType {
    Cubic,
    Gyroid,
    Honeycomb,
    Rectilinear,
    Grid,
    Line,
    Triangles,
    Concentric,
}

impl InfillType {
    pub const ALL: [InfillType; 8] = [
        InfillType::Cubic,
        InfillType::Gyroid,
        InfillType::Honeycomb,
        InfillType::Rectilinear,
        InfillType::Grid,
        InfillType::Line,
        InfillType::Triangles,
        InfillType::Concentric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfillType::Cubic => "cubic",
            InfillType::Gyroid => "gyroid",
            InfillType::Honeycomb => "honeycomb",
            InfillType::Rectilinear => "rectilinear",
            InfillType::Grid => "grid",
            InfillType::Line => "line",
            InfillType::Triangles => "triangles",
            InfillType::Concentric => "concentric",
        }
    }
}

impl Display for InfillType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InfillType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Invalid infill type '{}'. Must be one of: {}",
                    s,
                    Self::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// Per-request print configuration. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlicerConfig {
    pub quality: Quality,
    pub material: Material,
    pub infill_density: u8,
    pub infill_type: InfillType,
}

impl SlicerConfig {
    pub fn new(
        quality: Quality,
        material: Material,
        infill_density: u8,
        infill_type: InfillType,
    ) -> Result<Self, AppError> {
        crate::validation::validate_infill_density(i64::from(infill_density))?;
        Ok(Self {
            quality,
            material,
            infill_density,
            infill_type,
        })
    }

    pub fn layer_height_mm(&self) -> f64 {
        self.quality.layer_height_mm()
    }
}

//! Project validation DTOs

use serde::{Deserialize, Serialize};

use crate::envelope::Resource;
use crate::format::Flag;

wire_enum! {
    /// A kind of consistency check the server can run over a project.
    ProjectValidationType {
        "pdm::elem_validation" => PdmElemValidation,
        "pdm::pk_fk_consistency" => PdmPkFkConsistency,
        "pdm::transitivity" => PdmTransitivity,
        "pdm::fk_vs_att" => PdmFkVsAtt,
        "ldm" => Ldm,
        "metric_filter" => MetricFilter,
        "invalid_objects" => InvalidObjects,
    }
}

/// Validations available for a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableValidations {
    #[serde(default)]
    pub available_validations: Vec<ProjectValidationType>,
}

impl Resource for AvailableValidations {
    const ROOT: &'static str = "projectValidateAvailable";
}

/// Request body starting a validation. Serializes as
/// `{"validateProject": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateProject {
    pub validate_project: Vec<ProjectValidationType>,
}

/// Results of a finished validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectValidationResults {
    #[serde(default)]
    pub error_found: Flag,
    #[serde(default)]
    pub fatal_error_found: Flag,
    #[serde(default)]
    pub results: Vec<ProjectValidationResult>,
}

impl Resource for ProjectValidationResults {
    const ROOT: &'static str = "projectValidateResult";
}

impl ProjectValidationResults {
    /// Whether any validation reported an error or a fatal error.
    pub fn is_error(&self) -> bool {
        self.error_found.0 || self.fatal_error_found.0
    }

    /// All log entries across validations.
    pub fn entries(&self) -> impl Iterator<Item = &ValidationLogEntry> {
        self.results.iter().flat_map(|r| r.body.log.iter())
    }
}

/// Output of a single validation kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectValidationResult {
    #[serde(default)]
    pub from: Option<ProjectValidationType>,
    #[serde(default)]
    pub body: ValidationBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationBody {
    #[serde(default)]
    pub log: Vec<ValidationLogEntry>,
}

/// A single finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationLogEntry {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub ecat: Option<String>,
    #[serde(default)]
    pub pars: Vec<serde_json::Value>,
}

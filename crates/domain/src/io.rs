use serde::{Deserialize, Serialize};

use crate::{adjustment::AdjustmentReport, error::DomainError};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

pub trait ReportExporter {
    fn export(&self, report: &AdjustmentReport, format: ExportFormat)
        -> Result<Vec<u8>, DomainError>;
}

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(
        &self,
        report: &AdjustmentReport,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Json => serde_json::to_vec_pretty(report)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "JsonExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

pub struct YamlExporter;

impl ReportExporter for YamlExporter {
    fn export(
        &self,
        report: &AdjustmentReport,
        format: ExportFormat,
    ) -> Result<Vec<u8>, DomainError> {
        match format {
            ExportFormat::Yaml => serde_yaml::to_string(report)
                .map(String::into_bytes)
                .map_err(|err| DomainError::Serialization(err.to_string())),
            other => Err(DomainError::validation(format!(
                "YamlExporter cannot handle {:?}",
                other
            ))),
        }
    }
}

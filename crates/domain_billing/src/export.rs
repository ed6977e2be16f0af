//! Export contract for billing documents
//!
//! Document writers (word processor, spreadsheet, PDF, image) live outside
//! this crate. They receive a [`BillingExport`]: the computed data, the file
//! name to use and the content type, plus the presentation rows rendered with
//! two-decimal rounding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Currency;

use crate::calculator::BillingDataForExport;
use crate::error::BillingError;
use crate::format::{format_currency, format_number, format_percentage, DOCUMENT_DECIMAL_PLACES};
use crate::reading::UtilityType;

/// Output formats supported by the document writers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Docx,
    Xlsx,
    #[default]
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Docx),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            "png" | "image" => Ok(ExportFormat::Png),
            other => Err(BillingError::InvalidReading(format!(
                "unsupported export format '{}'",
                other
            ))),
        }
    }
}

/// Builds `{unitName}-{utilityType}-{timestamp}.{ext}`
///
/// The timestamp is milliseconds since the Unix epoch. Path separators in the
/// unit name are replaced so the result is always a bare file name.
pub fn export_file_name(
    unit_name: &str,
    utility_type: UtilityType,
    timestamp: DateTime<Utc>,
    format: ExportFormat,
) -> String {
    let unit_name: String = unit_name
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    format!(
        "{}-{}-{}.{}",
        unit_name,
        utility_type,
        timestamp.timestamp_millis(),
        format.extension()
    )
}

/// One label/value line of a rendered billing document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRow {
    pub label: String,
    pub value: String,
}

impl DocumentRow {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

impl BillingDataForExport {
    /// Presentation rows with values rounded to two decimals
    pub fn document_rows(&self, currency: Currency) -> Vec<DocumentRow> {
        let number = |v| format_number(v, DOCUMENT_DECIMAL_PLACES);
        vec![
            DocumentRow::new("Unit", self.unit_name.clone()),
            DocumentRow::new("Utility", self.utility_type.label().to_string()),
            DocumentRow::new("Due Date", self.due_date.format("%B %-d, %Y").to_string()),
            DocumentRow::new(
                "Reading Period",
                format!(
                    "{} to {}",
                    self.previous_date_of_reading.format("%Y-%m-%d"),
                    self.current_date_of_reading.format("%Y-%m-%d")
                ),
            ),
            DocumentRow::new(
                "1st Floor Reading",
                format!(
                    "{} → {}",
                    number(self.previous_first_floor_reading),
                    number(self.current_first_floor_reading)
                ),
            ),
            DocumentRow::new(
                "2nd Floor Reading",
                format!(
                    "{} → {}",
                    number(self.previous_second_floor_reading),
                    number(self.current_second_floor_reading)
                ),
            ),
            DocumentRow::new("1st Floor Usage", number(self.first_floor_usage)),
            DocumentRow::new("2nd Floor Usage", number(self.second_floor_usage)),
            DocumentRow::new("Total Usage", number(self.total_usage)),
            DocumentRow::new("1st Floor Share", format_percentage(self.first_floor_percentage)),
            DocumentRow::new("2nd Floor Share", format_percentage(self.second_floor_percentage)),
            DocumentRow::new("Total Amount", format_currency(self.amount, currency)),
            DocumentRow::new("1st Floor Amount", format_currency(self.first_floor_amount, currency)),
            DocumentRow::new("2nd Floor Amount", format_currency(self.second_floor_amount, currency)),
            DocumentRow::new("Remarks", self.remarks.to_string()),
            DocumentRow::new("Prepared By", self.prepared_by.clone()),
        ]
    }
}

/// Everything a document writer needs for one export action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingExport {
    pub file_name: String,
    pub content_type: String,
    pub format: ExportFormat,
    pub currency: Currency,
    pub data: BillingDataForExport,
    pub rows: Vec<DocumentRow>,
}

impl BillingExport {
    pub fn new(
        data: BillingDataForExport,
        format: ExportFormat,
        currency: Currency,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            file_name: export_file_name(&data.unit_name, data.utility_type, timestamp, format),
            content_type: format.content_type().to_string(),
            format,
            currency,
            rows: data.document_rows(currency),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_file_name_convention() {
        let ts = Utc.timestamp_millis_opt(1_717_000_000_123).unwrap();
        let name = export_file_name("Unit 2B", UtilityType::WaterUtility, ts, ExportFormat::Xlsx);
        assert_eq!(name, "Unit 2B-WaterUtility-1717000000123.xlsx");
    }

    #[test]
    fn test_export_file_name_strips_separators() {
        let ts = Utc.timestamp_millis_opt(0).unwrap();
        let name = export_file_name("A/B", UtilityType::ElectricityUtility, ts, ExportFormat::Pdf);
        assert_eq!(name, "A-B-ElectricityUtility-0.pdf");
    }

    #[test]
    fn test_format_parsing_and_content_types() {
        assert_eq!("DOCX".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert_eq!("image".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("odt".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
    }
}

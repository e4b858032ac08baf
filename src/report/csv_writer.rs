//! CSV export of the benefit report.

use std::io::Write;

use crate::error::{EngineError, EngineResult};

use super::assembler::BenefitReport;

/// Report column headers, in output order.
pub const REPORT_HEADERS: [&str; 11] = [
    "MATRICULA",
    "NOME",
    "CARGO",
    "SINDICATO",
    "DIAS_UTEIS",
    "VALOR_VR",
    "CUSTO_EMPRESA",
    "DESCONTO_FUNCIONARIO",
    "ADMISSAO",
    "COMPETENCIA",
    "OBS_GERAL",
];

/// Writes the report rows as CSV, amounts with two decimal places.
///
/// # Errors
///
/// Returns [`EngineError::ReportWriteError`] when the writer fails.
pub fn write_report_csv<W: Write>(report: &BenefitReport, writer: W) -> EngineResult<()> {
    let to_error = |e: csv::Error| EngineError::ReportWriteError {
        message: e.to_string(),
    };

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(REPORT_HEADERS).map_err(to_error)?;

    for row in &report.rows {
        wtr.write_record([
            row.registration.clone(),
            row.name.clone(),
            row.job_title.clone(),
            row.group.clone(),
            row.working_days.to_string(),
            format!("{:.2}", row.total),
            format!("{:.2}", row.employer_cost),
            format!("{:.2}", row.employee_discount),
            row.admission_date.clone(),
            row.competence_period.clone(),
            row.observation.clone(),
        ])
        .map_err(to_error)?;
    }

    wtr.flush().map_err(|e| EngineError::ReportWriteError {
        message: e.to_string(),
    })
}

/// Renders the report as a CSV string.
pub fn report_to_csv(report: &BenefitReport) -> EngineResult<String> {
    let mut buffer = Vec::new();
    write_report_csv(report, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| EngineError::ReportWriteError {
        message: e.to_string(),
    })
}

use std::collections::HashSet;

use tracing::warn;

use super::models::PlayerRecord;

pub struct RecordValidator;

impl RecordValidator {
    /// Flags suspicious but importable rows. Nothing here rejects a file.
    pub fn validate(records: &[PlayerRecord]) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen = HashSet::new();

        for record in records {
            let label = format!(
                "{} {} ({}, {})",
                record.last_name, record.first_name, record.external_id, record.category
            );

            if !seen.insert((record.external_id, record.category)) {
                report.warnings.push(format!(
                    "Player '{}' appears more than once; only the first row is stored",
                    label
                ));
            }
            if record.rating.is_sign_negative() {
                report
                    .warnings
                    .push(format!("Player '{}' has a negative rating", label));
            }
            if record.tournaments_counted > record.tournaments_total && record.tournaments_total > 0
            {
                report.warnings.push(format!(
                    "Player '{}' has more counted tournaments ({}) than played ({})",
                    label, record.tournaments_counted, record.tournaments_total
                ));
            }
        }

        report
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unsupported upload format: {0}")]
    UnsupportedFormat(String),
    #[error("Required columns missing after reconciliation: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Invalid synonym table: {0}")]
    InvalidSynonyms(String),
    #[error("Processing error: {0}")]
    Processing(String),
}

#[derive(Debug, Clone)]
pub struct ImportMessage {
    pub message: String,
    pub source: Option<String>,
}

impl ImportMessage {
    pub fn new(message: impl Into<String>, source: Option<String>) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}

/// Collects the non-fatal degradations of a pipeline run. Fatal conditions
/// are returned as [`ImportError`] instead of being recorded here.
#[derive(Debug, Default, Clone)]
pub struct ImportState {
    warnings: Vec<ImportMessage>,
    errors: Vec<ImportMessage>,
}

impl ImportState {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>, source: Option<String>) {
        self.warnings.push(ImportMessage::new(message, source));
    }

    pub fn add_error(&mut self, message: impl Into<String>, source: Option<String>) {
        self.errors.push(ImportMessage::new(message, source));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_warnings(&self) -> &[ImportMessage] {
        &self.warnings
    }

    pub fn get_errors(&self) -> &[ImportMessage] {
        &self.errors
    }

    pub fn merge(&mut self, other: ImportState) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }
}

#[derive(Debug)]
pub enum ImportOutcome {
    Success,
    SuccessWithWarnings(Vec<ImportMessage>),
    Failure {
        errors: Vec<ImportMessage>,
        warnings: Vec<ImportMessage>,
    },
}

impl ImportOutcome {
    pub fn from_state(state: ImportState) -> Self {
        if state.errors.is_empty() && state.warnings.is_empty() {
            ImportOutcome::Success
        } else if state.has_errors() {
            ImportOutcome::Failure {
                errors: state.errors,
                warnings: state.warnings,
            }
        } else {
            ImportOutcome::SuccessWithWarnings(state.warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_classifies_state() {
        let state = ImportState::new();
        assert!(matches!(
            ImportOutcome::from_state(state),
            ImportOutcome::Success
        ));

        let mut state = ImportState::new();
        state.add_warning("harga column left as-is", Some("clean_price".to_string()));
        assert!(matches!(
            ImportOutcome::from_state(state),
            ImportOutcome::SuccessWithWarnings(ref w) if w.len() == 1
        ));

        let mut state = ImportState::new();
        state.add_warning("degraded", None);
        state.add_error("store unwritable", None);
        assert!(matches!(
            ImportOutcome::from_state(state),
            ImportOutcome::Failure { ref errors, ref warnings }
                if errors.len() == 1 && warnings.len() == 1
        ));
    }

    #[test]
    fn missing_columns_lists_names() {
        let err = ImportError::MissingColumns(vec![
            "kamar_mandi".to_string(),
            "harga".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Required columns missing after reconciliation: kamar_mandi, harga"
        );
    }
}

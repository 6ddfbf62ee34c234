use crate::errors::LedgerError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_you_mean: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_this: Option<String>,
}

fn try_this_for(error: &LedgerError) -> Option<String> {
    let hint = match error {
        LedgerError::WorkbookSave { .. } => {
            "close the workbook in Excel and check that the output directory is writable"
        }
        LedgerError::WorkbookOpen { .. } => "check that the file is a valid .xlsx workbook",
        LedgerError::BatchLoad { .. } => {
            "the batch must be a JSON object with `events` and `contracts` arrays"
        }
        LedgerError::NothingToEstimate => {
            "add a product name (`товар`), `кількість` and `ціна за одиницю` to the contracts"
        }
        LedgerError::InvalidThreshold { .. } => "use a percentage between 0 and 100",
        LedgerError::InvalidConfig(_) => {
            "keep significant_below at or below minor_from in the config file"
        }
    };
    Some(hint.to_string())
}

pub fn envelope_for(error: &anyhow::Error) -> ErrorEnvelope {
    if let Some(ledger) = error.chain().find_map(|cause| cause.downcast_ref::<LedgerError>()) {
        return ErrorEnvelope {
            code: ledger.code().to_string(),
            message: format!("{error:#}"),
            did_you_mean: None,
            try_this: try_this_for(ledger),
        };
    }

    let message = format!("{error:#}");

    if message.contains("does not exist") {
        return ErrorEnvelope {
            code: "FILE_NOT_FOUND".to_string(),
            message,
            did_you_mean: None,
            try_this: Some("check the file path and permissions".to_string()),
        };
    }

    if message.contains("unsupported config extension") {
        return ErrorEnvelope {
            code: "INVALID_CONFIG".to_string(),
            message,
            did_you_mean: Some("yaml".to_string()),
            try_this: Some("use a .yaml, .yml or .json config file".to_string()),
        };
    }

    if message.contains("failed to parse") {
        return ErrorEnvelope {
            code: "INVALID_CONFIG".to_string(),
            message,
            did_you_mean: None,
            try_this: Some("check the config file against the documented keys".to_string()),
        };
    }

    ErrorEnvelope {
        code: "COMMAND_FAILED".to_string(),
        message,
        did_you_mean: None,
        try_this: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_keep_their_code_through_context() {
        let error = anyhow::Error::new(LedgerError::NothingToEstimate).context("estimate failed");
        let envelope = envelope_for(&error);
        assert_eq!(envelope.code, "NOTHING_TO_ESTIMATE");
        assert!(envelope.try_this.is_some());
    }
}

use crate::foundation::error::{CertError, CertResult};

/// Maximum participant name length, in characters.
pub const MAX_PARTICIPANT_NAME_CHARS: usize = 15;
/// Maximum affiliation length, in characters.
pub const MAX_AFFILIATION_CHARS: usize = 20;

/// Validated input for one render/submit cycle.
///
/// Fields are private so every instance has passed the length bounds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct CertificateRequest {
    participant_name: String,
    affiliation: String,
}

impl CertificateRequest {
    pub fn new(
        participant_name: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> CertResult<Self> {
        let participant_name = participant_name.into();
        let affiliation = affiliation.into();

        check_len("participant name", &participant_name, MAX_PARTICIPANT_NAME_CHARS)?;
        check_len("affiliation", &affiliation, MAX_AFFILIATION_CHARS)?;

        Ok(Self {
            participant_name,
            affiliation,
        })
    }

    /// Like [`CertificateRequest::new`], but both fields must also be non-blank.
    ///
    /// Submissions forwarded to the record logger go through this constructor.
    pub fn new_required(
        participant_name: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> CertResult<Self> {
        let req = Self::new(participant_name, affiliation)?;
        if req.participant_name.trim().is_empty() || req.affiliation.trim().is_empty() {
            return Err(CertError::validation("Missing required fields"));
        }
        Ok(req)
    }

    pub fn participant_name(&self) -> &str {
        &self.participant_name
    }

    pub fn affiliation(&self) -> &str {
        &self.affiliation
    }
}

fn check_len(field: &str, value: &str, max: usize) -> CertResult<()> {
    let n = value.chars().count();
    if n > max {
        return Err(CertError::validation(format!(
            "{field} is {n} characters, at most {max} allowed"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/composition/request.rs"]
mod tests;

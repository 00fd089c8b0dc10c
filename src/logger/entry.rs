use chrono::{DateTime, FixedOffset, Offset as _, Utc};

use crate::composition::request::CertificateRequest;

/// Offset used for formatted timestamps (WIB, UTC+07:00, no daylight saving).
pub const LOG_UTC_OFFSET_SECS: i32 = 7 * 3600;
/// `DD/MM/YYYY, HH:MM:SS`
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// One submission record: exactly three ordered fields once flattened into a row.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LogEntry {
    pub participant_name: String,
    pub affiliation: String,
    pub timestamp: String,
}

impl LogEntry {
    pub fn now(req: &CertificateRequest) -> Self {
        Self::at(req, Utc::now())
    }

    pub fn at(req: &CertificateRequest, when: DateTime<Utc>) -> Self {
        Self {
            participant_name: req.participant_name().to_string(),
            affiliation: req.affiliation().to_string(),
            timestamp: format_timestamp(when),
        }
    }

    pub fn row(&self) -> [String; 3] {
        [
            self.participant_name.clone(),
            self.affiliation.clone(),
            self.timestamp.clone(),
        ]
    }
}

pub fn format_timestamp(when: DateTime<Utc>) -> String {
    let offset = FixedOffset::east_opt(LOG_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    when.with_timezone(&offset)
        .format(LOG_TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
#[path = "../../tests/unit/logger/entry.rs"]
mod tests;

/// Task identifiers are `<owner>-<unix millis>-<sequence>` strings.
pub type TaskId = String;

/// Submitting user, as supplied by the external login layer.
pub type Owner = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Hook identifiers are random (version 4) UUIDs.
pub type HookId = uuid::Uuid;

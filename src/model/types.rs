use {
    crate::transform::FlattenedRecord,
    chrono::{DateTime, NaiveDate},
    serde_json::Value,
    sqlx::FromRow,
};

// Column layout of `user_logins`, see /migrations

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLogin {
    pub user_id: String,
    pub device_type: String,
    pub masked_ip: String,
    pub masked_device_id: String,
    pub locale: String,
    pub app_version: String,
    pub create_date: Option<NaiveDate>,
}

/// A `user_logins` row as read back. Tables that predate the migrations
/// may hold NULL in any column.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StoredUserLogin {
    pub user_id: Option<String>,
    pub device_type: Option<String>,
    pub masked_ip: Option<String>,
    pub masked_device_id: Option<String>,
    pub locale: Option<String>,
    pub app_version: Option<String>,
    pub create_date: Option<NaiveDate>,
}

impl From<UserLogin> for StoredUserLogin {
    fn from(login: UserLogin) -> Self {
        Self {
            user_id: Some(login.user_id),
            device_type: Some(login.device_type),
            masked_ip: Some(login.masked_ip),
            masked_device_id: Some(login.masked_device_id),
            locale: Some(login.locale),
            app_version: Some(login.app_version),
            create_date: login.create_date,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RowError {
    #[error("Missing field {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl TryFrom<&FlattenedRecord> for UserLogin {
    type Error = RowError;

    fn try_from(record: &FlattenedRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: required_text(record, "user_id")?,
            device_type: required_text(record, "device_type")?,
            masked_ip: required_text(record, "ip")?,
            masked_device_id: required_text(record, "device_id")?,
            locale: required_text(record, "locale")?,
            app_version: required_text(record, "app_version")?,
            create_date: optional_date(record, "create_date")?,
        })
    }
}

/// Scalars are rendered as text; null is treated like an absent key.
fn required_text(record: &FlattenedRecord, field: &'static str) -> Result<String, RowError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(RowError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(RowError::InvalidField {
            field,
            reason: format!("expected a string, number or boolean, got {other}"),
        }),
    }
}

fn optional_date(
    record: &FlattenedRecord,
    field: &'static str,
) -> Result<Option<NaiveDate>, RowError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_date(s).map(Some).ok_or_else(|| RowError::InvalidField {
            field,
            reason: format!("{s:?} is neither YYYY-MM-DD nor RFC 3339"),
        }),
        Some(other) => Err(RowError::InvalidField {
            field,
            reason: format!("expected a date string, got {other}"),
        }),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

use {
    crate::model::types::StoredUserLogin,
    std::fmt::{Display, Write},
};

pub const USER_LOGINS_HEADER: &str =
    "user_id | device_type | masked_ip | masked_device_id | locale | app_version | create_date";

/// Renders rows as a pipe-separated table for manual inspection.
pub fn format_user_logins(logins: &[StoredUserLogin]) -> String {
    let mut table = format!("\nContents of user_logins table:\n\n{USER_LOGINS_HEADER}\n");
    for login in logins {
        // Writing to a String cannot fail
        let _ = writeln!(
            table,
            "{} | {} | {} | {} | {} | {} | {}",
            or_null(&login.user_id),
            or_null(&login.device_type),
            or_null(&login.masked_ip),
            or_null(&login.masked_device_id),
            or_null(&login.locale),
            or_null(&login.app_version),
            or_null(&login.create_date),
        );
    }
    table
}

fn or_null<T: Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "NULL".to_owned(), ToString::to_string)
}

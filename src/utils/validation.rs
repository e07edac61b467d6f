// Validation utilities for string fields

/// Trim and validate a required string field
///
/// # Returns
/// * `Ok(String)` - The trimmed string if valid
/// * `Err(String)` - Error message naming the field if it is blank
pub fn trim_required(field: &str, name: &str) -> Result<String, String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Err(format!("{} cannot be empty", name))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Trim an optional field, treating blank input as absent
pub fn normalize_optional(field: Option<String>) -> Option<String> {
    field.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Emails are compared and stored trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Build a `%...%` ILIKE pattern with the LIKE wildcards of `input` escaped
pub fn contains_pattern(input: &str) -> String {
    let mut pattern = String::with_capacity(input.len() + 2);
    pattern.push('%');
    for c in input.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

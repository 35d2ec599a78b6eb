//! Identifier validation and quoting
//!
//! Values always travel as bound parameters. Table and column names cannot,
//! so they are checked against a strict shape and backtick-quoted before
//! being spliced into SQL.

use crate::error::ModelError;

/// Characters allowed in SQL identifiers (alphanumeric, underscore, dollar)
const ALLOWED_IDENTIFIER_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_$";

/// Maximum identifier length accepted by MySQL
const MAX_IDENTIFIER_LEN: usize = 64;

/// SQL keywords rejected as bare identifiers
static SQL_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "UNION", "DROP", "CREATE",
    "ALTER", "GRANT", "REVOKE", "TRUNCATE", "EXEC", "EXECUTE", "DECLARE", "TABLE", "OR", "AND",
];

/// Validate that a single identifier segment is safe for use in SQL
pub fn validate_identifier(identifier: &str) -> Result<(), ModelError> {
    let Some(first) = identifier.chars().next() else {
        return Err(ModelError::Validation(
            "Identifier cannot be empty".to_string(),
        ));
    };

    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is too long (max {} characters)",
            identifier, MAX_IDENTIFIER_LEN
        )));
    }

    if let Some(c) = identifier.chars().find(|c| !ALLOWED_IDENTIFIER_CHARS.contains(*c)) {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' contains invalid character '{}'",
            identifier, c
        )));
    }

    if first.is_ascii_digit() {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' cannot start with a number",
            identifier
        )));
    }

    let upper_identifier = identifier.to_uppercase();
    if SQL_KEYWORDS.contains(&upper_identifier.as_str()) {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' is a reserved SQL keyword",
            identifier
        )));
    }

    Ok(())
}

/// Validate and quote a column reference, either `column` or `table.column`
///
/// # Examples
/// ```
/// use mate_orm::security::quote_identifier;
///
/// assert_eq!(quote_identifier("email").unwrap(), "`email`");
/// assert_eq!(quote_identifier("users.id").unwrap(), "`users`.`id`");
/// assert!(quote_identifier("id; DROP TABLE users").is_err());
/// ```
pub fn quote_identifier(identifier: &str) -> Result<String, ModelError> {
    let segments: Vec<&str> = identifier.split('.').collect();
    if segments.len() > 2 {
        return Err(ModelError::Validation(format!(
            "Identifier '{}' has too many qualifiers",
            identifier
        )));
    }

    let mut quoted = Vec::with_capacity(segments.len());
    for segment in segments {
        validate_identifier(segment)?;
        quoted.push(format!("`{}`", segment));
    }
    Ok(quoted.join("."))
}

/// Validate and quote a table name; qualified names are not accepted here
pub fn quote_table(table: &str) -> Result<String, ModelError> {
    validate_identifier(table)
        .map_err(|e| ModelError::Configuration(format!("Invalid table name '{}': {}", table, e)))?;
    Ok(format!("`{}`", table))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation_basic() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("created_at").is_ok());
        assert!(validate_identifier("SELECT").is_err());
        assert!(validate_identifier("'; DROP TABLE users; --").is_err());
        assert!(validate_identifier("1column").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("name").unwrap(), "`name`");
        assert_eq!(quote_identifier("posts.user_id").unwrap(), "`posts`.`user_id`");
        assert!(quote_identifier("a.b.c").is_err());
        assert!(quote_identifier("name`").is_err());
        assert!(quote_identifier("users.").is_err());
    }

    #[test]
    fn test_quote_table_is_configuration_error() {
        assert_eq!(quote_table("users").unwrap(), "`users`");
        assert!(matches!(quote_table(""), Err(ModelError::Configuration(_))));
        assert!(matches!(quote_table("users.x"), Err(ModelError::Configuration(_))));
    }
}

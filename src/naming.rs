//! Validation of user-supplied database and collection names.
//!
//! The rules follow the server's naming restrictions plus the characters the
//! cloud service reserves for database names.

use thiserror::Error;

const SYSTEM_PREFIX: &str = "system.";
const DATABASE_NAME_MIN: usize = 1;
const DATABASE_NAME_MAX: usize = 63;
const DATABASE_FORBIDDEN: &[char] = &['/', '\\', '.', ' ', '"', '$', '#', '?'];

/// Reasons a name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The collection name is empty.
    #[error("Collection name cannot be empty")]
    EmptyCollection,
    /// The collection name uses the reserved `system.` prefix.
    #[error("\"system.\" prefix is reserved for internal use")]
    ReservedCollectionPrefix,
    /// The collection name contains `$`.
    #[error("Collection name cannot contain $")]
    CollectionDollar,
    /// The database name is too short or too long.
    #[error("Database name must be between 1 and 63 characters.")]
    DatabaseLength,
    /// The database name contains a forbidden character.
    #[error("Database name cannot contain these characters - `/\\. \"$#?`")]
    DatabaseCharacter,
}

/// Checks `name` against the collection naming rules.
///
/// # Errors
/// Returns the first rule `name` breaks.
///
/// # Examples
/// ```
/// use mongosh_setup::naming::{NameError, validate_collection_name};
///
/// assert!(validate_collection_name("orders").is_ok());
/// assert_eq!(validate_collection_name("system.users"), Err(NameError::ReservedCollectionPrefix));
/// ```
pub fn validate_collection_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::EmptyCollection);
    }
    if name.starts_with(SYSTEM_PREFIX) {
        return Err(NameError::ReservedCollectionPrefix);
    }
    if name.contains('$') {
        return Err(NameError::CollectionDollar);
    }
    Ok(())
}

/// Checks `name` against the database naming rules.
///
/// Length is counted in characters, not bytes.
///
/// # Errors
/// Returns the first rule `name` breaks.
pub fn validate_database_name(name: &str) -> Result<(), NameError> {
    let len = name.chars().count();
    if !(DATABASE_NAME_MIN..=DATABASE_NAME_MAX).contains(&len) {
        return Err(NameError::DatabaseLength);
    }
    if name.contains(DATABASE_FORBIDDEN) {
        return Err(NameError::DatabaseCharacter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("orders")]
    #[case("my-system.logs")]
    #[case("a")]
    fn accepts_valid_collection_names(#[case] name: &str) {
        assert_eq!(validate_collection_name(name), Ok(()));
    }

    #[rstest]
    #[case("", NameError::EmptyCollection)]
    #[case("system.profile", NameError::ReservedCollectionPrefix)]
    #[case("price$usd", NameError::CollectionDollar)]
    fn rejects_invalid_collection_names(#[case] name: &str, #[case] expected: NameError) {
        assert_eq!(validate_collection_name(name), Err(expected));
    }

    #[rstest]
    #[case("inventory")]
    #[case("db_2024-archive")]
    fn accepts_valid_database_names(#[case] name: &str) {
        assert_eq!(validate_database_name(name), Ok(()));
    }

    #[rstest]
    #[case("", NameError::DatabaseLength)]
    #[case(&"x".repeat(64), NameError::DatabaseLength)]
    #[case("a.b", NameError::DatabaseCharacter)]
    #[case("a b", NameError::DatabaseCharacter)]
    #[case("tenant#1", NameError::DatabaseCharacter)]
    #[case("why?", NameError::DatabaseCharacter)]
    #[case("back\\slash", NameError::DatabaseCharacter)]
    fn rejects_invalid_database_names(#[case] name: &str, #[case] expected: NameError) {
        assert_eq!(validate_database_name(name), Err(expected));
    }

    #[test]
    fn sixty_three_characters_is_the_limit() {
        assert_eq!(validate_database_name(&"d".repeat(63)), Ok(()));
    }
}

//! Identifier validation for dynamic statement assembly
//!
//! Table and column names arrive from the schema layer, not from corpus
//! text, but every identifier still passes through here before it is
//! interpolated into SQL. Value-level data is always bound as a parameter,
//! never interpolated.

use corpusdb_core::{CorpusError, Result};

/// Validate a table or column identifier
///
/// Accepts `[A-Za-z_][A-Za-z0-9_]*`; anything else is rejected so a
/// caller-supplied name can never smuggle statement syntax.
pub fn validate(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(CorpusError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate and quote an identifier for interpolation
pub fn quote(name: &str) -> Result<String> {
    validate(name)?;
    Ok(format!("\"{name}\""))
}

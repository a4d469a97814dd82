use anyhow::{Context, Result};
use serde::Serialize;

/// Serialize a value to pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

//! Identifier-list loading
//!
//! The upstream collaborator produces deduplicated, chunked CSV files with an
//! `id` column. The crawler only needs the ordered sequence of identifier
//! strings; everything else in the file is ignored.

use crate::error::{Error, Result};
use crate::types::ProductId;
use std::path::Path;

/// Load the ordered identifier list from a CSV file
///
/// The file must have a header row containing an `id` column (matched
/// case-insensitively). Values are trimmed; blank values are skipped. Order
/// is preserved — batch membership is positional.
pub fn load_identifiers(path: &Path) -> Result<Vec<ProductId>> {
    if !path.exists() {
        return Err(Error::Input(format!(
            "identifier file not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)?;
    let id_column = reader
        .headers()?
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case("id"))
        .ok_or_else(|| {
            Error::Input(format!(
                "no `id` column in header of {}",
                path.display()
            ))
        })?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(raw) = record.get(id_column) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                ids.push(ProductId::from(trimmed));
            }
        }
    }

    Ok(ids)
}

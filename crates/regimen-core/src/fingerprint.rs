//! Content fingerprint of the regimen-exposure output.

use sha2::{Digest, Sha256};

use regimen_model::RegimenExposure;

/// SHA-256 over the rows in `(era_id, regimen_id)` order, hex encoded.
///
/// Each row contributes one newline-terminated, tab-separated line, so the
/// value only depends on row content and not on the order rows were produced.
pub fn output_fingerprint(rows: &[RegimenExposure]) -> String {
    let mut ordered: Vec<&RegimenExposure> = rows.iter().collect();
    ordered.sort_unstable_by_key(|row| (row.era_id, row.regimen_id));

    let mut hasher = Sha256::new();
    for row in ordered {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            row.era_id, row.person_id, row.start_date, row.end_date, row.regimen_id, row.regimen_name
        );
        hasher.update(line.as_bytes());
    }
    hex::encode(hasher.finalize())
}

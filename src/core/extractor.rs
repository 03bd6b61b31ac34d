use crate::utils::error::{DispatchError, Result};
use std::path::Path;

/// Recognized recipient column names, checked in priority order.
/// Matching is case-sensitive; this is the exact accepted set.
const RECIPIENT_COLUMNS: [&str; 8] = [
    "phone",
    "phoneNumber",
    "number",
    "Phone",
    "PhoneNumber",
    "Number",
    "mobile",
    "Mobile",
];

/// Removes the upload artifact when extraction finishes, success or failure.
struct UploadGuard<'a> {
    path: &'a Path,
}

impl Drop for UploadGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(self.path) {
            tracing::warn!(
                path = %self.path.display(),
                "failed to remove upload artifact: {err}"
            );
        }
    }
}

/// Splits a comma-separated string of raw addresses.
///
/// Entries are trimmed, empty entries dropped; order and duplicates are
/// preserved.
pub fn from_manual(numbers: &str) -> Result<Vec<String>> {
    let list: Vec<String> = numbers
        .split(',')
        .map(str::trim)
        .filter(|number| !number.is_empty())
        .map(str::to_string)
        .collect();

    if list.is_empty() {
        return Err(DispatchError::EmptyBatch);
    }
    Ok(list)
}

/// Reads raw addresses from an uploaded CSV file, one recipient per row.
///
/// The address is taken from the first header matching [`RECIPIENT_COLUMNS`];
/// a header with none of them fails with `UnsupportedFormat`. The upload
/// artifact is deleted unconditionally once parsing is done.
pub fn from_upload(path: &Path) -> Result<Vec<String>> {
    let _guard = UploadGuard { path };

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = RECIPIENT_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|header| header == *name));
    let Some(column) = column else {
        return Err(DispatchError::UnsupportedFormat {
            columns: headers.iter().map(str::to_string).collect(),
        });
    };

    let mut numbers = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(value) = row.get(column) {
            let value = value.trim();
            if !value.is_empty() {
                numbers.push(value.to_string());
            }
        }
    }

    if numbers.is_empty() {
        return Err(DispatchError::EmptyBatch);
    }

    tracing::debug!(count = numbers.len(), "extracted recipients from upload");
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_upload(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn manual_preserves_order_and_duplicates() {
        let list = from_manual("94771234567, 94771234567 ,94701111111").unwrap();
        assert_eq!(list, vec!["94771234567", "94771234567", "94701111111"]);
    }

    #[test]
    fn manual_drops_empty_entries() {
        let list = from_manual("94771234567,, ,94701111111").unwrap();
        assert_eq!(list, vec!["94771234567", "94701111111"]);
    }

    #[test]
    fn manual_empty_input_is_empty_batch() {
        assert!(matches!(from_manual(""), Err(DispatchError::EmptyBatch)));
        assert!(matches!(from_manual(" , ,"), Err(DispatchError::EmptyBatch)));
    }

    #[test]
    fn upload_reads_recognized_column() {
        let dir = TempDir::new().unwrap();
        let path = write_upload(
            &dir,
            "recipients.csv",
            "name,phone\nAlice,94771234567\nBob,94701111111\n",
        );

        let numbers = from_upload(&path).unwrap();
        assert_eq!(numbers, vec!["94771234567", "94701111111"]);
    }

    #[test]
    fn upload_alias_priority_is_first_match() {
        // Both aliases present: `phone` wins over `mobile`.
        let dir = TempDir::new().unwrap();
        let path = write_upload(
            &dir,
            "recipients.csv",
            "mobile,phone\n94709999999,94771234567\n",
        );

        let numbers = from_upload(&path).unwrap();
        assert_eq!(numbers, vec!["94771234567"]);
    }

    #[test]
    fn upload_without_recognized_column_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write_upload(&dir, "contacts.csv", "email\nalice@example.com\n");

        match from_upload(&path) {
            Err(DispatchError::UnsupportedFormat { columns }) => {
                assert_eq!(columns, vec!["email"]);
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn upload_with_no_rows_is_empty_batch() {
        let dir = TempDir::new().unwrap();
        let path = write_upload(&dir, "empty.csv", "phone\n");

        assert!(matches!(
            from_upload(&path),
            Err(DispatchError::EmptyBatch)
        ));
    }

    #[test]
    fn upload_artifact_removed_on_success() {
        let dir = TempDir::new().unwrap();
        let path = write_upload(&dir, "ok.csv", "phone\n94771234567\n");

        from_upload(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn upload_artifact_removed_on_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_upload(&dir, "bad.csv", "email\nalice@example.com\n");

        from_upload(&path).unwrap_err();
        assert!(!path.exists());
    }
}

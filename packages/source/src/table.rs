//! Delimited accident tables.
//!
//! A [`DelimitedTable`] keeps every column and every cell exactly as read
//! so the preparation stage can persist the original columns untouched
//! alongside the ones it derives. Typed access happens later, against the
//! column names a dataset definition maps.

use std::path::{Path, PathBuf};

use crate::SourceError;

/// A header row plus string cells, one `Vec` per record.
///
/// Every row has exactly `headers.len()` cells: short rows are padded with
/// empty strings. Headers keep their original spelling; lookups by name
/// ignore surrounding whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Builds a table from headers and rows, normalizing row widths.
    ///
    /// Cells beyond the header width are dropped with a warning.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let mut truncated = 0usize;
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() > width {
                    truncated += 1;
                }
                row.resize(width, String::new());
                row
            })
            .collect();

        if truncated > 0 {
            log::warn!("{truncated} row(s) had more than {width} cells; extra cells were dropped");
        }

        Self { headers, rows }
    }

    /// Reads a table from disk, decoding it with the given encoding label.
    ///
    /// A leading byte-order mark is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingInput`] if the file does not exist,
    /// [`SourceError::UnknownEncoding`] for an unrecognized label, or a CSV
    /// error if the contents cannot be parsed.
    pub fn read(path: &Path, delimiter: u8, encoding_label: &str) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let encoding = encoding_rs::Encoding::for_label(encoding_label.as_bytes()).ok_or_else(
            || SourceError::UnknownEncoding {
                label: encoding_label.to_string(),
            },
        )?;

        let bytes = std::fs::read(path)?;
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            log::warn!(
                "{} contains byte sequences that are not valid {}; they were replaced",
                path.display(),
                used.name()
            );
        }

        let table = Self::from_text(&text, delimiter).map_err(|e| match e {
            SourceError::Malformed { message, .. } => SourceError::Malformed {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        log::debug!(
            "Read {} rows x {} columns from {}",
            table.len(),
            table.headers.len(),
            path.display()
        );

        Ok(table)
    }

    /// Parses a table from already-decoded text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Malformed`] if there is no header row or a
    /// record has more fields than the header, or a CSV error if a record
    /// cannot be parsed.
    pub fn from_text(text: &str, delimiter: u8) -> Result<Self, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(SourceError::Malformed {
                path: PathBuf::new(),
                message: "table contains no header row".to_owned(),
            });
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > headers.len() {
                let line = record.position().map_or(0, csv::Position::line);
                return Err(SourceError::Malformed {
                    path: PathBuf::new(),
                    message: format!(
                        "line {line}: expected {} fields, saw {}",
                        headers.len(),
                        record.len()
                    ),
                });
            }
            rows.push(record.iter().map(str::to_owned).collect());
        }

        Ok(Self::new(headers, rows))
    }

    /// Column names in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column, ignoring whitespace around header names.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Names from `names` that are not columns of this table, in the order
    /// given.
    #[must_use]
    pub fn missing_columns<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| self.column_index(name).is_none())
            .map(str::to_owned)
            .collect()
    }

    /// Returns the index of the named column, appending it (filled with
    /// empty cells) if it does not exist yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_owned());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Mutable access to the rows. Row widths must not be changed.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [String]> {
        self.rows.iter_mut().map(Vec::as_mut_slice)
    }

    /// Serializes the table with the given delimiter.
    ///
    /// # Errors
    ///
    /// Returns a CSV or I/O error if serialization fails.
    pub fn to_bytes(&self, delimiter: u8) -> Result<Vec<u8>, SourceError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|e| SourceError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "num_acidente;data_acidente;codigo_ibge\n\
                          1;17/05/2022;5002704\n\
                          2;bad;5003702.0\n\
                          3;01/01/2021\n";

    #[test]
    fn reads_semicolon_table_and_pads_short_rows() {
        let table = DelimitedTable::from_text(SAMPLE, b';').unwrap();
        assert_eq!(table.headers(), ["num_acidente", "data_acidente", "codigo_ibge"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2], ["3", "01/01/2021", ""]);
    }

    #[test]
    fn reports_missing_columns_in_order() {
        let table = DelimitedTable::from_text(SAMPLE, b';').unwrap();
        let missing = table.missing_columns(["mes_acidente", "codigo_ibge", "ano_acidente"]);
        assert_eq!(missing, ["mes_acidente", "ano_acidente"]);
    }

    #[test]
    fn ensure_column_appends_once() {
        let mut table = DelimitedTable::from_text(SAMPLE, b';').unwrap();
        let first = table.ensure_column("mes_acidente");
        let second = table.ensure_column("mes_acidente");
        assert_eq!(first, 3);
        assert_eq!(second, 3);
        assert!(table.rows().iter().all(|r| r.len() == 4 && r[3].is_empty()));
    }

    #[test]
    fn serializes_back_to_same_text() {
        let text = "a;b\n1;x y\n2;\n";
        let table = DelimitedTable::from_text(text, b';').unwrap();
        let bytes = table.to_bytes(b';').unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), text);
    }

    #[test]
    fn keeps_raw_headers_but_looks_up_trimmed_names() {
        let text = "num_acidente; codigo_ibge \n1;5002704\n";
        let table = DelimitedTable::from_text(text, b';').unwrap();
        assert_eq!(table.headers(), ["num_acidente", " codigo_ibge "]);
        assert_eq!(table.column_index("codigo_ibge"), Some(1));
        let bytes = table.to_bytes(b';').unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), text);
    }

    #[test]
    fn rejects_rows_longer_than_header() {
        let err = DelimitedTable::from_text("a;b\n1;2\n3;4;5\n", b';').unwrap_err();
        let SourceError::Malformed { message, .. } = &err else {
            panic!("expected Malformed, got {err:?}");
        };
        assert_eq!(message, "line 3: expected 2 fields, saw 3");
    }

    #[test]
    fn new_drops_cells_beyond_header() {
        let table = DelimitedTable::new(
            vec!["a".to_owned()],
            vec![vec!["1".to_owned(), "extra".to_owned()]],
        );
        assert_eq!(table.rows()[0], ["1"]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            DelimitedTable::from_text("", b';'),
            Err(SourceError::Malformed { .. })
        ));
    }

    #[test]
    fn decodes_latin1_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"cond;n\nNevoeiro/Neblina;1\nGarua/Chuvisco \xe9;2\n").unwrap();
        let table = DelimitedTable::read(&path, b';', "windows-1252").unwrap();
        assert_eq!(table.rows()[1][0], "Garua/Chuvisco \u{e9}");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = DelimitedTable::read(&dir.path().join("absent.csv"), b';', "utf-8").unwrap_err();
        assert!(matches!(err, SourceError::MissingInput { .. }));
    }
}

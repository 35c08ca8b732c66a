//! In-memory table of record for one loaded CSV file.
//!
//! A [`Table`] is never patched in place by the views. Edits go through
//! [`Table::apply_edit`], which returns a full replacement copy that the
//! session then installs as the new table of record.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Convert a polars value. Anything without a dedicated variant keeps
    /// polars' own textual form.
    pub fn from_any_value(value: &AnyValue) -> Self {
        match value {
            AnyValue::Null => Self::Null,
            AnyValue::Boolean(b) => Self::Bool(*b),
            AnyValue::Int8(v) => Self::Int(i64::from(*v)),
            AnyValue::Int16(v) => Self::Int(i64::from(*v)),
            AnyValue::Int32(v) => Self::Int(i64::from(*v)),
            AnyValue::Int64(v) => Self::Int(*v),
            AnyValue::UInt8(v) => Self::Int(i64::from(*v)),
            AnyValue::UInt16(v) => Self::Int(i64::from(*v)),
            AnyValue::UInt32(v) => Self::Int(i64::from(*v)),
            AnyValue::UInt64(v) => match i64::try_from(*v) {
                Ok(v) => Self::Int(v),
                Err(_) => Self::Text(v.to_string()),
            },
            AnyValue::Float32(v) => Self::Float(f64::from(*v)),
            AnyValue::Float64(v) => Self::Float(*v),
            AnyValue::String(s) => Self::Text(s.to_string()),
            AnyValue::StringOwned(s) => Self::Text(s.to_string()),
            other => Self::Text(other.str_value().to_string()),
        }
    }

    /// Interpret free text typed into an editor cell.
    ///
    /// Empty input is a null; integers, floats and `true`/`false` keep their
    /// type; everything else is text.
    pub fn infer(input: &str) -> Self {
        if input.is_empty() {
            return Self::Null;
        }
        if let Ok(v) = input.parse::<i64>() {
            return Self::Int(v);
        }
        // "inf"/"nan" parse as floats but are far more likely to be words
        if input.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(v) = input.parse::<f64>() {
                return Self::Float(v);
            }
        }
        match input {
            "true" | "True" | "TRUE" => Self::Bool(true),
            "false" | "False" | "FALSE" => Self::Bool(false),
            _ => Self::Text(input.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The string shown to the user. Null renders as an empty string.
    pub fn display_string(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(true) => Cow::Borrowed("True"),
            Self::Bool(false) => Cow::Borrowed("False"),
            Self::Int(v) => Cow::Owned(v.to_string()),
            Self::Float(v) => Cow::Owned(format_float(*v)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else if v.fract() == 0.0 {
        format!("{:e}", v)
    } else {
        v.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Float(_) => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

/// A change requested by the edit view.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEdit {
    SetCell {
        row: usize,
        column: String,
        value: CellValue,
    },
    /// Append a row of nulls
    AppendRow,
    DeleteRow {
        row: usize,
    },
}

/// Columns plus positional rows; row `i` holds one value per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table. Column names must be unique.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(eyre!("Duplicate column name: {}", name));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table from positional rows, checking every row's width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for (index, row) in rows.iter().enumerate() {
            if row.len() != table.columns.len() {
                return Err(eyre!(
                    "Row {} has {} values but the table has {} columns",
                    index + 1,
                    row.len(),
                    table.columns.len()
                ));
            }
        }
        table.rows = rows;
        Ok(table)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let mut rows: Vec<Vec<CellValue>> = vec![Vec::with_capacity(columns.len()); df.height()];
        for column in df.get_columns() {
            for (row_index, row) in rows.iter_mut().enumerate() {
                let value = column.get(row_index)?;
                row.push(CellValue::from_any_value(&value));
            }
        }
        Self::from_rows(columns, rows)
    }

    /// Convert back to a dataframe of string columns (nulls preserved).
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col_index, name)| {
                let values: Vec<Option<String>> = self
                    .rows
                    .iter()
                    .map(|row| match &row[col_index] {
                        CellValue::Null => None,
                        value => Some(value.display_string().into_owned()),
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Serialize as CSV with a header row.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut df = self.to_dataframe()?;
        let mut buf: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .finish(&mut df)?;
        Ok(String::from_utf8(buf)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col_index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col_index))
    }

    /// Iterate one row as `(column name, value)` pairs in column order.
    pub fn record(&self, row: usize) -> Option<impl Iterator<Item = (&str, &CellValue)>> {
        let values = self.rows.get(row)?;
        Some(self.columns.iter().map(String::as_str).zip(values.iter()))
    }

    /// Whether any value in the column at `position` is text.
    pub fn column_holds_text(&self, position: usize) -> bool {
        self.rows
            .iter()
            .any(|row| matches!(row.get(position), Some(CellValue::Text(_))))
    }

    /// Interpret editor input for the column at `position`.
    ///
    /// Text columns keep the input verbatim (`00501` stays `00501`); other
    /// columns go through [`CellValue::infer`]. Empty input is a null.
    pub fn parse_input(&self, position: usize, input: &str) -> CellValue {
        if input.is_empty() {
            CellValue::Null
        } else if self.column_holds_text(position) {
            CellValue::Text(input.to_string())
        } else {
            CellValue::infer(input)
        }
    }

    /// Rows as a list of records; serializes to `[{"col": value, ...}, ...]`
    /// with keys in column order.
    pub fn records(&self) -> Records<'_> {
        Records { table: self }
    }

    pub fn to_json_records(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.records())?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records())?)
    }

    /// Apply `edit` to a copy of this table and return the copy.
    pub fn apply_edit(&self, edit: &TableEdit) -> Result<Table> {
        let mut next = self.clone();
        match edit {
            TableEdit::SetCell { row, column, value } => {
                let col_index = self
                    .column_index(column)
                    .ok_or_else(|| eyre!("Unknown column: {}", column))?;
                let cells = next.rows.get_mut(*row).ok_or_else(|| {
                    eyre!("Row {} is out of range (table has {} rows)", row, self.row_count())
                })?;
                cells[col_index] = value.clone();
            }
            TableEdit::AppendRow => {
                next.rows.push(vec![CellValue::Null; self.columns.len()]);
            }
            TableEdit::DeleteRow { row } => {
                if *row >= next.rows.len() {
                    return Err(eyre!(
                        "Row {} is out of range (table has {} rows)",
                        row,
                        self.row_count()
                    ));
                }
                next.rows.remove(*row);
            }
        }
        Ok(next)
    }
}

/// Serializable view of a table as a list of records.
pub struct Records<'a> {
    table: &'a Table,
}

struct RecordRef<'a> {
    columns: &'a [String],
    values: &'a [CellValue],
}

impl Serialize for RecordRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.table.rows.len()))?;
        for values in &self.table.rows {
            seq.serialize_element(&RecordRef {
                columns: &self.table.columns,
                values,
            })?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["id".into(), "name".into(), "score".into()],
            vec![
                vec![1i64.into(), "ada".into(), 9.5f64.into()],
                vec![2i64.into(), "bob".into(), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_input_keeps_text_columns_verbatim() {
        let table = Table::from_rows(
            vec!["zip".into(), "count".into(), "empty".into()],
            vec![
                vec!["02134".into(), 3i64.into(), CellValue::Null],
                vec![CellValue::Null, 4i64.into(), CellValue::Null],
            ],
        )
        .unwrap();
        assert_eq!(table.parse_input(0, "00501"), CellValue::from("00501"));
        assert_eq!(table.parse_input(0, "1e5"), CellValue::from("1e5"));
        assert_eq!(table.parse_input(0, ""), CellValue::Null);
        assert_eq!(table.parse_input(1, "7"), CellValue::Int(7));
        assert_eq!(table.parse_input(1, "1e5"), CellValue::Float(100000.0));
        assert_eq!(table.parse_input(2, "true"), CellValue::Bool(true));
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(CellValue::Null.display_string(), "");
        assert_eq!(CellValue::Bool(true).display_string(), "True");
        assert_eq!(CellValue::Int(-4).display_string(), "-4");
        assert_eq!(CellValue::Float(3.0).display_string(), "3.0");
        assert_eq!(CellValue::Float(0.25).display_string(), "0.25");
        assert_eq!(CellValue::Float(f64::NAN).display_string(), "nan");
        assert_eq!(CellValue::Float(f64::NEG_INFINITY).display_string(), "-inf");
        assert_eq!(CellValue::Float(1e15).display_string(), "1000000000000000.0");
        assert_eq!(CellValue::Float(1e16).display_string(), "1e16");
        assert_eq!(CellValue::Float(-2.5e20).display_string(), "-2.5e20");
        assert_eq!(CellValue::from("x y").to_string(), "x y");
    }

    #[test]
    fn test_infer() {
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("42"), CellValue::Int(42));
        assert_eq!(CellValue::infer("4.5"), CellValue::Float(4.5));
        assert_eq!(CellValue::infer("False"), CellValue::Bool(false));
        assert_eq!(CellValue::infer("nan"), CellValue::Text("nan".into()));
        assert_eq!(CellValue::infer("hello"), CellValue::Text("hello".into()));
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        assert!(Table::new(vec!["a".into(), "a".into()]).is_err());
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![1i64.into(), 2i64.into()], vec![3i64.into()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cell_and_record_access() {
        let table = sample();
        assert_eq!(table.cell(1, "name"), Some(&CellValue::from("bob")));
        assert_eq!(table.cell(1, "missing"), None);
        assert_eq!(table.cell(5, "name"), None);
        let record: Vec<(&str, String)> = table
            .record(0)
            .unwrap()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        assert_eq!(
            record,
            vec![
                ("id", "1".to_string()),
                ("name", "ada".to_string()),
                ("score", "9.5".to_string())
            ]
        );
    }

    #[test]
    fn test_json_records_keep_column_order() {
        let json = serde_json::to_string(&sample().records()).unwrap();
        assert_eq!(
            json,
            r#"[{"id":1,"name":"ada","score":9.5},{"id":2,"name":"bob","score":null}]"#
        );
    }

    #[test]
    fn test_apply_edit_returns_copy() {
        let table = sample();
        let edited = table
            .apply_edit(&TableEdit::SetCell {
                row: 0,
                column: "name".into(),
                value: "eve".into(),
            })
            .unwrap();
        assert_eq!(table.cell(0, "name"), Some(&CellValue::from("ada")));
        assert_eq!(edited.cell(0, "name"), Some(&CellValue::from("eve")));

        let appended = edited.apply_edit(&TableEdit::AppendRow).unwrap();
        assert_eq!(appended.row_count(), 3);
        assert!(appended.rows()[2].iter().all(CellValue::is_null));

        let deleted = appended.apply_edit(&TableEdit::DeleteRow { row: 0 }).unwrap();
        assert_eq!(deleted.row_count(), 2);
        assert_eq!(deleted.cell(0, "name"), Some(&CellValue::from("bob")));
    }

    #[test]
    fn test_apply_edit_errors() {
        let table = sample();
        assert!(table
            .apply_edit(&TableEdit::SetCell {
                row: 9,
                column: "name".into(),
                value: CellValue::Null,
            })
            .is_err());
        assert!(table
            .apply_edit(&TableEdit::SetCell {
                row: 0,
                column: "nope".into(),
                value: CellValue::Null,
            })
            .is_err());
        assert!(table.apply_edit(&TableEdit::DeleteRow { row: 2 }).is_err());
    }

    #[test]
    fn test_from_dataframe() {
        let df = df!(
            "a" => &[1i64, 2, 3],
            "b" => &[Some("x"), None, Some("z")],
            "c" => &[true, false, true]
        )
        .unwrap();
        let table = Table::from_dataframe(&df).unwrap();
        assert_eq!(table.columns(), &["a", "b", "c"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(2, "a"), Some(&CellValue::Int(3)));
        assert_eq!(table.cell(1, "b"), Some(&CellValue::Null));
        assert_eq!(table.cell(0, "c"), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_to_csv_string() {
        let csv = sample().to_csv_string().unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,name,score"));
        assert_eq!(lines.next(), Some("1,ada,9.5"));
        assert_eq!(lines.next(), Some("2,bob,"));
    }
}

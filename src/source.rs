//! CSV loading: bytes in a configured text encoding → [`Table`].

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use polars::prelude::*;
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::table::Table;
use crate::{Args, TextEncoding};

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    pub encoding: TextEncoding,
    pub delimiter: Option<u8>,
    pub has_header: Option<bool>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = Some(has_header);
        self
    }

    /// Create LoadOptions from CLI args and config, with CLI args taking precedence
    pub fn from_args_and_config(args: &Args, config: &AppConfig) -> Result<Self> {
        let encoding = match args.encoding {
            Some(encoding) => encoding,
            None => config.encoding()?,
        };

        // CLI no_header flag overrides config
        let has_header = if let Some(no_header) = args.no_header {
            Some(!no_header)
        } else {
            config.file_loading.has_header
        };

        Ok(Self {
            encoding,
            delimiter: args.delimiter.or(config.file_loading.delimiter),
            has_header,
        })
    }
}

/// Decode raw file bytes to text.
///
/// Latin-1 maps every byte to the code point of the same value and cannot
/// fail. ASCII rejects the first byte above 0x7F.
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
        TextEncoding::Windows1252 => WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or_else(|| eyre!("Input is not valid windows-1252 text")),
        TextEncoding::Ascii => {
            let valid_up_to = Encoding::ascii_valid_up_to(bytes);
            if valid_up_to < bytes.len() {
                return Err(eyre!(
                    "Byte 0x{:02X} at offset {} is not ASCII",
                    bytes[valid_up_to],
                    valid_up_to
                ));
            }
            // all-ASCII bytes are valid Latin-1 with the same code points
            Ok(encoding_rs::mem::decode_latin1(bytes))
        }
        TextEncoding::Utf8 => UTF_8
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or_else(|| eyre!("Input is not valid UTF-8 text")),
    }
}

/// Parse CSV bytes into a table. `name` is only used for messages.
pub fn load_csv_bytes(name: &str, bytes: &[u8], options: &LoadOptions) -> Result<Table> {
    let text = decode_bytes(bytes, options.encoding)
        .wrap_err_with(|| format!("Failed to decode {} as {}", name, options.encoding.as_str()))?;

    let mut read_options = CsvReadOptions::default();
    if let Some(has_header) = options.has_header {
        read_options.has_header = has_header;
    }
    if let Some(delimiter) = options.delimiter {
        read_options = read_options.map_parse_options(|opts| opts.with_separator(delimiter));
    }

    let df = CsvReader::new(Cursor::new(text.into_owned().into_bytes()))
        .with_options(read_options)
        .finish()?;
    let table = Table::from_dataframe(&df)?;

    tracing::debug!(
        file = name,
        rows = table.row_count(),
        columns = table.column_count(),
        encoding = options.encoding.as_str(),
        "loaded csv"
    );
    Ok(table)
}

/// Display name of a path: its final component.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    load_csv_bytes(&file_name(path), &bytes, options)
}

/// Result of loading one file.
#[derive(Debug)]
pub struct LoadOutcome {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<Table>,
}

/// Load every path independently. A failure is recorded in its outcome and
/// does not stop the remaining files.
pub fn load_paths<P: AsRef<Path>>(paths: &[P], options: &LoadOptions) -> Vec<LoadOutcome> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let result = load_path(path, options);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "failed to load file");
            }
            LoadOutcome {
                name: file_name(path),
                path: path.to_path_buf(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use clap::Parser;

    #[test]
    fn test_decode_latin1() {
        let bytes = b"caf\xe9";
        assert_eq!(decode_bytes(bytes, TextEncoding::Latin1).unwrap(), "café");
    }

    #[test]
    fn test_decode_windows_1252_punctuation() {
        // 0x93/0x94 are curly quotes in cp1252 but C1 controls in Latin-1
        let bytes = b"\x93hi\x94";
        assert_eq!(
            decode_bytes(bytes, TextEncoding::Windows1252).unwrap(),
            "\u{201c}hi\u{201d}"
        );
        assert_eq!(
            decode_bytes(bytes, TextEncoding::Latin1).unwrap(),
            "\u{93}hi\u{94}"
        );
    }

    #[test]
    fn test_decode_ascii_rejects_high_bytes() {
        assert_eq!(decode_bytes(b"plain", TextEncoding::Ascii).unwrap(), "plain");
        let err = decode_bytes(b"caf\xe9", TextEncoding::Ascii).unwrap_err();
        assert!(err.to_string().contains("offset 3"));
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(
            decode_bytes("naïve".as_bytes(), TextEncoding::Utf8).unwrap(),
            "naïve"
        );
        assert!(decode_bytes(b"\xff\xfe", TextEncoding::Utf8).is_err());
    }

    #[test]
    fn test_load_csv_bytes_latin1() {
        let table = load_csv_bytes(
            "people.csv",
            b"name,city\nJos\xe9,M\xe1laga\n",
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(table.columns(), &["name", "city"]);
        assert_eq!(table.cell(0, "name"), Some(&CellValue::from("José")));
        assert_eq!(table.cell(0, "city"), Some(&CellValue::from("Málaga")));
    }

    #[test]
    fn test_load_csv_bytes_with_delimiter() {
        let options = LoadOptions::new().with_delimiter(b';');
        let table = load_csv_bytes("semi.csv", b"a;b\n1;2\n3;4\n", &options).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "b"), Some(&CellValue::Int(4)));
    }

    #[test]
    fn test_load_csv_bytes_without_header() {
        let options = LoadOptions::new().with_has_header(false);
        let table = load_csv_bytes("raw.csv", b"1,2\n3,4\n", &options).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_options_cli_overrides_config() {
        let mut config = AppConfig::default();
        config.file_loading.delimiter = Some(b'\t');
        config.file_loading.has_header = Some(true);
        config.file_loading.encoding = "windows-1252".to_string();

        let args = Args::try_parse_from(["csvview", "a.csv", "--no-header", "true"]).unwrap();
        let options = LoadOptions::from_args_and_config(&args, &config).unwrap();
        assert_eq!(options.encoding, TextEncoding::Windows1252);
        assert_eq!(options.delimiter, Some(b'\t'));
        assert_eq!(options.has_header, Some(false));
    }
}

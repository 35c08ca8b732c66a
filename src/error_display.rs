//! User-facing error messages for per-file load failures and edits.
//!
//! Matches on typed errors (PolarsError variants, io::ErrorKind) found in a
//! report's cause chain rather than on rendered strings.

use polars::prelude::PolarsError;
use std::io;

/// Format a PolarsError raised while parsing CSV text.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::NoData(_) => "The file is empty.".to_string(),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::ComputeError(msg) => simplify_parse_message(msg),
        PE::Duplicate(msg) => format!("Duplicate column name: {}", msg),
        PE::ShapeMismatch(msg) => format!("Rows have different lengths: {}", msg),
        PE::SchemaMismatch(msg) => format!("Column types do not match: {}", msg),
        PE::OutOfBounds(msg) => format!("Row out of range: {}", msg),
        PE::ColumnNotFound(msg) => format!("Column not found: {}", msg),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error by its kind, optionally followed by `context`.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        _ => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            msg
        }
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a report by downcasting its causes to known error types.
///
/// `name` prefixes the message as `Failed to load {name}: ...`. Reports with
/// no typed cause use the first line of their display.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, name: Option<&str>) -> String {
    let msg = report
        .chain()
        .find_map(|cause| {
            if let Some(pe) = cause.downcast_ref::<PolarsError>() {
                return Some(user_message_from_polars(pe));
            }
            cause
                .downcast_ref::<io::Error>()
                .map(|io_err| user_message_from_io(io_err, None))
        })
        .unwrap_or_else(|| {
            let display = report.to_string();
            display
                .lines()
                .next()
                .map(str::trim)
                .unwrap_or("An error occurred")
                .to_string()
        });

    match name {
        Some(name) => format!("Failed to load {}: {}", name, msg),
        None => msg,
    }
}

/// Strip the parser's schema jargon from common CSV shape errors.
fn simplify_parse_message(msg: &str) -> String {
    if msg.contains("found more fields than defined") {
        return "A row has more fields than the header. Check the delimiter and quoting."
            .to_string();
    }
    if msg.contains("invalid utf-8") || msg.contains("invalid utf8") {
        return "The file is not valid text in the selected encoding.".to_string();
    }
    let first = msg.lines().next().unwrap_or(msg).trim();
    format!("Could not parse CSV: {}", first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(msg.contains("not found"), "got: {}", msg);
    }

    #[test]
    fn test_user_message_from_io_with_context() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let msg = user_message_from_io(&err, Some("(data.csv)"));
        assert_eq!(msg, "Permission denied. Check read access. (data.csv)");
    }

    #[test]
    fn test_user_message_from_polars_no_data() {
        let err = PolarsError::NoData("empty CSV".into());
        assert_eq!(user_message_from_polars(&err), "The file is empty.");
    }

    #[test]
    fn test_user_message_from_polars_extra_fields() {
        let err = PolarsError::ComputeError(
            "found more fields than defined in 'Schema'\n\nConsider setting 'truncate_ragged_lines=True'."
                .into(),
        );
        let msg = user_message_from_polars(&err);
        assert!(msg.contains("more fields than the header"), "got: {}", msg);
    }

    #[test]
    fn test_user_message_from_report_walks_chain() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let report = color_eyre::eyre::Report::new(io_err).wrap_err("while reading");
        let msg = user_message_from_report(&report, Some("a.csv"));
        assert_eq!(msg, "Failed to load a.csv: File not found.");
    }

    #[test]
    fn test_user_message_from_report_fallback_first_line() {
        let report: color_eyre::eyre::Report = eyre!("Byte 0xE9 at offset 3 is not ASCII\ndetails");
        assert_eq!(
            user_message_from_report(&report, None),
            "Byte 0xE9 at offset 3 is not ASCII"
        );
        let wrapped = report.wrap_err("Failed to decode b.csv as ascii");
        let msg = user_message_from_report(&wrapped, Some("b.csv"));
        assert_eq!(msg, "Failed to load b.csv: Failed to decode b.csv as ascii");
    }
}

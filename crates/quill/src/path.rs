//! Lenient path data input.

use log::warn;

use quill_core::path::Path;

/// Parses SVG path data, drawing nothing when the data is malformed.
///
/// Every diagnostic is logged at warn level.
pub fn parse_or_empty(data: &str) -> Path {
    match quill_parser::parse_path(data) {
        Ok(path) => path,
        Err(err) => {
            for diagnostic in err.diagnostics() {
                warn!(diagnostic:%; "Ignoring malformed path data");
            }
            Path::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_data_parses() {
        assert_eq!(parse_or_empty("M 0 0 L 10 10").to_svg(), "M 0 0 L 10 10");
    }

    #[test]
    fn test_malformed_data_is_empty() {
        assert!(parse_or_empty("M 0 0 L 10").is_empty());
        assert!(parse_or_empty("M 0 0 X 1 2").is_empty());
    }
}

//! Output helpers shared across commands.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default for interactive use)
    #[default]
    Table,
    /// JSON object or array (pipe-friendly, structured)
    Json,
}

/// Write data as JSON to the given writer, followed by a newline.
pub fn write_json<W: Write, T: Serialize>(
    data: &T,
    writer: &mut W,
    pretty: bool,
) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, data).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut *writer, data).map_err(io::Error::other)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Format a value with thousands separators and a fixed number of decimals,
/// e.g. `21343577.0` → `"21,343,577"`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_to_string() {
        let data = serde_json::json!({"region": "ULP Boja"});
        let mut output = Vec::new();
        write_json(&data, &mut output, false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "{\"region\":\"ULP Boja\"}\n");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(21_343_577.0, 0), "21,343,577");
        assert_eq!(format_thousands(1_088_249_105.0, 2), "1,088,249,105.00");
        assert_eq!(format_thousands(722.5, 1), "722.5");
        assert_eq!(format_thousands(999.6, 0), "1,000");
        assert_eq!(format_thousands(-1234.0, 0), "-1,234");
        assert_eq!(format_thousands(0.0, 0), "0");
    }
}

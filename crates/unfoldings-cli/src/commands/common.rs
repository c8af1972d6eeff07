//! Shared CLI helpers used across multiple commands.

use unfoldings_config::{ParamId, ParamKind};

/// Lowest host sample rate `render` accepts, in Hz.
pub const MIN_SAMPLE_RATE: u32 = 1_000;
/// Highest host sample rate `render` accepts, in Hz.
pub const MAX_SAMPLE_RATE: u32 = 768_000;

/// Parse a host sample rate for clap's `value_parser`.
pub fn parse_sample_rate(s: &str) -> Result<u32, String> {
    let rate: u32 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid sample rate: '{s}'"))?;
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&rate) {
        return Err(format!(
            "Sample rate {rate} Hz outside {MIN_SAMPLE_RATE}..={MAX_SAMPLE_RATE}"
        ));
    }
    Ok(rate)
}

/// Linear amplitude to dBFS, floored at -120.
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 1e-6 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}

/// `#AARRGGBB` text for a packed ARGB colour.
pub fn colour_hex(argb: u32) -> String {
    format!("#{argb:08X}")
}

/// Range column for a parameter listing.
pub fn range_text(id: ParamId) -> String {
    let spec = id.spec();
    match spec.kind {
        ParamKind::Choice(options) => options.join(" | "),
        ParamKind::Bool => "off | on".to_string(),
        _ => format!("{} .. {}", spec.format(spec.min), spec.format(spec.max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversion() {
        assert_eq!(linear_to_db(1.0), 0.0);
        assert!((linear_to_db(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(linear_to_db(0.0), -120.0);
    }

    #[test]
    fn sample_rate_bounds() {
        assert_eq!(parse_sample_rate("48000"), Ok(48_000));
        assert_eq!(parse_sample_rate("1000"), Ok(1_000));
        assert!(parse_sample_rate("30").is_err());
        assert!(parse_sample_rate("0").is_err());
        assert!(parse_sample_rate("999999").is_err());
        assert!(parse_sample_rate("fast").is_err());
    }

    #[test]
    fn hex_colour() {
        assert_eq!(colour_hex(0xFFCA_CACA), "#FFCACACA");
    }

    #[test]
    fn range_columns() {
        assert_eq!(range_text(ParamId::Density), "500 .. 30000");
        assert_eq!(range_text(ParamId::Loop), "off | on");
        assert!(range_text(ParamId::Mode).starts_with("Granular | Spectral"));
    }
}

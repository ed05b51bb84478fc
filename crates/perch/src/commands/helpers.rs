use tracing::warn;

use perch_core::{OffsetRect, PerchConfig, Rect, Size};

/// Load config, falling back to defaults with a visible warning.
pub fn load_config_with_warning() -> PerchConfig {
    match PerchConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.perch/config.toml and ./.perch/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            PerchConfig::default()
        }
    }
}

fn parse_numbers(value: &str, expected: usize, shape: &str) -> Result<Vec<f64>, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("expected {shape}, got '{value}'"))?;

    if parts.len() != expected || parts.iter().any(|n| !n.is_finite()) {
        return Err(format!("expected {shape}, got '{value}'"));
    }
    Ok(parts)
}

/// Parse `W,H` into a content size. Fractional values are allowed.
pub fn parse_size(value: &str) -> Result<Size, String> {
    let n = parse_numbers(value, 2, "W,H")?;
    if n[0] < 0.0 || n[1] < 0.0 {
        return Err(format!("size must not be negative, got '{value}'"));
    }
    Ok(Size::new(n[0], n[1]))
}

/// Parse `X,Y,W,H` into window bounds in whole pixels.
pub fn parse_rect(value: &str) -> Result<Rect, String> {
    let n = parse_numbers(value, 4, "X,Y,W,H")?;
    if n.iter().any(|v| v.fract() != 0.0) {
        return Err(format!("window bounds must be whole pixels, got '{value}'"));
    }
    if n[2] < 0.0 || n[3] < 0.0 {
        return Err(format!("window size must not be negative, got '{value}'"));
    }
    Ok(Rect::new(n[0] as i32, n[1] as i32, n[2] as u32, n[3] as u32))
}

/// Parse `X,Y,W,H` into a trigger-element rectangle.
pub fn parse_offset(value: &str) -> Result<OffsetRect, String> {
    let n = parse_numbers(value, 4, "X,Y,W,H")?;
    Ok(OffsetRect::new(n[0], n[1], n[2], n[3]))
}

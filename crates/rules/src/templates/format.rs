//! Display formatting of evaluated values: units, value maps, range maps.

use crate::schema::{RangeMap, ValueMap};

const BYTE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Format `value` for display under `unit` with `decimals` places.
///
/// | unit | output |
/// |---|---|
/// | empty, `none`, `short` | scaled with `K`, `M`, `B` suffixes |
/// | `percent`, `percentunit` | `12.50%` |
/// | `bytes` | binary scaling, always two places |
/// | `ms`, `s` | `120.00ms` |
/// | anything else | `3.00 rpm` |
pub fn format_value(value: f64, unit: &str, decimals: usize) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }

    match unit {
        "" | "none" | "short" => format_short(value, decimals),
        "percent" | "percentunit" => format!("{}%", to_fixed(value, decimals)),
        "bytes" => format_bytes(value),
        "ms" | "s" => format!("{}{}", to_fixed(value, decimals), unit),
        other => format!("{} {}", to_fixed(value, decimals), other),
    }
}

fn format_short(value: f64, decimals: usize) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{}B", to_fixed(value / 1e9, decimals))
    } else if abs >= 1e6 {
        format!("{}M", to_fixed(value / 1e6, decimals))
    } else if abs >= 1e3 {
        format!("{}K", to_fixed(value / 1e3, decimals))
    } else {
        to_fixed(value, decimals)
    }
}

fn format_bytes(bytes: f64) -> String {
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", to_fixed(value, 2), BYTE_UNITS[unit])
}

/// Fixed-point text with `decimals` places. Exact ties round away from
/// zero (`2.5` -> `3`, `0.125` -> `0.13`); everything else rounds to
/// nearest on the exact binary value, so `1.005` stays `1.00`.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if is_decimal_tie(value, decimals) {
        // One ulp away from zero lifts the tie off the midpoint.
        let nudged = f64::from_bits(value.to_bits() + 1);
        format!("{:.*}", decimals, nudged)
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// True when `value` sits exactly halfway between two `decimals`-place
/// neighbours.
fn is_decimal_tie(value: f64, decimals: usize) -> bool {
    value.is_finite()
        && exact_fraction_digits(value) == decimals + 1
        && format!("{:.*}", decimals + 1, value).ends_with('5')
}

/// Number of fractional decimal digits in the exact expansion of `value`.
fn exact_fraction_digits(value: f64) -> usize {
    if value == 0.0 {
        return 0;
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let exponent = exponent + i64::from(mantissa.trailing_zeros());
    if exponent >= 0 {
        0
    } else {
        (-exponent) as usize
    }
}

/// Text of the first enabled value map whose value equals the value's
/// canonical string form (`90`, `0.5`, `-3`).
pub fn apply_value_maps(value: f64, maps: &[ValueMap]) -> Option<String> {
    let key = js_number_string(value);
    maps.iter()
        .filter(|m| m.enabled)
        .find(|m| m.value == key)
        .map(|m| m.text.clone())
}

/// Text of the first enabled range map with `from <= value <= to`.
pub fn apply_range_maps(value: f64, maps: &[RangeMap]) -> Option<String> {
    maps.iter()
        .filter(|m| m.enabled)
        .find(|m| value >= m.from && value <= m.to)
        .map(|m| m.text.clone())
}

/// Canonical number text: whole numbers without a fraction, `NaN`,
/// `Infinity`, `-Infinity`, otherwise the shortest round-trip form.
pub fn js_number_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

const SUFFIXES: [&str; 5] = ["", "k", "m", "b", "t"];

/// Abbreviate a count with one decimal and a base-1000 suffix, prefixed
/// with `+`. Zero and missing values render as `+0`.
pub fn format_delta(stat: impl Into<Option<u64>>) -> String {
    match stat.into() {
        None | Some(0) => "+0".to_string(),
        Some(n) => format!("+{}", abbreviate(n)),
    }
}

fn abbreviate(n: u64) -> String {
    let mut value = n as f64;
    let mut idx = 0;
    while value >= 1000.0 && idx < SUFFIXES.len() - 1 {
        value /= 1000.0;
        idx += 1;
    }
    // 999_950 would print as 1000.0k
    if (value * 10.0).round() >= 10_000.0 && idx < SUFFIXES.len() - 1 {
        value /= 1000.0;
        idx += 1;
    }
    format!("{:.1}{}", value, SUFFIXES[idx])
}

/// Full count with thousands separators, e.g. `1,234,567`
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

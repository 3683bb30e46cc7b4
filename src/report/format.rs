//! Number and text formatting for the dashboard.

/// Group the digits of a non-negative integer string with commas.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: usize) -> String {
    group_digits(&n.to_string())
}

/// Round half to even and print with thousands separators and no decimals.
pub fn format_rounded(v: f64) -> String {
    let rounded = v.round_ties_even();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{}", sign, group_digits(&format!("{:.0}", rounded.abs())))
}

/// `4500.4` with `"₱"` → `"₱4,500"`.
pub fn format_currency(symbol: &str, v: f64) -> String {
    format!("{}{}", symbol, format_rounded(v))
}

/// Share of a whole as a percentage with 3 significant digits, trailing zeros trimmed.
pub fn format_percent(fraction: f64) -> String {
    let pct = fraction * 100.0;
    if pct == 0.0 || !pct.is_finite() {
        return format!("{}%", pct);
    }
    // Integer digits; zero or negative below 1%
    let magnitude = pct.abs().log10().floor() as i32 + 1;
    let decimals = (3 - magnitude).max(0) as usize;
    let mut s = format!("{:.*}", decimals, pct);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{}%", s)
}

/// Axis tick label: grouped integer when whole, otherwise up to two decimals.
pub fn format_axis_label(v: f64) -> String {
    if v.abs() >= 1e9 {
        return format!("{:.2e}", v);
    }
    if v.fract() == 0.0 {
        return format_rounded(v);
    }
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Escape text for HTML and SVG content and attributes.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut `s` to at most `max_chars` characters, ending with an ellipsis when shortened.
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

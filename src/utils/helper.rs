/// Parse a number the way price APIs send it: tolerates surrounding spaces,
/// thousands separators, a trailing `%` and missing values (which read as 0).
pub fn parse_lenient_f64(s: Option<&str>) -> f64 {
    s.map(|s| s.trim().trim_end_matches('%').replace(',', ""))
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Format with exactly two decimals
pub fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

/// Insert thousands separators into a numeric string, keeping any fraction.
/// Non-numeric input is returned as is.
pub fn add_commas(number: &str) -> String {
    let number = number.trim();
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rest, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Price text: two decimals with separators above 1, more precision below
pub fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        add_commas(&two_decimals(price))
    } else {
        let text = format!("{:.8}", price);
        let trimmed = text.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}

/// Truncate a string to a maximum length
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! Number formatting utilities for report cells

/// Format a number with a thousands separator (space) and a fixed number
/// of decimal places
pub fn format_number_with_decimals(value: f64, decimals: u8) -> String {
    let formatted = match decimals {
        0 => format!("{:.0}", value),
        1 => format!("{:.1}", value),
        2 => format!("{:.2}", value),
        _ => format!("{:.2}", value),
    };

    let parts: Vec<&str> = formatted.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    // Insert a space every 3 digits, counting from the end of the integer part
    let mut grouped = String::new();
    let chars: Vec<char> = integer_part.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 && *c != '-' {
            grouped.push(' ');
        }
        grouped.push(*c);
    }
    let formatted_integer = grouped.chars().rev().collect::<String>();

    match decimal_part {
        Some(d) => format!("{}.{}", formatted_integer, d),
        None => formatted_integer,
    }
}

/// Format a monetary value: 2 decimal places with a thousands separator
pub fn format_money(value: f64) -> String {
    format_number_with_decimals(value, 2)
}

//! Utility functions and helpers

use uuid::Uuid;

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Render an amount for humans: whole numbers without a fraction, others with two places
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format_number(amount as i64)
    } else {
        let fixed = format!("{:.2}", amount);
        match fixed.split_once('.') {
            Some((whole, frac)) => format!("{}.{}", format_number(whole), frac),
            None => fixed,
        }
    }
}

/// Generate a fresh transaction identifier (UUID v4, hyphenated)
pub fn generate_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

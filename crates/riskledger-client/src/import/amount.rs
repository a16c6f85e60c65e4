const CURRENCY_CODES: [&str; 6] = ["rs.", "rs", "inr", "usd", "eur", "gbp"];
const CURRENCY_SYMBOLS: [char; 5] = ['₹', '$', '€', '£', '¥'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideMarker {
    Debit,
    Credit,
}

/// Parses a locale-formatted money string into a signed value rounded to two
/// decimals.
///
/// Accepts currency symbols and leading codes, comma grouping (western and
/// Indian), parenthesized negatives, and trailing `Dr`/`Cr` markers. `Dr`
/// always yields a negative value, `Cr` always a positive one.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (body, marker) = split_side_marker(trimmed);
    let (body, parenthesized) = strip_parentheses(body.trim());
    let (body, negative) = strip_sign_and_currency(body);

    let digits = body
        .chars()
        .filter(|character| !matches!(character, ',' | ' ' | '\u{a0}' | '\''))
        .collect::<String>();
    if digits.is_empty()
        || !digits
            .chars()
            .all(|character| character.is_ascii_digit() || character == '.')
    {
        return None;
    }

    let magnitude = digits.parse::<f64>().ok()?;
    if !magnitude.is_finite() {
        return None;
    }

    let signed = match marker {
        Some(SideMarker::Debit) => -magnitude.abs(),
        Some(SideMarker::Credit) => magnitude.abs(),
        None if negative || parenthesized => -magnitude.abs(),
        None => magnitude,
    };

    Some(round_to(signed, 2))
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn split_side_marker(value: &str) -> (&str, Option<SideMarker>) {
    let lowered = value.to_ascii_lowercase();
    for (suffix, marker) in [
        ("dr.", SideMarker::Debit),
        ("cr.", SideMarker::Credit),
        ("dr", SideMarker::Debit),
        ("cr", SideMarker::Credit),
    ] {
        if !lowered.ends_with(suffix) {
            continue;
        }
        let head = &value[..value.len() - suffix.len()];
        if head.chars().last().is_some_and(char::is_alphabetic) {
            continue;
        }
        return (head.trim_end(), Some(marker));
    }
    (value, None)
}

fn strip_parentheses(value: &str) -> (&str, bool) {
    if let Some(inner) = value
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return (inner.trim(), true);
    }
    (value, false)
}

fn strip_sign_and_currency(value: &str) -> (&str, bool) {
    let mut current = value.trim();
    let mut negative = false;

    loop {
        let before = current;

        if let Some(rest) = current.strip_prefix('-') {
            negative = !negative;
            current = rest.trim_start();
        } else if let Some(rest) = current.strip_prefix('+') {
            current = rest.trim_start();
        }

        if let Some(rest) = current.strip_prefix(CURRENCY_SYMBOLS) {
            current = rest.trim_start();
        }
        if let Some(rest) = current.strip_suffix(CURRENCY_SYMBOLS) {
            current = rest.trim_end();
        }

        for code in CURRENCY_CODES {
            if let Some(prefix) = current.get(..code.len())
                && prefix.eq_ignore_ascii_case(code)
            {
                current = current[code.len()..].trim_start();
                break;
            }
        }
        for code in CURRENCY_CODES {
            let Some(split_at) = current.len().checked_sub(code.len()) else {
                continue;
            };
            if let Some(suffix) = current.get(split_at..)
                && suffix.eq_ignore_ascii_case(code)
                && current[..split_at].ends_with([' ', '\u{a0}'])
            {
                current = current[..split_at].trim_end();
                break;
            }
        }

        if current == before {
            break;
        }
    }

    if let Some(rest) = current.strip_suffix('-') {
        negative = !negative;
        current = rest.trim_end();
    }

    (current, negative)
}

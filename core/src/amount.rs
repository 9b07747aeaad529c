//! Amount text normalization and number formatting.
//!
//! The amount editor never holds free-form text: every keystroke is passed
//! through [`normalize_amount_input`], so the stored text is always digits,
//! at most one `.`, and `,` separators in the whole part.

/// Fraction digits kept when rendering a converted value.
const RESULT_FRACTION_DIGITS: usize = 3;

/// Normalize what the user typed into the amount field.
///
/// `_previous_raw` is the text currently displayed; `user_input` is the
/// field's content after the edit. The output depends on `user_input` alone
/// and becomes the new displayed text.
///
/// - Everything but ASCII digits and `.` is dropped (this removes the `,`
///   separators of the previous rendering too).
/// - With two or more `.`, the text from the last `.` onwards is cut, so a
///   mistyped second point only removes the trailing fragment.
/// - The whole part is grouped with `,` every three digits from the right.
///
/// ```
/// use fx_core::amount::normalize_amount_input;
/// assert_eq!(normalize_amount_input("", "1234567"), "1,234,567");
/// assert_eq!(normalize_amount_input("12.", "12..5"), "12.");
/// ```
pub fn normalize_amount_input(_previous_raw: &str, user_input: &str) -> String {
    let mut input: String = user_input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if input.matches('.').count() > 1 {
        if let Some(last) = input.rfind('.') {
            input.truncate(last);
        }
    }

    let mut parts = input.split('.');
    let whole = parts.next().unwrap_or("");
    let decimal = parts.next().map(|d| format!(".{d}")).unwrap_or_default();

    format!("{}{}", group_thousands(whole), decimal)
}

/// Insert `,` before every complete group of three digits counted from the
/// right. Expects ASCII digits only.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Numeric value of a normalized amount, ignoring `,` separators.
///
/// Returns `None` for empty text or text that is not a finite number
/// (e.g. a lone `"."`). A trailing point is accepted: `"12."` is `12.0`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a converted value for display: at most three fraction digits,
/// trailing zeros dropped, whole part grouped.
///
/// `920.5` → `"920.5"`, `1234.5678` → `"1,234.568"`, `920.0` → `"920"`.
pub fn format_result(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", RESULT_FRACTION_DIGITS, value);
    let (negative, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };

    let trimmed = unsigned.trim_end_matches('0').trim_end_matches('.');
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (trimmed, None),
    };

    let mut out = String::new();
    if negative && trimmed != "0" {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(f) = fraction {
        out.push('.');
        out.push_str(f);
    }
    out
}

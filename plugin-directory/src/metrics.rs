//! Derived numbers shown in the detail pane.

use crate::record::Ratio;

/// `ceil(part / total * 100)` computed exactly in integers.
///
/// Returns [`Ratio::Unknown`] when `total` is zero or either counter is missing.
pub fn ceil_percent(part: Option<u64>, total: Option<u64>) -> Ratio {
    match (part, total) {
        (Some(part), Some(total)) if total > 0 => {
            let scaled = u128::from(part) * 100;
            let total = u128::from(total);
            let pct = scaled.div_ceil(total);
            Ratio::Percent(u32::try_from(pct).unwrap_or(u32::MAX))
        }
        _ => Ratio::Unknown,
    }
}

/// Groups digits by thousands the way an en-US locale does (`1234567` → `1,234,567`).
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

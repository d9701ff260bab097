/// Human-readable byte counts and thousands-separated counters.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.

/// Unit labels paired with the number of decimals shown for each.
const UNITS: [(&str, usize); 6] = [
    ("B", 0),
    ("KB", 1),
    ("MB", 1),
    ("GB", 2),
    ("TB", 2),
    ("PB", 2),
];

/// Format a byte count with the largest unit that keeps the value below 1024.
///
/// Uses binary multiples but the short labels users expect (KB, MB, GB).
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let (label, decimals) = UNITS[unit];
    format!("{value:.decimals$} {label}")
}

/// Format a count with `,` between each group of three digits.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

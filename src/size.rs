/// Format a size in bytes as a human-readable string, in decimal units.
///
/// `1 Byte`, `512 Bytes`, `8.2 kB`, `1.0 MB`.
pub fn format_size(bytes: u64) -> String {
    const BASE: f64 = 1000.0;
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

    match bytes {
        1 => return "1 Byte".to_string(),
        0..1000 => return format!("{bytes} Bytes"),
        _ => {}
    }

    let mut value = bytes as f64 / BASE;
    for unit in &UNITS[..UNITS.len() - 1] {
        if value < BASE {
            return format!("{value:.1} {unit}");
        }
        value /= BASE;
    }
    format!("{value:.1} {}", UNITS[UNITS.len() - 1])
}

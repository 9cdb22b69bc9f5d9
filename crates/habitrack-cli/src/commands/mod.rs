pub mod analytics;
pub mod example;
pub mod habit;
pub mod settings;

use habitrack_core::Periodicity;

/// clap value parser for `--frequency`.
pub fn parse_frequency(value: &str) -> Result<Periodicity, String> {
    value.parse::<Periodicity>().map_err(|e| e.to_string())
}

/// "3 days", "1 week". Unsupported frequencies count in "periods".
pub fn streak_label(streak: u32, frequency: &str) -> String {
    let unit = frequency
        .parse::<Periodicity>()
        .map_or("period", |p| p.unit());
    if streak == 1 {
        format!("{streak} {unit}")
    } else {
        format!("{streak} {unit}s")
    }
}

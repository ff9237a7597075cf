//! Display formatters shared by the API and CLI.
//!
//! Pure functions with no side effects; rounding happens here and nowhere
//! else, so accrual math always runs on unrounded values.

/// Format a monetary amount as a dollar string with two decimals.
pub fn money(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a duration in seconds as zero-padded `MM:SS`.
///
/// Minutes are uncapped, so long sessions render as e.g. `125:09`.
pub fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (localStorage on web, files on native)
//! - Current date for new-world seeds
//! - Logger setup and the JS-facing game handle (web)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Today's local date as `YYYY-MM-DD`
#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_today_format() {
        let d = today();
        assert_eq!(d.len(), 10);
        assert_eq!(d.as_bytes()[4], b'-');
        assert_eq!(d.as_bytes()[7], b'-');
        assert!(d.chars().filter(|c| *c != '-').all(|c| c.is_ascii_digit()));
    }
}

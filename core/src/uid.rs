//! Generation of new unique identifiers.

use chrono::{Local, NaiveDateTime};
use rand::Rng;

/// The root used for identifiers generated by this library.
pub const DEFAULT_UID_ROOT: &str = "1.2.826.0.1.3680043.8.641";

/// The maximum length of a UID, in characters.
pub const MAX_UID_LENGTH: usize = 64;

/// Generate a new UID under `root`.
///
/// The identifier joins the root, the given integer prefix,
/// the current date, the current time and a random number with dots.
/// Components never start with a zero unless they are exactly `0`,
/// and the result is cut to 64 characters.
///
/// ```
/// # use dcm_core::uid::generate_uid;
/// let uid = generate_uid("1.2.3", 1);
/// assert!(uid.starts_with("1.2.3.1."));
/// assert!(uid.len() <= 64);
/// assert!(uid.split('.').all(|c| c == "0" || !c.starts_with('0')));
/// ```
pub fn generate_uid(root: &str, prefix: u32) -> String {
    let random: u32 = rand::thread_rng().gen();
    compose_uid(root, prefix, Local::now().naive_local(), random)
}

fn compose_uid(root: &str, prefix: u32, now: NaiveDateTime, random: u32) -> String {
    let date = now.format("%Y%m%d").to_string();
    let time = now.format("%H%M%S%3f").to_string();
    let mut uid = [
        root.to_string(),
        prefix.to_string(),
        strip_leading_zeros(&date),
        strip_leading_zeros(&time),
        random.to_string(),
    ]
    .join(".");
    uid.truncate(MAX_UID_LENGTH);
    // a truncated component must not end the identifier with a dot
    while uid.ends_with('.') {
        uid.pop();
    }
    uid
}

fn strip_leading_zeros(component: &str) -> String {
    let trimmed = component.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn components_have_no_leading_zeros() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_milli_opt(0, 7, 9, 12))
            .unwrap();
        let uid = compose_uid("1.2.3", 7, now, 42);
        assert_eq!(uid, "1.2.3.7.20240305.709012.42");
    }

    #[test]
    fn midnight_is_zero() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0))
            .unwrap();
        let uid = compose_uid("1.2", 0, now, 5);
        assert_eq!(uid, "1.2.0.20240101.0.5");
    }

    #[test]
    fn long_roots_are_truncated() {
        let root = "1.2.3.4.5.6.7.8.9.10.11.12.13.14.15.16.17.18.19.20.21.22.23";
        let uid = generate_uid(root, 99);
        assert!(uid.len() <= MAX_UID_LENGTH);
        assert!(!uid.ends_with('.'));
        assert!(uid.starts_with(root));
    }

    #[test]
    fn generated_uids_differ() {
        let a = generate_uid(DEFAULT_UID_ROOT, 1);
        let b = generate_uid(DEFAULT_UID_ROOT, 1);
        assert_ne!(a, b);
    }
}

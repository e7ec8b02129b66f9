//! UID clean-up for values received in association items.

use std::borrow::Cow;

/// Strip the trailing null or space padding of an even-length UID.
pub(crate) fn trim_uid(uid: Cow<'_, str>) -> Cow<'_, str> {
    let padded = |c: char| c == '\0' || c == ' ';
    if uid.ends_with(padded) {
        Cow::Owned(uid.trim_end_matches(padded).to_string())
    } else {
        uid
    }
}

#[cfg(test)]
mod tests {
    use super::trim_uid;
    use rstest::rstest;
    use std::borrow::Cow;

    #[rstest]
    #[case("1.2.3.4", "1.2.3.4")]
    #[case("1.2.3.4\0", "1.2.3.4")]
    #[case("1.2.3.45 ", "1.2.3.45")]
    #[case("1.2.840.10008.1.1\0", "1.2.840.10008.1.1")]
    fn padding_is_removed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(trim_uid(Cow::from(raw)), expected);
    }

    #[test]
    fn unpadded_uid_is_borrowed() {
        assert!(matches!(trim_uid(Cow::from("1.2")), Cow::Borrowed(_)));
    }
}

//! Secret masking for diagnostic output

/// Characters revealed at each end of a long secret
const REVEAL: usize = 4;
/// Secrets shorter than this are fully hidden
const MIN_PARTIAL_LEN: usize = 12;

/// Masks a value for display, revealing at most a short prefix and suffix
///
/// Values shorter than twelve characters are replaced entirely so that the
/// revealed ends never add up to a meaningful share of the secret.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_PARTIAL_LEN {
        return "****".to_string();
    }
    let prefix: String = chars[..REVEAL].iter().collect();
    let suffix: String = chars[chars.len() - REVEAL..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_are_fully_hidden() {
        assert_eq!(mask_secret(""), "****");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("elevenchars"), "****");
    }

    #[test]
    fn long_values_reveal_only_ends() {
        let secret = "gsk_0123456789abcdefXYZ9";
        let masked = mask_secret(secret);
        assert_eq!(masked, "gsk_...XYZ9");
        assert!(!masked.contains(secret));
    }

    #[test]
    fn multibyte_values_do_not_panic() {
        let masked = mask_secret("ключ-секрет-значение");
        assert!(masked.starts_with("ключ"));
    }
}

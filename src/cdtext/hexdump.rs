use crate::cdtext::error::DecodeWarning;

/// Strips formatting from a hex dump and pairs the remaining digits into
/// bytes. Whitespace, offsets and punctuation are ignored; a trailing odd
/// digit is dropped with a warning. Never fails.
pub fn normalize(input: &str, warnings: &mut Vec<DecodeWarning>) -> Vec<u8> {
    let mut digits: String = input.chars().filter(char::is_ascii_hexdigit).collect();
    if digits.len() % 2 != 0 {
        warnings.push(DecodeWarning::OddHexDigit);
        digits.pop();
    }

    // Only paired hex digits remain at this point.
    hex::decode(&digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whitespace_and_newlines() {
        let mut warnings = Vec::new();
        let bytes = normalize("80 00\n01\t0f", &mut warnings);
        assert_eq!(bytes, vec![0x80, 0x00, 0x01, 0x0F]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn ignores_non_hex_characters() {
        let mut warnings = Vec::new();
        let bytes = normalize("zz80|:81zz", &mut warnings);
        assert_eq!(bytes, vec![0x80, 0x81]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn drops_trailing_odd_digit_with_warning() {
        let mut warnings = Vec::new();
        let bytes = normalize("80f", &mut warnings);
        assert_eq!(bytes, vec![0x80]);
        assert_eq!(warnings, vec![DecodeWarning::OddHexDigit]);
    }

    #[test]
    fn empty_input_yields_empty_buffer() {
        let mut warnings = Vec::new();
        assert!(normalize("", &mut warnings).is_empty());
        assert!(normalize("zzz ?! --", &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }
}

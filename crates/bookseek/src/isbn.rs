//! Conversion and validation of ISBN-10 and ISBN-13 values.
//!
//! All functions in this module are pure. Input is expected without separators, use
//! [`normalize`] first for values that were typed or scanned with hyphens or spaces.
//!
//! Characters that are not decimal digits are rejected outright rather than being read as zero,
//! the only exception being a trailing `X` (or `x`) as the ISBN-10 check character.

use std::fmt;

/// The only ISBN-13 prefix (EAN "Bookland") with an ISBN-10 equivalent.
const ISBN10_PREFIX: &str = "978";
/// ISBN-13 prefix which has no ISBN-10 equivalent.
const ISBN13_ONLY_PREFIX: &str = "979";

/// Reasons an ISBN cannot be converted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionError {
    /// The input did not have the number of characters required.
    InvalidLength {
        /// Length required for the conversion.
        expected: usize,
        /// Length of the input.
        found: usize,
    },
    /// The ISBN-13 does not start with `978` or `979`.
    InvalidPrefix,
    /// The ISBN-13 starts with `979`, a range which has no ISBN-10.
    NoIsbn10,
    /// The input contains a character that is not allowed at that position.
    InvalidCharacter {
        /// Zero based index of the character.
        position: usize,
        /// The offending character.
        found: char,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, found } => {
                write!(f, "expected {expected} characters but found {found}")
            }
            Self::InvalidPrefix => f.write_str("ISBN-13 must start with 978 or 979"),
            Self::NoIsbn10 => f.write_str("no ISBN-10 exists for an ISBN-13 starting with 979"),
            Self::InvalidCharacter { position, found } => {
                write!(f, "invalid character '{found}' at position {position}")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Removes hyphens and whitespace from a raw ISBN string.
///
/// ```
/// assert_eq!("9780380815937", bookseek::isbn::normalize("978-0380815937 "));
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}

/// Converts an ISBN-13 into an ISBN-10, returning [`None`] when this is not possible.
///
/// See [`try_to_isbn10`] for the reason a conversion failed.
///
/// ```
/// assert_eq!(Some("4000000004".to_owned()), bookseek::isbn::to_isbn10("9784000000000"));
/// assert_eq!(None, bookseek::isbn::to_isbn10("9790000000000"));
/// ```
#[must_use]
pub fn to_isbn10(isbn13: &str) -> Option<String> {
    try_to_isbn10(isbn13).ok()
}

/// Converts an ISBN-13 into an ISBN-10.
///
/// The check digit of the ISBN-13 is not verified, the ISBN-10 check character is always computed
/// from the nine digits following the prefix.
///
/// # Errors
///
/// - [`ConversionError::InvalidLength`] when the input is not 13 characters.
/// - [`ConversionError::InvalidCharacter`] when the input contains a non digit.
/// - [`ConversionError::NoIsbn10`] when the input starts with `979`.
/// - [`ConversionError::InvalidPrefix`] when the input starts with neither `978` nor `979`.
pub fn try_to_isbn10(isbn13: &str) -> Result<String, ConversionError> {
    check_length(isbn13, 13)?;
    let digits = digits(isbn13, |_, _| false)?;

    if isbn13.starts_with(ISBN13_ONLY_PREFIX) {
        return Err(ConversionError::NoIsbn10);
    }
    if !isbn13.starts_with(ISBN10_PREFIX) {
        return Err(ConversionError::InvalidPrefix);
    }

    let mut isbn10 = isbn13[3..12].to_owned();
    isbn10.push(isbn10_check(&digits[3..12]));
    Ok(isbn10)
}

/// Converts an ISBN-10 into an ISBN-13, returning [`None`] when this is not possible.
///
/// ```
/// assert_eq!(Some("9784000000000".to_owned()), bookseek::isbn::to_isbn13("4000000000"));
/// assert_eq!(None, bookseek::isbn::to_isbn13("400000000"));
/// ```
#[must_use]
pub fn to_isbn13(isbn10: &str) -> Option<String> {
    try_to_isbn13(isbn10).ok()
}

/// Converts an ISBN-10 into an ISBN-13 by prefixing `978`.
///
/// The ISBN-10 check character is discarded and not verified, the ISBN-13 check digit is computed
/// from the twelve digits of the new candidate.
///
/// # Errors
///
/// - [`ConversionError::InvalidLength`] when the input is not 10 characters.
/// - [`ConversionError::InvalidCharacter`] when one of the first nine characters is not a digit or
///   the last is neither a digit nor `X`.
pub fn try_to_isbn13(isbn10: &str) -> Result<String, ConversionError> {
    check_length(isbn10, 10)?;
    digits(isbn10, |position, c| position == 9 && matches!(c, 'X' | 'x'))?;

    let mut isbn13 = format!("{ISBN10_PREFIX}{}", &isbn10[..9]);
    let check = isbn13_check(&digits(&isbn13, |_, _| false)?);
    isbn13.push_str(&check.to_string());
    Ok(isbn13)
}

/// Returns `true` when `isbn13` is 13 digits, starts with `978` or `979` and has a correct check
/// digit.
#[must_use]
pub fn is_valid_isbn13(isbn13: &str) -> bool {
    if check_length(isbn13, 13).is_err()
        || !(isbn13.starts_with(ISBN10_PREFIX) || isbn13.starts_with(ISBN13_ONLY_PREFIX))
    {
        return false;
    }

    digits(isbn13, |_, _| false)
        .map(|digits| isbn13_check(&digits[..12]) == digits[12])
        .unwrap_or(false)
}

/// Returns `true` when `isbn10` is nine digits followed by a correct check character.
#[must_use]
pub fn is_valid_isbn10(isbn10: &str) -> bool {
    if check_length(isbn10, 10).is_err() {
        return false;
    }

    match digits(isbn10, |position, c| position == 9 && matches!(c, 'X' | 'x')) {
        Ok(digits) => {
            let expected = isbn10_check(&digits[..9]);
            isbn10[9..].eq_ignore_ascii_case(&expected.to_string())
        }
        Err(_) => false,
    }
}

/// Reads user input as an ISBN-13.
///
/// The input is normalized, a valid ISBN-13 is returned unchanged and a 10 character value is
/// converted with [`to_isbn13`].
///
/// ```
/// use bookseek::isbn::as_isbn13;
///
/// assert_eq!(Some("9780735619678".to_owned()), as_isbn13("0-7356-1967-0"));
/// assert_eq!(Some("9780735619678".to_owned()), as_isbn13("978-0-7356-1967-8"));
/// assert_eq!(None, as_isbn13("978-0-7356-1967-0"));
/// ```
#[must_use]
pub fn as_isbn13(raw: &str) -> Option<String> {
    let isbn = normalize(raw);
    match isbn.len() {
        13 if is_valid_isbn13(&isbn) => Some(isbn),
        10 => to_isbn13(&isbn),
        _ => None,
    }
}

fn check_length(isbn: &str, expected: usize) -> Result<(), ConversionError> {
    let found = isbn.chars().count();
    if found == expected {
        Ok(())
    } else {
        Err(ConversionError::InvalidLength { expected, found })
    }
}

/// Reads every character as a decimal digit, `allow_ten` decides where the value 10 (`X`) is
/// accepted.
fn digits<F>(isbn: &str, allow_ten: F) -> Result<Vec<u32>, ConversionError>
where
    F: Fn(usize, char) -> bool,
{
    isbn.chars()
        .enumerate()
        .map(|(position, c)| match c.to_digit(10) {
            Some(digit) => Ok(digit),
            None if allow_ten(position, c) => Ok(10),
            None => Err(ConversionError::InvalidCharacter { position, found: c }),
        })
        .collect()
}

/// Check character for nine digits using the descending weights 10 to 2.
fn isbn10_check(digits: &[u32]) -> char {
    let sum: u32 = digits.iter().zip((2..=10).rev()).map(|(d, w)| d * w).sum();
    // only a check value of 10 is not a decimal digit
    char::from_digit((11 - sum % 11) % 11, 10).unwrap_or('X')
}

/// Check digit for twelve digits using the alternating weights 1 and 3.
fn isbn13_check(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip([1, 3].iter().cycle())
        .map(|(d, w)| d * w)
        .sum();
    (10 - sum % 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isbn10_weighted_sum(isbn10: &str) -> u32 {
        isbn10
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let value = if c == 'X' { 10 } else { c.to_digit(10).unwrap() };
                value * (10 - u32::try_from(i).unwrap())
            })
            .sum()
    }

    #[test]
    fn isbn13_with_978_prefix_converts_to_isbn10() {
        let isbn10 = to_isbn10("9784000000000").expect("978 prefix has an ISBN-10");

        assert_eq!(10, isbn10.len());
        assert_eq!("4000000004", isbn10);
    }

    #[test]
    fn isbn13_with_979_prefix_has_no_isbn10() {
        assert_eq!(None, to_isbn10("9790000000000"));
        assert_eq!(Err(ConversionError::NoIsbn10), try_to_isbn10("9791234567896"));
    }

    #[test]
    fn isbn13_with_unknown_prefix_is_rejected() {
        assert_eq!(Err(ConversionError::InvalidPrefix), try_to_isbn10("1234567890123"));
    }

    #[test]
    fn isbn13_of_wrong_length_is_rejected() {
        assert_eq!(None, to_isbn10("978400000000"));
        assert_eq!(
            Err(ConversionError::InvalidLength {
                expected: 13,
                found: 14
            }),
            try_to_isbn10("97840000000000")
        );
    }

    #[test]
    fn isbn13_with_non_digit_is_rejected() {
        assert_eq!(
            Err(ConversionError::InvalidCharacter {
                position: 5,
                found: 'a'
            }),
            try_to_isbn10("97840a0000000")
        );
    }

    #[test]
    fn isbn10_check_value_of_ten_is_rendered_as_x() {
        // Code Complete 2nd edition: 0-7356-1967-0, and an ISBN-10 ending in X
        assert_eq!(Some("0735619670".to_owned()), to_isbn10("9780735619678"));
        assert_eq!(Some("080442957X".to_owned()), to_isbn10("9780804429573"));
    }

    #[test]
    fn produced_isbn10_checksums_are_consistent() {
        let isbn13s = [
            "9784000000000",
            "9780735619678",
            "9780804429573",
            "9784101010014",
            "9784062748681",
            "9780306406157",
            "9781111111111",
        ];

        for isbn13 in isbn13s {
            let isbn10 = to_isbn10(isbn13).unwrap();
            assert_eq!(0, isbn10_weighted_sum(&isbn10) % 11, "{isbn13} -> {isbn10}");
            assert!(is_valid_isbn10(&isbn10), "{isbn10}");
        }
    }

    #[test]
    fn isbn10_converts_to_isbn13_with_978_prefix() {
        let isbn13 = to_isbn13("4000000000").expect("10 digits always convert");

        assert_eq!(13, isbn13.len());
        assert!(isbn13.starts_with("978"));
        assert!(isbn13.chars().all(|c| c.is_ascii_digit()));
        assert_eq!("9784000000000", isbn13);
    }

    #[test]
    fn isbn10_check_character_is_discarded() {
        assert_eq!(to_isbn13("0735619670"), to_isbn13("0735619679"));
        assert_eq!(Some("9780804429573".to_owned()), to_isbn13("080442957X"));
        assert_eq!(Some("9780804429573".to_owned()), to_isbn13("080442957x"));
    }

    #[test]
    fn isbn10_of_wrong_length_is_rejected() {
        assert_eq!(None, to_isbn13(""));
        assert_eq!(None, to_isbn13("12345678901"));
    }

    #[test]
    fn isbn10_with_x_before_last_position_is_rejected() {
        assert_eq!(
            Err(ConversionError::InvalidCharacter {
                position: 8,
                found: 'X'
            }),
            try_to_isbn13("12345678X0")
        );
    }

    #[test]
    fn round_trip_keeps_first_twelve_digits_and_recomputes_check() {
        // last digits are deliberately wrong, the round trip must correct them
        for isbn13 in ["9784000000005", "9780735619670", "9780306406150"] {
            let back = to_isbn13(&to_isbn10(isbn13).unwrap()).unwrap();

            assert_eq!(isbn13[..12], back[..12]);
            assert!(is_valid_isbn13(&back), "{back}");
        }
        assert_eq!(
            Some("9780306406157".to_owned()),
            to_isbn10("9780306406150").and_then(|isbn10| to_isbn13(&isbn10))
        );
    }

    #[test]
    fn validation_of_check_digits() {
        assert!(is_valid_isbn13("9780306406157"));
        assert!(is_valid_isbn13("9791234567896"));
        assert!(!is_valid_isbn13("9780306406158"));
        assert!(!is_valid_isbn13("1230306406157"));
        assert!(is_valid_isbn10("0306406152"));
        assert!(is_valid_isbn10("080442957x"));
        assert!(!is_valid_isbn10("0306406153"));
        assert!(!is_valid_isbn10("03064061X2"));
    }

    #[test]
    fn user_input_is_read_as_isbn13() {
        assert_eq!(Some("9780306406157".to_owned()), as_isbn13(" 0-306-40615-2 "));
        assert_eq!(Some("9791234567896".to_owned()), as_isbn13("979-1234567896"));
        assert_eq!(None, as_isbn13("not an isbn"));
    }
}

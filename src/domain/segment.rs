//! Message segmentation and cost estimation (pure, no I/O).
//!
//! Thresholds follow GSM 03.38: a GSM 7-bit message fits 160 septets in a single
//! segment and 153 per segment once a concatenation header is needed; UCS-2 fits
//! 70 and 67 characters respectively.

use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, Money};

/// Longest body the gateway accepts, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

const BODY_FIELD: &str = "message";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Character encoding the gateway will use on the wire.
pub enum Encoding {
    /// GSM 03.38 default alphabet (plus its extension table).
    Gsm7,
    /// UCS-2, used as soon as one character is outside the GSM alphabet.
    Ucs2,
}

impl Encoding {
    /// Units available when the message fits in one segment.
    pub fn single_segment_capacity(self) -> usize {
        match self {
            Self::Gsm7 => 160,
            Self::Ucs2 => 70,
        }
    }

    /// Units available per segment once the message is split.
    pub fn multipart_capacity(self) -> usize {
        match self {
            Self::Gsm7 => 153,
            Self::Ucs2 => 67,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Result of [`segment`].
pub struct Segmentation {
    pub encoding: Encoding,
    /// Effective length in encoding units (GSM extension characters count twice).
    pub units: usize,
    /// Number of wire segments; always at least 1.
    pub segment_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Result of [`estimate_cost`].
///
/// `total_cost` is exact; round only when presenting it.
pub struct CostEstimate {
    pub segment_count: u32,
    pub price_per_segment: Money,
    pub total_cost: Money,
}

impl CostEstimate {
    /// Total cost rounded half-up to two decimals, e.g. `"75.00"`.
    pub fn display_total(&self) -> String {
        self.total_cost.format_fixed(2)
    }
}

/// Classify `body` and count its segments using [`MAX_MESSAGE_LENGTH`].
pub fn segment(body: &str) -> Result<Segmentation, ValidationError> {
    segment_with_limit(body, MAX_MESSAGE_LENGTH)
}

/// Classify `body` and count its segments, rejecting bodies longer than `max_length` characters.
pub fn segment_with_limit(body: &str, max_length: usize) -> Result<Segmentation, ValidationError> {
    if body.is_empty() {
        return Err(ValidationError::Empty { field: BODY_FIELD });
    }
    let length = body.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            field: BODY_FIELD,
            max: max_length,
            actual: length,
        });
    }

    let (encoding, units) = match gsm7_units(body) {
        Some(units) => (Encoding::Gsm7, units),
        None => (Encoding::Ucs2, length),
    };

    let segments = if units <= encoding.single_segment_capacity() {
        1
    } else {
        units.div_ceil(encoding.multipart_capacity())
    };

    Ok(Segmentation {
        encoding,
        units,
        // Bounded by `max_length`, so the narrowing cannot truncate in practice.
        segment_count: u32::try_from(segments).unwrap_or(u32::MAX),
    })
}

/// Segment an already validated [`MessageText`].
pub fn segment_text(text: &MessageText, max_length: usize) -> Result<Segmentation, ValidationError> {
    segment_with_limit(text.as_str(), max_length)
}

/// Estimate the cost of sending `body` at `price_per_segment`, using [`MAX_MESSAGE_LENGTH`].
pub fn estimate_cost(body: &str, price_per_segment: Money) -> Result<CostEstimate, ValidationError> {
    estimate_cost_with_limit(body, price_per_segment, MAX_MESSAGE_LENGTH)
}

/// Estimate the cost of sending `body` at `price_per_segment`.
pub fn estimate_cost_with_limit(
    body: &str,
    price_per_segment: Money,
    max_length: usize,
) -> Result<CostEstimate, ValidationError> {
    if price_per_segment.is_negative() {
        return Err(ValidationError::NegativePrice {
            price: price_per_segment.to_string(),
        });
    }
    let segmentation = segment_with_limit(body, max_length)?;
    let total_cost = price_per_segment
        .checked_mul_count(segmentation.segment_count)
        .ok_or_else(|| ValidationError::InvalidMoney {
            input: price_per_segment.to_string(),
        })?;

    Ok(CostEstimate {
        segment_count: segmentation.segment_count,
        price_per_segment,
        total_cost,
    })
}

/// GSM 7-bit length of `body`, or `None` if any character needs UCS-2.
fn gsm7_units(body: &str) -> Option<usize> {
    body.chars().try_fold(0usize, |acc, ch| {
        if is_gsm7_basic(ch) {
            Some(acc + 1)
        } else if is_gsm7_extension(ch) {
            Some(acc + 2)
        } else {
            None
        }
    })
}

fn is_gsm7_basic(ch: char) -> bool {
    matches!(
        ch,
        '@' | '£' | '$' | '¥' | 'è' | 'é' | 'ù' | 'ì' | 'ò' | 'Ç' | '\n' | 'Ø' | 'ø' | '\r'
            | 'Å' | 'å' | 'Δ' | '_' | 'Φ' | 'Γ' | 'Λ' | 'Ω' | 'Π' | 'Ψ' | 'Σ' | 'Θ' | 'Ξ'
            | 'Æ' | 'æ' | 'ß' | 'É' | ' ' | '!' | '"' | '#' | '¤' | '%' | '&' | '\''
            | '(' | ')' | '*' | '+' | ',' | '-' | '.' | '/' | '0'..='9' | ':' | ';' | '<'
            | '=' | '>' | '?' | '¡' | 'A'..='Z' | 'Ä' | 'Ö' | 'Ñ' | 'Ü' | '§' | '¿'
            | 'a'..='z' | 'ä' | 'ö' | 'ñ' | 'ü' | 'à'
    )
}

/// Characters reached through the escape code; each costs two septets.
fn is_gsm7_extension(ch: char) -> bool {
    matches!(
        ch,
        '\u{000C}' | '^' | '{' | '}' | '\\' | '[' | '~' | ']' | '|' | '€'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ascii_is_one_gsm7_segment() {
        for len in [1, 42, 159, 160] {
            let body = "a".repeat(len);
            let result = segment(&body).unwrap();
            assert_eq!(result.encoding, Encoding::Gsm7);
            assert_eq!(result.segment_count, 1, "len {len}");
            assert_eq!(result.units, len);
        }
    }

    #[test]
    fn long_gsm7_uses_multipart_capacity() {
        assert_eq!(segment(&"a".repeat(161)).unwrap().segment_count, 2);
        assert_eq!(segment(&"a".repeat(306)).unwrap().segment_count, 2);
        assert_eq!(segment(&"a".repeat(307)).unwrap().segment_count, 3);
        // 320 / 160 would give 2; the multipart divisor gives 3.
        assert_eq!(segment(&"a".repeat(320)).unwrap().segment_count, 3);
    }

    #[test]
    fn extension_characters_count_twice() {
        let body = "€".repeat(80);
        let result = segment(&body).unwrap();
        assert_eq!(result.encoding, Encoding::Gsm7);
        assert_eq!(result.units, 160);
        assert_eq!(result.segment_count, 1);

        let body = format!("{}{{", "a".repeat(159));
        let result = segment(&body).unwrap();
        assert_eq!(result.units, 161);
        assert_eq!(result.segment_count, 2);
    }

    #[test]
    fn gsm_specials_stay_gsm7() {
        let result = segment("Ça fait £5 à Zürich? ¿Sì! Δ_Ω").unwrap();
        assert_eq!(result.encoding, Encoding::Gsm7);
        assert_eq!(result.units, 29);

        // 'û' and 'í' are not in the GSM alphabet.
        let result = segment("Ça coûte £5 à Zürich? ¿Sí!").unwrap();
        assert_eq!(result.encoding, Encoding::Ucs2);
    }

    #[test]
    fn non_gsm_character_switches_to_ucs2() {
        let result = segment("hello 👋").unwrap();
        assert_eq!(result.encoding, Encoding::Ucs2);
        assert_eq!(result.units, 7);
        assert_eq!(result.segment_count, 1);

        let body = format!("{}ы", "a".repeat(69));
        let result = segment(&body).unwrap();
        assert_eq!(result.encoding, Encoding::Ucs2);
        assert_eq!(result.segment_count, 1);

        let body = format!("{}ы", "a".repeat(70));
        assert_eq!(segment(&body).unwrap().segment_count, 2);

        let body = format!("{}ы", "a".repeat(134));
        assert_eq!(segment(&body).unwrap().segment_count, 3);
    }

    #[test]
    fn empty_body_is_rejected() {
        assert_eq!(
            segment("").unwrap_err(),
            ValidationError::Empty { field: "message" }
        );
    }

    #[test]
    fn oversized_body_is_rejected() {
        assert!(segment(&"a".repeat(MAX_MESSAGE_LENGTH)).is_ok());
        assert_eq!(
            segment(&"a".repeat(MAX_MESSAGE_LENGTH + 1)).unwrap_err(),
            ValidationError::TooLong {
                field: "message",
                max: MAX_MESSAGE_LENGTH,
                actual: MAX_MESSAGE_LENGTH + 1,
            }
        );
        assert!(segment_with_limit("abcdef", 5).is_err());
    }

    #[test]
    fn estimate_multiplies_segments_by_price() {
        let price: Money = "25.5".parse().unwrap();
        let estimate = estimate_cost(&"a".repeat(320), price).unwrap();
        assert_eq!(estimate.segment_count, 3);
        assert_eq!(estimate.price_per_segment, price);
        assert_eq!(estimate.total_cost, "76.5".parse().unwrap());
        assert_eq!(estimate.display_total(), "76.50");
    }

    #[test]
    fn estimate_matches_segmentation_for_many_bodies() {
        let price: Money = "0.015".parse().unwrap();
        for body in ["hi", "€uro", "日本語", &"x".repeat(500)] {
            let estimate = estimate_cost(body, price).unwrap();
            let segments = segment(body).unwrap().segment_count;
            assert_eq!(estimate.total_cost, price.checked_mul_count(segments).unwrap());
        }
    }

    #[test]
    fn estimate_rejects_negative_price_and_propagates_segmentation_errors() {
        let negative: Money = "-1".parse().unwrap();
        assert!(matches!(
            estimate_cost("hi", negative),
            Err(ValidationError::NegativePrice { .. })
        ));
        assert!(matches!(
            estimate_cost("", Money::from_integer(1)),
            Err(ValidationError::Empty { .. })
        ));
        assert_eq!(
            estimate_cost("hi", Money::ZERO).unwrap().total_cost,
            Money::ZERO
        );
    }
}

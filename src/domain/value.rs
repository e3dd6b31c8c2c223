use std::fmt;
use std::str::FromStr;

use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Clone, PartialEq, Eq, Hash)]
/// SignalBridge API token sent as a bearer credential.
///
/// Invariant: non-empty after trimming. The `Debug` output never contains the secret.
pub struct ApiToken(String);

impl ApiToken {
    /// Field name used in error reports (`token`).
    pub const FIELD: &'static str = "token";

    /// Create a validated [`ApiToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Message text (`message`).
///
/// Invariant: non-empty, the same rule segmentation applies. The value is kept as given,
/// whitespace included. The length limit is enforced by the client, which owns the configured maximum.
pub struct MessageText(String);

impl MessageText {
    /// JSON field name used by SignalBridge (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of Unicode scalar values in the text.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Gateway-assigned message id (`data.id`).
///
/// Invariant: non-empty after trimming.
pub struct MessageId(String);

impl MessageId {
    /// JSON field name used by SignalBridge (`id`).
    pub const FIELD: &'static str = "id";

    /// Create a validated [`MessageId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// ISO currency code used for balance lookups (`currency`).
///
/// Invariant: non-empty after trimming; stored upper-cased.
pub struct Currency(String);

impl Currency {
    /// Query parameter name used by SignalBridge (`currency`).
    pub const FIELD: &'static str = "currency";

    /// Create a validated [`Currency`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the currency code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    /// Uganda shilling, the gateway's home currency.
    fn default() -> Self {
        Self("UGX".to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unvalidated phone number as sent to SignalBridge (`recipient`).
///
/// Invariant: non-empty after trimming. This type does not normalize; if you want E.164
/// normalization, parse into [`PhoneNumber`] and convert it into [`RawPhoneNumber`].
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// JSON field name used by SignalBridge (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to SignalBridge.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert an already-parsed phone number to a normalized raw value (E.164).
    fn from(value: PhoneNumber) -> Self {
        Self(value.e164)
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// JSON field name used by SignalBridge (`recipient`).
    pub const FIELD: &'static str = "recipient";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Exact decimal amount (balances, prices, costs).
///
/// Stored as an integer mantissa and a decimal scale, normalized so that trailing
/// fractional zeros are dropped: `25.50` and `25.5` compare equal. Arithmetic never
/// rounds; use [`Money::round_dp`] or [`Money::format_fixed`] at display time.
pub struct Money {
    units: i128,
    scale: u32,
}

impl Money {
    /// Largest number of fractional digits accepted.
    pub const MAX_SCALE: u32 = 28;

    /// Zero.
    pub const ZERO: Self = Self { units: 0, scale: 0 };

    /// Whole-number amount.
    pub fn from_integer(value: i64) -> Self {
        Self {
            units: i128::from(value),
            scale: 0,
        }
    }

    /// Amount equal to `units * 10^-scale`, e.g. `Money::from_parts(2550, 2)` is `25.5`.
    pub fn from_parts(units: i64, scale: u32) -> Result<Self, ValidationError> {
        if scale > Self::MAX_SCALE {
            return Err(ValidationError::InvalidMoney {
                input: format!("{units}e-{scale}"),
            });
        }
        Ok(Self::normalized(i128::from(units), scale))
    }

    fn normalized(mut units: i128, mut scale: u32) -> Self {
        if units == 0 {
            return Self::ZERO;
        }
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        Self { units, scale }
    }

    /// Whether the amount is below zero.
    pub fn is_negative(self) -> bool {
        self.units < 0
    }

    /// Number of fractional digits after normalization.
    pub fn scale(self) -> u32 {
        self.scale
    }

    /// Exact product with an integer count; `None` on overflow.
    pub fn checked_mul_count(self, count: u32) -> Option<Self> {
        let units = self.units.checked_mul(i128::from(count))?;
        Some(Self::normalized(units, self.scale))
    }

    /// Exact sum; `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        let scale = self.scale.max(other.scale);
        let lhs = self.units.checked_mul(pow10(scale - self.scale)?)?;
        let rhs = other.units.checked_mul(pow10(scale - other.scale)?)?;
        Some(Self::normalized(lhs.checked_add(rhs)?, scale))
    }

    /// Round to `dp` fractional digits, halves away from zero.
    pub fn round_dp(self, dp: u32) -> Self {
        if self.scale <= dp {
            return self;
        }
        let Some(factor) = pow10(self.scale - dp) else {
            return Self::ZERO;
        };
        let mut quotient = self.units / factor;
        let remainder = self.units % factor;
        if remainder.abs() * 2 >= factor {
            quotient += self.units.signum();
        }
        Self::normalized(quotient, dp)
    }

    /// Render with exactly `dp` fractional digits after rounding, e.g. `"25.50"`.
    ///
    /// `dp` is capped at [`Money::MAX_SCALE`].
    pub fn format_fixed(self, dp: u32) -> String {
        let dp = dp.min(Self::MAX_SCALE);
        let rounded = self.round_dp(dp);
        let mut out = render(rounded.units, rounded.scale);
        let padding = (dp - rounded.scale) as usize;
        if padding > 0 {
            if rounded.scale == 0 {
                out.push('.');
            }
            out.extend(std::iter::repeat_n('0', padding));
        }
        out
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.units, self.scale))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    /// Parse a decimal literal: `500`, `-1.25`, `25.50`, `1.5e2`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidMoney {
            input: input.to_owned(),
        };
        let trimmed = input.trim();

        let (mantissa, exponent) = match trimmed.find(['e', 'E']) {
            Some(idx) => (
                &trimmed[..idx],
                trimmed[idx + 1..].parse::<i32>().map_err(|_| invalid())?,
            ),
            None => (trimmed, 0),
        };
        let (negative, digits) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let mut units: i128 = 0;
        for byte in int_part.bytes().chain(frac_part.bytes()) {
            if !byte.is_ascii_digit() {
                return Err(invalid());
            }
            units = units
                .checked_mul(10)
                .and_then(|acc| acc.checked_add(i128::from(byte - b'0')))
                .ok_or_else(invalid)?;
        }
        if units == 0 {
            return Ok(Self::ZERO);
        }

        let mut scale = i64::try_from(frac_part.len()).map_err(|_| invalid())? - i64::from(exponent);
        while scale < 0 {
            units = units.checked_mul(10).ok_or_else(invalid)?;
            scale += 1;
        }
        let scale = u32::try_from(scale).map_err(|_| invalid())?;

        let value = Self::normalized(if negative { -units } else { units }, scale);
        if value.scale > Self::MAX_SCALE {
            return Err(invalid());
        }
        Ok(value)
    }
}

fn pow10(exp: u32) -> Option<i128> {
    10_i128.checked_pow(exp)
}

fn render(units: i128, scale: u32) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let digits = units.unsigned_abs().to_string();
    if scale == 0 {
        return format!("{sign}{digits}");
    }
    let scale = scale as usize;
    let digits = format!("{digits:0>width$}", width = scale + 1);
    let (int_part, frac_part) = digits.split_at(digits.len() - scale);
    format!("{sign}{int_part}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_newtypes_trim_or_validate() {
        let token = ApiToken::new("  key ").unwrap();
        assert_eq!(token.as_str(), "key");
        assert_eq!(token.bearer(), "Bearer key");
        assert!(ApiToken::new("  ").is_err());

        let msg = MessageText::new(" hi ").unwrap();
        assert_eq!(msg.as_str(), " hi ");
        assert!(MessageText::new("").is_err());

        let id = MessageId::new(" 42 ").unwrap();
        assert_eq!(id.as_str(), "42");
        assert!(MessageId::new("").is_err());

        let currency = Currency::new(" kes ").unwrap();
        assert_eq!(currency.as_str(), "KES");
        assert_eq!(Currency::default().as_str(), "UGX");
        assert!(Currency::new(" ").is_err());
    }

    #[test]
    fn api_token_debug_is_redacted() {
        let token = ApiToken::new("super-secret").unwrap();
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn message_text_counts_scalar_values() {
        let msg = MessageText::new("héllo €").unwrap();
        assert_eq!(msg.char_count(), 7);
    }

    #[test]
    fn raw_phone_number_trims_and_exposes_raw() {
        let raw = RawPhoneNumber::new(" 256700000001 ").unwrap();
        assert_eq!(raw.raw(), "256700000001");
        assert!(RawPhoneNumber::new("").is_err());
    }

    #[test]
    fn phone_number_parsing_and_equality_use_e164() {
        let p1 = PhoneNumber::parse(None, "+256700123456").unwrap();
        let p2 = PhoneNumber::parse(Some(country::Id::UG), "0700 123456").unwrap();
        assert_eq!(p1, p2);
        assert_eq!(p1.e164(), "+256700123456");

        let raw: RawPhoneNumber = p2.into();
        assert_eq!(raw.raw(), "+256700123456");
        assert!(PhoneNumber::parse(None, "not-a-number").is_err());
    }

    #[test]
    fn money_parses_and_normalizes() {
        let a: Money = "25.50".parse().unwrap();
        let b: Money = "25.5".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "25.5");

        let whole: Money = "500".parse().unwrap();
        assert_eq!(whole, Money::from_integer(500));
        assert_eq!("500.00".parse::<Money>().unwrap(), whole);

        let exp: Money = "1.5e2".parse().unwrap();
        assert_eq!(exp, Money::from_integer(150));

        let neg: Money = "-0.05".parse().unwrap();
        assert!(neg.is_negative());
        assert_eq!(neg.to_string(), "-0.05");

        assert_eq!(".5".parse::<Money>().unwrap().to_string(), "0.5");
    }

    #[test]
    fn money_rejects_garbage() {
        for input in ["", "-", ".", "1.2.3", "abc", "1,5", "1e"] {
            assert!(
                matches!(
                    input.parse::<Money>(),
                    Err(ValidationError::InvalidMoney { .. })
                ),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn money_multiplication_is_exact() {
        let price: Money = "0.333".parse().unwrap();
        let total = price.checked_mul_count(3).unwrap();
        assert_eq!(total.to_string(), "0.999");

        let sum = price.checked_add(Money::from_integer(1)).unwrap();
        assert_eq!(sum.to_string(), "1.333");
    }

    #[test]
    fn money_rounds_half_up_only_on_request() {
        let value: Money = "2.345".parse().unwrap();
        assert_eq!(value.round_dp(2).to_string(), "2.35");
        assert_eq!(value.format_fixed(2), "2.35");

        let value: Money = "2.344".parse().unwrap();
        assert_eq!(value.format_fixed(2), "2.34");

        assert_eq!(Money::from_integer(25).format_fixed(2), "25.00");
        assert_eq!("0.5".parse::<Money>().unwrap().format_fixed(0), "1");
        assert_eq!("-2.345".parse::<Money>().unwrap().format_fixed(2), "-2.35");
    }

    #[test]
    fn whitespace_body_is_accepted_like_segmentation() {
        let msg = MessageText::new("  ").unwrap();
        assert_eq!(msg.char_count(), 2);
        let segmentation = crate::domain::segment(msg.as_str()).unwrap();
        assert_eq!(segmentation.segment_count, 1);
    }

    #[test]
    fn format_fixed_handles_extreme_values() {
        let huge: Money = "99999999999999999999999999999999999999".parse().unwrap();
        assert_eq!(
            huge.format_fixed(2),
            "99999999999999999999999999999999999999.00"
        );
        assert_eq!(
            "-1.5".parse::<Money>().unwrap().format_fixed(3),
            "-1.500"
        );

        let wide = "1.5".parse::<Money>().unwrap().format_fixed(40);
        assert_eq!(wide, format!("1.5{}", "0".repeat(27)));
        assert_eq!(Money::ZERO.format_fixed(2), "0.00");
    }

    #[test]
    fn zero_with_extreme_exponent_parses_quickly() {
        assert_eq!("0e999999999".parse::<Money>().unwrap(), Money::ZERO);
        assert_eq!("0e-2147483648".parse::<Money>().unwrap(), Money::ZERO);
        assert_eq!("-0.000".parse::<Money>().unwrap(), Money::ZERO);
        assert!(!"-0".parse::<Money>().unwrap().is_negative());
        assert!("1e999999999".parse::<Money>().is_err());
    }

    #[test]
    fn money_from_parts_respects_max_scale() {
        assert_eq!(Money::from_parts(2550, 2).unwrap().to_string(), "25.5");
        assert!(Money::from_parts(1, Money::MAX_SCALE + 1).is_err());
    }
}

use std::fmt;

/// Amounts are integer cents, so €12.50 is 1250.
pub type Cents = i64;

/// Format cents as a plain decimal string: 1250 -> "12.50", -5 -> "-0.05".
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Format cents with the euro sign, as shown to account holders.
pub fn format_euros(cents: Cents) -> String {
    format!("{}€", format_cents(cents))
}

/// Parse a user-entered amount into cents.
///
/// Accepts "50", "50.5", "50.50" and "50,50" (comma decimal separator).
/// Digits past the second decimal are truncated. Signs are rejected: callers
/// choose the direction of money, never the input.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim().replace(',', ".");
    if input.is_empty() {
        return Err(ParseCentsError::Empty);
    }

    let (units, decimals) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input.as_str(), ""),
    };

    if units.is_empty() && decimals.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }
    if !units.chars().all(|c| c.is_ascii_digit()) || !decimals.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat);
    }

    let units: i64 = if units.is_empty() {
        0
    } else {
        units.parse().map_err(|_| ParseCentsError::Overflow)?
    };

    let fraction: i64 = match decimals.len() {
        0 => 0,
        1 => decimals.parse::<i64>().map_err(|_| ParseCentsError::InvalidFormat)? * 10,
        _ => decimals[..2]
            .parse()
            .map_err(|_| ParseCentsError::InvalidFormat)?,
    };

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction))
        .ok_or(ParseCentsError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    Empty,
    InvalidFormat,
    Overflow,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::Empty => write!(f, "amount is empty"),
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(200000), "2000.00");
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-50), "-0.50");
    }

    #[test]
    fn test_format_euros() {
        assert_eq!(format_euros(100050), "1000.50€");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("50.5"), Ok(5050));
        assert_eq!(parse_cents("50,25"), Ok(5025));
        assert_eq!(parse_cents(".5"), Ok(50));
        assert_eq!(parse_cents("0.999"), Ok(99));
        assert_eq!(parse_cents(" 12 "), Ok(1200));
    }

    #[test]
    fn test_parse_cents_rejects_garbage() {
        assert_eq!(parse_cents(""), Err(ParseCentsError::Empty));
        assert_eq!(parse_cents("."), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("-5"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("1.2.3"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(parse_cents("abc"), Err(ParseCentsError::InvalidFormat));
        assert_eq!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::Overflow)
        );
    }
}

//! Memory address type.

use std::fmt;
use std::ops::Add;

use thiserror::Error;

/// Strongly typed address of a live object or field slot
///
/// This wrapper around `u64` keeps addresses apart from sizes and counts,
/// which the registries hand out side by side.
///
/// ## Example
///
/// ```rust
/// use uld_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let payload = addr + 8;
/// assert_eq!(payload.value(), 0x1008);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Reference array slots hold this value when they point nowhere.
    pub const NULL: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Parse an address typed by the operator
    ///
    /// The token is read as base 16. A leading `0x` or `0X` is accepted. The
    /// whole token has to be consumed: `12zz` is rejected rather than read as
    /// `0x12`.
    ///
    /// ```rust
    /// use uld_core::types::Address;
    ///
    /// assert_eq!(Address::parse_hex("1000").unwrap(), Address::from(0x1000));
    /// assert_eq!(Address::parse_hex("0xDEAD").unwrap(), Address::from(0xdead));
    /// assert!(Address::parse_hex("beef!").is_err());
    /// ```
    pub fn parse_hex(token: &str) -> Result<Self, AddressParseError>
    {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressParseError::InvalidDigit(bad));
        }

        u64::from_str_radix(digits, 16)
            .map(Address)
            .map_err(|_| AddressParseError::Overflow(token.to_string()))
    }
}

/// Reasons an operator-supplied address token is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError
{
    /// Nothing left once the prefix was removed
    #[error("empty address")]
    Empty,

    /// A character outside `[0-9a-fA-F]`
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),

    /// More than 64 bits of digits
    #[error("address '{0}' does not fit in 64 bits")]
    Overflow(String),
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed()
    {
        assert_eq!(Address::parse_hex("1000"), Ok(Address::new(0x1000)));
        assert_eq!(Address::parse_hex("0x1000"), Ok(Address::new(0x1000)));
        assert_eq!(Address::parse_hex("0XfF"), Ok(Address::new(0xff)));
        assert_eq!(Address::parse_hex("ffffffffffffffff"), Ok(Address::new(u64::MAX)));
    }

    #[test]
    fn test_parse_rejects_garbage()
    {
        assert_eq!(Address::parse_hex(""), Err(AddressParseError::Empty));
        assert_eq!(Address::parse_hex("0x"), Err(AddressParseError::Empty));
        assert_eq!(Address::parse_hex("12zz"), Err(AddressParseError::InvalidDigit('z')));
        assert_eq!(Address::parse_hex("-1"), Err(AddressParseError::InvalidDigit('-')));
        assert!(matches!(
            Address::parse_hex("10000000000000000"),
            Err(AddressParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_display_is_padded_hex()
    {
        assert_eq!(Address::new(0x1000).to_string(), "0x0000000000001000");
        assert_eq!(format!("{:x}", Address::new(0xbeef)), "beef");
    }
}

//! Tests for error handling

use uld_core::command::CommandError;
use uld_core::error::{UldError, UldResult};
use uld_core::types::{Address, AddressParseError};

#[test]
fn test_not_an_object_display()
{
    let error = UldError::NotAnObject(Address::new(0x1000));
    let message = format!("{}", error);
    assert!(message.contains("0x0000000000001000"));
    assert!(message.contains("not an allocated object"));
}

#[test]
fn test_truncated_display()
{
    let error = UldError::Truncated {
        address: Address::new(0x2000),
        needed: 112,
        available: 16,
    };
    let message = format!("{}", error);
    assert!(message.contains("112"));
    assert!(message.contains("16"));
}

#[test]
fn test_negative_length_display()
{
    let error = UldError::NegativeLength {
        address: Address::new(0x2000),
        value: -7,
    };
    assert!(error.to_string().contains("-7"));
}

#[test]
fn test_io_error_conversion()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "console gone");
    let error: UldError = io_err.into();

    match error {
        UldError::Io(_) => {
            // Expected: io::Error converts to the Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_invalid_address_keeps_reason()
{
    let error = CommandError::InvalidAddress {
        token: "12zz".to_string(),
        reason: AddressParseError::InvalidDigit('z'),
    };
    assert_eq!(error.to_string(), "Invalid object pointer!");

    let source = std::error::Error::source(&error).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("invalid hex digit 'z'"));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: UldResult<()> = Ok(());
    let _error_result: UldResult<()> = Err(UldError::UnknownType(Address::new(0x10)));
}

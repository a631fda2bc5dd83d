use thiserror::Error;

/// Error type shared by the softquad crates.
///
/// The kind is boxed to keep `Result<T>` the size of a pointer on the
/// success path.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_base(base: u32) -> Error {
        Error(ErrorKind::InvalidBase { base }.into())
    }

    pub fn invalid_digit(character: char, base: u32) -> Error {
        Error(
            ErrorKind::InvalidDigit {
                message: format!("character '{character}' is not a digit in base {base}"),
            }
            .into(),
        )
    }

    pub fn empty_digits() -> Error {
        Error(
            ErrorKind::InvalidDigit {
                message: "no digits in input".to_string(),
            }
            .into(),
        )
    }

    pub fn division_by_zero() -> Error {
        Error(ErrorKind::DivisionByZero.into())
    }

    pub fn overflow(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Overflow {
                message: message.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("base {base} is outside the supported range 2..=36")]
    InvalidBase { base: u32 },

    #[error("invalid digit: {message}")]
    InvalidDigit { message: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("overflow: {message}")]
    Overflow { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::invalid_base(37).to_string(),
            "base 37 is outside the supported range 2..=36"
        );
        assert_eq!(Error::division_by_zero().to_string(), "division by zero");
        assert!(
            Error::invalid_digit('z', 10)
                .to_string()
                .contains("base 10")
        );
    }

    #[test]
    fn test_kind_accessors() {
        let err = Error::overflow("Int128::MIN / -1");
        assert!(matches!(err.kind(), ErrorKind::Overflow { .. }));
        match err.into_kind() {
            ErrorKind::Overflow { message } => assert_eq!(message, "Int128::MIN / -1"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}

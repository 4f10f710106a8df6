//! Result and error types for invariant violations.

/// The result type for operations that can only fail on an internal bug.
///
/// User mistakes in HDL sources never produce an `Err`: they are reported
/// through the diagnostic sink and the operation carries on. An `Err` means
/// the engine broke one of its own invariants.
pub type GatesimResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in gatesim, not a problem in the user's HDL.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("part index out of range");
        assert_eq!(format!("{err}"), "internal error: part index out of range");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "unlinked chip in netlist".to_string().into();
        assert_eq!(err.message, "unlinked chip in netlist");
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> GatesimResult<u32> {
            Err(InternalError::new("boom"))
        }
        fn outer() -> GatesimResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert_eq!(outer().unwrap_err().message, "boom");
    }
}

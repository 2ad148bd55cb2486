//! Status code lookup.

use std::io::Write;

use clu_core::error_string;

use crate::error::CliError;
use crate::output::{ErrorDescription, OutputFormat};

/// Error code command executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorCodeCommand;

impl ErrorCodeCommand {
    /// Execute the error command.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat, code: i32) -> Result<(), CliError> {
        let description = ErrorDescription {
            code,
            description: error_string(code),
        };
        format.write(writer, &description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(code: i32) -> String {
        let mut buf = Vec::new();
        ErrorCodeCommand
            .execute(&mut buf, &OutputFormat::default(), code)
            .expect("should execute");
        String::from_utf8(buf).expect("valid utf8")
    }

    #[test]
    fn known_code() {
        assert_eq!(describe(-30), "-30: invalid value\n");
    }

    #[test]
    fn unknown_code() {
        assert_eq!(describe(7), "7: unknown error\n");
    }
}

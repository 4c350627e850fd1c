use std::fmt;

use crate::parse::{ReportError, ReportErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArgs,
    InputMissing,
    ParseFailed,
    ValidationFailed,
    StoreFailed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArgs => 2,
            ExitCode::InputMissing => 3,
            ExitCode::ParseFailed => 4,
            ExitCode::ValidationFailed => 5,
            ExitCode::StoreFailed => 10,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    if let Some(report) = err.downcast_ref::<ReportError>() {
        return match report.kind() {
            ReportErrorKind::Parse => ExitCode::ParseFailed.as_i32(),
            ReportErrorKind::Validation => ExitCode::ValidationFailed.as_i32(),
        };
    }
    ExitCode::StoreFailed.as_i32()
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn input_missing(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InputMissing, anyhow::anyhow!(message.into())).into()
}

pub fn input_missing_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InputMissing, err).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_errors_map_to_parse_and_validation_codes() {
        let parse: anyhow::Error = ReportError::NoJson.into();
        assert_eq!(exit_code(&parse), 4);
        let validation: anyhow::Error = ReportError::MissingField("system").into();
        assert_eq!(exit_code(&validation), 5);
    }

    #[test]
    fn wrapped_and_plain_errors() {
        assert_eq!(exit_code(&input_missing("GITHUB_EVENT_PATH not set")), 3);
        assert_eq!(exit_code(&invalid_args_err(anyhow::anyhow!("bad"))), 2);
        assert_eq!(exit_code(&anyhow::anyhow!("disk full")), 10);
    }
}

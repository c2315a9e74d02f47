// error.rs - Idiomatic error type.
//
// Groups the numeric ONIGERR_* codes into semantic variants while keeping
// the original code recoverable through `code()`.

use thiserror::Error;

use crate::oniguruma::*;
use crate::regerror::{onig_error_code_to_format, onig_error_code_to_str};

/// Which operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Pattern compilation failed; no handle was produced.
    Compile,
    /// A match or search failed (distinct from "no match").
    Match,
    /// A capture region could not be resized.
    Region,
}

/// Error type for regex compilation and matching operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexError {
    /// Syntax error in the pattern.
    #[error("syntax error: {message}")]
    Syntax {
        code: i32,
        message: String,
        /// Pattern byte offset where parsing stopped.
        offset: Option<usize>,
    },
    /// Construct recognised but not supported by this engine.
    #[error("unsupported construct: {message}")]
    Unsupported { code: i32, message: String },
    #[error("parse depth limit over")]
    ParseDepthLimitOver,
    /// DONT_CAPTURE_GROUP together with CAPTURE_GROUP.
    #[error("invalid combination of options")]
    InvalidOptions,
    /// Pattern bytes, or a code point escaped in the pattern, invalid
    /// for the encoding.
    #[error("pattern encoding error: {message}")]
    PatternEncoding { code: i32, message: String },
    /// Subject bytes invalid for the encoding.
    #[error("encoding error: {message}")]
    Encoding { code: i32, message: String },
    #[error("invalid argument")]
    InvalidArgument,
    #[error("match-stack limit over")]
    MatchStackLimitOver,
    #[error("retry-limit-in-match over")]
    RetryLimitInMatchOver,
    #[error("retry-limit-in-search over")]
    RetryLimitInSearchOver,
    #[error("memory allocation failed")]
    Memory,
    /// Internal engine bug (should not occur in correct usage).
    #[error("internal error: {message}")]
    InternalBug { code: i32, message: String },
    #[error("error code {0}")]
    Other(i32),
}

impl From<i32> for RegexError {
    fn from(code: i32) -> Self {
        let message = || onig_error_code_to_format(code).to_string();
        match code {
            ONIGERR_MEMORY => RegexError::Memory,
            ONIGERR_MATCH_STACK_LIMIT_OVER => RegexError::MatchStackLimitOver,
            ONIGERR_RETRY_LIMIT_IN_MATCH_OVER => RegexError::RetryLimitInMatchOver,
            ONIGERR_RETRY_LIMIT_IN_SEARCH_OVER => RegexError::RetryLimitInSearchOver,
            ONIGERR_PARSE_DEPTH_LIMIT_OVER => RegexError::ParseDepthLimitOver,
            ONIGERR_INVALID_ARGUMENT => RegexError::InvalidArgument,
            ONIGERR_INVALID_COMBINATION_OF_OPTIONS => RegexError::InvalidOptions,
            ONIG_NO_SUPPORT_CONFIG => RegexError::Unsupported {
                code,
                message: message(),
            },

            ONIGERR_TYPE_BUG
            | ONIGERR_PARSER_BUG
            | ONIGERR_STACK_BUG
            | ONIGERR_UNDEFINED_BYTECODE
            | ONIGERR_UNEXPECTED_BYTECODE => RegexError::InternalBug {
                code,
                message: message(),
            },

            ONIGERR_DEFAULT_ENCODING_IS_NOT_SET
            | ONIGERR_SPECIFIED_ENCODING_CANT_CONVERT_TO_WIDE_CHAR
            | ONIGERR_INVALID_CODE_POINT_VALUE
            | ONIGERR_TOO_BIG_WIDE_CHAR_VALUE
            | ONIGERR_NOT_SUPPORTED_ENCODING_COMBINATION => RegexError::Encoding {
                code,
                message: message(),
            },

            c if onig_is_pattern_error(c) => RegexError::Syntax {
                code: c,
                message: message(),
                offset: None,
            },

            _ => RegexError::Other(code),
        }
    }
}

impl RegexError {
    /// Compile-time error with the name/offset context filled in.
    pub fn from_code_with_info(code: i32, einfo: &OnigErrorInfo) -> Self {
        match RegexError::from(code) {
            RegexError::Syntax { code, .. } => RegexError::Syntax {
                code,
                message: onig_error_code_to_str(code, Some(einfo)),
                offset: einfo.offset,
            },
            RegexError::Encoding { code, message } => RegexError::PatternEncoding { code, message },
            other => other,
        }
    }

    /// The numeric ONIGERR_* code.
    pub fn code(&self) -> i32 {
        match self {
            RegexError::Syntax { code, .. }
            | RegexError::Unsupported { code, .. }
            | RegexError::PatternEncoding { code, .. }
            | RegexError::Encoding { code, .. }
            | RegexError::InternalBug { code, .. } => *code,
            RegexError::ParseDepthLimitOver => ONIGERR_PARSE_DEPTH_LIMIT_OVER,
            RegexError::InvalidOptions => ONIGERR_INVALID_COMBINATION_OF_OPTIONS,
            RegexError::InvalidArgument => ONIGERR_INVALID_ARGUMENT,
            RegexError::MatchStackLimitOver => ONIGERR_MATCH_STACK_LIMIT_OVER,
            RegexError::RetryLimitInMatchOver => ONIGERR_RETRY_LIMIT_IN_MATCH_OVER,
            RegexError::RetryLimitInSearchOver => ONIGERR_RETRY_LIMIT_IN_SEARCH_OVER,
            RegexError::Memory => ONIGERR_MEMORY,
            RegexError::Other(code) => *code,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RegexError::Syntax { .. }
            | RegexError::Unsupported { .. }
            | RegexError::ParseDepthLimitOver
            | RegexError::InvalidOptions
            | RegexError::PatternEncoding { .. }
            | RegexError::InternalBug { .. }
            | RegexError::Other(_) => ErrorClass::Compile,
            RegexError::MatchStackLimitOver
            | RegexError::RetryLimitInMatchOver
            | RegexError::RetryLimitInSearchOver
            | RegexError::InvalidArgument
            | RegexError::Encoding { .. } => ErrorClass::Match,
            RegexError::Memory => ErrorClass::Region,
        }
    }

    /// The bounded human-readable description.
    pub fn description(&self) -> String {
        match self {
            RegexError::Syntax { message, .. } => message.clone(),
            other => onig_error_code_to_str(other.code(), None),
        }
    }
}

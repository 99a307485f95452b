//! Error taxonomy for the problem adapter.
//!
//! Every failure belongs to exactly one [`ErrorCategory`]:
//!
//! | Category      | Raised when                                         | Recoverable |
//! |---------------|-----------------------------------------------------|-------------|
//! | Configuration | bad dimensions, size callback failure, size drift   | no          |
//! | Evaluation    | a callback reported failure at the given point      | yes         |
//! | Unsupported   | Hessian requested but no Hessian callback exists    | engine falls back |
//! | Usage         | wrong buffer length, accessor before finalize, ...  | no          |
//!
//! The adapter never retries and never substitutes defaults. The optimizer
//! decides what an evaluation failure means for the current step.
//!
//! A configuration error disables the adapter: the first one is kept and
//! returned by every later query.

use crate::types::IndexStyle;
use std::fmt;
use thiserror::Error;

/// The user callback that reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    Sizes,
    Init,
    Bounds,
    Scaling,
    EvalF,
    EvalGradF,
    EvalG,
    EvalJacG,
    EvalH,
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallbackKind::Sizes => "sizes",
            CallbackKind::Init => "init",
            CallbackKind::Bounds => "bounds",
            CallbackKind::Scaling => "scaling",
            CallbackKind::EvalF => "eval_f",
            CallbackKind::EvalGradF => "eval_grad_f",
            CallbackKind::EvalG => "eval_g",
            CallbackKind::EvalJacG => "eval_jac_g",
            CallbackKind::EvalH => "eval_h",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an [`AdapterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The problem definition itself is unusable. Fatal to the adapter.
    Configuration,
    /// A callback failed for the current point. The engine may retry elsewhere.
    Evaluation,
    /// The problem does not provide the requested capability.
    Unsupported,
    /// The caller broke the call protocol.
    Usage,
}

/// Errors raised by the problem adapter.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The size callback reported negative dimensions.
    #[error("Invalid problem dimensions: n={n}, m={m}, nnz_jac_g={nnz_jac_g}, nnz_h_lag={nnz_h_lag}")]
    InvalidDimensions {
        n: i64,
        m: i64,
        nnz_jac_g: i64,
        nnz_h_lag: i64,
    },

    /// Index style was neither zero- nor one-based.
    #[error("Unrecognized index style {0} (expected 0 or 1)")]
    UnknownIndexStyle(i64),

    /// A dimension exceeds the configured ceiling.
    #[error("Problem dimension {name}={size} exceeds the configured maximum of {max}")]
    ProblemTooLarge {
        name: &'static str,
        size: usize,
        max: usize,
    },

    /// The size callback reported different dimensions on a later solve.
    #[error("Problem dimensions changed after construction: was {previous}, now {current}")]
    DescriptorChanged { previous: String, current: String },

    /// Pre-allocated solution dimensions disagree with the problem.
    #[error("Solution storage sized for n={requested_n}, m={requested_m} but the problem has n={n}, m={m}")]
    DimensionMismatch {
        requested_n: usize,
        requested_m: usize,
        n: usize,
        m: usize,
    },

    /// A sparse structure coordinate does not fit the index type once shifted.
    #[error("{matrix} coordinate {value} overflows when shifted to {index_style}")]
    CoordinateOverflow {
        matrix: &'static str,
        value: i64,
        index_style: IndexStyle,
    },

    /// A user callback reported failure.
    #[error("Callback {callback} reported failure")]
    CallbackFailed { callback: CallbackKind },

    /// Hessian values were requested but no Hessian callback was registered.
    #[error("No Hessian callback registered; use a Hessian approximation")]
    HessianUnavailable,

    /// A buffer handed to the adapter has the wrong length.
    #[error("Buffer {buffer} has length {actual}, expected {expected}")]
    BufferLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An evaluation query arrived before the dimensions were established.
    #[error("Problem dimensions not established; get_nlp_info must be called first")]
    NotInitialized,

    /// A solution accessor was called before finalize.
    #[error("No solution available; finalize_solution has not run")]
    SolutionUnavailable,

    /// Finalize was called twice for the same solve.
    #[error("Solution already finalized for this solve")]
    AlreadyFinalized,

    /// User data can only be replaced before any callback has run.
    #[error("User data cannot be replaced after callbacks have started")]
    UserDataLocked,
}

impl AdapterError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdapterError::InvalidDimensions { .. }
            | AdapterError::UnknownIndexStyle(_)
            | AdapterError::ProblemTooLarge { .. }
            | AdapterError::DescriptorChanged { .. }
            | AdapterError::DimensionMismatch { .. }
            | AdapterError::CoordinateOverflow { .. }
            | AdapterError::CallbackFailed {
                callback: CallbackKind::Sizes,
            } => ErrorCategory::Configuration,
            AdapterError::CallbackFailed { .. } => ErrorCategory::Evaluation,
            AdapterError::HessianUnavailable => ErrorCategory::Unsupported,
            AdapterError::BufferLength { .. }
            | AdapterError::NotInitialized
            | AdapterError::SolutionUnavailable
            | AdapterError::AlreadyFinalized
            | AdapterError::UserDataLocked => ErrorCategory::Usage,
        }
    }

    /// Check if the engine may continue after this error (e.g. by backtracking).
    pub fn is_recoverable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Evaluation)
    }

    /// Check if this error signals a missing optional capability.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.category(), ErrorCategory::Unsupported)
    }
}

/// Result type alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let eval = AdapterError::CallbackFailed {
            callback: CallbackKind::EvalF,
        };
        assert_eq!(eval.category(), ErrorCategory::Evaluation);
        assert!(eval.is_recoverable());

        assert!(AdapterError::HessianUnavailable.is_unsupported());
        assert!(!AdapterError::HessianUnavailable.is_recoverable());

        assert_eq!(
            AdapterError::UnknownIndexStyle(7).category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AdapterError::SolutionUnavailable.category(),
            ErrorCategory::Usage
        );
    }

    #[test]
    fn test_size_callback_failure_is_fatal() {
        let err = AdapterError::CallbackFailed {
            callback: CallbackKind::Sizes,
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_recoverable());

        let err = AdapterError::CoordinateOverflow {
            matrix: "jac_g",
            value: i64::from(i32::MAX),
            index_style: IndexStyle::One,
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(
            err.to_string(),
            "jac_g coordinate 2147483647 overflows when shifted to one-based"
        );
    }

    #[test]
    fn test_messages_name_the_culprit() {
        let err = AdapterError::CallbackFailed {
            callback: CallbackKind::EvalJacG,
        };
        assert_eq!(err.to_string(), "Callback eval_jac_g reported failure");

        let err = AdapterError::BufferLength {
            buffer: "x",
            expected: 2,
            actual: 3,
        };
        assert!(err.to_string().contains("expected 2"));
    }
}

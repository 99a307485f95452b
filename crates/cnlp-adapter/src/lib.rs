//! Drive a callback-defined nonlinear program through an optimizer's problem interface.
//!
//! An interior-point optimizer asks its problem a long, tightly ordered series
//! of questions: dimensions, bounds, starting point, sparse structure, values,
//! per-iteration reports, and finally the solution. [`ProblemAdapter`] answers
//! all of them by forwarding to a [`CallbackSet`] of plain functions and
//! translating buffer conventions on the way.
//!
//! ```text
//! optimizer ──NlpInterface──> ProblemAdapter ──CallbackSet──> problem owner
//!           <──buffers──────                 <──bool + data──
//!                               │
//!                               └─ SolutionRecord (owned copy, read after the solve)
//! ```
//!
//! # Guarantees
//!
//! - Buffer lengths are checked against the problem dimensions on every call.
//! - Sparse callbacks write zero-based coordinates; the adapter shifts them to
//!   the configured [`IndexStyle`] so structure and values always pair up.
//! - A callback returning `false` becomes a recoverable
//!   [`AdapterError::CallbackFailed`]; the adapter never retries or substitutes.
//! - A missing Hessian callback is reported as [`AdapterError::HessianUnavailable`],
//!   never as a zero matrix.
//! - The final point is copied, never aliased, and is only readable after
//!   finalization.
//!
//! # Usage
//!
//! ```ignore
//! use cnlp_adapter::{AdapterConfig, CallbackSet, NlpSizes, ProblemAdapter, SparseRequest};
//!
//! let callbacks = CallbackSet::new(
//!     |_, sizes| { *sizes = NlpSizes { n: 2, m: 1, nnz_jac_g: 2, nnz_h_lag: 2 }; true },
//!     |_, _, point| { point.x.fill(1.0); true },
//!     |_, b| { b.x_l.fill(0.0); b.x_u.fill(2e19); b.g_l.fill(0.0); b.g_u.fill(0.0); true },
//!     |_, x, _, obj| { *obj = x[0] * x[0] + x[1] * x[1]; true },
//!     |_, x, _, grad| { grad[0] = 2.0 * x[0]; grad[1] = 2.0 * x[1]; true },
//!     |_, x, _, g| { g[0] = x[0] + x[1] - 2.0; true },
//!     |_, _, _, _, request| match request {
//!         SparseRequest::Structure { rows, cols } => {
//!             rows.copy_from_slice(&[0, 0]);
//!             cols.copy_from_slice(&[0, 1]);
//!             true
//!         }
//!         SparseRequest::Values(values) => { values.fill(1.0); true }
//!     },
//! );
//!
//! let mut adapter = ProblemAdapter::new(AdapterConfig::default(), callbacks, ());
//! // hand `&mut adapter` to an optimizer as `&mut dyn NlpInterface`, then:
//! let solution = adapter.solution()?;
//! ```

pub mod adapter;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod ffi;
pub mod interface;
pub mod solution;
pub mod types;

pub use adapter::ProblemAdapter;
pub use callbacks::CallbackSet;
pub use config::{AdapterConfig, DEFAULT_MAX_PROBLEM_SIZE};
pub use error::{AdapterError, AdapterResult, CallbackKind, ErrorCategory};
pub use ffi::RawCallbacks;
pub use interface::NlpInterface;
pub use solution::{SolutionRecord, SolveStatus};
pub use types::{
    BoundBuffers, FinalPoint, Index, IndexStyle, InitFlags, IterationStats, LagrangeWeights,
    NlpSizes, Number, ProblemDescriptor, Scaling, ScalingParams, SparseRequest, StartingPoint,
};

pub use cnlp_sys::AlgorithmMode;

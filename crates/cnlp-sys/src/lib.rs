//! Raw C protocol types for the cnlp problem adapter.
//!
//! A problem owner that cannot (or does not want to) implement a Rust trait
//! describes its nonlinear program as a bundle of C function pointers plus one
//! opaque user-data pointer. This crate holds only the shapes of that protocol:
//! scalar aliases, callback typedefs and the raw enums that cross the boundary.
//! The safe translation layer lives in `cnlp-adapter`.
//!
//! # Sparse callbacks
//!
//! `Eval_Jac_G_CB` and `Eval_H_CB` are called in two phases:
//!
//! 1. `values == NULL`: fill `iRow`/`jCol` with the nonzero coordinates
//! 2. `values != NULL`: fill `values` in the same order as the coordinates
//!
//! Coordinates are always written zero-based. The adapter shifts them to the
//! index style declared at construction before the optimizer sees them.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::os::raw::{c_int, c_void};

// ============================================================================
// TYPES
// ============================================================================

/// Floating-point number type.
pub type Number = f64;

/// Index type for vectors and sparse coordinates.
pub type Index = i32;

/// C boolean: zero is false, anything else is true.
pub type Bool = c_int;

/// User data pointer passed unmodified to every callback.
pub type UserDataPtr = *mut c_void;

/// Sparse coordinates reported to the optimizer start at 0.
pub const FIRST_INDEX_ZERO: Index = 0;

/// Sparse coordinates reported to the optimizer start at 1.
pub const FIRST_INDEX_ONE: Index = 1;

/// Algorithm phase reported to the intermediate callback.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmMode {
    RegularMode = 0,
    RestorationPhaseMode = 1,
}

/// Termination status handed to the problem at finalization.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverReturn {
    Success = 0,
    MaxiterExceeded = 1,
    CputimeExceeded = 2,
    StopAtTinyStep = 3,
    StopAtAcceptablePoint = 4,
    LocalInfeasibility = 5,
    UserRequestedStop = 6,
    FeasiblePointFound = 7,
    DivergingIterates = 8,
    RestorationFailure = 9,
    ErrorInStepComputation = 10,
    InvalidNumberDetected = 11,
    TooFewDegreesOfFreedom = 12,
    InvalidOption = 13,
    OutOfMemory = 14,
    InternalError = 15,
    Unassigned = 16,
}

impl SolverReturn {
    /// Returns true if the optimizer stopped at an optimal or acceptable point.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SolverReturn::Success | SolverReturn::StopAtAcceptablePoint
        )
    }
}

// ============================================================================
// CALLBACK FUNCTION TYPES
// ============================================================================

/// Callback reporting problem dimensions.
///
/// # Arguments
/// * `n` - Output: number of variables
/// * `m` - Output: number of constraints
/// * `nnz_jac_g` - Output: nonzeros in the constraint Jacobian
/// * `nnz_h_lag` - Output: nonzeros in the lower triangle of the Lagrangian Hessian
/// * `user_data` - User data pointer
pub type Sizes_CB = unsafe extern "C" fn(
    n: *mut Index,
    m: *mut Index,
    nnz_jac_g: *mut Index,
    nnz_h_lag: *mut Index,
    user_data: UserDataPtr,
) -> Bool;

/// Callback providing the starting point.
///
/// Only the buffers whose `init_*` flag is true need to be written.
pub type Init_CB = unsafe extern "C" fn(
    n: Index,
    init_x: Bool,
    x: *mut Number,
    init_z: Bool,
    z_L: *mut Number,
    z_U: *mut Number,
    m: Index,
    init_lambda: Bool,
    lambda: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback providing variable and constraint bounds.
///
/// Unbounded sides are written as the optimizer's infinity sentinel
/// (conventionally `±1e19` or larger).
pub type Bounds_CB = unsafe extern "C" fn(
    n: Index,
    x_l: *mut Number,
    x_u: *mut Number,
    m: Index,
    g_l: *mut Number,
    g_u: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for evaluating the objective f(x).
///
/// # Arguments
/// * `n` - Number of variables
/// * `x` - Variable values (length n)
/// * `new_x` - True if x changed since last call
/// * `obj_value` - Output: objective value f(x)
/// * `user_data` - User data pointer
pub type Eval_F_CB = unsafe extern "C" fn(
    n: Index,
    x: *const Number,
    new_x: Bool,
    obj_value: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for evaluating the objective gradient ∇f(x) (length n).
pub type Eval_Grad_F_CB = unsafe extern "C" fn(
    n: Index,
    x: *const Number,
    new_x: Bool,
    grad_f: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for evaluating the constraints g(x) (length m).
pub type Eval_G_CB = unsafe extern "C" fn(
    n: Index,
    x: *const Number,
    new_x: Bool,
    m: Index,
    g: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for the constraint Jacobian.
///
/// `x` may be NULL during the structure phase.
///
/// # Arguments
/// * `nele_jac` - Number of nonzeros in the Jacobian
/// * `iRow` - Row indices (length nele_jac), written in the structure phase
/// * `jCol` - Column indices (length nele_jac), written in the structure phase
/// * `values` - Nonzero values (length nele_jac), or NULL for the structure phase
pub type Eval_Jac_G_CB = unsafe extern "C" fn(
    n: Index,
    x: *const Number,
    new_x: Bool,
    m: Index,
    nele_jac: Index,
    iRow: *mut Index,
    jCol: *mut Index,
    values: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for the Hessian of the Lagrangian.
///
/// Computes: σ ∇²f(x) + Σᵢ λᵢ ∇²gᵢ(x), lower triangle only.
/// `x` and `lambda` may be NULL during the structure phase.
pub type Eval_H_CB = unsafe extern "C" fn(
    n: Index,
    x: *const Number,
    new_x: Bool,
    obj_factor: Number,
    m: Index,
    lambda: *const Number,
    new_lambda: Bool,
    nele_hess: Index,
    iRow: *mut Index,
    jCol: *mut Index,
    values: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback providing user scaling factors.
///
/// `x_scaling` and `g_scaling` only need to be written when the matching
/// `use_*_scaling` output is set to true.
pub type ScalingParams_CB = unsafe extern "C" fn(
    obj_scaling: *mut Number,
    use_x_scaling: *mut Bool,
    n: Index,
    x_scaling: *mut Number,
    use_g_scaling: *mut Bool,
    m: Index,
    g_scaling: *mut Number,
    user_data: UserDataPtr,
) -> Bool;

/// Callback for intermediate iteration info.
///
/// Called once per iteration. Return false to terminate optimization.
pub type Intermediate_CB = unsafe extern "C" fn(
    alg_mod: AlgorithmMode,
    iter_count: Index,
    obj_value: Number,
    inf_pr: Number,
    inf_du: Number,
    mu: Number,
    d_norm: Number,
    regularization_size: Number,
    alpha_du: Number,
    alpha_pr: Number,
    ls_trials: Index,
    user_data: UserDataPtr,
) -> Bool;

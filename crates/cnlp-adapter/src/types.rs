//! Value types exchanged between the optimizer, the adapter and the callbacks.

use crate::error::{AdapterError, AdapterResult};
use cnlp_sys::{AlgorithmMode, FIRST_INDEX_ONE, FIRST_INDEX_ZERO};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use cnlp_sys::{Index, Number};

/// Whether sparse coordinates reported to the optimizer start at 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStyle {
    /// C-style, first row/column is 0.
    #[default]
    Zero,
    /// Fortran-style, first row/column is 1.
    One,
}

impl IndexStyle {
    /// Offset added to every zero-based coordinate.
    pub fn base(self) -> Index {
        match self {
            IndexStyle::Zero => FIRST_INDEX_ZERO,
            IndexStyle::One => FIRST_INDEX_ONE,
        }
    }
}

impl TryFrom<Index> for IndexStyle {
    type Error = AdapterError;

    fn try_from(raw: Index) -> AdapterResult<Self> {
        match raw {
            FIRST_INDEX_ZERO => Ok(IndexStyle::Zero),
            FIRST_INDEX_ONE => Ok(IndexStyle::One),
            other => Err(AdapterError::UnknownIndexStyle(other.into())),
        }
    }
}

impl fmt::Display for IndexStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexStyle::Zero => write!(f, "zero-based"),
            IndexStyle::One => write!(f, "one-based"),
        }
    }
}

/// Raw dimensions as written by the size callback.
///
/// Signed because the callback protocol is C-shaped; the adapter rejects
/// negative values before building a [`ProblemDescriptor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NlpSizes {
    pub n: Index,
    pub m: Index,
    pub nnz_jac_g: Index,
    pub nnz_h_lag: Index,
}

/// Validated problem dimensions. Fixed for the adapter's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProblemDescriptor {
    /// Number of variables.
    pub n: usize,
    /// Number of constraints.
    pub m: usize,
    /// Nonzeros in the constraint Jacobian.
    pub nnz_jac_g: usize,
    /// Nonzeros in the lower triangle of the Lagrangian Hessian.
    pub nnz_h_lag: usize,
    pub index_style: IndexStyle,
}

impl ProblemDescriptor {
    /// Validate raw sizes against sign and the configured ceiling.
    pub fn from_sizes(
        sizes: NlpSizes,
        index_style: IndexStyle,
        max_problem_size: usize,
    ) -> AdapterResult<Self> {
        let invalid = || AdapterError::InvalidDimensions {
            n: sizes.n.into(),
            m: sizes.m.into(),
            nnz_jac_g: sizes.nnz_jac_g.into(),
            nnz_h_lag: sizes.nnz_h_lag.into(),
        };
        let to_usize = |v: Index| usize::try_from(v).map_err(|_| invalid());

        let descriptor = Self {
            n: to_usize(sizes.n)?,
            m: to_usize(sizes.m)?,
            nnz_jac_g: to_usize(sizes.nnz_jac_g)?,
            nnz_h_lag: to_usize(sizes.nnz_h_lag)?,
            index_style,
        };

        for (name, size) in [
            ("n", descriptor.n),
            ("m", descriptor.m),
            ("nnz_jac_g", descriptor.nnz_jac_g),
            ("nnz_h_lag", descriptor.nnz_h_lag),
        ] {
            if size > max_problem_size {
                return Err(AdapterError::ProblemTooLarge {
                    name,
                    size,
                    max: max_problem_size,
                });
            }
        }

        Ok(descriptor)
    }
}

impl fmt::Display for ProblemDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={}, m={}, nnz_jac_g={}, nnz_h_lag={}, {}",
            self.n, self.m, self.nnz_jac_g, self.nnz_h_lag, self.index_style
        )
    }
}

/// Output buffers for variable and constraint bounds.
///
/// Unbounded sides are written by the callback as the optimizer's infinity
/// sentinel; the adapter never synthesizes one.
#[derive(Debug)]
pub struct BoundBuffers<'a> {
    pub x_l: &'a mut [Number],
    pub x_u: &'a mut [Number],
    pub g_l: &'a mut [Number],
    pub g_u: &'a mut [Number],
}

/// Which parts of the starting point the optimizer wants filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitFlags {
    pub x: bool,
    /// Bound multipliers `z_l` and `z_u`.
    pub z: bool,
    pub lambda: bool,
}

impl InitFlags {
    /// Request only the primal starting point.
    pub fn primal_only() -> Self {
        Self {
            x: true,
            z: false,
            lambda: false,
        }
    }
}

/// Output buffers for the starting point.
#[derive(Debug)]
pub struct StartingPoint<'a> {
    pub x: &'a mut [Number],
    pub z_l: &'a mut [Number],
    pub z_u: &'a mut [Number],
    pub lambda: &'a mut [Number],
}

/// One phase of a sparse-matrix query.
///
/// The structure phase fills coordinates, the value phase fills numbers in
/// exactly the order the coordinates were reported.
#[derive(Debug)]
pub enum SparseRequest<'a> {
    /// Report nonzero coordinates.
    Structure {
        rows: &'a mut [Index],
        cols: &'a mut [Index],
    },
    /// Report nonzero values at the current point.
    Values(&'a mut [Number]),
}

impl SparseRequest<'_> {
    /// Check if this is a structure-phase request.
    pub fn is_structure(&self) -> bool {
        matches!(self, SparseRequest::Structure { .. })
    }

    pub(crate) fn phase(&self) -> &'static str {
        if self.is_structure() {
            "structure"
        } else {
            "values"
        }
    }
}

/// Lagrangian weights for the Hessian: σ ∇²f(x) + Σᵢ λᵢ ∇²gᵢ(x).
#[derive(Debug, Clone, Copy)]
pub struct LagrangeWeights<'a> {
    /// σ, scaling factor for the objective Hessian.
    pub obj_factor: Number,
    /// Constraint multipliers (length m). May be absent in the structure phase.
    pub lambda: Option<&'a [Number]>,
    /// True if lambda changed since the last call.
    pub new_lambda: bool,
}

/// Scaling values filled in by a scaling callback.
#[derive(Debug)]
pub struct ScalingParams<'a> {
    pub obj_scaling: Number,
    pub use_x_scaling: bool,
    /// Only meaningful when `use_x_scaling` is set.
    pub x_scaling: &'a mut [Number],
    pub use_g_scaling: bool,
    /// Only meaningful when `use_g_scaling` is set.
    pub g_scaling: &'a mut [Number],
}

/// Scaling decision reported to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub obj_scaling: Number,
    pub use_x_scaling: bool,
    pub use_g_scaling: bool,
}

impl Scaling {
    /// No user scaling requested.
    pub fn none() -> Self {
        Self {
            obj_scaling: 1.0,
            use_x_scaling: false,
            use_g_scaling: false,
        }
    }
}

/// Progress of one completed optimizer iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    pub mode: AlgorithmMode,
    pub iter: Index,
    pub obj_value: Number,
    /// Primal infeasibility.
    pub inf_pr: Number,
    /// Dual infeasibility.
    pub inf_du: Number,
    /// Barrier parameter.
    pub mu: Number,
    /// Norm of the primal step.
    pub d_norm: Number,
    pub regularization_size: Number,
    /// Dual step size.
    pub alpha_du: Number,
    /// Primal step size.
    pub alpha_pr: Number,
    pub ls_trials: Index,
}

/// Final iterate handed to the adapter by the optimizer.
#[derive(Debug, Clone, Copy)]
pub struct FinalPoint<'a> {
    pub x: &'a [Number],
    pub z_l: &'a [Number],
    pub z_u: &'a [Number],
    pub g: &'a [Number],
    pub lambda: &'a [Number],
    pub obj_value: Number,
}

//! The problem interface an optimizer drives.
//!
//! The optimizer calls these methods in a fixed order: one [`get_nlp_info`],
//! then bounds, starting point and structure queries, then repeated evaluation
//! queries with one [`intermediate_callback`] per completed iteration, and
//! finally exactly one [`finalize_solution`].
//!
//! Every buffer argument is borrowed for the call only. Lengths must match the
//! dimensions reported by [`get_nlp_info`]; a mismatch is a usage error.
//!
//! [`get_nlp_info`]: NlpInterface::get_nlp_info
//! [`intermediate_callback`]: NlpInterface::intermediate_callback
//! [`finalize_solution`]: NlpInterface::finalize_solution

use crate::error::AdapterResult;
use crate::solution::SolveStatus;
use crate::types::{
    BoundBuffers, FinalPoint, InitFlags, IterationStats, LagrangeWeights, Number,
    ProblemDescriptor, Scaling, SparseRequest, StartingPoint,
};
use std::ops::ControlFlow;

pub trait NlpInterface {
    /// Report problem dimensions and the index style of sparse coordinates.
    fn get_nlp_info(&mut self) -> AdapterResult<ProblemDescriptor>;

    /// Fill variable bounds (length n) and constraint bounds (length m).
    fn get_bounds_info(&mut self, bounds: BoundBuffers<'_>) -> AdapterResult<()>;

    /// Fill user scaling factors if the problem provides any.
    ///
    /// `x_scaling` has length n and `g_scaling` length m; they are only
    /// meaningful when the returned [`Scaling`] says so.
    fn get_scaling_parameters(
        &mut self,
        x_scaling: &mut [Number],
        g_scaling: &mut [Number],
    ) -> AdapterResult<Scaling>;

    /// Fill the requested parts of the starting point.
    fn get_starting_point(&mut self, init: InitFlags, point: StartingPoint<'_>)
        -> AdapterResult<()>;

    /// Evaluate the objective f(x).
    fn eval_f(&mut self, x: &[Number], new_x: bool) -> AdapterResult<Number>;

    /// Evaluate the objective gradient ∇f(x).
    fn eval_grad_f(&mut self, x: &[Number], new_x: bool, grad_f: &mut [Number])
        -> AdapterResult<()>;

    /// Evaluate the constraints g(x).
    fn eval_g(&mut self, x: &[Number], new_x: bool, g: &mut [Number]) -> AdapterResult<()>;

    /// Report Jacobian structure or values, depending on `request`.
    ///
    /// `x` is required for the value phase and optional for the structure phase.
    fn eval_jac_g(
        &mut self,
        x: Option<&[Number]>,
        new_x: bool,
        request: SparseRequest<'_>,
    ) -> AdapterResult<()>;

    /// Report Lagrangian Hessian structure or values (lower triangle).
    ///
    /// Fails with an unsupported error when the problem has no exact Hessian;
    /// the optimizer should then switch to an approximation.
    fn eval_h(
        &mut self,
        x: Option<&[Number]>,
        new_x: bool,
        weights: LagrangeWeights<'_>,
        request: SparseRequest<'_>,
    ) -> AdapterResult<()>;

    /// Report a completed iteration. `Break` asks the optimizer to stop.
    fn intermediate_callback(&mut self, stats: &IterationStats) -> ControlFlow<()>;

    /// Receive the final point. Called once per solve.
    fn finalize_solution(&mut self, status: SolveStatus, point: FinalPoint<'_>)
        -> AdapterResult<()>;
}

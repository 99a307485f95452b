//! The bundle of user callbacks the adapter forwards to.
//!
//! Each callback receives the adapter-owned user data as its first argument
//! and returns `true` on success. Buffers are borrowed for the duration of a
//! single call only.
//!
//! Sparse callbacks write zero-based coordinates in the structure phase; the
//! adapter applies the configured [`IndexStyle`](crate::IndexStyle) offset.

use crate::types::{
    BoundBuffers, InitFlags, IterationStats, LagrangeWeights, NlpSizes, Number,
    ProblemDescriptor, ScalingParams, SparseRequest, StartingPoint,
};
use std::fmt;

pub type SizesFn<U> = Box<dyn FnMut(&mut U, &mut NlpSizes) -> bool>;
pub type InitFn<U> = Box<dyn FnMut(&mut U, InitFlags, StartingPoint<'_>) -> bool>;
pub type BoundsFn<U> = Box<dyn FnMut(&mut U, BoundBuffers<'_>) -> bool>;
pub type EvalFFn<U> = Box<dyn FnMut(&mut U, &[Number], bool, &mut Number) -> bool>;
/// Shared shape of the gradient and constraint callbacks.
pub type EvalVecFn<U> = Box<dyn FnMut(&mut U, &[Number], bool, &mut [Number]) -> bool>;
pub type EvalJacGFn<U> = Box<
    dyn FnMut(&mut U, &ProblemDescriptor, Option<&[Number]>, bool, SparseRequest<'_>) -> bool,
>;
pub type EvalHFn<U> = Box<
    dyn FnMut(
        &mut U,
        &ProblemDescriptor,
        Option<&[Number]>,
        bool,
        LagrangeWeights<'_>,
        SparseRequest<'_>,
    ) -> bool,
>;
pub type ScalingFn<U> = Box<dyn FnMut(&mut U, &mut ScalingParams<'_>) -> bool>;
/// Returns `false` to request termination.
pub type IntermediateFn<U> = Box<dyn FnMut(&mut U, &IterationStats) -> bool>;

/// Callbacks defining a nonlinear program.
///
/// The seven evaluation callbacks every problem needs are taken by
/// [`CallbackSet::new`]; Hessian, scaling and intermediate reporting are
/// optional and attached with the `with_*` builders.
pub struct CallbackSet<U> {
    pub(crate) sizes: SizesFn<U>,
    pub(crate) init: InitFn<U>,
    pub(crate) bounds: BoundsFn<U>,
    pub(crate) eval_f: EvalFFn<U>,
    pub(crate) eval_grad_f: EvalVecFn<U>,
    pub(crate) eval_g: EvalVecFn<U>,
    pub(crate) eval_jac_g: EvalJacGFn<U>,
    pub(crate) eval_h: Option<EvalHFn<U>>,
    pub(crate) scaling: Option<ScalingFn<U>>,
    pub(crate) intermediate: Option<IntermediateFn<U>>,
}

impl<U> CallbackSet<U> {
    /// Bundle the mandatory callbacks.
    pub fn new(
        sizes: impl FnMut(&mut U, &mut NlpSizes) -> bool + 'static,
        init: impl FnMut(&mut U, InitFlags, StartingPoint<'_>) -> bool + 'static,
        bounds: impl FnMut(&mut U, BoundBuffers<'_>) -> bool + 'static,
        eval_f: impl FnMut(&mut U, &[Number], bool, &mut Number) -> bool + 'static,
        eval_grad_f: impl FnMut(&mut U, &[Number], bool, &mut [Number]) -> bool + 'static,
        eval_g: impl FnMut(&mut U, &[Number], bool, &mut [Number]) -> bool + 'static,
        eval_jac_g: impl FnMut(
                &mut U,
                &ProblemDescriptor,
                Option<&[Number]>,
                bool,
                SparseRequest<'_>,
            ) -> bool
            + 'static,
    ) -> Self {
        Self {
            sizes: Box::new(sizes),
            init: Box::new(init),
            bounds: Box::new(bounds),
            eval_f: Box::new(eval_f),
            eval_grad_f: Box::new(eval_grad_f),
            eval_g: Box::new(eval_g),
            eval_jac_g: Box::new(eval_jac_g),
            eval_h: None,
            scaling: None,
            intermediate: None,
        }
    }

    /// Attach an exact Hessian of the Lagrangian.
    ///
    /// Without one the optimizer is told the Hessian is unavailable and must
    /// approximate it.
    pub fn with_hessian(
        mut self,
        eval_h: impl FnMut(
                &mut U,
                &ProblemDescriptor,
                Option<&[Number]>,
                bool,
                LagrangeWeights<'_>,
                SparseRequest<'_>,
            ) -> bool
            + 'static,
    ) -> Self {
        self.eval_h = Some(Box::new(eval_h));
        self
    }

    /// Attach user scaling factors.
    pub fn with_scaling(
        mut self,
        scaling: impl FnMut(&mut U, &mut ScalingParams<'_>) -> bool + 'static,
    ) -> Self {
        self.scaling = Some(Box::new(scaling));
        self
    }

    /// Attach a per-iteration progress hook that may request early termination.
    pub fn with_intermediate(
        mut self,
        intermediate: impl FnMut(&mut U, &IterationStats) -> bool + 'static,
    ) -> Self {
        self.intermediate = Some(Box::new(intermediate));
        self
    }

    pub fn has_hessian(&self) -> bool {
        self.eval_h.is_some()
    }

    pub fn has_scaling(&self) -> bool {
        self.scaling.is_some()
    }

    pub fn has_intermediate(&self) -> bool {
        self.intermediate.is_some()
    }
}

impl<U> fmt::Debug for CallbackSet<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("eval_h", &self.has_hessian())
            .field("scaling", &self.has_scaling())
            .field("intermediate", &self.has_intermediate())
            .finish_non_exhaustive()
    }
}

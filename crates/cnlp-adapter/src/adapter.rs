//! The problem adapter: forwards the optimizer's problem interface to user callbacks.

use crate::callbacks::CallbackSet;
use crate::config::AdapterConfig;
use crate::error::{AdapterError, AdapterResult, CallbackKind, ErrorCategory};
use crate::interface::NlpInterface;
use crate::solution::{check_len, SolutionRecord, SolutionStore, SolveStatus};
use crate::types::{
    BoundBuffers, FinalPoint, Index, IndexStyle, InitFlags, IterationStats, LagrangeWeights,
    NlpSizes, Number, ProblemDescriptor, Scaling, ScalingParams, SparseRequest, StartingPoint,
};
use std::fmt;
use std::ops::ControlFlow;
use tracing::{debug, info, trace, warn};

/// Adapter between an optimizer's [`NlpInterface`] and a [`CallbackSet`].
///
/// Owns the user data `U` handed to every callback and the
/// [`SolutionRecord`] written at finalization. It never retains buffers
/// passed in by the optimizer.
///
/// Not `Clone`:
///
/// ```compile_fail
/// fn assert_clone<T: Clone>() {}
/// assert_clone::<cnlp_adapter::ProblemAdapter<()>>();
/// ```
pub struct ProblemAdapter<U> {
    config: AdapterConfig,
    callbacks: CallbackSet<U>,
    user_data: U,
    descriptor: Option<ProblemDescriptor>,
    /// Set once any callback has been invoked; locks the user data.
    callbacks_started: bool,
    /// First configuration error; every later query returns it.
    failed: Option<AdapterError>,
    solution: SolutionStore,
}

impl<U> ProblemAdapter<U> {
    /// Create an adapter. No callback runs until the optimizer's first query.
    pub fn new(config: AdapterConfig, callbacks: CallbackSet<U>, user_data: U) -> Self {
        Self {
            config,
            callbacks,
            user_data,
            descriptor: None,
            callbacks_started: false,
            failed: None,
            solution: SolutionStore::new(),
        }
    }

    /// Replace the user data handed to callbacks.
    ///
    /// Only allowed before the first callback has run.
    pub fn set_user_data(&mut self, user_data: U) -> AdapterResult<()> {
        if self.callbacks_started {
            return Err(AdapterError::UserDataLocked);
        }
        self.user_data = user_data;
        Ok(())
    }

    pub fn user_data(&self) -> &U {
        &self.user_data
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn index_style(&self) -> IndexStyle {
        self.config.index_style
    }

    /// Dimensions established by the first [`NlpInterface::get_nlp_info`], if any.
    pub fn problem_descriptor(&self) -> Option<ProblemDescriptor> {
        self.descriptor
    }

    pub fn has_hessian(&self) -> bool {
        self.callbacks.has_hessian()
    }

    /// The configuration error that disabled this adapter, if any.
    pub fn configuration_error(&self) -> Option<&AdapterError> {
        self.failed.as_ref()
    }

    /// Size solution storage before the solve.
    ///
    /// The solution stays unavailable until finalize runs. If the dimensions
    /// are already known they must match.
    pub fn preallocate_solution(&mut self, n: usize, m: usize) -> AdapterResult<()> {
        if let Some(d) = self.descriptor {
            if (d.n, d.m) != (n, m) {
                return Err(AdapterError::DimensionMismatch {
                    requested_n: n,
                    requested_m: m,
                    n: d.n,
                    m: d.m,
                });
            }
        }
        self.solution.preallocate(n, m)
    }

    /// Discard the stored solution so the adapter can serve another solve.
    pub fn reset_solution(&mut self) {
        self.solution.reset();
    }

    /// The full solution record, available once finalize has run.
    pub fn solution(&self) -> AdapterResult<&SolutionRecord> {
        self.solution.record()
    }

    pub fn objective_value(&self) -> AdapterResult<Number> {
        self.solution.record().map(SolutionRecord::objective_value)
    }

    pub fn constraint_values(&self) -> AdapterResult<&[Number]> {
        self.solution.record().map(SolutionRecord::constraint_values)
    }

    /// Consume the adapter, keeping only the solution.
    pub fn into_solution(self) -> AdapterResult<SolutionRecord> {
        self.solution.into_record()
    }

    fn ensure_usable(&self) -> AdapterResult<()> {
        match &self.failed {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn descriptor(&self) -> AdapterResult<ProblemDescriptor> {
        self.ensure_usable()?;
        self.descriptor.ok_or(AdapterError::NotInitialized)
    }

    /// Keep the first configuration error so later queries fail fast.
    fn guard<T>(&mut self, result: AdapterResult<T>) -> AdapterResult<T> {
        if let Err(err) = &result {
            if err.category() == ErrorCategory::Configuration && self.failed.is_none() {
                warn!(error = %err, "configuration error; adapter disabled");
                self.failed = Some(err.clone());
            }
        }
        result
    }

    /// Query the size callback and validate the result against the cached descriptor.
    fn establish_descriptor(&mut self) -> AdapterResult<ProblemDescriptor> {
        let mut sizes = NlpSizes::default();
        self.dispatch(CallbackKind::Sizes, |cbs, ud| (cbs.sizes)(ud, &mut sizes))?;

        let descriptor = ProblemDescriptor::from_sizes(
            sizes,
            self.config.index_style,
            self.config.max_problem_size,
        )?;

        match self.descriptor {
            Some(previous) if previous != descriptor => Err(AdapterError::DescriptorChanged {
                previous: previous.to_string(),
                current: descriptor.to_string(),
            }),
            Some(_) => {
                debug!(%descriptor, "problem dimensions re-confirmed");
                Ok(descriptor)
            }
            None => {
                if let Some((n, m)) = self.solution.sized_for() {
                    if (n, m) != (descriptor.n, descriptor.m) {
                        return Err(AdapterError::DimensionMismatch {
                            requested_n: n,
                            requested_m: m,
                            n: descriptor.n,
                            m: descriptor.m,
                        });
                    }
                }
                debug!(%descriptor, "problem dimensions established");
                self.descriptor = Some(descriptor);
                Ok(descriptor)
            }
        }
    }

    /// Invoke one callback, mapping a `false` return to an evaluation error.
    fn dispatch<F>(&mut self, kind: CallbackKind, call: F) -> AdapterResult<()>
    where
        F: FnOnce(&mut CallbackSet<U>, &mut U) -> bool,
    {
        self.callbacks_started = true;
        if call(&mut self.callbacks, &mut self.user_data) {
            Ok(())
        } else {
            warn!(callback = %kind, "callback reported failure");
            Err(AdapterError::CallbackFailed { callback: kind })
        }
    }
}

impl<U> NlpInterface for ProblemAdapter<U> {
    fn get_nlp_info(&mut self) -> AdapterResult<ProblemDescriptor> {
        self.ensure_usable()?;
        let result = self.establish_descriptor();
        self.guard(result)
    }

    fn get_bounds_info(&mut self, bounds: BoundBuffers<'_>) -> AdapterResult<()> {
        let d = self.descriptor()?;
        check_len("x_l", bounds.x_l.len(), d.n)?;
        check_len("x_u", bounds.x_u.len(), d.n)?;
        check_len("g_l", bounds.g_l.len(), d.m)?;
        check_len("g_u", bounds.g_u.len(), d.m)?;

        self.dispatch(CallbackKind::Bounds, |cbs, ud| (cbs.bounds)(ud, bounds))
    }

    fn get_scaling_parameters(
        &mut self,
        x_scaling: &mut [Number],
        g_scaling: &mut [Number],
    ) -> AdapterResult<Scaling> {
        let d = self.descriptor()?;
        if !self.callbacks.has_scaling() {
            return Ok(Scaling::none());
        }
        check_len("x_scaling", x_scaling.len(), d.n)?;
        check_len("g_scaling", g_scaling.len(), d.m)?;

        let mut params = ScalingParams {
            obj_scaling: 1.0,
            use_x_scaling: false,
            x_scaling,
            use_g_scaling: false,
            g_scaling,
        };
        self.dispatch(CallbackKind::Scaling, |cbs, ud| {
            cbs.scaling.as_mut().is_some_and(|scaling| scaling(ud, &mut params))
        })?;

        Ok(Scaling {
            obj_scaling: params.obj_scaling,
            use_x_scaling: params.use_x_scaling,
            use_g_scaling: params.use_g_scaling,
        })
    }

    fn get_starting_point(
        &mut self,
        init: InitFlags,
        point: StartingPoint<'_>,
    ) -> AdapterResult<()> {
        let d = self.descriptor()?;
        check_len("x", point.x.len(), d.n)?;
        check_len("z_l", point.z_l.len(), d.n)?;
        check_len("z_u", point.z_u.len(), d.n)?;
        check_len("lambda", point.lambda.len(), d.m)?;

        self.dispatch(CallbackKind::Init, |cbs, ud| (cbs.init)(ud, init, point))
    }

    fn eval_f(&mut self, x: &[Number], new_x: bool) -> AdapterResult<Number> {
        let d = self.descriptor()?;
        check_len("x", x.len(), d.n)?;
        trace!(new_x, "eval_f");

        let mut obj_value = 0.0;
        self.dispatch(CallbackKind::EvalF, |cbs, ud| {
            (cbs.eval_f)(ud, x, new_x, &mut obj_value)
        })?;
        Ok(obj_value)
    }

    fn eval_grad_f(
        &mut self,
        x: &[Number],
        new_x: bool,
        grad_f: &mut [Number],
    ) -> AdapterResult<()> {
        let d = self.descriptor()?;
        check_len("x", x.len(), d.n)?;
        check_len("grad_f", grad_f.len(), d.n)?;
        trace!(new_x, "eval_grad_f");

        self.dispatch(CallbackKind::EvalGradF, |cbs, ud| {
            (cbs.eval_grad_f)(ud, x, new_x, grad_f)
        })
    }

    fn eval_g(&mut self, x: &[Number], new_x: bool, g: &mut [Number]) -> AdapterResult<()> {
        let d = self.descriptor()?;
        check_len("x", x.len(), d.n)?;
        check_len("g", g.len(), d.m)?;
        trace!(new_x, "eval_g");

        self.dispatch(CallbackKind::EvalG, |cbs, ud| (cbs.eval_g)(ud, x, new_x, g))
    }

    fn eval_jac_g(
        &mut self,
        x: Option<&[Number]>,
        new_x: bool,
        request: SparseRequest<'_>,
    ) -> AdapterResult<()> {
        let d = self.descriptor()?;
        check_point(x, &request, d.n)?;
        check_sparse(&request, d.nnz_jac_g, ["jac_g rows", "jac_g cols", "jac_g values"])?;
        trace!(phase = request.phase(), new_x, "eval_jac_g");

        match request {
            SparseRequest::Structure { rows, cols } => {
                self.dispatch(CallbackKind::EvalJacG, |cbs, ud| {
                    let request = SparseRequest::Structure {
                        rows: &mut *rows,
                        cols: &mut *cols,
                    };
                    (cbs.eval_jac_g)(ud, &d, x, new_x, request)
                })?;
                let shifted = shift_coordinates("jac_g", rows, cols, d.index_style);
                self.guard(shifted)
            }
            values => self.dispatch(CallbackKind::EvalJacG, |cbs, ud| {
                (cbs.eval_jac_g)(ud, &d, x, new_x, values)
            }),
        }
    }

    fn eval_h(
        &mut self,
        x: Option<&[Number]>,
        new_x: bool,
        weights: LagrangeWeights<'_>,
        request: SparseRequest<'_>,
    ) -> AdapterResult<()> {
        let d = self.descriptor()?;
        if !self.callbacks.has_hessian() {
            debug!("no Hessian callback registered; reporting unsupported");
            return Err(AdapterError::HessianUnavailable);
        }
        check_point(x, &request, d.n)?;
        match weights.lambda {
            Some(lambda) => check_len("lambda", lambda.len(), d.m)?,
            None if request.is_structure() => {}
            None => check_len("lambda", 0, d.m)?,
        }
        check_sparse(&request, d.nnz_h_lag, ["h rows", "h cols", "h values"])?;
        trace!(phase = request.phase(), new_x, new_lambda = weights.new_lambda, "eval_h");

        match request {
            SparseRequest::Structure { rows, cols } => {
                self.dispatch(CallbackKind::EvalH, |cbs, ud| {
                    let request = SparseRequest::Structure {
                        rows: &mut *rows,
                        cols: &mut *cols,
                    };
                    cbs.eval_h
                        .as_mut()
                        .is_some_and(|eval_h| eval_h(ud, &d, x, new_x, weights, request))
                })?;
                let shifted = shift_coordinates("h", rows, cols, d.index_style);
                self.guard(shifted)
            }
            values => self.dispatch(CallbackKind::EvalH, |cbs, ud| {
                cbs.eval_h
                    .as_mut()
                    .is_some_and(|eval_h| eval_h(ud, &d, x, new_x, weights, values))
            }),
        }
    }

    fn intermediate_callback(&mut self, stats: &IterationStats) -> ControlFlow<()> {
        if self.failed.is_some() {
            return ControlFlow::Break(());
        }
        let Some(intermediate) = self.callbacks.intermediate.as_mut() else {
            return ControlFlow::Continue(());
        };
        self.callbacks_started = true;

        if intermediate(&mut self.user_data, stats) {
            ControlFlow::Continue(())
        } else {
            debug!(iter = stats.iter, "intermediate callback requested stop");
            ControlFlow::Break(())
        }
    }

    fn finalize_solution(
        &mut self,
        status: SolveStatus,
        point: FinalPoint<'_>,
    ) -> AdapterResult<()> {
        self.ensure_usable()?;
        if let Some(d) = self.descriptor {
            check_len("x", point.x.len(), d.n)?;
            check_len("g", point.g.len(), d.m)?;
        }
        self.solution.finalize(status, &point)?;

        info!(
            %status,
            objective = point.obj_value,
            n = point.x.len(),
            m = point.g.len(),
            "solution stored"
        );
        Ok(())
    }
}

impl<U> fmt::Debug for ProblemAdapter<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemAdapter")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks)
            .field("descriptor", &self.descriptor)
            .field("callbacks_started", &self.callbacks_started)
            .field("failed", &self.failed.is_some())
            .field("finalized", &self.solution.is_finalized())
            .finish_non_exhaustive()
    }
}

/// `x` is mandatory for the value phase and optional for the structure phase.
fn check_point(x: Option<&[Number]>, request: &SparseRequest<'_>, n: usize) -> AdapterResult<()> {
    match x {
        Some(x) => check_len("x", x.len(), n),
        None if request.is_structure() => Ok(()),
        None => check_len("x", 0, n),
    }
}

fn check_sparse(
    request: &SparseRequest<'_>,
    nnz: usize,
    [rows_name, cols_name, values_name]: [&'static str; 3],
) -> AdapterResult<()> {
    match request {
        SparseRequest::Structure { rows, cols } => {
            check_len(rows_name, rows.len(), nnz)?;
            check_len(cols_name, cols.len(), nnz)
        }
        SparseRequest::Values(values) => check_len(values_name, values.len(), nnz),
    }
}

/// Translate zero-based coordinates to the reported index style.
///
/// Buffers are left untouched when any coordinate would overflow.
fn shift_coordinates(
    matrix: &'static str,
    rows: &mut [Index],
    cols: &mut [Index],
    index_style: IndexStyle,
) -> AdapterResult<()> {
    let base = index_style.base();
    if base == 0 {
        return Ok(());
    }
    if let Some(&value) = rows
        .iter()
        .chain(cols.iter())
        .find(|coord| coord.checked_add(base).is_none())
    {
        return Err(AdapterError::CoordinateOverflow {
            matrix,
            value: value.into(),
            index_style,
        });
    }
    for coord in rows.iter_mut().chain(cols.iter_mut()) {
        *coord += base;
    }
    Ok(())
}

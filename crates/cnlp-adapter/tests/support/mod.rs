//! Shared fixtures: the two-variable scenario problem and a minimal optimizer
//! that drives any [`NlpInterface`] through the full query sequence.

#![allow(dead_code)]

use anyhow::{Context, Result};
use cnlp_adapter::{
    AdapterConfig, AlgorithmMode, BoundBuffers, CallbackSet, FinalPoint, Index, IndexStyle,
    InitFlags, IterationStats, LagrangeWeights, NlpInterface, NlpSizes, Number, ProblemAdapter,
    SolveStatus, SparseRequest, StartingPoint,
};
use std::ops::ControlFlow;

/// Value the mock optimizer treats as an infinite bound.
pub const INFINITY: Number = 1e19;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// User data for the scenario callbacks.
#[derive(Debug, Default)]
pub struct Trace {
    pub sizes_calls: usize,
    pub eval_f_calls: usize,
    pub jac_structure_calls: usize,
    pub jac_value_calls: usize,
    pub hessian_calls: usize,
    /// Iteration numbers seen by the intermediate callback.
    pub iterations: Vec<Index>,
    /// Return `false` from the intermediate callback at this iteration.
    pub stop_at: Option<Index>,
}

/// min x0² + x1²  s.t.  x0 + x1 - 2 = 0,  x ≥ 0,  starting from (1, 1).
pub fn scenario() -> CallbackSet<Trace> {
    CallbackSet::new(
        |trace: &mut Trace, sizes: &mut NlpSizes| {
            trace.sizes_calls += 1;
            *sizes = NlpSizes {
                n: 2,
                m: 1,
                nnz_jac_g: 2,
                nnz_h_lag: 2,
            };
            true
        },
        |_, init, point| {
            if init.x {
                point.x.copy_from_slice(&[1.0, 1.0]);
            }
            if init.z {
                point.z_l.fill(0.0);
                point.z_u.fill(0.0);
            }
            if init.lambda {
                point.lambda.fill(0.0);
            }
            true
        },
        |_, bounds| {
            bounds.x_l.fill(0.0);
            bounds.x_u.fill(INFINITY);
            bounds.g_l.fill(0.0);
            bounds.g_u.fill(0.0);
            true
        },
        |trace, x, _, obj| {
            trace.eval_f_calls += 1;
            *obj = x[0] * x[0] + x[1] * x[1];
            true
        },
        |_, x, _, grad| {
            grad[0] = 2.0 * x[0];
            grad[1] = 2.0 * x[1];
            true
        },
        |_, x, _, g| {
            g[0] = x[0] + x[1] - 2.0;
            true
        },
        |trace, _, _, _, request| match request {
            SparseRequest::Structure { rows, cols } => {
                trace.jac_structure_calls += 1;
                rows.copy_from_slice(&[0, 0]);
                cols.copy_from_slice(&[0, 1]);
                true
            }
            SparseRequest::Values(values) => {
                trace.jac_value_calls += 1;
                values.copy_from_slice(&[1.0, 1.0]);
                true
            }
        },
    )
    .with_intermediate(|trace, stats| {
        trace.iterations.push(stats.iter);
        trace.stop_at.map_or(true, |k| stats.iter < k)
    })
}

/// The scenario plus its exact (diagonal) Lagrangian Hessian.
pub fn scenario_with_hessian() -> CallbackSet<Trace> {
    scenario().with_hessian(|trace, _, _, _, weights, request| {
        trace.hessian_calls += 1;
        match request {
            SparseRequest::Structure { rows, cols } => {
                rows.copy_from_slice(&[0, 1]);
                cols.copy_from_slice(&[0, 1]);
            }
            SparseRequest::Values(values) => values.fill(2.0 * weights.obj_factor),
        }
        true
    })
}

pub fn scenario_adapter(index_style: IndexStyle) -> ProblemAdapter<Trace> {
    let config = AdapterConfig::default().with_index_style(index_style);
    ProblemAdapter::new(config, scenario(), Trace::default())
}

/// Outcome of one mock solve.
#[derive(Debug)]
pub struct EngineRun {
    pub status: SolveStatus,
    /// Iterations reported to the intermediate callback.
    pub iterations: usize,
    pub exact_hessian: bool,
    pub jac_rows: Vec<Index>,
    pub jac_cols: Vec<Index>,
    pub final_x: Vec<Number>,
}

/// Projected-gradient stand-in for an interior-point optimizer.
///
/// It only exists to exercise the query protocol in the right order; it
/// ignores the constraints when stepping.
#[derive(Debug, Clone, Copy)]
pub struct MockEngine {
    pub max_iter: Index,
    pub step: Number,
    pub tol: Number,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self {
            max_iter: 50,
            step: 0.25,
            tol: 1e-8,
        }
    }
}

impl MockEngine {
    pub fn solve(&self, nlp: &mut dyn NlpInterface) -> Result<EngineRun> {
        let d = nlp.get_nlp_info().context("size query")?;
        let (n, m) = (d.n, d.m);

        let (mut x_l, mut x_u) = (vec![0.0; n], vec![0.0; n]);
        let (mut g_l, mut g_u) = (vec![0.0; m], vec![0.0; m]);
        nlp.get_bounds_info(BoundBuffers {
            x_l: &mut x_l,
            x_u: &mut x_u,
            g_l: &mut g_l,
            g_u: &mut g_u,
        })
        .context("bounds query")?;

        let mut x = vec![0.0; n];
        let (mut z_l, mut z_u) = (vec![0.0; n], vec![0.0; n]);
        let mut lambda = vec![0.0; m];
        nlp.get_starting_point(
            InitFlags::primal_only(),
            StartingPoint {
                x: &mut x,
                z_l: &mut z_l,
                z_u: &mut z_u,
                lambda: &mut lambda,
            },
        )
        .context("starting point")?;

        let (mut x_scaling, mut g_scaling) = (vec![1.0; n], vec![1.0; m]);
        let scaling = nlp.get_scaling_parameters(&mut x_scaling, &mut g_scaling)?;

        let (mut jac_rows, mut jac_cols) = (vec![0; d.nnz_jac_g], vec![0; d.nnz_jac_g]);
        nlp.eval_jac_g(
            None,
            false,
            SparseRequest::Structure {
                rows: &mut jac_rows,
                cols: &mut jac_cols,
            },
        )
        .context("jacobian structure")?;

        let (mut h_rows, mut h_cols) = (vec![0; d.nnz_h_lag], vec![0; d.nnz_h_lag]);
        let no_weights = LagrangeWeights {
            obj_factor: 1.0,
            lambda: None,
            new_lambda: false,
        };
        let exact_hessian = match nlp.eval_h(
            None,
            false,
            no_weights,
            SparseRequest::Structure {
                rows: &mut h_rows,
                cols: &mut h_cols,
            },
        ) {
            Ok(()) => true,
            Err(e) if e.is_unsupported() => false,
            Err(e) => return Err(e.into()),
        };

        let mut grad = vec![0.0; n];
        let mut g = vec![0.0; m];
        let mut jac = vec![0.0; d.nnz_jac_g];
        let mut hess = vec![0.0; d.nnz_h_lag];
        let mut obj_value = 0.0;
        let mut status = SolveStatus::MaxiterExceeded;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            obj_value = nlp.eval_f(&x, true)? * scaling.obj_scaling;
            nlp.eval_grad_f(&x, false, &mut grad)?;
            nlp.eval_g(&x, false, &mut g)?;
            nlp.eval_jac_g(Some(x.as_slice()), false, SparseRequest::Values(&mut jac))?;
            if exact_hessian {
                let weights = LagrangeWeights {
                    obj_factor: 1.0,
                    lambda: Some(lambda.as_slice()),
                    new_lambda: iter == 0,
                };
                nlp.eval_h(Some(x.as_slice()), false, weights, SparseRequest::Values(&mut hess))?;
            }

            let next: Vec<Number> = (0..n)
                .map(|i| (x[i] - self.step * grad[i]).clamp(x_l[i], x_u[i]))
                .collect();
            let d_norm = next
                .iter()
                .zip(&x)
                .fold(0.0, |acc: Number, (a, b)| acc.max((a - b).abs()));
            iterations += 1;

            let stats = IterationStats {
                mode: AlgorithmMode::RegularMode,
                iter,
                obj_value,
                inf_pr: g.iter().fold(0.0, |acc: Number, v| acc.max(v.abs())),
                inf_du: grad.iter().fold(0.0, |acc: Number, v| acc.max(v.abs())),
                mu: 0.1,
                d_norm,
                regularization_size: 0.0,
                alpha_du: 1.0,
                alpha_pr: 1.0,
                ls_trials: 1,
            };
            if let ControlFlow::Break(()) = nlp.intermediate_callback(&stats) {
                status = SolveStatus::UserRequestedStop;
                break;
            }
            if d_norm < self.tol {
                status = SolveStatus::Success;
                break;
            }
            x = next;
        }

        nlp.finalize_solution(
            status,
            FinalPoint {
                x: &x,
                z_l: &z_l,
                z_u: &z_u,
                g: &g,
                lambda: &lambda,
                obj_value,
            },
        )
        .context("finalize")?;

        Ok(EngineRun {
            status,
            iterations,
            exact_hessian,
            jac_rows,
            jac_cols,
            final_x: x,
        })
    }
}

//! Construction from raw C function pointers.
//!
//! Each C callback is wrapped in a closure that lowers slices to
//! pointer + length and `bool` to [`Bool`]. The user-data pointer lives in the
//! adapter and is passed through untouched.

use crate::adapter::ProblemAdapter;
use crate::callbacks::CallbackSet;
use crate::config::AdapterConfig;
use crate::error::AdapterResult;
use crate::types::{BoundBuffers, IndexStyle, Number, SparseRequest, StartingPoint};
use cnlp_sys::{
    Bool, Bounds_CB, Eval_F_CB, Eval_G_CB, Eval_Grad_F_CB, Eval_H_CB, Eval_Jac_G_CB, Index,
    Init_CB, Intermediate_CB, ScalingParams_CB, Sizes_CB, UserDataPtr,
};
use std::ptr;

/// Raw callback pointers supplied by a C caller.
#[derive(Debug, Clone, Copy)]
pub struct RawCallbacks {
    pub sizes: Sizes_CB,
    pub init: Init_CB,
    pub bounds: Bounds_CB,
    pub eval_f: Eval_F_CB,
    pub eval_grad_f: Eval_Grad_F_CB,
    pub eval_g: Eval_G_CB,
    pub eval_jac_g: Eval_Jac_G_CB,
    pub eval_h: Option<Eval_H_CB>,
    pub scaling: Option<ScalingParams_CB>,
    pub intermediate: Option<Intermediate_CB>,
}

impl ProblemAdapter<UserDataPtr> {
    /// Build an adapter over C callbacks.
    ///
    /// `index_style` must be 0 or 1; anything else fails before any callback runs.
    ///
    /// # Safety
    ///
    /// Every function pointer must be safe to call with buffers of the lengths
    /// it is told, and `user_data` must stay valid for as long as the adapter
    /// may invoke callbacks (including after [`set_user_data`]).
    ///
    /// [`set_user_data`]: ProblemAdapter::set_user_data
    pub unsafe fn from_raw(
        index_style: Index,
        callbacks: RawCallbacks,
        user_data: UserDataPtr,
    ) -> AdapterResult<Self> {
        let config = AdapterConfig::default().with_index_style(IndexStyle::try_from(index_style)?);
        Ok(Self::new(config, callback_set(callbacks), user_data))
    }
}

fn c_bool(value: bool) -> Bool {
    Bool::from(value)
}

/// Dimensions originate from `Index` values, so they always fit.
fn dim(size: usize) -> Index {
    size as Index
}

fn len<T>(slice: &[T]) -> Index {
    dim(slice.len())
}

fn input_ptr(values: Option<&[Number]>) -> *const Number {
    values.map_or(ptr::null(), <[Number]>::as_ptr)
}

fn callback_set(raw: RawCallbacks) -> CallbackSet<UserDataPtr> {
    let mut set = CallbackSet::new(
        move |ud, out| unsafe {
            (raw.sizes)(
                &mut out.n,
                &mut out.m,
                &mut out.nnz_jac_g,
                &mut out.nnz_h_lag,
                *ud,
            ) != 0
        },
        move |ud, flags, point| {
            let StartingPoint { x, z_l, z_u, lambda } = point;
            unsafe {
                (raw.init)(
                    len(x),
                    c_bool(flags.x),
                    x.as_mut_ptr(),
                    c_bool(flags.z),
                    z_l.as_mut_ptr(),
                    z_u.as_mut_ptr(),
                    len(lambda),
                    c_bool(flags.lambda),
                    lambda.as_mut_ptr(),
                    *ud,
                ) != 0
            }
        },
        move |ud, bounds| {
            let BoundBuffers { x_l, x_u, g_l, g_u } = bounds;
            unsafe {
                (raw.bounds)(
                    len(x_l),
                    x_l.as_mut_ptr(),
                    x_u.as_mut_ptr(),
                    len(g_l),
                    g_l.as_mut_ptr(),
                    g_u.as_mut_ptr(),
                    *ud,
                ) != 0
            }
        },
        move |ud, x, new_x, obj| unsafe {
            (raw.eval_f)(len(x), x.as_ptr(), c_bool(new_x), obj, *ud) != 0
        },
        move |ud, x, new_x, grad_f| unsafe {
            (raw.eval_grad_f)(len(x), x.as_ptr(), c_bool(new_x), grad_f.as_mut_ptr(), *ud) != 0
        },
        move |ud, x, new_x, g| unsafe {
            (raw.eval_g)(len(x), x.as_ptr(), c_bool(new_x), len(g), g.as_mut_ptr(), *ud) != 0
        },
        move |ud, d, x, new_x, request| {
            let (rows, cols, values, nnz) = lower_request(request);
            unsafe {
                (raw.eval_jac_g)(
                    dim(d.n),
                    input_ptr(x),
                    c_bool(new_x),
                    dim(d.m),
                    nnz,
                    rows,
                    cols,
                    values,
                    *ud,
                ) != 0
            }
        },
    );

    if let Some(eval_h) = raw.eval_h {
        set = set.with_hessian(move |ud, d, x, new_x, weights, request| {
            let (rows, cols, values, nnz) = lower_request(request);
            unsafe {
                eval_h(
                    dim(d.n),
                    input_ptr(x),
                    c_bool(new_x),
                    weights.obj_factor,
                    dim(d.m),
                    input_ptr(weights.lambda),
                    c_bool(weights.new_lambda),
                    nnz,
                    rows,
                    cols,
                    values,
                    *ud,
                ) != 0
            }
        });
    }

    if let Some(scaling) = raw.scaling {
        set = set.with_scaling(move |ud, params| {
            let mut use_x_scaling = c_bool(params.use_x_scaling);
            let mut use_g_scaling = c_bool(params.use_g_scaling);
            let ok = unsafe {
                scaling(
                    &mut params.obj_scaling,
                    &mut use_x_scaling,
                    len(params.x_scaling),
                    params.x_scaling.as_mut_ptr(),
                    &mut use_g_scaling,
                    len(params.g_scaling),
                    params.g_scaling.as_mut_ptr(),
                    *ud,
                ) != 0
            };
            params.use_x_scaling = use_x_scaling != 0;
            params.use_g_scaling = use_g_scaling != 0;
            ok
        });
    }

    if let Some(intermediate) = raw.intermediate {
        set = set.with_intermediate(move |ud, stats| unsafe {
            intermediate(
                stats.mode,
                stats.iter,
                stats.obj_value,
                stats.inf_pr,
                stats.inf_du,
                stats.mu,
                stats.d_norm,
                stats.regularization_size,
                stats.alpha_du,
                stats.alpha_pr,
                stats.ls_trials,
                *ud,
            ) != 0
        });
    }

    set
}

/// Split a sparse request into the NULL-or-buffer pointers of the C protocol.
fn lower_request(
    request: SparseRequest<'_>,
) -> (*mut Index, *mut Index, *mut Number, Index) {
    match request {
        SparseRequest::Structure { rows, cols } => {
            let nnz = len(rows);
            (rows.as_mut_ptr(), cols.as_mut_ptr(), ptr::null_mut(), nnz)
        }
        SparseRequest::Values(values) => {
            let nnz = len(values);
            (ptr::null_mut(), ptr::null_mut(), values.as_mut_ptr(), nnz)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use crate::types::InitFlags;

    unsafe extern "C" fn sizes(
        n: *mut Index,
        m: *mut Index,
        nnz_jac_g: *mut Index,
        nnz_h_lag: *mut Index,
        _user_data: UserDataPtr,
    ) -> Bool {
        *n = 1;
        *m = 0;
        *nnz_jac_g = 0;
        *nnz_h_lag = 1;
        1
    }

    unsafe extern "C" fn init(
        _n: Index,
        _init_x: Bool,
        x: *mut Number,
        _init_z: Bool,
        _z_l: *mut Number,
        _z_u: *mut Number,
        _m: Index,
        _init_lambda: Bool,
        _lambda: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        *x = 3.0;
        1
    }

    unsafe extern "C" fn bounds(
        _n: Index,
        _x_l: *mut Number,
        _x_u: *mut Number,
        _m: Index,
        _g_l: *mut Number,
        _g_u: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        1
    }

    unsafe extern "C" fn eval_f(
        _n: Index,
        x: *const Number,
        _new_x: Bool,
        obj_value: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        *obj_value = *x * *x;
        1
    }

    unsafe extern "C" fn eval_grad_f(
        _n: Index,
        _x: *const Number,
        _new_x: Bool,
        _grad_f: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        0
    }

    unsafe extern "C" fn eval_g(
        _n: Index,
        _x: *const Number,
        _new_x: Bool,
        _m: Index,
        _g: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        1
    }

    unsafe extern "C" fn eval_jac_g(
        _n: Index,
        _x: *const Number,
        _new_x: Bool,
        _m: Index,
        _nele_jac: Index,
        _i_row: *mut Index,
        _j_col: *mut Index,
        _values: *mut Number,
        _user_data: UserDataPtr,
    ) -> Bool {
        1
    }

    fn raw() -> RawCallbacks {
        RawCallbacks {
            sizes,
            init,
            bounds,
            eval_f,
            eval_grad_f,
            eval_g,
            eval_jac_g,
            eval_h: None,
            scaling: None,
            intermediate: None,
        }
    }

    #[test]
    fn test_unknown_index_style_fails_at_construction() {
        let result = unsafe { ProblemAdapter::from_raw(5, raw(), ptr::null_mut()) };
        assert!(matches!(result, Err(AdapterError::UnknownIndexStyle(5))));
    }

    #[test]
    fn test_raw_callbacks_forward_values_and_failures() {
        use crate::interface::NlpInterface;

        let mut adapter = unsafe { ProblemAdapter::from_raw(1, raw(), ptr::null_mut()) }.unwrap();
        assert_eq!(adapter.index_style(), IndexStyle::One);
        assert!(!adapter.has_hessian());

        let d = adapter.get_nlp_info().unwrap();
        assert_eq!((d.n, d.m, d.nnz_h_lag), (1, 0, 1));

        let mut x = [0.0];
        adapter
            .get_starting_point(
                InitFlags::primal_only(),
                StartingPoint {
                    x: &mut x,
                    z_l: &mut [0.0],
                    z_u: &mut [0.0],
                    lambda: &mut [],
                },
            )
            .unwrap();
        assert_eq!(x, [3.0]);
        assert_eq!(adapter.eval_f(&x, true).unwrap(), 9.0);

        let err = adapter.eval_grad_f(&x, false, &mut [0.0]).unwrap_err();
        assert!(err.is_recoverable());
    }
}

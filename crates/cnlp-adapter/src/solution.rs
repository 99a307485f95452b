//! Owned solution storage written once at finalization.

use crate::error::{AdapterError, AdapterResult};
use crate::types::{FinalPoint, Number};
use cnlp_sys::SolverReturn;
use serde::{Deserialize, Serialize};

/// Termination status reported by the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Locally optimal point found.
    Success,
    /// Maximum iterations exceeded.
    MaxiterExceeded,
    /// Maximum CPU time exceeded.
    CputimeExceeded,
    /// Search direction became too small.
    StopAtTinyStep,
    /// Point satisfying the "acceptable" tolerances found.
    StopAtAcceptablePoint,
    /// Converged to a point of local infeasibility.
    LocalInfeasibility,
    /// The intermediate callback requested termination.
    UserRequestedStop,
    /// Feasible point found (square problems).
    FeasiblePointFound,
    /// Iterates seem to be diverging.
    DivergingIterates,
    /// Restoration phase failed.
    RestorationFailure,
    /// Error in step computation.
    ErrorInStepComputation,
    /// NaN or Inf returned by a callback.
    InvalidNumberDetected,
    /// Not enough degrees of freedom.
    TooFewDegreesOfFreedom,
    /// Invalid option.
    InvalidOption,
    /// Out of memory.
    OutOfMemory,
    /// Internal error.
    InternalError,
    /// No status recorded.
    Unassigned,
}

impl SolveStatus {
    /// Check if this status represents an optimal or acceptable point.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SolveStatus::Success | SolveStatus::StopAtAcceptablePoint
        )
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Success => write!(f, "success"),
            SolveStatus::MaxiterExceeded => write!(f, "maxiter_exceeded"),
            SolveStatus::CputimeExceeded => write!(f, "cputime_exceeded"),
            SolveStatus::StopAtTinyStep => write!(f, "stop_at_tiny_step"),
            SolveStatus::StopAtAcceptablePoint => write!(f, "stop_at_acceptable_point"),
            SolveStatus::LocalInfeasibility => write!(f, "local_infeasibility"),
            SolveStatus::UserRequestedStop => write!(f, "user_requested_stop"),
            SolveStatus::FeasiblePointFound => write!(f, "feasible_point_found"),
            SolveStatus::DivergingIterates => write!(f, "diverging_iterates"),
            SolveStatus::RestorationFailure => write!(f, "restoration_failure"),
            SolveStatus::ErrorInStepComputation => write!(f, "error_in_step_computation"),
            SolveStatus::InvalidNumberDetected => write!(f, "invalid_number_detected"),
            SolveStatus::TooFewDegreesOfFreedom => write!(f, "too_few_degrees_of_freedom"),
            SolveStatus::InvalidOption => write!(f, "invalid_option"),
            SolveStatus::OutOfMemory => write!(f, "out_of_memory"),
            SolveStatus::InternalError => write!(f, "internal_error"),
            SolveStatus::Unassigned => write!(f, "unassigned"),
        }
    }
}

impl From<SolverReturn> for SolveStatus {
    fn from(status: SolverReturn) -> Self {
        match status {
            SolverReturn::Success => SolveStatus::Success,
            SolverReturn::MaxiterExceeded => SolveStatus::MaxiterExceeded,
            SolverReturn::CputimeExceeded => SolveStatus::CputimeExceeded,
            SolverReturn::StopAtTinyStep => SolveStatus::StopAtTinyStep,
            SolverReturn::StopAtAcceptablePoint => SolveStatus::StopAtAcceptablePoint,
            SolverReturn::LocalInfeasibility => SolveStatus::LocalInfeasibility,
            SolverReturn::UserRequestedStop => SolveStatus::UserRequestedStop,
            SolverReturn::FeasiblePointFound => SolveStatus::FeasiblePointFound,
            SolverReturn::DivergingIterates => SolveStatus::DivergingIterates,
            SolverReturn::RestorationFailure => SolveStatus::RestorationFailure,
            SolverReturn::ErrorInStepComputation => SolveStatus::ErrorInStepComputation,
            SolverReturn::InvalidNumberDetected => SolveStatus::InvalidNumberDetected,
            SolverReturn::TooFewDegreesOfFreedom => SolveStatus::TooFewDegreesOfFreedom,
            SolverReturn::InvalidOption => SolveStatus::InvalidOption,
            SolverReturn::OutOfMemory => SolveStatus::OutOfMemory,
            SolverReturn::InternalError => SolveStatus::InternalError,
            SolverReturn::Unassigned => SolveStatus::Unassigned,
        }
    }
}

impl From<SolveStatus> for SolverReturn {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Success => SolverReturn::Success,
            SolveStatus::MaxiterExceeded => SolverReturn::MaxiterExceeded,
            SolveStatus::CputimeExceeded => SolverReturn::CputimeExceeded,
            SolveStatus::StopAtTinyStep => SolverReturn::StopAtTinyStep,
            SolveStatus::StopAtAcceptablePoint => SolverReturn::StopAtAcceptablePoint,
            SolveStatus::LocalInfeasibility => SolverReturn::LocalInfeasibility,
            SolveStatus::UserRequestedStop => SolverReturn::UserRequestedStop,
            SolveStatus::FeasiblePointFound => SolverReturn::FeasiblePointFound,
            SolveStatus::DivergingIterates => SolverReturn::DivergingIterates,
            SolveStatus::RestorationFailure => SolverReturn::RestorationFailure,
            SolveStatus::ErrorInStepComputation => SolverReturn::ErrorInStepComputation,
            SolveStatus::InvalidNumberDetected => SolverReturn::InvalidNumberDetected,
            SolveStatus::TooFewDegreesOfFreedom => SolverReturn::TooFewDegreesOfFreedom,
            SolveStatus::InvalidOption => SolverReturn::InvalidOption,
            SolveStatus::OutOfMemory => SolverReturn::OutOfMemory,
            SolveStatus::InternalError => SolverReturn::InternalError,
            SolveStatus::Unassigned => SolverReturn::Unassigned,
        }
    }
}

/// Final primal-dual point, copied out of the optimizer's buffers.
///
/// Variable-sized vectors have length n, constraint-sized vectors length m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    status: SolveStatus,
    objective_value: Number,
    primal_variables: Vec<Number>,
    lower_bound_multipliers: Vec<Number>,
    upper_bound_multipliers: Vec<Number>,
    constraint_values: Vec<Number>,
    constraint_multipliers: Vec<Number>,
}

impl SolutionRecord {
    fn empty() -> Self {
        Self {
            status: SolveStatus::Unassigned,
            objective_value: Number::NAN,
            primal_variables: Vec::new(),
            lower_bound_multipliers: Vec::new(),
            upper_bound_multipliers: Vec::new(),
            constraint_values: Vec::new(),
            constraint_multipliers: Vec::new(),
        }
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn objective_value(&self) -> Number {
        self.objective_value
    }

    pub fn primal_variables(&self) -> &[Number] {
        &self.primal_variables
    }

    pub fn lower_bound_multipliers(&self) -> &[Number] {
        &self.lower_bound_multipliers
    }

    pub fn upper_bound_multipliers(&self) -> &[Number] {
        &self.upper_bound_multipliers
    }

    /// Lower and upper bound multipliers as a pair.
    pub fn bound_multipliers(&self) -> (&[Number], &[Number]) {
        (&self.lower_bound_multipliers, &self.upper_bound_multipliers)
    }

    pub fn constraint_values(&self) -> &[Number] {
        &self.constraint_values
    }

    pub fn constraint_multipliers(&self) -> &[Number] {
        &self.constraint_multipliers
    }

    pub fn num_variables(&self) -> usize {
        self.primal_variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraint_values.len()
    }
}

/// One-shot solution slot: optionally pre-sized, written by finalize, then read-only.
#[derive(Debug)]
pub(crate) struct SolutionStore {
    record: SolutionRecord,
    sized_for: Option<(usize, usize)>,
    finalized: bool,
}

impl SolutionStore {
    pub(crate) fn new() -> Self {
        Self {
            record: SolutionRecord::empty(),
            sized_for: None,
            finalized: false,
        }
    }

    pub(crate) fn sized_for(&self) -> Option<(usize, usize)> {
        self.sized_for
    }

    pub(crate) fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Size storage for `n` variables and `m` constraints ahead of finalize.
    pub(crate) fn preallocate(&mut self, n: usize, m: usize) -> AdapterResult<()> {
        if self.finalized {
            return Err(AdapterError::AlreadyFinalized);
        }
        let r = &mut self.record;
        for v in [
            &mut r.primal_variables,
            &mut r.lower_bound_multipliers,
            &mut r.upper_bound_multipliers,
        ] {
            v.clear();
            v.resize(n, 0.0);
        }
        for v in [&mut r.constraint_values, &mut r.constraint_multipliers] {
            v.clear();
            v.resize(m, 0.0);
        }
        self.sized_for = Some((n, m));
        Ok(())
    }

    /// Copy the final point into owned storage.
    pub(crate) fn finalize(
        &mut self,
        status: SolveStatus,
        point: &FinalPoint<'_>,
    ) -> AdapterResult<()> {
        if self.finalized {
            return Err(AdapterError::AlreadyFinalized);
        }

        let n = point.x.len();
        let m = point.g.len();
        check_len("z_l", point.z_l.len(), n)?;
        check_len("z_u", point.z_u.len(), n)?;
        check_len("lambda", point.lambda.len(), m)?;
        if let Some((sized_n, sized_m)) = self.sized_for {
            check_len("x", n, sized_n)?;
            check_len("g", m, sized_m)?;
        }

        let r = &mut self.record;
        for (dst, src) in [
            (&mut r.primal_variables, point.x),
            (&mut r.lower_bound_multipliers, point.z_l),
            (&mut r.upper_bound_multipliers, point.z_u),
            (&mut r.constraint_values, point.g),
            (&mut r.constraint_multipliers, point.lambda),
        ] {
            dst.clear();
            dst.extend_from_slice(src);
        }
        r.status = status;
        r.objective_value = point.obj_value;

        self.sized_for = Some((n, m));
        self.finalized = true;
        Ok(())
    }

    /// Forget the stored solution, keeping allocations for the next solve.
    pub(crate) fn reset(&mut self) {
        self.finalized = false;
        self.record.status = SolveStatus::Unassigned;
        self.record.objective_value = Number::NAN;
    }

    pub(crate) fn record(&self) -> AdapterResult<&SolutionRecord> {
        if self.finalized {
            Ok(&self.record)
        } else {
            Err(AdapterError::SolutionUnavailable)
        }
    }

    pub(crate) fn into_record(self) -> AdapterResult<SolutionRecord> {
        if self.finalized {
            Ok(self.record)
        } else {
            Err(AdapterError::SolutionUnavailable)
        }
    }
}

/// Reject a buffer whose length differs from the expected dimension.
pub(crate) fn check_len(
    buffer: &'static str,
    actual: usize,
    expected: usize,
) -> AdapterResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(AdapterError::BufferLength {
            buffer,
            expected,
            actual,
        })
    }
}

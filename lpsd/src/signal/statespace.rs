//! Discrete-time linear state-space simulation.

use crate::kernel::{
    read_exact, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
};
use crate::signal::traits::StateSpacePropagate;
use nalgebra::{DMatrix, DVector};

/// Model matrices of `x[k+1] = A x[k] + B u[k]`, `y[k] = C x[k] + D u[k]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSpaceConfig {
    /// State transition, `n x n`.
    pub a: DMatrix<f64>,
    /// Input to state, `n x m`.
    pub b: DMatrix<f64>,
    /// State to output, `p x n`.
    pub c: DMatrix<f64>,
    /// Input feedthrough, `p x m`.
    pub d: DMatrix<f64>,
}

/// Simulated output samples and the state after the last sample.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceOutput {
    /// Outputs, one column per input sample (`p x N`).
    pub outputs: DMatrix<f64>,
    /// State following the final input sample.
    pub final_state: DVector<f64>,
}

/// Validated state-space model.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpaceKernel {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    d: DMatrix<f64>,
}

impl StateSpaceKernel {
    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.a.nrows()
    }

    /// Number of inputs.
    pub fn n_inputs(&self) -> usize {
        self.b.ncols()
    }

    /// Number of outputs.
    pub fn n_outputs(&self) -> usize {
        self.c.nrows()
    }
}

fn check_shape(
    arg: &'static str,
    m: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> Result<(), ConfigError> {
    if m.nrows() != rows {
        return Err(ConfigError::LengthMismatch {
            arg,
            expected: rows,
            got: m.nrows(),
        });
    }
    if m.ncols() != cols {
        return Err(ConfigError::LengthMismatch {
            arg,
            expected: cols,
            got: m.ncols(),
        });
    }
    Ok(())
}

impl KernelLifecycle for StateSpaceKernel {
    type Config = StateSpaceConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let n = config.a.nrows();
        let m = config.b.ncols();
        let p = config.c.nrows();
        if n == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "a",
                reason: "model must have at least one state",
            });
        }
        check_shape("a", &config.a, n, n)?;
        check_shape("b", &config.b, n, m)?;
        check_shape("c", &config.c, p, n)?;
        check_shape("d", &config.d, p, m)?;
        tracing::debug!(states = n, inputs = m, outputs = p, "configured state-space model");
        Ok(Self {
            a: config.a,
            b: config.b,
            c: config.c,
            d: config.d,
        })
    }
}

impl StateSpacePropagate for StateSpaceKernel {
    fn run<I>(
        &self,
        initial_state: &I,
        inputs: &DMatrix<f64>,
    ) -> Result<StateSpaceOutput, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x0 = read_exact(initial_state, "initial_state", self.n_states())?;
        if inputs.nrows() != self.n_inputs() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "inputs",
                expected: self.n_inputs(),
                got: inputs.nrows(),
            });
        }

        let mut state = DVector::from_column_slice(x0);
        let mut outputs = DMatrix::zeros(self.n_outputs(), inputs.ncols());
        for (k, u) in inputs.column_iter().enumerate() {
            let y = &self.c * &state + &self.d * &u;
            outputs.set_column(k, &y);
            state = &self.a * &state + &self.b * &u;
        }

        Ok(StateSpaceOutput {
            outputs,
            final_state: state,
        })
    }
}

///
/// Drive the model `(a, b, c, d)` from `x0` with `inputs`, one column per
/// sample.
///
/// ```
/// use lpsd::signal::ssm_propagate;
/// use nalgebra::DMatrix;
///
/// // discrete integrator
/// let one = DMatrix::from_element(1, 1, 1.0);
/// let zero = DMatrix::zeros(1, 1);
/// let u = DMatrix::from_element(1, 4, 1.0);
/// let out = ssm_propagate(&one, &one, &one, &zero, &[0.0], &u).unwrap();
/// assert_eq!(out.outputs.as_slice(), &[0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(out.final_state[0], 4.0);
/// ```
///
pub fn ssm_propagate(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    c: &DMatrix<f64>,
    d: &DMatrix<f64>,
    x0: &[f64],
    inputs: &DMatrix<f64>,
) -> Result<StateSpaceOutput, ExecInvariantViolation> {
    let kernel = StateSpaceKernel::try_new(StateSpaceConfig {
        a: a.clone(),
        b: b.clone(),
        c: c.clone(),
        d: d.clone(),
    })?;
    kernel.run(x0, inputs)
}

//! Numerical helpers shared by the model and the optimizer.

pub mod finite_difference;
pub mod linear_solver;
pub mod matrix_convert;

pub use finite_difference::{uses_log_domain, JacobianBuilder};
pub use linear_solver::{solve_general, solve_symmetric, LinearSolution, SolveMethod};
pub use matrix_convert::{
    nalgebra_to_ndarray, nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};

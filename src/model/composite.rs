//! Composite-reservoir multi-fractured horizontal well.
//!
//! The well sits in an inner dual-porosity zone of dimensionless radius `rmD`
//! surrounded by an outer homogeneous zone. `nf` infinite-conductivity
//! fractures of dimensionless half-length `LfD` are spread evenly along the
//! well. In Laplace space the fracture fluxes follow from an influence system
//! closed by a unit total-rate row; wellbore storage and skin are applied to
//! the resulting wellbore pressure before Stehfest inversion.

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::derivative::{bourdet_derivative, MODEL_DERIVATIVE_WINDOW};
use crate::error::Result;
use crate::model::bessel::{bessel_i0_scaled, bessel_i1_scaled, bessel_k0, bessel_k1};
use crate::model::quadrature::{integrate, DEFAULT_MAX_DEPTH, DEFAULT_TOLERANCE};
use crate::model::stehfest::StehfestInverter;
use crate::model::units::{dimensionless_time, log_time_steps, pressure_scale};
use crate::model::{
    Degeneracy, ForwardModel, ModelCurve, ModelType, Precision, DEFAULT_GRID_DECADES,
    DEFAULT_GRID_POINTS,
};
use crate::parameters::{ParamKey, ParameterMap};
use crate::utils::linear_solver::solve_general;

/// Dimensionless times at or below this evaluate to zero pressure.
const MIN_DIMENSIONLESS_TIME: f64 = 1e-12;

/// Floor on the magnitude of the interface-coefficient denominator.
const MIN_INTERFACE_DENOMINATOR: f64 = 1e-100;

/// Floor on Bessel arguments inside the fracture kernel.
const MIN_KERNEL_ARGUMENT: f64 = 1e-10;

/// Exponents below this make the outer-zone kernel term negligible.
const MIN_KERNEL_EXPONENT: f64 = -700.0;

/// Storage or skin magnitudes below this are treated as absent.
const MIN_STORAGE_SKIN: f64 = 1e-12;

/// Fracture centres are spread over this fraction of the half well length.
const FRACTURE_SPAN: f64 = 0.9;

const MAX_FRACTURES: usize = 100;

/// Forward model of a multi-fractured horizontal well in a radial composite
/// reservoir.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeFracturedHorizontal;

/// Dimensionless fracture centres along the well, evenly spaced on
/// `[-0.9, 0.9]`. A single fracture sits at the origin.
pub fn fracture_positions(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = 2.0 * FRACTURE_SPAN / (count - 1) as f64;
            (0..count).map(|i| -FRACTURE_SPAN + step * i as f64).collect()
        }
    }
}

/// Fracture count from a parameter value: rounded and kept in `[1, 100]`.
fn fracture_count(value: f64) -> usize {
    let rounded = value.round();
    if rounded.is_finite() {
        rounded.clamp(1.0, MAX_FRACTURES as f64) as usize
    } else {
        1
    }
}

/// One Laplace-domain wellbore pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplaceSample {
    pub value: f64,
    /// The influence system needed the least-squares fallback.
    pub singular: bool,
}

/// Dimensionless inputs of the Laplace solution.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeInputs {
    /// Inner-to-outer permeability ratio `kf / km`.
    pub mobility_ratio: f64,
    pub half_length: f64,
    pub composite_radius: f64,
    pub inner_storativity: f64,
    pub outer_storativity: f64,
    pub interporosity: f64,
    pub storage: f64,
    pub skin: f64,
    pub fracture_positions: Vec<f64>,
}

impl CompositeInputs {
    pub fn from_map(params: &ParameterMap) -> Self {
        let kf = params.value_or_default(ParamKey::InnerPermeability);
        let km = params.value_or_default(ParamKey::OuterPermeability);
        Self {
            mobility_ratio: kf / km,
            half_length: params.value_or_default(ParamKey::FractureHalfLengthD),
            composite_radius: params.value_or_default(ParamKey::CompositeRadiusD),
            inner_storativity: params.value_or_default(ParamKey::InnerStorativity),
            outer_storativity: params.value_or_default(ParamKey::OuterStorativity),
            interporosity: params.value_or_default(ParamKey::InnerInterporosity),
            storage: params.value_or_default(ParamKey::WellboreStorage),
            skin: params.value_or_default(ParamKey::Skin),
            fracture_positions: fracture_positions(fracture_count(
                params.value_or_default(ParamKey::FractureCount),
            )),
        }
    }

    /// Wellbore pressure at Laplace abscissa `s`, storage and skin included.
    ///
    /// A fracture of non-positive length has no kernel; the sample is NaN so
    /// that the inversion zeroes and counts it.
    pub fn laplace_pressure(&self, s: f64) -> LaplaceSample {
        if self.half_length.is_nan() || self.half_length <= 0.0 {
            return LaplaceSample {
                value: f64::NAN,
                singular: false,
            };
        }

        let m12 = self.mobility_ratio;
        let lfd = self.half_length;
        let inner = self.inner_storativity
            + self.interporosity * self.outer_storativity
                / (self.interporosity + s * self.outer_storativity);
        let outer = m12 * self.outer_storativity;
        let gamma1 = (s * inner).sqrt();
        let gamma2 = (s * outer).sqrt();
        let arg1 = gamma1 * self.composite_radius;
        let arg2 = gamma2 * self.composite_radius;

        let k0_outer = bessel_k0(arg2);
        let k1_outer = bessel_k1(arg2);
        let numerator = m12 * gamma1 * bessel_k1(arg1) * k0_outer - gamma2 * bessel_k0(arg1) * k1_outer;
        let mut denominator =
            m12 * gamma1 * bessel_i1_scaled(arg1) * k0_outer + gamma2 * bessel_i0_scaled(arg1) * k1_outer;
        if denominator.abs() < MIN_INTERFACE_DENOMINATOR {
            denominator = MIN_INTERFACE_DENOMINATOR;
        }
        let interface = numerator / denominator;

        let kernel = |distance: f64| {
            let x = (gamma1 * distance).max(MIN_KERNEL_ARGUMENT);
            let exponent = x - arg1;
            let reflected = if exponent > MIN_KERNEL_EXPONENT {
                interface * bessel_i0_scaled(x) * exponent.exp()
            } else {
                0.0
            };
            bessel_k0(x) + reflected
        };

        // Positions are evenly spaced and the integration span is symmetric,
        // so entry (i, j) depends only on |i - j|.
        let positions = &self.fracture_positions;
        let nf = positions.len();
        let scale = 2.0 * m12 * lfd;
        let by_offset: Vec<f64> = (0..nf)
            .map(|offset| {
                let separation = positions[offset] - positions[0];
                integrate(
                    &|a: f64| kernel((separation - a).abs()),
                    -lfd,
                    lfd,
                    DEFAULT_TOLERANCE,
                    DEFAULT_MAX_DEPTH,
                ) / scale
            })
            .collect();

        let mut matrix = DMatrix::zeros(nf + 1, nf + 1);
        for i in 0..nf {
            for j in 0..nf {
                matrix[(i, j)] = by_offset[i.abs_diff(j)];
            }
            matrix[(i, nf)] = -1.0;
            matrix[(nf, i)] = s;
        }
        let mut rhs = DVector::zeros(nf + 1);
        rhs[nf] = 1.0;

        let (solution, method) = solve_general(matrix, &rhs);
        let mut pressure = solution[nf];

        if self.storage > MIN_STORAGE_SKIN || self.skin.abs() > MIN_STORAGE_SKIN {
            let skinned = s * pressure + self.skin;
            pressure = skinned / (s + self.storage * s * s * skinned);
        }

        LaplaceSample {
            value: pressure,
            singular: method.is_fallback(),
        }
    }
}

/// Bourdet derivative over the samples with a usable time. Skipped samples stay 0.
fn derivative_over_usable(time: &[f64], pressure: &[f64], usable: &[bool]) -> Vec<f64> {
    let indices: Vec<usize> = (0..time.len()).filter(|&i| usable[i]).collect();
    let kept_time: Vec<f64> = indices.iter().map(|&i| time[i]).collect();
    let kept_pressure: Vec<f64> = indices.iter().map(|&i| pressure[i]).collect();

    let mut derivative = vec![0.0; time.len()];
    let kept = bourdet_derivative(&kept_time, &kept_pressure, MODEL_DERIVATIVE_WINDOW);
    for (&i, d) in indices.iter().zip(kept) {
        derivative[i] = d;
    }
    derivative
}

impl ForwardModel for CompositeFracturedHorizontal {
    fn model_type(&self) -> ModelType {
        ModelType::CompositeFracturedHorizontal
    }

    fn compute_curve(
        &self,
        params: &ParameterMap,
        times: &[f64],
        precision: Precision,
    ) -> Result<ModelCurve> {
        let time = if times.is_empty() {
            log_time_steps(DEFAULT_GRID_POINTS, DEFAULT_GRID_DECADES.0, DEFAULT_GRID_DECADES.1)
        } else {
            times.to_vec()
        };

        let inverter = StehfestInverter::new(precision.stehfest_order())?;
        let inputs = CompositeInputs::from_map(params);

        let kf = params.value_or_default(ParamKey::InnerPermeability);
        let porosity = params.value_or_default(ParamKey::Porosity);
        let viscosity = params.value_or_default(ParamKey::Viscosity);
        let compressibility = params.value_or_default(ParamKey::Compressibility);
        let length = params.value_or_default(ParamKey::WellLength);
        let scale = pressure_scale(
            params.value_or_default(ParamKey::Rate),
            viscosity,
            params.value_or_default(ParamKey::VolumeFactor),
            kf,
            params.value_or_default(ParamKey::Thickness),
        );

        let mut diagnostics = Degeneracy::default();
        let mut pressure = Vec::with_capacity(time.len());
        let mut usable = Vec::with_capacity(time.len());
        for &t in &time {
            let td = dimensionless_time(t, kf, porosity, viscosity, compressibility, length);
            let valid = td.is_finite() && td > MIN_DIMENSIONLESS_TIME;
            usable.push(valid);
            if !valid {
                diagnostics.zeroed_times += 1;
                pressure.push(0.0);
                continue;
            }

            let mut singular = 0;
            let inversion = inverter.invert(
                |s| {
                    let sample = inputs.laplace_pressure(s);
                    if sample.singular {
                        singular += 1;
                    }
                    sample.value
                },
                td,
            );
            diagnostics.non_finite_samples += inversion.zeroed_samples;
            diagnostics.singular_systems += singular;

            let value = scale * inversion.value;
            if value.is_finite() {
                pressure.push(value);
            } else {
                diagnostics.zeroed_times += 1;
                pressure.push(0.0);
            }
        }

        if !diagnostics.is_clean() {
            debug!(
                "composite curve over {} times absorbed degeneracies: {:?}",
                time.len(),
                diagnostics
            );
        }

        let derivative = derivative_over_usable(&time, &pressure, &usable);
        Ok(ModelCurve {
            time,
            pressure,
            derivative,
            precision,
            diagnostics,
        })
    }
}

//! Aggregate gradation and blend optimization for concrete mix design.
//!
//! Given the gradation curves of several aggregates, [`optimize`] finds the
//! mixing proportions whose composite curve best matches two references built
//! from the maximum nominal size: the Power-45 ideal curve and the Tarantula
//! band on percent retained. The Shilstone factors and the compliance checks
//! then describe the chosen blend.
//!
//! - [`sieve`]: the fixed sieve stack
//! - [`curve`] and [`interpolation`]: validated percent-passing curves
//! - [`reference`]: Power-45 and Tarantula targets
//! - [`blend`]: proportion vectors and composite curves
//! - [`metrics`]: error scores and gradation quality
//! - [`optimizer`]: the constrained search
//! - [`shilstone`], [`haystack`], [`assessment`], [`sensitivity`]: diagnostics
//! - [`report`]: optimization and diagnostics in one call

pub mod assessment;
pub mod blend;
pub mod curve;
pub mod haystack;
pub mod interpolation;
pub mod metrics;
pub mod optimizer;
pub mod reference;
pub mod report;
pub mod sensitivity;
pub mod shilstone;
pub mod sieve;

pub use blend::{Blender, InvalidProportionsError, ProportionVector, blend};
pub use curve::{CurveError, GradationCurve};
pub use metrics::{ErrorScore, combined_error, power45_error, tarantula_error};
pub use optimizer::{
    OptimizationResult, OptimizationStatus, OptimizeError, OptimizerConfig, optimize,
};
pub use reference::{Band, ReferenceCurves, ReferenceError, TarantulaBand};
pub use report::{BlendDesign, DesignError, MixContext, design_blend};
pub use shilstone::{ShilstoneReport, ZoneClassification};
pub use sieve::{DomainError, Sieve};

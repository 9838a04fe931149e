use thiserror::Error;

use crate::{
    assessment::{ComplianceReport, assess_compliance, working_band},
    curve::GradationCurve,
    metrics::{GradationAssessment, assess_gradation},
    optimizer::{OptimizationResult, OptimizeError, OptimizerConfig, optimize},
    reference::{Band, ReferenceCurves, ReferenceError},
    shilstone::{ShilstoneReport, analyze},
    sieve::Sieve,
};

/// Mix inputs that fix the references and the Shilstone adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct MixContext {
    /// Maximum nominal aggregate size in millimetres.
    pub max_size_mm: f64,
    /// Cement content in kg/m³.
    pub cement_kg_m3: f64,
}

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("cement content must be finite and non-negative, got {0}")]
    Cement(f64),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Optimize(#[from] OptimizeError),
}

/// Everything known about an optimized blend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize))]
pub struct BlendDesign {
    pub references: ReferenceCurves,
    pub optimization: OptimizationResult,
    pub shilstone: ShilstoneReport,
    pub gradation: GradationAssessment,
    pub compliance: ComplianceReport,
    pub working_band: [Band; Sieve::COUNT],
}

/// Optimizes a blend and analyzes the resulting composite.
///
/// The Shilstone and compliance results describe the composite; they are
/// computed after the search and do not affect it.
///
/// # Errors
///
/// Returns an error if the context is unusable or the optimization fails.
/// An infeasible constraint set is reported in the result, not as an error.
pub fn design_blend(
    curves: &[GradationCurve],
    context: &MixContext,
    config: &OptimizerConfig,
) -> Result<BlendDesign, DesignError> {
    if !context.cement_kg_m3.is_finite() || context.cement_kg_m3 < 0.0 {
        return Err(DesignError::Cement(context.cement_kg_m3));
    }

    let references = ReferenceCurves::new(context.max_size_mm)?;
    let optimization = optimize(curves, &references, config)?;
    let composite = &optimization.composite;

    Ok(BlendDesign {
        shilstone: analyze(composite, context.cement_kg_m3),
        gradation: assess_gradation(composite, references.ideal()),
        compliance: assess_compliance(composite, references.tarantula()),
        working_band: working_band(composite),
        references,
        optimization,
    })
}

//! Composite score, confidence and error band.

use tracing::warn;

use super::explain::explanation;
use super::{
    Components, ComputationFailure, Direction, NSamples, Regime, Verdict, VerdictInputs,
    VerdictParams, VERDICT_VERSION,
};
use crate::features::sign;
use crate::window::round_dp;

/// Components closer to zero than this agree with any score.
const AGREEMENT_EPS: f64 = 1e-6;

/// Zero means "not available yet"; substitute the default.
fn or_default(value: f64, default: f64) -> f64 {
    if value == 0.0 {
        default
    } else {
        value
    }
}

fn check(field: &'static str, value: f64) -> Result<f64, ComputationFailure> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComputationFailure::NonFiniteInput { field, value })
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Trailing return over up to `lookback` bars, and the last close.
fn momentum_return(inputs: &VerdictInputs<'_>, lookback: usize) -> Result<(f64, f64), ComputationFailure> {
    let rows = inputs.features;
    let Some(last) = rows.last() else {
        return Ok((0.0, check("spot_price", inputs.metrics.spot_price)?));
    };
    let last_close = check("close", last.bar.close)?;
    let n = lookback.min(rows.len() - 1);
    if n == 0 {
        return Ok((0.0, last_close));
    }
    let base = check("close", rows[rows.len() - 1 - n].bar.close)?;
    let ret = last_close / base - 1.0;
    Ok((if ret.is_finite() { ret } else { 0.0 }, last_close))
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn ordered(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min <= max
}

/// Reject parameters that would make a clamp or a divisor ill-defined.
pub(crate) fn check_params(params: &VerdictParams) -> Result<(), ComputationFailure> {
    let invalid = |msg: &str| Err(ComputationFailure::InvalidParams(msg.into()));
    if !(positive(params.momentum_clip) && positive(params.flow_scale) && positive(params.vix_divisor)) {
        return invalid("momentum_clip, flow_scale and vix_divisor must be positive and finite");
    }
    if !ordered(params.vol_scale_min, params.vol_scale_max) {
        return invalid("vol_scale_min must not exceed vol_scale_max");
    }
    if !ordered(params.realized_vol_min, params.realized_vol_max) {
        return invalid("realized_vol_min must not exceed realized_vol_max");
    }
    if !params.max_points_fraction.is_finite() || params.max_points_fraction < 0.0 {
        return invalid("max_points_fraction must be finite and non-negative");
    }
    if !params.rounding_step.is_finite() || params.rounding_step < 0.0 {
        return invalid("rounding_step must be finite and non-negative");
    }
    Ok(())
}

/// Compute the verdict, or report why it could not be computed.
pub fn compute_verdict(
    inputs: &VerdictInputs<'_>,
    params: &VerdictParams,
) -> Result<Verdict, ComputationFailure> {
    check_params(params)?;
    let m = inputs.metrics;

    // Momentum
    let (recent_return, last_close) = momentum_return(inputs, params.momentum_lookback)?;
    let vol_proxy = or_default(check("volatility_latest", m.volatility_latest)?, params.default_momentum_vol);
    let m_z = recent_return / vol_proxy.max(1e-9);
    let momentum = m_z.clamp(-params.momentum_clip, params.momentum_clip) / params.momentum_clip;

    // Flow
    let flow = (check("coordinated_flow", m.coordinated_flow)? / params.flow_scale).tanh();

    // Liquidity
    let mfc = check("mfc_latest", m.mfc_latest)?;
    let depth = check("liquidity_depth_proxy", m.liquidity_depth_proxy)?;
    let liquidity = ((1.0 - mfc) * (1.0 - depth) * 2.0 - 1.0).clamp(-1.0, 1.0);

    // Execution cost from the smallest notional
    let smallest = inputs.slippage.smallest();
    let cost = match smallest
        .filter(|s| !s.sample.is_empty())
        .map(|s| s.median)
        .filter(|med| med.is_finite())
    {
        Some(median) => {
            let scaled = median * 100.0;
            -logistic((scaled - params.cost_center_pct) * params.cost_steepness).clamp(0.0, 1.0)
        }
        None => 0.0,
    };

    // ML adjustments
    let regime = inputs.ml_regime.map(|label| Regime::from_label(label).ok_or(label));
    let ml_regime = match regime {
        Some(Ok(r)) => params.regime_penalty(r),
        _ => 0.0,
    };
    let predicted = smallest.and_then(|s| s.predicted_median);
    let ml_slippage = match predicted {
        Some(p) => -check("predicted_median", p)? * params.ml_slippage_scale,
        None => 0.0,
    };
    let ml_enhanced = regime.is_some() || predicted.is_some();

    let score = params.w_momentum * momentum
        + params.w_flow * flow
        + params.w_liquidity * liquidity
        + params.w_cost * cost
        + params.w_ml_regime * ml_regime
        + params.w_ml_slippage * ml_slippage;
    if !score.is_finite() {
        return Err(ComputationFailure::NonFiniteScore(score));
    }

    // Scale
    let vix = or_default(check("vix_latest", m.vix_latest)?, params.default_vix);
    let vol_scale = (vix / params.vix_divisor).clamp(params.vol_scale_min, params.vol_scale_max);
    let realized_vol = or_default(m.volatility_latest, params.default_realized_vol)
        .clamp(params.realized_vol_min, params.realized_vol_max);
    let atr = last_close * realized_vol;
    let mut points = sign(score) * score.abs() * atr.max(1.0) * vol_scale;

    // Confidence
    let strength = logistic(score.abs() * params.confidence_alpha);
    let slippage_samples = smallest.map(|s| s.n_samples()).unwrap_or(0);
    let (data_conf, data_quality) = params.data_tier(slippage_samples);
    let base = [momentum, flow, liquidity, cost];
    let agrees = base
        .iter()
        .filter(|c| {
            c.abs() < AGREEMENT_EPS || score.abs() < AGREEMENT_EPS || sign(**c) == sign(score)
        })
        .count();
    let consistency = agrees as f64 / base.len() as f64;
    let confidence = (strength * data_conf * consistency).clamp(0.0, 1.0);

    let error = if confidence > 0.0 {
        (0.5 * atr).max(points.abs() * 0.5 / confidence)
    } else {
        2.0_f64.max(points.abs() * 1.5)
    };

    // Published score is rounded; the band applies to what consumers see.
    let published_score = round_dp(score, 4);
    let direction = Direction::from_score(published_score, params.neutral_band);

    // Bound and coarsen points
    let max_points = (last_close * params.max_points_fraction).abs();
    points = points.clamp(-max_points, max_points);
    if confidence < params.low_confidence && params.rounding_step > 0.0 {
        points = (points / params.rounding_step).round() * params.rounding_step;
        points = points.clamp(-max_points, max_points);
    }
    let mut points_out = round_dp(points.abs(), 2);
    if points_out > max_points {
        points_out = (max_points * 100.0).floor() / 100.0;
    }

    let n_samples = NSamples {
        slippage: slippage_samples,
        monte: inputs
            .monte_carlo
            .and_then(|t| t.smallest())
            .map(|s| s.n_samples())
            .unwrap_or(0),
        features: inputs.features.len(),
    };

    Ok(Verdict {
        direction,
        points: points_out,
        error: round_dp(error, 2),
        confidence: round_dp(confidence, 2),
        score: published_score,
        components: Components {
            momentum: round_dp(momentum, 4),
            flow: round_dp(flow, 4),
            liquidity: round_dp(liquidity, 4),
            impact_cost: round_dp(cost, 4),
            volatility_scale: round_dp(vol_scale, 4),
            ml_regime_contribution: round_dp(ml_regime, 4),
            ml_slippage_contribution: round_dp(ml_slippage, 4),
        },
        explanation: explanation(
            score,
            direction,
            confidence,
            params.sizing_confidence,
            regime,
            predicted,
        ),
        data_quality,
        n_samples,
        ml_enhanced,
        version: VERDICT_VERSION.to_string(),
        params: Some(params.clone()),
    })
}

/// Like [`compute_verdict`], but a failure is logged and replaced with
/// [`Verdict::neutral_fallback`].
pub fn compute_verdict_or_neutral(inputs: &VerdictInputs<'_>, params: &VerdictParams) -> Verdict {
    compute_verdict(inputs, params).unwrap_or_else(|e| {
        warn!(error = %e, "verdict computation failed, using neutral fallback");
        Verdict::neutral_fallback()
    })
}

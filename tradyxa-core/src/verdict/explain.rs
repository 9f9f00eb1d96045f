//! Templated verdict explanation.

use super::{Direction, Regime};

/// One-sentence summary of the call plus a sizing recommendation.
pub fn explanation(
    score: f64,
    direction: Direction,
    confidence: f64,
    sizing_confidence: f64,
    regime: Option<Result<Regime, i64>>,
    predicted_slippage: Option<f64>,
) -> String {
    let magnitude = match score.abs() {
        s if s < 0.2 => "mild",
        s if s < 0.5 => "moderate",
        _ => "strong",
    };

    let regime_text = match regime {
        Some(Ok(r)) => format!(" ML regime: {}.", r.as_str()),
        Some(Err(_)) => " ML regime: UNKNOWN.".to_string(),
        None => String::new(),
    };
    let slippage_text = predicted_slippage
        .map(|p| format!(" Predicted slippage: {:.2}%.", p * 100.0))
        .unwrap_or_default();

    let recommendation = if confidence > sizing_confidence {
        "slice into 3 TWAPs"
    } else {
        "reduce size and wait for better conditions"
    };

    format!(
        "Aggregated momentum + flow produce a {magnitude} {} bias.{regime_text}{slippage_text} Recommended: {recommendation}.",
        direction.as_str().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sentence() {
        let text = explanation(0.1, Direction::Up, 0.3, 0.5, None, None);
        assert_eq!(
            text,
            "Aggregated momentum + flow produce a mild up bias. Recommended: reduce size and wait for better conditions."
        );
    }

    #[test]
    fn with_ml_context() {
        let text = explanation(-0.6, Direction::Down, 0.8, 0.5, Some(Ok(Regime::High)), Some(0.0123));
        assert_eq!(
            text,
            "Aggregated momentum + flow produce a strong down bias. ML regime: HIGH. Predicted slippage: 1.23%. Recommended: slice into 3 TWAPs."
        );
    }

    #[test]
    fn unknown_regime_label() {
        let text = explanation(0.3, Direction::Up, 0.5, 0.5, Some(Err(9)), None);
        assert!(text.contains("moderate up bias. ML regime: UNKNOWN."));
        assert!(text.ends_with("wait for better conditions."));
    }
}

use super::aggregate::SmoothingFactor;
use super::category::Category;
use super::config::ScoringConfig;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Validate policy name
    let policy = config.policy.as_deref().map(str::trim);
    match policy {
        None | Some("running-average") | Some("ema") => {}
        Some(other) => errors.push(format!(
            "scoring.policy: unknown policy '{}' (expected running-average or ema)",
            other
        )),
    }

    // Validate alpha
    if let Some(alpha) = config.alpha {
        if let Err(e) = SmoothingFactor::new(alpha) {
            errors.push(format!("scoring.alpha: {}", e));
        }
        if policy != Some("ema") {
            errors.push("scoring.alpha: only applies when scoring.policy is 'ema'".to_string());
        }
    }

    // Validate default weights
    if let Some(ref weights) = config.default_weights {
        let mut total = 0.0;
        for (key, value) in weights {
            if let Err(e) = key.parse::<Category>() {
                errors.push(format!("scoring.default_weights.{}: {}", key, e));
            }
            if !value.is_finite() || *value < 0.0 {
                errors.push(format!(
                    "scoring.default_weights.{}: must be a non-negative number, got {}",
                    key, value
                ));
            } else {
                total += value;
            }
        }
        if total <= 0.0 {
            errors.push("scoring.default_weights: weights must have a positive sum".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

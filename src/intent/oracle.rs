//! Reward oracle: the external predictor consulted during ranking.
//!
//! The core only needs a scalar reward for a sparse activation (the indices
//! of the prototypes an input lights up). Any world model, remote service or
//! closure can sit behind [`RewardOracle`].

use crate::memory::Skill;
use thiserror::Error;

/// Failure reported by an oracle. The ranker absorbs these as zero reward.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle failed: {0}")]
    Failed(String),

    #[error("oracle timed out")]
    TimedOut,
}

/// Scalar reward predictor over activated prototype indices.
pub trait RewardOracle {
    /// Predicted immediate reward for the activation.
    fn predict(&self, activated: &[usize]) -> Result<f64, OracleError>;

    /// Discounted reward over a short rollout.
    ///
    /// The default treats the state as static and sums
    /// `discount^t * predict(activated)` for `t` in `0..horizon`. Oracles
    /// with a transition model should override it; `skill` is the action
    /// being evaluated when one is known.
    fn simulate_rollout(
        &self,
        activated: &[usize],
        horizon: usize,
        discount: f64,
        skill: Option<&Skill>,
    ) -> Result<f64, OracleError> {
        let _ = skill;
        let reward = self.predict(activated)?;
        Ok((0..horizon)
            .map(|t| discount.powi(t as i32) * reward)
            .sum())
    }
}

impl<F> RewardOracle for F
where
    F: Fn(&[usize]) -> Result<f64, OracleError>,
{
    fn predict(&self, activated: &[usize]) -> Result<f64, OracleError> {
        self(activated)
    }
}

/// Oracle that predicts the same reward for everything.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantOracle(pub f64);

impl RewardOracle for ConstantOracle {
    fn predict(&self, _activated: &[usize]) -> Result<f64, OracleError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rollout_discounts() {
        let oracle = ConstantOracle(1.0);
        let r = oracle.simulate_rollout(&[1, 2], 3, 0.9, None).expect("ok");
        assert!((r - 2.71).abs() < 1e-12);
        assert_eq!(oracle.simulate_rollout(&[], 0, 0.9, None).expect("ok"), 0.0);
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |activated: &[usize]| -> Result<f64, OracleError> {
            Ok(activated.len() as f64 / 10.0)
        };
        assert_eq!(oracle.predict(&[1, 2, 3]).expect("ok"), 0.3);

        let failing = |_: &[usize]| -> Result<f64, OracleError> { Err(OracleError::TimedOut) };
        assert!(failing.simulate_rollout(&[0], 3, 0.9, None).is_err());
    }
}

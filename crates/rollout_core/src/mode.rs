//! Rollout modes.

use serde::{Deserialize, Serialize};

/// Which phase of the policy loop a rollout belongs to.
///
/// Forwarded unchanged to the rollout cluster, which may pick different
/// sampling settings per mode.
///
/// ```
/// use rollout_core::RolloutMode;
///
/// assert_eq!(RolloutMode::default(), RolloutMode::Train);
/// assert_eq!("eval".parse::<RolloutMode>().unwrap(), RolloutMode::Eval);
/// assert_eq!(RolloutMode::Eval.to_string(), "eval");
/// ```
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RolloutMode {
    /// Rollouts that feed policy updates.
    #[default]
    Train,
    /// Rollouts used only for evaluation.
    Eval,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_mode_round_trips_through_its_name() {
        for mode in RolloutMode::iter() {
            assert_eq!(mode.to_string().parse::<RolloutMode>().unwrap(), mode);
        }
        assert_eq!(RolloutMode::default(), RolloutMode::Train);
        assert!("TRAIN".parse::<RolloutMode>().is_err());
    }
}

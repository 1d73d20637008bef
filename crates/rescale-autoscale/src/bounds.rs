//! Replica bounds.

use rescale_core::ScalingPolicy;

/// Pull `desired` into `[min_replicas, max_replicas]`.
///
/// Assumes a validated policy (`min_replicas <= max_replicas`).
pub fn clamp(desired: u32, policy: &ScalingPolicy) -> u32 {
    desired.min(policy.max_replicas).max(policy.min_replicas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::decide;
    use rescale_core::{Strategy, UtilizationSample};

    fn bounded(min: u32, max: u32) -> ScalingPolicy {
        ScalingPolicy {
            min_replicas: min,
            max_replicas: max,
            ..Default::default()
        }
    }

    #[test]
    fn caps_at_max() {
        assert_eq!(clamp(15, &bounded(1, 10)), 10);
    }

    #[test]
    fn raises_to_min() {
        assert_eq!(clamp(0, &bounded(2, 10)), 2);
    }

    #[test]
    fn passes_values_in_range() {
        for n in 1..=10 {
            assert_eq!(clamp(n, &bounded(1, 10)), n);
        }
    }

    #[test]
    fn degenerate_range() {
        assert_eq!(clamp(0, &bounded(3, 3)), 3);
        assert_eq!(clamp(9, &bounded(3, 3)), 3);
    }

    #[test]
    fn decide_then_clamp_stays_in_bounds() {
        let usages = [0.0, 10.0, 34.9, 49.0, 69.9, 70.0, 70.1, 84.0, 84.1, 100.0, 250.0];
        for strategy in Strategy::ALL {
            for (min, max) in [(0, 0), (0, 5), (1, 10), (2, 3), (4, 4)] {
                let policy = ScalingPolicy {
                    strategy,
                    min_replicas: min,
                    max_replicas: max,
                    ..Default::default()
                };
                for current in min..=max {
                    for cpu in usages {
                        for mem in usages {
                            let sample = UtilizationSample::new(cpu, mem);
                            let target = clamp(decide(current, &sample, &policy), &policy);
                            assert!(
                                (min..=max).contains(&target),
                                "{strategy} n={current} cpu={cpu} mem={mem} [{min},{max}] -> {target}"
                            );
                        }
                    }
                }
            }
        }
    }
}

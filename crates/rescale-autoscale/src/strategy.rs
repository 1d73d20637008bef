//! Strategy engine. Maps current scale and utilisation to a desired scale.
//!
//! Every function here is pure. The returned value is not bounded; callers
//! pass it through [`crate::bounds::clamp`].

use rescale_core::{ScalingPolicy, Strategy, UtilizationSample};

/// Compute the desired replica count for one service.
pub fn decide(current: u32, sample: &UtilizationSample, policy: &ScalingPolicy) -> u32 {
    let scale_fn: fn(u32, &UtilizationSample, &ScalingPolicy) -> u32 = match policy.strategy {
        Strategy::Balanced => balanced,
        Strategy::Performance => performance,
        Strategy::Efficiency => efficiency,
    };
    scale_fn(current, sample, policy)
}

/// One replica up or down.
fn balanced(current: u32, sample: &UtilizationSample, policy: &ScalingPolicy) -> u32 {
    let (cpu, mem) = (sample.cpu_percent, sample.mem_percent);

    if cpu > policy.cpu_threshold || mem > policy.mem_threshold {
        return current.saturating_add(1);
    }
    if cpu < policy.cpu_threshold * 0.7
        && mem < policy.mem_threshold * 0.7
        && current > policy.min_replicas
    {
        return current - 1;
    }
    current
}

/// Grow by half on any pressure, shrink by one only when usage is very low.
fn performance(current: u32, sample: &UtilizationSample, policy: &ScalingPolicy) -> u32 {
    let (cpu, mem) = (sample.cpu_percent, sample.mem_percent);

    if cpu > policy.cpu_threshold || mem > policy.mem_threshold {
        return scale_by(current, 1.5);
    }
    if cpu < policy.cpu_threshold * 0.5
        && mem < policy.mem_threshold * 0.5
        && current > policy.min_replicas
    {
        return current - 1;
    }
    current
}

/// Grow by one only under heavy load, shrink by a quarter otherwise.
///
/// The scale-down guard is `cpu < T || (mem < T && current > min)`: CPU
/// below threshold alone triggers the shrink, and only the memory half is
/// gated on `min_replicas`. Clamping still keeps the result in bounds.
fn efficiency(current: u32, sample: &UtilizationSample, policy: &ScalingPolicy) -> u32 {
    let (cpu, mem) = (sample.cpu_percent, sample.mem_percent);

    if cpu > policy.cpu_threshold * 1.2 || mem > policy.mem_threshold * 1.2 {
        return current.saturating_add(1);
    }
    if cpu < policy.cpu_threshold || (mem < policy.mem_threshold && current > policy.min_replicas) {
        return scale_by(current, 0.75);
    }
    current
}

/// `floor(current * factor)`, saturating at `u32::MAX`.
fn scale_by(current: u32, factor: f64) -> u32 {
    let scaled = (f64::from(current) * factor).floor();
    if scaled >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        scaled as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(strategy: Strategy) -> ScalingPolicy {
        ScalingPolicy {
            strategy,
            cpu_threshold: 70.0,
            mem_threshold: 70.0,
            min_replicas: 1,
            max_replicas: 10,
            ..Default::default()
        }
    }

    fn sample(cpu: f64, mem: f64) -> UtilizationSample {
        UtilizationSample::new(cpu, mem)
    }

    // ── balanced ───────────────────────────────────────────────────

    #[test]
    fn balanced_scales_up_on_cpu_pressure() {
        assert_eq!(decide(2, &sample(80.0, 50.0), &policy(Strategy::Balanced)), 3);
    }

    #[test]
    fn balanced_scales_up_on_memory_pressure() {
        assert_eq!(decide(2, &sample(10.0, 71.0), &policy(Strategy::Balanced)), 3);
    }

    #[test]
    fn balanced_scales_down_when_both_low() {
        assert_eq!(decide(3, &sample(40.0, 40.0), &policy(Strategy::Balanced)), 2);
    }

    #[test]
    fn balanced_holds_at_min() {
        assert_eq!(decide(1, &sample(10.0, 10.0), &policy(Strategy::Balanced)), 1);
    }

    #[test]
    fn balanced_holds_in_dead_band() {
        // 0.7 * 70 = 49: cpu at 55 is neither high nor low.
        assert_eq!(decide(4, &sample(55.0, 30.0), &policy(Strategy::Balanced)), 4);
        // Exactly at threshold does not count as above it.
        assert_eq!(decide(4, &sample(70.0, 70.0), &policy(Strategy::Balanced)), 4);
    }

    // ── performance ────────────────────────────────────────────────

    #[test]
    fn performance_grows_by_half() {
        assert_eq!(decide(2, &sample(90.0, 50.0), &policy(Strategy::Performance)), 3);
        assert_eq!(decide(4, &sample(10.0, 90.0), &policy(Strategy::Performance)), 6);
        assert_eq!(decide(5, &sample(90.0, 90.0), &policy(Strategy::Performance)), 7);
    }

    #[test]
    fn performance_single_replica_stays_put_under_pressure() {
        // floor(1 * 1.5) = 1
        assert_eq!(decide(1, &sample(95.0, 95.0), &policy(Strategy::Performance)), 1);
    }

    #[test]
    fn performance_scales_down_only_when_very_low() {
        let p = policy(Strategy::Performance);
        // 0.5 * 70 = 35
        assert_eq!(decide(4, &sample(30.0, 30.0), &p), 3);
        assert_eq!(decide(4, &sample(40.0, 30.0), &p), 4);
        assert_eq!(decide(1, &sample(0.0, 0.0), &p), 1);
    }

    // ── efficiency ─────────────────────────────────────────────────

    #[test]
    fn efficiency_scales_up_only_above_headroom() {
        let p = policy(Strategy::Efficiency);
        // 1.2 * 70 = 84
        assert_eq!(decide(2, &sample(85.0, 50.0), &p), 3);
        assert_eq!(decide(2, &sample(75.0, 80.0), &p), 2);
    }

    #[test]
    fn efficiency_low_cpu_alone_shrinks_regardless_of_memory() {
        // mem is above threshold, yet cpu < T triggers floor(4 * 0.75).
        assert_eq!(decide(4, &sample(60.0, 80.0), &policy(Strategy::Efficiency)), 3);
    }

    #[test]
    fn efficiency_cpu_half_ignores_min_guard() {
        let p = policy(Strategy::Efficiency);
        // current == min, cpu low: unguarded half fires, floor(1 * 0.75) = 0.
        assert_eq!(decide(1, &sample(10.0, 10.0), &p), 0);
    }

    #[test]
    fn efficiency_memory_half_respects_min_guard() {
        let p = policy(Strategy::Efficiency);
        // cpu at threshold (not below), mem low, current == min: unchanged.
        assert_eq!(decide(1, &sample(70.0, 10.0), &p), 1);
        // Same usage above min shrinks.
        assert_eq!(decide(4, &sample(70.0, 10.0), &p), 3);
    }

    #[test]
    fn efficiency_holds_between_threshold_and_headroom() {
        assert_eq!(decide(4, &sample(75.0, 75.0), &policy(Strategy::Efficiency)), 4);
    }

    // ── shared ─────────────────────────────────────────────────────

    #[test]
    fn decide_is_pure() {
        let p = policy(Strategy::Balanced);
        let s = sample(80.0, 20.0);
        let first = decide(3, &s, &p);
        let second = decide(3, &s, &p);
        assert_eq!(first, second);
        assert_eq!(p, policy(Strategy::Balanced));
    }

    #[test]
    fn increments_saturate() {
        let p = policy(Strategy::Balanced);
        assert_eq!(decide(u32::MAX, &sample(99.0, 99.0), &p), u32::MAX);
        let p = policy(Strategy::Performance);
        assert_eq!(decide(u32::MAX, &sample(99.0, 99.0), &p), u32::MAX);
    }
}

//! The weighted overall verdict.

use std::collections::BTreeMap;

use crate::series::Metric;
use crate::trend::compute::{Direction, TrendResult};

/// Combine per-metric directions into one overall verdict.
///
/// Only the safety-critical subset ([`Metric::VERDICT_SET`]) votes, each
/// metric with its severity weight. The direction with the strictly largest
/// weight sum wins; any tie, including the no-votes case, is stable.
pub fn overall_verdict(results: &BTreeMap<Metric, TrendResult>) -> Direction {
    let mut improving = 0u32;
    let mut declining = 0u32;
    let mut stable = 0u32;

    for metric in Metric::VERDICT_SET {
        let Some(result) = results.get(&metric) else {
            continue;
        };
        let weight = u32::from(metric.severity_weight());
        match result.direction {
            Direction::Improving => improving += weight,
            Direction::Declining => declining += weight,
            Direction::Stable => stable += weight,
        }
    }

    let max = improving.max(declining).max(stable);
    let holders = [improving, declining, stable]
        .iter()
        .filter(|&&sum| sum == max)
        .count();
    if holders > 1 {
        return Direction::Stable;
    }
    if max == improving {
        Direction::Improving
    } else if max == declining {
        Direction::Declining
    } else {
        Direction::Stable
    }
}

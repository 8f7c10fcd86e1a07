//! Weighted multi-collision compositing
//!
//! Every overlap an object took part in this tick leaves a
//! `(other_weight, delta)` entry on it. [`det_net_delta`] folds those entries
//! into a single correction, yielding to obstacles from least to most
//! authoritative and clamping the running correction so that a low-priority
//! push can never drive the object back into a higher-priority obstacle.

use crate::foundation::math::utils::{remove_all_against, safe_norm};
use crate::foundation::math::Vec3;
use crate::physics::bounder::Weight;
use std::cmp::Ordering;

/// One correction contributed by one overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedDelta {
    /// Weight of the obstacle that produced the delta
    pub weight: Weight,
    /// Correction moving the object out of that obstacle
    pub delta: Vec3,
}

impl WeightedDelta {
    /// Create an entry
    pub const fn new(weight: Weight, delta: Vec3) -> Self {
        Self { weight, delta }
    }
}

/// Combine two corrections per axis
///
/// Components with the same sign do not add up: the larger one already
/// clears both obstacles. Opposing components cancel.
pub fn composite_deltas(a: &Vec3, b: &Vec3) -> Vec3 {
    let mut out = Vec3::zeros();
    for i in 0..3 {
        out[i] = if a[i] > 0.0 && b[i] > 0.0 {
            a[i].max(b[i])
        } else if a[i] < 0.0 && b[i] < 0.0 {
            a[i].min(b[i])
        } else {
            a[i] + b[i]
        };
    }
    out
}

/// Total order used before folding: weight first, then the delta components
fn entry_order(a: &WeightedDelta, b: &WeightedDelta) -> Ordering {
    a.weight
        .cmp(&b.weight)
        .then_with(|| a.delta.x.total_cmp(&b.delta.x))
        .then_with(|| a.delta.y.total_cmp(&b.delta.y))
        .then_with(|| a.delta.z.total_cmp(&b.delta.z))
}

/// Net correction for one object from all of its entries this tick
///
/// The result depends only on the multiset of entries, not their order.
pub fn det_net_delta(entries: &[WeightedDelta]) -> Vec3 {
    if entries.is_empty() {
        return Vec3::zeros();
    }

    let mut sorted = entries.to_vec();
    sorted.sort_by(entry_order);

    let mut net = Vec3::zeros();
    let mut start = 0;
    while start < sorted.len() {
        let weight = sorted[start].weight;
        let end = sorted[start..]
            .iter()
            .position(|e| e.weight != weight)
            .map_or(sorted.len(), |n| start + n);

        let mut group_delta = Vec3::zeros();
        for entry in &sorted[start..end] {
            group_delta = composite_deltas(&group_delta, &entry.delta);
            // The lowest group has nothing below it to clamp
            if start > 0 {
                net = remove_all_against(&net, &safe_norm(&entry.delta));
            }
        }
        net = composite_deltas(&net, &group_delta);
        start = end;
    }

    net
}

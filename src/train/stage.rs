//! Progressive-growing stage policy

/// Stage active at global step `step`
///
/// Stage `k` starts once `step` reaches `grow_steps[k - 1]`; before the first
/// threshold (or with no thresholds at all) the generator is at stage 0.
pub fn cur_stage(step: u64, grow_steps: &[u64]) -> usize {
    grow_steps.iter().rposition(|&threshold| step >= threshold).map_or(0, |i| i + 1)
}

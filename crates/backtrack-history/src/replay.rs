//! Replaying recorded diff lists onto a state.

use backtrack_diff::{Differencer, ForwardReverse};

/// Apply every forward half, in recording order.
pub fn forward_apply_diffs<V, D>(differencer: &D, state: &V, diffs: &[ForwardReverse<D::Diff>]) -> V
where
    V: Clone,
    D: Differencer<V> + ?Sized,
{
    diffs
        .iter()
        .fold(state.clone(), |acc, pair| differencer.apply_diff(&acc, &pair.forward))
}

/// Apply every reverse half, last recorded first.
pub fn reverse_apply_diffs<V, D>(differencer: &D, state: &V, diffs: &[ForwardReverse<D::Diff>]) -> V
where
    V: Clone,
    D: Differencer<V> + ?Sized,
{
    diffs
        .iter()
        .rev()
        .fold(state.clone(), |acc, pair| differencer.apply_diff(&acc, &pair.reverse))
}

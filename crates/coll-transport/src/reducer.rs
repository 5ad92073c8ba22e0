//! Local reducer: `inout[i] = op(inout[i], in[i])` for
//! `i in [0, n)`.

use crate::element::{Element, ReduceOp};

/// Elementwise `inout[i] = op(inout[i], input[i])` over the first `n`
/// elements. `input` and `inout` must each contain at least `n` elements.
pub fn reduce_op<T: Element>(op: ReduceOp, n: usize, input: &[T], inout: &mut [T]) {
    debug_assert!(input.len() >= n);
    debug_assert!(inout.len() >= n);
    for i in 0..n {
        inout[i] = op.apply(inout[i], input[i]);
    }
}

//! Stack growth for recursive lowering.
//!
//! Long concatenation chains and deeply nested conditionals recurse once
//! per operand. Lowering entry points run under [`ensure_sufficient_stack`],
//! which grows the stack with `stacker` when the red zone is reached.

/// Grow when less than this remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

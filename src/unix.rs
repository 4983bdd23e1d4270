pub mod jmp;
mod mcontext;
mod state;

use crate::BadInstruction;

/// The guarded call itself.
///
/// Walks `Idle -> Installed -> {Completed | Trapped} -> Idle`: the scoped
/// guard returned by [`state::install`] moves us to `Installed`, and its
/// `Drop` impl brings us back to `Idle` whichever way control leaves this
/// function, including the path where control arrives via the trampoline's
/// `siglongjmp`.
pub(crate) unsafe fn catch<F: FnOnce()>(block: F) -> Option<BadInstruction> {
    let _installed = state::install();

    unsafe {
        // First return is 0 and falls through to the block; if the block
        // traps, the trampoline jumps back here and we return nonzero.
        if jmp::sigsetjmp(state::jump_point(), 1 /* save signal mask */) != 0 {
            debug_print!("returned from trampoline");
            return Some(BadInstruction);
        }

        block();
    }

    None
}

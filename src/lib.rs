//! [`catch_bad_instruction`] runs a caller-supplied block and reports whether
//! the block raised an illegal-instruction trap, instead of letting that trap
//! terminate the process.
//!
//! This exists for test harnesses that want to assert a code path deliberately
//! hits a fatal trap, eg. a precondition failure compiled down to a `ud2`.
//! Normally `SIGILL`'s default action kills the process; this crate installs
//! its own handler for the duration of one guarded call and converts the
//! signal into an ordinary return value.
//!
//! # How it works
//!
//! 1. A [`sigsetjmp`](https://man7.org/linux/man-pages/man3/sigsetjmp.3p.html)
//!    jump point is captured before the block runs.
//! 2. A `SA_SIGINFO` handler is installed for `SIGILL`, remembering the
//!    previous disposition.
//! 3. If the block traps, the handler rewrites the *interrupted thread's*
//!    saved context so that when the kernel resumes it, it resumes inside a
//!    trampoline rather than at the trapping instruction. No general-purpose
//!    register is touched, only the saved stack and instruction pointers.
//! 4. The trampoline performs a `siglongjmp` back to the jump point, which
//!    makes the capture site return a second time with a nonzero value.
//! 5. The previous `SIGILL` disposition is restored on every exit path.
//!
//! A signal handler cannot portably `siglongjmp` out of its own execution
//! context, which is why the handler instead redirects the resumption point
//! of the interrupted thread and lets the jump happen there, on the original
//! thread's stack.
//!
//! # Limitations
//!
//! This is strictly a test-harness tool; do not ship it in production code.
//!
//! * The jump point and previous-handler record are process-global: exactly
//!   one guarded call may be active at a time. Concurrent or nested calls are
//!   rejected with a panic rather than corrupting the jump point.
//! * The non-local jump skips the destructors of every frame the block had
//!   live at the time of the trap. Memory may be leaked and program state may
//!   be left inconsistent.
//! * It does not play well with an attached debugger, which will typically
//!   intercept `SIGILL` first.

#![allow(unsafe_code)]

#[cfg(feature = "debug-print")]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {
        let cstr = concat!($s, "\n");
        $crate::write_stderr(cstr);
    };
}

#[cfg(not(feature = "debug-print"))]
#[macro_export]
macro_rules! debug_print {
    ($s:literal) => {};
}

/// Writes the specified string directly to stderr.
///
/// This is safe to be called from within a signal handler.
#[inline]
pub fn write_stderr(s: &'static str) {
    unsafe {
        libc::write(2, s.as_ptr().cast(), s.len());
    }
}

/// Marker returned when a guarded block raised an illegal-instruction trap.
///
/// Deliberately carries no payload: the only fact this mechanism reports is
/// that the trap happened.
#[derive(Debug)]
pub struct BadInstruction;

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;

        pub use unix::jmp;
    } else {
        compile_error!("bad-instruction only supports unix targets");
    }
}

/// Runs `block`, catching an illegal-instruction trap it may raise.
///
/// Returns `Some(BadInstruction)` if the block trapped, `None` if it ran to
/// completion. On the trap path, execution never continues past the trapping
/// instruction; control reappears here instead.
///
/// The previous `SIGILL` disposition is restored before this function
/// returns, on both paths. Failure to install or restore the handler aborts
/// the process with a diagnostic, as a broken disposition would leave later
/// guarded calls unprotected.
///
/// # Panics
///
/// Panics if another guarded call is already active in this process. The
/// saved jump point is a single global, so nested or concurrent use cannot
/// be supported.
///
/// # Safety
///
/// If the block traps, it is interrupted by a non-local jump: destructors of
/// its live frames never run, and any state it was mutating is left as the
/// trap left it. The caller must ensure the block tolerates being abandoned
/// at an arbitrary instruction, and must not rely on anything the block owned
/// afterwards.
pub unsafe fn catch_bad_instruction<F: FnOnce()>(block: F) -> Option<BadInstruction> {
    unsafe { unix::catch(block) }
}

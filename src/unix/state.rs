use super::{jmp, mcontext};
use std::{
    cell::UnsafeCell,
    mem,
    sync::atomic::{AtomicBool, Ordering},
};

/// Set while a guarded call is in flight. The jump point below is a single
/// global, so a second concurrent or nested call would overwrite the first
/// one's restore target; we reject it loudly instead.
static GUARD_ACTIVE: AtomicBool = AtomicBool::new(false);

/// The `SIGILL` disposition that was in effect before [`install`], put back
/// by [`Installed`]'s drop on every exit path.
static PREV_ACTION: parking_lot::Mutex<Option<libc::sigaction>> = parking_lot::const_mutex(None);

/// The saved execution point the trampoline jumps back to.
///
/// Not a mutex: `siglongjmp` never unwinds back through the trampoline, so a
/// lock taken there could never be released. Exclusive access is guaranteed
/// by `GUARD_ACTIVE` instead.
struct JumpPoint(UnsafeCell<mem::MaybeUninit<jmp::JmpBuf>>);

// SAFETY: access is serialized by GUARD_ACTIVE, one guarded call at a time
unsafe impl Sync for JumpPoint {}

static JUMP_POINT: JumpPoint = JumpPoint(UnsafeCell::new(mem::MaybeUninit::uninit()));

/// The single global jump buffer, captured at the top of each guarded call.
#[inline]
pub(super) fn jump_point() -> *mut jmp::JmpBuf {
    JUMP_POINT.0.get().cast()
}

/// Scoped proof that our `SIGILL` handler is installed.
///
/// Dropping it restores the previous disposition and releases the in-flight
/// guard. Restoration lives in a drop impl rather than a statement after the
/// block so that the path arriving via the trampoline's `siglongjmp` runs it
/// too.
pub(super) struct Installed {
    _priv: (),
}

/// Installs the `SIGILL` handler, saving the previous disposition.
///
/// Panics if a guarded call is already active, or if the handler cannot be
/// installed. The latter is not a recoverable condition: a guarded call
/// without a handler would let the trap it exists to catch kill the process.
pub(super) fn install() -> Installed {
    assert!(
        !GUARD_ACTIVE.swap(true, Ordering::Acquire),
        "a guarded call is already active in this process"
    );

    // SAFETY: syscalls
    unsafe {
        let mut sa: libc::sigaction = mem::zeroed();
        libc::sigemptyset(&mut sa.sa_mask);
        sa.sa_sigaction = signal_handler as *const () as usize;
        sa.sa_flags = libc::SA_SIGINFO;

        let mut prev = mem::zeroed();
        assert_eq!(
            libc::sigaction(libc::SIGILL, &sa, &mut prev),
            0,
            "failed to install SIGILL handler: {}",
            std::io::Error::last_os_error()
        );

        *PREV_ACTION.lock() = Some(prev);
    }

    debug_print!("installed SIGILL handler");

    Installed { _priv: () }
}

impl Drop for Installed {
    fn drop(&mut self) {
        if let Some(prev) = PREV_ACTION.lock().take() {
            // SAFETY: syscall
            unsafe {
                assert_eq!(
                    libc::sigaction(libc::SIGILL, &prev, std::ptr::null_mut()),
                    0,
                    "failed to restore SIGILL handler: {}",
                    std::io::Error::last_os_error()
                );
            }
        }

        debug_print!("restored previous SIGILL disposition");

        GUARD_ACTIVE.store(false, Ordering::Release);
    }
}

/// Invoked by the kernel when the guarded block executes an illegal
/// instruction.
///
/// It does not jump anywhere itself; it only redirects where the interrupted
/// thread resumes. Performing the `siglongjmp` from the handler's own
/// execution context is not portably sound, so instead the saved context is
/// pointed at [`trampoline`] and the handler returns normally. The kernel
/// then resumes the thread inside the trampoline, on the thread's own stack,
/// where the jump is an ordinary same-stack `siglongjmp`.
unsafe extern "C" fn signal_handler(
    _sig: i32,
    _info: *mut libc::siginfo_t,
    uc: *mut libc::c_void,
) {
    debug_print!("caught SIGILL, redirecting resumption to the trampoline");

    unsafe {
        mcontext::redirect_resumption(uc, trampoline);
    }
}

/// Resumption target for the redirected thread.
///
/// Assumes a guarded call is active; the handler that redirects here is only
/// ever installed while one is.
unsafe extern "C" fn trampoline() {
    debug_print!("jumping back to the guarded call");

    unsafe {
        jmp::siglongjmp(jump_point(), 1);
    }
}

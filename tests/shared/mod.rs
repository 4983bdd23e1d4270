#![allow(dead_code)]

use std::arch::asm;

/// Raises `SIGILL`, the way a precondition failure compiled to a trap
/// instruction would.
pub fn raise_illegal_instruction() {
    unsafe {
        #[cfg(target_arch = "x86_64")]
        asm!("ud2");

        #[cfg(target_arch = "aarch64")]
        asm!("udf #0");
    }
}

/// Returns the handler address of the current `SIGILL` disposition.
pub fn current_sigill_handler() -> usize {
    unsafe {
        let mut cur: libc::sigaction = std::mem::zeroed();
        assert_eq!(
            libc::sigaction(libc::SIGILL, std::ptr::null(), &mut cur),
            0,
            "querying the SIGILL disposition failed: {}",
            std::io::Error::last_os_error()
        );
        cur.sa_sigaction
    }
}

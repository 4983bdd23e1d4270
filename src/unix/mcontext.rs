//! Rewrites the saved context of a trapped thread so the kernel resumes it at
//! a function of our choosing.
//!
//! This is the only architecture-specific unit in the crate. Each OS/arch
//! pair implements [`redirect_resumption`] with the same contract: reserve a
//! slot on the *trapped thread's* stack, park the old stack-pointer value in
//! it as a placeholder return address, and point the saved instruction
//! pointer at `target`. Every general-purpose register is left as the trap
//! left it; `target` must never return.
//!
//! The stack slot lives on the interrupted thread's stack, not the handler's,
//! because that is the stack execution resumes on. On x86_64 the slot is in
//! the red zone of the interrupted frame, which is fine only because that
//! frame is abandoned and never resumed.

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", target_arch = "x86_64"))] {
        pub(super) unsafe fn redirect_resumption(
            uc: *mut libc::c_void,
            target: unsafe extern "C" fn(),
        ) {
            unsafe {
                let gregs = &mut (*uc.cast::<libc::ucontext_t>()).uc_mcontext.gregs;

                let old_sp = gregs[libc::REG_RSP as usize];
                let sp = old_sp - std::mem::size_of::<u64>() as i64;
                (sp as *mut i64).write(old_sp);

                gregs[libc::REG_RSP as usize] = sp;
                gregs[libc::REG_RIP as usize] = target as usize as i64;
            }
        }
    } else if #[cfg(all(target_os = "linux", target_arch = "aarch64"))] {
        pub(super) unsafe fn redirect_resumption(
            uc: *mut libc::c_void,
            target: unsafe extern "C" fn(),
        ) {
            unsafe {
                let mc = &mut (*uc.cast::<libc::ucontext_t>()).uc_mcontext;

                // sp must stay 16-byte aligned, so reserve a full quadword
                // pair even though only one word is written
                let old_sp = mc.sp;
                let sp = old_sp - 16;
                (sp as *mut u64).write(old_sp);

                mc.sp = sp;
                mc.pc = target as usize as u64;
            }
        }
    } else if #[cfg(all(target_os = "macos", target_arch = "x86_64"))] {
        pub(super) unsafe fn redirect_resumption(
            uc: *mut libc::c_void,
            target: unsafe extern "C" fn(),
        ) {
            unsafe {
                let ss = &mut (*(*uc.cast::<libc::ucontext_t>()).uc_mcontext).__ss;

                let old_sp = ss.__rsp;
                let sp = old_sp - std::mem::size_of::<u64>() as u64;
                (sp as *mut u64).write(old_sp);

                ss.__rsp = sp;
                ss.__rip = target as usize as u64;
            }
        }
    } else if #[cfg(all(target_os = "macos", target_arch = "aarch64"))] {
        pub(super) unsafe fn redirect_resumption(
            uc: *mut libc::c_void,
            target: unsafe extern "C" fn(),
        ) {
            unsafe {
                let ss = &mut (*(*uc.cast::<libc::ucontext_t>()).uc_mcontext).__ss;

                // sp must stay 16-byte aligned, so reserve a full quadword
                // pair even though only one word is written
                let old_sp = ss.__sp;
                let sp = old_sp - 16;
                (sp as *mut u64).write(old_sp);

                ss.__sp = sp;
                ss.__pc = target as usize as u64;
            }
        }
    } else {
        compile_error!("redirect_resumption has not been implemented for this OS/architecture");
    }
}

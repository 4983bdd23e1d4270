mod shared;

use std::sync::atomic::{AtomicBool, Ordering};

// Statics rather than locals: values of locals modified between a sigsetjmp
// and the siglongjmp that returns to it are indeterminate.
static BEFORE_TRAP: AtomicBool = AtomicBool::new(false);
static AFTER_TRAP: AtomicBool = AtomicBool::new(false);

#[test]
fn stops_at_the_trapping_instruction() {
    let res = unsafe {
        bad_instruction::catch_bad_instruction(|| {
            BEFORE_TRAP.store(true, Ordering::SeqCst);
            shared::raise_illegal_instruction();
            AFTER_TRAP.store(true, Ordering::SeqCst);
        })
    };

    assert!(res.is_some());

    // Side effects before the trap have happened, ones after it never do
    assert!(BEFORE_TRAP.load(Ordering::SeqCst));
    assert!(!AFTER_TRAP.load(Ordering::SeqCst));
}

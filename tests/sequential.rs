mod shared;

use bad_instruction::catch_bad_instruction;

/// Sequential guarded calls do not leak state into each other: each call
/// captures its own jump point and restores the disposition it found.
#[test]
fn sequential_calls_are_independent() {
    unsafe {
        assert!(catch_bad_instruction(shared::raise_illegal_instruction).is_some());
        assert!(catch_bad_instruction(|| {}).is_none());
        assert!(catch_bad_instruction(shared::raise_illegal_instruction).is_some());
    }
}

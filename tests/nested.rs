mod shared;

use bad_instruction::catch_bad_instruction;

/// A guarded call nested inside another one is rejected with a panic rather
/// than overwriting the outer call's jump point.
#[test]
fn nested_guarded_call_is_rejected() {
    let outer = unsafe {
        catch_bad_instruction(|| {
            let nested = std::panic::catch_unwind(|| {
                let _ = unsafe { catch_bad_instruction(|| {}) };
            });

            let err = nested.unwrap_err();
            let msg = err
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| err.downcast_ref::<&str>().copied())
                .unwrap_or("");
            assert!(msg.contains("already active"), "unexpected panic: {msg}");
        })
    };

    assert!(outer.is_none());

    // The rejection left the outer call's state alone and its drop released
    // the in-flight guard, so a subsequent guarded call still works
    let caught = unsafe { catch_bad_instruction(shared::raise_illegal_instruction) };
    assert!(caught.is_some());
}

mod shared;

#[test]
fn completes_without_trapping() {
    let before = shared::current_sigill_handler();

    let mut ran = false;
    let res = unsafe { bad_instruction::catch_bad_instruction(|| ran = true) };

    assert!(res.is_none());
    assert!(ran);

    // The disposition in effect after the call equals the one before it
    assert_eq!(shared::current_sigill_handler(), before);
}

mod shared;

#[test]
fn catches_illegal_instruction() {
    let res = unsafe { bad_instruction::catch_bad_instruction(shared::raise_illegal_instruction) };

    assert!(res.is_some());
}

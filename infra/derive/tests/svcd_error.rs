#[test]
fn svcd_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/svcd_error_pass.rs");
}

#[test]
fn form_defaults_derive_ui() {
    let testcases = trybuild::TestCases::new();
    testcases.pass("tests/ui/form_defaults/pass.rs");
    testcases.pass("tests/ui/form_defaults/rename.rs");
}

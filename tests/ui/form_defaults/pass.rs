use calmform::form::{Form, FormDefaults, FormOptions};

#[derive(Clone, calmform::form::FormDefaults)]
struct SignupForm {
    email: String,
    password: String,
}

fn main() {
    let fields = SignupForm::fields();
    assert_eq!(fields.email(), "email");
    assert_eq!(SignupForm::field_names(), &["email", "password"]);

    let model = SignupForm {
        email: "a@calm.ui".to_string(),
        password: "pwd1234".to_string(),
    };
    let form = Form::from_model(&model, FormOptions::default());
    assert_eq!(form.get_value(fields.email()).unwrap(), "a@calm.ui");
    assert_eq!(form.get_value(fields.password()).unwrap(), "pwd1234");
}

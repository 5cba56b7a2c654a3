use calmform::form::{FormDefaults, RawValue};

#[derive(Clone, calmform::form::FormDefaults)]
struct BirthdayForm {
    year: u32,
    #[form(rename = "birth-month")]
    month: String,
    tags: Vec<String>,
}

fn main() {
    let fields = BirthdayForm::fields();
    assert_eq!(fields.month(), "birth-month");

    let model = BirthdayForm {
        year: 1999,
        month: "07".to_string(),
        tags: vec!["a".to_string(), "b".to_string()],
    };
    let values = model.default_values();
    assert_eq!(values[0].0.as_str(), "year");
    assert_eq!(values[0].1.normalize(), "1999");
    assert_eq!(values[1].0.as_str(), "birth-month");
    assert_eq!(values[2].1, RawValue::List(vec!["a".into(), "b".into()]));
}

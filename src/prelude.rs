pub use crate::form::validation;
pub use crate::form::{
    ElementKind, ElementRef, ErrorEntry, ErrorTable, FieldBinding, FieldName, FieldOptions, Form,
    FormDefaults, FormOptions, FormResult, RawValue, SubmitEvent, SubmitOutcome, SubmittedValues,
    Validator,
};

use gpui::SharedString;
use indexmap::IndexMap;

use super::errors::{ErrorEntry, ErrorTable};
use super::registry::ElementRef;
use super::validation::{self, Validator};
use super::value::{FieldName, RawValue};

/// Everything the store knows about one field.
#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub value: SharedString,
    pub registered: bool,
    pub watching: bool,
    /// Set once the value has been written by an update rather than seeded
    /// from defaults.
    pub edited: bool,
    pub is_valid: bool,
    pub validations: Vec<Validator>,
    pub element: Option<ElementRef>,
}

impl FieldInfo {
    fn provisional(value: SharedString) -> Self {
        Self {
            value,
            registered: false,
            watching: false,
            edited: false,
            is_valid: false,
            validations: Vec::new(),
            element: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegisterOptions {
    pub value: Option<RawValue>,
    pub validations: Vec<Validator>,
    pub element: Option<ElementRef>,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<RawValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn validation(mut self, validator: Validator) -> Self {
        self.validations.push(validator);
        self
    }

    pub fn validations(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validations.extend(validators);
        self
    }

    pub fn element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }
}

/// Authoritative per-field state of one form plus its error table.
///
/// Fields iterate in the order they were first referenced, which is also the
/// order submit validation and focus-on-error walk them.
#[derive(Clone, Debug, Default)]
pub struct FieldStore {
    fields: IndexMap<FieldName, FieldInfo>,
    errors: ErrorTable,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults<I, K, V>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldName>,
        V: Into<RawValue>,
    {
        let mut store = Self::new();
        store.initialize(defaults);
        store
    }

    /// Seeds one unregistered field per default entry.
    pub fn initialize<I, K, V>(&mut self, defaults: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldName>,
        V: Into<RawValue>,
    {
        for (name, value) in defaults {
            let value = value.into().normalize();
            self.fields.insert(name.into(), FieldInfo::provisional(value));
        }
    }

    /// Declares a field or confirms an existing declaration.
    ///
    /// A registered field keeps its live value, and so does one that an
    /// update wrote before registration. Otherwise an explicit value beats a
    /// seeded default, and without one the default is kept. Validators and
    /// the element reference are always replaced.
    pub fn register(&mut self, name: impl Into<FieldName>, options: RegisterOptions) {
        let RegisterOptions {
            value,
            validations,
            element,
        } = options;
        let field = self
            .fields
            .entry(name.into())
            .or_insert_with(|| FieldInfo::provisional(SharedString::default()));

        if !field.registered
            && !field.edited
            && let Some(value) = value
        {
            field.value = value.normalize();
        }
        field.validations = validations;
        field.element = element;
        field.registered = true;
    }

    /// Overwrites the value. Validation is a separate step.
    pub fn update(&mut self, name: impl Into<FieldName>, value: impl Into<RawValue>) {
        let value = value.into().normalize();
        let field = self
            .fields
            .entry(name.into())
            .or_insert_with(|| FieldInfo::provisional(SharedString::default()));
        field.value = value;
        field.edited = true;
    }

    /// Unknown names read as empty.
    pub fn get_value(&self, name: &str) -> SharedString {
        self.fields
            .get(name)
            .map(|field| field.value.clone())
            .unwrap_or_default()
    }

    pub fn field_info(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns false when no field named `name` exists.
    pub fn watch(&mut self, name: &str) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.watching = true;
                true
            }
            None => false,
        }
    }

    pub fn is_watching(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(|field| field.watching)
    }

    pub fn set_element(&mut self, name: &str, element: Option<ElementRef>) {
        if let Some(field) = self.fields.get_mut(name) {
            field.element = element;
        }
    }

    pub fn validators(&self, name: &str) -> Vec<Validator> {
        self.fields
            .get(name)
            .map(|field| field.validations.clone())
            .unwrap_or_default()
    }

    /// Writes the outcome of one validation pass.
    ///
    /// Each failure is written to the field's single error slot in turn, so
    /// the last one in `failures` is what the error table keeps.
    pub fn apply_validation(&mut self, name: &str, failures: &[ErrorEntry]) -> bool {
        let Some((_, key, field)) = self.fields.get_full_mut(name) else {
            self.errors.remove(name);
            return true;
        };

        if failures.is_empty() {
            field.is_valid = true;
            self.errors.remove(name);
            return true;
        }

        field.is_valid = false;
        for failure in failures {
            self.errors.set(key.clone(), failure.clone());
        }
        false
    }

    /// Evaluates every validator of `name` and updates validity and errors.
    ///
    /// `on_valid` runs once when all validators pass; `on_invalid` runs once
    /// per failing validator, in list order.
    pub fn validate(
        &mut self,
        name: &str,
        mut on_valid: impl FnMut(),
        mut on_invalid: impl FnMut(&ErrorEntry),
    ) -> bool {
        let value = self.get_value(name);
        let failures = validation::evaluate(value.as_ref(), &self.validators(name));
        let is_valid = self.apply_validation(name, &failures);
        tracing::trace!(field = name, is_valid, failures = failures.len(), "validated field");

        if is_valid {
            on_valid();
        } else {
            failures.iter().for_each(&mut on_invalid);
        }
        is_valid
    }

    pub fn errors(&self) -> &ErrorTable {
        &self.errors
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.fields.keys()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &FieldInfo)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::validation::{email, required};
    use proptest::prelude::*;

    fn seeded() -> FieldStore {
        FieldStore::with_defaults([
            ("email", "seyeon4199@gmail.com"),
            ("password", "pwd1234"),
        ])
    }

    #[test]
    fn initialize_seeds_unregistered_fields() {
        let store = seeded();
        let email = store.field_info("email").expect("email is seeded");

        assert_eq!(email.value, "seyeon4199@gmail.com");
        assert!(!email.registered);
        assert!(!email.watching);
        assert!(!email.is_valid);
        assert!(email.validations.is_empty());
        assert!(email.element.is_none());
        assert_eq!(store.get_value("password"), "pwd1234");
    }

    #[test]
    fn register_value_beats_default() {
        let mut store = seeded();
        store.register("email", RegisterOptions::new().value("noeyes4199@gmail.com"));

        assert_eq!(store.get_value("email"), "noeyes4199@gmail.com");
        assert!(store.field_info("email").is_some_and(|field| field.registered));
    }

    #[test]
    fn register_without_value_keeps_provisional_value() {
        let mut store = seeded();
        store.update("nickname", "calm");
        store.register("nickname", RegisterOptions::new());
        store.register("password", RegisterOptions::new());

        assert_eq!(store.get_value("nickname"), "calm");
        assert_eq!(store.get_value("password"), "pwd1234");
    }

    #[test]
    fn register_value_does_not_clobber_earlier_update() {
        let mut store = seeded();
        store.update("nickname", "typed");
        store.update("email", "typed@calm.ui");
        store.register("nickname", RegisterOptions::new().value("initial"));
        store.register("email", RegisterOptions::new().value("initial@calm.ui"));

        assert_eq!(store.get_value("nickname"), "typed");
        assert_eq!(store.get_value("email"), "typed@calm.ui");
        assert!(store.field_info("nickname").is_some_and(|field| field.edited));
        assert!(!store.field_info("password").is_some_and(|field| field.edited));
    }

    #[test]
    fn second_registration_keeps_live_value() {
        let mut store = FieldStore::new();
        store.register("email", RegisterOptions::new().value("first@calm.ui"));
        store.register(
            "email",
            RegisterOptions::new()
                .value("second@calm.ui")
                .validation(required()),
        );

        let email = store.field_info("email").expect("email registered");
        assert_eq!(email.value, "first@calm.ui");
        assert_eq!(email.validations.len(), 1);
    }

    #[test]
    fn update_overwrites_without_validating() {
        let mut store = seeded();
        store.register(
            "email",
            RegisterOptions::new()
                .value("noeyes4199@gmail.com")
                .validation(email()),
        );
        store.update("email", "updated4199@gmail.com");
        assert_eq!(store.get_value("email"), "updated4199@gmail.com");

        store.update("email", "InvalidEmail");
        assert!(store.errors().is_empty());
        assert!(!store.field_info("email").is_some_and(|field| field.is_valid));
    }

    #[test]
    fn unknown_names_degrade_gracefully() {
        let mut store = seeded();
        assert_eq!(store.get_value("missing"), "");
        assert!(store.field_info("missing").is_none());
        assert!(!store.watch("missing"));
        assert!(!store.is_watching("missing"));
        assert!(store.validate("missing", || {}, |_| {}));
        assert!(!store.contains("missing"));
    }

    #[test]
    fn watch_is_idempotent() {
        let mut store = seeded();
        assert!(!store.is_watching("email"));
        assert!(store.watch("email"));
        assert!(store.watch("email"));
        assert!(store.is_watching("email"));
    }

    #[test]
    fn validate_tracks_valid_then_invalid_then_valid() {
        let mut store = seeded();
        store.register(
            "email",
            RegisterOptions::new().validation(email().with_message("이메일 형식이 아닙니다!")),
        );

        let mut valid_calls = 0;
        let mut invalid = Vec::new();

        store.update("email", "InvalidEmail");
        let is_valid = store.validate("email", || valid_calls += 1, |e| invalid.push(e.clone()));
        assert!(!is_valid);
        assert_eq!(valid_calls, 0);
        assert_eq!(invalid, vec![ErrorEntry::new("email", "이메일 형식이 아닙니다!")]);
        assert_eq!(
            store.errors().get("email"),
            Some(&ErrorEntry::new("email", "이메일 형식이 아닙니다!"))
        );

        store.update("email", "seyeon4199@gmail.com");
        let is_valid = store.validate("email", || valid_calls += 1, |e| invalid.push(e.clone()));
        assert!(is_valid);
        assert_eq!(valid_calls, 1);
        assert_eq!(invalid.len(), 1);
        assert!(store.errors().get("email").is_none());
        assert!(store.field_info("email").is_some_and(|field| field.is_valid));
    }

    #[test]
    fn last_failing_validator_wins() {
        let mut store = FieldStore::new();
        store.register(
            "code",
            RegisterOptions::new()
                .value("x")
                .validation(Validator::new("A", |_| false).with_message("a failed"))
                .validation(Validator::new("B", |_| false).with_message("b failed")),
        );

        let mut invalid_calls = 0;
        assert!(!store.validate("code", || {}, |_| invalid_calls += 1));
        assert_eq!(invalid_calls, 2);
        assert_eq!(
            store.errors().get("code"),
            Some(&ErrorEntry::new("B", "b failed"))
        );
        assert_eq!(store.errors().len(), 1);
    }

    #[test]
    fn format_and_required_are_independent() {
        let mut store = FieldStore::new();
        store.register(
            "email",
            RegisterOptions::new().validations([email(), required()]),
        );

        assert!(!store.validate("email", || {}, |_| {}));
        assert_eq!(
            store.errors().get("email").map(|entry| entry.kind.clone()),
            Some("required".into())
        );

        store.update("email", "invalid.com");
        assert!(!store.validate("email", || {}, |_| {}));
        assert_eq!(
            store.errors().get("email").map(|entry| entry.kind.clone()),
            Some("email".into())
        );
    }

    proptest! {
        #[test]
        fn initialize_normalizes_every_default(
            defaults in proptest::collection::btree_map("[a-z]{1,8}", "[ -~]{0,12}", 0..8)
        ) {
            let store = FieldStore::with_defaults(defaults.clone());
            prop_assert_eq!(store.len(), defaults.len());
            for (name, value) in &defaults {
                prop_assert_eq!(store.get_value(name).as_ref(), value.as_str());
            }
        }

        #[test]
        fn list_defaults_are_comma_joined(
            items in proptest::collection::vec("[a-z0-9]{1,5}", 1..5)
        ) {
            let store = FieldStore::with_defaults([("tags", items.clone())]);
            prop_assert_eq!(store.get_value("tags").to_string(), items.join(","));
        }
    }
}

use std::sync::Arc;

use gpui::{App, SharedString, Window};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::controller::{Form, FormResult, read_lock, write_lock};
use super::errors::ErrorTable;
use super::value::{FieldName, RawValue};

/// The data a submit event carries, in the shape of form-encoded entries.
#[derive(Clone, Debug, Default)]
pub struct SubmitEvent {
    entries: Vec<(FieldName, SharedString)>,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldName>,
        V: Into<RawValue>,
    {
        let mut event = Self::new();
        for (name, value) in entries {
            event.append(name, value);
        }
        event
    }

    pub fn append(&mut self, name: impl Into<FieldName>, value: impl Into<RawValue>) {
        self.entries.push((name.into(), value.into().normalize()));
    }

    pub fn entries(&self) -> impl Iterator<Item = (&FieldName, &SharedString)> {
        self.entries.iter().map(|(name, value)| (name, value))
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// One value per field name, released only from a fully valid submit.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SubmittedValues {
    values: IndexMap<FieldName, SharedString>,
}

impl SubmittedValues {
    pub fn get(&self, name: &str) -> Option<&SharedString> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &SharedString)> {
        self.values.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for SubmittedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            let value: &str = value.as_ref();
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Valid(SubmittedValues),
    Invalid(ErrorTable),
}

impl SubmitOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, SubmitOutcome::Valid(_))
    }
}

pub type ValidSubmitCallback = Arc<dyn Fn(&SubmittedValues, &SubmitEvent) + Send + Sync>;
pub type InvalidSubmitCallback = Arc<dyn Fn(&ErrorTable, &SubmitEvent) + Send + Sync>;

/// Produced by [`Form::handle_submit`]; attach it to the form's submit event.
#[derive(Clone)]
pub struct SubmitHandler {
    form: Form,
    on_valid: ValidSubmitCallback,
    on_invalid: InvalidSubmitCallback,
}

impl SubmitHandler {
    /// Validates every field named in the event and reports the result.
    ///
    /// All fields are validated even after one fails so every error shows at
    /// once. `on_valid` receives the collected values; `on_invalid` receives
    /// the error table as it stands after this pass.
    pub fn handle(&self, event: &mut SubmitEvent) -> FormResult<SubmitOutcome> {
        event.prevent_default();

        let values = self.form.apply_submission(event)?;
        let mut all_valid = true;
        for name in values.names() {
            let field_valid = self.form.validate_field(name.as_str())?;
            all_valid &= field_valid;
        }

        let first_invalid = {
            let mut state = write_lock(&self.form.state, "recording submit result")?;
            state.submit_count = state.submit_count.saturating_add(1);
            state.first_invalid = state
                .store
                .fields()
                .find(|(name, field)| values.get(name.as_str()).is_some() && !field.is_valid)
                .map(|(name, _)| name.clone());
            state.first_invalid.clone()
        };

        if all_valid {
            tracing::debug!(fields = values.len(), "submit accepted");
            (self.on_valid)(&values, event);
            return Ok(SubmitOutcome::Valid(values));
        }

        let errors = self.form.errors()?;
        tracing::debug!(
            errors = errors.len(),
            first_invalid = first_invalid.as_ref().map(FieldName::as_str),
            "submit rejected"
        );
        (self.on_invalid)(&errors, event);
        Ok(SubmitOutcome::Invalid(errors))
    }

    /// Like [`SubmitHandler::handle`], then moves focus to the first invalid
    /// field when the form is configured to.
    pub fn handle_in(
        &self,
        event: &mut SubmitEvent,
        window: &mut Window,
        cx: &mut App,
    ) -> FormResult<SubmitOutcome> {
        let outcome = self.handle(event)?;
        if !outcome.is_valid() && self.form.options.focus_first_invalid_on_submit {
            let _ = self.form.focus_first_invalid(window, cx)?;
        }
        Ok(outcome)
    }
}

impl Form {
    pub fn handle_submit(
        &self,
        on_valid: impl Fn(&SubmittedValues, &SubmitEvent) + Send + Sync + 'static,
        on_invalid: impl Fn(&ErrorTable, &SubmitEvent) + Send + Sync + 'static,
    ) -> SubmitHandler {
        SubmitHandler {
            form: self.clone(),
            on_valid: Arc::new(on_valid),
            on_invalid: Arc::new(on_invalid),
        }
    }

    /// A submit event carrying the current value of every registered field,
    /// for hosts that have no native form data to submit.
    pub fn submit_event(&self) -> FormResult<SubmitEvent> {
        let state = read_lock(&self.state, "building submit event")?;
        Ok(SubmitEvent::from_entries(
            state
                .store
                .fields()
                .filter(|(_, field)| field.registered)
                .map(|(name, field)| (name.clone(), field.value.clone())),
        ))
    }

    /// Writes the submitted data into the store so the values validated are
    /// the values released. One value per known field name: a name repeated
    /// in the event keeps its last value, and names the form does not know
    /// are dropped.
    fn apply_submission(&self, event: &SubmitEvent) -> FormResult<SubmittedValues> {
        let mut values = IndexMap::new();
        let mut watched = Vec::new();
        {
            let mut state = write_lock(&self.state, "applying submitted values")?;
            for (name, value) in event.entries() {
                if !state.store.contains(name.as_str()) {
                    tracing::warn!(field = %name, "submit event names an unknown field");
                    continue;
                }
                values.insert(name.clone(), value.clone());
            }
            for (name, value) in &values {
                if state.store.get_value(name.as_str()) == *value {
                    continue;
                }
                state.store.update(name.clone(), value.clone());
                if state.store.is_watching(name.as_str()) {
                    watched.push((name.clone(), value.clone()));
                }
            }
        }

        for (name, value) in watched {
            self.snapshot.push(name, value)?;
        }
        Ok(SubmittedValues { values })
    }
}

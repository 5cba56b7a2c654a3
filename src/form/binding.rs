use std::sync::Arc;

use gpui::SharedString;

use super::controller::{Form, FormResult, write_lock};
use super::errors::ErrorEntry;
use super::registry::{ElementKind, ElementRef};
use super::store::RegisterOptions;
use super::validation::Validator;
use super::value::{FieldName, RawValue};

pub type ChangeCallback = Arc<dyn Fn(&FieldName, &SharedString) + Send + Sync>;

#[derive(Clone, Default)]
pub struct FieldOptions {
    value: Option<RawValue>,
    validations: Vec<Validator>,
    on_change: Option<ChangeCallback>,
}

impl FieldOptions {
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

    /// Runs after the form has processed a change to this field.
    pub fn on_change(
        mut self,
        callback: impl Fn(&FieldName, &SharedString) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(callback));
        self
    }
}

/// What a view needs to drive one field: its name, change and blur entry
/// points, and a way to hand back the element it rendered.
#[derive(Clone)]
pub struct FieldBinding {
    form: Form,
    name: FieldName,
    on_change: Option<ChangeCallback>,
}

impl FieldBinding {
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// Current value, for the element's initial contents.
    pub fn value(&self) -> FormResult<SharedString> {
        self.form.get_value(self.name.as_str())
    }

    pub fn error(&self) -> FormResult<Option<ErrorEntry>> {
        self.form.error(self.name.as_str())
    }

    pub fn on_change(&self, value: impl Into<RawValue>) -> FormResult<bool> {
        let is_valid = self.form.set_value(self.name.clone(), value)?;
        if let Some(callback) = &self.on_change {
            let value = self.form.get_value(self.name.as_str())?;
            callback(&self.name, &value);
        }
        Ok(is_valid)
    }

    pub fn on_blur(&self) -> FormResult<bool> {
        if self.form.options.validate_on_blur {
            return self.form.validate_field(self.name.as_str());
        }
        self.form.is_valid(self.name.as_str())
    }

    /// An element reference with this field's stable id.
    pub fn element_ref(&self, kind: ElementKind) -> FormResult<ElementRef> {
        self.form.element_ref(self.name.as_str(), kind)
    }

    pub fn bind_ref(&self, element: ElementRef) -> FormResult<()> {
        self.form.bind_element(self.name.clone(), element)
    }

    pub fn release_ref(&self) -> FormResult<()> {
        self.form.release_element(self.name.as_str())
    }
}

impl Form {
    /// Declares a field, or confirms it on a later render, and returns its
    /// binding.
    ///
    /// An element already bound to the field survives re-registration.
    pub fn register(
        &self,
        name: impl Into<FieldName>,
        options: FieldOptions,
    ) -> FormResult<FieldBinding> {
        let name = name.into();
        let FieldOptions {
            value,
            validations,
            on_change,
        } = options;
        {
            let mut state = write_lock(&self.state, "registering field")?;
            let element = state.registry.get(name.as_str()).cloned();
            state.store.register(
                name.clone(),
                RegisterOptions {
                    value,
                    validations,
                    element,
                },
            );
        }
        tracing::debug!(field = %name, "registered field");

        Ok(FieldBinding {
            form: self.clone(),
            name,
            on_change,
        })
    }
}

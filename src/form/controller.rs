use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use gpui::{App, SharedString, Window};
use indexmap::IndexMap;
use serde::Deserialize;

use super::errors::{ErrorEntry, ErrorTable};
use super::groups::{ErrorGroups, GroupName};
use super::registry::{ElementKind, ElementRef, FieldRegistry};
use super::snapshot::WatchSnapshot;
use super::store::{FieldInfo, FieldStore};
use super::validation;
use super::value::{FieldName, RawValue};
use crate::id::field_element_id;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

/// Behavior switches for one form. Deserializable so hosts can keep them in
/// their own configuration files; missing keys fall back to the defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub validate_on_change: bool,
    pub validate_on_blur: bool,
    pub revalidate_dependents: bool,
    pub focus_first_invalid_on_submit: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_on_change: true,
            validate_on_blur: false,
            revalidate_dependents: true,
            focus_first_invalid_on_submit: true,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
}

pub type FormResult<T> = Result<T, FormError>;

/// A model type whose fields seed a form's default values.
///
/// Usually derived with `#[derive(FormDefaults)]`.
pub trait FormDefaults {
    type Fields;

    fn fields() -> Self::Fields;
    fn field_names() -> &'static [&'static str];
    fn default_values(&self) -> Vec<(FieldName, RawValue)>;
}

pub(super) struct FormState {
    pub(super) id: FormId,
    pub(super) store: FieldStore,
    pub(super) groups: ErrorGroups,
    pub(super) registry: FieldRegistry,
    pub(super) dependencies: BTreeMap<FieldName, BTreeSet<FieldName>>,
    pub(super) submit_count: u32,
    pub(super) first_invalid: Option<FieldName>,
}

impl FormState {
    pub(super) fn recompute_groups(&mut self) {
        let FormState { store, groups, .. } = self;
        groups.recompute(store.errors());
    }
}

/// Handle to one form instance.
///
/// Clones share the same state. The field store is the source of truth; the
/// watch snapshot is a separately owned projection that only watched fields
/// write to.
#[derive(Clone)]
pub struct Form {
    pub(super) options: FormOptions,
    pub(super) state: Arc<RwLock<FormState>>,
    pub(super) snapshot: WatchSnapshot,
}

impl Form {
    pub fn new(options: FormOptions) -> Self {
        Self::from_store(FieldStore::new(), options)
    }

    pub fn with_defaults<I, K, V>(defaults: I, options: FormOptions) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldName>,
        V: Into<RawValue>,
    {
        Self::from_store(FieldStore::with_defaults(defaults), options)
    }

    pub fn from_model<M>(model: &M, options: FormOptions) -> Self
    where
        M: FormDefaults,
    {
        Self::with_defaults(model.default_values(), options)
    }

    fn from_store(store: FieldStore, options: FormOptions) -> Self {
        let id = FormId::next();
        tracing::debug!(form = id.0, fields = store.len(), "created form");
        Self {
            options,
            state: Arc::new(RwLock::new(FormState {
                id,
                store,
                groups: ErrorGroups::new(),
                registry: FieldRegistry::new(),
                dependencies: BTreeMap::new(),
                submit_count: 0,
                first_invalid: None,
            })),
            snapshot: WatchSnapshot::new(),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    pub fn snapshot(&self) -> WatchSnapshot {
        self.snapshot.clone()
    }

    pub fn get_value(&self, name: &str) -> FormResult<SharedString> {
        Ok(read_lock(&self.state, "reading field value")?
            .store
            .get_value(name))
    }

    pub fn get_field_state(&self, name: &str) -> FormResult<Option<FieldInfo>> {
        Ok(read_lock(&self.state, "reading field state")?
            .store
            .field_info(name)
            .cloned())
    }

    pub fn errors(&self) -> FormResult<ErrorTable> {
        Ok(read_lock(&self.state, "reading error table")?
            .store
            .errors()
            .clone())
    }

    pub fn error(&self, name: &str) -> FormResult<Option<ErrorEntry>> {
        Ok(read_lock(&self.state, "reading field error")?
            .store
            .errors()
            .get(name)
            .cloned())
    }

    /// False until the field's first passing validation.
    pub fn is_valid(&self, name: &str) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading field validity")?
            .store
            .field_info(name)
            .is_some_and(|field| field.is_valid))
    }

    pub fn is_watching(&self, name: &str) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading watch flag")?
            .store
            .is_watching(name))
    }

    /// Marks each field as watched and returns their current values.
    ///
    /// From here on every change to one of these fields is also pushed into
    /// [`Form::snapshot`]. Names the form does not know are returned as empty
    /// and stay unwatched.
    pub fn watch<I, N>(&self, names: I) -> FormResult<IndexMap<FieldName, SharedString>>
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        let mut watched = IndexMap::new();
        {
            let mut state = write_lock(&self.state, "watching fields")?;
            for name in names {
                let name = name.into();
                state.store.watch(name.as_str());
                watched.insert(name.clone(), state.store.get_value(name.as_str()));
            }
        }

        for (name, value) in &watched {
            if self.is_watching(name.as_str())? {
                self.snapshot.seed(name.clone(), value.clone())?;
            }
        }
        Ok(watched)
    }

    /// Runs one change through the store: update, validate, revalidate
    /// dependent fields, then push to the snapshot when watched. Returns the
    /// field's validity afterwards.
    ///
    /// With `validate_on_change` off, neither the field nor its dependents are
    /// validated here; submit catches both.
    pub fn set_value(
        &self,
        name: impl Into<FieldName>,
        value: impl Into<RawValue>,
    ) -> FormResult<bool> {
        let name = name.into();
        let (value, watching, was_valid) = {
            let mut state = write_lock(&self.state, "updating field value")?;
            state.store.update(name.clone(), value);
            let field = state.store.field_info(name.as_str());
            (
                state.store.get_value(name.as_str()),
                field.is_some_and(|field| field.watching),
                field.is_some_and(|field| field.is_valid),
            )
        };

        let is_valid = if self.options.validate_on_change {
            self.validate_field(name.as_str())?
        } else {
            was_valid
        };
        if self.options.validate_on_change && self.options.revalidate_dependents {
            self.revalidate_dependents(&name)?;
        }
        if watching {
            self.snapshot.push(name, value)?;
        }
        Ok(is_valid)
    }

    pub fn validate_field(&self, name: &str) -> FormResult<bool> {
        self.validate_field_with(name, || {}, |_| {})
    }

    /// Validates one field. `on_valid` runs once on success, `on_invalid`
    /// once per failing validator. Both run after the store has been updated
    /// and no lock is held, so they may read the form.
    pub fn validate_field_with(
        &self,
        name: &str,
        mut on_valid: impl FnMut(),
        mut on_invalid: impl FnMut(&ErrorEntry),
    ) -> FormResult<bool> {
        let (value, validators) = {
            let state = read_lock(&self.state, "reading field for validation")?;
            (state.store.get_value(name), state.store.validators(name))
        };

        // Predicates may read other fields of this form, so they run unlocked.
        let failures = validation::evaluate(value.as_ref(), &validators);

        let is_valid = {
            let mut state = write_lock(&self.state, "writing field validation result")?;
            let is_valid = state.store.apply_validation(name, &failures);
            state.recompute_groups();
            is_valid
        };
        tracing::trace!(field = name, is_valid, failures = failures.len(), "validated field");

        if is_valid {
            on_valid();
        } else {
            failures.iter().for_each(&mut on_invalid);
        }
        Ok(is_valid)
    }

    /// Revalidate `dependent` whenever `source` changes, for confirmation
    /// fields and similar cross-field rules.
    pub fn depends_on(
        &self,
        dependent: impl Into<FieldName>,
        source: impl Into<FieldName>,
    ) -> FormResult<()> {
        let mut state = write_lock(&self.state, "registering dependency")?;
        state
            .dependencies
            .entry(source.into())
            .or_default()
            .insert(dependent.into());
        Ok(())
    }

    /// Dependents still holding an empty value are left alone so a
    /// confirmation field is not flagged before the user reaches it.
    pub(super) fn revalidate_dependents(&self, source: &FieldName) -> FormResult<()> {
        let dependents = {
            let state = read_lock(&self.state, "reading field dependencies")?;
            state
                .dependencies
                .get(source)
                .into_iter()
                .flatten()
                .filter(|dependent| !state.store.get_value(dependent.as_str()).is_empty())
                .cloned()
                .collect::<Vec<_>>()
        };
        for dependent in dependents {
            let _ = self.validate_field(dependent.as_str())?;
        }
        Ok(())
    }

    /// A reader for the current value of `name`, for validators that compare
    /// against another field. It holds the form weakly, so storing it inside
    /// one of the form's own validators does not keep the form alive.
    pub fn value_source(
        &self,
        name: impl Into<FieldName>,
    ) -> impl Fn() -> SharedString + Send + Sync + 'static {
        let state = Arc::downgrade(&self.state);
        let name = name.into();
        move || {
            let Some(state) = state.upgrade() else {
                return SharedString::default();
            };
            match state.read() {
                Ok(state) => state.store.get_value(name.as_str()),
                Err(_) => {
                    tracing::warn!(
                        field = %name,
                        "form state lock poisoned while reading value source"
                    );
                    SharedString::default()
                }
            }
        }
    }

    pub fn define_group<I, N>(&self, group: impl Into<GroupName>, members: I) -> FormResult<()>
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        let mut state = write_lock(&self.state, "defining error group")?;
        state.groups.define(group, members);
        state.recompute_groups();
        Ok(())
    }

    pub fn group_has_error(&self, group: &str) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading group error")?
            .groups
            .is_errored(group))
    }

    pub fn errored_groups(&self) -> FormResult<Vec<GroupName>> {
        Ok(read_lock(&self.state, "listing errored groups")?
            .groups
            .errored_groups()
            .cloned()
            .collect())
    }

    /// An element reference whose id is stable for this form and field.
    pub fn element_ref(&self, name: &str, kind: ElementKind) -> FormResult<ElementRef> {
        let form_id = self.form_id()?;
        Ok(ElementRef::new(field_element_id(form_id, name), kind))
    }

    pub fn bind_element(&self, name: impl Into<FieldName>, element: ElementRef) -> FormResult<()> {
        let name = name.into();
        let mut state = write_lock(&self.state, "binding field element")?;
        state.store.set_element(name.as_str(), Some(element.clone()));
        tracing::debug!(field = %name, kind = element.kind().as_str(), "bound field element");
        state.registry.bind(name, element);
        Ok(())
    }

    pub fn release_element(&self, name: &str) -> FormResult<()> {
        let mut state = write_lock(&self.state, "releasing field element")?;
        state.store.set_element(name, None);
        state.registry.release(name);
        Ok(())
    }

    pub fn label_target(&self, name: &str) -> FormResult<Option<SharedString>> {
        Ok(read_lock(&self.state, "resolving label target")?
            .registry
            .label_target(name))
    }

    pub fn bound_fields(&self) -> FormResult<Vec<FieldName>> {
        Ok(read_lock(&self.state, "listing bound fields")?
            .registry
            .members()
            .map(|(name, _)| name.clone())
            .collect())
    }

    pub fn submit_count(&self) -> FormResult<u32> {
        Ok(read_lock(&self.state, "reading submit count")?.submit_count)
    }

    /// The field focus moves to after a failed submit.
    pub fn first_invalid_field(&self) -> FormResult<Option<FieldName>> {
        Ok(read_lock(&self.state, "reading first invalid field")?
            .first_invalid
            .clone())
    }

    pub fn focus_first_invalid(&self, window: &mut Window, cx: &mut App) -> FormResult<bool> {
        let element = {
            let state = read_lock(&self.state, "reading first invalid element")?;
            state
                .first_invalid
                .as_ref()
                .and_then(|name| state.store.field_info(name.as_str()))
                .and_then(|field| field.element.clone())
        };
        let Some(element) = element else {
            return Ok(false);
        };
        Ok(element.focus(window, cx))
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| {
        tracing::warn!(context, "form state lock poisoned");
        FormError::StatePoisoned(context)
    })
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| {
        tracing::warn!(context, "form state lock poisoned");
        FormError::StatePoisoned(context)
    })
}

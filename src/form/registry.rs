use std::fmt::{Debug, Formatter};

use gpui::{App, FocusHandle, SharedString, WeakFocusHandle, Window};
use indexmap::IndexMap;

use super::value::FieldName;

/// The element kinds a field can be rendered as.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ElementKind {
    #[default]
    Input,
    Select,
    Textarea,
}

impl ElementKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ElementKind::Input => "input",
            ElementKind::Select => "select",
            ElementKind::Textarea => "textarea",
        }
    }
}

/// Non-owning reference to the element a field is bound to.
///
/// The store only ever uses it to move focus; the element itself stays owned
/// by the view that rendered it. Once that view drops its focus handle the
/// reference goes stale and focusing becomes a no-op.
#[derive(Clone)]
pub struct ElementRef {
    id: SharedString,
    kind: ElementKind,
    focus: Option<WeakFocusHandle>,
}

impl ElementRef {
    pub fn new(id: impl Into<SharedString>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            focus: None,
        }
    }

    pub fn with_focus_handle(mut self, handle: &FocusHandle) -> Self {
        self.focus = Some(handle.downgrade());
        self
    }

    pub fn id(&self) -> &SharedString {
        &self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_focusable(&self) -> bool {
        self.focus
            .as_ref()
            .is_some_and(|focus| focus.upgrade().is_some())
    }

    pub fn focus(&self, window: &mut Window, cx: &mut App) -> bool {
        let Some(handle) = self.focus.as_ref().and_then(WeakFocusHandle::upgrade) else {
            return false;
        };
        window.focus(&handle, cx);
        true
    }
}

impl Debug for ElementRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("kind", &self.kind.as_str())
            .field("focusable", &self.focus.is_some())
            .finish()
    }
}

/// Bound elements of one form, in the order they were first bound.
///
/// Label association and focus order are answered from here rather than by
/// searching the whole window for matching elements.
#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    members: IndexMap<FieldName, ElementRef>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebinding a name swaps the element but keeps its original position.
    pub fn bind(&mut self, name: FieldName, element: ElementRef) {
        self.members.insert(name, element);
    }

    pub fn release(&mut self, name: &str) -> Option<ElementRef> {
        self.members.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ElementRef> {
        self.members.get(name)
    }

    /// Element id a label for `name` should point at.
    pub fn label_target(&self, name: &str) -> Option<SharedString> {
        self.members.get(name).map(|element| element.id.clone())
    }

    pub fn members(&self) -> impl Iterator<Item = (&FieldName, &ElementRef)> {
        self.members.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_keeps_position() {
        let mut registry = FieldRegistry::new();
        registry.bind("year".into(), ElementRef::new("f-year", ElementKind::Input));
        registry.bind("month".into(), ElementRef::new("f-month", ElementKind::Select));
        registry.bind("year".into(), ElementRef::new("f-year-2", ElementKind::Input));

        let order = registry
            .members()
            .map(|(name, element)| (name.to_string(), element.id().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                ("year".to_string(), "f-year-2".to_string()),
                ("month".to_string(), "f-month".to_string()),
            ]
        );
    }

    #[test]
    fn label_target_follows_binding() {
        let mut registry = FieldRegistry::new();
        assert_eq!(registry.label_target("email"), None);

        registry.bind("email".into(), ElementRef::new("f-email", ElementKind::Input));
        assert_eq!(registry.label_target("email"), Some("f-email".into()));

        registry.release("email");
        assert_eq!(registry.label_target("email"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn detached_refs_are_not_focusable() {
        let element = ElementRef::new("f-day", ElementKind::Select);
        assert!(!element.is_focusable());
        assert!(format!("{element:?}").contains(r#"kind: "select""#));
    }
}

mod binding;
mod controller;
mod errors;
mod groups;
mod registry;
mod snapshot;
mod store;
mod submit;
pub mod validation;
mod value;


pub use binding::{ChangeCallback, FieldBinding, FieldOptions};
pub use calmform_derive::FormDefaults;
pub use controller::{Form, FormDefaults, FormError, FormId, FormOptions, FormResult};
pub use errors::{ErrorEntry, ErrorTable};
pub use groups::{ErrorGroups, GroupName};
pub use registry::{ElementKind, ElementRef, FieldRegistry};
pub use snapshot::{SnapshotListener, SubscriptionId, WatchSnapshot};
pub use store::{FieldInfo, FieldStore, RegisterOptions};
pub use submit::{
    InvalidSubmitCallback, SubmitEvent, SubmitHandler, SubmitOutcome, SubmittedValues,
    ValidSubmitCallback,
};
pub use validation::{Predicate, Validator};
pub use value::{FieldName, RawValue, normalize};

//! Form state for uncontrolled inputs.
//!
//! A [`form::Form`] owns the authoritative value, validators and validity of
//! every field, plus a single-slot error table. Views bind to fields through
//! [`form::FieldBinding`] and only re-render for fields they explicitly
//! [watch](form::Form::watch).

pub mod form;
pub mod id;
pub mod prelude;

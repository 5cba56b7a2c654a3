use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::errors::ErrorTable;
use super::value::FieldName;

/// Groups are named with the same rules as fields.
pub type GroupName = FieldName;

/// Fieldset-level error flags.
///
/// A group is a caller-defined set of fields (for example `year`, `month` and
/// `day` of one date) that is displayed as a unit. Its flag is raised as soon
/// as any member has an error and lowered only when every member is clean.
#[derive(Clone, Debug, Default)]
pub struct ErrorGroups {
    members: IndexMap<GroupName, Vec<FieldName>>,
    errored: BTreeSet<GroupName>,
}

impl ErrorGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redefining a group replaces its members and keeps its flag.
    pub fn define<I, N>(&mut self, group: impl Into<GroupName>, members: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<FieldName>,
    {
        self.members
            .insert(group.into(), members.into_iter().map(Into::into).collect());
    }

    pub fn members(&self, group: &str) -> Option<&[FieldName]> {
        self.members.get(group).map(Vec::as_slice)
    }

    pub fn add_group_error(&mut self, group: impl Into<GroupName>) -> bool {
        self.errored.insert(group.into())
    }

    pub fn remove_group_error(&mut self, group: &str) -> bool {
        self.errored.remove(group)
    }

    pub fn is_errored(&self, group: &str) -> bool {
        self.errored.contains(group)
    }

    pub fn errored_groups(&self) -> impl Iterator<Item = &GroupName> {
        self.errored.iter()
    }

    /// Re-derives every group flag from `errors`. Returns whether any flag
    /// changed.
    pub fn recompute(&mut self, errors: &ErrorTable) -> bool {
        let mut changed = false;
        for (group, members) in &self.members {
            let has_error = members.iter().any(|name| errors.contains(name.as_str()));
            if has_error && !self.errored.contains(group.as_str()) {
                self.errored.insert(group.clone());
                tracing::debug!(group = %group, "group entered error state");
                changed = true;
            } else if !has_error && self.errored.remove(group.as_str()) {
                tracing::debug!(group = %group, "group cleared");
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::errors::ErrorEntry;

    fn birthday() -> ErrorGroups {
        let mut groups = ErrorGroups::new();
        groups.define("birthday", ["year", "month", "day"]);
        groups
    }

    #[test]
    fn any_member_error_marks_group() {
        let mut groups = birthday();
        let mut errors = ErrorTable::new();
        errors.set("month".into(), ErrorEntry::new("month", ""));

        assert!(groups.recompute(&errors));
        assert!(groups.is_errored("birthday"));
        assert!(!groups.recompute(&errors));
    }

    #[test]
    fn group_clears_only_when_all_members_pass() {
        let mut groups = birthday();
        let mut errors = ErrorTable::new();
        errors.set("year".into(), ErrorEntry::new("year", ""));
        errors.set("day".into(), ErrorEntry::new("day", ""));
        groups.recompute(&errors);

        errors.remove("year");
        assert!(!groups.recompute(&errors));
        assert!(groups.is_errored("birthday"));

        errors.remove("day");
        assert!(groups.recompute(&errors));
        assert!(!groups.is_errored("birthday"));
    }

    #[test]
    fn manual_flag_is_cleared_by_clean_pass() {
        let mut groups = birthday();
        assert!(groups.add_group_error("birthday"));
        assert!(!groups.add_group_error("birthday"));

        assert!(groups.recompute(&ErrorTable::new()));
        assert!(!groups.is_errored("birthday"));
        assert!(!groups.remove_group_error("birthday"));
    }

    #[test]
    fn errors_outside_the_group_are_ignored() {
        let mut groups = birthday();
        let mut errors = ErrorTable::new();
        errors.set("email".into(), ErrorEntry::new("email", ""));

        assert!(!groups.recompute(&errors));
        assert_eq!(groups.errored_groups().count(), 0);
        assert_eq!(groups.members("birthday").map(<[FieldName]>::len), Some(3));
    }
}

use super::{Permission, Resource};

/// A comma-joined permission grant split into its identifiers.
///
/// Entries are compared by exact string match. Whitespace is not trimmed and
/// unknown identifiers are kept but never match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrant<'a> {
    entries: Vec<&'a str>,
}

impl<'a> PermissionGrant<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let entries = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').collect()
        };
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[&'a str] {
        &self.entries
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.entries.iter().any(|entry| *entry == permission.as_str())
    }

    /// True if at least one of `required` is granted.
    pub fn contains_any(&self, required: &[Permission]) -> bool {
        required.iter().any(|permission| self.contains(*permission))
    }

    /// Catalog permissions present in the grant, in grant order.
    pub fn known(&self) -> impl Iterator<Item = Permission> + '_ {
        self.entries.iter().filter_map(|entry| Permission::parse(entry))
    }
}

/// Checkbox-style selection used by the create-role form.
///
/// Keeps the order in which permissions were picked; `grant()` joins them
/// with commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPicker {
    selected: Vec<Permission>,
}

impl PermissionPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, permission: Permission) -> bool {
        self.selected.contains(&permission)
    }

    pub fn selected(&self) -> &[Permission] {
        &self.selected
    }

    pub fn select(&mut self, permission: Permission) {
        if !self.is_selected(permission) {
            self.selected.push(permission);
        }
    }

    pub fn toggle(&mut self, permission: Permission) {
        if self.is_selected(permission) {
            self.selected.retain(|p| *p != permission);
        } else {
            self.selected.push(permission);
        }
    }

    pub fn all_selected(&self, resource: Resource) -> bool {
        resource.permissions().iter().all(|p| self.is_selected(*p))
    }

    /// Select-all for one resource group: clears the group when it is fully
    /// selected, otherwise adds whatever is missing.
    pub fn toggle_all(&mut self, resource: Resource) {
        if self.all_selected(resource) {
            self.selected.retain(|p| p.resource() != resource);
        } else {
            for permission in resource.permissions() {
                self.select(*permission);
            }
        }
    }

    pub fn grant(&self) -> String {
        self.selected
            .iter()
            .map(Permission::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

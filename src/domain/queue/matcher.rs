//! Queue ownership matching.
//!
//! A stop's `department` may hold a department label or a staff member's
//! name, so deciding whether a stop "belongs" to a viewer is a heuristic.
//! It lives behind [`QueueMatcher`] so deployments can swap it.

use std::collections::HashMap;

use super::Viewer;

/// Decides whether a stop target belongs to a viewer.
pub trait QueueMatcher: Send + Sync {
    fn matches(&self, viewer: &Viewer, target: &str) -> bool;
}

/// Default matcher used by the portal.
///
/// A target matches when any of these hold:
/// - it equals the viewer's id;
/// - it contains the viewer's name, ignoring case (so "Counselling - Meera"
///   matches Meera);
/// - it equals, ignoring case, the viewer's department or one of the
///   configured aliases of that department.
///
/// Name containment is a heuristic, not an identity check: short names can
/// match unrelated targets.
#[derive(Debug, Clone, Default)]
pub struct NameOrDepartmentMatcher {
    /// Lowercased department label → lowercased aliases.
    aliases: HashMap<String, Vec<String>>,
}

impl NameOrDepartmentMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers alternative labels for a department.
    pub fn with_aliases<I, S>(mut self, department: &str, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.aliases.entry(normalize(department)).or_default();
        entry.extend(aliases.into_iter().map(|a| normalize(a.as_ref())));
        self
    }

    /// Builds a matcher from a department → aliases map.
    pub fn from_alias_map(map: &HashMap<String, Vec<String>>) -> Self {
        map.iter()
            .fold(Self::new(), |matcher, (department, aliases)| {
                matcher.with_aliases(department, aliases)
            })
    }

    fn department_matches(&self, department: &str, target: &str) -> bool {
        let department = normalize(department);
        if department.is_empty() {
            return false;
        }
        if department == target {
            return true;
        }
        self.aliases
            .get(&department)
            .map(|aliases| aliases.iter().any(|alias| alias == target))
            .unwrap_or(false)
    }
}

impl QueueMatcher for NameOrDepartmentMatcher {
    fn matches(&self, viewer: &Viewer, target: &str) -> bool {
        if target == viewer.id.as_str() {
            return true;
        }
        let target = normalize(target);
        if target.is_empty() {
            return false;
        }

        let name = normalize(&viewer.name);
        if !name.is_empty() && target.contains(&name) {
            return true;
        }

        viewer
            .department
            .as_deref()
            .map(|department| self.department_matches(department, &target))
            .unwrap_or(false)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StaffId;

    fn meera() -> Viewer {
        Viewer::new(StaffId::new("staff-7").unwrap(), "Meera").with_department("Finance")
    }

    #[test]
    fn matches_by_id() {
        assert!(NameOrDepartmentMatcher::new().matches(&meera(), "staff-7"));
    }

    #[test]
    fn matches_name_substring_ignoring_case() {
        let matcher = NameOrDepartmentMatcher::new();
        assert!(matcher.matches(&meera(), "Counselling - MEERA"));
        assert!(!matcher.matches(&meera(), "Counselling - Ravi"));
    }

    #[test]
    fn matches_department_label_exactly() {
        let matcher = NameOrDepartmentMatcher::new();
        assert!(matcher.matches(&meera(), "finance"));
        assert!(!matcher.matches(&meera(), "Finance Desk"));
    }

    #[test]
    fn matches_configured_aliases() {
        let matcher = NameOrDepartmentMatcher::new().with_aliases("Finance", ["Accounts", "Fees"]);
        assert!(matcher.matches(&meera(), "ACCOUNTS"));
        assert!(matcher.matches(&meera(), "fees"));
        assert!(!matcher.matches(&meera(), "Visa"));
    }

    #[test]
    fn blank_target_never_matches() {
        assert!(!NameOrDepartmentMatcher::new().matches(&meera(), "  "));
    }

    #[test]
    fn blank_viewer_name_does_not_match_everything() {
        let viewer = Viewer::new(StaffId::new("s1").unwrap(), "");
        assert!(!NameOrDepartmentMatcher::new().matches(&viewer, "Admissions"));
    }

    #[test]
    fn alias_map_is_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("FINANCE".to_string(), vec!["Billing".to_string()]);
        let matcher = NameOrDepartmentMatcher::from_alias_map(&map);
        assert!(matcher.matches(&meera(), "billing"));
    }
}

//! Layout data shared by every back-office page.

use angohost_core::{Notice, UserRole};

use crate::models::{CurrentStaff, Section};

/// Staff member view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&CurrentStaff> for AdminUserView {
    fn from(staff: &CurrentStaff) -> Self {
        Self {
            name: staff.name.clone(),
            email: staff.email.clone(),
            role: staff.role,
        }
    }
}

/// One navigation link.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Layout context: who is signed in, the navigation they may use, notices
/// for this render, and the table whose changes reload the page.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub nav: Vec<NavItem>,
    pub notices: Vec<Notice>,
    pub live_table: Option<&'static str>,
}

impl AdminPage {
    #[must_use]
    pub fn new(staff: &CurrentStaff, section: Section) -> Self {
        let nav = Section::ALL
            .iter()
            .filter(|s| staff.can(**s))
            .map(|s| NavItem {
                label: s.label(),
                path: s.path(),
                active: *s == section,
            })
            .collect();

        Self {
            admin_user: AdminUserView::from(staff),
            current_path: section.path(),
            nav,
            notices: Vec::new(),
            live_table: section.table().map(angohost_core::Table::name),
        }
    }

    /// Add a notice if there is one.
    #[must_use]
    pub fn with_notice(mut self, notice: Option<Notice>) -> Self {
        self.notices.extend(notice);
        self
    }
}

#[cfg(test)]
mod tests {
    use angohost_core::UserId;

    use super::*;

    #[test]
    fn test_nav_only_lists_allowed_sections() {
        let staff = CurrentStaff {
            id: UserId::generate(),
            email: "financas@angohost.ao".to_string(),
            name: "Finanças".to_string(),
            role: UserRole::Finance,
        };
        let page = AdminPage::new(&staff, Section::Invoices);

        let labels: Vec<&str> = page.nav.iter().map(|n| n.label).collect();
        assert_eq!(
            labels,
            vec!["Dashboard", "Orders", "Invoices", "Payment methods"]
        );
        assert!(page.nav.iter().any(|n| n.active && n.path == "/invoices"));
        assert_eq!(page.live_table, Some("invoices"));
    }
}

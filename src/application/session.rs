use serde::{Deserialize, Serialize};

use crate::domain::models::Role;

/// The pages the sidebar can offer. Serialized as the human-facing labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Login,
    Register,
    #[serde(rename = "Add Patient")]
    AddPatient,
    #[serde(rename = "View Patients")]
    ViewPatients,
    #[serde(rename = "Admin Dashboard")]
    AdminDashboard,
    #[serde(rename = "Doctor Dashboard")]
    DoctorDashboard,
    Logout,
}

/// Session state machine: logged out, or logged in under one of the roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn { user_id: i64, role: Role },
}

impl SessionState {
    pub fn after_login(user_id: i64, role: Role) -> Self {
        SessionState::LoggedIn { user_id, role }
    }

    /// Logout clears role and user id; only the login page remains reachable.
    pub fn logout(self) -> Self {
        SessionState::LoggedOut
    }

    /// The sidebar menu allowed for this state.
    pub fn menu(&self) -> Vec<Page> {
        match self {
            SessionState::LoggedOut => vec![Page::Login, Page::Register],
            SessionState::LoggedIn { role: Role::Admin, .. } => vec![
                Page::AddPatient,
                Page::ViewPatients,
                Page::AdminDashboard,
                Page::Logout,
            ],
            SessionState::LoggedIn { role: Role::Doctor, .. } => {
                vec![Page::ViewPatients, Page::DoctorDashboard, Page::Logout]
            }
            SessionState::LoggedIn { role: Role::Registrar, .. } => {
                vec![Page::AddPatient, Page::ViewPatients, Page::Logout]
            }
        }
    }

    /// Where the client lands right after a successful login.
    pub fn landing_page(&self) -> Page {
        match self {
            SessionState::LoggedOut => Page::Login,
            SessionState::LoggedIn { role: Role::Admin, .. } => Page::AdminDashboard,
            SessionState::LoggedIn { .. } => Page::AddPatient,
        }
    }

    /// Side-effect-free page selection: allowed only by menu membership.
    pub fn select(&self, page: Page) -> Option<Page> {
        self.menu().contains(&page).then_some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_out_menu_offers_login_and_register() {
        assert_eq!(
            SessionState::LoggedOut.menu(),
            vec![Page::Login, Page::Register]
        );
    }

    #[test]
    fn test_admin_menu() {
        let state = SessionState::after_login(1, Role::Admin);
        assert_eq!(
            state.menu(),
            vec![
                Page::AddPatient,
                Page::ViewPatients,
                Page::AdminDashboard,
                Page::Logout
            ]
        );
    }

    #[test]
    fn test_doctor_menu_has_no_add_patient() {
        let state = SessionState::after_login(2, Role::Doctor);
        assert!(!state.menu().contains(&Page::AddPatient));
        assert!(state.menu().contains(&Page::DoctorDashboard));
    }

    #[test]
    fn test_registrar_menu_has_no_dashboards() {
        let state = SessionState::after_login(3, Role::Registrar);
        assert_eq!(
            state.menu(),
            vec![Page::AddPatient, Page::ViewPatients, Page::Logout]
        );
    }

    #[test]
    fn test_landing_page_by_role() {
        assert_eq!(
            SessionState::after_login(1, Role::Admin).landing_page(),
            Page::AdminDashboard
        );
        assert_eq!(
            SessionState::after_login(2, Role::Doctor).landing_page(),
            Page::AddPatient
        );
        assert_eq!(
            SessionState::after_login(3, Role::Registrar).landing_page(),
            Page::AddPatient
        );
    }

    #[test]
    fn test_select_rejects_pages_outside_menu() {
        let doctor = SessionState::after_login(2, Role::Doctor);
        assert_eq!(doctor.select(Page::AdminDashboard), None);
        assert_eq!(doctor.select(Page::ViewPatients), Some(Page::ViewPatients));

        assert_eq!(SessionState::LoggedOut.select(Page::AddPatient), None);
    }

    #[test]
    fn test_logout_resets_to_logged_out() {
        let state = SessionState::after_login(1, Role::Admin).logout();
        assert_eq!(state, SessionState::LoggedOut);
        assert_eq!(state.landing_page(), Page::Login);
    }
}

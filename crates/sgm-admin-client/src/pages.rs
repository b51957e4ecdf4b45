pub mod dashboard;
pub mod login;
pub mod permissions;

pub use dashboard::UiDashboard;
pub use login::UiLogin;
pub use permissions::UiPermissions;

use tracing::info;

/// The views of the app
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumIter,
)]
pub enum Route {
    Login,
    #[default]
    Dashboard,
    Permissions,
}

impl Route {
    /// Protected views are only shown to an authenticated user
    pub fn is_protected(&self) -> bool {
        match self {
            Route::Login => false,
            Route::Dashboard | Route::Permissions => true,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Iniciar sesión",
            Route::Dashboard => "Inicio",
            Route::Permissions => "Permisos",
        }
    }
}

/// Decides which view is shown based on what was requested and whether the
/// session is authenticated
///
/// A protected view requested without a session shows the login view instead
/// and is shown once the login succeeds
#[derive(Debug, Default)]
pub struct RouteGuard {
    requested: Route,
    after_login: Option<Route>,
}

impl RouteGuard {
    pub fn new(requested: Route) -> Self {
        Self {
            requested,
            after_login: None,
        }
    }

    pub fn navigate(&mut self, to: Route) {
        self.requested = to;
    }

    /// After an explicit logout nothing should be restored on the next login
    pub fn logged_out(&mut self) {
        self.requested = Route::Login;
        self.after_login = None;
    }

    /// The route to show now
    pub fn resolve(&mut self, is_authenticated: bool) -> Route {
        match (self.requested.is_protected(), is_authenticated) {
            (true, false) => {
                info!(requested = ?self.requested, "redirecting to login");
                self.after_login = Some(self.requested);
                self.requested = Route::Login;
            }
            (false, true) => {
                self.requested = self.after_login.take().unwrap_or_default();
            }
            (true, true) | (false, false) => {}
        }
        self.requested
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator as _;

    use super::*;

    #[test]
    fn protected_view_requires_login_and_is_restored() {
        // Arrange
        let mut guard = RouteGuard::new(Route::Dashboard);
        guard.navigate(Route::Permissions);

        // Act / Assert
        assert_eq!(guard.resolve(false), Route::Login);
        assert_eq!(guard.resolve(false), Route::Login);
        assert_eq!(guard.resolve(true), Route::Permissions);
        assert_eq!(guard.resolve(true), Route::Permissions);
    }

    #[test]
    fn session_ending_returns_to_login() {
        let mut guard = RouteGuard::new(Route::Permissions);
        assert_eq!(guard.resolve(true), Route::Permissions);
        assert_eq!(guard.resolve(false), Route::Login);
        assert_eq!(guard.resolve(true), Route::Permissions);
    }

    #[test]
    fn logout_forgets_requested_view() {
        let mut guard = RouteGuard::new(Route::Permissions);
        guard.logged_out();
        assert_eq!(guard.resolve(false), Route::Login);
        assert_eq!(guard.resolve(true), Route::Dashboard);
    }

    #[rstest]
    #[case(Route::Login, false)]
    #[case(Route::Dashboard, true)]
    #[case(Route::Permissions, true)]
    fn protection(#[case] route: Route, #[case] expected: bool) {
        assert_eq!(route.is_protected(), expected);
    }

    #[test]
    fn titles_are_unique() {
        let titles: Vec<_> = Route::iter().map(|r| r.title()).collect();
        let mut deduped = titles.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(titles.len(), deduped.len());
    }
}

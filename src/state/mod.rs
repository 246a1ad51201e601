use crate::api::{ApiClient, ApiError};
use crate::models::User;
use crate::storage::load_user_from_storage;
use leptos::prelude::*;

/// Session state shared across pages.
///
/// The credential lives inside the `api_client` signal rather than being read
/// ad hoc from storage on every request, so a cleared token is observed by
/// every subscriber at once.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<User>>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

impl AppContext {
    pub fn is_authenticated(&self) -> bool {
        self.0.api_client.get().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.0
            .current_user
            .get()
            .map(|u| u.is_admin())
            .unwrap_or(false)
    }

    pub fn logout(&self) {
        let mut api_client = self.0.api_client.get_untracked();
        api_client.logout();
        self.0.api_client.set(api_client);
        self.0.current_user.set(None);
    }

    /// Credential is missing or invalid: wipe the session and send the viewer
    /// to the login screen. Not locally recoverable.
    pub fn force_relogin(&self) {
        self.logout();
        let _ = window().location().set_href("/admin/login");
    }

    /// Shared error path for every request-issuing page, public ones
    /// included: unauthorized responses end the session, everything else
    /// lands in the page's error signal.
    pub fn report_error(&self, error_signal: RwSignal<Option<String>>, e: ApiError) {
        if e.ends_session() {
            self.force_relogin();
        } else {
            error_signal.set(Some(e.to_string()));
        }
    }
}

//! Login / signup page.

use std::sync::Arc;

use referhub_models::SignupRequest;
use tracing::{error, info};

use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::session::SessionStore;
use crate::shell::AuthFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

/// Shared by both modes. `full_name` is only shown and required in signup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl AuthForm {
    fn missing_field(&self, mode: AuthMode) -> Option<&'static str> {
        if self.email.trim().is_empty() {
            Some("Email")
        } else if self.password.is_empty() {
            Some("Password")
        } else if mode == AuthMode::Signup && self.full_name.trim().is_empty() {
            Some("Full name")
        } else {
            None
        }
    }
}

pub struct AuthPage {
    api: ApiClient,
    session: SessionStore,
    authenticated: AuthFlag,
    notifier: Arc<dyn Notifier>,
    mode: AuthMode,
    form: AuthForm,
    loading: bool,
}

impl AuthPage {
    pub fn new(
        api: ApiClient,
        session: SessionStore,
        authenticated: AuthFlag,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            session,
            authenticated,
            notifier,
            mode: AuthMode::default(),
            form: AuthForm::default(),
            loading: false,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
    }

    /// Switches between login and signup. No field is cleared.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        };
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AuthForm {
        &mut self.form
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            AuthMode::Login => "Welcome Back",
            AuthMode::Signup => "Create Account",
        }
    }

    /// Submits the form for the current mode. Returns whether the user is now
    /// authenticated. Failures never touch the session or the flag.
    pub async fn submit(&mut self) -> bool {
        if let Some(field) = self.form.missing_field(self.mode) {
            self.notifier.error(&format!("{field} is required"));
            return false;
        }

        self.loading = true;
        let result = match self.mode {
            AuthMode::Login => self.api.login(&self.form.email, &self.form.password).await,
            AuthMode::Signup => {
                self.api
                    .signup(&SignupRequest {
                        email: self.form.email.clone(),
                        password: self.form.password.clone(),
                        full_name: self.form.full_name.clone(),
                    })
                    .await
            }
        };
        self.loading = false;

        let auth = match result {
            Ok(auth) => auth,
            Err(e) => {
                info!("Authentication failed: {e}");
                self.notifier.error(&e.detail_or("Authentication failed"));
                return false;
            }
        };

        if let Err(e) = self.session.save(&auth) {
            error!("Failed to persist session: {e}");
            // Roll back a possibly half-written session.
            if let Err(e) = self.session.clear() {
                error!("Failed to clear half-written session: {e}");
            }
            self.notifier.error("Authentication failed");
            return false;
        }

        self.authenticated.set(true);
        self.notifier.success(match self.mode {
            AuthMode::Login => "Login successful!",
            AuthMode::Signup => "Account created successfully!",
        });
        true
    }
}

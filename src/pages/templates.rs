use askama::Template;

#[derive(Template, Default)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
    pub notice: Option<&'static str>,
    pub username: String,
}

#[derive(Template, Default)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub error: Option<String>,
    pub username: String,
    pub email: String,
}

#[derive(Template, Default)]
#[template(path = "forgot_password.html")]
pub struct ForgotPasswordPage {
    pub error: Option<String>,
    pub notice: Option<&'static str>,
}

#[derive(Template)]
#[template(path = "reset_password.html")]
pub struct ResetPasswordPage {
    pub token: String,
    pub error: Option<String>,
    /// False when the token is unknown, used or expired; hides the form.
    pub valid: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub username: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub username: String,
    pub email: String,
    pub member_since: String,
    pub last_login: String,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsPage {
    pub username: String,
    pub email: String,
    pub error: Option<String>,
    pub notice: Option<&'static str>,
}

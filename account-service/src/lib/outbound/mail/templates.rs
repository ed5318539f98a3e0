use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::Password;

/// Rendered subject and plain-text body of an outbound mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub subject: String,
    pub body: String,
}

/// Activation link for `key` under the service's public base URL.
pub fn activation_link(public_url: &str, key: &ActivationKey) -> String {
    format!("{}/activation/{}", public_url.trim_end_matches('/'), key)
}

pub fn activation(login_name: &LoginName, link: &str) -> MailContent {
    MailContent {
        subject: "Activate your account".to_string(),
        body: format!(
            "Hello {name},\n\n\
             Thanks for signing up. Open the link below to activate your account:\n\n\
             {link}\n\n\
             If you did not sign up, you can ignore this mail.\n",
            name = login_name.display_name(),
            link = link,
        ),
    }
}

pub fn temporary_password(login_name: &LoginName, password: &Password) -> MailContent {
    MailContent {
        subject: "Your temporary password".to_string(),
        body: format!(
            "Hello {name},\n\n\
             A password reset was requested for your account. Log in once with\n\
             this temporary password and then set a new one:\n\n\
             {password}\n\n\
             The temporary password works for a single login.\n",
            name = login_name.display_name(),
            password = password.as_str(),
        ),
    }
}

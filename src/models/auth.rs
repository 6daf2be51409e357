use super::Id;
use crate::entity::Validate;
use crate::error::{Error, Result};
use crate::validation::{optional_email, require_text};
use serde::{Deserialize, Serialize};

/// Body for `POST /auth/login`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl Validate for LoginInput {
    fn validate(&self) -> Result<()> {
        require_text("Username", &self.username)?;
        require_text("Password", &self.password)
    }
}

/// Body for `POST /auth/register`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterInput {
    fn validate(&self) -> Result<()> {
        require_text("Username", &self.username)?;
        require_text("Email", &self.email)?;
        optional_email(Some(&self.email))?;
        require_text("Password", &self.password)
    }
}

/// Body for `PUT /auth/change-password`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for ChangePasswordInput {
    fn validate(&self) -> Result<()> {
        require_text("Current password", &self.current_password)?;
        require_text("New password", &self.new_password)?;
        if self.current_password == self.new_password {
            return Err(Error::ValidationError(
                "New password must differ from the current password".to_string(),
            ));
        }
        Ok(())
    }
}

/// Body for `PUT /auth/profile`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub email: String,
}

impl Validate for ProfileInput {
    fn validate(&self) -> Result<()> {
        require_text("Email", &self.email)?;
        optional_email(Some(&self.email))
    }
}

/// Body returned by login, register, `/auth/me` and profile updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthResponse {
    /// The signed-in user, when the response carries one.
    pub fn user(&self) -> Option<AuthUser> {
        Some(AuthUser {
            id: self.id?,
            username: self.username.clone()?,
            email: self.email.clone(),
            role: self.role.clone(),
        })
    }
}

/// The account behind the current session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Id,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_user() {
        let json = r#"{"message":"Current user","id":1,"username":"admin","email":"a@b.co","role":"ADMIN"}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        let user = response.user().unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role.as_deref(), Some("ADMIN"));

        let empty: AuthResponse = serde_json::from_str(r#"{"message":"ok"}"#).unwrap();
        assert!(empty.user().is_none());
    }

    #[test]
    fn test_change_password_wire_names() {
        let input = ChangePasswordInput {
            current_password: "old".to_string(),
            new_password: "new".to_string(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["currentPassword"], "old");
        assert_eq!(value["newPassword"], "new");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let input = LoginInput {
            username: "admin".to_string(),
            password: String::new(),
        };
        assert_eq!(
            input.validate().unwrap_err().user_message(),
            "Password is required"
        );
    }
}

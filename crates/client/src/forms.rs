//! Login and signup form validation.
//!
//! Errors are translation keys, the same ones the web client renders.

use serde::Serialize;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Username,
    Password,
    ConfirmPassword,
}

/// One failed field and the key of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub key: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.username.is_empty() {
            errors.push(FieldError { field: Field::Username, key: "login.errors.required" });
        }
        if self.password.is_empty() {
            errors.push(FieldError { field: Field::Password, key: "login.errors.required" });
        }
        finish(errors)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let username_len = self.username.chars().count();
        if username_len == 0 {
            errors.push(FieldError { field: Field::Username, key: "signup.errors.required" });
        } else if !(USERNAME_MIN..=USERNAME_MAX).contains(&username_len) {
            errors.push(FieldError { field: Field::Username, key: "signup.errors.usernameLength" });
        }

        if self.password.is_empty() {
            errors.push(FieldError { field: Field::Password, key: "signup.errors.required" });
        } else if self.password.chars().count() < PASSWORD_MIN {
            errors.push(FieldError { field: Field::Password, key: "signup.errors.passwordMin" });
        }

        if self.confirm_password.is_empty() {
            errors.push(FieldError { field: Field::ConfirmPassword, key: "signup.errors.required" });
        } else if self.confirm_password != self.password {
            errors.push(FieldError { field: Field::ConfirmPassword, key: "signup.errors.passwordMatch" });
        }

        finish(errors)
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

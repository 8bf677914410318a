use crate::{validate_not_blank, Error, User};

#[derive(Clone, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthToken(pub String);

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Error> {
        validate_not_blank("Username or email", &self.identifier)?;
        validate_not_blank("Password", &self.password)?;
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: AuthToken,
}

/// First registration step: the backend mails a verification code
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct VerifyRegister {
    pub email: String,
    pub username: String,
    pub password: String,
    pub code: String,
}

impl VerifyRegister {
    pub fn validate(&self) -> Result<(), Error> {
        validate_not_blank("Email", &self.email)?;
        validate_not_blank("Username", &self.username)?;
        validate_not_blank("Password", &self.password)?;
        validate_not_blank("Verification code", &self.code)?;
        Ok(())
    }
}

/// First password reset step: the backend mails a verification code
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
pub struct VerifyPasswordReset {
    pub email: String,
    pub password: String,
    pub code: String,
}

impl VerifyPasswordReset {
    pub fn validate(&self) -> Result<(), Error> {
        validate_not_blank("Email", &self.email)?;
        validate_not_blank("Password", &self.password)?;
        validate_not_blank("Verification code", &self.code)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_validation() {
        let req = LoginRequest {
            identifier: String::from("  "),
            password: String::from("x"),
        };
        assert_eq!(
            req.validate(),
            Err(Error::Validation(String::from("Username or email is required"))),
        );
    }

    #[test]
    fn login_response() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"user":{"ID":3,"username":"bob","email":"b@example.org"},"token":"abc.def"}"#,
        )
        .unwrap();
        assert_eq!(resp.token, AuthToken(String::from("abc.def")));
        assert_eq!(resp.user.email.as_deref(), Some("b@example.org"));
    }
}

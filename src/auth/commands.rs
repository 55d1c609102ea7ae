// Request validation for the session lifecycle
//
// Each operation turns its loosely-typed request body into a typed command.
// Validation is pure; anything that needs a store happens in
// `AuthService::execute`.

use crate::auth::{
    error::AuthError,
    models::{
        EmptyResponse, LoginRequest, RefreshTokenRequest, RenewResponse, SessionResponse,
        SignupRequest,
    },
    policy::{PasswordPolicy, UserAttributes},
};
use crate::error::ErrorCode;
use crate::validation::{
    is_valid_email, length_within, normalize_email, required_str, required_trimmed, FieldIssue,
};
use serde::Serialize;
use serde_json::Value;

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 64;
const EMAIL_MIN_LEN: usize = 3;
const EMAIL_MAX_LEN: usize = 192;

/// Error codes for one field, by failure kind
struct FieldCodes {
    required: ErrorCode,
    type_mismatch: ErrorCode,
}

impl FieldCodes {
    fn for_issue(&self, issue: FieldIssue) -> ErrorCode {
        match issue {
            FieldIssue::Required => self.required,
            FieldIssue::TypeMismatch => self.type_mismatch,
        }
    }
}

const FIRST_NAME: FieldCodes = FieldCodes {
    required: ErrorCode::FirstNameRequired,
    type_mismatch: ErrorCode::FirstNameTypeMismatch,
};
const LAST_NAME: FieldCodes = FieldCodes {
    required: ErrorCode::LastNameRequired,
    type_mismatch: ErrorCode::LastNameTypeMismatch,
};
const EMAIL: FieldCodes = FieldCodes {
    required: ErrorCode::EmailRequired,
    type_mismatch: ErrorCode::EmailTypeMismatch,
};
const PASSWORD: FieldCodes = FieldCodes {
    required: ErrorCode::PasswordRequired,
    type_mismatch: ErrorCode::PasswordTypeMismatch,
};
const PASSWORD1: FieldCodes = FieldCodes {
    required: ErrorCode::Password1Required,
    type_mismatch: ErrorCode::Password1TypeMismatch,
};
const PASSWORD2: FieldCodes = FieldCodes {
    required: ErrorCode::Password2Required,
    type_mismatch: ErrorCode::Password2TypeMismatch,
};

/// Collects codes in check order
#[derive(Default)]
struct Violations(Vec<ErrorCode>);

impl Violations {
    fn string<'a>(&mut self, value: Option<&'a Value>, codes: &FieldCodes) -> Option<&'a str> {
        required_str(value)
            .map_err(|issue| self.0.push(codes.for_issue(issue)))
            .ok()
    }

    fn trimmed<'a>(&mut self, value: Option<&'a Value>, codes: &FieldCodes) -> Option<&'a str> {
        required_trimmed(value)
            .map_err(|issue| self.0.push(codes.for_issue(issue)))
            .ok()
    }

    fn name<'a>(
        &mut self,
        value: Option<&'a Value>,
        codes: &FieldCodes,
        length_code: ErrorCode,
    ) -> Option<&'a str> {
        let name = self.trimmed(value, codes)?;
        if !length_within(name, NAME_MIN_LEN, NAME_MAX_LEN) {
            self.0.push(length_code);
            return None;
        }
        Some(name)
    }

    fn email(&mut self, value: Option<&Value>) -> Option<String> {
        let email = self.trimmed(value, &EMAIL)?;
        if !length_within(email, EMAIL_MIN_LEN, EMAIL_MAX_LEN) {
            self.0.push(ErrorCode::EmailLengthMismatch);
            return None;
        }
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            self.0.push(ErrorCode::InvalidEmailFormat);
            return None;
        }
        Some(email)
    }

    fn push(&mut self, code: ErrorCode) {
        self.0.push(code);
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, AuthError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(AuthError::ValidationError(self.0))
        }
    }
}

/// Validated signup input
#[derive(Debug, Clone)]
pub struct SignupCommand {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl SignupCommand {
    /// Checks every field and reports all violations together
    ///
    /// Fields are checked in the order first name, last name, email, password;
    /// within a field the first failing check wins.
    pub fn validate(request: &SignupRequest, policy: &PasswordPolicy) -> Result<Self, AuthError> {
        let mut violations = Violations::default();

        let first_name = violations.name(
            request.first_name.as_ref(),
            &FIRST_NAME,
            ErrorCode::FirstNameLengthMismatch,
        );
        let last_name = violations.name(
            request.last_name.as_ref(),
            &LAST_NAME,
            ErrorCode::LastNameLengthMismatch,
        );
        let email = violations.email(request.email.as_ref());

        let password = if request.password1.is_some() || request.password2.is_some() {
            let password1 = violations.string(request.password1.as_ref(), &PASSWORD1);
            let password2 = violations.string(request.password2.as_ref(), &PASSWORD2);
            match (password1, password2) {
                (Some(p1), Some(p2)) if p1 != p2 => {
                    violations.push(ErrorCode::PasswordsMismatch);
                    None
                }
                (Some(p1), Some(_)) => Some(p1),
                _ => None,
            }
        } else {
            violations.string(request.password.as_ref(), &PASSWORD)
        };

        if let Some(password) = password {
            let attributes = UserAttributes {
                email: email.as_deref().unwrap_or_default(),
                first_name: first_name.unwrap_or_default(),
                last_name: last_name.unwrap_or_default(),
            };
            if !policy.is_acceptable(password, Some(attributes)) {
                violations.push(ErrorCode::PasswordTooWeak);
            }
        }

        violations.into_result(|| Self {
            email: email.unwrap_or_default(),
            first_name: first_name.unwrap_or_default().to_string(),
            last_name: last_name.unwrap_or_default().to_string(),
            password: password.unwrap_or_default().to_string(),
        })
    }
}

/// Validated login input
#[derive(Debug, Clone)]
pub struct LoginCommand {
    /// Normalized
    pub email: String,
    pub password: String,
}

impl LoginCommand {
    /// Only presence and type are checked; anything else is a credentials failure
    pub fn validate(request: &LoginRequest) -> Result<Self, AuthError> {
        let mut violations = Violations::default();
        let email = violations.trimmed(request.email.as_ref(), &EMAIL);
        let password = violations.string(request.password.as_ref(), &PASSWORD);

        violations.into_result(|| Self {
            email: normalize_email(email.unwrap_or_default()),
            password: password.unwrap_or_default().to_string(),
        })
    }
}

/// The refresh token from a renew or logout body
fn refresh_token(request: &RefreshTokenRequest) -> Result<String, AuthError> {
    match required_str(request.refresh_token.as_ref()) {
        Ok(token) => Ok(token.to_string()),
        Err(FieldIssue::Required) => Err(AuthError::RefreshTokenRequired),
        Err(FieldIssue::TypeMismatch) => Err(AuthError::InvalidRefreshToken),
    }
}

/// Validated renew input, bound to the bearer's identity
#[derive(Debug, Clone)]
pub struct RenewCommand {
    pub user_id: i32,
    pub refresh_token: String,
}

impl RenewCommand {
    pub fn validate(user_id: i32, request: &RefreshTokenRequest) -> Result<Self, AuthError> {
        Ok(Self {
            user_id,
            refresh_token: refresh_token(request)?,
        })
    }
}

/// Validated logout input, bound to the bearer's identity
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub user_id: i32,
    pub refresh_token: String,
}

impl LogoutCommand {
    pub fn validate(user_id: i32, request: &RefreshTokenRequest) -> Result<Self, AuthError> {
        Ok(Self {
            user_id,
            refresh_token: refresh_token(request)?,
        })
    }
}

/// Every operation the session lifecycle accepts
#[derive(Debug, Clone)]
pub enum AuthCommand {
    Signup(SignupCommand),
    Login(LoginCommand),
    Renew(RenewCommand),
    Logout(LogoutCommand),
    LogoutAll { user_id: i32 },
}

/// Result of executing an `AuthCommand`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AuthOutput {
    Session(SessionResponse),
    Renewed(RenewResponse),
    Done(EmptyResponse),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PasswordPolicyConfig;
    use serde_json::json;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(PasswordPolicyConfig::default())
    }

    fn signup(body: Value) -> Result<SignupCommand, AuthError> {
        let request: SignupRequest = serde_json::from_value(body).unwrap();
        SignupCommand::validate(&request, &policy())
    }

    fn codes(result: Result<SignupCommand, AuthError>) -> Vec<ErrorCode> {
        match result {
            Err(AuthError::ValidationError(codes)) => codes,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_signup_normalizes_fields() {
        let command = signup(json!({
            "first_name": " John ",
            "last_name": "Doe",
            "email": " jDoE@eXamPlE.Com ",
            "password": "ABC123!xyz"
        }))
        .unwrap();

        assert_eq!(command.email, "jdoe@example.com");
        assert_eq!(command.first_name, "John");
        assert_eq!(command.password, "ABC123!xyz");
    }

    #[test]
    fn test_signup_empty_body_reports_every_field_in_order() {
        assert_eq!(
            codes(signup(json!({}))),
            vec![
                ErrorCode::FirstNameRequired,
                ErrorCode::LastNameRequired,
                ErrorCode::EmailRequired,
                ErrorCode::PasswordRequired,
            ]
        );
    }

    #[test]
    fn test_signup_first_failing_check_per_field() {
        let result = signup(json!({
            "first_name": 7,
            "last_name": "D",
            "email": "not-an-email",
            "password": "weak"
        }));

        assert_eq!(
            codes(result),
            vec![
                ErrorCode::FirstNameTypeMismatch,
                ErrorCode::LastNameLengthMismatch,
                ErrorCode::InvalidEmailFormat,
                ErrorCode::PasswordTooWeak,
            ]
        );
    }

    #[test]
    fn test_signup_email_length_checked_before_format() {
        let result = signup(json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "ab",
            "password": "ABC123!xyz"
        }));
        assert_eq!(codes(result), vec![ErrorCode::EmailLengthMismatch]);
    }

    #[test]
    fn test_signup_password_pair() {
        let base = json!({ "first_name": "John", "last_name": "Doe", "email": "jdoe@example.com" });

        let mut body = base.clone();
        body["password1"] = json!("ABC123!xyz");
        body["password2"] = json!("ABC123!xyZ");
        assert_eq!(codes(signup(body)), vec![ErrorCode::PasswordsMismatch]);

        let mut body = base.clone();
        body["password1"] = json!("ABC123!xyz");
        assert_eq!(codes(signup(body)), vec![ErrorCode::Password2Required]);

        let mut body = base;
        body["password1"] = json!("ABC123!xyz");
        body["password2"] = json!("ABC123!xyz");
        assert_eq!(signup(body).unwrap().password, "ABC123!xyz");
    }

    #[test]
    fn test_signup_password_containing_name_is_weak() {
        let result = signup(json!({
            "first_name": "Johnny",
            "last_name": "Doe",
            "email": "jdoe@example.com",
            "password": "Johnny123!"
        }));
        assert_eq!(codes(result), vec![ErrorCode::PasswordTooWeak]);
    }

    #[test]
    fn test_login_checks_presence_and_type_only() {
        let request: LoginRequest =
            serde_json::from_value(json!({ "email": " JDoe@Example.com ", "password": " pw " }))
                .unwrap();
        let command = LoginCommand::validate(&request).unwrap();
        assert_eq!(command.email, "jdoe@example.com");
        assert_eq!(command.password, " pw ");

        let request: LoginRequest =
            serde_json::from_value(json!({ "email": 1, "password": null })).unwrap();
        match LoginCommand::validate(&request) {
            Err(AuthError::ValidationError(codes)) => assert_eq!(
                codes,
                vec![ErrorCode::EmailTypeMismatch, ErrorCode::PasswordRequired]
            ),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_token_field() {
        let parse = |body: Value| {
            let request: RefreshTokenRequest = serde_json::from_value(body).unwrap();
            RenewCommand::validate(1, &request)
        };

        assert!(matches!(parse(json!({})), Err(AuthError::RefreshTokenRequired)));
        assert!(matches!(
            parse(json!({ "refresh_token": "" })),
            Err(AuthError::RefreshTokenRequired)
        ));
        assert!(matches!(
            parse(json!({ "refresh_token": 42 })),
            Err(AuthError::InvalidRefreshToken)
        ));
        assert_eq!(parse(json!({ "refresh_token": "abc" })).unwrap().refresh_token, "abc");
    }
}

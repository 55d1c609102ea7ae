// Password composition policy

use crate::config::PasswordPolicyConfig;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Shortest user attribute that is matched against the password
const MIN_ATTRIBUTE_LEN: usize = 3;

/// A single composition rule a password can violate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    SpecialCharacter,
    UserAttributeSimilarity,
}

/// The user attributes a password must not contain
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAttributes<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

fn class_patterns() -> &'static [(PasswordRule, Regex); 4] {
    static PATTERNS: OnceLock<[(PasswordRule, Regex); 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("static pattern compiles");
        [
            (PasswordRule::Uppercase, compile(r"[A-Z]")),
            (PasswordRule::Lowercase, compile(r"[a-z]")),
            (PasswordRule::Digit, compile(r"[0-9]")),
            (PasswordRule::SpecialCharacter, compile(r"[[:punct:]]")),
        ]
    })
}

/// Validates passwords against the configured rule set
///
/// Rules are combined with logical AND. The password is inspected as given,
/// never trimmed or otherwise altered.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    config: PasswordPolicyConfig,
}

impl PasswordPolicy {
    pub fn new(config: PasswordPolicyConfig) -> Self {
        Self { config }
    }

    /// Every violated rule, in rule order; empty when the password passes
    pub fn validate(&self, password: &str, user: Option<UserAttributes<'_>>) -> Vec<PasswordRule> {
        let mut violations = Vec::new();

        if password.chars().count() < self.config.min_length {
            violations.push(PasswordRule::MinLength);
        }

        for (rule, pattern) in class_patterns() {
            if !pattern.is_match(password) {
                violations.push(*rule);
            }
        }

        if self.config.check_user_attributes {
            if let Some(user) = user {
                if resembles_user(password, &user) {
                    violations.push(PasswordRule::UserAttributeSimilarity);
                }
            }
        }

        violations
    }

    /// Shorthand for `validate(..).is_empty()`
    pub fn is_acceptable(&self, password: &str, user: Option<UserAttributes<'_>>) -> bool {
        self.validate(password, user).is_empty()
    }

    /// The enabled rules, in evaluation order
    pub fn rules(&self) -> Vec<PasswordRule> {
        let mut rules = vec![
            PasswordRule::MinLength,
            PasswordRule::Uppercase,
            PasswordRule::Lowercase,
            PasswordRule::Digit,
            PasswordRule::SpecialCharacter,
        ];
        if self.config.check_user_attributes {
            rules.push(PasswordRule::UserAttributeSimilarity);
        }
        rules
    }

    /// Human-readable help text for one rule
    pub fn help_text(&self, rule: PasswordRule) -> String {
        match rule {
            PasswordRule::MinLength => format!(
                "Your password must contain at least {} characters.",
                self.config.min_length
            ),
            PasswordRule::Uppercase => {
                "Your password must contain at least one uppercase letter.".to_string()
            }
            PasswordRule::Lowercase => {
                "Your password must contain at least one lowercase letter.".to_string()
            }
            PasswordRule::Digit => "Your password must contain at least one digit.".to_string(),
            PasswordRule::SpecialCharacter => {
                "Your password must contain at least one special character.".to_string()
            }
            PasswordRule::UserAttributeSimilarity => {
                "Your password can't contain your email address or your name.".to_string()
            }
        }
    }

    /// Help texts of all enabled rules, derived from the rule set
    pub fn help_texts(&self) -> Vec<String> {
        self.rules()
            .into_iter()
            .map(|rule| self.help_text(rule))
            .collect()
    }
}

fn resembles_user(password: &str, user: &UserAttributes<'_>) -> bool {
    let folded = password.to_lowercase();
    let local_part = user.email.split('@').next().unwrap_or_default();

    [local_part, user.first_name, user.last_name]
        .iter()
        .map(|attribute| attribute.trim().to_lowercase())
        .filter(|attribute| attribute.chars().count() >= MIN_ATTRIBUTE_LEN)
        .any(|attribute| folded.contains(&attribute))
}

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Rejections produced while validating a registration request. Messages are
/// written to be returned verbatim in API responses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must be at least {0} characters")]
    UsernameTooShort(usize),

    #[error("username must be at most {0} characters")]
    UsernameTooLong(usize),

    #[error("username may only contain letters, digits and underscores, got '{0}'")]
    UsernameInvalidCharacter(char),

    #[error("email is not a valid address")]
    EmailInvalid,

    #[error("email must be at most {0} characters")]
    EmailTooLong(usize),

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("password must be at most {0} characters")]
    PasswordTooLong(usize),
}

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 100;

/// Validate a username: 3 to 50 characters, ASCII letters, digits or
/// underscores only.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.chars().count();
    if length < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }
    if length > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(ValidationError::UsernameInvalidCharacter(c));
        }
    }

    Ok(())
}

/// Validate an email address: shaped like `local@domain.tld` with no
/// whitespace, at most 100 characters.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailInvalid);
    }

    Ok(())
}

/// Validate a plaintext password: 8 to 100 characters. No character classes
/// are required.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

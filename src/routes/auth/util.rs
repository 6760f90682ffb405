use std::borrow::Cow;

use actix_web::{
    web::{self, post},
    Scope,
};
use regex::Regex;
use validator::ValidationError;

use super::{login_user, register_user};

pub fn auth_source() -> Scope {
    web::scope("/auth")
        .route("/register", web::post().to(register_user))
        .route("/login", post().to(login_user))
}

const CHECK_FOR_LETTER: &str = ".*[A-Za-z].*";
const CHECK_FOR_NUMBER: &str = ".*[0-9].*";

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 6 {
        return Err(ValidationError::new("Password length")
            .with_message(Cow::from("Password must be at least 6 characters long")));
    }
    let letter_pattern = Regex::new(CHECK_FOR_LETTER).unwrap();
    let number_pattern = Regex::new(CHECK_FOR_NUMBER).unwrap();

    if !letter_pattern.is_match(password) || !number_pattern.is_match(password) {
        return Err(ValidationError::new("Password content")
            .with_message(Cow::from("Password must contain letters and numbers")));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().len() < 2 {
        return Err(ValidationError::new("Name length")
            .with_message(Cow::from("Name must be at least 2 characters long")));
    }
    if name.len() > 100 {
        return Err(ValidationError::new("Name length")
            .with_message(Cow::from("Name must be less than 100 characters")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_shorter_than_six_characters_is_rejected() {
        assert!(validate_password("a1b2c").is_err());
        assert!(validate_password("a1b2c3").is_ok());
    }

    #[test]
    fn password_without_letters_or_numbers_is_rejected() {
        assert!(validate_password("123456").is_err());
        assert!(validate_password("abcdef").is_err());
        assert!(validate_password("abc123").is_ok());
    }

    #[test]
    fn name_must_have_two_non_whitespace_characters() {
        assert!(validate_name("a").is_err());
        assert!(validate_name("  a  ").is_err());
        assert!(validate_name("Jo").is_ok());
    }
}

//! Signup field validation (§4.8 "Signup").

use crate::{Error, Result};

pub fn username(value: &str) -> Result<()> {
    let len_ok = (3..=16).contains(&value.chars().count());
    if len_ok && value.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(Error::InvalidUsername)
    }
}

pub fn password(value: &str) -> Result<()> {
    if (4..=16).contains(&value.chars().count()) {
        Ok(())
    } else {
        Err(Error::InvalidPassword)
    }
}

/// A minimal `x@y.z` shape check — this is account signup, not full RFC 5322.
pub fn email(value: &str) -> Result<()> {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(Error::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(Error::InvalidEmail);
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return Err(Error::InvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_accepts_alphanumeric_within_length() {
        assert!(username("Thrall123").is_ok());
        assert!(username("ab").is_err());
        assert!(username(&"a".repeat(17)).is_err());
        assert!(username("bad name").is_err());
    }

    #[test]
    fn password_accepts_four_to_sixteen_chars() {
        assert!(password("pass").is_ok());
        assert!(password("p").is_err());
        assert!(password(&"p".repeat(17)).is_err());
    }

    #[test]
    fn email_requires_local_at_domain_dot_tld() {
        assert!(email("a@b.com").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(email("a@b").is_err());
        assert!(email("@b.com").is_err());
        assert!(email("a@.com").is_err());
    }
}

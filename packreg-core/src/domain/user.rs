//! User domain model

use serde::Serialize;

use super::password::PasswordHash;
use super::result::{Error, Result};

/// Identity and credential fields shared by every person in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    first_name: String,
    last_name: String,
    id: String,
    email: String,
    #[serde(skip)]
    password: PasswordHash,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        id: impl Into<String>,
        email: impl Into<String>,
        password: PasswordHash,
    ) -> Result<Self> {
        let mut user = Self {
            first_name: String::new(),
            last_name: String::new(),
            id: String::new(),
            email: String::new(),
            password,
        };
        user.set_first_name(first_name)?;
        user.set_last_name(last_name)?;
        user.set_id(id)?;
        user.set_email(email)?;
        Ok(user)
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &PasswordHash {
        &self.password
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) -> Result<()> {
        self.first_name = required(first_name.into(), "Invalid first name")?;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) -> Result<()> {
        self.last_name = required(last_name.into(), "Invalid last name")?;
        Ok(())
    }

    fn set_id(&mut self, id: impl Into<String>) -> Result<()> {
        self.id = required(id.into(), "Invalid id")?;
        Ok(())
    }

    /// Email must contain '@' with a '.' somewhere after the last '@'
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<()> {
        let email = required(email.into(), "Invalid email")?;
        let at = email.rfind('@').ok_or_else(|| Error::invalid_argument("Invalid email"))?;
        let dot = email.rfind('.').ok_or_else(|| Error::invalid_argument("Invalid email"))?;
        if dot < at {
            return Err(Error::invalid_argument("Invalid email"));
        }
        self.email = email;
        Ok(())
    }

    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }
}

fn required(value: String, msg: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_argument(msg));
    }
    Ok(trimmed.to_string())
}

/// Anything that can be held in a directory
pub trait Person {
    fn user(&self) -> &User;

    fn id(&self) -> &str {
        self.user().id()
    }
}

impl Person for User {
    fn user(&self) -> &User {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HashAlgorithm;

    fn pw() -> PasswordHash {
        HashAlgorithm::Sha256.hash("pw")
    }

    #[test]
    fn test_user_creation() {
        let user = User::new("Jane", "Doe", "jdoe", "jdoe@ncsu.edu", pw()).unwrap();
        assert_eq!(user.id(), "jdoe");
        assert_eq!(user.email(), "jdoe@ncsu.edu");
        assert_eq!(user.first_name(), "Jane");
    }

    #[test]
    fn test_user_rejects_blank_fields() {
        assert!(User::new("", "Doe", "jdoe", "jdoe@ncsu.edu", pw()).is_err());
        assert!(User::new("Jane", " ", "jdoe", "jdoe@ncsu.edu", pw()).is_err());
        assert!(User::new("Jane", "Doe", "", "jdoe@ncsu.edu", pw()).is_err());
    }

    #[test]
    fn test_email_validation() {
        assert!(User::new("Jane", "Doe", "jdoe", "jdoe.ncsu.edu", pw()).is_err());
        assert!(User::new("Jane", "Doe", "jdoe", "jdoe@ncsuedu", pw()).is_err());
        assert!(User::new("Jane", "Doe", "jdoe", "j.doe@ncsu", pw()).is_err());
        assert!(User::new("Jane", "Doe", "jdoe", "j.doe@ncsu.edu", pw()).is_ok());
    }
}

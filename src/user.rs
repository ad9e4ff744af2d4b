//! Authorization context
//!
//! Every evaluation call carries the user the query runs for. Accessors of
//! list columns may consult it to hide entries the user is not a contact of.

/// The user a query is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Contact name, `None` for the unrestricted user
    contact: Option<String>,
}

impl User {
    /// The unrestricted user; sees every record.
    pub fn no_auth() -> Self {
        Self { contact: None }
    }

    /// A user restricted to objects it is a contact for.
    pub fn contact(name: impl Into<String>) -> Self {
        Self {
            contact: Some(name.into()),
        }
    }

    /// Contact name, if restricted.
    pub fn name(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Returns true if the user may see an object with the given contacts.
    pub fn is_authorized_for<I, S>(&self, contacts: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &self.contact {
            None => true,
            Some(name) => contacts.into_iter().any(|c| c.as_ref() == name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_auth_sees_everything() {
        let user = User::no_auth();
        assert!(user.name().is_none());
        assert!(user.is_authorized_for(Vec::<String>::new()));
    }

    #[test]
    fn test_contact_needs_membership() {
        let user = User::contact("alice");
        assert_eq!(user.name(), Some("alice"));
        assert!(user.is_authorized_for(["bob", "alice"]));
        assert!(!user.is_authorized_for(["bob"]));
    }
}

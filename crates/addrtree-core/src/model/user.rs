use addrtree_api::graph::GraphUser;
use serde::{Deserialize, Serialize};

/// A directory user as listed in the result table.
///
/// Attributes Graph leaves unset are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub department: String,
    pub mail: String,
    pub job_title: String,
}

impl User {
    /// Only users with both a name and a mailbox can be addressed.
    pub fn is_addressable(&self) -> bool {
        !self.display_name.is_empty() && !self.mail.is_empty()
    }
}

impl From<GraphUser> for User {
    fn from(u: GraphUser) -> Self {
        Self {
            id: u.id,
            display_name: u.display_name.unwrap_or_default(),
            department: u.department.unwrap_or_default(),
            mail: u.mail.unwrap_or_default(),
            job_title: u.job_title.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_attributes_become_empty() {
        let user = User::from(GraphUser {
            id: "42".into(),
            display_name: Some("Room 4".into()),
            ..GraphUser::default()
        });
        assert_eq!(user.display_name, "Room 4");
        assert_eq!(user.mail, "");
        assert!(!user.is_addressable());
    }
}

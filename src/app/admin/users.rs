use crate::domain::model::{User, UserRole, UserStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    /// Case-insensitive match on name, e-mail or id.
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(term) = self.search.as_deref().map(str::to_lowercase) {
            let hit = user.name.to_lowercase().contains(&term)
                || user.email.to_lowercase().contains(&term)
                || user.id.to_lowercase().contains(&term);
            if !hit {
                return false;
            }
        }
        self.role.map_or(true, |r| user.role == r) && self.status.map_or(true, |s| user.status == s)
    }

    pub fn apply<'a>(&self, users: &'a [User]) -> Vec<&'a User> {
        users.iter().filter(|u| self.matches(u)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, email: &str, role: UserRole, status: UserStatus) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            role,
            status,
            created_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_user_filter() {
        let users = vec![
            user("U001", "Ivan Petrov", "ivan@example.com", UserRole::User, UserStatus::Active),
            user("U002", "Elena Sidorova", "elena@autopro.ru", UserRole::Manager, UserStatus::Active),
            user("U003", "Oleg Ivanov", "oleg@example.com", UserRole::User, UserStatus::Blocked),
        ];

        let ivan = UserFilter {
            search: Some("IVAN".to_string()),
            ..Default::default()
        };
        // name and e-mail both count
        assert_eq!(ivan.apply(&users).len(), 2);

        let blocked = UserFilter {
            status: Some(UserStatus::Blocked),
            ..Default::default()
        };
        assert_eq!(blocked.apply(&users)[0].id, "U003");

        let staff = UserFilter {
            search: Some("autopro".to_string()),
            role: Some(UserRole::Manager),
            ..Default::default()
        };
        assert_eq!(staff.apply(&users).len(), 1);
    }
}

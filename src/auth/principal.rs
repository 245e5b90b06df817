use crate::models::user::UserRole;

#[derive(Clone, Copy, Debug)]
pub struct Principal {
    pub user_id: i32,
    pub role: UserRole,
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Account role carried in JWT claims as a numeric id.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Owner = 1,
    Admin = 2,
    Manager = 3,
    Chatter = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Owner),
            2 => Some(Role::Admin),
            3 => Some(Role::Manager),
            4 => Some(Role::Chatter),
            _ => None,
        }
    }
}

/// Roster-facing role, stored as a lowercase string column on team_members.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Manager,
    Chatter,
}

//! Role- and team-based visibility of events and users.

use crate::api::models::users::{CurrentUser, Role};
use crate::types::{TeamId, UserId};
use sqlx::{QueryBuilder, Sqlite};

/// The slice of users (and therefore events) an identity may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Team(TeamId),
    User(UserId),
}

impl Scope {
    /// Admins see everything; anyone else with a team sees that team, and a user without a team
    /// sees only themselves.
    pub fn for_user(user: &CurrentUser) -> Self {
        match (user.role, user.team_id) {
            (Role::Admin, _) => Scope::All,
            (_, Some(team_id)) => Scope::Team(team_id),
            (_, None) => Scope::User(user.id),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scope::All => "All teams",
            Scope::Team(_) => "Your team",
            Scope::User(_) => "Your account",
        }
    }

    /// Short form used in report headers.
    pub fn tag(&self) -> &'static str {
        match self {
            Scope::All => "ALL",
            Scope::Team(_) => "TEAM",
            Scope::User(_) => "USER",
        }
    }

    /// Append the visibility predicate to a query in which `users` is aliased `u`.
    ///
    /// Every read that is subject to scoping goes through this, so events and user counts can
    /// never disagree about who is visible.
    pub fn push_predicate(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        match *self {
            Scope::All => {
                query.push("1 = 1");
            }
            Scope::Team(team_id) => {
                query.push("u.team_id = ").push_bind(team_id);
            }
            Scope::User(user_id) => {
                query.push("u.id = ").push_bind(user_id);
            }
        }
    }
}

//! Ownership-based authorization.
//!
//! Reads are open to everyone, anonymous callers included. A write needs an
//! authenticated actor, and that actor must be the owner of the entity.
//! Likes have no policy of their own: they are always addressed by
//! `(actor, post)`, so the actor can only ever touch their own like.

use socialnet_common::{AppError, AppResult};
use socialnet_db::entities::{comment, post};

/// An entity that belongs to a single user.
pub trait Owned {
    /// ID of the owning user.
    fn owner_id(&self) -> &str;
}

impl Owned for post::Model {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

impl Owned for comment::Model {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

/// Whether `actor` may update or delete `entity`.
#[must_use]
pub fn can_mutate<E: Owned>(actor: Option<&str>, entity: &E) -> bool {
    actor.is_some_and(|id| id == entity.owner_id())
}

/// Unwrap an actor, rejecting anonymous callers.
pub fn require_actor(actor: Option<&str>) -> AppResult<&str> {
    actor.ok_or(AppError::Unauthorized)
}

/// Check that `actor` may mutate `entity`.
///
/// Anonymous callers get `Unauthorized`; authenticated non-owners get
/// `Forbidden` carrying `message`.
pub fn authorize_mutation<E: Owned>(
    actor: Option<&str>,
    entity: &E,
    message: &str,
) -> AppResult<()> {
    require_actor(actor)?;
    if can_mutate(actor, entity) {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

//! Who may do what to a wish.
//!
//! Checks run after the wish is loaded (missing or deleted wishes are a 404
//! before any of this) and before anything is written.

use uuid::Uuid;

use crate::domain::types::Wish;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishAction {
    Read,
    UpdateContent,
    Complete,
    Uncomplete,
    Reserve,
    Unreserve,
    Delete,
}

pub fn authorize(actor: Uuid, wish: &Wish, action: WishAction) -> Result<(), ApiError> {
    let is_creator = wish.creator_id == actor;
    let allowed = match action {
        WishAction::Read => true,
        WishAction::UpdateContent
        | WishAction::Complete
        | WishAction::Uncomplete
        | WishAction::Delete => is_creator,
        WishAction::Reserve => !is_creator,
        WishAction::Unreserve => wish.reserved_by == Some(actor),
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

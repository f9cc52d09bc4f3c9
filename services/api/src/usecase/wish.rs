use chrono::Utc;
use uuid::Uuid;

use wishlist_domain::price::{self, PriceInput};
use wishlist_domain::validate::{Violations, is_link};

use crate::domain::guard::{WishAction, authorize};
use crate::domain::repository::WishRepository;
use crate::domain::types::{Reservation, User, Wish, WishContent};
use crate::error::ApiError;

/// Load a live wish and check that `actor` may perform `action` on it.
/// Missing and deleted wishes are `WishNotFound` before any access check.
async fn load_authorized<W: WishRepository>(
    wishes: &W,
    actor: Uuid,
    id: Uuid,
    action: WishAction,
) -> Result<Wish, ApiError> {
    let wish = wishes
        .find_by_id(id)
        .await?
        .filter(|w| !w.deleted)
        .ok_or(ApiError::WishNotFound)?;
    authorize(actor, &wish, action)?;
    Ok(wish)
}

fn check_content(
    v: &mut Violations,
    title: Option<&str>,
    description: Option<&str>,
    link: Option<&str>,
) {
    v.length_opt("title", title, 3, 120)
        .length_opt("description", description, 3, 240)
        .length_opt("link", link, 3, 1024);
    if let Some(link) = link {
        v.check("link", is_link(link), "must be a valid url");
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateWishInput {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub price: Option<PriceInput>,
    pub currency: Option<String>,
}

pub struct CreateWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> CreateWishUseCase<W> {
    pub async fn execute(&self, actor: &User, input: CreateWishInput) -> Result<Uuid, ApiError> {
        let mut v = Violations::new();
        check_content(
            &mut v,
            Some(&input.title),
            input.description.as_deref(),
            input.link.as_deref(),
        );
        v.into_result()?;
        let pricing = price::normalize(input.price.as_ref(), input.currency.as_deref())?;

        let wish = Wish {
            id: Uuid::now_v7(),
            creator_id: actor.id,
            creator_name: actor.name.clone(),
            title: input.title,
            description: input.description,
            link: input.link,
            price: pricing.price,
            currency: pricing.currency,
            deleted: false,
            completed: false,
            completed_reason: None,
            reserved: false,
            reserved_by: None,
            reserved_by_name: None,
            created_at: Utc::now(),
        };
        self.wishes.create(&wish).await?;
        tracing::info!(wish_id = %wish.id, user_id = %actor.id, "wish created");
        Ok(wish.id)
    }
}

// ── Read ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub enum WishFilter {
    CreatedBy(Uuid),
    ReservedBy(Uuid),
}

/// Live wishes matching `filter`, newest first.
pub struct ListWishesUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> ListWishesUseCase<W> {
    pub async fn execute(&self, filter: WishFilter) -> Result<Vec<Wish>, ApiError> {
        let wishes = match filter {
            WishFilter::CreatedBy(user_id) => self.wishes.list_by_creator(user_id).await?,
            WishFilter::ReservedBy(user_id) => self.wishes.list_reserved_by(user_id).await?,
        };
        Ok(wishes.into_iter().filter(|w| !w.deleted).collect())
    }
}

pub struct GetWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> GetWishUseCase<W> {
    pub async fn execute(&self, actor: Uuid, id: Uuid) -> Result<Wish, ApiError> {
        load_authorized(&self.wishes, actor, id, WishAction::Read).await
    }
}

// ── Update content ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateWishInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub price: Option<PriceInput>,
    pub currency: Option<String>,
}

pub struct UpdateWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> UpdateWishUseCase<W> {
    pub async fn execute(
        &self,
        actor: Uuid,
        id: Uuid,
        input: UpdateWishInput,
    ) -> Result<Wish, ApiError> {
        let mut v = Violations::new();
        check_content(
            &mut v,
            input.title.as_deref(),
            input.description.as_deref(),
            input.link.as_deref(),
        );
        v.into_result()?;

        let mut wish = load_authorized(&self.wishes, actor, id, WishAction::UpdateContent).await?;

        // Price and currency are re-normalized as a pair, falling back to the
        // stored half when the patch only names one of them.
        let pricing = if input.price.is_some() || input.currency.is_some() {
            let stored_price = wish.price.clone().map(PriceInput::Text);
            let price = input.price.as_ref().or(stored_price.as_ref());
            let currency = input.currency.as_deref().or(wish.currency.as_deref());
            Some(price::normalize(price, currency)?)
        } else {
            None
        };

        let content = WishContent {
            title: input.title,
            description: input.description,
            link: input.link,
            pricing,
        };
        if content == WishContent::default() {
            return Err(ApiError::MissingData);
        }

        self.wishes.update_content(id, &content).await?;
        content.apply_to(&mut wish);
        tracing::info!(wish_id = %id, user_id = %actor, "wish updated");
        Ok(wish)
    }
}

// ── Completion ───────────────────────────────────────────────────────────────

pub struct CompleteWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> CompleteWishUseCase<W> {
    pub async fn execute(
        &self,
        actor: Uuid,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Wish, ApiError> {
        let mut v = Violations::new();
        v.length_opt("completedReason", reason.as_deref(), 3, 120);
        v.into_result()?;

        let mut wish = load_authorized(&self.wishes, actor, id, WishAction::Complete).await?;
        self.wishes.complete(id, reason.as_deref()).await?;
        wish.completed = true;
        wish.completed_reason = reason;
        Ok(wish)
    }
}

pub struct UncompleteWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> UncompleteWishUseCase<W> {
    pub async fn execute(&self, actor: Uuid, id: Uuid) -> Result<Wish, ApiError> {
        let mut wish = load_authorized(&self.wishes, actor, id, WishAction::Uncomplete).await?;
        self.wishes.uncomplete(id).await?;
        wish.completed = false;
        wish.completed_reason = None;
        Ok(wish)
    }
}

// ── Reservation ──────────────────────────────────────────────────────────────

pub struct ReserveWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> ReserveWishUseCase<W> {
    /// `name` is what the creator sees as the reserver; defaults to the
    /// actor's own name. An existing reservation is taken over.
    pub async fn execute(
        &self,
        actor: &User,
        id: Uuid,
        name: Option<String>,
    ) -> Result<Wish, ApiError> {
        let mut v = Violations::new();
        v.length_opt("name", name.as_deref(), 2, 120);
        v.into_result()?;

        let mut wish = load_authorized(&self.wishes, actor.id, id, WishAction::Reserve).await?;
        let reservation = Reservation {
            by: actor.id,
            name: name.or_else(|| Some(actor.name.clone()).filter(|n| !n.is_empty())),
        };
        self.wishes.reserve(id, &reservation).await?;
        tracing::info!(wish_id = %id, user_id = %actor.id, "wish reserved");

        wish.reserved = true;
        wish.reserved_by = Some(reservation.by);
        wish.reserved_by_name = reservation.name;
        Ok(wish)
    }
}

pub struct UnreserveWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> UnreserveWishUseCase<W> {
    pub async fn execute(&self, actor: Uuid, id: Uuid) -> Result<Wish, ApiError> {
        let mut wish = load_authorized(&self.wishes, actor, id, WishAction::Unreserve).await?;
        self.wishes.unreserve(id).await?;
        wish.reserved = false;
        wish.reserved_by = None;
        wish.reserved_by_name = None;
        Ok(wish)
    }
}

// ── Delete ───────────────────────────────────────────────────────────────────

pub struct DeleteWishUseCase<W: WishRepository> {
    pub wishes: W,
}

impl<W: WishRepository> DeleteWishUseCase<W> {
    /// Soft delete. The returned wish carries `deleted: true`; afterwards it is
    /// invisible to every read.
    pub async fn execute(&self, actor: Uuid, id: Uuid) -> Result<Wish, ApiError> {
        let mut wish = load_authorized(&self.wishes, actor, id, WishAction::Delete).await?;
        self.wishes.mark_deleted(id).await?;
        wish.deleted = true;
        tracing::info!(wish_id = %id, user_id = %actor, "wish deleted");
        Ok(wish)
    }
}

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wishlist_domain::price::PriceInput;

use crate::domain::types::Wish;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, CurrentUser, MaybeUser, optional_json, parse_id};
use crate::state::AppState;
use crate::usecase::wish::{
    CompleteWishUseCase, CreateWishInput, CreateWishUseCase, DeleteWishUseCase, GetWishUseCase,
    ListWishesUseCase, ReserveWishUseCase, UncompleteWishUseCase, UnreserveWishUseCase,
    UpdateWishInput, UpdateWishUseCase, WishFilter,
};

/// Full wish as returned by detail and mutation endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "_creator")]
    pub creator_id: Uuid,
    pub creator_name: String,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub deleted: bool,
    pub completed: bool,
    pub completed_reason: Option<String>,
    pub reserved: bool,
    pub reserved_by: Option<Uuid>,
    pub reserved_by_name: Option<String>,
    #[serde(serialize_with = "wishlist_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Wish> for WishResponse {
    fn from(w: Wish) -> Self {
        Self {
            id: w.id,
            creator_id: w.creator_id,
            creator_name: w.creator_name,
            title: w.title,
            description: w.description,
            link: w.link,
            price: w.price,
            currency: w.currency,
            deleted: w.deleted,
            completed: w.completed,
            completed_reason: w.completed_reason,
            reserved: w.reserved,
            reserved_by: w.reserved_by,
            reserved_by_name: w.reserved_by_name,
            created_at: w.created_at,
        }
    }
}

/// List projection. Creator and reserver names stay out of lists.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishListItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub completed: bool,
    pub completed_reason: Option<String>,
    pub reserved: bool,
    pub reserved_by: Option<Uuid>,
    pub price: Option<String>,
    pub currency: Option<String>,
}

impl From<Wish> for WishListItem {
    fn from(w: Wish) -> Self {
        Self {
            id: w.id,
            title: w.title,
            description: w.description,
            link: w.link,
            completed: w.completed,
            completed_reason: w.completed_reason,
            reserved: w.reserved,
            reserved_by: w.reserved_by,
            price: w.price,
            currency: w.currency,
        }
    }
}

async fn list(state: &AppState, filter: WishFilter) -> Result<Json<Vec<WishListItem>>, ApiError> {
    let usecase = ListWishesUseCase {
        wishes: state.wish_repo(),
    };
    let wishes = usecase.execute(filter).await?;
    Ok(Json(wishes.into_iter().map(WishListItem::from).collect()))
}

// ── GET /api/wishes, /api/wishes/reserved, /api/wishes/user/{id} ─────────────

pub async fn list_own(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<WishListItem>>, ApiError> {
    list(&state, WishFilter::CreatedBy(current.user.id)).await
}

pub async fn list_reserved(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<WishListItem>>, ApiError> {
    list(&state, WishFilter::ReservedBy(current.user.id)).await
}

pub async fn list_by_user(
    State(state): State<AppState>,
    _caller: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<WishListItem>>, ApiError> {
    let user_id = parse_id(&id)?;
    list(&state, WishFilter::CreatedBy(user_id)).await
}

// ── GET /api/wishes/{id} ─────────────────────────────────────────────────────

pub async fn get_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = GetWishUseCase {
        wishes: state.wish_repo(),
    };
    Ok(Json(usecase.execute(current.user.id, id).await?.into()))
}

// ── POST /api/wishes ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct WishBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub price: Option<PriceInput>,
    pub currency: Option<String>,
}

#[derive(Serialize)]
pub struct CreatedWish {
    #[serde(rename = "_id")]
    pub id: Uuid,
}

pub async fn create_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiJson(body): ApiJson<WishBody>,
) -> Result<(StatusCode, Json<CreatedWish>), ApiError> {
    let usecase = CreateWishUseCase {
        wishes: state.wish_repo(),
    };
    let id = usecase
        .execute(
            &current.user,
            CreateWishInput {
                title: body.title.unwrap_or_default(),
                description: body.description,
                link: body.link,
                price: body.price,
                currency: body.currency,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedWish { id })))
}

// ── PATCH /api/wishes/{id} ───────────────────────────────────────────────────

pub async fn update_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<WishBody>,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = UpdateWishUseCase {
        wishes: state.wish_repo(),
    };
    let wish = usecase
        .execute(
            current.user.id,
            id,
            UpdateWishInput {
                title: body.title,
                description: body.description,
                link: body.link,
                price: body.price,
                currency: body.currency,
            },
        )
        .await?;
    Ok(Json(wish.into()))
}

// ── DELETE /api/wishes/{id} ──────────────────────────────────────────────────

pub async fn delete_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = DeleteWishUseCase {
        wishes: state.wish_repo(),
    };
    Ok(Json(usecase.execute(current.user.id, id).await?.into()))
}

// ── POST/DELETE /api/wishes/{id}/complete ────────────────────────────────────

#[derive(Default, Deserialize)]
pub struct CompleteBody {
    #[serde(rename = "completedReason")]
    pub completed_reason: Option<String>,
}

pub async fn complete_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let body: CompleteBody = optional_json(&body)?;
    let usecase = CompleteWishUseCase {
        wishes: state.wish_repo(),
    };
    let wish = usecase
        .execute(current.user.id, id, body.completed_reason)
        .await?;
    Ok(Json(wish.into()))
}

pub async fn uncomplete_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = UncompleteWishUseCase {
        wishes: state.wish_repo(),
    };
    Ok(Json(usecase.execute(current.user.id, id).await?.into()))
}

// ── POST/DELETE /api/wishes/{id}/reserve ─────────────────────────────────────

#[derive(Default, Deserialize)]
pub struct ReserveBody {
    pub name: Option<String>,
}

pub async fn reserve_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let body: ReserveBody = optional_json(&body)?;
    let usecase = ReserveWishUseCase {
        wishes: state.wish_repo(),
    };
    Ok(Json(usecase.execute(&current.user, id, body.name).await?.into()))
}

pub async fn unreserve_wish(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WishResponse>, ApiError> {
    let id = parse_id(&id)?;
    let usecase = UnreserveWishUseCase {
        wishes: state.wish_repo(),
    };
    Ok(Json(usecase.execute(current.user.id, id).await?.into()))
}

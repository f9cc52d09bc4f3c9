use chrono::Duration;
use uuid::Uuid;

use wishlist_api::error::ApiError;
use wishlist_api::usecase::wish::{
    CompleteWishUseCase, CreateWishInput, CreateWishUseCase, DeleteWishUseCase, GetWishUseCase,
    ListWishesUseCase, ReserveWishUseCase, UncompleteWishUseCase, UnreserveWishUseCase,
    UpdateWishInput, UpdateWishUseCase, WishFilter,
};
use wishlist_domain::price::PriceInput;

use crate::helpers::{MockWishRepo, test_user, test_wish};

fn bike_input() -> CreateWishInput {
    CreateWishInput {
        title: "Bike".to_owned(),
        description: Some("A red one".to_owned()),
        link: Some("https://shop.example.com/bike".to_owned()),
        price: Some(PriceInput::Number(199.5)),
        currency: Some("usd".to_owned()),
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_wish_with_normalized_price() {
    let alice = test_user("Alice");
    let repo = MockWishRepo::default();
    let uc = CreateWishUseCase {
        wishes: repo.clone(),
    };

    let id = uc.execute(&alice, bike_input()).await.unwrap();

    let wish = repo.stored(id).unwrap();
    assert_eq!(wish.creator_id, alice.id);
    assert_eq!(wish.creator_name, "Alice");
    assert_eq!(wish.price.as_deref(), Some("199.50"));
    assert_eq!(wish.currency.as_deref(), Some("USD"));
    assert!(!wish.completed && !wish.reserved && !wish.deleted);
}

#[tokio::test]
async fn should_drop_currency_for_zero_price() {
    let alice = test_user("Alice");
    let repo = MockWishRepo::default();
    let uc = CreateWishUseCase {
        wishes: repo.clone(),
    };

    let id = uc
        .execute(
            &alice,
            CreateWishInput {
                price: Some(PriceInput::Number(0.0)),
                ..bike_input()
            },
        )
        .await
        .unwrap();

    let wish = repo.stored(id).unwrap();
    assert_eq!(wish.price, None);
    assert_eq!(wish.currency, None);
}

#[tokio::test]
async fn should_require_currency_with_price() {
    let uc = CreateWishUseCase {
        wishes: MockWishRepo::default(),
    };
    let result = uc
        .execute(
            &test_user("Alice"),
            CreateWishInput {
                currency: None,
                ..bike_input()
            },
        )
        .await;

    match result {
        Err(ApiError::Validation(errors)) => assert_eq!(errors[0].field, "currency"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn should_reject_short_title_and_bad_link() {
    let repo = MockWishRepo::default();
    let uc = CreateWishUseCase {
        wishes: repo.clone(),
    };
    let result = uc
        .execute(
            &test_user("Alice"),
            CreateWishInput {
                title: "ab".to_owned(),
                link: Some("not a url".to_owned()),
                ..bike_input()
            },
        )
        .await;

    assert!(matches!(result, Err(ApiError::Validation(ref e)) if e.len() == 2));
    assert!(repo.wishes.lock().unwrap().is_empty());
}

// ── Read ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_live_wishes_newest_first() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let mut older = test_wish(&alice, "Older");
    older.created_at -= Duration::seconds(60);
    let newer = test_wish(&alice, "Newer");
    let mut gone = test_wish(&alice, "Gone");
    gone.deleted = true;
    let other = test_wish(&bob, "Not mine");

    let uc = ListWishesUseCase {
        wishes: MockWishRepo {
            wishes: std::sync::Arc::new(std::sync::Mutex::new(vec![
                older, newer, gone, other,
            ])),
        },
    };

    let titles: Vec<String> = uc
        .execute(WishFilter::CreatedBy(alice.id))
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn should_list_wishes_reserved_by_caller() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let mut taken = test_wish(&alice, "Taken");
    taken.reserved = true;
    taken.reserved_by = Some(bob.id);
    let free = test_wish(&alice, "Free");

    let uc = ListWishesUseCase {
        wishes: MockWishRepo {
            wishes: std::sync::Arc::new(std::sync::Mutex::new(vec![taken.clone(), free])),
        },
    };
    let found = uc.execute(WishFilter::ReservedBy(bob.id)).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, taken.id);
}

#[tokio::test]
async fn should_hide_deleted_wish_from_get() {
    let alice = test_user("Alice");
    let mut wish = test_wish(&alice, "Gone");
    wish.deleted = true;
    let repo = MockWishRepo::default();
    repo.wishes.lock().unwrap().push(wish.clone());

    let uc = GetWishUseCase { wishes: repo };
    assert!(matches!(
        uc.execute(alice.id, wish.id).await,
        Err(ApiError::WishNotFound)
    ));
    assert!(matches!(
        uc.execute(alice.id, Uuid::now_v7()).await,
        Err(ApiError::WishNotFound)
    ));
}

// ── Update ───────────────────────────────────────────────────────────────────

fn seeded(wish: &wishlist_api::domain::types::Wish) -> MockWishRepo {
    let repo = MockWishRepo::default();
    repo.wishes.lock().unwrap().push(wish.clone());
    repo
}

#[tokio::test]
async fn should_update_title_and_keep_other_fields() {
    let alice = test_user("Alice");
    let mut wish = test_wish(&alice, "Bike");
    wish.price = Some("10.00".to_owned());
    wish.currency = Some("EUR".to_owned());
    let repo = seeded(&wish);
    let uc = UpdateWishUseCase {
        wishes: repo.clone(),
    };

    let updated = uc
        .execute(
            alice.id,
            wish.id,
            UpdateWishInput {
                title: Some("Mountain bike".to_owned()),
                ..UpdateWishInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Mountain bike");
    assert_eq!(updated.price.as_deref(), Some("10.00"));
    assert_eq!(repo.stored(wish.id).unwrap(), updated);
}

#[tokio::test]
async fn should_merge_price_patch_with_stored_currency() {
    let alice = test_user("Alice");
    let mut wish = test_wish(&alice, "Bike");
    wish.price = Some("10.00".to_owned());
    wish.currency = Some("EUR".to_owned());
    let uc = UpdateWishUseCase {
        wishes: seeded(&wish),
    };

    let updated = uc
        .execute(
            alice.id,
            wish.id,
            UpdateWishInput {
                price: Some(PriceInput::Text("25".to_owned())),
                ..UpdateWishInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.price.as_deref(), Some("25.00"));
    assert_eq!(updated.currency.as_deref(), Some("EUR"));
}

#[tokio::test]
async fn should_reject_update_by_non_creator() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let wish = test_wish(&alice, "Bike");
    let uc = UpdateWishUseCase {
        wishes: seeded(&wish),
    };

    let result = uc
        .execute(
            bob.id,
            wish.id,
            UpdateWishInput {
                title: Some("Mine now".to_owned()),
                ..UpdateWishInput::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_reject_empty_patch() {
    let alice = test_user("Alice");
    let wish = test_wish(&alice, "Bike");
    let uc = UpdateWishUseCase {
        wishes: seeded(&wish),
    };

    let result = uc
        .execute(alice.id, wish.id, UpdateWishInput::default())
        .await;
    assert!(matches!(result, Err(ApiError::MissingData)));
}

// ── Completion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_complete_and_uncomplete_own_wish() {
    let alice = test_user("Alice");
    let wish = test_wish(&alice, "Bike");
    let repo = seeded(&wish);

    let complete = CompleteWishUseCase {
        wishes: repo.clone(),
    };
    let done = complete
        .execute(alice.id, wish.id, Some("Got it".to_owned()))
        .await
        .unwrap();
    assert!(done.completed);
    assert_eq!(done.completed_reason.as_deref(), Some("Got it"));

    let uncomplete = UncompleteWishUseCase {
        wishes: repo.clone(),
    };
    let reopened = uncomplete.execute(alice.id, wish.id).await.unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_reason, None);
    assert_eq!(repo.stored(wish.id).unwrap().completed_reason, None);
}

#[tokio::test]
async fn should_forbid_completing_someone_elses_wish() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let wish = test_wish(&alice, "Bike");
    let uc = CompleteWishUseCase {
        wishes: seeded(&wish),
    };
    assert!(matches!(
        uc.execute(bob.id, wish.id, None).await,
        Err(ApiError::Forbidden)
    ));
}

#[tokio::test]
async fn should_validate_completion_reason() {
    let alice = test_user("Alice");
    let wish = test_wish(&alice, "Bike");
    let uc = CompleteWishUseCase {
        wishes: seeded(&wish),
    };
    assert!(matches!(
        uc.execute(alice.id, wish.id, Some("ok".to_owned())).await,
        Err(ApiError::Validation(_))
    ));
}

// ── Reservation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reserve_with_default_name_and_unreserve() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let wish = test_wish(&alice, "Bike");
    let repo = seeded(&wish);

    let reserve = ReserveWishUseCase {
        wishes: repo.clone(),
    };
    let reserved = reserve.execute(&bob, wish.id, None).await.unwrap();
    assert!(reserved.reserved);
    assert_eq!(reserved.reserved_by, Some(bob.id));
    assert_eq!(reserved.reserved_by_name.as_deref(), Some("Bob"));

    let unreserve = UnreserveWishUseCase {
        wishes: repo.clone(),
    };
    let released = unreserve.execute(bob.id, wish.id).await.unwrap();
    assert!(!released.reserved);
    assert_eq!(released.reserved_by, None);
    assert_eq!(released.reserved_by_name, None);
    assert_eq!(repo.stored(wish.id).unwrap(), released);
}

#[tokio::test]
async fn should_use_given_reserver_name() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let wish = test_wish(&alice, "Bike");
    let uc = ReserveWishUseCase {
        wishes: seeded(&wish),
    };

    let reserved = uc
        .execute(&bob, wish.id, Some("Uncle Bob".to_owned()))
        .await
        .unwrap();
    assert_eq!(reserved.reserved_by_name.as_deref(), Some("Uncle Bob"));
}

#[tokio::test]
async fn should_not_let_creator_reserve_own_wish() {
    let alice = test_user("Alice");
    let wish = test_wish(&alice, "Bike");
    let uc = ReserveWishUseCase {
        wishes: seeded(&wish),
    };
    assert!(matches!(
        uc.execute(&alice, wish.id, None).await,
        Err(ApiError::Forbidden)
    ));
}

#[tokio::test]
async fn should_only_let_reserver_unreserve() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let carol = test_user("Carol");
    let mut wish = test_wish(&alice, "Bike");
    wish.reserved = true;
    wish.reserved_by = Some(bob.id);
    let uc = UnreserveWishUseCase {
        wishes: seeded(&wish),
    };

    assert!(matches!(
        uc.execute(carol.id, wish.id).await,
        Err(ApiError::Forbidden)
    ));
    assert!(matches!(
        uc.execute(alice.id, wish.id).await,
        Err(ApiError::Forbidden)
    ));
    assert!(uc.execute(bob.id, wish.id).await.is_ok());
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_soft_delete_and_hide_wish() {
    let alice = test_user("Alice");
    let bob = test_user("Bob");
    let wish = test_wish(&alice, "Bike");
    let repo = seeded(&wish);

    let delete = DeleteWishUseCase {
        wishes: repo.clone(),
    };
    assert!(matches!(
        delete.execute(bob.id, wish.id).await,
        Err(ApiError::Forbidden)
    ));

    let deleted = delete.execute(alice.id, wish.id).await.unwrap();
    assert!(deleted.deleted);
    assert!(repo.stored(wish.id).unwrap().deleted);

    let get = GetWishUseCase {
        wishes: repo.clone(),
    };
    assert!(matches!(
        get.execute(alice.id, wish.id).await,
        Err(ApiError::WishNotFound)
    ));
    assert!(matches!(
        delete.execute(alice.id, wish.id).await,
        Err(ApiError::WishNotFound)
    ));
}

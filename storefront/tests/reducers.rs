//! Reducer-level tests
//!
//! Reducers are driven directly, without a store. Effects are resolved with
//! `resolve_effects` to inspect the actions they would feed back.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::Duration as ChronoDuration;
use shopfront::api::ApiError;
use shopfront::reducer::{CartReducer, CatalogReducer, LedgerReducer, SyncReducer};
use shopfront::{
    CartState, CatalogState, Money, MockShopApi, Product, ProductDraft, ProductEdit, ProductId,
    RequestId, Session, ShopAction, ShopEnvironment, ShopError, ShopReducer, ShopState, SyncCommand,
    UserId,
};
use shopfront_core::environment::Clock;
use shopfront_core::reducer::Reducer;
use shopfront_testing::{ReducerTest, assertions, resolve_effects, test_clock};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

fn widget() -> Product {
    Product {
        id: ProductId::from("p1"),
        owner_id: UserId::from("u1"),
        title: "Widget".to_string(),
        image_url: "https://img.example/p1.png".to_string(),
        description: "A widget".to_string(),
        price: Money::from_cents(999),
    }
}

fn environment(api: &MockShopApi) -> ShopEnvironment {
    ShopEnvironment::new(Arc::new(api.clone()), Arc::new(test_clock()))
}

fn session() -> Session {
    Session::new(
        UserId::from("u1"),
        "token",
        test_clock().now() + ChronoDuration::hours(1),
    )
}

fn signed_in_state() -> ShopState {
    let mut state = ShopState::default();
    state.session = Some(session());
    state.products.set_all(vec![widget()], Some(&UserId::from("u1")));
    state
}

const REQ: RequestId = RequestId::new(1);

// ============================================================================
// Cart
// ============================================================================

#[test]
fn add_to_cart_creates_a_line() {
    ReducerTest::new(CartReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(CartState::default())
        .when_action(ShopAction::AddToCart { product: widget() })
        .then_state(|cart| {
            assert_eq!(cart.len(), 1);
            assert_eq!(cart.total(), Money::from_cents(999));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn removing_a_missing_line_is_rejected() {
    let env = environment(&MockShopApi::new());
    let mut cart = CartState::default();

    let effects = CartReducer.reduce(
        &mut cart,
        ShopAction::RemoveFromCart {
            product_id: ProductId::from("p9"),
        },
        &env,
    );

    assert!(cart.is_empty());
    let actions = resolve_effects(effects).await;
    assert!(matches!(
        actions.as_slice(),
        [ShopAction::Rejected {
            error: ShopError::PreconditionViolation(_)
        }]
    ));
}

#[test]
fn placed_order_clears_the_cart() {
    let mut cart = CartState::default();
    cart.add_line(&widget());
    let order = shopfront::Order {
        id: shopfront::OrderId::from("o1"),
        lines: cart.lines(),
        total: cart.total(),
        placed_at: test_clock().now(),
    };

    ReducerTest::new(CartReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(cart)
        .when_action(ShopAction::OrderPlaced {
            request: REQ,
            owner: UserId::from("u1"),
            order,
        })
        .then_state(|cart| {
            assert!(cart.is_empty());
            assert_eq!(cart.total(), Money::zero());
        })
        .run();
}

// ============================================================================
// Catalog
// ============================================================================

fn renamed() -> ProductEdit {
    ProductEdit {
        title: "Renamed".to_string(),
        description: "Renamed widget".to_string(),
        image_url: "https://img.example/p1.png".to_string(),
    }
}

#[tokio::test]
async fn accepted_update_for_an_unowned_product_fails_the_command() {
    let env = environment(&MockShopApi::new());
    let mut catalog = CatalogState::default();
    catalog.set_all(vec![widget()], None);
    let before = catalog.clone();

    let effects = CatalogReducer.reduce(
        &mut catalog,
        ShopAction::UpdateAccepted {
            request: REQ,
            product_id: ProductId::from("p1"),
            edit: renamed(),
        },
        &env,
    );

    assert_eq!(catalog, before);
    let actions = resolve_effects(effects).await;
    assert_eq!(
        actions,
        vec![ShopAction::SyncFailed {
            request: REQ,
            command: SyncCommand::UpdateProduct,
            error: ShopError::StaleReference(ProductId::from("p1")),
        }]
    );
}

#[tokio::test]
async fn accepted_update_is_applied_then_settles() {
    let env = environment(&MockShopApi::new());
    let mut catalog = CatalogState::default();
    catalog.set_all(vec![widget()], Some(&UserId::from("u1")));

    let effects = CatalogReducer.reduce(
        &mut catalog,
        ShopAction::UpdateAccepted {
            request: REQ,
            product_id: ProductId::from("p1"),
            edit: renamed(),
        },
        &env,
    );

    assert_eq!(catalog.catalog()[0].title, "Renamed");
    assert_eq!(catalog.owned()[0].price, Money::from_cents(999));
    assert_eq!(
        resolve_effects(effects).await,
        vec![ShopAction::ProductUpdated {
            request: REQ,
            product_id: ProductId::from("p1"),
            edit: renamed(),
        }]
    );
}

#[test]
fn sign_out_drops_the_owned_subset() {
    let mut catalog = CatalogState::default();
    catalog.set_all(vec![widget()], Some(&UserId::from("u1")));

    ReducerTest::new(CatalogReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(catalog)
        .when_action(ShopAction::SignedOut)
        .then_state(|catalog| {
            assert!(catalog.owned().is_empty());
            assert_eq!(catalog.catalog().len(), 1);
        })
        .run();
}

// ============================================================================
// Remote commands
// ============================================================================

#[tokio::test]
async fn fetch_is_pending_until_its_effect_settles() {
    let api = MockShopApi::with_products(vec![widget()]);
    let env = environment(&api);
    let mut state = ShopState::default();

    let effects = SyncReducer.reduce(&mut state, ShopAction::FetchProducts { request: REQ }, &env);

    assert!(state.is_syncing(SyncCommand::FetchProducts));
    assert!(api.calls().is_empty());

    let actions = resolve_effects(effects).await;
    assert_eq!(
        actions,
        vec![ShopAction::ProductsLoaded {
            request: REQ,
            products: vec![widget()],
            owner: None,
        }]
    );
    assert_eq!(api.calls(), vec![SyncCommand::FetchProducts]);
}

#[tokio::test]
async fn command_without_session_fails_without_io() {
    let api = MockShopApi::new();
    let env = environment(&api);
    let mut state = ShopState::default();
    let draft = ProductDraft {
        title: "Lamp".to_string(),
        description: "Lights up the desk".to_string(),
        image_url: "https://img.example/lamp.png".to_string(),
        price: Money::from_cents(4550),
    };

    let effects = SyncReducer.reduce(&mut state, ShopAction::CreateProduct { request: REQ, draft }, &env);

    assert!(!state.is_busy());
    let actions = resolve_effects(effects).await;
    assert_eq!(
        actions,
        vec![ShopAction::SyncFailed {
            request: REQ,
            command: SyncCommand::CreateProduct,
            error: ShopError::NotAuthenticated,
        }]
    );
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn transport_failure_becomes_sync_failed() {
    let api = MockShopApi::new();
    api.fail(SyncCommand::FetchOrders, ApiError::Request("offline".to_string()));
    let env = environment(&api);
    let mut state = signed_in_state();

    let effects = SyncReducer.reduce(&mut state, ShopAction::FetchOrders { request: REQ }, &env);
    let actions = resolve_effects(effects).await;

    assert_eq!(
        actions,
        vec![ShopAction::SyncFailed {
            request: REQ,
            command: SyncCommand::FetchOrders,
            error: ShopError::Transport {
                status: None,
                message: "offline".to_string(),
            },
        }]
    );
}

#[test]
fn sync_failed_settles_and_records_the_error() {
    let mut state = signed_in_state();
    state.pending.insert(REQ, SyncCommand::DeleteProduct);
    let error = ShopError::Transport {
        status: Some(500),
        message: "server answered 500".to_string(),
    };
    let expected = error.clone();

    ReducerTest::new(ShopReducer::new())
        .with_env(environment(&MockShopApi::new()))
        .given_state(state)
        .when_action(ShopAction::SyncFailed {
            request: REQ,
            command: SyncCommand::DeleteProduct,
            error,
        })
        .then_state(move |state| {
            assert!(!state.is_busy());
            assert_eq!(state.last_error, Some(expected));
            assert_eq!(state.products.catalog().len(), 1);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn deletion_cascades_into_every_slice() {
    let mut state = signed_in_state();
    for _ in 0..3 {
        state.cart.add_line(&widget());
    }
    state.pending.insert(REQ, SyncCommand::DeleteProduct);

    ReducerTest::new(ShopReducer::new())
        .with_env(environment(&MockShopApi::new()))
        .given_state(state)
        .when_action(ShopAction::ProductDeleted {
            request: REQ,
            product_id: ProductId::from("p1"),
        })
        .then_state(|state| {
            assert!(state.products.catalog().is_empty());
            assert!(state.products.owned().is_empty());
            assert!(state.cart.is_empty());
            assert_eq!(state.cart.total(), Money::zero());
            assert!(!state.is_syncing(SyncCommand::DeleteProduct));
        })
        .run();
}

#[test]
fn place_order_with_no_lines_is_refused() {
    ReducerTest::new(SyncReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(signed_in_state())
        .when_action(ShopAction::PlaceOrder {
            request: REQ,
            lines: Vec::new(),
            total: Money::zero(),
        })
        .then_state(|state| assert!(!state.is_busy()))
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();
}

// ============================================================================
// Session changes racing remote commands
// ============================================================================

fn session_for(user: &str) -> Session {
    Session::new(UserId::from(user), "token", test_clock().now() + ChronoDuration::hours(1))
}

#[test]
fn product_created_for_a_previous_user_is_not_owned() {
    let mut state = signed_in_state();
    state.pending.insert(REQ, SyncCommand::CreateProduct);
    let created = Product {
        id: ProductId::from("p9"),
        ..widget()
    };

    ReducerTest::new(ShopReducer::new())
        .with_env(environment(&MockShopApi::new()))
        .given_state(state)
        .when_action(ShopAction::SessionStarted { session: session_for("u2") })
        .when_action(ShopAction::ProductCreated {
            request: REQ,
            product: created,
        })
        .then_state(|state| {
            assert_eq!(state.session.as_ref().map(|s| s.user_id.as_str()), Some("u2"));
            assert!(state.products.owned().is_empty());
            assert_eq!(state.products.catalog().len(), 2);
            assert!(!state.is_busy());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn product_created_by_the_signed_in_user_is_owned() {
    let mut state = signed_in_state();
    state.pending.insert(REQ, SyncCommand::CreateProduct);

    ReducerTest::new(ShopReducer::new())
        .with_env(environment(&MockShopApi::new()))
        .given_state(state)
        .when_action(ShopAction::ProductCreated {
            request: REQ,
            product: Product {
                id: ProductId::from("p9"),
                ..widget()
            },
        })
        .then_state(|state| {
            let owned: Vec<_> = state.products.owned().iter().map(|p| p.id.as_str()).collect();
            assert_eq!(owned, vec!["p1", "p9"]);
        })
        .run();
}

fn order(id: &str) -> shopfront::Order {
    shopfront::Order {
        id: shopfront::OrderId::from(id),
        lines: Vec::new(),
        total: Money::from_cents(999),
        placed_at: test_clock().now(),
    }
}

#[test]
fn order_placed_after_sign_out_stays_out_of_the_ledger() {
    ReducerTest::new(LedgerReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(ShopState::default())
        .when_action(ShopAction::OrderPlaced {
            request: REQ,
            owner: UserId::from("u1"),
            order: order("o1"),
        })
        .then_state(|state| assert!(state.orders.is_empty()))
        .run();
}

#[test]
fn orders_follow_the_signed_in_user() {
    ReducerTest::new(LedgerReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(signed_in_state())
        .when_action(ShopAction::OrderPlaced {
            request: REQ,
            owner: UserId::from("u1"),
            order: order("o1"),
        })
        .when_action(ShopAction::OrdersLoaded {
            request: RequestId::new(2),
            owner: UserId::from("u2"),
            orders: vec![order("o7")],
        })
        .then_state(|state| {
            let ids: Vec<_> = state.orders.orders().iter().map(|o| o.id.as_str()).collect();
            assert_eq!(ids, vec!["o1"]);
        })
        .run();
}

#[test]
fn switching_user_drops_the_previous_ledger() {
    let mut state = signed_in_state();
    state.orders.append(order("o1"));

    ReducerTest::new(ShopReducer::new())
        .with_env(environment(&MockShopApi::new()))
        .given_state(state)
        .when_action(ShopAction::SessionStarted { session: session_for("u2") })
        .then_state(|state| assert!(state.orders.is_empty()))
        .run();
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn session_start_schedules_expiry() {
    let env = environment(&MockShopApi::new());
    let mut state = ShopState::default();
    state.products.set_all(vec![widget()], None);
    let session = session();
    let expires_at = session.expires_at;

    let effects = SyncReducer.reduce(&mut state, ShopAction::SessionStarted { session }, &env);

    assert_eq!(state.products.owned().len(), 1);
    assertions::assert_effects_count(&effects, 1);
    assert_eq!(assertions::assert_delay(&effects), Duration::from_secs(3600));
    assert_eq!(
        resolve_effects(effects).await,
        vec![ShopAction::SessionExpired { expires_at }]
    );
}

#[test]
fn expired_session_is_ignored() {
    let stale = Session::new(UserId::from("u1"), "token", test_clock().now());

    ReducerTest::new(SyncReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(ShopState::default())
        .when_action(ShopAction::SessionStarted { session: stale })
        .then_state(|state| assert!(state.session.is_none()))
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[tokio::test]
async fn current_expiry_signs_out() {
    let env = environment(&MockShopApi::new());
    let mut state = signed_in_state();
    let expires_at = session().expires_at;

    let effects = SyncReducer.reduce(&mut state, ShopAction::SessionExpired { expires_at }, &env);

    assert_eq!(resolve_effects(effects).await, vec![ShopAction::SignedOut]);
}

#[test]
fn stale_expiry_is_ignored() {
    let old_expiry = test_clock().now() + ChronoDuration::minutes(1);

    ReducerTest::new(SyncReducer)
        .with_env(environment(&MockShopApi::new()))
        .given_state(signed_in_state())
        .when_action(ShopAction::SessionExpired { expires_at: old_expiry })
        .then_state(|state| assert!(state.session.is_some()))
        .then_effects(assertions::assert_no_effects)
        .run();
}

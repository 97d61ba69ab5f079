//! End-to-end flows across cart, orchestrator and coordinator, sharing one
//! set of in-memory stores the way the running service wires them.

use checkout::{
    CartService, CheckoutError, EVENT_PAYMENT_SUCCEEDED, InMemoryPaymentGateway, IntentMetadata,
    OrderOrchestrator, PaymentCoordinator,
};
use common::UserId;
use domain::{Address, Money, Order, OrderStatus, ProductId};
use store::{
    InMemoryCartStore, InMemoryCatalog, InMemoryCustomerDirectory, InMemoryJournal,
    InMemoryOrderStore, InMemoryPaymentStore, Product,
};

struct World {
    cart_service: CartService<InMemoryCartStore, InMemoryCatalog>,
    orchestrator: OrderOrchestrator<
        InMemoryOrderStore,
        InMemoryCartStore,
        InMemoryCatalog,
        InMemoryCustomerDirectory,
        InMemoryJournal,
    >,
    coordinator: PaymentCoordinator<
        InMemoryOrderStore,
        InMemoryPaymentStore,
        InMemoryCatalog,
        InMemoryPaymentGateway,
    >,
    catalog: InMemoryCatalog,
    gateway: InMemoryPaymentGateway,
}

async fn world() -> World {
    let orders = InMemoryOrderStore::new();
    let carts = InMemoryCartStore::new();
    let catalog = InMemoryCatalog::new();
    let customers = InMemoryCustomerDirectory::new();
    let journal = InMemoryJournal::new();
    let payments = InMemoryPaymentStore::new();
    let gateway = InMemoryPaymentGateway::default();

    catalog
        .put(Product::new("SKU-TEE", "T-Shirt", Money::from_cents(1999), 20))
        .await;
    catalog
        .put(Product::new("SKU-MUG", "Mug", Money::from_cents(899), 3))
        .await;

    World {
        cart_service: CartService::new(carts.clone(), catalog.clone()),
        orchestrator: OrderOrchestrator::new(
            orders.clone(),
            carts.clone(),
            catalog.clone(),
            customers,
            journal,
        ),
        coordinator: PaymentCoordinator::new(orders, payments, catalog.clone(), gateway.clone()),
        catalog,
        gateway,
    }
}

fn address() -> Address {
    Address::new("1 Main St", "Springfield", "12345", "US")
}

async fn settle(world: &World, order: &Order, user_id: UserId, intent_id: &str) {
    let (signature, payload) = world.gateway.signed_event(
        EVENT_PAYMENT_SUCCEEDED,
        intent_id,
        IntentMetadata {
            order_id: Some(order.id()),
            user_id: Some(user_id),
        },
    );
    world
        .coordinator
        .handle_webhook(&signature, &payload)
        .await
        .unwrap();
}

#[tokio::test]
async fn browse_checkout_pay_and_refund() {
    let world = world().await;
    let user_id = UserId::new();

    world
        .cart_service
        .add_item(user_id, ProductId::new("SKU-TEE"), 2)
        .await
        .unwrap();
    world
        .cart_service
        .add_item(user_id, ProductId::new("SKU-MUG"), 1)
        .await
        .unwrap();

    let order = world
        .orchestrator
        .create_order(user_id, Some(address()))
        .await
        .unwrap();
    assert_eq!(order.total_amount().cents(), 2 * 1999 + 899);
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-TEE")).await, Some(18));
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-MUG")).await, Some(2));
    assert!(world.cart_service.get_cart(user_id).await.unwrap().is_empty());

    let credentials = world
        .coordinator
        .create_intent(order.id(), user_id)
        .await
        .unwrap();
    assert_eq!(credentials.amount, order.total_amount());

    settle(&world, &order, user_id, "pi_0001").await;
    let paid = world
        .orchestrator
        .get_order(order.id(), user_id)
        .await
        .unwrap();
    assert_eq!(paid.status(), OrderStatus::Paid);

    // a paid order cannot be cancelled directly
    let direct = world.orchestrator.cancel_order(order.id(), user_id).await;
    assert!(matches!(direct, Err(CheckoutError::Domain(_))));

    let refund = world
        .coordinator
        .process_refund(order.id(), user_id, Some("damaged goods".to_string()))
        .await
        .unwrap();
    assert_eq!(refund.order_id, order.id());

    let cancelled = world
        .orchestrator
        .get_order(order.id(), user_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status(), OrderStatus::Cancelled);
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-TEE")).await, Some(20));
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-MUG")).await, Some(3));
}

#[tokio::test]
async fn duplicate_settlement_delivery_changes_nothing() {
    let world = world().await;
    let user_id = UserId::new();

    world
        .cart_service
        .add_item(user_id, ProductId::new("SKU-TEE"), 1)
        .await
        .unwrap();
    let order = world
        .orchestrator
        .create_order(user_id, Some(address()))
        .await
        .unwrap();
    world
        .coordinator
        .create_intent(order.id(), user_id)
        .await
        .unwrap();

    settle(&world, &order, user_id, "pi_0001").await;
    settle(&world, &order, user_id, "pi_0001").await;

    let paid = world
        .orchestrator
        .get_order(order.id(), user_id)
        .await
        .unwrap();
    assert_eq!(paid.status(), OrderStatus::Paid);
    assert_eq!(paid.status_history().len(), 2);
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-TEE")).await, Some(19));
}

#[tokio::test]
async fn two_customers_compete_for_the_last_units() {
    let world = world().await;
    let first = UserId::new();
    let second = UserId::new();

    world
        .cart_service
        .add_item(first, ProductId::new("SKU-MUG"), 3)
        .await
        .unwrap();
    world
        .cart_service
        .add_item(second, ProductId::new("SKU-MUG"), 2)
        .await
        .unwrap();

    world
        .orchestrator
        .create_order(first, Some(address()))
        .await
        .unwrap();

    // the second checkout sees the post-decrement stock and fails whole
    let result = world.orchestrator.create_order(second, Some(address())).await;
    assert!(matches!(
        result,
        Err(CheckoutError::InsufficientStock {
            requested: 2,
            available: 0,
            ..
        })
    ));

    // the loser's cart is intact for a retry later
    let cart = world.cart_service.get_cart(second).await.unwrap();
    assert_eq!(cart.quantity_of(&ProductId::new("SKU-MUG")), 2);
}

#[tokio::test]
async fn cancelled_pending_order_frees_stock_for_others() {
    let world = world().await;
    let user_id = UserId::new();

    world
        .cart_service
        .add_item(user_id, ProductId::new("SKU-MUG"), 3)
        .await
        .unwrap();
    let order = world
        .orchestrator
        .create_order(user_id, Some(address()))
        .await
        .unwrap();
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-MUG")).await, Some(0));

    world
        .orchestrator
        .cancel_order(order.id(), user_id)
        .await
        .unwrap();
    assert_eq!(world.catalog.stock_of(&ProductId::new("SKU-MUG")).await, Some(3));

    let other = UserId::new();
    world
        .cart_service
        .add_item(other, ProductId::new("SKU-MUG"), 3)
        .await
        .unwrap();
    world
        .orchestrator
        .create_order(other, Some(address()))
        .await
        .unwrap();
}

#[tokio::test]
async fn orders_listing_reflects_full_history() {
    let world = world().await;
    let user_id = UserId::new();

    for _ in 0..2 {
        world
            .cart_service
            .add_item(user_id, ProductId::new("SKU-TEE"), 1)
            .await
            .unwrap();
        world
            .orchestrator
            .create_order(user_id, Some(address()))
            .await
            .unwrap();
    }

    let orders = world.orchestrator.orders_for_user(user_id).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.status() == OrderStatus::Pending));
}

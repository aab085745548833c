mod common;

use std::sync::Arc;

use uuid::Uuid;

use common::{air_max, user_with_address, ScriptedClassifier};
use shoebot::chat::intent::{ChatEntities, Intent, IntentResult};
use shoebot::chat::{Dispatcher, KeywordClassifier};
use shoebot::models::{OrderStatus, PaymentStatus};
use shoebot::store::{CartStore, ChatHistoryStore, MemoryStore, OrderStore};

fn result(intent: Intent, entities: ChatEntities) -> IntentResult {
    IntentResult {
        intent,
        entities,
        confidence: 0.9,
    }
}

#[tokio::test]
async fn full_shopping_conversation() {
    let store = Arc::new(MemoryStore::new());
    let product = air_max();
    let product_id = product.id;
    store.insert_product(product).await;

    let user_id = Uuid::new_v4();
    store.insert_user(user_with_address(user_id)).await;

    let classifier = ScriptedClassifier::new(vec![
        ("Hello", result(Intent::Greeting, ChatEntities::default())),
        (
            "show me sneakers",
            result(
                Intent::BrowseProducts,
                ChatEntities {
                    category: Some("sneakers".to_string()),
                    ..ChatEntities::default()
                },
            ),
        ),
        (
            "Add Nike Air Max in black size 9",
            result(
                Intent::AddToCart,
                ChatEntities {
                    product_name: Some("Air Max".to_string()),
                    size: Some("9".to_string()),
                    color: Some("black".to_string()),
                    quantity: Some(1),
                    ..ChatEntities::default()
                },
            ),
        ),
        (
            "add two more of those",
            result(
                Intent::AddToCart,
                ChatEntities {
                    product_name: Some("Air Max".to_string()),
                    size: Some("9".to_string()),
                    color: Some("Black".to_string()),
                    quantity: Some(2),
                    ..ChatEntities::default()
                },
            ),
        ),
        (
            "what's in my cart",
            result(Intent::ViewCart, ChatEntities::default()),
        ),
        ("checkout", result(Intent::Checkout, ChatEntities::default())),
    ]);

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(classifier));

    let (reply, session_id) = dispatcher.handle_turn(user_id, "Hello", None).await.unwrap();
    assert!(reply.response.contains("Welcome to ShoeBot"));

    let (reply, _) = dispatcher
        .handle_turn(user_id, "show me sneakers", Some(session_id.clone()))
        .await
        .unwrap();
    assert_eq!(reply.products.as_ref().map(Vec::len), Some(1));
    assert!(reply.response.contains("Nike Air Max Classic"));

    let (reply, _) = dispatcher
        .handle_turn(
            user_id,
            "Add Nike Air Max in black size 9",
            Some(session_id.clone()),
        )
        .await
        .unwrap();
    assert!(reply.cart_updated);

    let cart = store.find_cart(user_id).await.unwrap().unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.items[0].size, "9");
    assert_eq!(cart.items[0].color, "black");

    // Same shoe again, different color casing: merges into the same line.
    let (reply, _) = dispatcher
        .handle_turn(user_id, "add two more of those", Some(session_id.clone()))
        .await
        .unwrap();
    assert!(reply.cart_updated);

    let cart = store.find_cart(user_id).await.unwrap().unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    let expected_total = (129.99f64 * 3.0 * 100.0).round() / 100.0;
    assert_eq!(cart.total_amount, expected_total);

    let (reply, _) = dispatcher
        .handle_turn(user_id, "what's in my cart", Some(session_id.clone()))
        .await
        .unwrap();
    assert!(reply.response.contains("**Nike Air Max Classic** by Nike"));
    assert!(reply.response.contains("Qty: 3"));
    assert!(reply.response.contains(&format!("Total: ${expected_total:.2}")));

    let (reply, _) = dispatcher
        .handle_turn(user_id, "checkout", Some(session_id.clone()))
        .await
        .unwrap();
    assert!(reply.cart_updated);
    assert!(reply.response.contains("Order placed successfully"));
    assert!(reply.response.contains("Cash on Delivery"));

    let cart = store.find_cart(user_id).await.unwrap().unwrap();
    assert!(cart.is_empty());
    assert_eq!(cart.total_amount, 0.0);

    let (orders, total) = store.list_orders(user_id, None, 1, 10).await.unwrap();
    assert_eq!(total, 1);
    let order = &orders[0];
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.total_amount, expected_total);
    assert_eq!(order.shipping_address.country, "Bangladesh");

    // Cash on delivery: stock moves when payment is confirmed, not here.
    assert_eq!(store.product_stock(product_id).await, Some(5));

    let history = store
        .find_history(user_id, &session_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(history.messages.len(), 6);
    assert_eq!(history.messages[0].intent, Intent::Greeting);
    assert_eq!(history.messages[5].intent, Intent::Checkout);
}

#[tokio::test]
async fn keyword_classifier_degrades_gracefully_without_product_names() {
    let store = Arc::new(MemoryStore::new());
    store.insert_product(air_max()).await;
    let user_id = Uuid::new_v4();

    let dispatcher = Dispatcher::new(store.clone(), Arc::new(KeywordClassifier));

    // The rule-based classifier extracts size and color but not product
    // names, so the add flow asks for clarification instead of guessing.
    let (reply, _) = dispatcher
        .handle_turn(user_id, "add the air max in black size 9", None)
        .await
        .unwrap();
    assert!(!reply.cart_updated);
    assert!(reply.response.contains("more specific"));
    assert!(store.find_cart(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn sessions_are_isolated_per_id() {
    let store = Arc::new(MemoryStore::new());
    let user_id = Uuid::new_v4();
    let dispatcher = Dispatcher::new(store.clone(), Arc::new(KeywordClassifier));

    let (_, first) = dispatcher.handle_turn(user_id, "hello", None).await.unwrap();
    let (_, second) = dispatcher.handle_turn(user_id, "hello", None).await.unwrap();
    assert_ne!(first, second);

    let history = store.find_history(user_id, &first).await.unwrap().unwrap();
    assert_eq!(history.messages.len(), 1);
}

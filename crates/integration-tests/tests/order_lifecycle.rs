//! End-to-end order lifecycle: checkout, reminder, delivered, recovery.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use amaz_core::{Email, Order, OrderDraft, OrderId, OrderItem, OrderStatus};
use amaz_integration_tests::TestContext;
use amaz_storefront::notify::SentNotification;
use amaz_storefront::services::card_validator::CardDetails;
use amaz_storefront::store::OrderStore;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

fn valid_card() -> CardDetails {
    CardDetails {
        card_number: "4539 1488 0343 6467".to_owned(),
        expiry: "12/30".to_owned(),
        cvc: "123".to_owned(),
        cardholder_name: "Awa Diop".to_owned(),
    }
}

fn draft() -> OrderDraft {
    OrderDraft {
        customer_email: Email::parse("client@amaz.demo").expect("valid email"),
        items: vec![
            OrderItem {
                name: "Desk lamp".to_owned(),
                quantity: 2,
                unit_price: dec!(19.99),
            },
            OrderItem {
                name: "Area rug".to_owned(),
                quantity: 1,
                unit_price: dec!(89.00),
            },
        ],
        delivery_date: None,
    }
}

fn in_transit(delivery_date: DateTime<Utc>) -> Order {
    Order {
        id: OrderId::new(),
        status: OrderStatus::InTransit,
        delivery_date: Some(delivery_date),
        delivered_at: None,
        customer_email: Email::parse("client@amaz.demo").expect("valid email"),
        items: vec![OrderItem {
            name: "Bookshelf".to_owned(),
            quantity: 1,
            unit_price: dec!(120.00),
        }],
        total: dec!(120.00),
        created_at: epoch(),
    }
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

fn count(ctx: &TestContext, id: OrderId, want_reminder: bool) -> usize {
    ctx.channel
        .sent()
        .iter()
        .filter(|n| match n {
            SentNotification::DeliveryReminder { order_id, .. } => want_reminder && *order_id == id,
            SentNotification::OrderDelivered { order_id, .. } => !want_reminder && *order_id == id,
            _ => false,
        })
        .count()
}

#[tokio::test(start_paused = true)]
async fn checkout_to_delivered_full_timeline() {
    let ctx = TestContext::new(epoch());

    let order = ctx
        .checkout
        .place_order(&valid_card(), draft())
        .await
        .expect("checkout succeeds");
    assert_eq!(order.total, dec!(128.98));
    assert_eq!(order.status, OrderStatus::InTransit);
    assert!(ctx.scheduler.is_scheduled(order.id));

    // Cross the entire delivery window plus a day, host timezone agnostic.
    tokio::time::advance(Duration::from_secs(5 * 24 * 3600)).await;
    settle().await;

    assert_eq!(count(&ctx, order.id, true), 1, "exactly one reminder");
    assert_eq!(count(&ctx, order.id, false), 1, "exactly one delivered");

    let stored = ctx
        .store
        .get_order(&order.id)
        .await
        .expect("store reachable")
        .expect("order exists");
    assert_eq!(stored.status, OrderStatus::Delivered);
    assert!(stored.delivered_at.is_some());
    assert!(!ctx.scheduler.is_scheduled(order.id));
}

#[tokio::test(start_paused = true)]
async fn reminder_precedes_delivered_for_one_order() {
    let ctx = TestContext::new(epoch());
    let order = ctx
        .checkout
        .place_order(&valid_card(), draft())
        .await
        .expect("checkout succeeds");

    tokio::time::advance(Duration::from_secs(5 * 24 * 3600)).await;
    settle().await;

    let events: Vec<_> = ctx
        .channel
        .sent()
        .into_iter()
        .filter(|n| {
            matches!(
                n,
                SentNotification::DeliveryReminder { order_id, .. }
                | SentNotification::OrderDelivered { order_id, .. }
                if *order_id == order.id
            )
        })
        .collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        events.first(),
        Some(SentNotification::DeliveryReminder { .. })
    ));
    assert!(matches!(
        events.get(1),
        Some(SentNotification::OrderDelivered { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn recovery_pass_schedules_exactly_the_in_transit_orders() {
    let ctx = TestContext::new(epoch());

    let a = in_transit(epoch() + chrono::Duration::days(1));
    let b = in_transit(epoch() + chrono::Duration::days(2));
    let c = in_transit(epoch() + chrono::Duration::days(3));
    let mut done = in_transit(epoch() + chrono::Duration::days(1));
    done.status = OrderStatus::Delivered;
    done.delivered_at = Some(epoch());
    for order in [&a, &b, &c, &done] {
        ctx.store.insert_order((*order).clone());
    }

    let resumed = ctx.scheduler.resume_pending().await.expect("store reachable");
    assert_eq!(resumed, 3);
    assert!(ctx.scheduler.is_scheduled(a.id));
    assert!(ctx.scheduler.is_scheduled(b.id));
    assert!(ctx.scheduler.is_scheduled(c.id));
    assert!(!ctx.scheduler.is_scheduled(done.id));
}

#[tokio::test(start_paused = true)]
async fn restart_recovers_orders_left_in_transit() {
    let ctx = TestContext::new(epoch());
    let order = ctx
        .checkout
        .place_order(&valid_card(), draft())
        .await
        .expect("checkout succeeds");

    // "Restart": the original scheduler and its timers are dropped with the
    // order still in transit. A fresh scheduler knows nothing about it.
    let restarted = ctx.restarted_scheduler();
    assert!(!restarted.is_scheduled(order.id));

    let resumed = restarted.resume_pending().await.expect("store reachable");
    assert_eq!(resumed, 1);
    assert!(restarted.is_scheduled(order.id));

    tokio::time::advance(Duration::from_secs(5 * 24 * 3600)).await;
    settle().await;

    let stored = ctx
        .store
        .get_order(&order.id)
        .await
        .expect("store reachable")
        .expect("order exists");
    assert_eq!(stored.status, OrderStatus::Delivered);
}

#[tokio::test(start_paused = true)]
async fn outage_past_delivery_date_delivers_on_resume() {
    let ctx = TestContext::new(epoch());
    let overdue = in_transit(epoch() - chrono::Duration::days(2));
    ctx.store.insert_order(overdue.clone());

    let resumed = ctx.scheduler.resume_pending().await.expect("store reachable");
    assert_eq!(resumed, 1);

    // Delivered synchronously during the recovery pass itself.
    let stored = ctx
        .store
        .get_order(&overdue.id)
        .await
        .expect("store reachable")
        .expect("order exists");
    assert_eq!(stored.status, OrderStatus::Delivered);
    assert_eq!(count(&ctx, overdue.id, false), 1);
    assert_eq!(count(&ctx, overdue.id, true), 0, "no reminder for overdue order");
    assert!(!ctx.scheduler.is_scheduled(overdue.id));
}

#[tokio::test(start_paused = true)]
async fn invalid_card_never_reaches_the_store() {
    let ctx = TestContext::new(epoch());
    let mut card = valid_card();
    card.card_number = "4539148803436468".to_owned(); // fails Luhn

    let result = ctx.checkout.place_order(&card, draft()).await;
    assert!(result.is_err());
    assert!(ctx.store.is_empty());
    assert!(ctx.channel.sent().is_empty());
}

//! 预订核心测试 (内存数据库)

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use shared::ReservationStatus;

use crate::db::DbService;
use crate::db::models::Customer;
use crate::db::repository::{ReservationRepository, TimeSlotRepository};
use crate::utils::time::{booking_end_millis, now_millis};

use super::{
    AvailabilityResolver, BookingError, BookingRequest, BookingWriter, ReservationLifecycle,
};

const DATE: &str = "01-06-2024";

async fn mem_db() -> Surreal<Db> {
    DbService::memory().await.unwrap().db
}

fn restaurant_id(key: &str) -> RecordId {
    RecordId::from(("restaurant", key))
}

fn customer(uid: &str) -> Customer {
    Customer {
        uid: uid.to_string(),
        name: format!("Customer {uid}"),
        email: format!("{uid}@example.com"),
    }
}

async fn seed_slot(db: &Surreal<Db>, restaurant: &RecordId, label: &str, capacity: i64) {
    TimeSlotRepository::new(db.clone())
        .upsert(restaurant.clone(), DATE, label, true, capacity)
        .await
        .unwrap();
}

fn request(restaurant: &RecordId, label: &str, guests: i64, uid: &str) -> BookingRequest {
    BookingRequest {
        restaurant: restaurant.clone(),
        restaurant_name: "Trattoria Uno".to_string(),
        date: DATE.to_string(),
        label: label.to_string(),
        guests,
        customer: customer(uid),
    }
}

#[tokio::test]
async fn book_claims_slot_and_creates_pending_reservation() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let reservation = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();

    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.date, DATE);
    assert_eq!(reservation.label, "18:00");
    assert_eq!(reservation.guests, 2);
    assert_eq!(reservation.customer_uid, "alice");
    let expected_end = booking_end_millis(DATE, "18:00", 120).unwrap();
    assert_eq!(reservation.booking_end_time, expected_end);

    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.available);
    assert_eq!(slot.booking_end_time, Some(expected_end));
}

#[tokio::test]
async fn book_rejects_guest_count_over_capacity() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let err = writer.book(request(&r1, "18:00", 6, "alice")).await.unwrap_err();
    match err {
        BookingError::CapacityExceeded { guests, capacity } => {
            assert_eq!(guests, 6);
            assert_eq!(capacity, 4);
        }
        other => panic!("expected CapacityExceeded, got {other:?}"),
    }

    // 事务中止，时段保持可用
    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(slot.available);
    assert_eq!(slot.booking_end_time, None);
}

#[tokio::test]
async fn book_unknown_slot_is_not_found() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");

    let writer = BookingWriter::new(db, 120);
    let err = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap_err();
    assert!(matches!(err, BookingError::SlotNotFound { .. }));
}

#[tokio::test]
async fn book_rejects_nonpositive_guest_count() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db, 120);
    let err = writer.book(request(&r1, "18:00", 0, "alice")).await.unwrap_err();
    assert!(matches!(err, BookingError::InvalidRequest(_)));
}

#[tokio::test]
async fn second_booking_of_claimed_slot_is_rejected() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db, 120);
    writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();

    let err = writer.book(request(&r1, "18:00", 2, "bob")).await.unwrap_err();
    assert!(matches!(err, BookingError::SlotTaken { .. }));
}

#[tokio::test]
async fn concurrent_bookings_claim_at_most_once() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let (a, b) = tokio::join!(
        writer.book(request(&r1, "18:00", 2, "alice")),
        writer.book(request(&r1, "18:00", 3, "bob")),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|s| **s).count();
    assert!(successes <= 1, "both concurrent bookings claimed the slot");

    // 落败方没有留下预订记录
    let reservations: Vec<crate::db::models::Reservation> = db
        .query("SELECT * FROM reservation")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    assert_eq!(reservations.len(), successes);

    if successes == 1 {
        let slot = TimeSlotRepository::new(db)
            .find_slot(&r1, DATE, "18:00")
            .await
            .unwrap()
            .unwrap();
        assert!(!slot.available);
    }
}

#[tokio::test]
async fn confirm_keeps_slot_claimed() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let reservation = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let key = reservation.id.unwrap().key().to_string();

    let lifecycle = ReservationLifecycle::new(db.clone());
    let updated = lifecycle
        .set_status(&key, ReservationStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(updated.status, ReservationStatus::Confirmed);

    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.available);
}

#[tokio::test]
async fn staff_cancel_releases_slot() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let reservation = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let key = reservation.id.unwrap().key().to_string();

    let lifecycle = ReservationLifecycle::new(db.clone());
    let updated = lifecycle
        .set_status(&key, ReservationStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(updated.status, ReservationStatus::Canceled);

    let slot = TimeSlotRepository::new(db.clone())
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(slot.available);
    assert_eq!(slot.booking_end_time, None);

    // 时段释放后可再次预订
    let again = writer.book(request(&r1, "18:00", 2, "bob")).await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn staff_cannot_reset_reservation_to_pending() {
    let db = mem_db().await;
    let lifecycle = ReservationLifecycle::new(db);
    let err = lifecycle
        .set_status("whatever", ReservationStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::InvalidStatus(_)));
}

#[tokio::test]
async fn repeated_cancel_does_not_free_a_rebooked_slot() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let first = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let first_key = first.id.unwrap().key().to_string();

    let lifecycle = ReservationLifecycle::new(db.clone());
    lifecycle
        .set_status(&first_key, ReservationStatus::Canceled)
        .await
        .unwrap();

    // 时段被另一位顾客重新占用
    writer.book(request(&r1, "18:00", 3, "bob")).await.unwrap();

    // 再次取消第一单不得误放 bob 的时段
    lifecycle
        .set_status(&first_key, ReservationStatus::Canceled)
        .await
        .unwrap();

    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.available);
}

#[tokio::test]
async fn stale_cancel_after_sweep_does_not_free_rebooked_slot() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let stale = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let stale_key = stale.id.unwrap().key().to_string();

    // 占用到期，回收任务释放时段 (日期在过去，到期时间必然已过)
    let released = TimeSlotRepository::new(db.clone())
        .release_expired(now_millis())
        .await
        .unwrap();
    assert_eq!(released.len(), 1);

    // 另一位顾客重新占用；到期时间与第一单完全相同
    writer.book(request(&r1, "18:00", 3, "bob")).await.unwrap();

    // 过期的第一单仍是 pending，取消它不得误放 bob 的时段
    let lifecycle = ReservationLifecycle::new(db.clone());
    lifecycle
        .set_status(&stale_key, ReservationStatus::Canceled)
        .await
        .unwrap();

    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.available, "stale cancel released the new holder's slot");
}

#[tokio::test]
async fn customer_cancel_deletes_reservation_and_releases_slot() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let reservation = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let key = reservation.id.unwrap().key().to_string();

    let lifecycle = ReservationLifecycle::new(db.clone());
    let removed = lifecycle.cancel_own(&key, "alice").await.unwrap();
    assert_eq!(removed.customer_uid, "alice");

    let repo = ReservationRepository::new(db.clone());
    assert!(repo.find_by_id(&key).await.unwrap().is_none());

    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(slot.available);
}

#[tokio::test]
async fn customer_cannot_cancel_someone_elses_reservation() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let writer = BookingWriter::new(db.clone(), 120);
    let reservation = writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();
    let key = reservation.id.unwrap().key().to_string();

    let lifecycle = ReservationLifecycle::new(db.clone());
    let err = lifecycle.cancel_own(&key, "mallory").await.unwrap_err();
    assert!(matches!(err, BookingError::NotOwner));

    // 预订保留，时段仍被占用
    let repo = ReservationRepository::new(db.clone());
    assert!(repo.find_by_id(&key).await.unwrap().is_some());
    let slot = TimeSlotRepository::new(db)
        .find_slot(&r1, DATE, "18:00")
        .await
        .unwrap()
        .unwrap();
    assert!(!slot.available);
}

#[tokio::test]
async fn cancel_unknown_reservation_is_not_found() {
    let db = mem_db().await;
    let lifecycle = ReservationLifecycle::new(db);
    let err = lifecycle.cancel_own("missing", "alice").await.unwrap_err();
    assert!(matches!(err, BookingError::ReservationNotFound(_)));
}

#[tokio::test]
async fn resolver_lists_partition_sorted_by_time_of_day() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    // 乱序播种
    seed_slot(&db, &r1, "21:15", 2).await;
    seed_slot(&db, &r1, "09:30", 6).await;
    seed_slot(&db, &r1, "18:00", 4).await;

    let resolver = AvailabilityResolver::new(db);
    let slots = resolver.list_slots(&r1, DATE).await.unwrap();
    let labels: Vec<&str> = slots.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["09:30", "18:00", "21:15"]);
}

#[tokio::test]
async fn resolver_scopes_partitions_by_restaurant_and_date() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    let r2 = restaurant_id("r2");
    seed_slot(&db, &r1, "18:00", 4).await;
    TimeSlotRepository::new(db.clone())
        .upsert(r2.clone(), "02-06-2024", "18:00", true, 4)
        .await
        .unwrap();

    let resolver = AvailabilityResolver::new(db);
    assert_eq!(resolver.list_slots(&r1, DATE).await.unwrap().len(), 1);
    assert_eq!(resolver.list_slots(&r2, DATE).await.unwrap().len(), 0);

    // 未播种的分区是空列表，不是错误
    let empty = resolver.list_slots(&r1, "31-12-2024").await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn resolver_checks_single_slot_status() {
    let db = mem_db().await;
    let r1 = restaurant_id("r1");
    seed_slot(&db, &r1, "18:00", 4).await;

    let resolver = AvailabilityResolver::new(db.clone());
    let status = resolver.check_slot(&r1, DATE, "18:00").await.unwrap();
    assert!(status.available);
    assert_eq!(status.capacity, 4);

    let writer = BookingWriter::new(db, 120);
    writer.book(request(&r1, "18:00", 2, "alice")).await.unwrap();

    let status = resolver.check_slot(&r1, DATE, "18:00").await.unwrap();
    assert!(!status.available);

    let err = resolver.check_slot(&r1, DATE, "23:45").await.unwrap_err();
    assert!(matches!(err, BookingError::SlotNotFound { .. }));
}

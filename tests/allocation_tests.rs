mod common;

use cartera::application::allocation::{AllocationEngine, PaymentOrder};
use cartera::application::matching::ConceptKeywords;
use cartera::infrastructure::in_memory::{InMemoryChargeStore, InMemoryPaymentStore};
use common::{charge, date, payment, student};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn build_engine(
    charges: Vec<cartera::domain::charge::Charge>,
    payments: Vec<cartera::domain::payment::PaymentRecord>,
) -> (AllocationEngine, InMemoryChargeStore) {
    let charge_store = InMemoryChargeStore::new();
    for c in charges {
        charge_store.insert(c).await;
    }
    let payment_store = InMemoryPaymentStore::new();
    for p in payments {
        payment_store.insert(p).await;
    }
    let engine = AllocationEngine::new(
        Box::new(charge_store.clone()),
        Box::new(payment_store),
        ConceptKeywords::defaults(),
    );
    (engine, charge_store)
}

#[tokio::test]
async fn test_tuition_partial_payment_scenario() {
    // Two 1000.00 tuition charges, one 1500.00 payment: oldest covered in
    // full, the other half-covered, nothing left over.
    let (engine, store) = build_engine(
        vec![
            charge(1, 1, "COLEGIATURA", dec!(1000.00), date(2024, 1, 1)),
            charge(2, 1, "COLEGIATURA", dec!(1000.00), date(2024, 2, 1)),
        ],
        vec![payment(
            10,
            1,
            dec!(1500.00),
            date(2024, 2, 15),
            "pago de colegiatura",
        )],
    )
    .await;

    let report = engine
        .allocate_as_of(&student(1), PaymentOrder::MostRecentFirst, date(2024, 3, 1))
        .await
        .unwrap();

    let a = report.entries.iter().find(|e| e.charge_id == 1).unwrap();
    assert_eq!(a.applied, dec!(1000.00));
    assert_eq!(a.remaining, dec!(0.00));
    let b = report.entries.iter().find(|e| e.charge_id == 2).unwrap();
    assert_eq!(b.applied, dec!(500.00));
    assert_eq!(b.remaining, dec!(500.00));
    assert!(report.excess_payments.is_empty());

    // Paid flags were persisted through the store.
    assert!(store.get(1).await.unwrap().paid);
    assert!(!store.get(2).await.unwrap().paid);
}

#[tokio::test]
async fn test_concept_groups_allocate_independently() {
    let (engine, store) = build_engine(
        vec![
            charge(1, 1, "COLEGIATURA", dec!(500.00), date(2024, 1, 1)),
            charge(2, 1, "INSCRIPCION", dec!(800.00), date(2024, 1, 1)),
        ],
        vec![
            payment(10, 1, dec!(500.00), date(2024, 1, 10), "mensualidad enero"),
            payment(11, 1, dec!(300.00), date(2024, 1, 12), "pago de matricula"),
        ],
    )
    .await;

    let report = engine
        .allocate_as_of(&student(1), PaymentOrder::MostRecentFirst, date(2024, 2, 1))
        .await
        .unwrap();

    assert!(store.get(1).await.unwrap().paid);
    assert!(!store.get(2).await.unwrap().paid);
    let pending: Vec<_> = report.pending().collect();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].charge_id, 2);
    assert_eq!(pending[0].remaining, dec!(500.00));
}

#[tokio::test]
async fn test_conservation_across_group() {
    let charges = vec![
        charge(1, 1, "COLEGIATURA", dec!(350.00), date(2024, 1, 1)),
        charge(2, 1, "COLEGIATURA", dec!(125.50), date(2024, 2, 1)),
    ];
    let payments = vec![
        payment(10, 1, dec!(200.00), date(2024, 1, 5), "colegiatura"),
        payment(11, 1, dec!(400.00), date(2024, 2, 5), "colegiatura"),
    ];
    let total_paid: Decimal = dec!(600.00);

    let (engine, _) = build_engine(charges, payments).await;
    let report = engine
        .allocate_as_of(&student(1), PaymentOrder::MostRecentFirst, date(2024, 3, 1))
        .await
        .unwrap();

    let applied: Decimal = report.entries.iter().map(|e| e.applied).sum();
    let excess: Decimal = report.excess_payments.iter().map(|e| e.leftover).sum();
    assert_eq!(applied + excess, total_paid);
    assert_eq!(excess, dec!(124.50));
}

#[tokio::test]
async fn test_identity_fallback_matches_payment_without_link() {
    // The payment row has no student FK, only a student number.
    let mut who = student(1);
    who.student_number = Some(20240001);
    let mut orphan = payment(10, 1, dec!(250.00), date(2024, 1, 10), "colegiatura");
    orphan.student_id = None;
    orphan.student_number = Some(20240001);

    let (engine, store) = build_engine(
        vec![charge(1, 1, "COLEGIATURA", dec!(250.00), date(2024, 1, 1))],
        vec![orphan],
    )
    .await;

    engine
        .allocate_as_of(&who, PaymentOrder::MostRecentFirst, date(2024, 2, 1))
        .await
        .unwrap();
    assert!(store.get(1).await.unwrap().paid);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (engine, store) = build_engine(
        vec![charge(1, 1, "COLEGIATURA", dec!(100.00), date(2024, 1, 1))],
        vec![payment(10, 1, dec!(100.00), date(2024, 1, 5), "colegiatura")],
    )
    .await;

    let first = engine
        .allocate_as_of(&student(1), PaymentOrder::MostRecentFirst, date(2024, 2, 1))
        .await
        .unwrap();
    let second = engine
        .allocate_as_of(&student(1), PaymentOrder::MostRecentFirst, date(2024, 2, 1))
        .await
        .unwrap();

    assert_eq!(first.entries, second.entries);
    assert_eq!(first.totals, second.totals);
    assert!(store.get(1).await.unwrap().paid);
}

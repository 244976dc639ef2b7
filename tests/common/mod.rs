use cartera::domain::charge::{Charge, ChargeId, Concept, StudentId};
use cartera::domain::payment::{PaymentId, PaymentRecord, StudentRef};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn student(id: StudentId) -> StudentRef {
    StudentRef::new(id)
}

pub fn charge(
    id: ChargeId,
    student: StudentId,
    code: &str,
    amount: Decimal,
    issued: NaiveDate,
) -> Charge {
    Charge {
        id,
        student_id: student,
        concept: Concept::new(code, code),
        amount,
        issued_on: issued,
        due_on: None,
        paid: false,
    }
}

pub fn payment(
    id: PaymentId,
    student: StudentId,
    amount: Decimal,
    on: NaiveDate,
    concept: &str,
) -> PaymentRecord {
    PaymentRecord {
        id,
        student_id: Some(student),
        national_id: None,
        student_number: None,
        folio: None,
        date: on,
        recorded_at: on.and_hms_opt(12, 0, 0).unwrap(),
        amount: Some(amount),
        concept: Some(concept.to_string()),
        detail: None,
    }
}

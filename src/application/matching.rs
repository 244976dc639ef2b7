use crate::domain::payment::{PaymentRecord, StudentRef};
use crate::error::Result;
use std::collections::HashMap;
use std::io::Read;

/// Immutable keyword table mapping a concept code to the vocabulary that
/// identifies its payments in free text.
///
/// This is a best-effort textual heuristic: two concepts with overlapping
/// vocabulary cannot be told apart, and free text being free text, false
/// positives and negatives are expected.
#[derive(Debug, Clone)]
pub struct ConceptKeywords {
    table: HashMap<String, Vec<String>>,
}

impl ConceptKeywords {
    /// Builds a table; codes are upper-cased, keywords lower-cased.
    pub fn new(table: HashMap<String, Vec<String>>) -> Self {
        let table = table
            .into_iter()
            .map(|(code, words)| {
                (
                    code.trim().to_uppercase(),
                    words.into_iter().map(|w| w.to_lowercase()).collect(),
                )
            })
            .collect();
        Self { table }
    }

    /// The vocabulary the cash desk has historically used per concept.
    pub fn defaults() -> Self {
        let table = [
            (
                "COLEGIATURA",
                vec!["colegiatura", "mensualidad", "tuition", "pago mensual"],
            ),
            (
                "INSCRIPCION",
                vec!["inscripción", "inscripcion", "matrícula", "matricula"],
            ),
            ("REINSCRIPCION", vec!["reinscripción", "reinscripcion"]),
            ("TITULACION", vec!["titulación", "titulacion"]),
            ("EQV", vec!["equivalencia"]),
        ];
        Self::new(
            table
                .into_iter()
                .map(|(code, words)| {
                    (
                        code.to_string(),
                        words.into_iter().map(String::from).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Loads an override table from JSON: `{"CODE": ["keyword", ...], ...}`.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let table: HashMap<String, Vec<String>> = serde_json::from_reader(reader)?;
        Ok(Self::new(table))
    }

    pub fn keywords(&self, code: &str) -> Option<&[String]> {
        self.table
            .get(&code.trim().to_uppercase())
            .map(Vec::as_slice)
    }

    /// Whether the payment's concept or detail text mentions the concept.
    ///
    /// Falls back to containment of the code itself when no keywords are
    /// registered for it.
    pub fn matches(&self, code: &str, payment: &PaymentRecord) -> bool {
        let concept = lower(payment.concept.as_deref());
        let detail = lower(payment.detail.as_deref());
        match self.keywords(code) {
            Some(words) => words
                .iter()
                .any(|w| concept.contains(w.as_str()) || detail.contains(w.as_str())),
            None => {
                let code = code.trim().to_lowercase();
                !code.is_empty() && (concept.contains(&code) || detail.contains(&code))
            }
        }
    }
}

impl Default for ConceptKeywords {
    fn default() -> Self {
        Self::defaults()
    }
}

fn lower(text: Option<&str>) -> String {
    text.unwrap_or_default().to_lowercase()
}

/// One way of deciding that a payment belongs to a student.
pub trait IdentityRule: Send + Sync {
    fn applies(&self, student: &StudentRef, payment: &PaymentRecord) -> bool;
}

/// Payment row carries the student's foreign key.
pub struct DirectLink;

impl IdentityRule for DirectLink {
    fn applies(&self, student: &StudentRef, payment: &PaymentRecord) -> bool {
        payment.student_id == Some(student.id)
    }
}

/// Case-insensitive national ID (CURP) equality.
pub struct NationalId;

impl IdentityRule for NationalId {
    fn applies(&self, student: &StudentRef, payment: &PaymentRecord) -> bool {
        match (&student.national_id, &payment.national_id) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

/// Student number equality.
pub struct StudentNumber;

impl IdentityRule for StudentNumber {
    fn applies(&self, student: &StudentRef, payment: &PaymentRecord) -> bool {
        student.student_number.is_some() && payment.student_number == student.student_number
    }
}

/// Composes identity rules with OR semantics.
pub struct IdentityMatcher {
    rules: Vec<Box<dyn IdentityRule>>,
}

impl IdentityMatcher {
    pub fn new(rules: Vec<Box<dyn IdentityRule>>) -> Self {
        Self { rules }
    }

    pub fn belongs_to(&self, student: &StudentRef, payment: &PaymentRecord) -> bool {
        self.rules.iter().any(|r| r.applies(student, payment))
    }
}

impl Default for IdentityMatcher {
    fn default() -> Self {
        Self::new(vec![
            Box::new(DirectLink),
            Box::new(NationalId),
            Box::new(StudentNumber),
        ])
    }
}

use crate::domain::movement::RawMovement;
use crate::error::{CarteraError, Result};
use serde::Deserialize;
use std::io::Read;

/// One CSV row of a bank-statement export; columns carry the Spanish
/// headers of the source spreadsheet. Empty cells become missing fields.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MovementRow {
    fecha: Option<String>,
    tipo: Option<String>,
    monto: Option<String>,
    signo: Option<String>,
    sucursal: Option<String>,
    referencia_numerica: Option<String>,
    referencia_alfanumerica: Option<String>,
    concepto: Option<String>,
    autorizacion: Option<String>,
    emisor_nombre: Option<String>,
    institucion_emisora: Option<String>,
    descripcion_raw: Option<String>,
}

impl From<MovementRow> for RawMovement {
    fn from(row: MovementRow) -> Self {
        Self {
            date: row.fecha,
            kind: row.tipo,
            amount: row.monto,
            sign: row.signo,
            branch: row.sucursal,
            numeric_reference: row.referencia_numerica,
            alpha_reference: row.referencia_alfanumerica,
            concept: row.concepto,
            authorization: row.autorizacion,
            sender_name: row.emisor_nombre,
            issuing_institution: row.institucion_emisora,
            raw_description: row.descripcion_raw,
        }
    }
}

/// Reads raw bank movements from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths
/// and provides a lazy iterator over `Result<RawMovement>`, so large export
/// files stream without loading everything into memory.
pub struct MovementReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> MovementReader<R> {
    /// Creates a new `MovementReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn movements(self) -> impl Iterator<Item = Result<RawMovement>> {
        self.reader
            .into_deserialize::<MovementRow>()
            .map(|result| result.map(RawMovement::from).map_err(CarteraError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "fecha,tipo,monto,signo,emisor_nombre\n\
                    2024-05-01,SPEI,100.00,-1,JUAN PEREZ\n\
                    02/05/2024,DEPOSITO,\"2,275.00\",1,ANA LOPEZ";
        let reader = MovementReader::new(data.as_bytes());
        let rows: Vec<Result<RawMovement>> = reader.movements().collect();

        assert_eq!(rows.len(), 2);
        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.date.as_deref(), Some("2024-05-01"));
        assert_eq!(first.amount.as_deref(), Some("100.00"));
        assert_eq!(first.sender_name.as_deref(), Some("JUAN PEREZ"));
    }

    #[test]
    fn test_reader_empty_cells_are_missing() {
        let data = "fecha,tipo,monto,signo\n2024-05-01,,100.00,";
        let reader = MovementReader::new(data.as_bytes());
        let row = reader.movements().next().unwrap().unwrap();

        assert_eq!(row.kind, None);
        assert_eq!(row.normalized_sign(), 1);
    }

    #[test]
    fn test_reader_missing_columns_default() {
        let data = "fecha,monto\n2024-05-01,100.00";
        let reader = MovementReader::new(data.as_bytes());
        let row = reader.movements().next().unwrap().unwrap();

        assert_eq!(row.date.as_deref(), Some("2024-05-01"));
        assert_eq!(row.branch, None);
    }
}

use csv::{QuoteStyle, WriterBuilder};

use crate::export::table::Sheet;
use crate::export::ExportError;

/// Writes one sheet as CSV. Every field is quoted and embedded quotes are
/// doubled. The header row is always written, even with no data rows.
pub fn render(sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row.iter().map(|cell| cell.render()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::table::Cell;

    fn sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: "Submissions".to_string(),
            headers: vec!["Worker".to_string(), "Notes".to_string(), "Total Qty".to_string()],
            widths: vec![18.0, 25.0, 10.0],
            rows,
        }
    }

    #[test]
    fn quotes_every_field_and_doubles_inner_quotes() {
        let bytes = render(&sheet(vec![vec![
            Cell::from("Asha"),
            Cell::from("said \"busy\", sold out"),
            Cell::Number(5.0),
        ]]))
        .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "\"Worker\",\"Notes\",\"Total Qty\"\n\"Asha\",\"said \"\"busy\"\", sold out\",\"5\"\n"
        );
    }

    #[test]
    fn empty_sheet_emits_header_only() {
        let text = String::from_utf8(render(&sheet(vec![])).unwrap()).unwrap();
        assert_eq!(text, "\"Worker\",\"Notes\",\"Total Qty\"\n");
    }
}

use std::io::Cursor;

use umya_spreadsheet::Spreadsheet;

use crate::export::table::{Cell, Sheet, Workbook};
use crate::export::ExportError;

/// Renders the workbook as `.xlsx` bytes, one worksheet per sheet in order.
pub fn render(workbook: &Workbook) -> Result<Vec<u8>, ExportError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for sheet in workbook.sheets() {
        write_sheet(&mut book, sheet)?;
    }

    let mut out = Cursor::new(Vec::<u8>::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;
    Ok(out.into_inner())
}

fn write_sheet(book: &mut Spreadsheet, sheet: &Sheet) -> Result<(), ExportError> {
    let ws = book
        .new_sheet(&sheet.name)
        .map_err(|e| ExportError::Spreadsheet(e.to_string()))?;

    for (idx, header) in sheet.headers.iter().enumerate() {
        let col = idx as u32 + 1;
        ws.get_cell_mut((col, 1)).set_value(header.clone());
    }
    for (idx, width) in sheet.widths.iter().enumerate() {
        ws.get_column_dimension_mut(&column_letters(idx as u32 + 1))
            .set_width(*width);
    }

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = row_idx as u32 + 2;
        for (col_idx, cell) in row.iter().enumerate() {
            let target = ws.get_cell_mut((col_idx as u32 + 1, row_num));
            match cell {
                Cell::Text(text) => {
                    target.set_value(text.clone());
                }
                Cell::Number(value) => {
                    target.set_value_number(*value);
                }
            }
        }
    }
    Ok(())
}

/// 1-based column index to spreadsheet letters (1 is A, 27 is AA).
fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

use super::domain::PlotTable;
use super::parser::build_table;
use super::PlotImportError;
use calamine::{open_workbook_auto_from_rs, Reader};
use csv::StringRecord;
use std::io::Cursor;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Excel and OpenDocument uploads start with a ZIP or OLE container header.
pub(crate) fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

/// Reads the first worksheet, treating its first used row as the header.
pub(crate) fn parse_workbook(bytes: Vec<u8>) -> Result<PlotTable, PlotImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(PlotImportError::EmptyWorkbook)??;

    let first_row = range
        .start()
        .map(|(row, _)| row as usize)
        .unwrap_or_default();
    let mut rows = range.rows().enumerate().map(|(offset, cells)| {
        let mut record: StringRecord = cells.iter().map(|cell| cell.to_string()).collect();
        record.trim();
        (first_row + offset + 1, record)
    });

    let headers = rows.next().map(|(_, record)| record).unwrap_or_default();
    build_table(&headers, rows.map(Ok))
}

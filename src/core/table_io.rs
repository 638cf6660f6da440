use crate::domain::model::{Record, Table};
use crate::utils::error::{EtlError, Result};
use csv::{ReaderBuilder, WriterBuilder};

/// Parses delimited text with a mandatory header row.
///
/// Short rows are kept with their missing cells absent; extra cells past the
/// header are dropped. When a header name repeats, the first column wins.
pub fn read_table(data: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() {
        return Err(EtlError::ProcessingError {
            message: "input has no header row".to_string(),
        });
    }

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() > header.len() {
            tracing::debug!(
                "Row {} has {} cells for {} columns; extra cells ignored",
                line + 1,
                row.len(),
                header.len()
            );
        }

        let mut record = Record::new();
        for (column, value) in header.iter().zip(row.iter()) {
            if !record.contains(column) {
                record.set(column.as_str(), value);
            }
        }
        records.push(record);
    }

    Ok(Table::with_header(header, records))
}

/// Renders the header then every row padded to the full header width.
pub fn write_table(table: &Table) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(table.header())?;
    for row in table.padded_rows() {
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_quoted_fields() {
        let data = b"Business Name,Notes\n\"Smith, Jones & Co\",\"He said \"\"hi\"\"\"\nCafe,\n";
        let table = read_table(data).unwrap();

        assert_eq!(table.header(), &["Business Name", "Notes"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Business Name"), "Smith, Jones & Co");
        assert_eq!(table.value(0, "Notes"), "He said \"hi\"");
        assert_eq!(table.records()[1].get("Notes"), Some(""));
    }

    #[test]
    fn test_short_rows_lack_cells() {
        let data = b"id,Business Name\n1\n2,Cafe\n";
        let table = read_table(data).unwrap();

        assert_eq!(table.records()[0].get("Business Name"), None);
        assert_eq!(table.value(1, "Business Name"), "Cafe");
    }

    #[test]
    fn test_header_only_input() {
        let table = read_table(b"Business Name,city\n").unwrap();
        assert!(table.is_empty());
        assert!(table.has_column("city"));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            read_table(b"").unwrap_err(),
            EtlError::ProcessingError { .. }
        ));
    }

    #[test]
    fn test_write_pads_ragged_records() {
        let table = Table::new(vec![
            Record::new().with("Business Name", "A").with("photos_0", "u"),
            Record::new().with("Business Name", "B, Inc"),
        ]);

        let out = String::from_utf8(write_table(&table).unwrap()).unwrap();
        assert_eq!(out, "Business Name,photos_0\nA,u\n\"B, Inc\",\n");
    }

    #[test]
    fn test_written_table_reads_back() {
        let table = Table::new(vec![
            Record::new().with("Business Name", "A").with("rating", "4.5"),
        ]);
        let again = read_table(&write_table(&table).unwrap()).unwrap();
        assert_eq!(again, table);
    }
}

//! Fixed-width column layout for variable-length photo lists.
//!
//! The number of `photos_*` columns is a property of the whole batch, so
//! flattening only runs once every lookup has completed.

use crate::domain::model::{PlaceResult, Record, Table};
use crate::utils::error::{EtlError, Result};

pub const REVIEW_COUNT_COLUMN: &str = "review count";
pub const RATING_COLUMN: &str = "rating";
pub const PHOTO_COLUMN_PREFIX: &str = "photos_";
pub const ATTRIBUTIONS_COLUMN: &str = "image_attributions";
pub const ATTRIBUTION_SEPARATOR: &str = " | ";

pub fn photo_column(index: usize) -> String {
    format!("{}{}", PHOTO_COLUMN_PREFIX, index)
}

/// Largest photo list in the batch; 0 for an empty batch.
pub fn max_photos(results: &[PlaceResult]) -> usize {
    results.iter().map(|r| r.photos.len()).max().unwrap_or(0)
}

/// The enrichment columns appended after the input columns.
pub fn enrichment_columns(max_photos: usize) -> Vec<String> {
    let mut columns = Vec::with_capacity(max_photos + 3);
    columns.push(REVIEW_COUNT_COLUMN.to_string());
    columns.push(RATING_COLUMN.to_string());
    columns.extend((0..max_photos).map(photo_column));
    columns.push(ATTRIBUTIONS_COLUMN.to_string());
    columns
}

pub fn join_attributions(result: &PlaceResult) -> String {
    result
        .photos
        .iter()
        .map(|photo| photo.attribution.as_str())
        .filter(|attribution| !attribution.is_empty())
        .collect::<Vec<_>>()
        .join(ATTRIBUTION_SEPARATOR)
}

fn enrich_record(mut record: Record, result: &PlaceResult, max_photos: usize) -> Record {
    record.set(
        REVIEW_COUNT_COLUMN,
        result.review_count.map(|c| c.to_string()).unwrap_or_default(),
    );
    record.set(
        RATING_COLUMN,
        result.rating.as_ref().map(|r| r.to_string()).unwrap_or_default(),
    );
    for index in 0..max_photos {
        let url = result
            .photos
            .get(index)
            .map(|photo| photo.url.clone())
            .unwrap_or_default();
        record.set(photo_column(index), url);
    }
    record.set(ATTRIBUTIONS_COLUMN, join_attributions(result));
    record
}

/// Derives the enriched table from `input` and the positionally aligned
/// lookup `results`.
pub fn flatten(input: Table, results: &[PlaceResult]) -> Result<Table> {
    if input.len() != results.len() {
        return Err(EtlError::ProcessingError {
            message: format!(
                "{} lookup results for {} records",
                results.len(),
                input.len()
            ),
        });
    }

    let max_photos = max_photos(results);
    tracing::debug!("Flattening {} records into {} photo columns", input.len(), max_photos);

    let mut header = input.header().to_vec();
    header.extend(enrichment_columns(max_photos));

    let records = input
        .into_records()
        .into_iter()
        .zip(results)
        .map(|(record, result)| enrich_record(record, result, max_photos))
        .collect();

    Ok(Table::with_header(header, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Photo;

    fn photos(n: usize, tag: &str) -> Vec<Photo> {
        (0..n)
            .map(|i| Photo {
                url: format!("https://img/{}/{}", tag, i),
                attribution: format!("{} author {}", tag, i),
            })
            .collect()
    }

    fn names(names: &[&str]) -> Table {
        Table::new(
            names
                .iter()
                .map(|n| Record::new().with("Business Name", *n))
                .collect(),
        )
    }

    #[test]
    fn test_two_photos_produce_two_columns() {
        let results = vec![PlaceResult {
            review_count: Some(12),
            rating: serde_json::Number::from_f64(4.5),
            photos: photos(2, "A"),
        }];

        let table = flatten(names(&["A"]), &results).unwrap();

        assert_eq!(
            table.header(),
            &[
                "Business Name",
                "review count",
                "rating",
                "photos_0",
                "photos_1",
                "image_attributions"
            ]
        );
        assert_eq!(table.value(0, "review count"), "12");
        assert_eq!(table.value(0, "rating"), "4.5");
        assert_eq!(table.value(0, "photos_1"), "https://img/A/1");
        assert_eq!(
            table.value(0, "image_attributions"),
            "A author 0 | A author 1"
        );
        assert!(!table.has_column("photos_2"));
    }

    #[test]
    fn test_width_is_batch_maximum_and_short_rows_are_blank() {
        let results = vec![
            PlaceResult {
                photos: photos(3, "A"),
                ..Default::default()
            },
            PlaceResult::default(),
        ];

        let table = flatten(names(&["A", "B"]), &results).unwrap();

        assert!(table.has_column("photos_2"));
        assert!(!table.has_column("photos_3"));
        for column in ["photos_0", "photos_1", "photos_2", "image_attributions", "rating"] {
            assert_eq!(table.value(1, column), "", "column {}", column);
        }
        assert!(table.records()[1].contains("photos_2"));
    }

    #[test]
    fn test_no_photos_means_no_photo_columns() {
        let results = vec![PlaceResult::default(), PlaceResult::default()];
        let table = flatten(names(&["A", "B"]), &results).unwrap();

        assert!(!table.has_column("photos_0"));
        assert!(table.has_column("image_attributions"));
        assert_eq!(max_photos(&[]), 0);
    }

    #[test]
    fn test_empty_batch_keeps_header() {
        let input = Table::with_header(vec!["Business Name".to_string()], vec![]);
        let table = flatten(input, &[]).unwrap();

        assert!(table.is_empty());
        assert_eq!(
            table.header(),
            &["Business Name", "review count", "rating", "image_attributions"]
        );
    }

    #[test]
    fn test_reflattening_is_idempotent() {
        let results = vec![
            PlaceResult {
                review_count: Some(3),
                rating: serde_json::Number::from_f64(4.0),
                photos: photos(1, "A"),
            },
            PlaceResult::default(),
        ];

        let once = flatten(names(&["A", "B"]), &results).unwrap();
        let twice = flatten(once.clone(), &results).unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.value(0, "rating"), "4.0");
    }

    #[test]
    fn test_rating_renders_as_received() {
        let results = vec![
            PlaceResult {
                rating: Some(serde_json::Number::from(5u64)),
                ..Default::default()
            },
            PlaceResult {
                rating: serde_json::from_str("4.0").unwrap(),
                ..Default::default()
            },
        ];

        let table = flatten(names(&["A", "B"]), &results).unwrap();

        assert_eq!(table.value(0, "rating"), "5");
        assert_eq!(table.value(1, "rating"), "4.0");
    }

    #[test]
    fn test_empty_attributions_are_not_joined() {
        let mut list = photos(3, "A");
        list[1].attribution.clear();
        let result = PlaceResult {
            photos: list,
            ..Default::default()
        };

        assert_eq!(join_attributions(&result), "A author 0 | A author 2");
    }

    #[test]
    fn test_misaligned_results_are_rejected() {
        let err = flatten(names(&["A", "B"]), &[PlaceResult::default()]).unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
    }
}

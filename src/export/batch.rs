// src/export/batch.rs

use anyhow::{Context, Result};
use arrow::{
    array::{
        ArrayRef, BooleanArray, Float64Array, ListBuilder, StringArray, StringBuilder,
        UInt64Array,
    },
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;

use crate::process::EnrichedProjectRecord;

fn string_list() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

/// Column layout of an exported enriched table. Map-valued fields are
/// carried as JSON text.
pub fn enriched_schema() -> Schema {
    Schema::new(vec![
        Field::new("organization", DataType::Utf8, false),
        Field::new("description", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("state", DataType::Utf8, true),
        Field::new("latitude", DataType::Float64, false),
        Field::new("longitude", DataType::Float64, false),
        Field::new("trees", DataType::UInt64, false),
        Field::new("annotated", DataType::Boolean, false),
        Field::new("usda_species", string_list(), false),
        Field::new("goals", string_list(), false),
        Field::new("all_species", string_list(), false),
        Field::new("cleaned_species", string_list(), false),
        Field::new("goal_categories", string_list(), false),
        Field::new("species_mentions", DataType::Utf8, false),
        Field::new("extra", DataType::Utf8, false),
    ])
}

fn list_column<F>(records: &[&EnrichedProjectRecord], field: F) -> ArrayRef
where
    F: Fn(&EnrichedProjectRecord) -> &[String],
{
    let mut builder = ListBuilder::new(StringBuilder::new());
    for r in records {
        for v in field(*r) {
            builder.values().append_value(v);
        }
        builder.append(true);
    }
    Arc::new(builder.finish())
}

/// Convert records into a single batch matching [`enriched_schema`].
pub fn to_record_batch(records: &[&EnrichedProjectRecord]) -> Result<RecordBatch> {
    let mentions = records
        .iter()
        .map(|r| serde_json::to_string(&r.species_mentions))
        .collect::<Result<Vec<_>, _>>()
        .context("encoding species mentions")?;
    let extra = records
        .iter()
        .map(|r| serde_json::to_string(&r.extra))
        .collect::<Result<Vec<_>, _>>()
        .context("encoding extra columns")?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.organization.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.description.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.city.as_str()),
        )),
        Arc::new(StringArray::from(
            records
                .iter()
                .map(|r| r.state.as_deref())
                .collect::<Vec<Option<&str>>>(),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.latitude),
        )),
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.longitude),
        )),
        Arc::new(UInt64Array::from_iter_values(records.iter().map(|r| r.trees))),
        Arc::new(BooleanArray::from(
            records.iter().map(|r| r.annotated).collect::<Vec<bool>>(),
        )),
        list_column(records, |r| r.usda_species.as_slice()),
        list_column(records, |r| r.goals.as_slice()),
        list_column(records, |r| r.all_species.as_slice()),
        list_column(records, |r| r.cleaned_species.as_slice()),
        list_column(records, |r| r.goal_categories.as_slice()),
        Arc::new(StringArray::from_iter_values(mentions)),
        Arc::new(StringArray::from_iter_values(extra)),
    ];

    RecordBatch::try_new(Arc::new(enriched_schema()), columns).context("assembling record batch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, ListArray};
    use std::collections::BTreeMap;

    fn record(org: &str, species: &[&str]) -> EnrichedProjectRecord {
        EnrichedProjectRecord {
            organization: org.into(),
            description: String::new(),
            city: "Gary".into(),
            state: Some("IN".into()),
            latitude: 41.6,
            longitude: -87.3,
            trees: 5,
            extra: BTreeMap::new(),
            species_mentions: serde_json::Map::new(),
            usda_species: vec![],
            goals: vec![],
            annotated: false,
            all_species: species.iter().map(|s| s.to_string()).collect(),
            cleaned_species: vec![],
            goal_categories: vec![],
        }
    }

    #[test]
    fn list_columns_keep_per_row_lengths() -> Result<()> {
        let a = record("A", &["Oak", "Maple"]);
        let b = record("B", &[]);
        let batch = to_record_batch(&[&a, &b])?;
        assert_eq!(batch.num_rows(), 2);

        let all = batch
            .column_by_name("all_species")
            .and_then(|c| c.as_any().downcast_ref::<ListArray>())
            .context("all_species is a list")?;
        assert_eq!(all.value_length(0), 2);
        assert_eq!(all.value_length(1), 0);
        assert!(!all.is_null(1));
        Ok(())
    }

    #[test]
    fn empty_input_builds_empty_batch() -> Result<()> {
        let batch = to_record_batch(&[])?;
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), enriched_schema().fields().len());
        Ok(())
    }
}

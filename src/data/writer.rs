use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field as ArrowField, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::error::LoadError;
use super::model::{Field, FieldKind, Record};

/// Write records as CSV with the source header.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Write records as a single-batch Parquet file, one flat column per field.
pub fn write_parquet(path: &Path, records: &[Record]) -> Result<(), LoadError> {
    let schema = Arc::new(Schema::new(
        Field::ALL
            .iter()
            .map(|f| ArrowField::new(f.name(), arrow_type(f.kind()), false))
            .collect::<Vec<_>>(),
    ));
    let columns: Vec<ArrayRef> = Field::ALL.iter().map(|&f| column(records, f)).collect();
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = std::fs::File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn arrow_type(kind: FieldKind) -> DataType {
    match kind {
        FieldKind::Text => DataType::Utf8,
        FieldKind::Integer => DataType::Int64,
        FieldKind::Float => DataType::Float64,
        FieldKind::Flag => DataType::Boolean,
    }
}

fn column(records: &[Record], field: Field) -> ArrayRef {
    let texts = |get: fn(&Record) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(get)))
    };
    let ints = |get: fn(&Record) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from_iter_values(records.iter().map(get)))
    };
    let floats = |get: fn(&Record) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(records.iter().map(get)))
    };
    let flags = |get: fn(&Record) -> bool| -> ArrayRef {
        Arc::new(records.iter().map(|r| Some(get(r))).collect::<BooleanArray>())
    };

    match field {
        Field::Platform => texts(|r| r.platform.as_str()),
        Field::InfluencerName => texts(|r| r.influencer_name.as_str()),
        Field::SafetyBucket => texts(|r| r.safety_bucket.as_str()),
        Field::WouldRehire => texts(|r| r.would_rehire.as_str()),
        Field::Week => ints(|r| r.week),
        Field::Impressions => ints(|r| r.impressions),
        Field::Clicks => ints(|r| r.clicks),
        Field::Conversions => ints(|r| r.conversions),
        Field::AdCredScore => floats(|r| r.adcred_score),
        Field::Roi => floats(|r| r.roi),
        Field::Revenue => floats(|r| r.revenue),
        Field::CartValueUsd => floats(|r| r.cart_value_usd),
        Field::SentimentScore => floats(|r| r.sentiment_score),
        Field::FakeFollowerPct => floats(|r| r.fake_follower_pct),
        Field::BrandSafetyRating => floats(|r| r.brand_safety_rating),
        Field::ContentMatchScore => floats(|r| r.content_match_score),
        Field::PostingFrequency => floats(|r| r.posting_frequency),
        Field::StoryViewRatePct => floats(|r| r.story_view_rate_pct),
        Field::Clicked => flags(|r| r.clicked),
        Field::VisitedLanding => flags(|r| r.visited_landing),
        Field::DownloadedOffer => flags(|r| r.downloaded_offer),
        Field::Purchased => flags(|r| r.purchased),
    }
}

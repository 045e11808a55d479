use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Field – every column of the source file
// ---------------------------------------------------------------------------

/// A column of the campaign table, as named in the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Platform,
    InfluencerName,
    Week,
    AdCredScore,
    Roi,
    Revenue,
    Impressions,
    Clicks,
    SafetyBucket,
    CartValueUsd,
    SentimentScore,
    FakeFollowerPct,
    BrandSafetyRating,
    ContentMatchScore,
    PostingFrequency,
    StoryViewRatePct,
    WouldRehire,
    Clicked,
    VisitedLanding,
    DownloadedOffer,
    Purchased,
    Conversions,
}

/// How a cell of a [`Field`] is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Flag,
}

impl Field {
    /// All fields in source-header order.
    pub const ALL: [Field; 22] = [
        Field::Platform,
        Field::InfluencerName,
        Field::Week,
        Field::AdCredScore,
        Field::Roi,
        Field::Revenue,
        Field::Impressions,
        Field::Clicks,
        Field::SafetyBucket,
        Field::CartValueUsd,
        Field::SentimentScore,
        Field::FakeFollowerPct,
        Field::BrandSafetyRating,
        Field::ContentMatchScore,
        Field::PostingFrequency,
        Field::StoryViewRatePct,
        Field::WouldRehire,
        Field::Clicked,
        Field::VisitedLanding,
        Field::DownloadedOffer,
        Field::Purchased,
        Field::Conversions,
    ];

    /// Header name in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Field::Platform => "Platform",
            Field::InfluencerName => "Influencer_Name",
            Field::Week => "Week",
            Field::AdCredScore => "AdCred_Score",
            Field::Roi => "ROI",
            Field::Revenue => "Revenue",
            Field::Impressions => "Impressions",
            Field::Clicks => "Clicks",
            Field::SafetyBucket => "Safety_Bucket",
            Field::CartValueUsd => "Cart_Value_USD",
            Field::SentimentScore => "Sentiment_Score",
            Field::FakeFollowerPct => "Fake_Follower_%",
            Field::BrandSafetyRating => "Brand_Safety_Rating",
            Field::ContentMatchScore => "Content_Match_Score",
            Field::PostingFrequency => "Posting_Frequency",
            Field::StoryViewRatePct => "Story_View_Rate_%",
            Field::WouldRehire => "Would_Rehire",
            Field::Clicked => "Clicked",
            Field::VisitedLanding => "Visited_Landing",
            Field::DownloadedOffer => "Downloaded_Offer",
            Field::Purchased => "Purchased",
            Field::Conversions => "Conversions",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Platform | Field::InfluencerName | Field::SafetyBucket | Field::WouldRehire => {
                FieldKind::Text
            }
            Field::Week | Field::Impressions | Field::Clicks | Field::Conversions => {
                FieldKind::Integer
            }
            Field::Clicked | Field::VisitedLanding | Field::DownloadedOffer | Field::Purchased => {
                FieldKind::Flag
            }
            _ => FieldKind::Float,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the campaign table
// ---------------------------------------------------------------------------

/// A single campaign record (one row of the source file).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Influencer_Name")]
    pub influencer_name: String,
    #[serde(rename = "Week")]
    pub week: i64,
    #[serde(rename = "AdCred_Score")]
    pub adcred_score: f64,
    #[serde(rename = "ROI")]
    pub roi: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Impressions")]
    pub impressions: i64,
    #[serde(rename = "Clicks")]
    pub clicks: i64,
    #[serde(rename = "Safety_Bucket")]
    pub safety_bucket: String,
    #[serde(rename = "Cart_Value_USD")]
    pub cart_value_usd: f64,
    #[serde(rename = "Sentiment_Score")]
    pub sentiment_score: f64,
    #[serde(rename = "Fake_Follower_%")]
    pub fake_follower_pct: f64,
    #[serde(rename = "Brand_Safety_Rating")]
    pub brand_safety_rating: f64,
    #[serde(rename = "Content_Match_Score")]
    pub content_match_score: f64,
    #[serde(rename = "Posting_Frequency")]
    pub posting_frequency: f64,
    #[serde(rename = "Story_View_Rate_%")]
    pub story_view_rate_pct: f64,
    #[serde(rename = "Would_Rehire")]
    pub would_rehire: String,
    #[serde(rename = "Clicked", serialize_with = "serialize_flag")]
    pub clicked: bool,
    #[serde(rename = "Visited_Landing", serialize_with = "serialize_flag")]
    pub visited_landing: bool,
    #[serde(rename = "Downloaded_Offer", serialize_with = "serialize_flag")]
    pub downloaded_offer: bool,
    #[serde(rename = "Purchased", serialize_with = "serialize_flag")]
    pub purchased: bool,
    #[serde(rename = "Conversions")]
    pub conversions: i64,
}

/// Indicators are written as 0/1 so the files match what pandas exports.
fn serialize_flag<S: serde::Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

// ---------------------------------------------------------------------------
// NumericColumn / GroupColumn – typed column access
// ---------------------------------------------------------------------------

/// Columns that can be read as `f64`. Indicators read as 0.0 / 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NumericColumn {
    Week,
    AdCredScore,
    Roi,
    Revenue,
    Impressions,
    Clicks,
    CartValueUsd,
    SentimentScore,
    FakeFollowerPct,
    BrandSafetyRating,
    ContentMatchScore,
    PostingFrequency,
    StoryViewRatePct,
    Clicked,
    VisitedLanding,
    DownloadedOffer,
    Purchased,
    Conversions,
}

impl NumericColumn {
    /// Every numeric column, in source order (the correlation matrix axes).
    pub const ALL: [NumericColumn; 18] = [
        NumericColumn::Week,
        NumericColumn::AdCredScore,
        NumericColumn::Roi,
        NumericColumn::Revenue,
        NumericColumn::Impressions,
        NumericColumn::Clicks,
        NumericColumn::CartValueUsd,
        NumericColumn::SentimentScore,
        NumericColumn::FakeFollowerPct,
        NumericColumn::BrandSafetyRating,
        NumericColumn::ContentMatchScore,
        NumericColumn::PostingFrequency,
        NumericColumn::StoryViewRatePct,
        NumericColumn::Clicked,
        NumericColumn::VisitedLanding,
        NumericColumn::DownloadedOffer,
        NumericColumn::Purchased,
        NumericColumn::Conversions,
    ];

    pub fn value(self, r: &Record) -> f64 {
        match self {
            NumericColumn::Week => r.week as f64,
            NumericColumn::AdCredScore => r.adcred_score,
            NumericColumn::Roi => r.roi,
            NumericColumn::Revenue => r.revenue,
            NumericColumn::Impressions => r.impressions as f64,
            NumericColumn::Clicks => r.clicks as f64,
            NumericColumn::CartValueUsd => r.cart_value_usd,
            NumericColumn::SentimentScore => r.sentiment_score,
            NumericColumn::FakeFollowerPct => r.fake_follower_pct,
            NumericColumn::BrandSafetyRating => r.brand_safety_rating,
            NumericColumn::ContentMatchScore => r.content_match_score,
            NumericColumn::PostingFrequency => r.posting_frequency,
            NumericColumn::StoryViewRatePct => r.story_view_rate_pct,
            NumericColumn::Clicked => f64::from(u8::from(r.clicked)),
            NumericColumn::VisitedLanding => f64::from(u8::from(r.visited_landing)),
            NumericColumn::DownloadedOffer => f64::from(u8::from(r.downloaded_offer)),
            NumericColumn::Purchased => f64::from(u8::from(r.purchased)),
            NumericColumn::Conversions => r.conversions as f64,
        }
    }

    pub fn field(self) -> Field {
        match self {
            NumericColumn::Week => Field::Week,
            NumericColumn::AdCredScore => Field::AdCredScore,
            NumericColumn::Roi => Field::Roi,
            NumericColumn::Revenue => Field::Revenue,
            NumericColumn::Impressions => Field::Impressions,
            NumericColumn::Clicks => Field::Clicks,
            NumericColumn::CartValueUsd => Field::CartValueUsd,
            NumericColumn::SentimentScore => Field::SentimentScore,
            NumericColumn::FakeFollowerPct => Field::FakeFollowerPct,
            NumericColumn::BrandSafetyRating => Field::BrandSafetyRating,
            NumericColumn::ContentMatchScore => Field::ContentMatchScore,
            NumericColumn::PostingFrequency => Field::PostingFrequency,
            NumericColumn::StoryViewRatePct => Field::StoryViewRatePct,
            NumericColumn::Clicked => Field::Clicked,
            NumericColumn::VisitedLanding => Field::VisitedLanding,
            NumericColumn::DownloadedOffer => Field::DownloadedOffer,
            NumericColumn::Purchased => Field::Purchased,
            NumericColumn::Conversions => Field::Conversions,
        }
    }

    pub fn label(self) -> &'static str {
        self.field().name()
    }
}

/// Columns that rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GroupColumn {
    Platform,
    InfluencerName,
    SafetyBucket,
    WouldRehire,
    Week,
}

impl GroupColumn {
    pub fn key(self, r: &Record) -> GroupKey {
        match self {
            GroupColumn::Platform => GroupKey::Text(r.platform.clone()),
            GroupColumn::InfluencerName => GroupKey::Text(r.influencer_name.clone()),
            GroupColumn::SafetyBucket => GroupKey::Text(r.safety_bucket.clone()),
            GroupColumn::WouldRehire => GroupKey::Text(r.would_rehire.clone()),
            GroupColumn::Week => GroupKey::Int(r.week),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupColumn::Platform => Field::Platform.name(),
            GroupColumn::InfluencerName => Field::InfluencerName.name(),
            GroupColumn::SafetyBucket => Field::SafetyBucket.name(),
            GroupColumn::WouldRehire => Field::WouldRehire.name(),
            GroupColumn::Week => Field::Week.name(),
        }
    }
}

// ---------------------------------------------------------------------------
// GroupKey – a grouping value
// ---------------------------------------------------------------------------

/// The value rows are grouped on. Integers sort numerically and before text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Int(i64),
    Text(String),
}

impl GroupKey {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            GroupKey::Int(i) => Some(*i),
            GroupKey::Text(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(i) => write!(f, "{i}"),
            GroupKey::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(i: i64) -> Self {
        GroupKey::Int(i)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with catalogues for the filter widgets.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
    platforms: Vec<String>,
    influencers: Vec<String>,
    week_bounds: Option<(i64, i64)>,
    adcred_bounds: Option<(f64, f64)>,
}

impl Table {
    /// Build catalogues from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut platforms: Vec<String> = Vec::new();
        let mut influencers: Vec<String> = Vec::new();
        let mut week_bounds: Option<(i64, i64)> = None;
        let mut adcred_bounds: Option<(f64, f64)> = None;

        for r in &records {
            if !platforms.contains(&r.platform) {
                platforms.push(r.platform.clone());
            }
            if !influencers.contains(&r.influencer_name) {
                influencers.push(r.influencer_name.clone());
            }
            week_bounds = Some(match week_bounds {
                Some((lo, hi)) => (lo.min(r.week), hi.max(r.week)),
                None => (r.week, r.week),
            });
            adcred_bounds = Some(match adcred_bounds {
                Some((lo, hi)) => (lo.min(r.adcred_score), hi.max(r.adcred_score)),
                None => (r.adcred_score, r.adcred_score),
            });
        }

        Table {
            records,
            platforms,
            influencers,
            week_bounds,
            adcred_bounds,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distinct platforms, first-seen order.
    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    /// Distinct influencer names, first-seen order.
    pub fn influencers(&self) -> &[String] {
        &self.influencers
    }

    /// Observed `(min, max)` week, `None` for an empty table.
    pub fn week_bounds(&self) -> Option<(i64, i64)> {
        self.week_bounds
    }

    /// Observed `(min, max)` AdCred score, `None` for an empty table.
    pub fn adcred_bounds(&self) -> Option<(f64, f64)> {
        self.adcred_bounds
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(platform: &str, influencer: &str, week: i64, adcred: f64) -> Record {
        Record {
            platform: platform.into(),
            influencer_name: influencer.into(),
            week,
            adcred_score: adcred,
            ..Default::default()
        }
    }

    #[test]
    fn catalogues_keep_first_seen_order() {
        let table = Table::from_records(vec![
            rec("TikTok", "b", 4, 7.5),
            rec("IG", "a", 2, 3.0),
            rec("TikTok", "a", 9, 8.0),
        ]);
        assert_eq!(table.platforms(), ["TikTok", "IG"]);
        assert_eq!(table.influencers(), ["b", "a"]);
        assert_eq!(table.week_bounds(), Some((2, 9)));
        assert_eq!(table.adcred_bounds(), Some((3.0, 8.0)));
    }

    #[test]
    fn empty_table_has_no_bounds() {
        let table = Table::from_records(Vec::new());
        assert!(table.is_empty());
        assert_eq!(table.week_bounds(), None);
        assert_eq!(table.adcred_bounds(), None);
    }

    #[test]
    fn group_keys_order_weeks_numerically() {
        let mut keys = vec![GroupKey::Int(10), GroupKey::Int(2), GroupKey::Int(-1)];
        keys.sort();
        assert_eq!(keys, vec![GroupKey::Int(-1), GroupKey::Int(2), GroupKey::Int(10)]);
    }

    #[test]
    fn indicators_read_as_zero_or_one() {
        let r = Record {
            clicked: true,
            ..Default::default()
        };
        assert_eq!(NumericColumn::Clicked.value(&r), 1.0);
        assert_eq!(NumericColumn::Purchased.value(&r), 0.0);
    }

    #[test]
    fn every_numeric_column_maps_to_a_numeric_field() {
        for col in NumericColumn::ALL {
            assert_ne!(col.field().kind(), FieldKind::Text, "{}", col.label());
        }
    }
}

//! Influencer campaign ROI dashboard: the data pipeline behind the charts.

pub mod data;

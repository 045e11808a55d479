use std::path::PathBuf;

use clap::Parser;

use influencer_dashboard::data::{
    Bounds, FilterSpec, InvalidRowPolicy, LoadOptions, Table, ViewSettings,
};

/// Command-line configuration. Filter overrides only apply to `--export`;
/// the window starts with everything selected.
#[derive(Debug, Parser)]
#[command(name = "influencer-dashboard")]
#[command(about = "Influencer campaign ROI dashboard")]
#[command(version)]
pub struct Args {
    /// Campaign file (.csv, .tsv, .json or .parquet)
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Field delimiter for delimited text ("tab" or "\t" for tabs)
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// What to do with rows that do not parse
    #[arg(long, value_enum, default_value_t = InvalidRowPolicy::Reject)]
    pub on_invalid_row: InvalidRowPolicy,

    /// Histogram bin count
    #[arg(long, default_value_t = 20, value_parser = parse_positive)]
    pub bins: usize,

    /// Number of influencers in the top-N chart
    #[arg(long, default_value_t = 10, value_parser = parse_positive)]
    pub top_n: usize,

    /// Write every chart dataset as JSON to PATH and exit
    #[arg(long, value_name = "PATH", requires = "data")]
    pub export: Option<PathBuf>,

    /// Keep only this platform (repeatable)
    #[arg(long = "platform", value_name = "NAME")]
    pub platforms: Vec<String>,

    /// Keep only this influencer (repeatable)
    #[arg(long = "influencer", value_name = "NAME")]
    pub influencers: Vec<String>,

    /// Inclusive week range
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub weeks: Option<Vec<i64>>,

    /// Inclusive AdCred score range
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub adcred: Option<Vec<f64>>,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
        },
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive integer, got '{s}'")),
    }
}

impl Args {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
            invalid_rows: self.on_invalid_row,
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            bins: self.bins,
            top_n: self.top_n,
        }
    }

    /// Everything selected, narrowed by whichever overrides were given.
    pub fn filter_spec(&self, table: &Table) -> FilterSpec {
        let mut spec = FilterSpec::select_all(table);
        if !self.platforms.is_empty() {
            spec.platforms = self.platforms.iter().cloned().collect();
        }
        if !self.influencers.is_empty() {
            spec.influencers = self.influencers.iter().cloned().collect();
        }
        if let Some([lo, hi]) = self.weeks.as_deref() {
            spec.weeks = Bounds::new(*lo, *hi);
        }
        if let Some([lo, hi]) = self.adcred.as_deref() {
            spec.adcred = Bounds::new(*lo, *hi);
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influencer_dashboard::data::Record;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("influencer-dashboard").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.delimiter, b',');
        assert_eq!(args.on_invalid_row, InvalidRowPolicy::Reject);
        assert_eq!(args.view_settings(), ViewSettings::default());
        assert!(args.data.is_none() && args.export.is_none());
    }

    #[test]
    fn export_requires_data() {
        let err = Args::try_parse_from(["influencer-dashboard", "--export", "out.json"]);
        assert!(err.is_err());
    }

    #[test]
    fn parses_loader_flags() {
        let args = parse(&["--data", "roi.txt", "--delimiter", "tab", "--on-invalid-row", "skip"]);
        let options = args.load_options();
        assert_eq!(options.delimiter, b'\t');
        assert_eq!(options.invalid_rows, InvalidRowPolicy::Skip);
    }

    #[test]
    fn rejects_zero_bins() {
        assert!(Args::try_parse_from(["influencer-dashboard", "--bins", "0"]).is_err());
    }

    #[test]
    fn overrides_narrow_the_default_filter() {
        let table = Table::from_records(vec![
            Record {
                platform: "IG".into(),
                influencer_name: "Ava".into(),
                week: 1,
                adcred_score: 2.0,
                ..Default::default()
            },
            Record {
                platform: "TikTok".into(),
                influencer_name: "Ben".into(),
                week: 8,
                adcred_score: 9.0,
                ..Default::default()
            },
        ]);
        let args = parse(&["--platform", "IG", "--weeks", "5", "-2", "--adcred", "1", "3.5"]);
        let spec = args.filter_spec(&table);
        assert_eq!(spec.platforms.len(), 1);
        assert_eq!(spec.influencers.len(), 2);
        assert_eq!((spec.weeks.min(), spec.weeks.max()), (-2, 5));
        assert_eq!((spec.adcred.min(), spec.adcred.max()), (1.0, 3.5));
    }
}

//! Writes a deterministic synthetic campaign dataset for trying the dashboard.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use influencer_dashboard::data::Record;
use influencer_dashboard::data::writer::{write_csv, write_parquet};

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic influencer campaign dataset")]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV.
    #[arg(default_value = "Influencer Roi.csv")]
    out: PathBuf,

    /// Number of weeks to simulate.
    #[arg(long, default_value_t = 12)]
    weeks: i64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const PLATFORMS: [&str; 4] = ["Instagram", "TikTok", "YouTube", "Twitter"];

const FIRST_NAMES: [&str; 25] = [
    "Ava", "Ben", "Chloe", "Dev", "Elena", "Finn", "Grace", "Hugo", "Isla", "Jamal", "Kira",
    "Leo", "Maya", "Nico", "Omar", "Priya", "Quinn", "Rosa", "Sam", "Tara", "Umar", "Vera",
    "Wes", "Xena", "Yuki",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Stable per-influencer traits; weekly rows vary around them.
struct Profile {
    name: String,
    platform: &'static str,
    adcred: f64,
    fake_followers: f64,
    content_match: f64,
    posting_frequency: f64,
}

fn profiles(rng: &mut SimpleRng) -> Vec<Profile> {
    FIRST_NAMES
        .iter()
        .enumerate()
        .map(|(i, first)| Profile {
            name: format!("{first}_{:02}", i + 1),
            platform: PLATFORMS[i % PLATFORMS.len()],
            adcred: rng.uniform(20.0, 95.0),
            fake_followers: rng.uniform(1.0, 35.0),
            content_match: rng.uniform(0.3, 1.0),
            posting_frequency: rng.uniform(1.0, 14.0),
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn campaign_week(rng: &mut SimpleRng, p: &Profile, week: i64) -> Record {
    let adcred = (p.adcred + rng.gauss(0.0, 4.0)).clamp(0.0, 100.0);
    let sentiment = (adcred / 100.0 - 0.3 + rng.gauss(0.0, 0.2)).clamp(-1.0, 1.0);
    let brand_safety = (10.0 - p.fake_followers / 5.0 + rng.gauss(0.0, 0.8)).clamp(1.0, 10.0);

    let impressions = (rng.uniform(5_000.0, 200_000.0) * (1.0 + adcred / 100.0)) as i64;
    let ctr = (0.005 + p.content_match * 0.03 + rng.gauss(0.0, 0.004)).max(0.001);
    let clicks = (impressions as f64 * ctr) as i64;
    let conversions = (clicks as f64 * rng.uniform(0.01, 0.08) * p.content_match) as i64;
    let cart_value = rng.uniform(20.0, 180.0);
    let revenue = conversions as f64 * cart_value;
    let spend = rng.uniform(500.0, 5_000.0);
    let roi = (revenue - spend) / spend;

    // Each funnel stage implies the previous one.
    let clicked = rng.chance(0.4 + p.content_match * 0.4);
    let visited_landing = clicked && rng.chance(0.7);
    let downloaded_offer = visited_landing && rng.chance(0.5);
    let purchased = downloaded_offer && rng.chance(0.2 + adcred / 200.0);

    let safety_bucket = match p.fake_followers {
        f if f < 10.0 => "Low",
        f if f < 22.0 => "Medium",
        _ => "High",
    };
    let would_rehire = if roi > 0.0 && rng.chance(0.8) { "Yes" } else { "No" };

    Record {
        platform: p.platform.to_string(),
        influencer_name: p.name.clone(),
        week,
        adcred_score: round2(adcred),
        roi: round2(roi),
        revenue: round2(revenue),
        impressions,
        clicks,
        safety_bucket: safety_bucket.to_string(),
        cart_value_usd: round2(cart_value),
        sentiment_score: round2(sentiment),
        fake_follower_pct: round2(p.fake_followers + rng.gauss(0.0, 1.0)).max(0.0),
        brand_safety_rating: round2(brand_safety),
        content_match_score: round2(p.content_match),
        posting_frequency: round2(p.posting_frequency + rng.gauss(0.0, 1.0)).max(0.0),
        story_view_rate_pct: round2(rng.uniform(5.0, 60.0)),
        would_rehire: would_rehire.to_string(),
        clicked,
        visited_landing,
        downloaded_offer,
        purchased,
        conversions,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let profiles = profiles(&mut rng);
    let records: Vec<Record> = (1..=args.weeks)
        .flat_map(|week| profiles.iter().map(move |p| (week, p)))
        .map(|(week, p)| campaign_week(&mut rng, p, week))
        .collect();

    let is_parquet = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&args.out, &records)
    } else {
        write_csv(&args.out, &records)
    }
    .with_context(|| format!("writing {}", args.out.display()))?;

    log::info!("Wrote {} records to {}", records.len(), args.out.display());
    Ok(())
}

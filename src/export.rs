use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use influencer_dashboard::data::{DashboardViews, render, shared_table};

use crate::config::Args;

/// Headless mode: load, render once for the command-line filter, write JSON.
pub fn run(args: &Args, out: &Path) -> Result<()> {
    let data = args.data.as_deref().context("--export needs --data")?;
    let table = shared_table()
        .get_or_load(data, &args.load_options())
        .with_context(|| format!("loading {}", data.display()))?;

    let spec = args.filter_spec(&table);
    let views = render(&table, &spec, &args.view_settings());
    write_json(out, &views)?;

    log::info!(
        "Wrote {} chart datasets ({} of {} records) to {}",
        views.views.len(),
        views.rows,
        table.len(),
        out.display()
    );
    Ok(())
}

fn write_json(out: &Path, views: &DashboardViews) -> Result<()> {
    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, views).context("serializing chart datasets")?;
    writer.flush().context("flushing export")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use influencer_dashboard::data::{FilterSpec, Record, Table, ViewSettings};

    #[test]
    fn writes_every_view() {
        let temp = tempfile::tempdir().unwrap();
        let out = temp.path().join("views.json");
        let table = Table::from_records(vec![Record {
            platform: "IG".into(),
            influencer_name: "Ava".into(),
            ..Default::default()
        }]);
        let views = render(&table, &FilterSpec::select_all(&table), &ViewSettings::default());

        write_json(&out, &views).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["rows"], 1);
        assert_eq!(json["views"].as_object().unwrap().len(), 20);
        assert_eq!(json["views"]["PlatformShare"]["rows"][0]["key"], "IG");
    }

    #[test]
    fn export_without_data_fails() {
        let args = Args::parse_from(["influencer-dashboard"]);
        assert!(run(&args, Path::new("unused.json")).is_err());
    }
}

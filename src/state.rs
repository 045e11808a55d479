use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use influencer_dashboard::data::{
    Bounds, DashboardViews, FilterSpec, LoadOptions, Tab, Table, ViewSettings, render,
    shared_table,
};

use crate::color::CategoryColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which multi-select list a filter action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Platforms,
    Influencers,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until a file is loaded).
    pub table: Option<Arc<Table>>,

    /// Current sidebar selection.
    pub filter: Option<FilterSpec>,

    /// Chart datasets for `rendered_for`.
    pub views: Option<DashboardViews>,

    /// The selection `views` was computed from.
    rendered_for: Option<FilterSpec>,

    pub settings: ViewSettings,
    pub load_options: LoadOptions,

    /// Visible tab.
    pub tab: Tab,

    /// One colour per platform, shared by every chart.
    pub platform_colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(settings: ViewSettings, load_options: LoadOptions) -> Self {
        Self {
            table: None,
            filter: None,
            views: None,
            rendered_for: None,
            settings,
            load_options,
            tab: Tab::default(),
            platform_colors: CategoryColors::default(),
            status_message: None,
        }
    }

    /// Ingest the loaded table, select everything and compute the charts.
    pub fn set_table(&mut self, table: Arc<Table>) {
        self.platform_colors = CategoryColors::new(table.platforms());
        self.filter = Some(FilterSpec::select_all(&table));
        self.table = Some(table);
        self.status_message = None;
        self.refresh();
    }

    /// Load `path` into the process-wide table and adopt it.
    pub fn open_file(&mut self, path: &Path) {
        match shared_table().get_or_load(path, &self.load_options) {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the charts if the selection changed since the last render.
    pub fn refresh(&mut self) {
        let (Some(table), Some(filter)) = (&self.table, &self.filter) else {
            return;
        };
        if self.rendered_for.as_ref() == Some(filter) {
            return;
        }
        self.views = Some(render(table, filter, &self.settings));
        self.rendered_for = Some(filter.clone());
    }

    /// Rows passing the current filter.
    pub fn visible_rows(&self) -> usize {
        self.views.as_ref().map_or(0, |v| v.rows)
    }

    fn selection_mut(&mut self, which: Selection) -> Option<&mut BTreeSet<String>> {
        let filter = self.filter.as_mut()?;
        Some(match which {
            Selection::Platforms => &mut filter.platforms,
            Selection::Influencers => &mut filter.influencers,
        })
    }

    /// Toggle a single value in a multi-select.
    pub fn toggle(&mut self, which: Selection, value: &str) {
        if let Some(selected) = self.selection_mut(which) {
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
        }
    }

    /// Select every value of a multi-select.
    pub fn select_all(&mut self, which: Selection) {
        let Some(table) = self.table.clone() else {
            return;
        };
        let all = match which {
            Selection::Platforms => table.platforms(),
            Selection::Influencers => table.influencers(),
        };
        if let Some(selected) = self.selection_mut(which) {
            *selected = all.iter().cloned().collect();
        }
    }

    /// Deselect every value of a multi-select.
    pub fn select_none(&mut self, which: Selection) {
        if let Some(selected) = self.selection_mut(which) {
            selected.clear();
        }
    }

    pub fn set_weeks(&mut self, lo: i64, hi: i64) {
        if let Some(filter) = self.filter.as_mut() {
            filter.weeks = Bounds::new(lo, hi);
        }
    }

    pub fn set_adcred(&mut self, lo: f64, hi: f64) {
        if let Some(filter) = self.filter.as_mut() {
            filter.adcred = Bounds::new(lo, hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influencer_dashboard::data::Record;

    fn state() -> AppState {
        let table = Table::from_records(vec![
            Record {
                platform: "IG".into(),
                influencer_name: "Ava".into(),
                week: 1,
                adcred_score: 5.0,
                ..Default::default()
            },
            Record {
                platform: "TikTok".into(),
                influencer_name: "Ben".into(),
                week: 2,
                adcred_score: 7.0,
                ..Default::default()
            },
        ]);
        let mut state = AppState::new(ViewSettings::default(), LoadOptions::default());
        state.set_table(Arc::new(table));
        state
    }

    #[test]
    fn starts_with_everything_visible() {
        let state = state();
        assert_eq!(state.visible_rows(), 2);
        assert!(state.views.is_some());
    }

    #[test]
    fn toggling_a_platform_refilters() {
        let mut state = state();
        state.toggle(Selection::Platforms, "IG");
        state.refresh();
        assert_eq!(state.visible_rows(), 1);
        state.toggle(Selection::Platforms, "IG");
        state.refresh();
        assert_eq!(state.visible_rows(), 2);
    }

    #[test]
    fn select_none_then_all() {
        let mut state = state();
        state.select_none(Selection::Influencers);
        state.refresh();
        assert_eq!(state.visible_rows(), 0);
        state.select_all(Selection::Influencers);
        state.refresh();
        assert_eq!(state.visible_rows(), 2);
    }

    #[test]
    fn ranges_narrow_the_view() {
        let mut state = state();
        state.set_weeks(2, 2);
        state.refresh();
        assert_eq!(state.visible_rows(), 1);
        state.set_adcred(9.0, 0.0);
        state.refresh();
        assert_eq!(state.visible_rows(), 1);
        state.set_adcred(6.0, 6.5);
        state.refresh();
        assert_eq!(state.visible_rows(), 0);
    }

    #[test]
    fn failed_open_reports_status() {
        let mut state = AppState::new(ViewSettings::default(), LoadOptions::default());
        state.open_file(Path::new("does-not-exist.xlsx"));
        assert!(state.status_message.is_some());
        assert!(state.table.is_none());
    }
}

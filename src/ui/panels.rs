use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use influencer_dashboard::data::Tab;

use crate::state::{AppState, Selection};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No dataset loaded.");
        return;
    };
    let Some(filter) = state.filter.clone() else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(
                ui,
                state,
                Selection::Platforms,
                "Platform",
                table.platforms(),
                &filter.platforms,
            );
            multi_select(
                ui,
                state,
                Selection::Influencers,
                "Influencer",
                table.influencers(),
                &filter.influencers,
            );
            ui.separator();

            // ---- Week range ----
            if let Some((week_min, week_max)) = table.week_bounds() {
                ui.strong("Week Range");
                let (mut lo, mut hi) = (filter.weeks.min(), filter.weeks.max());
                let lo_changed = ui
                    .add(egui::Slider::new(&mut lo, week_min..=week_max).text("from"))
                    .changed();
                let hi_changed = ui
                    .add(egui::Slider::new(&mut hi, week_min..=week_max).text("to"))
                    .changed();
                if lo_changed || hi_changed {
                    state.set_weeks(lo, hi);
                }
                ui.add_space(6.0);
            }

            // ---- AdCred range ----
            if let Some((adcred_min, adcred_max)) = table.adcred_bounds() {
                ui.strong("AdCred Score");
                let (mut lo, mut hi) = (filter.adcred.min(), filter.adcred.max());
                let lo_changed = ui
                    .add(egui::Slider::new(&mut lo, adcred_min..=adcred_max).text("from"))
                    .changed();
                let hi_changed = ui
                    .add(egui::Slider::new(&mut hi, adcred_min..=adcred_max).text("to"))
                    .changed();
                if lo_changed || hi_changed {
                    state.set_adcred(lo, hi);
                }
            }
        });

    // Recompute the charts after any widget changes.
    state.refresh();
}

/// Collapsible checkbox list with All / None buttons.
fn multi_select(
    ui: &mut Ui,
    state: &mut AppState,
    which: Selection,
    title: &str,
    options: &[String],
    selected: &BTreeSet<String>,
) {
    let header_text = format!("{title}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(which == Selection::Platforms)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(which);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(which);
                }
            });

            for value in options {
                let mut text = RichText::new(value);
                if which == Selection::Platforms {
                    text = text.color(state.platform_colors.color_for(value));
                }
                let mut checked = selected.contains(value);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle(which, value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            // The table is loaded once per process.
            let open = egui::Button::new("Open…");
            if ui.add_enabled(state.table.is_none(), open).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in [Tab::Macro, Tab::Micro] {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} visible",
                table.len(),
                state.visible_rows()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open campaign data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}

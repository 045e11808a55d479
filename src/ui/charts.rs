use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, Rect, ScrollArea, Sense, Ui, pos2, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use influencer_dashboard::data::{Tab, ViewId};
use influencer_dashboard::data::aggregate::{
    AggregateView, CorrelationMatrix, FunnelCounts, GroupedSamples, GroupedValues, Histogram,
    ScatterPoints, ShareTable,
};
use influencer_dashboard::data::model::GroupColumn;

use crate::color::{CategoryColors, correlation_color};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;
const ACCENT: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render every chart of the active tab.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(views) = &state.views else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(match state.tab {
                Tab::Macro => "Overview Metrics",
                Tab::Micro => "Detailed Insights",
            });

            for id in ViewId::ALL.iter().copied().filter(|id| id.tab() == state.tab) {
                let Some(view) = views.get(id) else {
                    continue;
                };
                ui.add_space(8.0);
                ui.strong(id.title());
                if view.is_empty() {
                    ui.weak("No data for the current filters.");
                    continue;
                }
                chart(ui, id, view, &state.platform_colors);
            }
        });
}

fn chart(ui: &mut Ui, id: ViewId, view: &AggregateView, colors: &CategoryColors) {
    match view {
        AggregateView::Histogram(h) => histogram(ui, id, h),
        AggregateView::Grouped(g) if g.key == GroupColumn::Week => weekly_line(ui, id, g),
        AggregateView::Grouped(g) => {
            grouped_bars(ui, id, g, colors);
            if id == ViewId::TopInfluencersByRoi {
                ranking_table(ui, g);
            }
        }
        AggregateView::Share(s) => share_bars(ui, id, s, colors),
        AggregateView::Scatter(s) => scatter(ui, id, s),
        AggregateView::Samples(s) => box_plot(ui, id, s, colors),
        AggregateView::Funnel(f) => funnel(ui, id, f),
        AggregateView::Correlation(m) => heatmap(ui, m),
    }
}

fn base_plot(id: ViewId) -> Plot<'static> {
    Plot::new(id.title())
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(true)
}

/// Plot whose x axis shows `labels[i]` at integer position `i`.
fn categorical_plot(id: ViewId, labels: Vec<String>) -> Plot<'static> {
    base_plot(id).x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    })
}

fn histogram(ui: &mut Ui, id: ViewId, h: &Histogram) {
    let width = h.bin_width().unwrap_or(1.0);
    let bars: Vec<Bar> = h
        .bars()
        .map(|(centre, count)| Bar::new(centre, count as f64).width(width))
        .collect();

    base_plot(id)
        .x_axis_label(h.column.label())
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

fn weekly_line(ui: &mut Ui, id: ViewId, g: &GroupedValues) {
    let points: Vec<[f64; 2]> = g
        .rows
        .iter()
        .filter_map(|r| Some([r.key.as_int()? as f64, r.value?]))
        .collect();

    base_plot(id)
        .x_axis_label(g.key.label())
        .y_axis_label(g.value.label())
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).color(ACCENT).width(2.0));
            plot_ui.points(Points::new(PlotPoints::from(points)).color(ACCENT).radius(3.5));
        });
}

fn grouped_bars(ui: &mut Ui, id: ViewId, g: &GroupedValues, colors: &CategoryColors) {
    let labels: Vec<String> = g.rows.iter().map(|r| r.key.to_string()).collect();
    let bars: Vec<Bar> = g
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, r)| {
            let mut bar = Bar::new(i as f64, r.value?).width(0.7).name(r.key.to_string());
            if g.key == GroupColumn::Platform {
                bar = bar.fill(colors.color_for(&r.key.to_string()));
            }
            Some(bar)
        })
        .collect();

    categorical_plot(id, labels)
        .x_axis_label(g.key.label())
        .y_axis_label(g.value.label())
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

fn ranking_table(ui: &mut Ui, g: &GroupedValues) {
    ui.push_id("ranking_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong(g.key.label());
                });
                header.col(|ui| {
                    ui.strong(format!("Avg {}", g.value.label()));
                });
                header.col(|ui| {
                    ui.strong("Campaigns");
                });
            })
            .body(|mut body| {
                for (rank, row) in g.rows.iter().enumerate() {
                    body.row(18.0, |mut r| {
                        r.col(|ui| {
                            ui.label((rank + 1).to_string());
                        });
                        r.col(|ui| {
                            ui.label(row.key.to_string());
                        });
                        r.col(|ui| {
                            ui.label(row.value.map_or("–".to_string(), |v| format!("{v:.3}")));
                        });
                        r.col(|ui| {
                            ui.label(row.count.to_string());
                        });
                    });
                }
            });
    });
}

/// Shares are drawn as bars with percentage labels; egui_plot has no pie.
fn share_bars(ui: &mut Ui, id: ViewId, s: &ShareTable, colors: &CategoryColors) {
    let labels: Vec<String> = s.rows.iter().map(|r| r.key.to_string()).collect();
    let own_colors;
    let colors = if s.column == GroupColumn::Platform {
        colors
    } else {
        own_colors = CategoryColors::new(&labels);
        &own_colors
    };
    let bars: Vec<Bar> = s
        .rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let key = r.key.to_string();
            let fill = colors.color_for(&key);
            Bar::new(i as f64, r.value(s.normalize))
                .width(0.7)
                .name(format!("{key} ({:.1}%)", r.proportion * 100.0))
                .fill(fill)
        })
        .collect();

    categorical_plot(id, labels)
        .x_axis_label(s.column.label())
        .y_axis_label(if s.normalize { "Proportion" } else { "Count" })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for r in &s.rows {
            ui.label(format!("{}: {:.1}%", r.key, r.proportion * 100.0));
        }
    });
}

fn scatter(ui: &mut Ui, id: ViewId, s: &ScatterPoints) {
    base_plot(id)
        .x_axis_label(s.x.label())
        .y_axis_label(s.y.label())
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(s.points.clone()))
                    .color(ACCENT)
                    .radius(2.0),
            );
        });
}

fn box_plot(ui: &mut Ui, id: ViewId, s: &GroupedSamples, colors: &CategoryColors) {
    let labels: Vec<String> = s.groups.iter().map(|g| g.key.to_string()).collect();

    categorical_plot(id, labels)
        .x_axis_label(s.key.label())
        .y_axis_label(s.value.label())
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (i, group) in s.groups.iter().enumerate() {
                let Some(summary) = &group.summary else {
                    continue;
                };
                let name = group.key.to_string();
                let color = colors.color_for(&name);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(
                        summary.lower_whisker,
                        summary.q1,
                        summary.median,
                        summary.q3,
                        summary.upper_whisker,
                    ),
                )
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(color.gamma_multiply(0.4))
                .stroke(egui::Stroke::new(1.5, color))
                .name(&name);
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&name).color(color));

                if !summary.outliers.is_empty() {
                    let outliers: Vec<[f64; 2]> =
                        summary.outliers.iter().map(|&v| [i as f64, v]).collect();
                    plot_ui.points(Points::new(PlotPoints::from(outliers)).color(color).radius(2.5));
                }
            }
        });
}

fn funnel(ui: &mut Ui, id: ViewId, f: &FunnelCounts) {
    let labels: Vec<String> = f.steps.iter().map(|s| s.stage.label().to_string()).collect();
    let bars: Vec<Bar> = f
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| Bar::new(i as f64, s.count as f64).width(0.7).name(s.stage.label()))
        .collect();

    categorical_plot(id, labels)
        .x_axis_label("Stage")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT));
        });
}

// ---------------------------------------------------------------------------
// Correlation heat-map
// ---------------------------------------------------------------------------

/// Painted grid: rows carry the column names, the header carries their indices.
fn heatmap(ui: &mut Ui, m: &CorrelationMatrix) {
    let n = m.columns.len();
    if n == 0 {
        return;
    }
    let label_width = 170.0;
    let header = 18.0;
    let cell = ((ui.available_width() - label_width) / n as f32).clamp(14.0, 48.0);
    let size = vec2(label_width + cell * n as f32, header + cell * n as f32);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let text_color = ui.visuals().text_color();
    let small = FontId::proportional(10.0);

    for (j, _) in m.columns.iter().enumerate() {
        painter.text(
            origin + vec2(label_width + cell * (j as f32 + 0.5), header / 2.0),
            Align2::CENTER_CENTER,
            (j + 1).to_string(),
            small.clone(),
            text_color,
        );
    }

    for (i, column) in m.columns.iter().enumerate() {
        let top = origin.y + header + cell * i as f32;
        painter.text(
            pos2(origin.x + label_width - 6.0, top + cell / 2.0),
            Align2::RIGHT_CENTER,
            format!("{} {}", i + 1, column.label()),
            small.clone(),
            text_color,
        );
        for j in 0..n {
            let value = m.get(i, j);
            let rect = Rect::from_min_size(
                pos2(origin.x + label_width + cell * j as f32, top),
                vec2(cell - 1.0, cell - 1.0),
            );
            painter.rect_filled(rect, 0.0, correlation_color(value));
            if cell >= 30.0 {
                if let Some(v) = value {
                    let ink = if v.abs() > 0.6 { Color32::WHITE } else { Color32::BLACK };
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{v:.2}"),
                        small.clone(),
                        ink,
                    );
                }
            }
        }
    }

    let hovered = response.hover_pos().and_then(|pos| {
        let x = pos.x - origin.x - label_width;
        let y = pos.y - origin.y - header;
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let (i, j) = ((y / cell) as usize, (x / cell) as usize);
        (i < n && j < n).then_some((i, j))
    });
    if let Some((i, j)) = hovered {
        let value = m
            .get(i, j)
            .map_or_else(|| "undefined".to_string(), |v| format!("{v:.3}"));
        response.on_hover_text(format!(
            "{} × {}: {value}",
            m.columns[i].label(),
            m.columns[j].label()
        ));
    }
}

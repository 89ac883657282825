use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
    Polygon,
};

use crate::color::diverging_color;
use crate::data::model::{BattingTable, NumericColumn, REQUIRED_COLUMNS, Record};
use crate::error::InsufficientDataError;
use crate::state::AppState;
use crate::stats::correlation::CorrelationTest;
use crate::stats::distribution::{Bin, BoxSummary, ViolinSummary};
use crate::stats::kpi::Kpis;
use crate::stats::recompute::{DerivedState, SCATTER_AXES};

const PLOT_HEIGHT: f32 = 260.0;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);
const DENSITY_COLOR: Color32 = Color32::from_rgb(76, 114, 176);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dashboard body: KPIs followed by every chart.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let (Some(table), Some(derived)) = (&state.table, &state.derived) else {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.heading(RichText::new(msg).color(Color32::RED));
            }
            None => {
                ui.heading("Open a batting summary to begin  (File → Open…)");
            }
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("IPL Batting Performance Dashboard");
            ui.label(RichText::new(format!("Showing {} records", derived.kpis.records)).strong());
            records_table(ui, table, derived);
            ui.add_space(8.0);

            kpi_row(ui, &derived.kpis);
            ui.separator();

            section(ui, "Top Six Hitters");
            top_sixers_chart(ui, &derived.top_sixers);

            if let Some((player, seasons)) = &derived.season_runs {
                section(ui, &format!("Season-wise Runs - {player}"));
                season_runs_chart(ui, seasons);
            }

            section(ui, "Density Plot - Strike Rate");
            density_chart(ui, "sr_density", NumericColumn::StrikeRate, &derived.strike_rate_density);

            section(ui, "Box Plot - Runs");
            box_chart(ui, derived.runs_box.as_ref());

            section(ui, "Violin Plot - Strike Rate");
            violin_chart(ui, derived.strike_rate_violin.as_ref());

            section(ui, "Bell Curve - Total Runs");
            bell_curve(
                ui,
                "runs_bell",
                NumericColumn::TotalRuns,
                &derived.runs_histogram,
                &derived.runs_density,
            );

            section(ui, "Bell Curve - Strike Rate Distribution");
            bell_curve(
                ui,
                "sr_bell",
                NumericColumn::StrikeRate,
                &derived.strike_rate_histogram,
                &derived.strike_rate_density,
            );

            section(ui, "Scatter Plot - Runs vs Balls");
            scatter_chart(ui, state, derived);

            section(ui, "Correlation Heatmap");
            heatmap(ui, derived);

            section(ui, "Correlation P-value");
            significance(ui, &derived.correlation);
        });
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
}

fn no_data(ui: &mut Ui) {
    ui.label(RichText::new("No data for the current filters.").italics());
}

// ---------------------------------------------------------------------------
// Records and KPIs
// ---------------------------------------------------------------------------

fn records_table(ui: &mut Ui, table: &BattingTable, derived: &DerivedState) {
    egui::CollapsingHeader::new("Browse records")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let rows: Vec<&Record> = derived.view(table).iter().collect();
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(240.0)
                .columns(Column::auto().at_least(70.0), REQUIRED_COLUMNS.len())
                .header(20.0, |mut header| {
                    for name in REQUIRED_COLUMNS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        for cell in record_cells(rows[row.index()]) {
                            row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
}

fn record_cells(rec: &Record) -> [String; 8] {
    fn opt<T: ToString>(v: Option<T>) -> String {
        v.map(|v| v.to_string()).unwrap_or_default()
    }
    [
        rec.season.to_string(),
        rec.batsman.clone(),
        rec.batting_team.clone(),
        opt(rec.total_runs),
        rec.strike_rate.map(|v| format!("{v:.2}")).unwrap_or_default(),
        opt(rec.fours),
        opt(rec.sixes),
        opt(rec.balls_faced),
    ]
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    let avg_sr = kpis
        .avg_strike_rate
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "No data".to_string());
    let metrics = [
        ("Total Runs", kpis.total_runs.to_string()),
        ("Average Strike Rate", avg_sr),
        ("Total Fours", kpis.total_fours.to_string()),
        ("Total Sixes", kpis.total_sixes.to_string()),
    ];

    ui.columns(metrics.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(metrics) {
            col.label(label);
            col.label(RichText::new(value).size(26.0).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Grouped charts
// ---------------------------------------------------------------------------

fn top_sixers_chart(ui: &mut Ui, top: &[(String, i64)]) {
    if top.is_empty() {
        no_data(ui);
        return;
    }

    // Largest at the top: the first entry sits at y = len.
    let n = top.len();
    let bars: Vec<Bar> = top
        .iter()
        .enumerate()
        .map(|(i, (name, sixes))| Bar::new((n - i) as f64, *sixes as f64).name(name).width(0.7))
        .collect();
    let names: Vec<String> = top.iter().map(|(name, _)| name.clone()).collect();

    Plot::new("top_sixers")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label("Total Sixes")
        .y_axis_label("Batsman")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 1.0 || pos > n as f64 {
                return String::new();
            }
            names[n - pos as usize].clone()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().color(BAR_COLOR).name("Sixes"));
        });
}

fn season_runs_chart(ui: &mut Ui, seasons: &[(i32, i64)]) {
    if seasons.is_empty() {
        no_data(ui);
        return;
    }
    let coords = season_points(seasons);

    Plot::new("season_runs")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(NumericColumn::Season.label())
        .y_axis_label(NumericColumn::TotalRuns.label())
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(coords.clone())).color(BAR_COLOR).width(2.0));
            plot_ui.points(Points::new(PlotPoints::from(coords)).color(BAR_COLOR).radius(4.0));
        });
}

/// `[season, runs]` plot coordinates, shared by the line and its markers.
fn season_points(seasons: &[(i32, i64)]) -> Vec<[f64; 2]> {
    seasons
        .iter()
        .map(|&(season, runs)| [season as f64, runs as f64])
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution charts
// ---------------------------------------------------------------------------

fn density_chart(ui: &mut Ui, id: &str, column: NumericColumn, curve: &[(f64, f64)]) {
    if curve.is_empty() {
        no_data(ui);
        return;
    }
    let points: PlotPoints = curve.iter().map(|&(x, d)| [x, d]).collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(column.label())
        .y_axis_label("Density")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(DENSITY_COLOR).fill(0.0).width(1.5));
        });
}

fn box_chart(ui: &mut Ui, summary: Option<&BoxSummary>) {
    let Some(summary) = summary else {
        no_data(ui);
        return;
    };

    Plot::new("runs_box")
        .height(PLOT_HEIGHT * 0.6)
        .allow_scroll(false)
        .show_y(false)
        .x_axis_label(NumericColumn::TotalRuns.label())
        .show(ui, |plot_ui| {
            plot_ui.box_plot(box_plot(summary, 0.0, 0.6, DENSITY_COLOR));
            if !summary.outliers.is_empty() {
                let outliers: PlotPoints = summary.outliers.iter().map(|&v| [v, 0.0]).collect();
                plot_ui.points(Points::new(outliers).color(DENSITY_COLOR).radius(3.0));
            }
        });
}

fn box_plot(summary: &BoxSummary, y: f64, width: f64, color: Color32) -> BoxPlot {
    let spread = BoxSpread::new(
        summary.lower_whisker,
        summary.q1,
        summary.median,
        summary.q3,
        summary.upper_whisker,
    );
    BoxPlot::new(vec![BoxElem::new(y, spread).box_width(width).whisker_width(width / 2.0)])
        .horizontal()
        .color(color)
}

fn violin_chart(ui: &mut Ui, violin: Option<&ViolinSummary>) {
    let Some(violin) = violin else {
        no_data(ui);
        return;
    };

    let max_density = violin
        .density
        .iter()
        .map(|&(_, d)| d)
        .fold(0.0_f64, f64::max);
    let scale = if max_density > 0.0 { 0.4 / max_density } else { 0.0 };

    let outline: PlotPoints = violin
        .density
        .iter()
        .map(|&(x, d)| [x, d * scale])
        .chain(violin.density.iter().rev().map(|&(x, d)| [x, -d * scale]))
        .collect();

    Plot::new("sr_violin")
        .height(PLOT_HEIGHT * 0.8)
        .allow_scroll(false)
        .show_y(false)
        .x_axis_label(NumericColumn::StrikeRate.label())
        .show(ui, |plot_ui| {
            if max_density > 0.0 {
                plot_ui.polygon(
                    Polygon::new(outline)
                        .fill_color(DENSITY_COLOR.gamma_multiply(0.4))
                        .stroke(Stroke::new(1.0, DENSITY_COLOR)),
                );
            }
            plot_ui.box_plot(box_plot(&violin.summary, 0.0, 0.08, Color32::DARK_GRAY));
        });
}

/// Histogram counts with the density curve rescaled onto the count axis.
fn bell_curve(ui: &mut Ui, id: &str, column: NumericColumn, bins: &[Bin], curve: &[(f64, f64)]) {
    if bins.is_empty() {
        no_data(ui);
        return;
    }

    let total: usize = bins.iter().map(|b| b.count).sum();
    let bin_width = bins[0].width();
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
        .collect();
    let scaled: PlotPoints = curve
        .iter()
        .map(|&(x, d)| [x, d * total as f64 * bin_width])
        .collect();

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .x_axis_label(column.label())
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(DENSITY_COLOR.gamma_multiply(0.6)));
            if !curve.is_empty() {
                plot_ui.line(Line::new(scaled).color(DENSITY_COLOR).width(2.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

fn scatter_chart(ui: &mut Ui, state: &AppState, derived: &DerivedState) {
    if derived.scatter.is_empty() {
        no_data(ui);
        return;
    }
    let (x, y) = SCATTER_AXES;

    Plot::new("runs_vs_balls")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .x_axis_label(x.label())
        .y_axis_label(y.label())
        .show(ui, |plot_ui| {
            for (team, points) in &derived.scatter {
                let color = state
                    .team_colors
                    .as_ref()
                    .map(|cm| cm.color_for(team))
                    .unwrap_or(DENSITY_COLOR);
                plot_ui.points(
                    Points::new(PlotPoints::from(points.clone()))
                        .name(team)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

fn heatmap(ui: &mut Ui, derived: &DerivedState) {
    let matrix = &derived.heatmap;

    egui::Grid::new("corr_heatmap")
        .spacing([6.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.strong(col.name());
            }
            ui.end_row();

            for (row_col, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.strong(row_col.name());
                for value in row {
                    let (text, fill) = match value {
                        Some(r) => (format!("{r:.2}"), diverging_color(*r)),
                        None => ("n/a".to_string(), Color32::from_gray(60)),
                    };
                    ui.label(
                        RichText::new(format!(" {text:>6} "))
                            .monospace()
                            .color(Color32::BLACK)
                            .background_color(fill),
                    );
                }
                ui.end_row();
            }
        });
}

fn significance(ui: &mut Ui, result: &Result<CorrelationTest, InsufficientDataError>) {
    match result {
        Ok(test) => {
            ui.label(RichText::new(format!("Pearson Correlation: {:.3}", test.r)).strong());
            ui.label(RichText::new(format!("P-value (approx): {:.10}", test.p_value)).strong());
            ui.label(format!("{} vs {}, n = {}", test.x.label(), test.y.label(), test.n));
            if test.is_significant {
                ui.label(
                    RichText::new("The correlation is statistically significant (p < 0.05).")
                        .color(Color32::from_rgb(40, 160, 70)),
                );
            } else {
                ui.label(
                    RichText::new("The correlation is NOT statistically significant.")
                        .color(Color32::from_rgb(220, 160, 30)),
                );
            }
        }
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::from_rgb(220, 160, 30)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_points_follow_input_order() {
        let points = season_points(&[(2019, 120), (2020, 0), (2021, 455)]);
        assert_eq!(points, vec![[2019.0, 120.0], [2020.0, 0.0], [2021.0, 455.0]]);
        assert!(season_points(&[]).is_empty());
    }
}

use std::ops::RangeInclusive;

use eframe::egui::{Color32, Context, Id, RichText, ScrollArea, Ui};
use egui_plot::{
    AxisHints, Corner, GridMark, HLine, HPlacement, Legend, Line, LineStyle, MarkerShape, Plot,
    PlotBounds, PlotPoint, PlotPoints, Points, Text,
};

use crate::data::model::TimeUnits;
use crate::figure::{PanelContent, RegionChart, RegionPanel, COUNT_AXIS_LABEL};
use crate::state::AppState;

const FORECAST_COLOR: Color32 = Color32::BLACK;
const ANALYSIS_COLOR: Color32 = Color32::RED;
const COUNT_COLOR: Color32 = Color32::BLUE;
const MARKER_RADIUS: f32 = 3.5;
const PANEL_SPACING: f32 = 36.0;

// ---------------------------------------------------------------------------
// Figure (central panel)
// ---------------------------------------------------------------------------

/// Render the stacked region panels of the current figure.
pub fn figure_view(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(figure)) = (&state.dataset, &state.figure) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a diagnostic file to plot  (File → Open…)");
        });
        return;
    };

    let time_units = dataset.time_units();
    let generation = state.figure_generation;
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&figure.title);
    });

    let n = figure.panels.len().max(1) as f32;
    let panel_height = ((ui.available_height() - PANEL_SPACING * n) / n).max(140.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for panel in &figure.panels {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(&panel.title).strong());
                });
                match &panel.content {
                    PanelContent::Placeholder { message } => {
                        placeholder_plot(ui, panel, message, generation, panel_height)
                    }
                    PanelContent::Chart(chart) => {
                        region_plot(ui, panel, chart, time_units, generation, panel_height)
                    }
                }
                ui.add_space(PANEL_SPACING / 2.0);
            }
        });
}

fn format_time(units: TimeUnits, value: f64) -> String {
    units
        .to_datetime(value)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// View tracking
// ---------------------------------------------------------------------------

/// Memory key holding the figure generation whose bounds a panel last applied.
fn view_id(region: usize) -> Id {
    Id::new(("region_view", region))
}

/// True when the panel has not yet shown this generation's computed bounds.
fn needs_bounds(ctx: &Context, view: Id, generation: u64) -> bool {
    ctx.data(|d| d.get_temp::<u64>(view)) != Some(generation)
}

/// Record the applied generation. A double click forgets it, so the next
/// frame restores the computed bounds.
fn track_view(ctx: &Context, view: Id, generation: u64, double_clicked: bool) {
    ctx.data_mut(|d| {
        if double_clicked {
            d.remove::<u64>(view);
        } else {
            d.insert_temp(view, generation);
        }
    });
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn placeholder_plot(
    ui: &mut Ui,
    panel: &RegionPanel,
    message: &str,
    generation: u64,
    height: f32,
) {
    let view = view_id(panel.region);
    let reset = needs_bounds(ui.ctx(), view, generation);

    let response = Plot::new(("region_plot", panel.region))
        .height(height)
        .y_axis_label(panel.region_name.clone())
        .show_axes([false, true])
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            if reset {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([0.0, 0.0], [1.0, 1.0]));
            }
            plot_ui.text(Text::new(PlotPoint::new(0.5, 0.5), RichText::new(message).size(14.0)));
        });
    track_view(ui.ctx(), view, generation, response.response.double_clicked());
}

fn region_plot(
    ui: &mut Ui,
    panel: &RegionPanel,
    chart: &RegionChart,
    time_units: TimeUnits,
    generation: u64,
    height: f32,
) {
    let view = view_id(panel.region);
    let reset = needs_bounds(ui.ctx(), view, generation);

    let count_axis = chart.count_axis;
    let y_axes = vec![
        AxisHints::new_y().label(chart.y_label.clone()),
        AxisHints::new_y()
            .label(RichText::new(COUNT_AXIS_LABEL).color(COUNT_COLOR))
            .placement(HPlacement::Right)
            .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                format!("{:.0}", count_axis.to_count(mark.value))
            }),
    ];

    // Counts share the rmse axis after scaling onto it.
    let scaled = |pts: &[[f64; 2]]| -> Vec<[f64; 2]> {
        pts.iter().map(|&[t, c]| [t, count_axis.to_plot(c)]).collect()
    };

    let response = Plot::new(("region_plot", panel.region))
        .height(height)
        .legend(
            Legend::default()
                .position(Corner::LeftTop)
                .background_alpha(0.25),
        )
        .custom_y_axes(y_axes)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format_time(time_units, mark.value)
        })
        .show_grid([true, false])
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            if reset {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [chart.x_range.0, 0.0],
                    [chart.x_range.1, chart.y_max],
                ));
            }

            for &y in &chart.gridlines {
                plot_ui.hline(
                    HLine::new(y)
                        .style(LineStyle::dotted_dense())
                        .color(Color32::GRAY)
                        .width(0.5),
                );
            }

            plot_ui.line(
                Line::new(PlotPoints::new(chart.forecast.clone()))
                    .name("forecast")
                    .color(FORECAST_COLOR)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(chart.forecast.clone()))
                    .name("forecast")
                    .shape(MarkerShape::Cross)
                    .radius(MARKER_RADIUS)
                    .color(FORECAST_COLOR),
            );

            plot_ui.line(
                Line::new(PlotPoints::new(chart.analysis.clone()))
                    .name("analysis")
                    .color(ANALYSIS_COLOR)
                    .width(1.5),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(chart.analysis.clone()))
                    .name("analysis")
                    .shape(MarkerShape::Circle)
                    .filled(false)
                    .radius(MARKER_RADIUS)
                    .color(ANALYSIS_COLOR),
            );

            // Secondary axis: o = possible, x = used.
            plot_ui.points(
                Points::new(PlotPoints::new(scaled(&chart.possible)))
                    .shape(MarkerShape::Circle)
                    .filled(false)
                    .radius(MARKER_RADIUS)
                    .color(COUNT_COLOR),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(scaled(&chart.used)))
                    .shape(MarkerShape::Cross)
                    .radius(MARKER_RADIUS)
                    .color(COUNT_COLOR),
            );
        });
    track_view(ui.ctx(), view, generation, response.response.double_clicked());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_bounds_apply_once_per_plot() {
        let ctx = Context::default();
        let view = view_id(1);
        assert!(needs_bounds(&ctx, view, 1));

        track_view(&ctx, view, 1, false);
        assert!(!needs_bounds(&ctx, view, 1));
        // Another Plot action bumps the generation.
        assert!(needs_bounds(&ctx, view, 2));
        // Other regions are tracked separately.
        assert!(needs_bounds(&ctx, view_id(2), 1));
    }

    #[test]
    fn double_click_restores_computed_bounds() {
        let ctx = Context::default();
        let view = view_id(3);
        track_view(&ctx, view, 4, false);
        track_view(&ctx, view, 4, true);
        assert!(needs_bounds(&ctx, view, 4));
    }
}

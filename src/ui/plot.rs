use std::ops::RangeInclusive;

use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoint, Text};

use theatre_dash::chart::{ChartSpec, Orientation};
use theatre_dash::color::{generate_palette, gradient};

// ---------------------------------------------------------------------------
// Bar chart rendering for a ChartSpec
// ---------------------------------------------------------------------------

/// Render one chart description as an `egui_plot` bar chart.
pub fn bar_chart(ui: &mut Ui, spec: &ChartSpec, height: f32) {
    ui.strong(&spec.title);
    if spec.is_empty() {
        ui.label("Nothing to show for the current filters.");
        return;
    }

    let palette = generate_palette(spec.bars.len());
    let weights = spec.weight_range();

    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let fill = match (b.weight, weights) {
                (Some(w), Some((lo, hi))) => gradient(w, lo, hi),
                _ => palette[i],
            };
            let hover = b
                .tooltip
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("\n");
            Bar::new(i as f64, b.value).name(hover).fill(fill).width(0.7)
        })
        .collect();

    let mut chart = BarChart::new(bars).element_formatter(Box::new(|bar, _chart| bar.name.clone()));
    if spec.orientation == Orientation::Horizontal {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = spec.bars.iter().map(|b| b.label.clone()).collect();
    let category_axis = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let v = mark.value;
        if v < 0.0 || (v - v.round()).abs() > 1e-6 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    };

    let plot = Plot::new(spec.id)
        .height(height)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    let plot = match spec.orientation {
        Orientation::Vertical => plot
            .x_axis_label(spec.category_title.as_str())
            .y_axis_label(spec.value_title.as_str())
            .x_axis_formatter(category_axis),
        Orientation::Horizontal => plot
            .x_axis_label(spec.value_title.as_str())
            .y_axis_label(spec.category_title.as_str())
            .y_axis_formatter(category_axis),
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        for (i, b) in spec.bars.iter().enumerate() {
            let label = RichText::new(spec.value_label(b)).strong();
            let (position, anchor) = match spec.orientation {
                Orientation::Vertical => (PlotPoint::new(i as f64, b.value), Align2::CENTER_BOTTOM),
                Orientation::Horizontal => (PlotPoint::new(b.value, i as f64), Align2::LEFT_CENTER),
            };
            plot_ui.text(Text::new(position, label).anchor(anchor));
        }
    });
}

//! Plotters-powered dual-axis time-series chart widget for Ratatui.
//!
//! Demand is drawn against the left y axis, supply against the right one; the
//! two series share an x axis of merged-row indices labelled by display period.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct DualSeriesChart<'a> {
    /// Demand line, split into runs of consecutive present values.
    pub demand: &'a [Vec<(f64, f64)>],
    /// Supply line, split the same way.
    pub supply: &'a [Vec<(f64, f64)>],
    /// X axis labels (display periods) indexed by merged row.
    pub periods: &'a [String],
    pub x_bounds: [f64; 2],
    pub demand_bounds: [f64; 2],
    pub supply_bounds: [f64; 2],
    pub demand_label: &'a str,
    pub supply_label: &'a str,
}

impl<'a> Widget for DualSeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 30 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [d0, d1] = self.demand_bounds;
        let [s0, s1] = self.supply_bounds;

        let finite = [x0, x1, d0, d1, s0, s1].iter().all(|v| v.is_finite());
        if !finite || x1 <= x0 || d1 <= d0 || s1 <= s0 {
            return;
        }

        let periods = self.periods;
        let fmt_period = move |v: &f64| -> String {
            let idx = v.round();
            if idx < 0.0 || (v - idx).abs() > 1e-6 {
                return String::new();
            }
            periods.get(idx as usize).cloned().unwrap_or_default()
        };

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Right, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, d0..d1)?
                .set_secondary_coord(x0..x1, s0..s1);

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.demand_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&fmt_period)
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            chart
                .configure_secondary_axes()
                .y_desc(self.supply_label)
                .y_labels(5)
                .y_label_formatter(&|v| fmt_compact(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let demand_color = RGBColor(0, 255, 255); // cyan
            let supply_color = RGBColor(255, 200, 0); // amber

            for run in self.demand {
                chart.draw_series(LineSeries::new(run.iter().copied(), &demand_color))?;
                chart.draw_series(run.iter().map(|&(x, y)| Pixel::new((x, y), demand_color)))?;
            }
            for run in self.supply {
                chart.draw_secondary_series(LineSeries::new(run.iter().copied(), &supply_color))?;
                chart.draw_secondary_series(run.iter().map(|&(x, y)| Pixel::new((x, y), supply_color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Compact tick label: `1.2M`, `35k`, `81.5`.
pub fn fmt_compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e4 {
        format!("{:.0}k", v / 1e3)
    } else if a >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

//! ASCII dual-line chart for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Both series share the x axis (merged row order, labelled by display period)
//! but each is scaled to its own y range, since guest nights and occupancy
//! rates differ by orders of magnitude.
//!
//! Plot elements:
//! - demand: `d`
//! - supply: `s` (demand wins where they overlap)

use crate::domain::MergedRecord;

pub const DEMAND_MARK: char = 'd';
pub const SUPPLY_MARK: char = 's';

/// Render the merged table as a two-line chart.
pub fn render_ascii_plot(rows: &[MergedRecord], title: &str, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if rows.is_empty() {
        return format!("Chart: {title} | no data\n");
    }

    let demand: Vec<Option<f64>> = rows.iter().map(|r| r.demand_value).collect();
    let supply: Vec<Option<f64>> = rows.iter().map(|r| r.supply_value).collect();

    let demand_range = value_range(&demand);
    let supply_range = value_range(&supply);

    let mut grid = vec![vec![' '; width]; height];

    if let Some((lo, hi)) = demand_range {
        let (lo, hi) = pad_range(lo, hi, 0.05);
        draw_series(&mut grid, &demand, lo, hi, DEMAND_MARK);
    }
    if let Some((lo, hi)) = supply_range {
        let (lo, hi) = pad_range(lo, hi, 0.05);
        draw_series(&mut grid, &supply, lo, hi, SUPPLY_MARK);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Chart: {title} | {DEMAND_MARK}=demand {} | {SUPPLY_MARK}=supply {}\n",
        fmt_range(demand_range),
        fmt_range(supply_range)
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(&x_axis_labels(rows, width));
    out.push('\n');
    out
}

fn value_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in values.iter().flatten() {
        min_y = min_y.min(*v);
        max_y = max_y.max(*v);
    }
    (min_y.is_finite() && max_y.is_finite()).then_some((min_y, max_y))
}

fn fmt_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("[{lo:.2}, {hi:.2}]"),
        None => "[no values]".to_string(),
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(idx: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = idx as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Draw one series; a missing value breaks the line.
fn draw_series(grid: &mut [Vec<char>], values: &[Option<f64>], y_min: f64, y_max: f64, ch: char) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for (idx, value) in values.iter().enumerate() {
        let Some(v) = value else {
            prev = None;
            continue;
        };
        let x = map_x(idx, values.len(), width);
        let y = map_y(*v, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
            None => {
                if grid[y][x] == ' ' {
                    grid[y][x] = ch;
                }
            }
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// First and last display period under the chart.
fn x_axis_labels(rows: &[MergedRecord], width: usize) -> String {
    let first = rows.first().map(|r| r.display_period.as_str()).unwrap_or("");
    let last = rows.last().map(|r| r.display_period.as_str()).unwrap_or("");

    let first_len = first.chars().count();
    let last_len = last.chars().count();
    if rows.len() < 2 || first_len + last_len + 1 > width {
        return first.to_string();
    }
    let gap = width - first_len - last_len;
    format!("{first}{}{last}", " ".repeat(gap))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: &str, d: Option<f64>, s: Option<f64>) -> MergedRecord {
        MergedRecord {
            time_code: time.to_string(),
            demand_value: d,
            supply_value: s,
            display_period: time[..6].to_string(),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let rows = vec![
            record("20230101", Some(1.0), Some(30.0)),
            record("20230201", Some(2.0), Some(20.0)),
            record("20230301", Some(3.0), Some(10.0)),
        ];

        let txt = render_ascii_plot(&rows, "t", 10, 5);
        let expected = concat!(
            "Chart: t | d=demand [1.00, 3.00] | s=supply [10.00, 30.00]\n",
            "ss      dd\n",
            "  ss  dd  \n",
            "    dd    \n",
            "  dd  ss  \n",
            "dd      ss\n",
            "202301\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn x_labels_span_the_width_when_they_fit() {
        let rows = vec![record("20230101", Some(1.0), None), record("20231201", Some(2.0), None)];
        assert_eq!(x_axis_labels(&rows, 16), "202301    202312");
        assert_eq!(x_axis_labels(&rows, 12), "202301");
        assert_eq!(x_axis_labels(&rows[..1], 16), "202301");
    }

    #[test]
    fn empty_rows_render_notice() {
        assert_eq!(render_ascii_plot(&[], "x", 20, 5), "Chart: x | no data\n");
    }

    #[test]
    fn missing_values_break_the_line() {
        let rows = vec![
            record("20230101", Some(1.0), None),
            record("20230201", None, None),
            record("20230301", Some(1.0), None),
        ];
        let txt = render_ascii_plot(&rows, "gap", 11, 5);
        assert!(txt.contains("s=supply [no values]"));
        // Only the two endpoints are drawn; nothing bridges the gap.
        let marks = txt.lines().skip(1).take(5).flat_map(|l| l.chars()).filter(|&c| c == 'd').count();
        assert_eq!(marks, 2);
    }
}

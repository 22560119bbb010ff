//! Chart Component
//!
//! Single-series line chart drawn on an HTML5 canvas.

use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// One plotted sample: x-axis label and value
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSample {
    pub label: String,
    pub value: f64,
}

/// Padded y-axis bounds for a series
pub fn y_bounds(values: &[f64]) -> (f64, f64) {
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }

    let range = max - min;
    let padding = if range > 0.0 { range * 0.1 } else { 1.0 };
    min -= padding;
    max += padding;

    (min, max)
}

/// Line chart component; redraws whenever `samples` changes
#[component]
pub fn Chart(
    #[prop(into)]
    title: String,
    color: &'static str,
    #[prop(into)]
    samples: Signal<Vec<ChartSample>>,
) -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();

    create_effect(move |_| {
        let samples = samples.get();
        if let Some(canvas) = canvas_ref.get() {
            draw_chart(&canvas, &samples, color);
        }
    });

    view! {
        <div class="bg-gray-800 rounded-lg p-4 border border-gray-700">
            <div class="flex items-center space-x-2 mb-3">
                <div class="w-3 h-3 rounded-full" style=format!("background-color: {}", color) />
                <h3 class="text-sm font-medium text-gray-300">{title}</h3>
            </div>
            <canvas
                node_ref=canvas_ref
                width="800"
                height="300"
                class="w-full h-56 rounded-lg"
            />
        </div>
    }
}

fn draw_chart(canvas: &HtmlCanvasElement, samples: &[ChartSample], color: &str) {
    let ctx = match canvas.get_context("2d") {
        Ok(Some(ctx)) => match ctx.dyn_into::<CanvasRenderingContext2d>() {
            Ok(ctx) => ctx,
            Err(_) => return,
        },
        _ => return,
    };

    let width = canvas.width() as f64;
    let height = canvas.height() as f64;

    let margin_left = 50.0;
    let margin_right = 20.0;
    let margin_top = 20.0;
    let margin_bottom = 40.0;

    let chart_width = width - margin_left - margin_right;
    let chart_height = height - margin_top - margin_bottom;

    ctx.set_fill_style(&"#1f2937".into()); // gray-800
    ctx.fill_rect(0.0, 0.0, width, height);

    if samples.is_empty() {
        ctx.set_fill_style(&"#6b7280".into());
        ctx.set_font("16px sans-serif");
        let _ = ctx.fill_text("No readings yet", width / 2.0 - 60.0, height / 2.0);
        return;
    }

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let (min, max) = y_bounds(&values);

    // Grid and y-axis labels
    ctx.set_stroke_style(&"#374151".into()); // gray-700
    ctx.set_line_width(1.0);
    ctx.set_font("12px sans-serif");

    for i in 0..=4 {
        let y = margin_top + (i as f64 / 4.0) * chart_height;
        ctx.begin_path();
        ctx.move_to(margin_left, y);
        ctx.line_to(width - margin_right, y);
        ctx.stroke();

        let value = max - (i as f64 / 4.0) * (max - min);
        ctx.set_fill_style(&"#9ca3af".into()); // gray-400
        let _ = ctx.fill_text(&format!("{:.1}", value), 5.0, y + 4.0);
    }

    // Samples are evenly spaced in source order
    let step = if samples.len() > 1 {
        chart_width / (samples.len() - 1) as f64
    } else {
        0.0
    };
    let point = |i: usize, value: f64| {
        let x = margin_left + i as f64 * step;
        let y = margin_top + ((max - value) / (max - min)) * chart_height;
        (x, y)
    };

    ctx.set_stroke_style(&color.into());
    ctx.set_line_width(2.0);
    ctx.begin_path();
    for (i, sample) in samples.iter().enumerate() {
        let (x, y) = point(i, sample.value);
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.stroke();

    ctx.set_fill_style(&color.into());
    for (i, sample) in samples.iter().enumerate() {
        let (x, y) = point(i, sample.value);
        ctx.begin_path();
        let _ = ctx.arc(x, y, 3.0, 0.0, std::f64::consts::PI * 2.0);
        ctx.fill();
    }

    // Label roughly six evenly spaced samples
    ctx.set_fill_style(&"#9ca3af".into());
    let every = (samples.len() / 6).max(1);
    for (i, sample) in samples.iter().enumerate().step_by(every) {
        let (x, _) = point(i, sample.value);
        let _ = ctx.fill_text(&sample.label, x - 15.0, height - 10.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_bounds_pads_range() {
        let (min, max) = y_bounds(&[20.0, 30.0]);
        assert!((min - 19.0).abs() < 1e-9);
        assert!((max - 31.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_bounds_flat_and_empty() {
        assert_eq!(y_bounds(&[5.0, 5.0]), (4.0, 6.0));
        assert_eq!(y_bounds(&[]), (0.0, 1.0));
    }
}

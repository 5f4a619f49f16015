// Chart synthesizer - Turns JSON graph payloads into SVG markup
use crate::domain::error::GraphError;
use crate::domain::wave::{is_wave_forecast, parse_samples, WaveSample};
use serde_json::Value;

const BAR_WIDTH: f64 = 40.0;
const CHART_HEIGHT: f64 = 100.0;
/// Room above and below the bars for labels
const LABEL_MARGIN: f64 = 20.0;
const BAR_FILL: &str = "#0090a8";

/// Produce SVG markup for a JSON payload.
///
/// A payload carrying an `svg` string is passed through unchanged; a wave
/// forecast document is drawn as a bar chart; anything else is rejected.
pub fn json_to_svg(payload: &Value) -> Result<String, GraphError> {
    if let Some(svg) = payload.get("svg").and_then(Value::as_str) {
        return Ok(svg.to_string());
    }

    if is_wave_forecast(payload) {
        let samples = parse_samples(payload)?;
        tracing::debug!("Synthesizing wave chart from {} samples", samples.len());
        return Ok(render_wave_chart(&samples));
    }

    Err(GraphError::InvalidJsonFormat)
}

/// One bar per sample, scaled against the tallest wave.
pub fn render_wave_chart(samples: &[WaveSample]) -> String {
    let max_height = samples.iter().map(|s| s.height).fold(0.0_f64, f64::max);
    let max_height = if max_height > 0.0 { max_height } else { 1.0 };

    let width = samples.len() as f64 * BAR_WIDTH;
    let height = CHART_HEIGHT + 2.0 * LABEL_MARGIN;
    let baseline = LABEL_MARGIN + CHART_HEIGHT;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"wave-chart\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = format_number(width),
        h = format_number(height),
    ));

    for (idx, sample) in samples.iter().enumerate() {
        let bar_height = (sample.height / max_height) * CHART_HEIGHT;
        let x = idx as f64 * BAR_WIDTH;
        let y = baseline - bar_height;
        let center = x + BAR_WIDTH / 2.0;

        svg.push_str("<g class=\"wave-sample\">");
        if let Some(time) = sample.time {
            svg.push_str(&format!("<title>{}</title>", time.format("%Y-%m-%d %H:%M UTC")));
        }
        svg.push_str(&format!(
            "<rect class=\"wave-bar\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
            format_number(x),
            format_number(y),
            format_number(BAR_WIDTH),
            format_number(bar_height),
            BAR_FILL
        ));
        svg.push_str(&label(
            "wave-height-label",
            center,
            baseline + 14.0,
            &format_number(sample.height),
        ));
        if let Some(period) = sample.period {
            svg.push_str(&label(
                "wave-period-label",
                center,
                12.0,
                &format!("{}s", format_number(period)),
            ));
        }
        if let Some(direction) = sample.direction {
            svg.push_str(&label(
                "wave-direction-label",
                center,
                y - 4.0,
                &format!("{}°", format_number(direction)),
            ));
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn label(class: &str, x: f64, y: f64, text: &str) -> String {
    format!(
        "<text class=\"{}\" x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\">{}</text>",
        class,
        format_number(x),
        format_number(y),
        text
    )
}

/// Two decimals at most, no trailing zeros
fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        let text = format!("{:.2}", rounded);
        text.trim_end_matches('0').to_string()
    }
}

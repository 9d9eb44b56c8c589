//! Terminal scatter chart of actual against predicted prices.

use boostline_data::AlignedPair;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

pub const CHART_TITLE: &str = "Median Price vs Predicted Price";

/// Renders the chart off-screen and returns it as text lines, trailing blanks trimmed.
pub fn render_scatter(pairs: &[AlignedPair], width: u16, height: u16) -> Vec<String> {
    let points: Vec<(f64, f64)> = pairs.iter().map(|p| (p.actual, p.predicted)).collect();
    let (lo, hi) = bounds(pairs);

    let dataset = Dataset::default()
        .name("test rows")
        .marker(Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let labels = [format!("{lo:.1}"), format!("{:.1}", (lo + hi) / 2.0), format!("{hi:.1}")];
    let chart = Chart::new(vec![dataset])
        .block(Block::default().borders(Borders::ALL).title(format!(" {CHART_TITLE} ")))
        .x_axis(Axis::default().title("Median Price").bounds([lo, hi]).labels(labels.clone()))
        .y_axis(Axis::default().title("Predicted Price").bounds([lo, hi]).labels(labels));

    let area = Rect::new(0, 0, width, height);
    let mut buffer = Buffer::empty(area);
    Widget::render(chart, area, &mut buffer);

    (0..height)
        .map(|y| {
            let line: String = (0..width).map(|x| buffer[(x, y)].symbol()).collect();
            line.trim_end().to_string()
        })
        .collect()
}

/// Shared bounds for both axes so a perfect model lies on the diagonal.
fn bounds(pairs: &[AlignedPair]) -> (f64, f64) {
    let values = pairs.iter().flat_map(|p| [p.actual, p.predicted]).filter(|v| v.is_finite());
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs() -> Vec<AlignedPair> {
        [(24.0, 22.5), (21.6, 23.0), (34.7, 31.2), (33.4, 30.9), (36.2, 35.0)]
            .into_iter()
            .map(|(actual, predicted)| AlignedPair { actual, predicted })
            .collect()
    }

    #[test]
    fn test_render_has_title_and_points() {
        let lines = render_scatter(&pairs(), 60, 20);
        assert_eq!(lines.len(), 20);
        assert!(lines[0].contains(CHART_TITLE));

        let plotted = lines.iter().flat_map(|l| l.chars()).filter(|c| ('\u{2801}'..='\u{28FF}').contains(c)).count();
        assert!(plotted > 0);
    }

    #[test]
    fn test_bounds_are_shared_and_padded() {
        assert_eq!(bounds(&pairs()), (21.6, 36.2));
        let flat = vec![AlignedPair { actual: 5.0, predicted: 5.0 }];
        assert_eq!(bounds(&flat), (4.0, 6.0));
        assert_eq!(bounds(&[]), (0.0, 1.0));
    }
}

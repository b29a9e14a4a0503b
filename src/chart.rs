//! Server-rendered bar charts and the owning chart slot.
//!
//! Each dashboard keeps at most one rendered chart per visualization; a new
//! render always drops the previous instance before the replacement is
//! built. Values render as horizontal bars scaled against the series max.

use crate::dashboard::escape_html;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bars: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64) {
        self.bars.push(Bar {
            label: label.into(),
            value,
        });
    }

    fn max_value(&self) -> f64 {
        self.bars.iter().fold(0.0_f64, |max, bar| max.max(bar.value))
    }
}

const BAR_HEIGHT: u32 = 22;
const BAR_GAP: u32 = 6;
const LABEL_WIDTH: u32 = 180;
const CHART_WIDTH: u32 = 640;

/// Render a series as a standalone SVG document. An empty series renders a
/// placeholder message instead of an empty viewport.
pub fn render_bar_svg(series: &BarSeries) -> String {
    let rows = series.bars.len() as u32;
    let height = 30 + rows.max(1) * (BAR_HEIGHT + BAR_GAP);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{CHART_WIDTH}\" height=\"{height}\" \
         font-family=\"sans-serif\" font-size=\"12\">\n<text x=\"4\" y=\"16\" font-weight=\"bold\">{}</text>\n",
        escape_html(&series.title)
    );

    if series.bars.is_empty() {
        svg.push_str("<text x=\"4\" y=\"44\" fill=\"#888\">데이터가 없습니다</text>\n");
        svg.push_str("</svg>\n");
        return svg;
    }

    let max = series.max_value();
    let usable = (CHART_WIDTH - LABEL_WIDTH - 70) as f64;
    for (index, bar) in series.bars.iter().enumerate() {
        let y = 30 + index as u32 * (BAR_HEIGHT + BAR_GAP);
        let width = if max > 0.0 {
            (bar.value / max * usable).max(0.0)
        } else {
            0.0
        };
        svg.push_str(&format!(
            "<text x=\"4\" y=\"{text_y}\">{label}</text>\
             <rect x=\"{LABEL_WIDTH}\" y=\"{y}\" width=\"{width:.0}\" height=\"{BAR_HEIGHT}\" fill=\"#c0392b\"/>\
             <text x=\"{value_x:.0}\" y=\"{text_y}\">{value}</text>\n",
            text_y = y + 15,
            label = escape_html(&bar.label),
            value_x = LABEL_WIDTH as f64 + width + 6.0,
            value = bar.value,
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Holder for the single live chart of one visualization.
///
/// Replacing the chart drops the previous instance before the new one is
/// built, so two instances never coexist.
#[derive(Debug)]
pub struct ChartSlot<T> {
    current: Option<T>,
}

impl<T> Default for ChartSlot<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> ChartSlot<T> {
    pub fn replace(&mut self, build: impl FnOnce() -> T) -> &T {
        self.current = None;
        self.current.insert(build())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

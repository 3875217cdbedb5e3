//! Line charts over dates, written as SVG

use chrono::{Datelike, NaiveDate};
use std::path::Path;
use svg::{
    node::element::{path::Data, Circle, Line, Path as SvgPath, Text},
    Document,
};

use crate::lib::summary::Metrics;
use crate::load::error::{Error, Result};

/// Map a value onto the plotting axis
pub trait Scalar {
    fn to_scalar(&self) -> f64;
}

impl Scalar for f64 {
    fn to_scalar(&self) -> f64 {
        *self
    }
}

impl Scalar for NaiveDate {
    fn to_scalar(&self) -> f64 {
        self.num_days_from_ce() as f64
    }
}

/// Appearance of a curve, from a short tag such as `"b"`, `"bo"` or `"--g"`
///
/// One letter picks the color (`b g r c m y k`), `o` adds point markers,
/// `-` draws a solid line and `--` a dashed one. A marker without any
/// explicit line style draws markers only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub color: &'static str,
    pub line: Option<Dash>,
    pub marker: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dash {
    Solid,
    Dashed,
}

impl Style {
    pub fn parse(tag: &str) -> Self {
        let mut color = "blue";
        let mut line = None;
        let mut marker = false;
        let mut rest = tag;
        while let Some(c) = rest.chars().next() {
            if let Some(r) = rest.strip_prefix("--") {
                line = Some(Dash::Dashed);
                rest = r;
                continue;
            }
            match c {
                '-' => line = Some(Dash::Solid),
                'o' => marker = true,
                'b' => color = "blue",
                'g' => color = "green",
                'r' => color = "red",
                'c' => color = "cyan",
                'm' => color = "magenta",
                'y' => color = "gold",
                'k' => color = "black",
                _ => (),
            }
            rest = &rest[c.len_utf8()..];
        }
        if line.is_none() && !marker {
            line = Some(Dash::Solid);
        }
        Self { color, line, marker }
    }
}

/// One labelled curve
#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
    pub style: Style,
}

impl Curve {
    pub fn new<S: ToString>(label: S, xs: &[NaiveDate], ys: &[f64], style: &str) -> Self {
        Self {
            label: label.to_string(),
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
            style: Style::parse(style),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub curves: Vec<Curve>,
}

const FWIDTH: f64 = 1000.0;
const FHEIGHT: f64 = 600.0;
const MARGIN: f64 = 70.0;
const STROKE_WIDTH: f64 = 2.0;

impl Chart {
    pub fn new<S: ToString>(title: S) -> Self {
        Self {
            title: title.to_string(),
            curves: Vec::new(),
        }
    }

    pub fn with(mut self, curve: Curve) -> Self {
        self.curves.push(curve);
        self
    }

    /// `(xmin, xmax, ymin, ymax)`, always containing `y = 0`
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut xmin = f64::MAX;
        let mut xmax = f64::MIN;
        let mut ymin = 0.0_f64;
        let mut ymax = 0.0_f64;
        for (x, y) in self.curves.iter().flat_map(|c| c.points.iter()) {
            xmin = xmin.min(x.to_scalar());
            xmax = xmax.max(x.to_scalar());
            if y.is_finite() {
                ymin = ymin.min(*y);
                ymax = ymax.max(*y);
            }
        }
        if xmin > xmax {
            (0.0, 1.0, 0.0, 1.0)
        } else {
            (xmin, xmax, ymin, ymax)
        }
    }

    pub fn to_document(&self) -> Document {
        let (xmin, xmax, ymin, ymax) = self.bounds();
        let width = (xmax - xmin).max(1.0);
        let height = (ymax - ymin).max(1.0);
        let resize_x = |x: f64| (x - xmin) / width * FWIDTH;
        let resize_y = |y: f64| (ymax - y) / height * FHEIGHT;

        let mut doc = Document::new()
            .set("viewBox", (-MARGIN, -MARGIN, FWIDTH + 2.0 * MARGIN, FHEIGHT + 2.0 * MARGIN))
            .set("font-family", "sans-serif")
            .add(label(FWIDTH / 2.0, -MARGIN / 2.0, &self.title, "middle").set("font-size", 22));

        // axes
        doc = doc
            .add(axis(0.0, 0.0, 0.0, FHEIGHT))
            .add(axis(0.0, resize_y(0.0), FWIDTH, resize_y(0.0)));
        for i in 0..=4 {
            let y = ymin + height * i as f64 / 4.0;
            doc = doc.add(label(-8.0, resize_y(y) + 4.0, &format!("{:.0}", y), "end"));
        }
        for (x, text) in x_ticks(xmin, xmax) {
            doc = doc
                .add(axis(resize_x(x), FHEIGHT, resize_x(x), FHEIGHT + 6.0))
                .add(label(resize_x(x), FHEIGHT + 22.0, &text, "middle"));
        }

        let mut legend_row = 0;
        for curve in &self.curves {
            let pts = curve
                .points
                .iter()
                .filter(|(_, y)| y.is_finite())
                .map(|(x, y)| (resize_x(x.to_scalar()), resize_y(*y)))
                .collect::<Vec<_>>();
            if let (Some(dash), Some(first)) = (curve.style.line, pts.first()) {
                let data = pts[1..]
                    .iter()
                    .fold(Data::new().move_to(*first), |d, p| d.line_to(*p));
                let mut path = SvgPath::new()
                    .set("fill", "none")
                    .set("stroke", curve.style.color)
                    .set("stroke-width", STROKE_WIDTH)
                    .set("d", data);
                if dash == Dash::Dashed {
                    path = path.set("stroke-dasharray", "8,5");
                }
                doc = doc.add(path);
            }
            if curve.style.marker {
                for (x, y) in &pts {
                    doc = doc.add(
                        Circle::new()
                            .set("cx", *x)
                            .set("cy", *y)
                            .set("r", 4.0)
                            .set("fill", curve.style.color),
                    );
                }
            }
            if !curve.label.is_empty() {
                let y = 10.0 + 20.0 * legend_row as f64;
                doc = doc
                    .add(
                        Line::new()
                            .set("x1", FWIDTH - 150.0)
                            .set("x2", FWIDTH - 120.0)
                            .set("y1", y)
                            .set("y2", y)
                            .set("stroke", curve.style.color)
                            .set("stroke-width", STROKE_WIDTH),
                    )
                    .add(label(FWIDTH - 112.0, y + 4.0, &curve.label, "start"));
                legend_row += 1;
            }
        }
        doc
    }

    pub fn render(&self, file: &Path) -> Result<()> {
        tracing::debug!("writing chart '{}' to {}", self.title, file.display());
        svg::save(file, &self.to_document()).map_err(Error::io(file))
    }
}

fn axis(x1: f64, y1: f64, x2: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("x2", x2)
        .set("y1", y1)
        .set("y2", y2)
        .set("stroke", "black")
        .set("stroke-width", STROKE_WIDTH)
}

/// Text at `(x, y)`, `anchor` being `start`, `middle` or `end`
pub(crate) fn label(x: f64, y: f64, text: &str, anchor: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .set("font-size", 13)
        .set("text-anchor", anchor)
        .add(svg::node::Text::new(text))
}

/// First day of each month in range labelled `Jan`, `Feb`, ...;
/// falls back to a handful of `MM-DD` ticks for ranges shorter than two months
fn x_ticks(xmin: f64, xmax: f64) -> Vec<(f64, String)> {
    let to_date = |x: f64| NaiveDate::from_num_days_from_ce_opt(x.round() as i32);
    let (start, end) = match (to_date(xmin), to_date(xmax)) {
        (Some(s), Some(e)) => (s, e),
        _ => return Vec::new(),
    };
    let monthly = crate::lib::date::months(start.with_day(1).unwrap_or(start), end)
        .into_iter()
        .filter(|d| *d >= start)
        .map(|d| (d.to_scalar(), d.format("%b").to_string()))
        .collect::<Vec<_>>();
    if monthly.len() >= 2 {
        return monthly;
    }
    let steps = ((xmax - xmin) / 7.0).ceil().clamp(1.0, 8.0) as usize;
    (0..=steps)
        .filter_map(|i| to_date(xmin + (xmax - xmin) * i as f64 / steps as f64))
        .map(|d| (d.to_scalar(), d.format("%m-%d").to_string()))
        .collect()
}

/// Draw every series of `metrics` against its window starts
pub fn metrics_over_time(metrics: &Metrics, title: &str, file: &Path) -> Result<()> {
    metrics
        .series
        .iter()
        .fold(Chart::new(title), |chart, s| {
            chart.with(Curve::new(&s.label, &metrics.starts, &s.values, &s.style))
        })
        .render(file)
}

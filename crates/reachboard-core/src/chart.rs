//! Declarative descriptions of the linked scatter/trajectory chart pair.
//!
//! Nothing here draws anything: the structures are serialized into the page
//! and interpreted by the client runtime. Interaction is expressed as
//! [`Binding`]s that only replace a renderer's bound data, so geometry,
//! legends and axes stay fixed once rendered.

use crate::{DayFrame, MetricData, MetricName, SeriesIndex};
use serde::Serialize;
use tracing::warn;

pub const SCATTER_TITLE: &str = "Engagement Rate Per User";
pub const TRAJECTORY_TITLE: &str = "Tapped Engagement Rate Vs. Time";

/// Posts at or below this value are ignored when picking the x-axis floor.
pub const POSTS_NOISE_FLOOR: f64 = 0.01;
pub const POSTS_PADDING: f64 = 1.0;
pub const ENGAGEMENT_FLOOR_PADDING: f64 = 0.5;

const DAY_LABEL_X_OFFSET: f64 = 1.75;
const DAY_LABEL_Y_OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub start: f64,
    pub end: f64,
}

impl AxisRange {
    /// Used when there is nothing to span.
    pub const FALLBACK: AxisRange = AxisRange {
        start: 0.0,
        end: 1.0,
    };

    /// `[min, max]` of the finite values, or [`AxisRange::FALLBACK`].
    pub fn spanning<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut bounds: Option<(f64, f64)> = None;
        for value in values.into_iter().filter(|v| v.is_finite()) {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(value), hi.max(value)),
                None => (value, value),
            });
        }
        bounds.map_or(Self::FALLBACK, |(start, end)| Self { start, end })
    }

    pub fn padded(self, below: f64, above: f64) -> Self {
        Self {
            start: self.start - below,
            end: self.end + above,
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.end - self.start) / 2.0 + self.start
    }
}

/// Session-wide scatter axes computed over every day, so switching days
/// never rescales the plot.
pub fn scatter_ranges(frames: &[DayFrame]) -> (AxisRange, AxisRange) {
    let posts = || frames.iter().flat_map(|f| f.posts.iter().copied());
    let significant = AxisRange::spanning(posts().filter(|p| *p > POSTS_NOISE_FLOOR));
    let all = AxisRange::spanning(posts());
    let x = if posts().any(|p| p > POSTS_NOISE_FLOOR) {
        AxisRange {
            start: significant.start,
            end: all.end,
        }
    } else {
        all
    };
    let y = AxisRange::spanning(frames.iter().flat_map(|f| f.values.iter().copied()));

    (
        x.padded(POSTS_PADDING, POSTS_PADDING),
        y.padded(ENGAGEMENT_FLOOR_PADDING, 0.0),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub label: String,
    pub field: String,
}

impl Tooltip {
    fn new(label: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub location: String,
    pub entries: Vec<LegendEntry>,
}

/// Watermark text naming the live day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    pub fill_alpha: f64,
    pub line_color: String,
    pub legend: Legend,
    pub tooltips: Vec<Tooltip>,
    pub day_label: DayLabel,
    /// Key of the frame bound at first render.
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_range: AxisRange,
    /// Tick label for each day index.
    pub x_ticks: Vec<String>,
    pub line_width: f64,
    pub line_alpha: f64,
    pub tooltips: Vec<Tooltip>,
    /// User whose series is bound at first render.
    pub source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySlider {
    pub start: usize,
    pub end: usize,
    pub step: usize,
    pub value: usize,
}

/// Client-side data-binding rules. Each one names a control and the
/// renderer whose bound data it replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    /// Slider value `d` binds frame `d` to `target` and its day name to `label`.
    FrameSwap {
        control: String,
        target: String,
        label: String,
    },
    /// Tapping a point of `source` binds that user's series to `target`.
    SeriesSwap { source: String, target: String },
}

impl Binding {
    pub fn day_slider() -> Self {
        Binding::FrameSwap {
            control: "day_slider".to_string(),
            target: "scatter".to_string(),
            label: "day_label".to_string(),
        }
    }

    pub fn point_tap() -> Self {
        Binding::SeriesSwap {
            source: "scatter".to_string(),
            target: "trajectory".to_string(),
        }
    }
}

/// Everything the client needs to render one metric tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPair {
    pub metric: MetricName,
    pub scatter: ScatterChart,
    pub trajectory: TrajectoryChart,
    pub slider: DaySlider,
    pub frames: Vec<DayFrame>,
    pub series: SeriesIndex,
    pub bindings: Vec<Binding>,
}

impl ChartPair {
    pub fn frame(&self, day: usize) -> Option<&DayFrame> {
        self.frames.get(day)
    }

    pub fn day_count(&self) -> usize {
        self.frames.len()
    }
}

/// Picks the configured default user when it exists, otherwise the
/// alphabetically first user.
pub fn resolve_default_user(series: &SeriesIndex, configured: Option<&str>) -> Option<String> {
    match configured {
        Some(user) if series.contains(user) => Some(user.to_string()),
        Some(user) => {
            let fallback = series.first_user();
            warn!(
                configured = user,
                fallback = ?fallback,
                "default user not present in data, falling back"
            );
            fallback.map(str::to_string)
        }
        None => series.first_user().map(str::to_string),
    }
}

fn legend_entries(data: &MetricData) -> Vec<LegendEntry> {
    data.group_labels
        .iter()
        .filter_map(|label| {
            data.groups
                .entries()
                .iter()
                .find(|entry| &entry.group == label)
                .map(|entry| LegendEntry {
                    label: label.clone(),
                    color: entry.color.clone(),
                })
        })
        .collect()
}

/// Assembles the scatter/trajectory pair for one metric.
pub fn assemble_chart(
    data: &MetricData,
    frames: Vec<DayFrame>,
    series: SeriesIndex,
    default_user: Option<&str>,
) -> ChartPair {
    let (x_range, y_range) = scatter_ranges(&frames);
    let default_user = resolve_default_user(&series, default_user);

    let day_label = DayLabel {
        x: x_range.midpoint() - DAY_LABEL_X_OFFSET,
        y: y_range.midpoint() - DAY_LABEL_Y_OFFSET,
        text: data.days.first().cloned().unwrap_or_default(),
        font_size: "50pt".to_string(),
        color: "#EEEEEE".to_string(),
    };

    let scatter = ScatterChart {
        title: SCATTER_TITLE.to_string(),
        x_label: "Scaled Total Posts".to_string(),
        y_label: "Scaled Engagement Rate".to_string(),
        x_range,
        y_range,
        fill_alpha: 0.6,
        line_color: "black".to_string(),
        legend: Legend {
            location: "bottom_right".to_string(),
            entries: legend_entries(data),
        },
        tooltips: vec![
            Tooltip::new("Account", "users"),
            Tooltip::new("Followers", "followers"),
        ],
        day_label,
        source: frames.first().map(|f| f.key.clone()),
    };

    let trajectory = TrajectoryChart {
        title: TRAJECTORY_TITLE.to_string(),
        x_label: "Date".to_string(),
        y_label: "Engagement".to_string(),
        y_range,
        x_ticks: data.days.clone(),
        line_width: 4.0,
        line_alpha: 0.85,
        tooltips: vec![
            Tooltip::new("Day", "index"),
            Tooltip::new("Engagement", "values"),
        ],
        source: default_user,
    };

    let slider = DaySlider {
        start: 0,
        end: frames.len().saturating_sub(1),
        step: 1,
        value: 0,
    };

    ChartPair {
        metric: data.metric,
        scatter,
        trajectory,
        slider,
        frames,
        series,
        bindings: vec![Binding::day_slider(), Binding::point_tap()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: usize, posts: Vec<f64>, values: Vec<f64>) -> DayFrame {
        let n = posts.len();
        DayFrame {
            key: DayFrame::frame_key(index),
            index,
            day: format!("day-{index}"),
            users: (0..n).map(|i| format!("u{i}")).collect(),
            values,
            followers: vec![150.0; n],
            followers_scaled: vec![1.0; n],
            posts,
            colors: vec!["#000".into(); n],
            groups: vec!["g".into(); n],
        }
    }

    #[test]
    fn spanning_ignores_non_finite_values() {
        let range = AxisRange::spanning([3.0, f64::NAN, -2.0, 7.5]);
        assert_eq!(range, AxisRange { start: -2.0, end: 7.5 });
        assert_eq!(AxisRange::spanning(Vec::new()), AxisRange::FALLBACK);
    }

    #[test]
    fn scatter_ranges_cover_every_day_with_padding() {
        let frames = vec![
            frame(0, vec![2.0, 10.0], vec![0.2, 0.9]),
            frame(1, vec![4.0, 12.0], vec![0.1, 1.4]),
        ];
        let (x, y) = scatter_ranges(&frames);
        assert_eq!(x, AxisRange { start: 1.0, end: 13.0 });
        assert_eq!(y, AxisRange { start: 0.1 - 0.5, end: 1.4 });
    }

    #[test]
    fn zero_posts_do_not_set_the_x_floor() {
        let frames = vec![frame(0, vec![0.0, 3.0, 8.0], vec![1.0, 1.0, 1.0])];
        let (x, _) = scatter_ranges(&frames);
        assert_eq!(x.start, 2.0);
        assert_eq!(x.end, 9.0);

        let all_zero = vec![frame(0, vec![0.0, 0.0], vec![1.0, 1.0])];
        let (x, _) = scatter_ranges(&all_zero);
        assert_eq!(x, AxisRange { start: -1.0, end: 1.0 });
    }

    #[test]
    fn empty_frames_fall_back_to_unit_ranges() {
        let (x, y) = scatter_ranges(&[]);
        assert_eq!(x, AxisRange { start: -1.0, end: 2.0 });
        assert_eq!(y, AxisRange { start: -0.5, end: 1.0 });
    }

    #[test]
    fn bindings_serialize_with_kind_tag() {
        let json = serde_json::to_value(Binding::day_slider()).unwrap();
        assert_eq!(json["kind"], "frame_swap");
        assert_eq!(json["target"], "scatter");
        let json = serde_json::to_value(Binding::point_tap()).unwrap();
        assert_eq!(json["kind"], "series_swap");
        assert_eq!(json["source"], "scatter");
        assert_eq!(json["target"], "trajectory");
    }
}

use crate::{ChartPair, DayFrame, ReachboardError, Result, UserSeries};

/// Live selections of one chart pair, mirroring what the client runtime
/// does when its bindings fire.
///
/// The day and the user evolve independently: the slider never touches the
/// selected user and tapping a point never moves the slider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartState {
    day: usize,
    user: Option<String>,
}

impl ChartState {
    /// Day 0 and the pair's default user.
    pub fn initial(pair: &ChartPair) -> Self {
        Self {
            day: pair.slider.value,
            user: pair.trajectory.source.clone(),
        }
    }

    pub fn day(&self) -> usize {
        self.day
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn select_day<'a>(&mut self, pair: &'a ChartPair, day: usize) -> Result<&'a DayFrame> {
        let frame = pair.frame(day).ok_or_else(|| {
            ReachboardError::Selection(format!(
                "day {day} is outside 0..{}",
                pair.day_count()
            ))
        })?;
        self.day = day;
        Ok(frame)
    }

    pub fn select_user<'a>(&mut self, pair: &'a ChartPair, user: &str) -> Result<&'a UserSeries> {
        let series = pair
            .series
            .get(user)
            .ok_or_else(|| ReachboardError::Selection(format!("unknown user {user:?}")))?;
        self.user = Some(user.to_string());
        Ok(series)
    }

    pub fn active_frame<'a>(&self, pair: &'a ChartPair) -> Option<&'a DayFrame> {
        pair.frame(self.day)
    }

    pub fn active_series<'a>(&self, pair: &'a ChartPair) -> Option<&'a UserSeries> {
        self.user.as_deref().and_then(|user| pair.series.get(user))
    }

    /// Text of the on-canvas day label for the live day.
    pub fn day_label<'a>(&self, pair: &'a ChartPair) -> Option<&'a str> {
        self.active_frame(pair).map(|frame| frame.day.as_str())
    }
}

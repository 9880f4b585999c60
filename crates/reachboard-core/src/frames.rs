use crate::{MetricData, MetricTable, ReachboardError, Result};
use serde::Serialize;
use tracing::debug;

/// Divisor turning raw follower counts into scatter point radii.
pub const FOLLOWERS_SCALE: f64 = 150.0;

/// All users on one day, stored column-wise so the client can swap a
/// whole frame into an existing scatter renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayFrame {
    /// Wire identifier of the frame, `_<index>`.
    pub key: String,
    pub index: usize,
    pub day: String,
    pub users: Vec<String>,
    pub values: Vec<f64>,
    pub followers: Vec<f64>,
    pub followers_scaled: Vec<f64>,
    pub posts: Vec<f64>,
    pub colors: Vec<String>,
    pub groups: Vec<String>,
}

/// One user's row in a [`DayFrame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRow<'a> {
    pub user: &'a str,
    pub value: f64,
    pub followers: f64,
    pub followers_scaled: f64,
    pub posts: f64,
    pub day: &'a str,
    pub color: &'a str,
    pub group: &'a str,
}

impl DayFrame {
    pub fn frame_key(index: usize) -> String {
        format!("_{index}")
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<FrameRow<'_>> {
        Some(FrameRow {
            user: self.users.get(idx)?,
            value: self.values[idx],
            followers: self.followers[idx],
            followers_scaled: self.followers_scaled[idx],
            posts: self.posts[idx],
            day: &self.day,
            color: &self.colors[idx],
            group: &self.groups[idx],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = FrameRow<'_>> + '_ {
        (0..self.len()).filter_map(move |idx| self.row(idx))
    }

    pub fn row_for(&self, user: &str) -> Option<FrameRow<'_>> {
        self.users
            .iter()
            .position(|u| u == user)
            .and_then(|idx| self.row(idx))
    }
}

fn join_error(table: &MetricTable, what: String) -> ReachboardError {
    ReachboardError::Join(format!("{what} is missing from the {} table", table.name()))
}

/// Fails on a user or day present in `other` but absent from the engagement
/// table, so both tables carry the same keys once the forward join succeeds.
fn ensure_no_extra_keys(engagement: &MetricTable, other: &MetricTable) -> Result<()> {
    if let Some(user) = other.users().iter().find(|u| engagement.row(u).is_none()) {
        let what = format!("user {user:?} of the {} table", other.name());
        return Err(join_error(engagement, what));
    }
    if let Some(day) = other
        .days()
        .iter()
        .find(|d| engagement.day_position(d).is_none())
    {
        let what = format!("day {day:?} of the {} table", other.name());
        return Err(join_error(engagement, what));
    }
    Ok(())
}

/// Builds one frame per day, indexed by the engagement table's column order.
///
/// Rows follow the engagement table's user order. Followers, posts and
/// group membership are joined by user identifier, and followers and posts
/// columns by day label; any unresolved key is a join error, in either
/// direction.
pub fn build_day_frames(data: &MetricData, followers_scale: f64) -> Result<Vec<DayFrame>> {
    let engagement = &data.engagement;
    ensure_no_extra_keys(engagement, &data.followers)?;
    ensure_no_extra_keys(engagement, &data.posts)?;

    let mut joined = Vec::with_capacity(engagement.users().len());
    for user in engagement.users() {
        let group = data.groups.lookup(user).ok_or_else(|| {
            ReachboardError::Join(format!("user {user:?} has no entry in the group mapping"))
        })?;
        let followers = data
            .followers
            .row(user)
            .ok_or_else(|| join_error(&data.followers, format!("user {user:?}")))?;
        let posts = data
            .posts
            .row(user)
            .ok_or_else(|| join_error(&data.posts, format!("user {user:?}")))?;
        let values = engagement
            .row(user)
            .ok_or_else(|| join_error(engagement, format!("user {user:?}")))?;
        joined.push((user, group, values, followers, posts));
    }

    let mut frames = Vec::with_capacity(data.days.len());
    for (index, day) in data.days.iter().enumerate() {
        let value_col = engagement
            .day_position(day)
            .ok_or_else(|| join_error(engagement, format!("day {day:?}")))?;
        let followers_col = data
            .followers
            .day_position(day)
            .ok_or_else(|| join_error(&data.followers, format!("day {day:?}")))?;
        let posts_col = data
            .posts
            .day_position(day)
            .ok_or_else(|| join_error(&data.posts, format!("day {day:?}")))?;

        let mut frame = DayFrame {
            key: DayFrame::frame_key(index),
            index,
            day: day.clone(),
            users: Vec::with_capacity(joined.len()),
            values: Vec::with_capacity(joined.len()),
            followers: Vec::with_capacity(joined.len()),
            followers_scaled: Vec::with_capacity(joined.len()),
            posts: Vec::with_capacity(joined.len()),
            colors: Vec::with_capacity(joined.len()),
            groups: Vec::with_capacity(joined.len()),
        };
        for (user, group, values, followers, posts) in &joined {
            let followers = followers[followers_col];
            frame.users.push((*user).clone());
            frame.values.push(values[value_col]);
            frame.followers.push(followers);
            frame.followers_scaled.push(followers / followers_scale);
            frame.posts.push(posts[posts_col]);
            frame.colors.push(group.color.clone());
            frame.groups.push(group.group.clone());
        }
        frames.push(frame);
    }

    debug!(
        metric = %data.metric,
        frames = frames.len(),
        users = joined.len(),
        "built day frames"
    );
    Ok(frames)
}

use crate::{MetricTable, ReachboardError, Result};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// One user's metric values across every day, in day order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSeries {
    pub user: String,
    /// Day indices, always `0..days.len()`.
    pub index: Vec<usize>,
    pub values: Vec<f64>,
}

impl UserSeries {
    pub fn points(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Series for every user, kept in table order with constant-time lookup by
/// user identifier. Serializes as the plain list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesIndex {
    series: Vec<UserSeries>,
    by_user: HashMap<String, usize>,
}

impl SeriesIndex {
    pub fn get(&self, user: &str) -> Option<&UserSeries> {
        self.by_user.get(user).map(|&idx| &self.series[idx])
    }

    pub fn contains(&self, user: &str) -> bool {
        self.by_user.contains_key(user)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserSeries> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Alphabetically first user, if any.
    pub fn first_user(&self) -> Option<&str> {
        self.series.iter().map(|s| s.user.as_str()).min()
    }
}

impl Serialize for SeriesIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.series.serialize(serializer)
    }
}

/// Projects every row of `engagement` onto `days`, pairing each value with
/// its day index.
pub fn build_user_series(engagement: &MetricTable, days: &[String]) -> Result<SeriesIndex> {
    let columns = days
        .iter()
        .map(|day| {
            engagement.day_position(day).ok_or_else(|| {
                ReachboardError::Join(format!(
                    "day {day:?} is missing from the {} table",
                    engagement.name()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut index = SeriesIndex::default();
    for user in engagement.users() {
        let Some(row) = engagement.row(user) else {
            continue;
        };
        index.by_user.insert(user.clone(), index.series.len());
        index.series.push(UserSeries {
            user: user.clone(),
            index: (0..columns.len()).collect(),
            values: columns.iter().map(|&col| row[col]).collect(),
        });
    }
    Ok(index)
}

use crate::{ReachboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Engagement metrics that have a `time_vs_<metric>.csv` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricName {
    Likes,
    Watches,
    Comments,
}

impl MetricName {
    pub const ALL: [MetricName; 3] = [MetricName::Likes, MetricName::Watches, MetricName::Comments];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Likes => "likes",
            MetricName::Watches => "watches",
            MetricName::Comments => "comments",
        }
    }

    /// Tab title: the metric name with its first letter upper-cased.
    pub fn title(&self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = ReachboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "likes" => Ok(MetricName::Likes),
            "watches" => Ok(MetricName::Watches),
            "comments" => Ok(MetricName::Comments),
            other => Err(ReachboardError::UnknownMetric(other.to_string())),
        }
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Users by days grid of numeric values.
///
/// Rows and columns keep file order; lookups by user or day label go
/// through hash indices so joins never depend on position.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    name: String,
    users: Vec<String>,
    days: Vec<String>,
    values: Vec<Vec<f64>>,
    user_index: HashMap<String, usize>,
    day_index: HashMap<String, usize>,
}

impl MetricTable {
    pub fn new(
        name: impl Into<String>,
        users: Vec<String>,
        days: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let name = name.into();

        if values.len() != users.len() {
            return Err(ReachboardError::malformed(
                &name,
                format!("{} users but {} value rows", users.len(), values.len()),
            ));
        }

        let mut day_index = HashMap::with_capacity(days.len());
        for (col, day) in days.iter().enumerate() {
            if day_index.insert(day.clone(), col).is_some() {
                return Err(ReachboardError::malformed(
                    &name,
                    format!("duplicate day column {day:?}"),
                ));
            }
        }

        let mut user_index = HashMap::with_capacity(users.len());
        for (row, user) in users.iter().enumerate() {
            if user.is_empty() {
                return Err(ReachboardError::malformed(
                    &name,
                    format!("row {} has an empty user identifier", row + 1),
                ));
            }
            if values[row].len() != days.len() {
                return Err(ReachboardError::malformed(
                    &name,
                    format!(
                        "row for {user:?} has {} values, expected {}",
                        values[row].len(),
                        days.len()
                    ),
                ));
            }
            if user_index.insert(user.clone(), row).is_some() {
                return Err(ReachboardError::malformed(
                    &name,
                    format!("duplicate user {user:?}"),
                ));
            }
        }

        Ok(Self {
            name,
            users,
            days,
            values,
            user_index,
            day_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.days.is_empty()
    }

    pub fn row(&self, user: &str) -> Option<&[f64]> {
        self.user_index
            .get(user)
            .map(|&row| self.values[row].as_slice())
    }

    pub fn day_position(&self, day: &str) -> Option<usize> {
        self.day_index.get(day).copied()
    }

    pub fn value(&self, user: &str, day: &str) -> Option<f64> {
        let col = self.day_position(day)?;
        self.row(user).map(|row| row[col])
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// Static group membership of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub user: String,
    pub group: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupTable {
    entries: Vec<GroupEntry>,
    by_user: HashMap<String, usize>,
}

impl GroupTable {
    pub fn new(entries: Vec<GroupEntry>) -> Result<Self> {
        let mut by_user = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_user.insert(entry.user.clone(), idx).is_some() {
                return Err(ReachboardError::malformed(
                    "user_groups",
                    format!("user {:?} is mapped to more than one group", entry.user),
                ));
            }
        }
        Ok(Self { entries, by_user })
    }

    pub fn lookup(&self, user: &str) -> Option<&GroupEntry> {
        self.by_user.get(user).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// Distinct group labels in first-seen order.
    pub fn group_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !labels.contains(&entry.group) {
                labels.push(entry.group.clone());
            }
        }
        labels
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, group: &str, color: &str) -> GroupEntry {
        GroupEntry {
            user: user.into(),
            group: group.into(),
            color: color.into(),
        }
    }

    #[test]
    fn metric_name_parses_case_insensitively() {
        assert_eq!("Likes".parse::<MetricName>().unwrap(), MetricName::Likes);
        assert_eq!(" comments ".parse::<MetricName>().unwrap(), MetricName::Comments);
        assert!(matches!(
            "shares".parse::<MetricName>(),
            Err(ReachboardError::UnknownMetric(_))
        ));
    }

    #[test]
    fn metric_title_is_capitalized() {
        assert_eq!(MetricName::Watches.title(), "Watches");
        assert_eq!(capitalize("lIKES"), "Likes");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn metric_table_looks_up_by_label() {
        let table = MetricTable::new(
            "likes",
            vec!["bob".into(), "alice".into()],
            vec!["d1".into(), "d2".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();

        assert_eq!(table.value("alice", "d2"), Some(4.0));
        assert_eq!(table.row("bob"), Some(&[1.0, 2.0][..]));
        assert_eq!(table.value("carol", "d1"), None);
        assert_eq!(table.value("bob", "d3"), None);
        assert_eq!(table.values().count(), 4);
    }

    #[test]
    fn metric_table_rejects_duplicates_and_ragged_rows() {
        let dup = MetricTable::new(
            "likes",
            vec!["bob".into(), "bob".into()],
            vec!["d1".into()],
            vec![vec![1.0], vec![2.0]],
        );
        assert!(matches!(dup, Err(ReachboardError::Malformed { .. })));

        let ragged = MetricTable::new(
            "likes",
            vec!["bob".into()],
            vec!["d1".into(), "d2".into()],
            vec![vec![1.0]],
        );
        assert!(matches!(ragged, Err(ReachboardError::Malformed { .. })));
    }

    #[test]
    fn group_table_rejects_users_in_two_groups() {
        let result = GroupTable::new(vec![
            entry("alice", "A", "#111"),
            entry("alice", "B", "#222"),
        ]);
        assert!(matches!(result, Err(ReachboardError::Malformed { .. })));
    }

    #[test]
    fn group_labels_are_distinct_in_first_seen_order() {
        let table = GroupTable::new(vec![
            entry("alice", "Fitness", "#111"),
            entry("bob", "Food", "#222"),
            entry("carol", "Fitness", "#111"),
        ])
        .unwrap();
        assert_eq!(table.group_labels(), vec!["Fitness", "Food"]);
        assert_eq!(table.lookup("carol").unwrap().color, "#111");
        assert!(table.lookup("dave").is_none());
    }
}

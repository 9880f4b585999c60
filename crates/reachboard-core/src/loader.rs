use crate::{GroupEntry, GroupTable, MetricName, MetricTable, ReachboardError, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const FOLLOWERS_TABLE: &str = "followers";
pub const POSTS_TABLE: &str = "posts";
pub const GROUPS_FILE: &str = "user_groups.csv";

const GROUP_COLUMN: &str = "Group";
const COLOR_COLUMN: &str = "group_color";

/// Storage the dashboard tables are read from.
///
/// `metric_table` is addressed by table name: an engagement metric
/// (`likes`, `watches`, `comments`), `followers` or `posts`.
pub trait TableSource {
    fn metric_table(&self, name: &str) -> Result<MetricTable>;
    fn group_table(&self) -> Result<GroupTable>;
}

/// A directory of `time_vs_<name>.csv` files plus `user_groups.csv`.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metric_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("time_vs_{name}.csv"))
    }

    pub fn groups_path(&self) -> PathBuf {
        self.root.join(GROUPS_FILE)
    }

    fn open(path: &Path) -> Result<File> {
        if !path.is_file() {
            return Err(ReachboardError::MissingFile(path.display().to_string()));
        }
        Ok(File::open(path)?)
    }
}

impl TableSource for CsvDirectory {
    fn metric_table(&self, name: &str) -> Result<MetricTable> {
        let path = self.metric_path(name);
        debug!(table = name, path = %path.display(), "reading metric table");
        parse_metric_table(name, Self::open(&path)?)
    }

    fn group_table(&self) -> Result<GroupTable> {
        let path = self.groups_path();
        debug!(path = %path.display(), "reading group mapping");
        parse_group_table(Self::open(&path)?)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Parses a users-by-days table. The first column holds the user
/// identifier (its header is ignored); every other header is a day label.
pub fn parse_metric_table<R: Read>(name: &str, reader: R) -> Result<MetricTable> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(ReachboardError::malformed(name, "missing header row"));
    }
    let days: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut users = Vec::new();
    let mut values = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let user = record.get(0).unwrap_or_default().to_string();
        let mut row = Vec::with_capacity(days.len());
        for (day, field) in days.iter().zip(record.iter().skip(1)) {
            let value = field.parse::<f64>().map_err(|_| {
                ReachboardError::malformed(
                    name,
                    format!("value {field:?} for user {user:?} on {day:?} is not a number"),
                )
            })?;
            if value.is_nan() {
                return Err(ReachboardError::malformed(
                    name,
                    format!("missing value for user {user:?} on {day:?}"),
                ));
            }
            row.push(value);
        }
        users.push(user);
        values.push(row);
    }

    MetricTable::new(name, users, days, values)
}

/// Parses the user-to-group mapping: the first column is the user
/// identifier, `Group` and `group_color` are located by header name.
pub fn parse_group_table<R: Read>(reader: R) -> Result<GroupTable> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let column = |wanted: &str| {
        headers.iter().position(|h| h == wanted).ok_or_else(|| {
            ReachboardError::malformed("user_groups", format!("missing column {wanted:?}"))
        })
    };
    let group_col = column(GROUP_COLUMN)?;
    let color_col = column(COLOR_COLUMN)?;
    if group_col == 0 || color_col == 0 {
        return Err(ReachboardError::malformed(
            "user_groups",
            "first column must hold the user identifier",
        ));
    }

    let mut entries = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let entry = GroupEntry {
            user: field(0),
            group: field(group_col),
            color: field(color_col),
        };
        if entry.user.is_empty() || entry.group.is_empty() || entry.color.is_empty() {
            return Err(ReachboardError::malformed(
                "user_groups",
                format!("row {} has an empty user, group or color", line + 1),
            ));
        }
        entries.push(entry);
    }

    GroupTable::new(entries)
}

/// Everything one metric tab is built from.
#[derive(Debug, Clone)]
pub struct MetricData {
    pub metric: MetricName,
    pub engagement: MetricTable,
    pub followers: MetricTable,
    pub posts: MetricTable,
    pub groups: GroupTable,
    /// Day labels in the engagement table's column order.
    pub days: Vec<String>,
    pub group_labels: Vec<String>,
}

/// Loads the four tables behind one metric. Any missing or malformed
/// table fails the whole metric.
pub fn load_metric<S: TableSource + ?Sized>(source: &S, metric: MetricName) -> Result<MetricData> {
    let engagement = source.metric_table(metric.as_str())?;
    let followers = source.metric_table(FOLLOWERS_TABLE)?;
    let posts = source.metric_table(POSTS_TABLE)?;
    let groups = source.group_table()?;

    let days = engagement.days().to_vec();
    let group_labels = groups.group_labels();

    info!(
        metric = %metric,
        users = engagement.users().len(),
        days = days.len(),
        groups = group_labels.len(),
        "loaded metric tables"
    );

    Ok(MetricData {
        metric,
        engagement,
        followers,
        posts,
        groups,
        days,
        group_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIKES: &str = ",2020-01-01,2020-01-02\nalice,1.5,2.5\nbob,3,4\n";

    #[test]
    fn parses_metric_table_with_blank_index_header() {
        let table = parse_metric_table("likes", LIKES.as_bytes()).unwrap();
        assert_eq!(table.days(), ["2020-01-01", "2020-01-02"]);
        assert_eq!(table.users(), ["alice", "bob"]);
        assert_eq!(table.value("bob", "2020-01-02"), Some(4.0));
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let csv = ",d1\nalice,lots\n";
        let err = parse_metric_table("likes", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReachboardError::Malformed { .. }));
        assert!(err.to_string().contains("lots"));
    }

    #[test]
    fn rejects_empty_cells() {
        let csv = ",d1,d2\nalice,1,\n";
        assert!(parse_metric_table("likes", csv.as_bytes()).is_err());
    }

    #[test]
    fn rejects_short_rows() {
        let csv = ",d1,d2\nalice,1\n";
        assert!(matches!(
            parse_metric_table("likes", csv.as_bytes()),
            Err(ReachboardError::Csv(_))
        ));
    }

    #[test]
    fn parses_group_table_by_header_name() {
        let csv = "user,group_color,Group\nalice,#ff0000,Fitness\nbob,#00ff00,Food\n";
        let table = parse_group_table(csv.as_bytes()).unwrap();
        let alice = table.lookup("alice").unwrap();
        assert_eq!(alice.group, "Fitness");
        assert_eq!(alice.color, "#ff0000");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn group_table_requires_both_columns() {
        let csv = "user,Group\nalice,Fitness\n";
        let err = parse_group_table(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("group_color"));
    }

    #[test]
    fn missing_directory_file_is_reported_by_path() {
        let dir = CsvDirectory::new("/nonexistent/reachboard");
        let err = dir.metric_table("likes").unwrap_err();
        match err {
            ReachboardError::MissingFile(path) => assert!(path.ends_with("time_vs_likes.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}

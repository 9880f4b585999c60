use axum_test::TestServer;
use reachboard_api::{create_router, AppState};
use reachboard_core::{
    GroupEntry, GroupTable, MetricName, MetricTable, ReachboardConfig, ReachboardError, Result,
    TableSource,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Tables held in memory, keyed by table name.
struct InMemorySource {
    tables: HashMap<String, MetricTable>,
    groups: Vec<GroupEntry>,
}

impl InMemorySource {
    fn two_users() -> Self {
        let days = vec!["mon".to_string(), "tue".to_string()];
        let users = vec!["zoe".to_string(), "yan".to_string()];
        let mut tables = HashMap::new();
        for (name, values) in [
            ("likes", vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
            ("followers", vec![vec![150.0, 300.0], vec![450.0, 600.0]]),
            ("posts", vec![vec![1.0, 2.0], vec![3.0, 4.0]]),
        ] {
            let table = MetricTable::new(name, users.clone(), days.clone(), values).unwrap();
            tables.insert(name.to_string(), table);
        }
        let groups = [("zoe", "Travel", "#99d594"), ("yan", "Food", "#3288bd")]
            .iter()
            .map(|(user, group, color)| GroupEntry {
                user: user.to_string(),
                group: group.to_string(),
                color: color.to_string(),
            })
            .collect();
        Self { tables, groups }
    }
}

impl TableSource for InMemorySource {
    fn metric_table(&self, name: &str) -> Result<MetricTable> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| ReachboardError::MissingFile(format!("in-memory table {name}")))
    }

    fn group_table(&self) -> Result<GroupTable> {
        GroupTable::new(self.groups.clone())
    }
}

fn write_fixture(root: &Path) {
    let days = ",2020-01-01,2020-01-02\n";
    let files = [
        ("time_vs_likes.csv", "alice,1,2\nbob,3,4\n"),
        ("time_vs_watches.csv", "alice,10,20\nbob,30,40\n"),
        ("time_vs_comments.csv", "alice,0.1,0.2\nbob,0.3,0.4\n"),
        ("time_vs_followers.csv", "bob,300,300\nalice,150,300\n"),
        ("time_vs_posts.csv", "alice,5,6\nbob,7,8\n"),
    ];
    for (name, rows) in files {
        std::fs::write(root.join(name), format!("{days}{rows}")).expect("write fixture");
    }
    std::fs::write(
        root.join("user_groups.csv"),
        "user,Group,group_color\nalice,Fitness,#d53e4f\nbob,Food,#3288bd\n",
    )
    .expect("write groups");
}

fn server_for(data_dir: &Path) -> TestServer {
    let mut config = ReachboardConfig::default();
    config.data.data_dir = data_dir.to_path_buf();
    let state = AppState::new(Arc::new(config));
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = server_for(dir.path());

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn dashboard_page_serves_html() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let server = server_for(dir.path());

    let resp = server.get("/").await;
    assert_eq!(resp.status_code(), 200);
    let ct = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(ct.contains("text/html"), "expected HTML content-type");

    let body = resp.text();
    assert!(body.contains("<div class=\"reachboard\""));
    assert!(body.contains("Reachboard.mount("));
    for title in ["Likes", "Watches", "Comments"] {
        assert!(body.contains(&format!("\"title\":\"{title}\"")));
    }
}

#[tokio::test]
async fn dashboard_json_respects_metric_query() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let server = server_for(dir.path());

    let resp = server
        .get("/api/dashboard")
        .add_query_param("metrics", "comments,likes")
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: serde_json::Value = resp.json();
    let tabs = body["tabs"].as_array().unwrap();
    assert_eq!(tabs.len(), 2);
    assert_eq!(tabs[0]["title"], "Comments");
    assert_eq!(tabs[1]["title"], "Likes");

    let likes = &tabs[1]["chart"];
    assert_eq!(likes["metric"], serde_json::json!(MetricName::Likes));
    assert_eq!(likes["frames"][1]["key"], "_1");
    assert_eq!(likes["frames"][1]["values"], serde_json::json!([2.0, 4.0]));
    assert_eq!(likes["frames"][0]["followers_scaled"], serde_json::json!([1.0, 2.0]));
    assert_eq!(likes["trajectory"]["source"], "alice");
    assert_eq!(likes["slider"]["end"], 1);
}

#[tokio::test]
async fn unknown_metric_is_a_bad_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    let server = server_for(dir.path());

    let resp = server
        .get("/api/dashboard")
        .add_query_param("metrics", "shares")
        .expect_failure()
        .await;
    assert_eq!(resp.status_code(), 400);
    let body: serde_json::Value = resp.json();
    assert!(body["error"].as_str().unwrap().contains("shares"));
}

#[tokio::test]
async fn missing_data_fails_the_whole_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture(dir.path());
    std::fs::remove_file(dir.path().join("time_vs_watches.csv")).unwrap();
    let server = server_for(dir.path());

    let resp = server.get("/").expect_failure().await;
    assert_eq!(resp.status_code(), 500);
    let body: serde_json::Value = resp.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("time_vs_watches.csv"));
}

#[tokio::test]
async fn dashboard_reads_from_any_table_source() {
    let mut config = ReachboardConfig::default();
    config.data.metrics = vec![MetricName::Likes];
    let state = AppState::with_source(Arc::new(config), Arc::new(InMemorySource::two_users()));
    let server = TestServer::new(create_router(state)).unwrap();

    let resp = server.get("/api/dashboard").await;
    assert_eq!(resp.status_code(), 200);
    let body: serde_json::Value = resp.json();
    let chart = &body["tabs"][0]["chart"];
    assert_eq!(chart["trajectory"]["source"], "yan");
    assert_eq!(chart["frames"][1]["day"], "tue");
    assert_eq!(chart["frames"][1]["followers_scaled"], serde_json::json!([2.0, 4.0]));

    let resp = server
        .get("/api/dashboard")
        .add_query_param("metrics", "watches")
        .expect_failure()
        .await;
    assert_eq!(resp.status_code(), 500);
    let body: serde_json::Value = resp.json();
    assert!(body["error"].as_str().unwrap().contains("watches"));
}

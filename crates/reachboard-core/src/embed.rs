//! Embeddable markup for a [`Dashboard`]: a script fragment carrying the
//! dashboard description plus the client runtime, and the div it mounts into.

use crate::{Dashboard, Result};
use uuid::Uuid;

const CLIENT_RUNTIME: &str = include_str!("../assets/reachboard.js");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    pub script: String,
    pub div: String,
}

/// Serializes `dashboard` into a script fragment and a mount-point div that
/// share a freshly generated element id.
pub fn components(dashboard: &Dashboard) -> Result<Components> {
    let id = Uuid::new_v4().simple().to_string();
    let payload = script_safe_json(&serde_json::to_string(dashboard)?);

    let script = format!(
        r#"<script type="application/json" id="reachboard-data-{id}">{payload}</script>
<script type="text/javascript">
{runtime}
Reachboard.mount("reachboard-root-{id}", "reachboard-data-{id}");
</script>"#,
        runtime = CLIENT_RUNTIME,
    );
    let div = format!(r#"<div class="reachboard" id="reachboard-root-{id}"></div>"#);

    Ok(Components { script, div })
}

/// JSON escapes `/` as `\/`, so replacing `</` keeps a `</script>` inside
/// a string from closing the data block while leaving the JSON equivalent.
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

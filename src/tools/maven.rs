//! Parser for `mvn dependency:tree`
//!
//! ```text
//! [INFO] com.example:app:jar:1.0-SNAPSHOT
//! [INFO] +- org.springframework:spring-web:jar:6.1.0:compile
//! [INFO] |  \- (org.yaml:snakeyaml:jar:2.0:compile - omitted for conflict with 2.2)
//! [INFO] \- junit:junit:jar:4.13.2:test
//! ```

use super::{ResolvedNode, ToolFindings};
use crate::domain::Scope;
use regex::Regex;
use std::sync::LazyLock;

// `[INFO] ` / `[WARNING] ` log prefix
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[A-Z]+\]\s?").unwrap());

// a project line: group:artifact:packaging:version
static ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\-]+:[\w.\-]+:[\w\-]+(?::[\w.\-]+)?:[\w.\-+]+$").unwrap());

static CONFLICT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"omitted for conflict with ([\w.\-+]+)").unwrap());

/// Tree marker (`+- ` or `\- `) position and the text after it
fn split_marker(line: &str) -> Option<(usize, &str)> {
    ["+- ", "\\- "]
        .iter()
        .filter_map(|marker| line.find(marker).map(|pos| (pos, &line[pos + marker.len()..])))
        .min_by_key(|(pos, _)| *pos)
}

struct Artifact {
    coordinate: String,
    version: String,
    scope: Option<Scope>,
}

/// `g:a:type[:classifier]:version[:scope]`
fn parse_artifact(text: &str) -> Option<Artifact> {
    let parts: Vec<&str> = text.split(':').collect();
    let (version, scope) = match parts.len() {
        4 => (parts[3], None),
        5 => (parts[3], Some(parts[4])),
        6 => (parts[4], Some(parts[5])),
        _ => return None,
    };
    Some(Artifact {
        coordinate: format!("{}:{}", parts[0], parts[1]),
        version: version.to_string(),
        scope: scope.map(Scope::from_label),
    })
}

pub(super) fn parse_tree(output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    // coordinates of the current path from the project root
    let mut stack: Vec<String> = Vec::new();
    let mut in_tree = false;

    for raw in output.lines() {
        let line = LEVEL_RE.replace(raw, "");
        let line = line.trim_end();

        if ROOT_RE.is_match(line) {
            stack.clear();
            stack.push(String::new());
            in_tree = true;
            continue;
        }
        if !in_tree {
            continue;
        }
        let Some((pos, body)) = split_marker(line) else {
            // anything else ends the current module's tree
            in_tree = false;
            continue;
        };
        let depth = pos / 3 + 1;

        let (body, omitted) = match body.strip_prefix('(') {
            Some(inner) => (inner.trim_end_matches(')'), true),
            None => (body, false),
        };
        let (artifact_text, note) = match body.split_once(" - ") {
            Some((a, n)) => (a, Some(n)),
            None => (body, None),
        };
        // drop trailing annotations such as `(version managed from 1.0)`
        let artifact_text = artifact_text.split_whitespace().next().unwrap_or_default();
        let Some(artifact) = parse_artifact(artifact_text) else {
            continue;
        };

        stack.truncate(depth);
        if let Some(parent) = stack.last().filter(|p| !p.is_empty()) {
            findings.push_edge(parent, &artifact.coordinate);
        }

        let conflict_winner = note.and_then(|n| CONFLICT_RE.captures(n)).map(|c| c[1].to_string());
        let mut node = match conflict_winner {
            Some(winner) => ResolvedNode::new(&artifact.coordinate, Some(winner)).evicting(&artifact.version),
            // duplicates and cycles repeat a node resolved elsewhere
            None if omitted => {
                stack.push(artifact.coordinate);
                continue;
            }
            None => ResolvedNode::new(&artifact.coordinate, Some(artifact.version.clone())),
        };
        node.scope = artifact.scope;
        node.direct = depth == 1;
        findings.nodes.push(node);
        stack.push(artifact.coordinate);
    }
    findings
}

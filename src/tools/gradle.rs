//! Parsers for `gradle dependencies` and `gradle dependencyInsight`

use super::{ResolvedNode, ToolFindings};
use crate::domain::Scope;
use regex::Regex;
use std::sync::LazyLock;

// `runtimeClasspath - Runtime classpath of source set 'main'.`
static CONFIGURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][\w]*)(?: - .*)?$").unwrap());

// `com.google.guava:guava:31.0-jre -> 32.1.3-jre` at column 0 of an insight report
static INSIGHT_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w.\-]+):([\w.\-]+):([^\s()]+)(?: -> ([^\s()]+))?").unwrap()
});

static BETWEEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"between versions (.+)$").unwrap());

/// Scope for a resolvable configuration; `None` for ones that carry no artifacts
fn configuration_scope(name: &str) -> Option<Scope> {
    let lower = name.to_ascii_lowercase();
    if lower.contains("test") {
        return Some(Scope::Test);
    }
    match lower.as_str() {
        "compileclasspath" | "implementation" | "api" | "default" => Some(Scope::Compile),
        "runtimeclasspath" | "runtimeonly" | "runtimeelements" => Some(Scope::Runtime),
        "compileonly" | "annotationprocessor" | "kapt" => Some(Scope::Provided),
        _ if lower.ends_with("classpath") => Some(Scope::from_label(name)),
        _ => None,
    }
}

/// Tree marker (`+--- ` or `\--- `) position and the text after it
fn split_marker(line: &str) -> Option<(usize, &str)> {
    ["+--- ", "\\--- "]
        .iter()
        .filter_map(|marker| line.find(marker).map(|pos| (pos, &line[pos + marker.len()..])))
        .min_by_key(|(pos, _)| *pos)
}

struct Entry {
    coordinate: String,
    requested: Option<String>,
    selected: Option<String>,
    constraint: bool,
}

/// `g:a:1.0`, `g:a -> 1.0`, `g:a:1.0 -> 2.0 (*)`, `g:a:{strictly 1.0} -> 1.0 (c)`
fn parse_entry(body: &str) -> Option<Entry> {
    if body.starts_with("project ") {
        return None;
    }
    let constraint = body.ends_with("(c)");
    let body = body
        .trim_end_matches("(*)")
        .trim_end_matches("(c)")
        .trim_end_matches("(n)")
        .trim_end_matches("FAILED")
        .trim();

    let (left, selected) = match body.split_once(" -> ") {
        Some((l, r)) => (l.trim(), Some(r.trim().to_string())),
        None => (body, None),
    };
    let mut parts = left.splitn(3, ':');
    let group = parts.next()?;
    let artifact = parts.next()?;
    let requested = parts
        .next()
        .map(|v| v.trim_start_matches('{').trim_end_matches('}'))
        .map(|v| v.trim_start_matches("strictly ").trim_start_matches("prefer ").trim().to_string())
        .filter(|v| !v.is_empty());

    Some(Entry {
        coordinate: format!("{}:{}", group, artifact),
        requested,
        selected,
        constraint,
    })
}

pub(super) fn parse_dependencies(output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    let mut scope: Option<Scope> = None;
    // coordinates along the current branch; `None` marks a project node
    let mut stack: Vec<Option<String>> = Vec::new();

    for line in output.lines() {
        let trimmed = line.trim_end();
        let Some((pos, body)) = split_marker(trimmed) else {
            if let Some(caps) = CONFIGURATION_RE.captures(trimmed) {
                scope = configuration_scope(&caps[1]);
                stack.clear();
            }
            continue;
        };
        let Some(scope) = scope else {
            continue;
        };
        let depth = pos / 5 + 1;
        stack.truncate(depth - 1);

        let entry = parse_entry(body);
        let parent = stack.last().cloned().flatten();

        match entry {
            Some(entry) if !entry.constraint => {
                if let Some(parent) = &parent {
                    findings.push_edge(parent, &entry.coordinate);
                }
                let mut node = match (&entry.requested, &entry.selected) {
                    (Some(requested), Some(selected)) if requested != selected => {
                        ResolvedNode::new(&entry.coordinate, Some(selected.clone())).evicting(requested)
                    }
                    _ => ResolvedNode::new(
                        &entry.coordinate,
                        entry.selected.clone().or_else(|| entry.requested.clone()),
                    ),
                };
                node.scope = Some(scope);
                node.direct = depth == 1;
                findings.nodes.push(node);
                stack.push(Some(entry.coordinate));
            }
            Some(entry) => stack.push(Some(entry.coordinate)),
            None => stack.push(None),
        }
    }
    findings
}

/// Parses a `dependencyInsight` report for one coordinate
pub(super) fn parse_insight(target: &str, output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    let mut selected: Option<String> = None;
    let mut coordinate: Option<String> = None;
    let mut requested: Vec<String> = Vec::new();
    let mut between: Vec<String> = Vec::new();

    for line in output.lines() {
        if let Some(caps) = INSIGHT_HEAD_RE.captures(line) {
            let found = format!("{}:{}", &caps[1], &caps[2]);
            let matches_target = if target.contains(':') {
                found == target
            } else {
                found.ends_with(&format!(":{}", target))
            };
            if !matches_target {
                continue;
            }
            let version = caps[3].to_string();
            match caps.get(4) {
                Some(winner) => {
                    selected.get_or_insert_with(|| winner.as_str().to_string());
                    requested.push(version);
                }
                None => {
                    selected.get_or_insert(version);
                }
            }
            coordinate.get_or_insert(found);
        } else if let Some(caps) = BETWEEN_RE.captures(line) {
            between.extend(
                caps[1]
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|v| !v.is_empty() && *v != "and")
                    .map(str::to_string),
            );
        }
    }

    let Some(coordinate) = coordinate else {
        return findings;
    };
    let mut node = ResolvedNode::new(coordinate, selected.clone());
    for version in requested.into_iter().chain(between) {
        if Some(&version) != selected.as_ref() {
            node = node.evicting(version);
        }
    }
    findings.nodes.push(node);
    findings
}

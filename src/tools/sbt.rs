//! Parsers for `sbt dependencyTree` and `sbt evicted`

use super::{strip_scala_suffix, ResolvedNode, ToolFindings};
use regex::Regex;
use std::sync::LazyLock;

// `[info] ` / `[warn] ` log prefix
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[a-z]+\]\s?").unwrap());

// org:name:version at the start of a tree entry
static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.\-]+):([\w.\-]+):([\w.\-+]+)").unwrap());

static EVICTED_BY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(evicted by: ([\w.\-+]+)\)").unwrap());

// `* com.typesafe:config:1.4.2 is selected over 1.3.0` / `over {1.2.0, 1.3.0}`
static SELECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\s+([\w.\-]+):([\w.\-]+):(\S+) is selected over \{?([^}]+)\}?").unwrap()
});

fn coordinate(org: &str, name: &str) -> String {
    format!("{}:{}", org, strip_scala_suffix(name))
}

pub(super) fn parse_tree(output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    let mut stack: Vec<String> = Vec::new();
    let mut in_tree = false;

    for raw in output.lines() {
        let line = LEVEL_RE.replace(raw, "");
        let line = line.trim_end();

        let Some(pos) = line.find("+-") else {
            if line.trim_start_matches(['|', ' ']).is_empty() {
                continue;
            }
            // a module line at column 0 starts a project's tree
            in_tree = MODULE_RE.is_match(line);
            stack.clear();
            continue;
        };
        if !in_tree {
            continue;
        }
        let body = &line[pos + 2..];
        let Some(caps) = MODULE_RE.captures(body) else {
            continue;
        };
        let depth = pos / 2;
        let coord = coordinate(&caps[1], &caps[2]);
        let version = caps[3].to_string();

        stack.truncate(depth.saturating_sub(1));
        if let Some(parent) = stack.last() {
            findings.push_edge(parent, &coord);
        }

        let mut node = match EVICTED_BY_RE.captures(body) {
            Some(winner) => ResolvedNode::new(&coord, Some(winner[1].to_string())).evicting(version),
            None => ResolvedNode::new(&coord, Some(version)),
        };
        node.direct = depth == 1;
        findings.nodes.push(node);
        stack.push(coord);
    }
    findings
}

pub(super) fn parse_evicted(output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    for raw in output.lines() {
        let line = LEVEL_RE.replace(raw, "");
        let Some(caps) = SELECTED_RE.captures(&line) else {
            continue;
        };
        let mut node = ResolvedNode::new(coordinate(&caps[1], &caps[2]), Some(caps[3].to_string()));
        for evicted in caps[4].split(',').map(str::trim).filter(|v| !v.is_empty()) {
            node = node.evicting(evicted);
        }
        findings.nodes.push(node);
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "[info] welcome to sbt 1.9.7 (Eclipse Adoptium Java 17.0.9)
[info] loading settings for project app-build from plugins.sbt ...
[info] com.example:app_2.13:0.1.0-SNAPSHOT [S]
[info]   +-com.typesafe.akka:akka-actor_2.13:2.6.20 [S]
[info]   | +-com.typesafe:config:1.4.2
[info]   |
[info]   +-com.typesafe:config:1.3.0 (evicted by: 1.4.2)
[info]   +-org.typelevel:cats-core_2.13:2.9.0 [S]
[info]     +-org.typelevel:cats-kernel_2.13:2.9.0 [S]
[info]
[success] Total time: 3 s, completed Jan 10, 2024
";

    #[test]
    fn test_parse_tree() {
        let findings = parse_tree(TREE);
        let coords: Vec<&str> = findings.nodes.iter().map(|n| n.coordinate.as_str()).collect();
        assert_eq!(
            coords,
            vec![
                "com.typesafe.akka:akka-actor",
                "com.typesafe:config",
                "com.typesafe:config",
                "org.typelevel:cats-core",
                "org.typelevel:cats-kernel",
            ]
        );
        assert!(findings.nodes[0].direct);
        assert!(!findings.nodes[1].direct);
        let evicted = &findings.nodes[2];
        assert!(evicted.direct);
        assert_eq!(evicted.version.as_deref(), Some("1.4.2"));
        assert_eq!(evicted.evicted_versions, vec!["1.3.0"]);
        assert!(findings.edges.iter().any(|e| e.from == "org.typelevel:cats-core"
            && e.to == "org.typelevel:cats-kernel"));
        assert!(findings.edges.iter().any(|e| e.from == "com.typesafe.akka:akka-actor"
            && e.to == "com.typesafe:config"));
    }

    #[test]
    fn test_parse_evicted() {
        let output = "[warn] Found version conflict(s) in library dependencies; some are suspected to be binary incompatible:
[warn] \t* com.typesafe:config:1.4.2 is selected over 1.3.0
[warn] \t    +- com.typesafe.akka:akka-actor_2.13:2.6.20  (depends on 1.4.2)
[info] Here are other dependency conflicts that were resolved:
[info] \t* org.scala-lang.modules:scala-xml_2.13:2.1.0 is selected over {1.2.0, 1.3.0}
";
        let findings = parse_evicted(output);
        assert_eq!(findings.nodes.len(), 2);
        assert_eq!(findings.nodes[0].coordinate, "com.typesafe:config");
        assert_eq!(findings.nodes[0].evicted_versions, vec!["1.3.0"]);
        assert_eq!(findings.nodes[1].coordinate, "org.scala-lang.modules:scala-xml");
        assert_eq!(findings.nodes[1].evicted_versions, vec!["1.2.0", "1.3.0"]);
        assert!(findings.nodes[1].conflict);
    }
}

//! Parsers for `go list -m -json all` and `go mod graph`

use super::{ResolvedNode, ToolFindings};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoModule {
    path: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    main: bool,
    #[serde(default)]
    indirect: bool,
    #[serde(default)]
    replace: Option<GoReplace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoReplace {
    path: String,
    #[serde(default)]
    version: Option<String>,
}

/// Parses the concatenated JSON objects printed by `go list -m -json all`
pub(super) fn parse_list(output: &str) -> Result<ToolFindings, String> {
    let mut findings = ToolFindings::default();
    let stream = serde_json::Deserializer::from_str(output).into_iter::<GoModule>();

    for module in stream {
        let module = module.map_err(|e| e.to_string())?;
        if module.main {
            continue;
        }
        let mut node = ResolvedNode::new(module.path, module.version);
        node.direct = !module.indirect;
        node.replaced_by = module.replace.map(|r| match r.version {
            Some(v) if !v.is_empty() => format!("{}@{}", r.path, v),
            _ => r.path,
        });
        findings.nodes.push(node);
    }
    Ok(findings)
}

fn module_path(entry: &str) -> &str {
    entry.split('@').next().unwrap_or(entry)
}

/// Parses `go mod graph` edges (`parent@v child@v`); the main module has no version
pub(super) fn parse_graph(output: &str) -> ToolFindings {
    let mut findings = ToolFindings::default();
    for line in output.lines() {
        let mut parts = line.split_whitespace();
        let (Some(parent), Some(child)) = (parts.next(), parts.next()) else {
            continue;
        };
        // edges out of the main module are the direct requirements
        if !parent.contains('@') {
            continue;
        }
        // the go toolchain pseudo-modules are not dependencies
        if matches!(module_path(child), "go" | "toolchain") {
            continue;
        }
        findings.push_edge(module_path(parent), module_path(child));
    }
    findings.edges.sort();
    findings.edges.dedup();
    findings
}

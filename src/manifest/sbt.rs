//! SBT build definition parsers
//!
//! Handles:
//! - `"org" % "name" % "version"` module IDs, with `%%` / `%%%` cross-built names
//! - configurations: `% Test`, `% "test"`, `% Provided`, `% "compile->compile;test->test"`
//! - `val akkaVersion = "2.8.5"` references, including `Versions.akka` paths
//! - `exclude("org", "name")` and `ExclusionRule(...)` on the same module
//! - `addSbtPlugin(...)` in project/plugins.sbt
//! - `sbt.version` from project/build.properties

use crate::domain::{DeclaredDependency, Ecosystem, ManifestFormat, ManifestMetadata, Scope};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::parse_declared;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Parser for build.sbt and project/plugins.sbt
pub struct SbtParser {
    format: ManifestFormat,
}

/// Parser for project/build.properties
pub struct SbtBuildPropertiesParser;

// "org" %% "name" % "1.0" [% Test]
static MODULE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""([^"]+)"\s*(%%%|%%|%)\s*"([^"]+)"\s*%\s*(?:"([^"]+)"|([\w.]+))(?:\s*%\s*(?:"([^"]+)"|([A-Z]\w*)))?"#,
    )
    .unwrap()
});

// val akkaVersion = "2.8.5" / lazy val x = "..." / final val x = "..."
static VAL_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:(?:lazy|final|private)\s+)*val\s+(\w+)(?:\s*:\s*String)?\s*=\s*"([^"]+)""#)
        .unwrap()
});

static ADD_PLUGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*addSbtPlugin\s*\(").unwrap());

static EXCLUDE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"exclude\s*\(\s*"([^"]+)"\s*,\s*"([^"]+)"\s*\)"#).unwrap());

static EXCLUSION_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ExclusionRule\s*\(([^)]*)\)").unwrap());

static EXCLUSION_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:(organization|name)\s*=\s*)?"([^"]+)""#).unwrap()
});

static SETTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:ThisBuild\s*/\s*)?(scalaVersion|organization|name|version|sbtVersion)\s*:=\s*"([^"]+)""#)
        .unwrap()
});

static STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""[^"]*""#).unwrap());

impl SbtParser {
    /// Parser for build.sbt
    pub fn build() -> Self {
        Self {
            format: ManifestFormat::Sbt,
        }
    }

    /// Parser for project/plugins.sbt
    pub fn plugins() -> Self {
        Self {
            format: ManifestFormat::SbtPlugins,
        }
    }

    fn extract_variables(&self, content: &str) -> HashMap<String, String> {
        content
            .lines()
            .filter_map(|line| VAL_DEF.captures(strip_comment(line)))
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect()
    }

    /// Confirms every `(` opened outside a string literal is closed
    fn check_balance(&self, content: &str) -> Result<(), ManifestError> {
        let mut open: Vec<usize> = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let code = STRING_LITERAL.replace_all(strip_comment(line), "\"\"");
            for c in code.chars() {
                match c {
                    '(' => open.push(idx + 1),
                    ')' => {
                        if open.pop().is_none() {
                            return Err(ManifestError::line_error(
                                self.format.label(),
                                idx + 1,
                                "unbalanced ')'",
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        match open.first() {
            Some(line) => Err(ManifestError::line_error(
                self.format.label(),
                *line,
                "unclosed '('",
            )),
            None => Ok(()),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    // `//` inside a URL string is not a comment
    let mut in_string = false;
    let bytes = line.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'/' if !in_string && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            _ => {}
        }
    }
    line
}

fn exclusions_in(line: &str) -> Vec<String> {
    let mut exclusions: Vec<String> = EXCLUDE_CALL
        .captures_iter(line)
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
        .collect();

    for rule in EXCLUSION_RULE.captures_iter(line) {
        let mut organization = "*".to_string();
        let mut name = "*".to_string();
        for (position, field) in EXCLUSION_FIELD.captures_iter(&rule[1]).enumerate() {
            let key = field.get(1).map(|m| m.as_str());
            match (key, position) {
                (Some("name"), _) | (None, 1) => name = field[2].to_string(),
                _ => organization = field[2].to_string(),
            }
        }
        exclusions.push(format!("{}:{}", organization, name));
    }

    exclusions
}

impl ManifestParser for SbtParser {
    fn format(&self) -> ManifestFormat {
        self.format
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        self.check_balance(content)?;
        let variables = self.extract_variables(content);
        let mut dependencies = Vec::new();
        let mut in_block_comment = false;

        for (idx, raw_line) in content.lines().enumerate() {
            let trimmed = raw_line.trim();
            if in_block_comment {
                in_block_comment = !trimmed.contains("*/");
                continue;
            }
            if trimmed.starts_with("/*") {
                in_block_comment = !trimmed.contains("*/");
                continue;
            }

            let line = strip_comment(raw_line);
            let is_plugin =
                ADD_PLUGIN.is_match(line) || self.format == ManifestFormat::SbtPlugins;

            for caps in MODULE_ID.captures_iter(line) {
                let organization = &caps[1];
                let name = &caps[3];
                let version = match (caps.get(4), caps.get(5)) {
                    (Some(literal), _) => literal.as_str().to_string(),
                    (None, Some(reference)) => {
                        let path = reference.as_str();
                        let key = path.rsplit('.').next().unwrap_or(path);
                        variables
                            .get(path)
                            .or_else(|| variables.get(key))
                            .cloned()
                            .unwrap_or_else(|| format!("${{{}}}", path))
                    }
                    (None, None) => String::new(),
                };
                let configuration = caps
                    .get(6)
                    .or_else(|| caps.get(7))
                    .map(|m| m.as_str().to_string());

                let (scope, group) = if is_plugin {
                    (Scope::Plugin, "plugin".to_string())
                } else {
                    match configuration {
                        Some(config) => {
                            // "compile->compile;test->test" maps by its first target
                            let primary = config
                                .split([';', '-'])
                                .next()
                                .unwrap_or(&config)
                                .trim()
                                .to_string();
                            (Scope::from_label(&primary), config)
                        }
                        None => (Scope::Compile, "compile".to_string()),
                    }
                };

                let dep = DeclaredDependency::new(
                    format!("{}:{}", organization, name),
                    Ecosystem::Sbt,
                    scope,
                )
                .with_version(parse_declared(Ecosystem::Sbt, Some(&version)))
                .with_group(group)
                .with_exclusions(exclusions_in(line))
                .at_line(idx + 1);
                dependencies.push(dep);
            }
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        for line in content.lines() {
            let line = strip_comment(line);
            if let Some(caps) = SETTING.captures(line) {
                meta.facts.insert(caps[1].to_string(), caps[2].to_string());
            }
            for caps in MODULE_ID.captures_iter(line) {
                if &caps[2] != "%" {
                    meta.facts
                        .insert(format!("cross:{}:{}", &caps[1], &caps[3]), caps[2].to_string());
                }
            }
        }
        meta
    }
}

impl ManifestParser for SbtBuildPropertiesParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::SbtBuildProperties
    }

    fn parse(&self, _content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        Ok(Vec::new())
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            if let Some((key, value)) = line.split_once(['=', ':']) {
                if key.trim() == "sbt.version" {
                    meta.facts
                        .insert("sbt.version".to_string(), value.trim().to_string());
                }
            }
        }
        meta
    }
}

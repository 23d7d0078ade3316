//! pyproject.toml parser
//!
//! Supports:
//! - project.dependencies (PEP 621)
//! - project.optional-dependencies (PEP 621)
//! - dependency-groups (PEP 735)
//! - build-system.requires
//! - tool.poetry.dependencies / dev-dependencies / group.*.dependencies
//! - tool.uv.dev-dependencies and tool.uv.sources
//! - tool.pdm.dev-dependencies

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::requirements::{normalize_name, parse_requirement, reference_origin};
use crate::manifest::{parse_toml, ManifestParser};
use crate::parser::parse_declared;
use toml::{Table, Value};

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

/// Scope for an optional-dependency extra or a dependency group name
fn group_scope(group: &str) -> Scope {
    match Scope::from_label(group) {
        scope @ (Scope::Test | Scope::Dev) => scope,
        _ => Scope::Optional,
    }
}

/// Reads an array of PEP 508 strings; table entries (`{include-group = ...}`) are skipped
fn read_pep508_array(
    value: Option<&Value>,
    scope: Scope,
    group: &str,
    out: &mut Vec<DeclaredDependency>,
) -> Result<(), ManifestError> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Ok(());
    };
    for item in items {
        let Some(text) = item.as_str() else {
            continue;
        };
        let requirement = parse_requirement(text).ok_or_else(|| {
            ManifestError::toml_parse_error(
                "pyproject.toml",
                format!("invalid requirement '{}' in {}", text, group),
            )
        })?;
        out.push(requirement.into_declaration(scope).with_group(group));
    }
    Ok(())
}

/// One entry of a Poetry dependency table
fn poetry_dependency(name: &str, value: &Value, scope: Scope, group: &str) -> DeclaredDependency {
    // multiple-constraint form: [{ version = "...", python = "..." }, ...]
    let value = match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    };

    let mut scope = scope;
    let mut origin = DependencyOrigin::Registry;
    let version = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Table(t) => {
            if t.get("optional").and_then(Value::as_bool) == Some(true) && scope == Scope::Compile {
                scope = Scope::Optional;
            }
            if t.contains_key("git") {
                origin = DependencyOrigin::Git;
            } else if t.contains_key("path") {
                origin = DependencyOrigin::Path;
            } else if t.contains_key("url") {
                origin = DependencyOrigin::Url;
            }
            t.get("version").and_then(Value::as_str)
        }
        _ => None,
    };

    DeclaredDependency::new(normalize_name(name), Ecosystem::Python, scope)
        .with_version(parse_declared(Ecosystem::Python, version))
        .with_group(group)
        .with_origin(origin)
}

fn read_poetry_table(
    table: Option<&Value>,
    scope: Scope,
    group: &str,
    out: &mut Vec<DeclaredDependency>,
) {
    let Some(table) = table.and_then(Value::as_table) else {
        return;
    };
    for (name, value) in table {
        if name == "python" {
            continue;
        }
        out.push(poetry_dependency(name, value, scope, group));
    }
}

/// Applies `[tool.uv.sources]` origins to already-collected declarations
fn apply_uv_sources(sources: Option<&Value>, deps: &mut [DeclaredDependency]) {
    let Some(sources) = sources.and_then(Value::as_table) else {
        return;
    };
    for (name, source) in sources {
        let name = normalize_name(name);
        let origin = match source.as_table() {
            Some(t) if t.contains_key("git") => DependencyOrigin::Git,
            Some(t) if t.contains_key("path") || t.contains_key("workspace") => {
                DependencyOrigin::Path
            }
            Some(t) => match t.get("url").and_then(Value::as_str) {
                Some(url) => reference_origin(url),
                None => continue,
            },
            None => continue,
        };
        for dep in deps.iter_mut().filter(|d| d.coordinate == name) {
            dep.origin = origin;
        }
    }
}

fn table_at<'a>(doc: &'a Table, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut value = doc.get(*first)?;
    for key in rest {
        value = value.get(*key)?;
    }
    Some(value)
}

impl ManifestParser for PyprojectTomlParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Pyproject
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let doc = parse_toml(content, "pyproject.toml")?;
        let mut dependencies = Vec::new();

        read_pep508_array(
            table_at(&doc, &["project", "dependencies"]),
            Scope::Compile,
            "project",
            &mut dependencies,
        )?;

        if let Some(extras) = table_at(&doc, &["project", "optional-dependencies"]).and_then(Value::as_table) {
            for (extra, items) in extras {
                read_pep508_array(Some(items), group_scope(extra), extra, &mut dependencies)?;
            }
        }

        if let Some(groups) = doc.get("dependency-groups").and_then(Value::as_table) {
            for (group, items) in groups {
                read_pep508_array(Some(items), group_scope(group), group, &mut dependencies)?;
            }
        }

        read_pep508_array(
            table_at(&doc, &["build-system", "requires"]),
            Scope::Plugin,
            "build-system",
            &mut dependencies,
        )?;

        read_poetry_table(
            table_at(&doc, &["tool", "poetry", "dependencies"]),
            Scope::Compile,
            "main",
            &mut dependencies,
        );
        read_poetry_table(
            table_at(&doc, &["tool", "poetry", "dev-dependencies"]),
            Scope::Dev,
            "dev",
            &mut dependencies,
        );
        if let Some(groups) = table_at(&doc, &["tool", "poetry", "group"]).and_then(Value::as_table) {
            for (group, body) in groups {
                let scope = match group.as_str() {
                    "main" => Scope::Compile,
                    other => group_scope(other),
                };
                read_poetry_table(body.get("dependencies"), scope, group, &mut dependencies);
            }
        }

        read_pep508_array(
            table_at(&doc, &["tool", "uv", "dev-dependencies"]),
            Scope::Dev,
            "dev",
            &mut dependencies,
        )?;
        if let Some(groups) = table_at(&doc, &["tool", "pdm", "dev-dependencies"]).and_then(Value::as_table) {
            for (group, items) in groups {
                read_pep508_array(Some(items), Scope::Dev, group, &mut dependencies)?;
            }
        }

        apply_uv_sources(table_at(&doc, &["tool", "uv", "sources"]), &mut dependencies);

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(doc) = parse_toml(content, "pyproject.toml") else {
            return meta;
        };
        let mut fact = |key: &str, value: Option<&Value>| {
            if let Some(v) = value.and_then(Value::as_str) {
                meta.facts.insert(key.to_string(), v.to_string());
            }
        };

        fact("name", table_at(&doc, &["project", "name"]));
        fact("version", table_at(&doc, &["project", "version"]));
        fact("requires-python", table_at(&doc, &["project", "requires-python"]));
        fact("build-backend", table_at(&doc, &["build-system", "build-backend"]));
        fact("python", table_at(&doc, &["tool", "poetry", "dependencies", "python"]));
        if !meta.facts.contains_key("name") {
            if let Some(name) = table_at(&doc, &["tool", "poetry", "name"]).and_then(Value::as_str) {
                meta.facts.insert("name".to_string(), name.to_string());
            }
        }

        for tool in ["poetry", "uv", "pdm", "hatch"] {
            if table_at(&doc, &["tool", tool]).is_some() {
                meta.facts.insert(format!("tool:{}", tool), "true".to_string());
            }
        }
        if let Some(members) = table_at(&doc, &["tool", "uv", "workspace", "members"])
            .and_then(Value::as_array)
        {
            meta.includes
                .extend(members.iter().filter_map(Value::as_str).map(str::to_string));
        }
        meta
    }
}

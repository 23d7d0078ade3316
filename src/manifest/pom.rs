//! pom.xml parser for Maven projects
//!
//! Handles:
//! - `<dependencies>` with scope, optional, exclusions and systemPath
//! - `<dependencyManagement>` as a version fallback for undeclared versions
//! - `${property}` interpolation from `<properties>` and project coordinates
//! - build plugins (recorded with the plugin scope)

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::parse_declared;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Parser for pom.xml files
pub struct PomParser;

static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// One `<dependency>` or `<plugin>` element as written
#[derive(Debug, Default, Clone)]
struct PomDependency {
    group_id: String,
    artifact_id: String,
    version: String,
    scope: String,
    kind: String,
    optional: bool,
    system_path: Option<String>,
    exclusions: Vec<String>,
    line: usize,
    plugin: bool,
}

/// The parts of a POM the analysis needs
#[derive(Debug, Default)]
struct PomModel {
    properties: HashMap<String, String>,
    dependencies: Vec<PomDependency>,
    managed: Vec<PomDependency>,
}

impl PomModel {
    /// Expands `${name}` references, following chains a few levels deep
    fn interpolate(&self, value: &str) -> String {
        let mut current = value.trim().to_string();
        for _ in 0..5 {
            if !current.contains("${") {
                break;
            }
            let next = PROPERTY_RE
                .replace_all(&current, |caps: &regex::Captures| {
                    self.properties
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn managed_version(&self, group_id: &str, artifact_id: &str) -> Option<String> {
        self.managed
            .iter()
            .find(|m| m.group_id == group_id && m.artifact_id == artifact_id && !m.version.is_empty())
            .map(|m| self.interpolate(&m.version))
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

fn read_model(content: &str) -> Result<PomModel, ManifestError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut model = PomModel::default();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<PomDependency> = None;
    let mut exclusion: (String, String) = (String::new(), String::new());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                let parent = path.last().map(String::as_str);
                if (name == "dependency" && parent == Some("dependencies"))
                    || (name == "plugin" && parent == Some("plugins"))
                {
                    current = Some(PomDependency {
                        line: line_of(content, reader.buffer_position() as usize),
                        plugin: name == "plugin",
                        ..Default::default()
                    });
                }
                if name == "exclusion" {
                    exclusion = (String::new(), String::new());
                }
                path.push(name);
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                let in_management = path.iter().any(|p| p == "dependencyManagement" || p == "pluginManagement");
                match name.as_str() {
                    "dependency" | "plugin" => {
                        if let Some(dep) = current.take() {
                            if !dep.artifact_id.is_empty() {
                                if in_management {
                                    model.managed.push(dep);
                                } else {
                                    model.dependencies.push(dep);
                                }
                            }
                        }
                    }
                    "exclusion" => {
                        if let Some(dep) = current.as_mut() {
                            let (g, a) = std::mem::take(&mut exclusion);
                            if !a.is_empty() {
                                dep.exclusions.push(format!("{}:{}", g, a));
                            }
                        }
                    }
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ManifestError::xml_parse_error("pom.xml", err.to_string()))?
                    .into_owned();
                let depth = path.len();
                let tag = path.last().map(String::as_str).unwrap_or("");
                let parent = if depth >= 2 { path[depth - 2].as_str() } else { "" };

                if parent == "properties" && depth == 3 {
                    model.properties.insert(tag.to_string(), text);
                } else if depth == 2 && matches!(tag, "groupId" | "artifactId" | "version") {
                    model.properties.insert(format!("project.{}", tag), text.clone());
                    if tag == "version" {
                        model.properties.insert("version".to_string(), text);
                    }
                } else if depth == 3 && parent == "parent" && matches!(tag, "groupId" | "version") {
                    model.properties.insert(format!("project.parent.{}", tag), text.clone());
                    model
                        .properties
                        .entry(format!("project.{}", tag))
                        .or_insert(text);
                } else if let Some(dep) = current.as_mut() {
                    match (parent, tag) {
                        ("exclusion", "groupId") => exclusion.0 = text,
                        ("exclusion", "artifactId") => exclusion.1 = text,
                        ("dependency" | "plugin", "groupId") => dep.group_id = text,
                        ("dependency" | "plugin", "artifactId") => dep.artifact_id = text,
                        ("dependency" | "plugin", "version") => dep.version = text,
                        ("dependency", "scope") => dep.scope = text,
                        ("dependency", "type") => dep.kind = text,
                        ("dependency", "optional") => dep.optional = text.trim() == "true",
                        ("dependency", "systemPath") => dep.system_path = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ManifestError::xml_parse_error(
                    "pom.xml",
                    format!("line {}: {}", line_of(content, reader.buffer_position() as usize), e),
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    if !path.is_empty() {
        return Err(ManifestError::xml_parse_error(
            "pom.xml",
            format!("unclosed element <{}>", path.join("/")),
        ));
    }

    Ok(model)
}

impl ManifestParser for PomParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Pom
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let model = read_model(content)?;
        let mut dependencies = Vec::new();

        for dep in &model.dependencies {
            let group_id = if dep.group_id.is_empty() && dep.plugin {
                "org.apache.maven.plugins".to_string()
            } else {
                model.interpolate(&dep.group_id)
            };
            let artifact_id = model.interpolate(&dep.artifact_id);
            let coordinate = format!("{}:{}", group_id, artifact_id);

            let version = if dep.version.trim().is_empty() {
                model.managed_version(&dep.group_id, &dep.artifact_id)
            } else {
                Some(model.interpolate(&dep.version))
            };

            let raw_scope = if dep.plugin {
                "plugin".to_string()
            } else if dep.scope.trim().is_empty() {
                "compile".to_string()
            } else {
                dep.scope.trim().to_string()
            };
            let mut scope = Scope::from_label(&raw_scope);
            if dep.optional && scope == Scope::Compile {
                scope = Scope::Optional;
            }

            let mut declared = DeclaredDependency::new(coordinate, Ecosystem::Maven, scope)
                .with_version(parse_declared(Ecosystem::Maven, version.as_deref()))
                .with_group(raw_scope)
                .with_exclusions(dep.exclusions.clone())
                .at_line(dep.line);
            if dep.system_path.is_some() {
                declared = declared.with_origin(DependencyOrigin::Path);
            }
            dependencies.push(declared);
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        let Ok(model) = read_model(content) else {
            return meta;
        };
        for key in ["project.groupId", "project.artifactId", "project.version"] {
            if let Some(value) = model.properties.get(key) {
                meta.facts.insert(key.to_string(), model.interpolate(value));
            }
        }
        for key in ["maven.compiler.release", "maven.compiler.source", "java.version"] {
            if let Some(value) = model.properties.get(key) {
                meta.facts
                    .entry("java".to_string())
                    .or_insert_with(|| model.interpolate(value));
            }
        }
        for bom in model
            .managed
            .iter()
            .filter(|m| m.scope == "import" && m.kind == "pom")
        {
            meta.includes.push(format!(
                "{}:{}",
                model.interpolate(&bom.group_id),
                model.interpolate(&bom.artifact_id)
            ));
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>shop</artifactId>
  <version>1.4.0-SNAPSHOT</version>

  <properties>
    <java.version>17</java.version>
    <jackson.version>2.15.2</jackson.version>
    <spring.version>${spring.base}.RELEASE</spring.version>
    <spring.base>5.3.30</spring.base>
  </properties>

  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.slf4j</groupId>
        <artifactId>slf4j-api</artifactId>
        <version>2.0.9</version>
      </dependency>
      <dependency>
        <groupId>org.springframework.boot</groupId>
        <artifactId>spring-boot-dependencies</artifactId>
        <version>3.1.5</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>

  <dependencies>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
      <version>${jackson.version}</version>
      <exclusions>
        <exclusion>
          <groupId>com.fasterxml.jackson.core</groupId>
          <artifactId>jackson-annotations</artifactId>
        </exclusion>
      </exclusions>
    </dependency>
    <dependency>
      <groupId>org.springframework</groupId>
      <artifactId>spring-core</artifactId>
      <version>${spring.version}</version>
    </dependency>
    <dependency>
      <groupId>org.slf4j</groupId>
      <artifactId>slf4j-api</artifactId>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
      <scope>test</scope>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>shop-common</artifactId>
      <version>${project.version}</version>
      <optional>true</optional>
    </dependency>
    <dependency>
      <groupId>com.oracle</groupId>
      <artifactId>ojdbc</artifactId>
      <version>11.2</version>
      <scope>system</scope>
      <systemPath>${basedir}/lib/ojdbc.jar</systemPath>
    </dependency>
  </dependencies>

  <build>
    <plugins>
      <plugin>
        <artifactId>maven-surefire-plugin</artifactId>
        <version>3.2.2</version>
      </plugin>
    </plugins>
  </build>
</project>
"#;

    fn find<'a>(deps: &'a [DeclaredDependency], coordinate: &str) -> &'a DeclaredDependency {
        deps.iter()
            .find(|d| d.coordinate == coordinate)
            .unwrap_or_else(|| panic!("missing {}", coordinate))
    }

    #[test]
    fn test_parse_dependency_count() {
        let deps = PomParser.parse(POM).unwrap();
        assert_eq!(deps.len(), 7);
    }

    #[test]
    fn test_property_interpolation() {
        let deps = PomParser.parse(POM).unwrap();
        let jackson = find(&deps, "com.fasterxml.jackson.core:jackson-databind");
        assert_eq!(jackson.declared_raw(), Some("2.15.2"));
        assert_eq!(jackson.line, Some(33));

        let spring = find(&deps, "org.springframework:spring-core");
        assert_eq!(spring.declared_raw(), Some("5.3.30.RELEASE"));
    }

    #[test]
    fn test_exclusions() {
        let deps = PomParser.parse(POM).unwrap();
        let jackson = find(&deps, "com.fasterxml.jackson.core:jackson-databind");
        assert_eq!(
            jackson.exclusions,
            vec!["com.fasterxml.jackson.core:jackson-annotations"]
        );
    }

    #[test]
    fn test_dependency_management_fallback() {
        let deps = PomParser.parse(POM).unwrap();
        let slf4j = find(&deps, "org.slf4j:slf4j-api");
        assert_eq!(slf4j.declared_raw(), Some("2.0.9"));
        assert!(!deps
            .iter()
            .any(|d| d.coordinate == "org.springframework.boot:spring-boot-dependencies"));
    }

    #[test]
    fn test_scopes() {
        let deps = PomParser.parse(POM).unwrap();
        assert_eq!(find(&deps, "junit:junit").scope, Scope::Test);
        assert_eq!(find(&deps, "org.slf4j:slf4j-api").scope, Scope::Compile);
        assert_eq!(find(&deps, "org.slf4j:slf4j-api").group.as_deref(), Some("compile"));

        let common = find(&deps, "com.example:shop-common");
        assert_eq!(common.scope, Scope::Optional);
        assert_eq!(common.declared_raw(), Some("1.4.0-SNAPSHOT"));
        assert!(common.version.as_ref().unwrap().is_unstable());

        let ojdbc = find(&deps, "com.oracle:ojdbc");
        assert_eq!(ojdbc.scope, Scope::System);
        assert_eq!(ojdbc.origin, DependencyOrigin::Path);
    }

    #[test]
    fn test_build_plugin() {
        let deps = PomParser.parse(POM).unwrap();
        let surefire = find(&deps, "org.apache.maven.plugins:maven-surefire-plugin");
        assert_eq!(surefire.scope, Scope::Plugin);
        assert_eq!(
            surefire.version.as_ref().unwrap().kind,
            VersionSpecKind::Exact
        );
    }

    #[test]
    fn test_metadata() {
        let meta = PomParser.metadata(POM);
        assert_eq!(meta.fact("project.artifactId"), Some("shop"));
        assert_eq!(meta.fact("java"), Some("17"));
        assert_eq!(
            meta.includes,
            vec!["org.springframework.boot:spring-boot-dependencies"]
        );
    }

    #[test]
    fn test_malformed_xml() {
        let err = PomParser
            .parse("<project><dependencies></project>")
            .unwrap_err();
        assert!(err.to_string().contains("failed to parse XML"));
    }

    #[test]
    fn test_truncated_xml() {
        let err = PomParser.parse("<project><dependencies>").unwrap_err();
        assert!(err.to_string().contains("unclosed element"));
    }
}

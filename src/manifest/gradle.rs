//! Gradle build script parsers
//!
//! Handles:
//! - build.gradle (Groovy DSL) and build.gradle.kts (Kotlin DSL)
//! - Variable definitions (def, val, ext block, extra properties)
//! - Map notation dependencies: group: 'x', name: 'y', version: 'z'
//! - String notation dependencies: 'group:name:version', with `$var` interpolation
//! - platform(...) / enforcedPlatform(...) wrappers and kotlin("...") shorthands
//! - `libs.xxx` version catalog references (resolved later against the catalog)
//! - `exclude group:` / `exclude module:` inside dependency closures
//! - settings.gradle `include` entries

use crate::domain::{
    DeclaredDependency, Ecosystem, ManifestFormat, ManifestMetadata, Scope, VersionSpec,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::parse_declared;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Parser for build.gradle and build.gradle.kts files
pub struct GradleParser;

/// Parser for settings.gradle and settings.gradle.kts files
pub struct GradleSettingsParser;

// Variable definition (Groovy): def wicketVersion = '1.2.3' or "1.2.3"
static VAR_DEF_GROOVY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*def\s+(\w+)\s*=\s*['"]([^'"]+)['"]"#).unwrap());

// Variable definition (Kotlin): val wicketVersion = "1.2.3" / val x by extra("1.2.3")
static VAR_DEF_KOTLIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:const\s+)?va[lr]\s+(\w+)(?:\s*:\s*String)?\s*(?:=|by\s+extra\s*\()\s*"([^"]+)""#)
        .unwrap()
});

// Kotlin extra property: extra["springVersion"] = "6.0.0"
static EXTRA_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*extra\s*\[\s*"(\w+)"\s*\]\s*=\s*"([^"]+)""#).unwrap());

// ext block variable: wicketVersion = '1.2.3' or ext.wicketVersion = '1.2.3'
static EXT_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*(?:ext\.)?(\w+)\s*=\s*['"]([^'"]+)['"]"#).unwrap());

// ext block start
static EXT_BLOCK_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*ext\s*\{").unwrap());

// constraints block start; entries inside are not dependencies
static CONSTRAINTS_BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*constraints\s*\{").unwrap());

// Map notation: implementation group: 'x', name: 'y', version: 'z'
// Kotlin: implementation(group = "x", name = "y", version = "z")
static DEP_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\w+)\s*[\(\s]+group\s*[:=]\s*['"]([^'"]+)['"]\s*,\s*name\s*[:=]\s*['"]([^'"]+)['"](?:\s*,\s*version\s*[:=]\s*(['"]?[^'",\)\s]+['"]?))?"#,
    )
    .unwrap()
});

// String notation, optionally wrapped in platform(...): implementation 'group:name:version'
static DEP_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\w+)\s*\(?\s*(?:(platform|enforcedPlatform)\s*\(\s*)?['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

// Catalog reference: implementation(libs.spring.core) / implementation libs.guava
static DEP_CATALOG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(\w+)\s*\(?\s*(?:(platform|enforcedPlatform)\s*\(\s*)?(libs\.[\w.]+)"#)
        .unwrap()
});

// Kotlin shorthand: implementation(kotlin("stdlib-jdk8"))
static DEP_KOTLIN_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(\w+)\s*\(\s*kotlin\s*\(\s*"([^"]+)"(?:\s*,\s*"([^"]+)")?\s*\)"#).unwrap()
});

// exclude group: 'x', module: 'y' / exclude(group = "x", module = "y")
static EXCLUDE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*exclude\b").unwrap());
static EXCLUDE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(group|module)\s*[:=]\s*['"]([^'"]+)['"]"#).unwrap()
});

// String interpolation: $name or ${name} or ${rootProject.ext.name}
static INTERPOLATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{?([\w.]+)\}?").unwrap());

// settings.gradle: include ':app', ':core' / include("app", "lib:core")
static SETTINGS_INCLUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*include(Build)?\b\s*\(?(.*)$").unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());
static ROOT_PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*rootProject\.name\s*=\s*['"]([^'"]+)['"]"#).unwrap()
});

// Words that can precede a quoted string but never name a configuration
const NON_CONFIGURATIONS: [&str; 12] = [
    "id",
    "url",
    "uri",
    "apply",
    "from",
    "version",
    "group",
    "description",
    "mainClass",
    "alias",
    "exclude",
    "maven",
];

impl GradleParser {
    /// Extract variable definitions from content
    fn extract_variables(&self, content: &str) -> HashMap<String, String> {
        let mut variables = HashMap::new();
        let mut in_ext_block = false;
        let mut brace_depth = 0usize;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            if EXT_BLOCK_START.is_match(trimmed) {
                in_ext_block = !trimmed.contains('}');
                brace_depth = usize::from(in_ext_block);
                continue;
            }

            if in_ext_block {
                brace_depth += trimmed.matches('{').count();
                brace_depth = brace_depth.saturating_sub(trimmed.matches('}').count());
                if brace_depth == 0 {
                    in_ext_block = false;
                }
            }

            let caps = VAR_DEF_GROOVY
                .captures(line)
                .or_else(|| VAR_DEF_KOTLIN.captures(line))
                .or_else(|| EXTRA_PROPERTY.captures(line))
                .or_else(|| {
                    let allowed = in_ext_block || trimmed.starts_with("ext.");
                    allowed.then(|| EXT_VAR.captures(line)).flatten()
                });

            if let Some(caps) = caps {
                let name = &caps[1];
                // Skip common non-version variables
                if name.starts_with("source") || name.starts_with("target") || name == "encoding" {
                    continue;
                }
                variables.insert(name.to_string(), caps[2].to_string());
            }
        }

        variables
    }

    /// Substitutes `$var` / `${var}` references inside a string literal
    fn interpolate(&self, value: &str, variables: &HashMap<String, String>) -> String {
        INTERPOLATION
            .replace_all(value, |caps: &regex::Captures| {
                let path = &caps[1];
                let key = path.rsplit('.').next().unwrap_or(path);
                variables
                    .get(path)
                    .or_else(|| variables.get(key))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Resolve a map-notation version value, handling variable references
    fn resolve_version(&self, version_raw: &str, variables: &HashMap<String, String>) -> String {
        let trimmed = version_raw.trim();

        if trimmed.starts_with('\'') || trimmed.starts_with('"') {
            let literal = trimmed.trim_matches(['\'', '"']);
            return self.interpolate(literal, variables);
        }

        // Unquoted value: a bare variable name or property path
        let key = trimmed.rsplit('.').next().unwrap_or(trimmed);
        variables
            .get(trimmed)
            .or_else(|| variables.get(key))
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }

    fn declaration(
        &self,
        config: &str,
        coordinate: String,
        version: Option<&str>,
        line_number: usize,
    ) -> DeclaredDependency {
        let spec = match version {
            Some(v) => parse_declared(Ecosystem::Gradle, Some(v)),
            None => VersionSpec::any(),
        };
        DeclaredDependency::new(coordinate, Ecosystem::Gradle, Scope::from_label(config))
            .with_version(spec)
            .with_group(config)
            .at_line(line_number)
    }

    /// Parse a single dependency line
    fn parse_line(
        &self,
        line: &str,
        line_number: usize,
        variables: &HashMap<String, String>,
    ) -> Option<DeclaredDependency> {
        if let Some(caps) = DEP_MAP.captures(line) {
            let config = &caps[1];
            let coordinate = format!("{}:{}", &caps[2], &caps[3]);
            let version = caps
                .get(4)
                .map(|m| self.resolve_version(m.as_str(), variables));
            return Some(self.declaration(config, coordinate, version.as_deref(), line_number));
        }

        if let Some(caps) = DEP_KOTLIN_SHORTHAND.captures(line) {
            let coordinate = format!("org.jetbrains.kotlin:kotlin-{}", &caps[2]);
            let version = caps.get(3).map(|m| self.interpolate(m.as_str(), variables));
            return Some(self.declaration(&caps[1], coordinate, version.as_deref(), line_number));
        }

        if let Some(caps) = DEP_CATALOG.captures(line) {
            let accessor = caps[3].trim_end_matches('.');
            if accessor.starts_with("libs.versions.")
                || accessor.starts_with("libs.plugins.")
                || accessor.starts_with("libs.bundles.")
            {
                return None;
            }
            let config = &caps[1];
            if NON_CONFIGURATIONS.contains(&config) {
                return None;
            }
            return Some(self.declaration(config, accessor.to_string(), None, line_number));
        }

        let caps = DEP_STRING.captures(line)?;
        let config = &caps[1];
        if NON_CONFIGURATIONS.contains(&config) {
            return None;
        }
        let notation = self.interpolate(&caps[3], variables);
        let parts: Vec<&str> = notation.split(':').collect();
        if parts.len() < 2
            || parts
                .iter()
                .take(2)
                .any(|p| p.is_empty() || p.contains('/') || p.contains(char::is_whitespace))
        {
            return None;
        }

        let coordinate = format!("{}:{}", parts[0], parts[1]);
        // group:name:version[:classifier][@ext]
        let version = parts
            .get(2)
            .map(|v| v.split('@').next().unwrap_or(v))
            .filter(|v| !v.is_empty());
        Some(self.declaration(config, coordinate, version, line_number))
    }
}

impl ManifestParser for GradleParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Gradle
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let mut dependencies: Vec<DeclaredDependency> = Vec::new();
        let variables = self.extract_variables(content);

        // Brace depth of an open dependency closure, and of a constraints block
        let mut closure_depth = 0usize;
        let mut constraints_depth = 0usize;

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('*') {
                continue;
            }

            let opens = trimmed.matches('{').count();
            let closes = trimmed.matches('}').count();

            if constraints_depth > 0 {
                constraints_depth = (constraints_depth + opens).saturating_sub(closes);
                continue;
            }
            if CONSTRAINTS_BLOCK_START.is_match(trimmed) {
                constraints_depth = opens.saturating_sub(closes);
                continue;
            }

            if closure_depth > 0 {
                if EXCLUDE_LINE.is_match(trimmed) {
                    if let Some(dep) = dependencies.last_mut() {
                        dep.exclusions.push(exclusion_key(trimmed));
                    }
                }
                closure_depth = (closure_depth + opens).saturating_sub(closes);
                continue;
            }

            if let Some(mut dep) = self.parse_line(line, idx + 1, &variables) {
                // Single-line closure: implementation('a:b:1') { exclude group: 'x' }
                if let Some(body) = trimmed.split_once('{').map(|(_, rest)| rest) {
                    for part in body.split(';') {
                        if EXCLUDE_LINE.is_match(part) {
                            dep.exclusions.push(exclusion_key(part));
                        }
                    }
                }
                closure_depth = opens.saturating_sub(closes);
                dependencies.push(dep);
            }
        }

        Ok(dependencies)
    }
}

/// Builds `group:module` from an exclude clause, `*` for the missing half
fn exclusion_key(clause: &str) -> String {
    let mut group = "*".to_string();
    let mut module = "*".to_string();
    for caps in EXCLUDE_FIELD.captures_iter(clause) {
        match &caps[1] {
            "group" => group = caps[2].to_string(),
            _ => module = caps[2].to_string(),
        }
    }
    format!("{}:{}", group, module)
}

impl ManifestParser for GradleSettingsParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::GradleSettings
    }

    fn parse(&self, _content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        Ok(Vec::new())
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        for line in content.lines() {
            if line.trim_start().starts_with("//") {
                continue;
            }
            if let Some(caps) = ROOT_PROJECT_NAME.captures(line) {
                meta.facts
                    .insert("rootProject.name".to_string(), caps[1].to_string());
            } else if let Some(caps) = SETTINGS_INCLUDE.captures(line) {
                let included_build = caps.get(1).is_some();
                for module in QUOTED.captures_iter(&caps[2]) {
                    let name = module[1].trim_start_matches(':');
                    let entry = if included_build {
                        name.to_string()
                    } else {
                        name.replace(':', "/")
                    };
                    meta.includes.push(entry);
                }
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    fn parse(content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        GradleParser.parse(content)
    }

    fn version_of(dep: &DeclaredDependency) -> &str {
        dep.version.as_ref().map(|v| v.version.as_str()).unwrap_or("")
    }

    #[test]
    fn test_parse_string_notation() {
        let content = r#"
dependencies {
    implementation 'org.apache.wicket:wicket-core:9.12.0'
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].coordinate, "org.apache.wicket:wicket-core");
        assert_eq!(version_of(&deps[0]), "9.12.0");
        assert_eq!(deps[0].version.as_ref().unwrap().kind, VersionSpecKind::Exact);
        assert_eq!(deps[0].scope, Scope::Compile);
        assert_eq!(deps[0].group.as_deref(), Some("implementation"));
        assert_eq!(deps[0].line, Some(3));
    }

    #[test]
    fn test_parse_kotlin_dsl_call() {
        let content = r#"
dependencies {
    implementation("org.springframework:spring-core:5.3.23")
    runtimeOnly("org.postgresql:postgresql:42.6.0")
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coordinate, "org.springframework:spring-core");
        assert_eq!(deps[1].scope, Scope::Runtime);
    }

    #[test]
    fn test_parse_map_notation() {
        let content = r#"
dependencies {
    implementation group: 'org.apache.wicket', name: 'wicket-core', version: '9.12.0'
    implementation(group = "org.slf4j", name = "slf4j-api", version = "2.0.9")
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coordinate, "org.apache.wicket:wicket-core");
        assert_eq!(version_of(&deps[0]), "9.12.0");
        assert_eq!(deps[1].coordinate, "org.slf4j:slf4j-api");
        assert_eq!(version_of(&deps[1]), "2.0.9");
    }

    #[test]
    fn test_parse_configurations() {
        let content = r#"
dependencies {
    testImplementation 'junit:junit:4.13.2'
    compileOnly 'org.projectlombok:lombok:1.18.30'
    annotationProcessor 'org.projectlombok:lombok:1.18.30'
    debugImplementation 'com.squareup.leakcanary:leakcanary-android:2.12'
}
"#;
        let deps = parse(content).unwrap();
        let scopes: Vec<Scope> = deps.iter().map(|d| d.scope).collect();
        assert_eq!(
            scopes,
            vec![Scope::Test, Scope::Provided, Scope::Provided, Scope::Dev]
        );
    }

    #[test]
    fn test_parse_variables() {
        let content = r#"
def wicketVersion = '9.12.0'
val kotlinxVersion = "1.7.3"

ext {
    springVersion = '5.3.23'
}

dependencies {
    implementation group: 'org.apache.wicket', name: 'wicket-core', version: wicketVersion
    implementation group: 'org.springframework', name: 'spring-core', version: springVersion
    implementation "org.jetbrains.kotlinx:kotlinx-coroutines-core:$kotlinxVersion"
    implementation "org.apache.wicket:wicket-util:${wicketVersion}"
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 4);
        assert_eq!(version_of(&deps[0]), "9.12.0");
        assert_eq!(version_of(&deps[1]), "5.3.23");
        assert_eq!(version_of(&deps[2]), "1.7.3");
        assert_eq!(version_of(&deps[3]), "9.12.0");
    }

    #[test]
    fn test_extract_kotlin_extra_variables() {
        let content = r#"
val ktorVersion by extra("2.3.5")
extra["jacksonVersion"] = "2.15.2"
"#;
        let vars = GradleParser.extract_variables(content);
        assert_eq!(vars.get("ktorVersion").map(String::as_str), Some("2.3.5"));
        assert_eq!(vars.get("jacksonVersion").map(String::as_str), Some("2.15.2"));
    }

    #[test]
    fn test_unresolved_variable_is_not_a_version() {
        let content = r#"
dependencies {
    implementation "io.ktor:ktor-server-core:$ktorVersion"
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].version.as_ref().unwrap().kind, VersionSpecKind::Dynamic);
    }

    #[test]
    fn test_parse_platform() {
        let content = r#"
dependencies {
    implementation(platform("org.springframework.boot:spring-boot-dependencies:3.1.5"))
    implementation enforcedPlatform('com.fasterxml.jackson:jackson-bom:2.15.2')
    implementation("org.springframework.boot:spring-boot-starter-web")
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(
            deps[0].coordinate,
            "org.springframework.boot:spring-boot-dependencies"
        );
        assert_eq!(version_of(&deps[0]), "3.1.5");
        assert_eq!(deps[1].coordinate, "com.fasterxml.jackson:jackson-bom");
        assert_eq!(deps[2].version.as_ref().unwrap().kind, VersionSpecKind::Any);
    }

    #[test]
    fn test_parse_kotlin_shorthand() {
        let content = r#"
dependencies {
    implementation(kotlin("stdlib-jdk8"))
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps[0].coordinate, "org.jetbrains.kotlin:kotlin-stdlib-jdk8");
    }

    #[test]
    fn test_parse_catalog_reference() {
        let content = r#"
plugins {
    alias(libs.plugins.spring.boot)
}

dependencies {
    implementation(libs.spring.core)
    testImplementation libs.junit.jupiter
    implementation(platform(libs.versions.bom))
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coordinate, "libs.spring.core");
        assert!(deps[0].declared_raw().is_none());
        assert_eq!(deps[1].coordinate, "libs.junit.jupiter");
        assert_eq!(deps[1].scope, Scope::Test);
    }

    #[test]
    fn test_parse_exclusions() {
        let content = r#"
dependencies {
    implementation('org.apache.hadoop:hadoop-client:3.3.6') {
        exclude group: 'org.slf4j', module: 'slf4j-log4j12'
        exclude group: 'log4j'
    }
    implementation("com.google.guava:guava:32.1.3-jre") { exclude(module = "listenablefuture") }
    implementation 'org.slf4j:slf4j-api:2.0.9'
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(
            deps[0].exclusions,
            vec!["org.slf4j:slf4j-log4j12", "log4j:*"]
        );
        assert_eq!(deps[1].exclusions, vec!["*:listenablefuture"]);
        assert!(deps[2].exclusions.is_empty());
    }

    #[test]
    fn test_constraints_are_skipped() {
        let content = r#"
dependencies {
    implementation 'org.apache.commons:commons-text:1.10.0'
    constraints {
        implementation('org.apache.commons:commons-lang3:3.13.0') {
            because 'CVE fix'
        }
    }
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].coordinate, "org.apache.commons:commons-text");
    }

    #[test]
    fn test_repository_urls_are_not_dependencies() {
        let content = r#"
repositories {
    maven { url 'https://repo.example.com/releases' }
    maven { url = uri("https://jitpack.io") }
}
"#;
        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_parse_classifier_and_buildscript() {
        let content = r#"
buildscript {
    dependencies {
        classpath 'com.android.tools.build:gradle:8.1.2'
    }
}
dependencies {
    implementation 'org.lwjgl:lwjgl:3.3.3:natives-linux@jar'
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps[0].scope, Scope::Plugin);
        assert_eq!(deps[1].coordinate, "org.lwjgl:lwjgl");
        assert_eq!(version_of(&deps[1]), "3.3.3");
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").unwrap().is_empty());
        let content = r#"
// This is a comment
// implementation 'commented:out:1.0.0'
"#;
        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_parse_snapshot_version() {
        let content = r#"
dependencies {
    implementation 'com.example:my-lib:1.0.0-SNAPSHOT'
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(version_of(&deps[0]), "1.0.0-SNAPSHOT");
        assert!(deps[0].version.as_ref().unwrap().is_unstable());
    }

    #[test]
    fn test_parse_realistic_build_gradle() {
        let content = r#"
plugins {
    id 'java'
    id 'org.springframework.boot' version '3.0.0'
}

def lombokVersion = '1.18.24'
def junitVersion = '5.9.0'

ext {
    springVersion = '6.0.0'
}

dependencies {
    implementation 'org.springframework.boot:spring-boot-starter-web:3.0.0'
    implementation group: 'org.projectlombok', name: 'lombok', version: lombokVersion
    implementation "org.springframework:spring-core:$springVersion"

    testImplementation 'org.junit.jupiter:junit-jupiter-api:5.9.0'
    testImplementation "org.junit.jupiter:junit-jupiter-engine:${junitVersion}"
}
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 5);

        let spring_core = deps
            .iter()
            .find(|d| d.coordinate == "org.springframework:spring-core")
            .unwrap();
        assert_eq!(version_of(spring_core), "6.0.0");

        let test_deps = deps.iter().filter(|d| d.scope == Scope::Test).count();
        assert_eq!(test_deps, 2);
    }

    #[test]
    fn test_settings_includes() {
        let content = r#"
rootProject.name = 'shop'
include ':app', ':core'
include("lib:common")
includeBuild("build-logic")
"#;
        let parser = GradleSettingsParser;
        assert!(parser.parse(content).unwrap().is_empty());
        let meta = parser.metadata(content);
        assert_eq!(meta.fact("rootProject.name"), Some("shop"));
        assert_eq!(meta.includes, vec!["app", "core", "lib/common", "build-logic"]);
    }
}

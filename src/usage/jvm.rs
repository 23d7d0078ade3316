//! Java, Kotlin and Scala import scanner

use super::{FileImports, Import, ImportScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Scanner for JVM sources
pub struct JvmImportScanner;

// import a.b.C; | import static a.b.C.m; | import a.b.* | import a.b._ | import a.b.{X, Y} | import a.b.C as D
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^import\s+(?:static\s+)?([A-Za-z_][\w$]*(?:\.[A-Za-z`][\w$`]*)*)(\.\*|\._|\.\{[^}]*\})?")
        .unwrap()
});

impl ImportScanner for JvmImportScanner {
    fn scan(&self, content: &str) -> FileImports {
        let mut imports = FileImports::default();
        let mut in_comment = false;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if in_comment {
                if line.contains("*/") {
                    in_comment = false;
                }
                continue;
            }
            if line.starts_with("/*") {
                in_comment = !line.contains("*/");
                continue;
            }
            let Some(caps) = IMPORT_RE.captures(line) else {
                continue;
            };
            let selector = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let wildcard = selector == ".*"
                || selector == "._"
                || (selector.starts_with(".{") && selector.contains('_') && !selector.contains("=>"));
            imports.imports.push(Import {
                path: caps[1].replace('`', ""),
                line: idx + 1,
                wildcard,
                dot: false,
            });
        }
        imports
    }
}

/// True for JDK and Scala standard-library packages
pub(crate) fn is_std_import(path: &str) -> bool {
    ["java.", "javax.", "jdk.", "sun.", "kotlin.", "scala."]
        .iter()
        .any(|p| path.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_imports() {
        let source = r#"package com.example;

import java.util.List;
import static org.junit.jupiter.api.Assertions.assertEquals;
import com.google.common.collect.*;
/*
import org.commented.Out;
*/
import org.springframework.boot.SpringApplication;

public class App {}
"#;
        let scanned = JvmImportScanner.scan(source);
        let paths: Vec<&str> = scanned.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "java.util.List",
                "org.junit.jupiter.api.Assertions.assertEquals",
                "com.google.common.collect",
                "org.springframework.boot.SpringApplication",
            ]
        );
        assert!(scanned.imports[2].wildcard);
        assert!(!scanned.imports[3].wildcard);
        assert_eq!(scanned.imports[3].line, 9);
    }

    #[test]
    fn test_scala_and_kotlin_imports() {
        let source = r#"import akka.actor._
import cats.effect.{IO, IOApp}
import zio.{_, given}
import io.ktor.server.application.Application as App
"#;
        let scanned = JvmImportScanner.scan(source);
        assert_eq!(scanned.imports.len(), 4);
        assert_eq!(scanned.imports[0].path, "akka.actor");
        assert!(scanned.imports[0].wildcard);
        assert_eq!(scanned.imports[1].path, "cats.effect");
        assert!(!scanned.imports[1].wildcard);
        assert!(scanned.imports[2].wildcard);
        assert_eq!(scanned.imports[3].path, "io.ktor.server.application.Application");
    }

    #[test]
    fn test_std_import() {
        assert!(is_std_import("java.util.List"));
        assert!(is_std_import("scala.concurrent.Future"));
        assert!(!is_std_import("kotlinx.coroutines.launch"));
        assert!(!is_std_import("org.slf4j.Logger"));
    }
}

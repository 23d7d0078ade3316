//! Curated package lists used by scoring and risk assessment

use crate::domain::Ecosystem;

const GO_CRITICAL: &[&str] = &[
    "gin-gonic/gin",
    "labstack/echo",
    "gofiber/fiber",
    "gorilla/mux",
    "go-chi/chi",
    "gorm.io/gorm",
    "google.golang.org/grpc",
    "google.golang.org/protobuf",
    "redis/go-redis",
    "jackc/pgx",
    "spf13/cobra",
    "k8s.io/client-go",
    "aws/aws-sdk-go",
    "prometheus/client_golang",
    "go.uber.org/zap",
];

const JVM_CRITICAL: &[&str] = &[
    "springframework",
    "hibernate",
    "jackson",
    "netty",
    "guava",
    "log4j",
    "slf4j",
    "logback",
    "akka",
    "typesafe.play",
    "kafka",
    "grpc",
    "micronaut",
    "quarkus",
    "vertx",
    "cats-effect",
    "dev.zio",
    "http4s",
    "okhttp",
    "retrofit",
    "kotlinx-coroutines",
    "ktor",
];

const NODE_CRITICAL: &[&str] = &[
    "react",
    "vue",
    "@angular/core",
    "express",
    "next",
    "@nestjs/core",
    "fastify",
    "koa",
    "svelte",
    "typeorm",
    "prisma",
    "sequelize",
    "mongoose",
    "graphql",
    "@apollo/server",
    "webpack",
    "vite",
    "typescript",
    "redux",
];

const PYTHON_CRITICAL: &[&str] = &[
    "django",
    "flask",
    "fastapi",
    "sqlalchemy",
    "numpy",
    "pandas",
    "requests",
    "celery",
    "pydantic",
    "tensorflow",
    "torch",
    "scipy",
    "boto3",
    "aiohttp",
    "starlette",
    "uvicorn",
    "gunicorn",
];

const RUBY_CRITICAL: &[&str] = &[
    "rails",
    "activerecord",
    "activesupport",
    "actionpack",
    "sidekiq",
    "devise",
    "puma",
    "pg",
    "nokogiri",
    "rack",
    "sinatra",
    "grape",
    "redis",
];

/// Built-in critical-package entries for an ecosystem
pub fn default_critical(ecosystem: Ecosystem) -> &'static [&'static str] {
    match ecosystem {
        Ecosystem::Go => GO_CRITICAL,
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => JVM_CRITICAL,
        Ecosystem::Node => NODE_CRITICAL,
        Ecosystem::Python => PYTHON_CRITICAL,
        Ecosystem::Ruby => RUBY_CRITICAL,
    }
}

/// Case-insensitive substring match of `coordinate` against the built-in and
/// extra entries; returns the matching entry
pub fn critical_match<'a>(
    ecosystem: Ecosystem,
    coordinate: &str,
    extra: &'a [String],
) -> Option<&'a str> {
    let lower = coordinate.to_ascii_lowercase();
    default_critical(ecosystem)
        .iter()
        .copied()
        .chain(extra.iter().map(String::as_str))
        .find(|entry| lower.contains(&entry.to_ascii_lowercase()))
}

/// Officially maintained near-standard-library packages
pub fn is_extended_stdlib(ecosystem: Ecosystem, coordinate: &str) -> bool {
    match ecosystem {
        Ecosystem::Go => coordinate.starts_with("golang.org/x/"),
        Ecosystem::Python => {
            coordinate.starts_with("backports")
                || matches!(
                    coordinate,
                    "typing-extensions" | "typing_extensions" | "importlib-metadata" | "tomli"
                )
        }
        Ecosystem::Node => coordinate.starts_with("@types/") || coordinate == "tslib",
        Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => matches!(
            coordinate,
            "org.jetbrains.kotlin:kotlin-stdlib" | "org.scala-lang:scala-library"
        ) || coordinate.starts_with("org.scala-lang.modules:"),
        Ecosystem::Ruby => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_match_case_insensitive() {
        assert_eq!(
            critical_match(Ecosystem::Maven, "org.springframework.boot:spring-boot-starter-web", &[]),
            Some("springframework")
        );
        assert_eq!(critical_match(Ecosystem::Python, "Django", &[]), Some("django"));
        assert_eq!(critical_match(Ecosystem::Node, "left-pad", &[]), None);
    }

    #[test]
    fn test_extra_entries() {
        let extra = vec!["internal-auth".to_string()];
        assert_eq!(
            critical_match(Ecosystem::Node, "@acme/internal-auth", &extra),
            Some("internal-auth")
        );
    }

    #[test]
    fn test_extended_stdlib() {
        assert!(is_extended_stdlib(Ecosystem::Go, "golang.org/x/sync"));
        assert!(!is_extended_stdlib(Ecosystem::Go, "github.com/pkg/errors"));
        assert!(is_extended_stdlib(Ecosystem::Node, "@types/node"));
    }
}

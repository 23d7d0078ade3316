//! Fixed recommendation text

use crate::domain::{Direction, RiskLevel, SemverType, VersionDiff};

/// Package family with its own upgrade advice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFamily {
    WebFramework,
    Orm,
    TestFramework,
}

const WEB_FRAMEWORKS: &[&str] = &[
    "express",
    "fastify",
    "koa",
    "@nestjs/",
    "next",
    "django",
    "flask",
    "fastapi",
    "rails",
    "sinatra",
    "spring-boot",
    "spring-web",
    "gin-gonic/gin",
    "labstack/echo",
    "gofiber/fiber",
    "typesafe.play",
    "akka-http",
    "http4s",
    "ktor",
];

const ORMS: &[&str] = &[
    "sequelize",
    "typeorm",
    "prisma",
    "mongoose",
    "sqlalchemy",
    "django",
    "activerecord",
    "gorm",
    "hibernate",
    "exposed",
    "slick",
    "doobie",
    "peewee",
    "tortoise-orm",
];

const TEST_FRAMEWORKS: &[&str] = &[
    "jest",
    "mocha",
    "vitest",
    "pytest",
    "rspec",
    "minitest",
    "junit",
    "testng",
    "mockito",
    "scalatest",
    "stretchr/testify",
    "onsi/gomega",
    "onsi/ginkgo",
    "cypress",
    "playwright",
];

/// Families a coordinate belongs to, by case-insensitive substring
pub fn families(coordinate: &str) -> Vec<PackageFamily> {
    let lower = coordinate.to_ascii_lowercase();
    [
        (PackageFamily::WebFramework, WEB_FRAMEWORKS),
        (PackageFamily::Orm, ORMS),
        (PackageFamily::TestFramework, TEST_FRAMEWORKS),
    ]
    .into_iter()
    .filter(|(_, entries)| entries.iter().any(|e| lower.contains(e)))
    .map(|(family, _)| family)
    .collect()
}

pub fn family_advice(family: PackageFamily) -> &'static str {
    match family {
        PackageFamily::WebFramework => {
            "Web framework: re-check routing, middleware order and request/response serialization"
        }
        PackageFamily::Orm => {
            "ORM: run migrations against a staging database and compare the generated SQL"
        }
        PackageFamily::TestFramework => {
            "Test framework: upgrade it on its own; only test code is affected"
        }
    }
}

pub fn headline(package: &str, diff: &VersionDiff) -> String {
    let (from, to) = (&diff.from, &diff.to);
    if diff.direction == Direction::Downgrade {
        return format!(
            "Downgrading {} from {} to {}: confirm nothing relies on the newer behaviour",
            package, from, to
        );
    }
    match diff.semver_type {
        SemverType::Major => format!(
            "Major upgrade of {} ({} -> {}): read the migration guide and expect API changes",
            package, from, to
        ),
        SemverType::Minor => format!(
            "Minor upgrade of {} ({} -> {}): backwards compatible in principle; run the full test suite",
            package, from, to
        ),
        SemverType::Patch => format!(
            "Patch upgrade of {} ({} -> {}): bug fixes only; safe to apply once CI passes",
            package, from, to
        ),
        SemverType::Prerelease => format!(
            "Pre-release change for {} ({} -> {}): pre-releases may change without notice; keep them out of production",
            package, from, to
        ),
        SemverType::Unknown if diff.direction == Direction::Same => format!(
            "{} {} and {} are the same version; nothing to upgrade",
            package, from, to
        ),
        SemverType::Unknown => format!(
            "Could not classify the change for {} ({} -> {}); review the release notes by hand",
            package, from, to
        ),
    }
}

pub fn closing(level: RiskLevel) -> Option<&'static str> {
    match level {
        RiskLevel::Critical => {
            Some("High-risk upgrade: do it on an isolated branch with a rollback plan")
        }
        RiskLevel::High => Some("Schedule dedicated testing time for this upgrade"),
        RiskLevel::Medium | RiskLevel::Low => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ecosystem;

    #[test]
    fn test_families() {
        assert_eq!(families("django"), vec![PackageFamily::WebFramework, PackageFamily::Orm]);
        assert_eq!(families("org.junit.jupiter:junit-jupiter"), vec![PackageFamily::TestFramework]);
        assert!(families("lodash").is_empty());
    }

    #[test]
    fn test_headline() {
        let diff = VersionDiff::new(Ecosystem::Node, "4.18.2", "5.0.0", SemverType::Major, Direction::Upgrade);
        assert!(headline("express", &diff).starts_with("Major upgrade of express"));
        let same = VersionDiff::unchanged(Ecosystem::Node, "1.0.0", "1.0.0");
        assert!(headline("x", &same).contains("same version"));
        let down = VersionDiff::new(Ecosystem::Node, "2.0.0", "1.0.0", SemverType::Major, Direction::Downgrade);
        assert!(headline("x", &down).starts_with("Downgrading"));
    }
}

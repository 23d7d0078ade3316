//! Ruby require scanner
//!
//! Only `require` names a gem; `require_relative` and `load` point at
//! project files and are ignored.

use super::{FileImports, Import, ImportScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Scanner for `.rb` and `.rake` files
pub struct RubyImportScanner;

// require 'json' | require("sidekiq/web") | require %q(x)
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s;(])require\s*\(?\s*(?:['"]([^'"]+)['"]|%q[(\[{]([^)\]}]+)[)\]}])"#).unwrap()
});

impl ImportScanner for RubyImportScanner {
    fn scan(&self, content: &str) -> FileImports {
        let mut imports = FileImports::default();
        let mut in_comment = false;

        for (idx, raw) in content.lines().enumerate() {
            if raw.starts_with("=begin") {
                in_comment = true;
                continue;
            }
            if in_comment {
                in_comment = !raw.starts_with("=end");
                continue;
            }
            let line = raw.trim();
            if line.starts_with('#') {
                continue;
            }
            for caps in REQUIRE_RE.captures_iter(line) {
                let Some(path) = caps.get(1).or_else(|| caps.get(2)) else {
                    continue;
                };
                imports.imports.push(Import {
                    path: path.as_str().to_string(),
                    line: idx + 1,
                    wildcard: false,
                    dot: false,
                });
            }
        }
        imports
    }
}

/// Libraries bundled with Ruby itself
const STDLIB: &[&str] = &[
    "set", "json", "yaml", "psych", "csv", "date", "time", "fileutils", "pathname", "tempfile",
    "tmpdir", "securerandom", "digest", "openssl", "net", "uri", "open3", "optparse", "logger",
    "erb", "socket", "stringio", "zlib", "benchmark", "forwardable", "singleton", "ostruct",
    "pp", "English", "timeout", "base64", "bigdecimal", "open-uri", "shellwords", "etc",
];

/// True for libraries that ship with Ruby
pub(crate) fn is_std_import(path: &str) -> bool {
    let top = path.split('/').next().unwrap_or(path);
    STDLIB.contains(&top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_requires() {
        let source = r#"# frozen_string_literal: true
require 'json'
require "sidekiq/web"
require_relative "../lib/helper"
# require 'commented'
=begin
require 'in_block_comment'
=end
Bundler.require(*Rails.groups); require('faraday')
require %q(nokogiri)
"#;
        let scanned = RubyImportScanner.scan(source);
        let paths: Vec<&str> = scanned.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["json", "sidekiq/web", "faraday", "nokogiri"]);
        assert_eq!(scanned.imports[2].line, 9);
    }

    #[test]
    fn test_std_import() {
        assert!(is_std_import("net/http"));
        assert!(!is_std_import("rails"));
    }
}

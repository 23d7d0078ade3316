//! JavaScript and TypeScript import scanner
//!
//! Recognises static `import`/`export ... from`, side-effect imports,
//! `require()` and dynamic `import()`. Specifiers are reduced to the
//! package name (`lodash/fp` -> `lodash`, `@babel/core/lib` -> `@babel/core`).

use super::{FileImports, Import, ImportScanner};
use regex::Regex;
use std::sync::LazyLock;

/// Scanner for JavaScript-family files
pub struct NodeImportScanner;

// import x from 'a' | import {\n a,\n b\n} from "a" | import 'a' | export * from 'a'
static STATIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import|export)\s+(?:type\s+)?(?:[^'";]*?\s+from\s+)?['"]([^'"\n]+)['"]"#)
        .unwrap()
});

// require('a') | import('a')
static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap()
});

static LINE_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*//.*$").unwrap());

static BLOCK_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Blanks comments while keeping line numbers intact
fn strip_comments(content: &str) -> String {
    let keep_lines = |m: &regex::Captures| -> String {
        m[0].chars().map(|c| if c == '\n' { '\n' } else { ' ' }).collect()
    };
    let without_blocks = BLOCK_COMMENT_RE.replace_all(content, keep_lines);
    LINE_COMMENT_RE
        .replace_all(&without_blocks, |m: &regex::Captures| " ".repeat(m[0].len()))
        .into_owned()
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

impl ImportScanner for NodeImportScanner {
    fn scan(&self, content: &str) -> FileImports {
        let text = strip_comments(content);
        let mut found: Vec<(usize, String)> = Vec::new();

        for re in [&*STATIC_RE, &*CALL_RE] {
            for caps in re.captures_iter(&text) {
                let Some(spec) = caps.get(1) else {
                    continue;
                };
                found.push((spec.start(), spec.as_str().to_string()));
            }
        }
        found.sort();
        found.dedup();

        FileImports {
            imports: found
                .into_iter()
                .filter_map(|(offset, spec)| {
                    Some(Import {
                        path: package_name(&spec)?,
                        line: line_of(&text, offset),
                        wildcard: false,
                        dot: false,
                    })
                })
                .collect(),
            cgo: false,
        }
    }
}

/// Reduces an import specifier to its package name; `None` for relative,
/// absolute, URL and `node:` specifiers
pub(crate) fn package_name(specifier: &str) -> Option<String> {
    if specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with('#')
        || specifier.starts_with("node:")
        || specifier.contains("://")
    {
        return None;
    }
    let mut parts = specifier.split('/');
    let first = parts.next()?;
    if first.starts_with('@') {
        let second = parts.next()?;
        return Some(format!("{}/{}", first, second));
    }
    // webpack loaders: `style-loader!css-loader!./x.css`
    let first = first.split('!').next()?;
    (!first.is_empty()).then(|| first.to_string())
}

/// Node.js core modules
const BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns", "events", "fs",
    "http", "http2", "https", "net", "os", "path", "perf_hooks", "process", "querystring",
    "readline", "stream", "string_decoder", "timers", "tls", "tty", "url", "util", "v8", "vm",
    "worker_threads", "zlib",
];

/// True for Node.js core modules
pub(crate) fn is_std_import(path: &str) -> bool {
    BUILTINS.contains(&path)
}

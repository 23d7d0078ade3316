//! Gemfile parser for Ruby projects
//!
//! Handles:
//! - gem declarations with zero or more version constraints
//! - `group :x, :y do ... end` blocks and inline `group:` / `groups:` options
//! - `git:` / `github:` / `path:` options and `git`/`path` blocks
//! - `gemspec`, `ruby` and `source` directives (reported as metadata)

use crate::domain::{
    DeclaredDependency, DependencyOrigin, Ecosystem, ManifestFormat, ManifestMetadata, Scope,
};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use crate::parser::parse_declared;

/// Parser for Gemfile files
pub struct GemfileParser;

/// An open `do ... end` (or `if ... end`) block
#[derive(Debug)]
enum Block {
    Group(Vec<String>),
    Source(DependencyOrigin),
    Other,
}

#[derive(Debug)]
struct OpenBlock {
    block: Block,
    line: usize,
}

/// Removes a trailing `# comment`, ignoring `#` inside strings
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev = ' ';
    for (idx, c) in line.char_indices() {
        match quote {
            Some(q) if c == q && prev != '\\' => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return line[..idx].trim_end(),
            None => {}
        }
        prev = c;
    }
    line.trim_end()
}

/// Splits on top-level commas, respecting quotes and brackets
fn split_args(text: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0i32;

    for c in text.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '[' | '(' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ']' | ')' | '}' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    args.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(c),
            },
        }
    }
    if quote.is_some() {
        return Err("unterminated string".to_string());
    }
    if depth != 0 {
        return Err("unbalanced brackets".to_string());
    }
    if !current.trim().is_empty() {
        args.push(current.trim().to_string());
    }
    Ok(args)
}

/// Drops a trailing `if` / `unless` modifier outside strings
fn strip_modifier(text: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None => {
                let rest = &text[idx..];
                if rest.starts_with(" if ") || rest.starts_with(" unless ") {
                    return text[..idx].trim_end();
                }
            }
        }
    }
    text
}

fn unquote(value: &str) -> Option<&str> {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .or_else(|| value.strip_prefix("%q(").and_then(|v| v.strip_suffix(')')))
}

/// `key: value`, `:key => value` or `"key" => value`
fn keyword(arg: &str) -> Option<(&str, &str)> {
    if let Some((key, value)) = arg.split_once("=>") {
        let key = key.trim().trim_start_matches(':');
        let key = unquote(key).unwrap_or(key);
        return Some((key, value.trim()));
    }
    let (key, value) = arg.split_once(':')?;
    if value.starts_with(':') || key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((key, value.trim()))
}

/// Symbol or string list: `:test`, `[:development, :test]`, `"test"`
fn symbols(value: &str) -> Vec<String> {
    value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| {
            let s = s.trim();
            unquote(s).unwrap_or(s).trim_start_matches(':').to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// The most runtime-shaping scope among group names
fn groups_scope(groups: &[String]) -> Scope {
    groups
        .iter()
        .map(|g| Scope::from_label(g))
        .max_by_key(Scope::runtime_rank)
        .unwrap_or(Scope::Compile)
}

fn block_opener(line: &str) -> Option<Block> {
    let opens = line.ends_with(" do") || (line.contains(" do |") && line.ends_with('|'));
    let keyword_block = ["if ", "unless ", "case ", "begin", "while ", "def "]
        .iter()
        .any(|k| line.starts_with(k));
    if !opens && !keyword_block {
        return None;
    }
    if keyword_block {
        return Some(Block::Other);
    }
    let head = line.trim_end_matches(" do").trim();
    let (directive, rest) = head.split_once([' ', '(']).unwrap_or((head, ""));
    let block = match directive {
        "group" => Block::Group(symbols(rest.trim_end_matches(')'))),
        "git" | "github" => Block::Source(DependencyOrigin::Git),
        "path" => Block::Source(DependencyOrigin::Path),
        "source" => Block::Source(DependencyOrigin::Registry),
        _ => Block::Other,
    };
    Some(block)
}

fn parse_gem(
    args_text: &str,
    blocks: &[OpenBlock],
    line_no: usize,
) -> Result<DeclaredDependency, ManifestError> {
    let err = |message: String| ManifestError::line_error("Gemfile", line_no, message);
    let args = split_args(strip_modifier(args_text)).map_err(|m| err(m))?;
    let mut args = args.iter();

    let name = args
        .next()
        .and_then(|a| unquote(a))
        .ok_or_else(|| err("gem declaration without a quoted name".to_string()))?;

    let mut constraints: Vec<&str> = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    let mut origin = None;

    for arg in args {
        if let Some(text) = unquote(arg) {
            constraints.push(text);
            continue;
        }
        let Some((key, value)) = keyword(arg) else {
            continue;
        };
        match key {
            "group" | "groups" => groups.extend(symbols(value)),
            "git" | "github" | "gist" | "bitbucket" => origin = Some(DependencyOrigin::Git),
            "path" => origin = Some(DependencyOrigin::Path),
            _ => {}
        }
    }

    for open in blocks {
        if let Block::Group(names) = &open.block {
            for g in names {
                if !groups.contains(g) {
                    groups.push(g.clone());
                }
            }
        }
    }
    // innermost source block wins
    let origin = origin.or_else(|| {
        blocks.iter().rev().find_map(|open| match open.block {
            Block::Source(o) => Some(o),
            _ => None,
        })
    });

    let raw = constraints.join(", ");
    let version = parse_declared(Ecosystem::Ruby, (!raw.is_empty()).then_some(raw.as_str()));
    let (scope, group) = if groups.is_empty() {
        (Scope::Compile, "default".to_string())
    } else {
        (groups_scope(&groups), groups.join(","))
    };

    Ok(DeclaredDependency::new(name, Ecosystem::Ruby, scope)
        .with_version(version)
        .with_group(group)
        .with_origin(origin.unwrap_or_default())
        .at_line(line_no))
}

/// Directive name and its argument text: `gem "x"`, `gem("x")`
fn directive(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    let rest = line[end..].trim();
    let rest = match rest.strip_prefix('(') {
        Some(inner) => inner.strip_suffix(')').unwrap_or(inner),
        None => rest,
    };
    (&line[..end], rest)
}

impl ManifestParser for GemfileParser {
    fn format(&self) -> ManifestFormat {
        ManifestFormat::Gemfile
    }

    fn parse(&self, content: &str) -> Result<Vec<DeclaredDependency>, ManifestError> {
        let mut dependencies = Vec::new();
        let mut blocks: Vec<OpenBlock> = Vec::new();
        let mut in_heredoc: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            if let Some(terminator) = &in_heredoc {
                if raw.trim() == terminator {
                    in_heredoc = None;
                }
                continue;
            }
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with("=begin") {
                in_heredoc = Some("=end".to_string());
                continue;
            }

            if line == "end" || line.starts_with("end ") || line.starts_with("end.") {
                if blocks.pop().is_none() {
                    return Err(ManifestError::line_error("Gemfile", line_no, "unexpected 'end'"));
                }
                continue;
            }

            let (name, args) = directive(line);
            if name == "gem" {
                let args = args.trim_end_matches(" do").trim();
                dependencies.push(parse_gem(args, &blocks, line_no)?);
                if line.ends_with(" do") {
                    blocks.push(OpenBlock { block: Block::Other, line: line_no });
                }
                continue;
            }

            if let Some(block) = block_opener(line) {
                blocks.push(OpenBlock { block, line: line_no });
            }
        }

        if let Some(open) = blocks.last() {
            let what = match open.block {
                Block::Group(_) => "group",
                Block::Source(_) => "source",
                Block::Other => "do",
            };
            return Err(ManifestError::line_error(
                "Gemfile",
                open.line,
                format!("unterminated '{}' block", what),
            ));
        }

        Ok(dependencies)
    }

    fn metadata(&self, content: &str) -> ManifestMetadata {
        let mut meta = ManifestMetadata::default();
        for raw in content.lines() {
            let line = strip_comment(raw).trim();
            let (name, args) = directive(line);
            let first = split_args(args).ok().and_then(|a| a.into_iter().next());
            match name {
                "ruby" => {
                    if let Some(version) = first.as_deref().and_then(unquote) {
                        meta.facts.insert("ruby".to_string(), version.to_string());
                    } else if let Some((_, file)) = first.as_deref().and_then(keyword) {
                        meta.facts
                            .insert("ruby".to_string(), format!("file:{}", unquote(file).unwrap_or(file)));
                    }
                }
                "source" if !line.ends_with(" do") => {
                    if let Some(url) = first.as_deref().and_then(unquote) {
                        meta.facts.insert("source".to_string(), url.to_string());
                    }
                }
                "gemspec" => {
                    let path = split_args(args)
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|a| keyword(a))
                        .find(|(k, _)| *k == "path")
                        .map(|(_, v)| unquote(v).unwrap_or(v).to_string());
                    meta.includes
                        .push(path.map_or_else(|| "gemspec".to_string(), |p| format!("gemspec:{}", p)));
                }
                _ => {}
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
        GemfileParser.parse(content)
    }

    const GEMFILE: &str = r#"source "https://rubygems.org"
git_source(:github) { |repo| "https://github.com/#{repo}.git" }

ruby "3.2.2"

gem "rails", "~> 7.1.0"
gem 'pg', '>= 1.1', '< 2.0'
gem "puma" # web server
gem "bootsnap", require: false
gem "sidekiq", github: "sidekiq/sidekiq", branch: "main"
gem "local_tool", path: "vendor/local_tool"
gem "rack-mini-profiler", group: :development

group :development, :test do
  gem "debug", platforms: %i[ mri windows ]
  gem "rspec-rails", "~> 6.0"
end

group :test do
  gem "capybara"
end

gemspec
"#;

    fn find<'a>(deps: &'a [DeclaredDependency], name: &str) -> &'a DeclaredDependency {
        deps.iter().find(|d| d.coordinate == name).unwrap()
    }

    #[test]
    fn test_parse_gems() {
        let deps = parse(GEMFILE).unwrap();
        assert_eq!(deps.len(), 10);

        let rails = find(&deps, "rails");
        assert_eq!(rails.version.as_ref().unwrap().kind, VersionSpecKind::Pessimistic);
        assert_eq!(rails.scope, Scope::Compile);
        assert_eq!(rails.group.as_deref(), Some("default"));
        assert_eq!(rails.line, Some(6));

        let pg = find(&deps, "pg");
        assert_eq!(pg.declared_raw(), Some(">= 1.1, < 2.0"));
        assert_eq!(pg.version.as_ref().unwrap().kind, VersionSpecKind::Range);

        let puma = find(&deps, "puma");
        assert_eq!(puma.version.as_ref().unwrap().kind, VersionSpecKind::Any);
        assert_eq!(find(&deps, "bootsnap").declared_raw(), None);
    }

    #[test]
    fn test_parse_sources() {
        let deps = parse(GEMFILE).unwrap();
        assert_eq!(find(&deps, "sidekiq").origin, DependencyOrigin::Git);
        assert_eq!(find(&deps, "local_tool").origin, DependencyOrigin::Path);
        assert_eq!(find(&deps, "rails").origin, DependencyOrigin::Registry);
    }

    #[test]
    fn test_parse_groups() {
        let deps = parse(GEMFILE).unwrap();
        assert_eq!(find(&deps, "rack-mini-profiler").scope, Scope::Dev);

        let debug = find(&deps, "debug");
        assert_eq!(debug.scope, Scope::Dev);
        assert_eq!(debug.group.as_deref(), Some("development,test"));

        let capybara = find(&deps, "capybara");
        assert_eq!(capybara.scope, Scope::Test);
        assert_eq!(capybara.group.as_deref(), Some("test"));
    }

    #[test]
    fn test_metadata() {
        let meta = GemfileParser.metadata(GEMFILE);
        assert_eq!(meta.fact("ruby"), Some("3.2.2"));
        assert_eq!(meta.fact("source"), Some("https://rubygems.org"));
        assert_eq!(meta.includes, vec!["gemspec"]);
    }

    #[test]
    fn test_git_block_and_conditionals() {
        let content = r#"
git "https://github.com/rails/rails.git", branch: "main" do
  gem "activesupport"
end

if ENV["CI"]
  gem "simplecov", require: false
end

gem "tzinfo-data" if Gem.win_platform?
gem("nokogiri", ">= 1.15")
"#;
        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 4);
        assert_eq!(find(&deps, "activesupport").origin, DependencyOrigin::Git);
        assert_eq!(find(&deps, "simplecov").origin, DependencyOrigin::Registry);
        assert_eq!(find(&deps, "tzinfo-data").declared_raw(), None);
        assert_eq!(find(&deps, "nokogiri").declared_raw(), Some(">= 1.15"));
    }

    #[test]
    fn test_unterminated_group() {
        let err = parse("group :test do\n  gem \"rspec\"\n").unwrap_err();
        assert_eq!(err.to_string(), "Gemfile:1: unterminated 'group' block");
    }

    #[test]
    fn test_unexpected_end() {
        let err = parse("gem \"rake\"\nend\n").unwrap_err();
        assert_eq!(err.to_string(), "Gemfile:2: unexpected 'end'");
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse("gem \"rake\n").unwrap_err();
        assert!(err.to_string().contains("Gemfile:1: unterminated string"));
    }

    #[test]
    fn test_split_args() {
        assert_eq!(
            split_args(r#""a", "b, c", group: [:x, :y]"#).unwrap(),
            vec![r#""a""#, r#""b, c""#, "group: [:x, :y]"]
        );
    }
}

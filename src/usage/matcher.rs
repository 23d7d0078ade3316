//! Import path to coordinate matching
//!
//! - Go: longest module path that prefixes the import path
//! - JVM: group id prefix, narrowed by the artifact name when the import
//!   mentions it; well-known packages map through an alias table
//! - Python: normalised distribution name, alias table, common affixes
//! - Ruby: require path with `/` joined by `-`, then shorter prefixes
//! - Node: package name; `@types/x` also matches `x`

use crate::domain::Ecosystem;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PEP503_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// PEP 503 name normalisation
pub fn normalize_python_name(name: &str) -> String {
    PEP503_RE.replace_all(&name.to_ascii_lowercase(), "-").into_owned()
}

/// Import module -> distribution name
const PYTHON_ALIASES: &[(&str, &str)] = &[
    ("yaml", "pyyaml"),
    ("PIL", "pillow"),
    ("sklearn", "scikit-learn"),
    ("skimage", "scikit-image"),
    ("cv2", "opencv-python"),
    ("bs4", "beautifulsoup4"),
    ("dateutil", "python-dateutil"),
    ("jwt", "pyjwt"),
    ("attr", "attrs"),
    ("dotenv", "python-dotenv"),
    ("magic", "python-magic"),
    ("serial", "pyserial"),
    ("Crypto", "pycryptodome"),
    ("OpenSSL", "pyopenssl"),
    ("google.protobuf", "protobuf"),
    ("psycopg2", "psycopg2-binary"),
    ("MySQLdb", "mysqlclient"),
    ("zmq", "pyzmq"),
    ("git", "gitpython"),
    ("docx", "python-docx"),
    ("multipart", "python-multipart"),
    ("jose", "python-jose"),
    ("slugify", "python-slugify"),
    ("pkg_resources", "setuptools"),
];

/// Require path -> gem name
const RUBY_ALIASES: &[(&str, &str)] = &[
    ("active_support", "activesupport"),
    ("active_record", "activerecord"),
    ("active_model", "activemodel"),
    ("active_job", "activejob"),
    ("active_storage", "activestorage"),
    ("action_controller", "actionpack"),
    ("action_dispatch", "actionpack"),
    ("action_view", "actionview"),
    ("action_mailer", "actionmailer"),
    ("action_cable", "actioncable"),
    ("rspec", "rspec-core"),
    ("mongo", "mongo"),
    ("redis", "redis"),
    ("pg", "pg"),
];

/// Import package prefix -> group id
const JVM_ALIASES: &[(&str, &str)] = &[
    ("com.google.common", "com.google.guava"),
    ("akka", "com.typesafe.akka"),
    ("play.api", "com.typesafe.play"),
    ("cats", "org.typelevel"),
    ("zio", "dev.zio"),
    ("fs2", "co.fs2"),
    ("munit", "org.scalameta"),
    ("scalaz", "org.scalaz"),
    ("sttp", "com.softwaremill.sttp.client3"),
    ("lombok", "org.projectlombok"),
    ("kotlinx.coroutines", "org.jetbrains.kotlinx"),
    ("kotlinx.serialization", "org.jetbrains.kotlinx"),
    ("reactor", "io.projectreactor"),
    ("retrofit2", "com.squareup.retrofit2"),
    ("okhttp3", "com.squareup.okhttp3"),
];

/// True when `prefix` equals `path` or is followed by `sep` in it
fn has_segment_prefix(path: &str, prefix: &str, sep: char) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path[prefix.len()..].starts_with(sep))
}

struct JvmEntry {
    group: String,
    artifact: String,
    coordinate: String,
}

/// Maps import paths to declared coordinates of one ecosystem
pub struct CoordinateMatcher {
    ecosystem: Ecosystem,
    coordinates: Vec<String>,
    /// Normalised name -> coordinate (Python, Ruby, Node)
    by_name: HashMap<String, String>,
    jvm: Vec<JvmEntry>,
}

impl CoordinateMatcher {
    pub fn new(ecosystem: Ecosystem, coordinates: &[String]) -> Self {
        let mut by_name = HashMap::new();
        let mut jvm = Vec::new();
        for coordinate in coordinates {
            match ecosystem {
                Ecosystem::Python => {
                    by_name.insert(normalize_python_name(coordinate), coordinate.clone());
                }
                Ecosystem::Ruby | Ecosystem::Node => {
                    by_name.insert(coordinate.to_ascii_lowercase(), coordinate.clone());
                }
                Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => {
                    if let Some((group, artifact)) = coordinate.split_once(':') {
                        jvm.push(JvmEntry {
                            group: group.to_string(),
                            artifact: artifact.to_string(),
                            coordinate: coordinate.clone(),
                        });
                    }
                }
                Ecosystem::Go => {}
            }
        }
        Self {
            ecosystem,
            coordinates: coordinates.to_vec(),
            by_name,
            jvm,
        }
    }

    /// Returns every coordinate an import path refers to
    pub fn resolve(&self, path: &str) -> Vec<&str> {
        match self.ecosystem {
            Ecosystem::Go => self.resolve_go(path).into_iter().collect(),
            Ecosystem::Maven | Ecosystem::Gradle | Ecosystem::Sbt => self.resolve_jvm(path),
            Ecosystem::Python => self.resolve_python(path).into_iter().collect(),
            Ecosystem::Ruby => self.resolve_ruby(path).into_iter().collect(),
            Ecosystem::Node => self.resolve_node(path),
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    fn resolve_go(&self, path: &str) -> Option<&str> {
        self.coordinates
            .iter()
            .filter(|module| has_segment_prefix(path, module, '/'))
            .max_by_key(|module| module.len())
            .map(String::as_str)
    }

    fn resolve_jvm(&self, path: &str) -> Vec<&str> {
        let segments: Vec<&str> = path.split('.').collect();
        let aliased = JVM_ALIASES
            .iter()
            .find(|(prefix, _)| has_segment_prefix(path, prefix, '.'))
            .map(|(_, group)| *group);

        // full group prefix beats an alias, which beats a shared prefix of 3+ segments
        let rank = |entry: &JvmEntry| -> usize {
            let group: Vec<&str> = entry.group.split('.').collect();
            let common = group
                .iter()
                .zip(&segments)
                .take_while(|(a, b)| a == b)
                .count();
            if common == group.len() {
                200 + common
            } else if aliased == Some(entry.group.as_str()) {
                100
            } else if common >= 3 {
                common
            } else {
                0
            }
        };

        let best = self.jvm.iter().map(rank).max().unwrap_or(0);
        if best == 0 {
            return Vec::new();
        }
        let candidates: Vec<&JvmEntry> = self.jvm.iter().filter(|e| rank(e) == best).collect();

        let hinted: Vec<&str> = candidates
            .iter()
            .filter(|e| artifact_hint(&e.artifact, &segments))
            .map(|e| e.coordinate.as_str())
            .collect();
        if hinted.is_empty() {
            candidates.iter().map(|e| e.coordinate.as_str()).collect()
        } else {
            hinted
        }
    }

    fn resolve_python(&self, path: &str) -> Option<&str> {
        for (module, dist) in PYTHON_ALIASES {
            if has_segment_prefix(path, module, '.') {
                if let Some(found) = self.lookup(dist) {
                    return Some(found);
                }
            }
        }

        let segments: Vec<&str> = path.split('.').collect();
        // namespace packages: google.cloud.storage -> google-cloud-storage
        for len in (1..=segments.len().min(3)).rev() {
            let name = normalize_python_name(&segments[..len].join("-"));
            if let Some(found) = self.lookup(&name) {
                return Some(found);
            }
        }

        let top = normalize_python_name(segments[0]);
        [
            format!("python-{}", top),
            format!("{}-python", top),
            format!("{}-binary", top),
            format!("py{}", top),
        ]
        .iter()
        .find_map(|candidate| self.lookup(candidate))
    }

    fn resolve_ruby(&self, path: &str) -> Option<&str> {
        let segments: Vec<&str> = path.split('/').collect();
        for len in (1..=segments.len()).rev() {
            let joined = segments[..len].join("-").to_ascii_lowercase();
            if let Some(found) = self
                .lookup(&joined)
                .or_else(|| self.lookup(&joined.replace('_', "-")))
            {
                return Some(found);
            }
        }
        RUBY_ALIASES
            .iter()
            .filter(|(require, _)| has_segment_prefix(path, require, '/'))
            .find_map(|(_, gem)| self.lookup(gem))
    }

    fn resolve_node(&self, package: &str) -> Vec<&str> {
        let package = package.to_ascii_lowercase();
        let mut found: Vec<&str> = self.lookup(&package).into_iter().collect();
        if !package.starts_with('@') {
            if let Some(types) = self.lookup(&format!("@types/{}", package)) {
                found.push(types);
            }
        }
        found
    }
}

/// The artifact's distinguishing token (`jackson-databind` -> `databind`)
/// appears as a package segment
fn artifact_hint(artifact: &str, segments: &[&str]) -> bool {
    // strip Scala cross-version suffix: cats-core_2.13
    let artifact = artifact.split('_').next().unwrap_or(artifact);
    artifact
        .rsplit('-')
        .next()
        .is_some_and(|token| segments.contains(&token))
}

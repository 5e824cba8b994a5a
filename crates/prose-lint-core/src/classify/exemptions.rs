//! Word lists that keep prose from being mistaken for code.

use std::collections::HashSet;

/// Brand and product names whose casing or punctuation looks code-like.
pub const BRAND_NAMES: &[&str] = &[
    ".NET", "ADO.NET", "ASP.NET", "VB.NET", "Alpine.js", "Angular.js", "Backbone.js",
    "Chart.js", "D3.js", "Day.js", "Ember.js", "Express.js", "Gatsby.js", "Hapi.js",
    "Koa.js", "Math.js", "Meteor.js", "Moment.js", "Next.js", "Node.js", "Nuxt.js",
    "P5.js", "Paper.js", "Pixi.js", "React.js", "Socket.io", "Solid.js", "Three.js",
    "Vue.js", "Web3.js", "Ethers.js", "Deno.land", "Booking.com", "Amazon.com",
    "iPhone", "iPad", "iPod", "iOS", "iPadOS", "macOS", "watchOS", "tvOS", "visionOS",
    "iCloud", "iTunes", "iMac", "iMessage", "eBay", "eBook", "eCommerce", "eSports",
    "jQuery", "gRPC", "tRPC", "pH", "mRNA", "kWh", "mAh", "kHz", "vCPU", "vSphere",
    "vCenter", "bGaming", "openSUSE", "phpMyAdmin", "youtube.com",
];

/// Slash-joined pairs and shorthands that read as prose.
pub const PROSE_IDIOMS: &[&str] = &[
    "and/or", "either/or", "pass/fail", "read/write", "read/only", "true/false", "yes/no",
    "on/off", "in/out", "input/output", "client/server", "he/she", "he/him", "she/her",
    "they/them", "his/her", "s/he", "w/", "w/o", "n/a", "a/b", "24/7", "km/h", "m/s",
    "kb/s", "mb/s", "gb/s", "req/s", "ops/s", "per/day", "start/stop", "open/close",
    "before/after", "pros/cons", "plus/minus", "up/down", "left/right", "push/pull",
    "add/remove", "show/hide", "enable/disable", "get/set", "import/export", "copy/paste",
    "drag/drop", "login/logout", "sign-in/sign-up", "dev/test", "dev/prod", "day/night",
    "male/female", "win/loss", "his/hers", "mr/mrs", "q&a",
];

/// Abbreviations whose periods would otherwise look like extensions.
pub const ABBREVIATIONS: &[&str] = &[
    "e.g.", "i.e.", "etc.", "vs.", "cf.", "et al.", "a.m.", "p.m.", "ph.d.", "u.s.",
    "u.s.a.", "u.k.", "n.b.", "approx.", "no.", "fig.", "ca.", "mr.", "mrs.", "ms.",
    "dr.", "st.", "inc.", "ltd.", "co.",
];

/// File extensions recognized by the filename classifier.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mdx", "txt", "rst", "adoc", "json", "jsonc", "json5", "yaml", "yml",
    "toml", "ini", "cfg", "conf", "env", "xml", "csv", "tsv", "lock", "log", "js", "mjs",
    "cjs", "jsx", "ts", "mts", "cts", "tsx", "vue", "svelte", "astro", "html", "htm", "css",
    "scss", "sass", "less", "py", "pyi", "ipynb", "rb", "go", "rs", "java", "kt", "kts",
    "swift", "c", "h", "cc", "cpp", "hpp", "cs", "fs", "php", "pl", "lua", "r", "sql",
    "graphql", "gql", "proto", "sh", "bash", "zsh", "fish", "ps1", "bat", "cmd", "dockerfile",
    "tf", "tfvars", "hcl", "gradle", "sbt", "cabal", "nix", "ex", "exs", "erl", "clj",
    "scala", "dart", "zig", "wasm", "pdf", "png", "jpg", "jpeg", "gif", "svg", "webp",
    "ico", "mp3", "mp4", "wav", "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "dmg", "exe",
    "dll", "so", "dylib", "jar", "war", "whl", "pem", "crt", "key", "pub", "db", "sqlite",
    "bak", "tmp", "orig", "patch", "diff", "mk", "cmake", "plist", "xcconfig", "gemspec",
    "podspec", "editorconfig", "gitignore", "npmrc",
];

/// Extensions that are also English words; files using them score lower.
pub const AMBIGUOUS_EXTENSIONS: &[&str] = &["go", "so", "key", "pub", "log", "lock", "diff", "patch"];

/// Dotfiles and dot-directories that are almost always code.
pub const KNOWN_DOTFILES: &[&str] = &[
    "env", "gitignore", "gitattributes", "gitmodules", "gitkeep", "bashrc", "bash_profile",
    "zshrc", "profile", "npmrc", "nvmrc", "yarnrc", "editorconfig", "dockerignore",
    "prettierrc", "prettierignore", "eslintrc", "eslintignore", "babelrc", "browserslistrc",
    "stylelintrc", "git", "github", "gitlab", "vscode", "idea", "ssh", "config", "cargo",
    "husky", "venv", "cache", "local", "terraform", "tool-versions", "python-version",
    "node-version", "ruby-version", "htaccess", "netrc", "pypirc", "vimrc", "tmux",
];

/// Words that follow a tool name in prose rather than in a command.
pub const COMMAND_STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "to", "with", "without",
    "for", "in", "on", "at", "by", "of", "from", "into", "onto", "as", "is", "are", "was",
    "were", "be", "been", "has", "have", "had", "will", "would", "can", "could", "should",
    "may", "might", "must", "do", "does", "did", "this", "that", "these", "those", "it",
    "its", "if", "then", "than", "when", "while", "which", "who", "what", "where", "how",
    "why", "not", "also", "only", "just", "too", "very", "all", "any", "some", "each",
    "every", "both", "either", "neither", "i", "you", "we", "they", "he", "she", "us",
    "them", "your", "our", "their", "my", "his", "her", "users", "packages", "package",
    "registry", "ecosystem", "itself", "here", "there", "now", "first", "again", "instead",
    "automatically", "directly", "locally", "globally",
];

/// Words after `import` that mark prose ("import them", "import the data").
pub const IMPORT_STOPWORDS: &[&str] = &[
    "it", "its", "them", "this", "that", "these", "those", "the", "a", "an", "your", "my",
    "our", "their", "his", "her", "all", "any", "some", "each", "every", "new", "existing",
    "data", "files", "file", "and", "or", "from", "into", "to", "with", "as", "is", "are",
    "was", "will", "can", "should", "may", "must", "duties", "tax", "taxes", "goods",
    "settings", "contacts", "photos",
];

/// Suffixes written with a leading hyphen in prose ("an -ism").
pub const DERIVATIONAL_SUFFIXES: &[&str] = &[
    "ism", "ist", "ists", "isms", "like", "based", "gate", "ness", "ful", "less", "able",
    "ible", "tion", "sion", "wise", "ward", "wards", "phobia", "phile", "centric",
    "oriented", "driven", "free", "friendly", "ready", "style", "esque", "ish", "ship",
    "hood", "dom", "ment", "ly", "ize", "ise", "ology", "proof", "worthy", "related",
    "specific", "level", "aware", "first", "only", "heavy", "ed", "er", "est", "ing",
    "compatible", "powered", "enabled", "native",
];

/// Well-known environment variables without an underscore.
pub const KNOWN_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "USER", "SHELL", "PWD", "OLDPWD", "LANG", "TERM", "EDITOR", "VISUAL",
    "TMPDIR", "HOSTNAME", "PYTHONPATH", "GOPATH", "GOROOT", "GOBIN", "KUBECONFIG",
    "CARGO_HOME", "RUSTFLAGS", "CFLAGS", "LDFLAGS", "CXXFLAGS", "PAGER", "DISPLAY", "TZ",
    "LOGNAME", "MANPATH", "NODE_ENV", "RUST_LOG", "RUST_BACKTRACE",
];

/// Currency codes that look like shell variables after a dollar sign.
pub const CURRENCY_CODES: &[&str] = &["USD", "CAD", "AUD", "NZD", "HKD", "SGD", "MXN"];

/// Exemption lists applied per category, extended by configuration.
#[derive(Debug, Clone)]
pub struct Exemptions {
    brands: HashSet<String>,
    ignored: HashSet<String>,
    prose_idioms: HashSet<String>,
}

impl Default for Exemptions {
    fn default() -> Self {
        Self {
            brands: BRAND_NAMES.iter().map(|s| (*s).to_string()).collect(),
            ignored: HashSet::new(),
            prose_idioms: PROSE_IDIOMS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl Exemptions {
    /// Adds terms that are never reported, compared case-insensitively.
    #[must_use]
    pub fn with_ignored_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored
            .extend(terms.into_iter().map(|t| t.as_ref().to_lowercase()));
        self
    }

    /// Adds brand names, compared exactly.
    #[must_use]
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.brands
            .extend(brands.into_iter().map(|b| b.as_ref().to_string()));
        self
    }

    /// Returns true for a known brand or product name, including its
    /// plural and possessive forms (`iPhones`, `macOS's`).
    #[must_use]
    pub fn is_brand(&self, text: &str) -> bool {
        if self.brands.contains(text) {
            return true;
        }
        ["'s", "\u{2019}s", "s"]
            .iter()
            .filter_map(|suffix| text.strip_suffix(suffix))
            .any(|stem| !stem.is_empty() && self.brands.contains(stem))
    }

    /// Returns true for a configured ignored term.
    #[must_use]
    pub fn is_ignored(&self, text: &str) -> bool {
        !self.ignored.is_empty() && self.ignored.contains(&text.to_lowercase())
    }

    /// Returns true for a slash-joined prose idiom.
    #[must_use]
    pub fn is_prose_idiom(&self, text: &str) -> bool {
        self.prose_idioms.contains(&text.to_lowercase())
    }
}

/// Returns true for abbreviations such as `e.g.` or `U.S.`.
#[must_use]
pub fn is_abbreviation(text: &str) -> bool {
    let lower = text.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }
    let mut chars = lower.chars().peekable();
    let mut letters = 0;
    while let Some(c) = chars.next() {
        if !c.is_alphabetic() || chars.next() != Some('.') {
            return false;
        }
        letters += 1;
    }
    letters >= 2
}

/// Returns true for locale identifiers such as `en_US` or `zh_Hans`.
#[must_use]
pub fn is_locale_code(text: &str) -> bool {
    let Some((lang, region)) = text.split_once('_') else {
        return false;
    };
    let lang_ok = (2..=3).contains(&lang.len()) && lang.chars().all(|c| c.is_ascii_lowercase());
    let region_ok = (region.len() == 2 && region.chars().all(|c| c.is_ascii_uppercase()))
        || (region.len() == 4
            && region.starts_with(|c: char| c.is_ascii_uppercase())
            && region[1..].chars().all(|c| c.is_ascii_lowercase()));
    lang_ok && region_ok
}

/// Returns true when `word` is a derivational suffix like `ism` or `like`.
#[must_use]
pub fn is_derivational_suffix(word: &str) -> bool {
    let lower = word.to_lowercase();
    DERIVATIONAL_SUFFIXES.contains(&lower.as_str())
}

/// Returns true when `word` after a tool name signals prose.
#[must_use]
pub fn is_command_stopword(word: &str) -> bool {
    COMMAND_STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// Returns true when `word` after `import` signals prose.
#[must_use]
pub fn is_import_stopword(word: &str) -> bool {
    IMPORT_STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// Returns true when `ext` (without the dot) is a known file extension.
#[must_use]
pub fn is_known_extension(ext: &str) -> bool {
    KNOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations() {
        assert!(is_abbreviation("e.g."));
        assert!(is_abbreviation("U.S."));
        assert!(is_abbreviation("i.e."));
        assert!(!is_abbreviation("config.yml"));
        assert!(!is_abbreviation("a."));
    }

    #[test]
    fn locale_codes() {
        assert!(is_locale_code("en_US"));
        assert!(is_locale_code("zh_Hans"));
        assert!(!is_locale_code("user_id"));
        assert!(!is_locale_code("EN_US"));
    }

    #[test]
    fn ignored_terms_are_case_insensitive() {
        let exemptions = Exemptions::default().with_ignored_terms(["README"]);
        assert!(exemptions.is_ignored("readme"));
        assert!(!exemptions.is_ignored("LICENSE"));
    }

    #[test]
    fn brands_and_idioms() {
        let exemptions = Exemptions::default();
        assert!(exemptions.is_brand("Node.js"));
        assert!(!exemptions.is_brand("node.js"));
        assert!(exemptions.is_brand("iPhones"));
        assert!(exemptions.is_brand("macOS's"));
        assert!(!exemptions.is_brand("s"));
        assert!(exemptions.is_prose_idiom("And/Or"));
    }
}

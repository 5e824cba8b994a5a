//! The ordered recognizer table.

use super::exemptions::{
    is_abbreviation, is_command_stopword, is_derivational_suffix, is_import_stopword,
    is_known_extension, is_locale_code, AMBIGUOUS_EXTENSIONS, CURRENCY_CODES, KNOWN_DOTFILES,
    KNOWN_ENV_VARS,
};
use super::{Category, Classifier, Span, SpanContext, Verdict};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Predicate deciding a candidate span.
pub type Predicate = fn(&Span, &SpanContext<'_>) -> Option<Verdict>;

/// One recognizer: a candidate pattern and the predicate that judges it.
pub struct PatternEntry {
    /// Category produced.
    pub category: Category,
    /// Tie-break priority; lower wins.
    pub base_priority: u8,
    pattern: &'static LazyLock<Regex>,
    group: usize,
    trim: bool,
    predicate: Predicate,
}

impl std::fmt::Debug for PatternEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternEntry")
            .field("category", &self.category)
            .field("base_priority", &self.base_priority)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl Classifier for PatternEntry {
    fn category(&self) -> Category {
        self.category
    }

    fn base_priority(&self) -> u8 {
        self.base_priority
    }

    fn candidates(&self, line: &str) -> Vec<Range<usize>> {
        self.pattern
            .captures_iter(line)
            .filter_map(|caps| caps.get(self.group).map(|m| m.range()))
            .collect()
    }

    fn trims_punctuation(&self) -> bool {
        self.trim
    }

    fn classify(&self, span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
        (self.predicate)(span, ctx)
    }
}

macro_rules! regex {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($re).expect("valid regex"));
    };
}

regex!(URL_RE, r#"(?i)\b(?:(?:https?|ftps?|file)://|mailto:|www\.)[^\s<>"`]+"#);
regex!(
    EMAIL_RE,
    r"[A-Za-z0-9][A-Za-z0-9._%+-]*@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}"
);
regex!(
    ABBREVIATION_RE,
    r"(?i)(?:^|[^\w.])((?:[a-z]\.){2,}|etc\.|vs\.|cf\.|et al\.|approx\.)"
);
regex!(
    JS_IMPORT_RE,
    r#"\b(import\s+(?:type\s+)?(?:\{[^}\n]*\}|\*\s+as\s+[A-Za-z_$][\w$]*|[A-Za-z_$@](?:[\w$./@-]*[\w$])?)(?:\s*,\s*\{[^}\n]*\})?(?:\s+from\s+["'][^"'\n]+["'])?)"#
);
regex!(
    PY_IMPORT_RE,
    r"\b(from\s+[A-Za-z_][\w.]*\s+import\s+(?:\*|[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*))"
);
regex!(
    COMMAND_RE,
    r"\b(?:npm|npx|yarn|pnpm|bun|deno|node|git|gh|cargo|rustup|rustc|pip3|pipx|pip|poetry|uv|python3|python|go|docker-compose|docker|podman|kubectl|helm|terraform|brew|apt-get|apt|yum|dnf|make|cmake|curl|wget|ssh|scp|sudo|chmod|chown|mkdir|rm|cp|mv|ls|cd|cat|grep|sed|awk|tar|bundle|gem|rails|rake|mvn|gradle|dotnet|composer|php|java|ruby|mix|flutter|dart|swift|pod|ng|vite|webpack|eslint|prettier|jest|pytest|tox)\s+\S+(?:[ \t]+\S+){0,6}"
);
regex!(
    KEY_COMBO_RE,
    r"\b(?:Ctrl|Control|Cmd|Command|Alt|Option|Opt|Shift|Meta|Super|Win|Fn)(?:\s*\+\s*|-)(?:(?:Ctrl|Control|Cmd|Command|Alt|Option|Opt|Shift|Meta|Super|Win|Fn)(?:\s*\+\s*|-))*(?:Enter|Return|Tab|Escape|Esc|Space|Delete|Del|Backspace|Up|Down|Left|Right|Home|End|PageUp|PageDown|PgUp|PgDn|Insert|Click|F1[0-2]|F[1-9]|[A-Za-z0-9])\b"
);
regex!(
    HOST_PORT_RE,
    r"\b((?:localhost|(?:\d{1,3}\.){3}\d{1,3}|[A-Za-z0-9][A-Za-z0-9-]*(?:\.[A-Za-z0-9-]+)*):\d{2,5})\b"
);
regex!(IPV4_RE, r"\b((?:\d{1,3}\.){3}\d{1,3})\b");
regex!(
    FILE_PATH_RE,
    r#"(?:^|[\s(\[{"'])((?:~|\.{1,2})?/?[A-Za-z0-9_@.~*+-]+(?:/[A-Za-z0-9_@.~*{}+-]*)+)"#
);
regex!(WINDOWS_PATH_RE, r#"(?:^|[\s(\["'])([A-Za-z]:\\[A-Za-z0-9_.\\-]+)"#);
regex!(
    FILENAME_RE,
    r"(?:^|[^\w./\\@-])(\.?[A-Za-z0-9_][A-Za-z0-9_.-]*\.[A-Za-z0-9]{1,12})\b"
);
regex!(DOTFILE_RE, r#"(?:^|[\s(\["'])(\.[A-Za-z_][A-Za-z0-9_-]*)"#);
regex!(
    FUNCTION_CALL_RE,
    r"\b([A-Za-z_][A-Za-z0-9_$]*(?:(?:\.|::|->)[A-Za-z_$][A-Za-z0-9_$]*)*\([^()\n]{0,80}\))"
);
regex!(
    SHELL_VAR_RE,
    r"(\$\{[A-Za-z_][A-Za-z0-9_]*\}|\$[A-Za-z_][A-Za-z0-9_]*)"
);
regex!(
    CLI_FLAG_RE,
    r#"(?:^|[\s(\["'=])(--?[A-Za-z][A-Za-z0-9]*(?:[-_][A-Za-z0-9]+)*(?:=[^\s,;)]+)?)"#
);
regex!(
    ENV_VAR_RE,
    r"\b([A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+|[A-Z]{2,}[A-Z0-9]*)\b"
);
regex!(SNAKE_RE, r"\b([A-Za-z0-9]+(?:_[A-Za-z0-9]+)+)\b");
regex!(DUNDER_RE, r"(?:^|[^\w])(__[A-Za-z][A-Za-z0-9_]*?__)(?:[^\w]|$)");
regex!(CAMEL_RE, r"\b([a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+)\b");
regex!(PASCAL_RE, r"\b([A-Z][A-Za-z0-9]*[a-z0-9][A-Z][A-Za-z0-9]*)\b");

regex!(LETTER_ENUMERATION_RE, r"^[A-Za-z](?:/[A-Za-z])+$");
regex!(APERTURE_RE, r"^[fF]/\d+(?:\.\d+)?$");
regex!(NUMERIC_SLASH_RE, r"^[\d.,:%]+(?:/[\d.,:%]+)+$");

/// Recognizers in evaluation order.
pub static PATTERN_TABLE: &[PatternEntry] = &[
    entry(Category::Url, &URL_RE, 0, true, url),
    entry(Category::Url, &EMAIL_RE, 0, false, email),
    entry(Category::Abbreviation, &ABBREVIATION_RE, 1, false, abbreviation),
    entry(Category::Import, &JS_IMPORT_RE, 1, false, js_import),
    entry(Category::Import, &PY_IMPORT_RE, 1, true, py_import),
    entry(Category::Command, &COMMAND_RE, 0, false, command),
    entry(Category::KeyCombo, &KEY_COMBO_RE, 0, false, key_combo),
    entry(Category::NetworkAddress, &HOST_PORT_RE, 1, true, host_port),
    entry(Category::NetworkAddress, &IPV4_RE, 1, true, ipv4),
    entry(Category::FilePath, &FILE_PATH_RE, 1, true, file_path),
    entry(Category::FilePath, &WINDOWS_PATH_RE, 1, true, file_path),
    entry(Category::Filename, &FILENAME_RE, 1, true, filename),
    entry(Category::Dotfile, &DOTFILE_RE, 1, true, dotfile),
    entry(Category::FunctionCall, &FUNCTION_CALL_RE, 1, true, function_call),
    entry(Category::ShellVariable, &SHELL_VAR_RE, 1, true, shell_variable),
    entry(Category::CliFlag, &CLI_FLAG_RE, 1, true, cli_flag),
    entry(Category::EnvVar, &ENV_VAR_RE, 1, true, env_var),
    entry(Category::SnakeCase, &SNAKE_RE, 1, true, snake_case),
    entry(Category::SnakeCase, &DUNDER_RE, 1, false, dunder),
    entry(Category::CamelCase, &CAMEL_RE, 1, true, camel_case),
    entry(Category::PascalCase, &PASCAL_RE, 1, true, pascal_case),
];

const fn entry(
    category: Category,
    pattern: &'static LazyLock<Regex>,
    group: usize,
    trim: bool,
    predicate: Predicate,
) -> PatternEntry {
    PatternEntry {
        category,
        base_priority: category.priority(),
        pattern,
        group,
        trim,
        predicate,
    }
}

fn url(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    Some(Verdict::matched(span.clone(), Category::Url, 1.0, "URL"))
}

fn email(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx
        .before(span)
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return None;
    }
    Some(Verdict::matched(span.clone(), Category::Url, 1.0, "email address"))
}

fn abbreviation(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    is_abbreviation(&span.text)
        .then(|| Verdict::matched(span.clone(), Category::Abbreviation, 1.0, "abbreviation"))
}

fn js_import(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.preceding(span).split_whitespace().nth_back(1) == Some("from") {
        return None;
    }
    let target = span.text.strip_prefix("import")?.trim_start();
    let target = target.strip_prefix("type ").unwrap_or(target).trim_start();
    if span.text.contains(" from ") {
        return Some(Verdict::matched(span.clone(), Category::Import, 0.95, "import with source"));
    }
    if target.starts_with('{') || target.starts_with('*') {
        return Some(Verdict::matched(span.clone(), Category::Import, 0.9, "named import"));
    }
    let first = target.split_whitespace().next()?;
    if is_import_stopword(first) {
        return Some(Verdict::rejected(span.clone(), Category::Import, "prose use of import"));
    }
    if first.contains(['.', '/', '@', '_']) {
        return Some(Verdict::matched(span.clone(), Category::Import, 0.8, "module import"));
    }
    Some(Verdict::matched(span.clone(), Category::Import, 0.45, "bare word import"))
}

fn py_import(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    let module = span.text.split_whitespace().nth(1)?;
    if is_import_stopword(module) || is_command_stopword(module) {
        return Some(Verdict::rejected(span.clone(), Category::Import, "prose use of from/import"));
    }
    let confidence = if module.contains(['.', '_']) { 0.9 } else { 0.85 };
    Some(Verdict::matched(span.clone(), Category::Import, confidence, "from-import statement"))
}

const AMBIGUOUS_TOOLS: &[&str] = &[
    "go", "make", "node", "python", "python3", "cat", "cd", "ls", "cp", "mv", "rm", "sed",
    "awk", "tar", "grep", "mix", "swift", "dart", "java", "ruby", "php", "bundle", "gem",
    "helm", "pod", "apt", "uv", "bun", "ng", "ssh", "scp", "curl", "wget", "chmod", "chown",
    "mkdir", "sudo", "deno", "jest", "tox", "vite", "webpack", "eslint", "prettier",
    "pytest", "rails", "rake", "flutter", "mvn", "gradle", "composer", "dotnet", "brew",
];

fn subcommands(tool: &str) -> &'static [&'static str] {
    match tool {
        "npm" | "pnpm" | "bun" => &[
            "install", "i", "ci", "run", "test", "start", "build", "publish", "init", "update",
            "uninstall", "link", "exec", "audit", "pack", "version", "add", "remove", "dev",
        ],
        "yarn" => &["add", "install", "remove", "run", "build", "test", "start", "dev", "upgrade", "init"],
        "git" => &[
            "clone", "commit", "push", "pull", "checkout", "status", "add", "rebase", "merge",
            "log", "diff", "fetch", "branch", "stash", "init", "tag", "reset", "switch",
            "restore", "cherry-pick", "bisect", "remote", "blame", "show", "revert", "worktree",
        ],
        "gh" => &["pr", "issue", "repo", "release", "run", "workflow", "auth", "api"],
        "cargo" => &[
            "build", "run", "test", "check", "clippy", "fmt", "add", "install", "publish",
            "doc", "bench", "update", "new", "init", "clean", "tree",
        ],
        "docker" | "podman" => &[
            "run", "build", "compose", "pull", "push", "ps", "exec", "images", "stop", "rm",
            "logs", "login", "tag", "start",
        ],
        "docker-compose" => &["up", "down", "build", "logs", "ps", "exec", "run", "pull"],
        "pip" | "pip3" | "pipx" => &["install", "uninstall", "freeze", "list", "show", "download"],
        "poetry" | "uv" => &["add", "install", "run", "lock", "build", "publish", "sync", "venv", "pip"],
        "go" => &[
            "build", "run", "test", "get", "mod", "install", "fmt", "vet", "generate", "work",
            "clean", "env", "doc",
        ],
        "make" => &["install", "build", "test", "clean", "all", "check", "lint", "release", "dev", "run", "docs"],
        "kubectl" => &[
            "apply", "get", "describe", "delete", "logs", "exec", "create", "rollout",
            "port-forward", "config", "scale",
        ],
        "helm" => &["install", "upgrade", "uninstall", "repo", "template", "lint", "list"],
        "terraform" => &["init", "plan", "apply", "destroy", "validate", "fmt", "output", "import"],
        "brew" => &["install", "update", "upgrade", "uninstall", "tap", "services", "list", "info"],
        "apt" | "apt-get" | "yum" | "dnf" => &["install", "update", "upgrade", "remove", "purge", "search"],
        "rustup" => &["update", "install", "default", "target", "component", "toolchain", "show"],
        "python" | "python3" => &["-m", "-c", "manage.py", "setup.py"],
        "node" => &["--version", "index.js", "server.js"],
        "bundle" => &["install", "exec", "update"],
        "gem" => &["install", "update", "build", "push"],
        "rails" => &["new", "server", "console", "generate", "db:migrate", "routes", "s", "c", "g"],
        "rake" => &["test", "db:migrate", "spec"],
        "mvn" => &["install", "package", "test", "clean", "compile", "deploy", "verify"],
        "gradle" => &["build", "test", "clean", "assemble", "run", "bootRun"],
        "dotnet" => &["build", "run", "test", "new", "restore", "publish", "add"],
        "composer" => &["install", "require", "update", "dump-autoload"],
        "flutter" | "dart" => &["run", "build", "test", "pub", "create", "doctor", "analyze"],
        "swift" => &["build", "run", "test", "package"],
        "pod" => &["install", "update", "init"],
        "ng" => &["serve", "build", "generate", "new", "test"],
        "mix" => &["deps.get", "test", "compile", "phx.server", "ecto.migrate"],
        "deno" => &["run", "test", "fmt", "lint", "task", "compile"],
        "sudo" => &["apt", "apt-get", "yum", "dnf", "make", "npm", "docker", "systemctl", "chmod", "chown"],
        _ => &[],
    }
}

fn is_tool(word: &str) -> bool {
    COMMAND_RE
        .find(&format!("{word} x"))
        .is_some_and(|m| m.start() == 0)
}

/// Code-shaped command argument: a flag, a path, a variable, or key=value.
fn looks_code_like(word: &str) -> bool {
    word.starts_with('-')
        || word.starts_with('$')
        || word.contains(['/', '.', '@', '=', ':', '~', '_'])
        || is_tool(word)
}

fn trim_word(word: &str) -> &str {
    word.trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '"', '\''])
}

fn words_with_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, &text[s..]));
    }
    words
}

fn command(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if !ctx
        .before(span)
        .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | '[' | '"' | '\'' | '“'))
    {
        return None;
    }
    let words = words_with_offsets(&span.text);
    let (_, tool) = *words.first()?;
    let (arg_offset, raw_arg) = *words.get(1)?;
    let arg = trim_word(raw_arg);
    if arg.is_empty() {
        return None;
    }
    if is_command_stopword(arg) {
        let claimed = span.narrow(0, arg_offset + arg.len());
        return Some(Verdict::rejected(claimed, Category::Command, "tool name used in prose"));
    }

    let known = subcommands(tool).contains(&arg);
    let (confidence, reason) = if known {
        (0.9, "tool with known subcommand")
    } else if looks_code_like(arg) {
        (0.85, "tool with code-like argument")
    } else if AMBIGUOUS_TOOLS.contains(&tool) {
        return None;
    } else {
        (0.55, "tool with plain-word argument")
    };

    let mut end = arg_offset + arg.len();
    let mut previous = arg;
    if arg.len() == raw_arg.len() {
        for &(offset, raw) in &words[2..] {
            let word = trim_word(raw);
            if word.is_empty() {
                break;
            }
            let accept = looks_code_like(word) || subcommands(previous).contains(&word);
            if !accept {
                break;
            }
            end = offset + word.len();
            previous = word;
            if word.len() != raw.len() {
                break;
            }
        }
    }
    Some(Verdict::matched(span.narrow(0, end), Category::Command, confidence, reason))
}

fn key_combo(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    Some(Verdict::matched(span.clone(), Category::KeyCombo, 0.85, "key combination"))
}

fn valid_ipv4(text: &str) -> bool {
    let octets: Vec<&str> = text.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| o.parse::<u16>().is_ok_and(|n| n <= 255))
}

fn host_port(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.before(span).is_some_and(|c| matches!(c, ':' | '/' | '@' | '.')) {
        return None;
    }
    let (host, port) = span.text.rsplit_once(':')?;
    if port.parse::<u32>().map_or(true, |p| p > 65_535) {
        return None;
    }
    let (confidence, reason) = if host == "localhost" || valid_ipv4(host) {
        (0.9, "local or IP address with port")
    } else if !host.chars().any(char::is_alphabetic) {
        return None;
    } else if host.contains('.') {
        (0.8, "hostname with port")
    } else {
        (0.5, "single-label host with port")
    };
    Some(Verdict::matched(span.clone(), Category::NetworkAddress, confidence, reason))
}

fn ipv4(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if !valid_ipv4(&span.text) {
        return None;
    }
    let rest = ctx.following(span);
    if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(Verdict::matched(span.clone(), Category::NetworkAddress, 0.75, "IPv4 address"))
}

fn file_path(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    let text = span.text.as_str();
    if !text.contains(['/', '\\']) {
        return None;
    }
    let rejected = |reason| Some(Verdict::rejected(span.clone(), Category::FilePath, reason));
    if ctx.exemptions.is_prose_idiom(text) {
        return rejected("prose idiom");
    }
    if LETTER_ENUMERATION_RE.is_match(text) {
        return rejected("letter enumeration");
    }
    if APERTURE_RE.is_match(text) {
        return rejected("aperture notation");
    }
    if NUMERIC_SLASH_RE.is_match(text) {
        return rejected("numeric fraction or date");
    }

    let segments: Vec<&str> = text.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    if segments.len() >= 2
        && segments
            .iter()
            .all(|s| s.len() <= 5 && s.chars().all(|c| c.is_ascii_uppercase()))
    {
        return rejected("acronym pair");
    }

    let rooted = text.starts_with(['/', '~'])
        || text.starts_with("./")
        || text.starts_with("../")
        || text.as_bytes().get(1) == Some(&b':');
    let last = segments.last().copied().unwrap_or_default();
    let has_extension = last
        .rsplit_once('.')
        .is_some_and(|(name, ext)| !name.is_empty() && is_known_extension(ext));
    let plain = |s: &&str| s.chars().all(char::is_alphabetic);

    let (confidence, reason) = if rooted {
        (0.95, "rooted path")
    } else if has_extension {
        (0.9, "path to file")
    } else if text.ends_with(['/', '\\']) {
        (0.85, "directory path")
    } else if segments.len() >= 3 {
        (0.8, "nested path")
    } else if !segments.iter().all(plain) {
        (0.7, "path-like pair")
    } else if segments
        .iter()
        .all(|s| s.chars().all(|c| c.is_lowercase()))
    {
        (0.35, "two words joined by a slash")
    } else {
        (0.4, "capitalized words joined by a slash")
    };
    Some(Verdict::matched(span.clone(), Category::FilePath, confidence, reason))
}

fn filename(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    let text = span.text.as_str();
    if text.contains('/') || ctx.after(span) == Some('/') {
        return None;
    }
    if is_abbreviation(text) || is_abbreviation(&format!("{text}.")) {
        return Some(Verdict::rejected(span.clone(), Category::Filename, "abbreviation"));
    }
    if ctx.exemptions.is_brand(text) {
        return Some(Verdict::rejected(span.clone(), Category::Filename, "brand name"));
    }
    let (name, ext) = text.rsplit_once('.')?;
    if !is_known_extension(ext) || !name.chars().any(char::is_alphanumeric) {
        return None;
    }
    let ext = ext.to_lowercase();
    let (confidence, reason) = if AMBIGUOUS_EXTENSIONS.contains(&ext.as_str()) {
        (0.55, "filename with word-like extension")
    } else {
        (0.9, "filename with known extension")
    };
    Some(Verdict::matched(span.clone(), Category::Filename, confidence, reason))
}

fn dotfile(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    let rest = ctx.following(span);
    if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_alphanumeric()) {
        return None;
    }
    if ctx.exemptions.is_brand(&span.text) {
        return Some(Verdict::rejected(span.clone(), Category::Dotfile, "brand name"));
    }
    let name = span.text.trim_start_matches('.');
    let (confidence, reason) = if KNOWN_DOTFILES.contains(&name.to_lowercase().as_str()) {
        (0.9, "known dotfile")
    } else if name.starts_with(char::is_uppercase) {
        (0.3, "capitalized dot-word")
    } else {
        (0.6, "dot-prefixed name")
    };
    Some(Verdict::matched(span.clone(), Category::Dotfile, confidence, reason))
}

fn function_call(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    let text = span.text.as_str();
    let open = text.find('(')?;
    let name = &text[..open];
    let args = text.get(open + 1..text.len() - 1)?;
    if matches!(args, "s" | "es" | "ies" | "S" | "ES") {
        return Some(Verdict::rejected(span.clone(), Category::FunctionCall, "plural marker"));
    }
    let plain_name = name.chars().all(|c| c.is_ascii_lowercase());
    let code_args = args.contains(['=', ',', '"', '\'', '.', ':', '_', '[', '{']);
    if plain_name && args.split_whitespace().count() >= 2 && !code_args {
        return None;
    }
    let (confidence, reason) = if args.is_empty() {
        (0.9, "call with empty argument list")
    } else if name.contains(['.', '_', ':', '>']) || name.chars().skip(1).any(char::is_uppercase) {
        (0.85, "qualified or cased call")
    } else if code_args {
        (0.75, "call with code-like arguments")
    } else {
        (0.55, "word followed by parenthesized word")
    };
    Some(Verdict::matched(span.clone(), Category::FunctionCall, confidence, reason))
}

fn shell_variable(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.before(span).is_some_and(char::is_alphanumeric) {
        return None;
    }
    let name = span
        .text
        .trim_start_matches('$')
        .trim_start_matches('{')
        .trim_end_matches('}');
    if CURRENCY_CODES.contains(&name) {
        return Some(Verdict::rejected(span.clone(), Category::ShellVariable, "currency"));
    }
    let confidence = if name.chars().all(|c| !c.is_lowercase()) {
        0.9
    } else {
        0.8
    };
    Some(Verdict::matched(span.clone(), Category::ShellVariable, confidence, "shell variable"))
}

fn cli_flag(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.after(span).is_some_and(|c| c.is_alphanumeric()) {
        return None;
    }
    let text = span.text.as_str();
    let body = text.trim_start_matches('-');
    let word = body.split('=').next().unwrap_or(body);
    if text.starts_with("--") {
        return Some(Verdict::matched(span.clone(), Category::CliFlag, 0.9, "long option"));
    }
    if is_derivational_suffix(word) {
        return Some(Verdict::rejected(span.clone(), Category::CliFlag, "derivational suffix"));
    }
    let in_command = ctx
        .preceding(span)
        .split_whitespace()
        .rev()
        .take(4)
        .any(is_tool);
    let (confidence, reason) = if in_command {
        (0.9, "flag in command context")
    } else if word.len() == 1 {
        (0.8, "single-letter flag")
    } else if word.len() <= 3 {
        (0.75, "short flag cluster")
    } else {
        (0.6, "single-dash word")
    };
    Some(Verdict::matched(span.clone(), Category::CliFlag, confidence, reason))
}

fn env_var(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    let text = span.text.as_str();
    if text.contains('_') {
        return Some(Verdict::matched(span.clone(), Category::EnvVar, 0.85, "upper-case name with underscore"));
    }
    KNOWN_ENV_VARS
        .contains(&text)
        .then(|| Verdict::matched(span.clone(), Category::EnvVar, 0.5, "well-known environment variable"))
}

fn snake_case(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    let text = span.text.as_str();
    if text.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return Some(Verdict::rejected(span.clone(), Category::SnakeCase, "numeric or date"));
    }
    if is_locale_code(text) {
        return Some(Verdict::rejected(span.clone(), Category::SnakeCase, "locale code"));
    }
    if !text.chars().any(|c| c.is_ascii_lowercase()) {
        return None;
    }
    Some(Verdict::matched(span.clone(), Category::SnakeCase, 0.85, "snake_case identifier"))
}

fn dunder(span: &Span, _ctx: &SpanContext<'_>) -> Option<Verdict> {
    Some(Verdict::matched(span.clone(), Category::SnakeCase, 0.9, "dunder name"))
}

fn camel_case(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.exemptions.is_brand(&span.text) {
        return Some(Verdict::rejected(span.clone(), Category::CamelCase, "brand name"));
    }
    Some(Verdict::matched(span.clone(), Category::CamelCase, 0.85, "camelCase identifier"))
}

/// Lower-to-upper case transitions, ignoring a `Mc`/`Mac` surname prefix.
fn case_transitions(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = chars
        .windows(2)
        .filter(|w| (w[0].is_lowercase() || w[0].is_ascii_digit()) && w[1].is_uppercase())
        .count();
    let surname = |prefix: &str| {
        text.starts_with(prefix)
            && text[prefix.len()..].starts_with(char::is_uppercase)
    };
    if surname("Mc") || surname("Mac") {
        count = count.saturating_sub(1);
    }
    count
}

fn pascal_case(span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict> {
    if ctx.exemptions.is_brand(&span.text) {
        return Some(Verdict::rejected(span.clone(), Category::PascalCase, "brand name"));
    }
    match case_transitions(&span.text) {
        0 | 1 => None,
        2 => Some(Verdict::matched(span.clone(), Category::PascalCase, 0.75, "PascalCase identifier")),
        _ => Some(Verdict::matched(span.clone(), Category::PascalCase, 0.85, "PascalCase identifier")),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{run_classifier, Exemptions};
    use super::*;

    fn verdicts(entry_category: Category, line: &str) -> Vec<(String, bool, f64)> {
        let exemptions = Exemptions::default();
        let ctx = SpanContext {
            line,
            line_number: 1,
            exemptions: &exemptions,
        };
        PATTERN_TABLE
            .iter()
            .filter(|e| e.category == entry_category)
            .flat_map(|e| run_classifier(e, &ctx))
            .map(|v| (v.span.text, v.matched, v.confidence))
            .collect()
    }

    fn matched(category: Category, line: &str) -> Vec<String> {
        verdicts(category, line)
            .into_iter()
            .filter(|(_, m, _)| *m)
            .map(|(t, _, _)| t)
            .collect()
    }

    fn rejected(category: Category, line: &str) -> Vec<String> {
        verdicts(category, line)
            .into_iter()
            .filter(|(_, m, _)| !*m)
            .map(|(t, _, _)| t)
            .collect()
    }

    #[test]
    fn command_with_subcommand_and_flags() {
        assert_eq!(
            matched(Category::Command, "Then run cargo test --all-features, and relax."),
            vec!["cargo test --all-features"]
        );
    }

    #[test]
    fn command_rejects_prose() {
        assert!(matched(Category::Command, "Use npm or yarn to install.").is_empty());
        assert_eq!(
            rejected(Category::Command, "Use npm or yarn to install."),
            vec!["npm or"]
        );
        assert!(matched(Category::Command, "Make sure to go home.").is_empty());
        assert!(matched(Category::Command, "You need to make sure it works.").is_empty());
    }

    #[test]
    fn ambiguous_tool_needs_known_subcommand() {
        assert_eq!(matched(Category::Command, "Run go build now"), vec!["go build"]);
        assert!(matched(Category::Command, "We go further today").is_empty());
    }

    #[test]
    fn file_path_exemptions() {
        assert!(matched(Category::FilePath, "Answer yes and/or no").is_empty());
        assert!(matched(Category::FilePath, "Options A/B/C are valid").is_empty());
        assert!(matched(Category::FilePath, "Shot at f/2.8 today").is_empty());
        assert!(matched(Category::FilePath, "About 3/4 of users").is_empty());
        assert!(matched(Category::FilePath, "Use TCP/IP and I/O").is_empty());
    }

    #[test]
    fn file_path_confidence_by_shape() {
        let found = verdicts(Category::FilePath, "Edit src/lib.rs and ./scripts/run and cats/dogs");
        let conf = |text: &str| {
            found
                .iter()
                .find(|(t, _, _)| t == text)
                .map(|(_, _, c)| *c)
                .unwrap()
        };
        assert!((conf("src/lib.rs") - 0.9).abs() < f64::EPSILON);
        assert!((conf("./scripts/run") - 0.95).abs() < f64::EPSILON);
        assert!(conf("cats/dogs") < 0.5);
    }

    #[test]
    fn filename_and_brand() {
        assert_eq!(matched(Category::Filename, "Open package.json."), vec!["package.json"]);
        assert!(matched(Category::Filename, "Built with Node.js today").is_empty());
        assert_eq!(rejected(Category::Filename, "Built with Node.js today"), vec!["Node.js"]);
        assert!(matched(Category::Filename, "See e.g. the docs").is_empty());
    }

    #[test]
    fn dotfile_without_extension() {
        assert_eq!(matched(Category::Dotfile, "Copy .env first"), vec![".env"]);
        assert!(matched(Category::Dotfile, "Edit .eslintrc.json now").is_empty());
        assert_eq!(rejected(Category::Dotfile, "Port to .NET soon"), vec![".NET"]);
    }

    #[test]
    fn env_var_requires_underscore_or_known_name() {
        assert_eq!(matched(Category::EnvVar, "Set API_KEY now"), vec!["API_KEY"]);
        assert!(matched(Category::EnvVar, "The API and HTTP layers").is_empty());
        assert_eq!(matched(Category::EnvVar, "Add it to PATH"), vec!["PATH"]);
    }

    #[test]
    fn cli_flag_standalone_only() {
        assert_eq!(matched(Category::CliFlag, "Pass -v or --dry-run"), vec!["-v", "--dry-run"]);
        assert!(matched(Category::CliFlag, "A self-hosted tool").is_empty());
        assert_eq!(rejected(Category::CliFlag, "Another -ism appears"), vec!["-ism"]);
    }

    #[test]
    fn pascal_case_needs_two_transitions() {
        assert!(matched(Category::PascalCase, "Use JavaScript here").is_empty());
        assert!(matched(Category::PascalCase, "Ask McDonald today").is_empty());
        assert_eq!(
            matched(Category::PascalCase, "The UserProfileCard renders"),
            vec!["UserProfileCard"]
        );
    }

    #[test]
    fn snake_case_exclusions() {
        assert_eq!(matched(Category::SnakeCase, "Read user_id"), vec!["user_id"]);
        assert!(matched(Category::SnakeCase, "Locale en_US only").is_empty());
        assert!(matched(Category::SnakeCase, "Backup 2024_01_15 kept").is_empty());
    }

    #[test]
    fn import_excludes_pronouns() {
        assert!(matched(Category::Import, "You can import them later").is_empty());
        assert_eq!(
            matched(Category::Import, "Write import { useState } from 'react'; first"),
            vec!["import { useState } from 'react'"]
        );
        assert_eq!(
            matched(Category::Import, "Use from os.path import join here"),
            vec!["from os.path import join"]
        );
    }

    #[test]
    fn function_call_plural_marker() {
        assert!(matched(Category::FunctionCall, "Select the item(s) you need").is_empty());
        assert_eq!(
            matched(Category::FunctionCall, "Call fetchData() first"),
            vec!["fetchData()"]
        );
    }

    #[test]
    fn network_address_and_shell_variable() {
        assert_eq!(
            matched(Category::NetworkAddress, "Open localhost:3000 now"),
            vec!["localhost:3000"]
        );
        assert!(matched(Category::NetworkAddress, "Meet at 10:30 today").is_empty());
        assert_eq!(
            matched(Category::ShellVariable, "Echo $HOME and ${PATH}"),
            vec!["$HOME", "${PATH}"]
        );
    }

    #[test]
    fn key_combo() {
        assert_eq!(
            matched(Category::KeyCombo, "Press Ctrl+Shift+P to open"),
            vec!["Ctrl+Shift+P"]
        );
    }

    #[test]
    fn camel_case_brand_exemption() {
        assert!(matched(Category::CamelCase, "Buy an iPhone").is_empty());
        assert!(matched(Category::CamelCase, "Buy new iPhones today.").is_empty());
        assert!(matched(Category::CamelCase, "The iPad's screen").is_empty());
        assert_eq!(matched(Category::CamelCase, "Set maxRetries"), vec!["maxRetries"]);
    }
}

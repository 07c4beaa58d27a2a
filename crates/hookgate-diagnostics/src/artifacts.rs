//! Resolve a hook command to its on-disk artifacts.
//!
//! The runnable artifact is the first path-like token of the command after
//! variable expansion. A runnable compiled into a `dist/` directory with a
//! JavaScript extension is paired with `src/<stem>.ts` as its source; any
//! other runnable is its own source. Bare program names resolve via `PATH`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use hookgate_settings::expand_with;
use serde::Serialize;

const COMPILED_EXTENSIONS: &[&str] = &["mjs", "js", "cjs"];

/// Variables and search path used to resolve commands.
#[derive(Clone, Debug, Default)]
pub struct CommandEnv {
    vars: HashMap<String, String>,
    path_dirs: Vec<PathBuf>,
}

impl CommandEnv {
    /// Snapshot of the process environment, with `CLAUDE_PROJECT_DIR`
    /// overridden by `project_dir` when given.
    pub fn from_process(project_dir: Option<&str>) -> Self {
        let mut vars: HashMap<String, String> = std::env::vars().collect();
        if let Some(dir) = project_dir {
            let _ = vars.insert("CLAUDE_PROJECT_DIR".to_string(), dir.to_string());
        }
        let path_dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect())
            .unwrap_or_default();
        Self { vars, path_dirs }
    }

    /// Explicit environment, for tests and embedding.
    pub fn new(vars: HashMap<String, String>, path_dirs: Vec<PathBuf>) -> Self {
        Self { vars, path_dirs }
    }

    /// Expand `~` and `$VAR` references in `raw`.
    pub fn expand(&self, raw: &str) -> String {
        expand_with(raw, |name| self.vars.get(name).cloned())
    }

    /// Split a command into words, dropping shell quotes and expanding each.
    pub fn words(&self, command: &str) -> Vec<String> {
        command
            .split_whitespace()
            .map(|t| self.expand(&t.replace(['"', '\''], "")))
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn find_on_path(&self, program: &str) -> Option<PathBuf> {
        self.path_dirs
            .iter()
            .map(|dir| dir.join(program))
            .find(|candidate| candidate.is_file())
    }
}

/// Artifact paths and existence for one command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStatus {
    /// Short name: the runnable's file name, or the command itself.
    pub name: String,
    /// Resolved runnable path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runnable: Option<String>,
    /// Resolved source path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Whether the runnable exists.
    pub runnable_exists: bool,
    /// Whether the source exists.
    pub source_exists: bool,
}

/// First path-like word, or the program name when no word is a path.
pub fn runnable_token(words: Vec<String>) -> Option<String> {
    let path_like = words.iter().position(|t| t.contains('/')).unwrap_or(0);
    words.into_iter().nth(path_like)
}

/// Source artifact for a runnable: `…/dist/x.mjs` maps to `…/src/x.ts`.
pub fn source_for(runnable: &Path) -> PathBuf {
    let compiled = runnable
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| COMPILED_EXTENSIONS.contains(&ext));
    if !compiled {
        return runnable.to_path_buf();
    }

    let components: Vec<Component<'_>> = runnable.components().collect();
    let Some(dist_idx) = components
        .iter()
        .rposition(|c| c.as_os_str() == "dist")
    else {
        return runnable.to_path_buf();
    };

    let mut source: PathBuf = components[..dist_idx].iter().collect();
    source.push("src");
    for component in &components[dist_idx + 1..components.len() - 1] {
        source.push(component);
    }
    let stem = runnable.file_stem().unwrap_or_default().to_string_lossy();
    source.push(format!("{stem}.ts"));
    source
}

/// Resolve `command` to its artifacts and check they exist.
pub fn resolve_artifacts(command: &str, env: &CommandEnv) -> ArtifactStatus {
    let Some(token) = runnable_token(env.words(command)) else {
        return ArtifactStatus {
            name: command.to_string(),
            runnable: None,
            source: None,
            runnable_exists: false,
            source_exists: false,
        };
    };

    let runnable = if token.contains('/') {
        Some(PathBuf::from(&token))
    } else {
        env.find_on_path(&token)
    };

    let name = Path::new(&token)
        .file_name()
        .map_or_else(|| token.clone(), |n| n.to_string_lossy().into_owned());

    match runnable {
        Some(runnable) => {
            let source = source_for(&runnable);
            ArtifactStatus {
                name,
                runnable_exists: runnable.is_file(),
                source_exists: source.is_file(),
                runnable: Some(runnable.to_string_lossy().into_owned()),
                source: Some(source.to_string_lossy().into_owned()),
            }
        }
        None => ArtifactStatus {
            name,
            runnable: None,
            source: None,
            runnable_exists: false,
            source_exists: false,
        },
    }
}

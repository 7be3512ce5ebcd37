//! Secret reference resolver.
//!
//! Values in `config.toml` can point at secrets stored outside the file:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - `file::/path/to/secret` reads the file, trailing whitespace trimmed
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - anything else is used as-is

use std::path::Path;

/// A parsed config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    Plain(&'a str),
    Env(&'a str),
    File(&'a Path),
    Pass(&'a str),
}

impl<'a> SecretRef<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else if let Some(path) = value.strip_prefix("file::") {
            Self::File(Path::new(path))
        } else if let Some(entry) = value.strip_prefix("pass::") {
            Self::Pass(entry)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns true unless the value is plain text.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Plain(value) => Ok(value.to_string()),
            Self::Env(var) => resolve_env(var),
            Self::File(path) => resolve_file(path),
            Self::Pass(entry) => resolve_pass(entry),
        }
    }
}

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

fn resolve_env(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("environment variable `{}` is not set", var))
}

fn resolve_file(path: &Path) -> Result<String, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read secret file {}: {}", path.display(), e))?;
    let secret = content.trim_end();
    if secret.is_empty() {
        return Err(format!("secret file {} is empty", path.display()));
    }
    Ok(secret.to_string())
}

fn resolve_pass(entry: &str) -> Result<String, String> {
    let output = std::process::Command::new("pass")
        .arg("show")
        .arg(entry)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", entry, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            entry,
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("`pass show {}` produced no output", entry))
}

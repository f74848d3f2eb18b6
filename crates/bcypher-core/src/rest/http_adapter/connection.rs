use std::path::Path;

use reqwest::Url;

use crate::error::CoreError;

/// Resolve the API token.
///
/// Precedence:
/// 1. explicit `token`
/// 2. first non-empty line of `token_file`
/// 3. no token
pub fn resolve_token(
    token: Option<&str>,
    token_file: Option<&Path>,
) -> Result<Option<String>, CoreError> {
    if let Some(token) = token {
        let token = token.trim();
        if token.is_empty() {
            return Err(CoreError::InvalidConfig("api token must not be empty".to_owned()));
        }
        return Ok(Some(token.to_owned()));
    }

    let Some(token_file) = token_file else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(token_file).map_err(|e| {
        CoreError::InvalidConfig(format!(
            "failed to read token file {}: {e}",
            token_file.display()
        ))
    })?;
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| {
            CoreError::InvalidConfig(format!("token file {} is empty", token_file.display()))
        })?;
    if line.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidConfig(format!(
            "token file {} must contain a single token",
            token_file.display()
        )));
    }

    Ok(Some(line.to_owned()))
}

/// Validate an API root and strip any trailing slash so request paths can be
/// appended directly.
pub(super) fn parse_api_root(root: &str) -> Result<String, CoreError> {
    let parsed = Url::parse(root).map_err(|e| {
        CoreError::InvalidConfig(format!("invalid api root `{root}`: expected HTTP(S) URL ({e})"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(root.trim_end_matches('/').to_owned()),
        other => Err(CoreError::InvalidConfig(format!(
            "unsupported api root scheme `{other}`; expected http or https"
        ))),
    }
}

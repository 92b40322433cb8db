use crate::state::SearchState;
use rmcp::schemars;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ReloadCatalogRequest {
    /// Path to a catalog JSON file. Omit to re-read the current catalog file.
    #[serde(default)]
    pub path: Option<String>,
}

pub async fn handle_reload_catalog(
    state: &SearchState,
    request: ReloadCatalogRequest,
) -> Result<String, String> {
    let summary = match request.path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => {
            let path = PathBuf::from(expand_tilde(path).as_ref());
            state.load(&path).await
        }
        _ => state.reload().await,
    }
    .map_err(|e| {
        tracing::warn!("Catalog reload failed: {:#}", e);
        format!("{:#}", e)
    })?;

    serde_json::to_string_pretty(&summary).map_err(|e| format!("Failed to serialize summary: {}", e))
}

/// Expands a leading `~` to the user's home directory.
///
/// Returns `Cow::Borrowed` if no expansion was needed.
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_expand_tilde() {
        check!(expand_tilde("/tmp/catalog.json") == "/tmp/catalog.json");
        check!(expand_tilde("catalog.json") == "catalog.json");
        check!(expand_tilde("~user/catalog.json") == "~user/catalog.json");

        if let Some(home) = dirs::home_dir() {
            check!(expand_tilde("~") == home.display().to_string());
            check!(expand_tilde("~/data/catalog.json") == home.join("data/catalog.json").display().to_string());
        }
    }
}

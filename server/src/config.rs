use anyhow::{Context, Result};

const DEFAULT_ORIGIN: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub cors_allowed_origins: Vec<String>,
    /// Serves the GraphiQL explorer at `/graphiql`.
    pub graphiql: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cors_allowed_origins: vec![DEFAULT_ORIGIN.to_string()],
            graphiql: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let cors_allowed_origins = parse_origins(
            &std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGIN.into()),
        );
        let graphiql = match std::env::var("HUB_GRAPHIQL") {
            Ok(raw) => parse_flag(&raw).with_context(|| format!("invalid HUB_GRAPHIQL `{raw}`"))?,
            Err(_) => true,
        };
        Ok(Self {
            cors_allowed_origins,
            graphiql,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("expected a boolean"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_skip_blank_entries() {
        assert_eq!(
            parse_origins(" https://hub.jezweb.com.au ,, http://localhost:5173"),
            vec!["https://hub.jezweb.com.au", "http://localhost:5173"]
        );
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag("Yes").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}

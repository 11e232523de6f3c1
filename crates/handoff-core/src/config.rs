//! Startup configuration — one credential per backend, read once from the
//! environment.
//!
//! A variable left at its template placeholder counts as absent, so an
//! unedited `.env` never activates a provider.

use tracing::debug;

/// Environment variable and placeholder sentinel for one credential.
struct CredentialSpec {
    var: &'static str,
    placeholder: &'static str,
}

const OPENAI: CredentialSpec = CredentialSpec {
    var: "OPENAI_API_KEY",
    placeholder: "your_openai_api_key_here",
};
const PERPLEXITY: CredentialSpec = CredentialSpec {
    var: "PERPLEXITY_API_KEY",
    placeholder: "your_perplexity_api_key_here",
};
const GEMINI: CredentialSpec = CredentialSpec {
    var: "GEMINI_API_KEY",
    placeholder: "your_gemini_api_key_here",
};

/// Credentials for the backends, resolved once at process start.
///
/// `None` means the provider is inactive and will not appear in the
/// registry or the operation catalog.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Used by `from_env` and by
    /// tests that must not touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |cred: &CredentialSpec| -> Option<String> {
            match lookup(cred.var) {
                Some(value) if value.is_empty() || value == cred.placeholder => {
                    debug!("{} is set to the placeholder, ignoring", cred.var);
                    None
                }
                Some(value) => Some(value),
                None => None,
            }
        };

        Self {
            openai_api_key: resolve(&OPENAI),
            perplexity_api_key: resolve(&PERPLEXITY),
            gemini_api_key: resolve(&GEMINI),
        }
    }
}

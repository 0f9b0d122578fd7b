use crate::config::Config;
use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

/// A branch as returned by the management API. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Branch {
    pub slug: String,
}

/// The slice of the management API that branch commands depend on.
pub trait ManagementApi {
    /// Fetch a branch by slug. `Ok(None)` when the branch does not exist.
    fn get_branch(&self, slug: &str) -> Result<Option<Branch>>;
}

/// Blocking HTTP client for the management API.
pub struct HttpApi {
    client: Client,
    origin: String,
    token: String,
}

impl HttpApi {
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(token) = config.service_token.clone() else {
            bail!("no service token configured (set CFGCTL_SERVICE_TOKEN or service_token in the config file)");
        };
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("cfgctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            origin: config.api_origin.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl ManagementApi for HttpApi {
    fn get_branch(&self, slug: &str) -> Result<Option<Branch>> {
        let url = format!("{}/v1/branches/{slug}", self.origin);
        tracing::debug!(%url, "fetching branch");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .with_context(|| format!("requesting {url}"))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let branch = resp
                    .json::<Branch>()
                    .with_context(|| format!("parsing branch `{slug}`"))?;
                Ok(Some(branch))
            }
            status => bail!("fetching branch `{slug}` failed: HTTP {status}"),
        }
    }
}

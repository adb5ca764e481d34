use std::net::SocketAddr;

use serde::Deserialize;

const ENV_PREFIX: &str = "IMAGE_FETCH_";

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_user_agent() -> String {
    "image-fetch-api/1.0".to_string()
}

fn default_max_redirects() -> usize {
    20
}

#[derive(Deserialize)]
pub struct ConfigFlat {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub insecure_ssl: Option<String>,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub user_agent: String,
    pub insecure_ssl: bool,
    pub max_redirects: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            user_agent: default_user_agent(),
            insecure_ssl: false,
            max_redirects: default_max_redirects(),
        }
    }
}

impl From<ConfigFlat> for Config {
    fn from(flat: ConfigFlat) -> Self {
        let user_agent = flat.user_agent.trim();
        Config {
            bind: flat.bind,
            user_agent: if user_agent.is_empty() {
                default_user_agent()
            } else {
                user_agent.to_string()
            },
            insecure_ssl: flat.insecure_ssl.as_deref() == Some("1"),
            max_redirects: flat.max_redirects,
        }
    }
}

pub fn load() -> Result<Config, envy::Error> {
    let config_flat = envy::prefixed(ENV_PREFIX).from_env::<ConfigFlat>()?;
    Ok(config_flat.into())
}

/// Same as [`load`], over an explicit set of variables.
pub fn load_from<I>(vars: I) -> Result<Config, envy::Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    let config_flat = envy::prefixed(ENV_PREFIX).from_iter::<_, ConfigFlat>(vars)?;
    Ok(config_flat.into())
}

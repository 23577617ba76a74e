//! Upstream connection settings (`UPSTREAM_*` environment variables)

use serde::{Deserialize, Serialize};

/// Sandbox WSDL of the training component service
pub const DEFAULT_WSDL_URL: &str =
    "https://ws.sandbox.training.gov.au/Deewr.Tga.Webservices/TrainingComponentServiceV12.svc?wsdl";

/// Host serving the component XML files
pub const DEFAULT_XML_BASE_URL: &str = "https://training.gov.au/TrainingComponentFiles/";

/// Per-request timeout for SOAP calls and file downloads
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = "VetLearn-TGA-Ingester/1.0";

/// HTTP Basic credentials for the upstream service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TgaConfig {
    pub wsdl_url: String,
    pub xml_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Absent credentials are not a startup error; jobs fail instead
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl TgaConfig {
    /// Load from `UPSTREAM_*` keys, falling back to the legacy `TGA_*` names
    pub fn from_env() -> anyhow::Result<Self> {
        let username = env_non_empty("UPSTREAM_USERNAME").or_else(|| env_non_empty("TGA_USERNAME"));
        let password = env_non_empty("UPSTREAM_PASSWORD").or_else(|| env_non_empty("TGA_PASSWORD"));

        let config = Self {
            wsdl_url: env_non_empty("UPSTREAM_WSDL_URL").unwrap_or_else(|| DEFAULT_WSDL_URL.to_string()),
            xml_base_url: env_non_empty("UPSTREAM_XML_BASE_URL")
                .unwrap_or_else(|| DEFAULT_XML_BASE_URL.to_string()),
            timeout_secs: env_non_empty("UPSTREAM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: match (username, password) {
                (Some(username), Some(password)) => Some(Credentials::new(username, password)),
                _ => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.wsdl_url.starts_with("http://") || self.wsdl_url.starts_with("https://")) {
            anyhow::bail!("UPSTREAM_WSDL_URL must be an http(s) URL, got: {}", self.wsdl_url);
        }
        if !(self.xml_base_url.starts_with("http://") || self.xml_base_url.starts_with("https://")) {
            anyhow::bail!("UPSTREAM_XML_BASE_URL must be an http(s) URL, got: {}", self.xml_base_url);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }

    /// SOAP endpoint: the WSDL URL without its `?wsdl` query
    pub fn endpoint_url(&self) -> String {
        match self.wsdl_url.find('?') {
            Some(idx) if self.wsdl_url[idx + 1..].eq_ignore_ascii_case("wsdl") => {
                self.wsdl_url[..idx].to_string()
            },
            _ => self.wsdl_url.clone(),
        }
    }

    /// Download URL for a release file name
    pub fn file_url(&self, filename: &str) -> String {
        let base = self.xml_base_url.trim_end_matches('/');
        let name = filename.trim_start_matches('/');
        format!("{}/{}", base, name)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl Default for TgaConfig {
    fn default() -> Self {
        Self {
            wsdl_url: DEFAULT_WSDL_URL.to_string(),
            xml_base_url: DEFAULT_XML_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            credentials: None,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_strips_wsdl_query() {
        let config = TgaConfig::default();
        assert_eq!(
            config.endpoint_url(),
            "https://ws.sandbox.training.gov.au/Deewr.Tga.Webservices/TrainingComponentServiceV12.svc"
        );

        let plain = TgaConfig {
            wsdl_url: "http://localhost:9000/soap".to_string(),
            ..Default::default()
        };
        assert_eq!(plain.endpoint_url(), "http://localhost:9000/soap");
    }

    #[test]
    fn test_file_url_joins_with_single_slash() {
        let config = TgaConfig {
            xml_base_url: "http://files.local/base/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.file_url("BSB_R1.xml"), "http://files.local/base/BSB_R1.xml");
        assert_eq!(config.file_url("/BSB_R1.xml"), "http://files.local/base/BSB_R1.xml");
    }

    #[test]
    fn test_credentials_are_redacted_in_debug() {
        let creds = Credentials::new("operator", "hunter2");
        let printed = format!("{:?}", TgaConfig::default().with_credentials(creds));
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("operator"));
    }

    #[test]
    fn test_validation() {
        assert!(TgaConfig::default().validate().is_ok());

        let bad = TgaConfig {
            wsdl_url: "ftp://nope".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let zero = TgaConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_falls_back_to_legacy_keys() {
        let keys = ["UPSTREAM_USERNAME", "UPSTREAM_PASSWORD", "TGA_USERNAME", "TGA_PASSWORD"];
        for key in keys {
            std::env::remove_var(key);
        }

        assert!(TgaConfig::from_env().unwrap().credentials.is_none());

        std::env::set_var("TGA_USERNAME", "legacy");
        std::env::set_var("UPSTREAM_PASSWORD", "pw");
        let config = TgaConfig::from_env().unwrap();
        assert_eq!(config.credentials, Some(Credentials::new("legacy", "pw")));

        for key in keys {
            std::env::remove_var(key);
        }
    }
}

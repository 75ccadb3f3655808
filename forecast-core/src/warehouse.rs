//! Data warehouse connection settings
//!
//! Two connection styles are supported: a delegated OAuth token obtained on
//! behalf of the caller, and a service account with user and password.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Warehouse location and optional service account
#[derive(Clone, Serialize, Deserialize)]
pub struct WarehouseCredentials {
    pub schema: String,
    pub database: String,
    pub warehouse: String,
    pub role: String,
    pub account: String,
    pub host: String,

    /// Service account user, when token delegation is not used
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for WarehouseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseCredentials")
            .field("schema", &self.schema)
            .field("database", &self.database)
            .field("warehouse", &self.warehouse)
            .field("role", &self.role)
            .field("account", &self.account)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl WarehouseCredentials {
    /// Connection string authenticating with the caller's OAuth token
    pub fn token_connection_string(&self, token: &str) -> String {
        format!(
            "SCHEMA={};DB={};WAREHOUSE={};ROLE={};AUTHENTICATOR=OAUTH;TOKEN={};ACCOUNT={};HOST={}",
            self.schema, self.database, self.warehouse, self.role, token, self.account, self.host
        )
    }

    /// Connection string for the configured service account
    ///
    /// Returns `None` unless both user and password are set.
    pub fn service_account_connection_string(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        let password = self.password.as_deref()?;
        Some(format!(
            "SCHEMA={};DB={};WAREHOUSE={};ROLE={};AUTHENTICATOR=OAUTH;ACCOUNT={};HOST={};USER={};PASSWORD={};",
            self.schema, self.database, self.warehouse, self.role, self.account, self.host, user, password
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> WarehouseCredentials {
        WarehouseCredentials {
            schema: "WEATHER".into(),
            database: "FORECASTS".into(),
            warehouse: "COMPUTE_WH".into(),
            role: "READER".into(),
            account: "acct".into(),
            host: "acct.example.com".into(),
            user: None,
            password: None,
        }
    }

    #[test]
    fn test_token_connection_string() {
        assert_eq!(
            credentials().token_connection_string("abc.def"),
            "SCHEMA=WEATHER;DB=FORECASTS;WAREHOUSE=COMPUTE_WH;ROLE=READER;AUTHENTICATOR=OAUTH;TOKEN=abc.def;ACCOUNT=acct;HOST=acct.example.com"
        );
    }

    #[test]
    fn test_service_account_requires_user_and_password() {
        let mut creds = credentials();
        assert!(creds.service_account_connection_string().is_none());

        creds.user = Some("svc".into());
        assert!(creds.service_account_connection_string().is_none());

        creds.password = Some("pw".into());
        assert_eq!(
            creds.service_account_connection_string().as_deref(),
            Some("SCHEMA=WEATHER;DB=FORECASTS;WAREHOUSE=COMPUTE_WH;ROLE=READER;AUTHENTICATOR=OAUTH;ACCOUNT=acct;HOST=acct.example.com;USER=svc;PASSWORD=pw;")
        );
    }

    #[test]
    fn test_password_redacted_in_debug() {
        let mut creds = credentials();
        creds.password = Some("topsecret".into());
        assert!(!format!("{creds:?}").contains("topsecret"));
    }
}

/// Fixed service URLs the extension opens
use serde::{Deserialize, Serialize};

pub const POCKET_DOMAIN: &str = "getpocket.com";

/// Login entry page; after signing in the service routes to the
/// `extension_login_success` page, which the background closes.
const AUTH_URL: &str = "https://getpocket.com/login?src=extension&route=/extension_login_success";
const LOGOUT_URL: &str = "https://getpocket.com/logout?route=extension";
const POCKET_HOME: &str = "https://getpocket.com/home?src=extension";
const POCKET_LIST: &str = "https://getpocket.com/saves?src=extension";

/// URLs consumed as opaque configuration. Any field left out of an
/// override object keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    pub auth_url: String,
    pub logout_url: String,
    pub home_url: String,
    pub list_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            auth_url: AUTH_URL.to_string(),
            logout_url: LOGOUT_URL.to_string(),
            home_url: POCKET_HOME.to_string(),
            list_url: POCKET_LIST.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"homeUrl": "http://localhost:3000/home"}"#).unwrap();

        assert_eq!(endpoints.home_url, "http://localhost:3000/home");
        assert_eq!(endpoints.auth_url, AUTH_URL);
        assert_eq!(endpoints.list_url, POCKET_LIST);
    }

    #[test]
    fn test_defaults_point_at_service() {
        let endpoints = Endpoints::default();
        for url in [
            &endpoints.auth_url,
            &endpoints.logout_url,
            &endpoints.home_url,
            &endpoints.list_url,
        ] {
            assert!(url.starts_with("https://getpocket.com/"));
        }
    }

    #[test]
    fn test_auth_url_is_login_entry_not_success_page() {
        let endpoints = Endpoints::default();

        assert!(endpoints.auth_url.starts_with("https://getpocket.com/login?"));
        assert!(
            !endpoints
                .auth_url
                .starts_with("https://getpocket.com/extension_login_success")
        );
    }
}

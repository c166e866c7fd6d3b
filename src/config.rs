/// Production backend, used when nothing else is configured.
pub const PROD_API_BASE: &str = "https://sakura-backend.onrender.com";
/// Local development backend.
pub const DEV_API_BASE: &str = "http://localhost:8000";
/// Path the dashboard WebSocket microservice listens on.
pub const WS_PATH: &str = "/ws/dashboard";
/// Last-resort WebSocket endpoint when derivation fails.
pub const WS_FALLBACK: &str = "ws://localhost:8001/ws/dashboard";

/// Connection endpoints for the synchronizer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub ws_url: String,
}

impl ClientConfig {
    /// Resolves endpoints from the environment.
    ///
    /// API base is three-tier: `SAKURA_API_BASE` override, else the local
    /// development default when `SAKURA_ENV=development`, else production.
    /// The WebSocket URL honors `SAKURA_WS_BASE` when set, otherwise it is
    /// derived from the API base.
    pub fn from_env() -> Self {
        let api_base = std::env::var("SAKURA_API_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                if std::env::var("SAKURA_ENV").as_deref() == Ok("development") {
                    DEV_API_BASE.to_string()
                } else {
                    PROD_API_BASE.to_string()
                }
            });
        let ws_url = std::env::var("SAKURA_WS_BASE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(|base| {
                if base.ends_with(WS_PATH) {
                    base
                } else {
                    format!("{}{}", base.trim_end_matches('/'), WS_PATH)
                }
            })
            .unwrap_or_else(|| derive_ws_url(&api_base));
        Self { api_base, ws_url }
    }

    /// Builds a config from an explicit API base, deriving the WebSocket URL.
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into();
        let ws_url = derive_ws_url(&api_base);
        Self { api_base, ws_url }
    }
}

/// Derives the push-service URL from the API base: http becomes ws, https
/// becomes wss, the dev backend port 8000 maps to the WebSocket
/// microservice on 8001, and the `/ws/dashboard` path is appended.
pub fn derive_ws_url(api_base: &str) -> String {
    let rest = if let Some(rest) = api_base.strip_prefix("https://") {
        return format!("wss://{}{}", rest.trim_end_matches('/'), WS_PATH);
    } else if let Some(rest) = api_base.strip_prefix("http://") {
        rest
    } else {
        log::warn!(
            target: "Client/Config",
            "Cannot derive WebSocket URL from {api_base:?}, falling back to {WS_FALLBACK}"
        );
        return WS_FALLBACK.to_string();
    };

    let host = rest.trim_end_matches('/');
    let host = match host.strip_suffix(":8000") {
        Some(bare) => format!("{bare}:8001"),
        None => host.to_string(),
    };
    format!("ws://{host}{WS_PATH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_api_base_maps_to_ws_microservice_port() {
        assert_eq!(
            derive_ws_url("http://localhost:8000"),
            "ws://localhost:8001/ws/dashboard"
        );
    }

    #[test]
    fn production_base_derives_secure_url_without_port() {
        assert_eq!(
            derive_ws_url("https://sakura-backend.onrender.com"),
            "wss://sakura-backend.onrender.com/ws/dashboard"
        );
    }

    #[test]
    fn unparseable_base_falls_back() {
        assert_eq!(derive_ws_url("not a url"), WS_FALLBACK);
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(
            derive_ws_url("http://localhost:8000/"),
            "ws://localhost:8001/ws/dashboard"
        );
    }
}

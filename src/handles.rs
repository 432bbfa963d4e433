use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::HandleLookupError;
use crate::http_client::http_client;

const PRIVY_WALLET_LOOKUP_URL: &str = "https://auth.privy.io/api/v1/users/wallet/address";
const DISCORD_LEGACY_SUFFIX: &str = "#0";
const TRUNCATE_KEEP: usize = 6;

/// `0x1234...345678` style short form. Empty input stays empty.
pub fn truncate_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars = address.chars().collect::<Vec<_>>();
    let head = chars.iter().take(TRUNCATE_KEEP).collect::<String>();
    let tail = chars[chars.len().saturating_sub(TRUNCATE_KEEP)..]
        .iter()
        .collect::<String>();
    format!("{head}...{tail}")
}

/// Discord usernames migrated off discriminators come back as `name#0`.
pub fn strip_discord_suffix(username: &str) -> &str {
    username
        .strip_suffix(DISCORD_LEGACY_SUFFIX)
        .unwrap_or(username)
}

/// Social accounts linked to a wallet by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkedAccounts {
    pub discord_username: Option<String>,
    pub google_email: Option<String>,
    pub email: Option<String>,
}

/// Discord username, then Google email, then plain email, then the
/// truncated wallet.
pub fn pick_handle(wallet: &str, accounts: Option<&LinkedAccounts>) -> String {
    let Some(accounts) = accounts else {
        return truncate_address(wallet);
    };
    if let Some(name) = accounts.discord_username.as_deref().and_then(non_empty) {
        let name = strip_discord_suffix(name);
        if !name.is_empty() {
            return name.to_string();
        }
    }
    accounts
        .google_email
        .as_deref()
        .and_then(non_empty)
        .or_else(|| accounts.email.as_deref().and_then(non_empty))
        .map(str::to_string)
        .unwrap_or_else(|| truncate_address(wallet))
}

pub trait HandleSource: Send + Sync {
    fn lookup(&self, wallet: &str) -> Result<String, HandleLookupError>;
}

/// Outcome of a per-row lookup. `handle` is always displayable.
#[derive(Debug)]
pub struct HandleResolution {
    pub handle: String,
    pub degraded: Option<HandleLookupError>,
}

pub fn resolve_handle(source: Option<&dyn HandleSource>, wallet: &str) -> HandleResolution {
    let Some(source) = source else {
        return HandleResolution {
            handle: truncate_address(wallet),
            degraded: Some(HandleLookupError::MissingConfig(
                "HANDLE_LOOKUP_URL or PRIVY_APP_ID/PRIVY_APP_SECRET",
            )),
        };
    };
    match source.lookup(wallet) {
        Ok(handle) if !handle.trim().is_empty() => HandleResolution {
            handle: handle.trim().to_string(),
            degraded: None,
        },
        Ok(_) => HandleResolution {
            handle: truncate_address(wallet),
            degraded: None,
        },
        Err(err) => HandleResolution {
            handle: err
                .served_handle()
                .map(|h| h.trim().to_string())
                .unwrap_or_else(|| truncate_address(wallet)),
            degraded: Some(err),
        },
    }
}

/// Picks the configured lookup backend: the handle service when a URL is
/// set, otherwise the identity provider when both credentials are present.
pub fn handle_source_from_config(
    config: &Config,
) -> Result<Box<dyn HandleSource>, HandleLookupError> {
    if let Some(base) = config.handle_lookup_url.as_deref() {
        return Ok(Box::new(HandleService::new(base)));
    }
    let app_id = config
        .privy_app_id
        .clone()
        .ok_or(HandleLookupError::MissingConfig("PRIVY_APP_ID"))?;
    let secret = config
        .privy_app_secret
        .clone()
        .ok_or(HandleLookupError::MissingConfig("PRIVY_APP_SECRET"))?;
    Ok(Box::new(PrivyDirectory::new(app_id, secret)))
}

/// `GET {base}/api/getUserHandle?wallet=...` returning `{handle, error?}`.
#[derive(Debug, Clone)]
pub struct HandleService {
    base_url: String,
}

impl HandleService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HandleResponse {
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// A reported `error` comes back as `Upstream`, still carrying any handle
/// the service sent with it.
pub fn parse_handle_response_json(raw: &str) -> Result<String, HandleLookupError> {
    let resp: HandleResponse = serde_json::from_str(raw.trim())
        .map_err(|err| HandleLookupError::Payload(err.to_string()))?;
    if let Some(error) = resp.error.as_deref().and_then(non_empty) {
        return Err(HandleLookupError::Upstream {
            message: error.to_string(),
            handle: resp.handle,
        });
    }
    resp.handle
        .ok_or_else(|| HandleLookupError::Payload("missing handle".to_string()))
}

impl HandleSource for HandleService {
    fn lookup(&self, wallet: &str) -> Result<String, HandleLookupError> {
        let client = http_client()?;
        let url = format!("{}/api/getUserHandle", self.base_url.trim_end_matches('/'));
        let resp = client.get(url).query(&[("wallet", wallet)]).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(HandleLookupError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_handle_response_json(&body)
    }
}

/// Queries the identity provider's user directory directly.
#[derive(Debug, Clone)]
pub struct PrivyDirectory {
    lookup_url: String,
    app_id: String,
    app_secret: String,
}

impl PrivyDirectory {
    pub fn new(app_id: String, app_secret: String) -> Self {
        Self {
            lookup_url: PRIVY_WALLET_LOOKUP_URL.to_string(),
            app_id,
            app_secret,
        }
    }

    pub fn with_lookup_url(mut self, lookup_url: impl Into<String>) -> Self {
        self.lookup_url = lookup_url.into();
        self
    }

    fn user_by_wallet(&self, wallet: &str) -> Result<Option<LinkedAccounts>, HandleLookupError> {
        let client = http_client()?;
        let resp = client
            .post(self.lookup_url.as_str())
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header("privy-app-id", &self.app_id)
            .json(&serde_json::json!({ "address": wallet }))
            .send()?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text()?;
        if !status.is_success() {
            return Err(HandleLookupError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_privy_user_json(&body).map(Some)
    }
}

impl HandleSource for PrivyDirectory {
    fn lookup(&self, wallet: &str) -> Result<String, HandleLookupError> {
        let accounts = self.user_by_wallet(wallet)?;
        Ok(pick_handle(wallet, accounts.as_ref()))
    }
}

/// Extracts the social accounts from a user object's `linked_accounts`.
pub fn parse_privy_user_json(raw: &str) -> Result<LinkedAccounts, HandleLookupError> {
    let root: Value = serde_json::from_str(raw.trim())
        .map_err(|err| HandleLookupError::Payload(err.to_string()))?;
    let Some(linked) = root.get("linked_accounts").and_then(Value::as_array) else {
        return Err(HandleLookupError::Payload(
            "missing linked_accounts".to_string(),
        ));
    };

    let mut accounts = LinkedAccounts::default();
    for account in linked {
        let kind = account.get("type").and_then(Value::as_str).unwrap_or("");
        let (slot, field) = match kind {
            "discord_oauth" => (&mut accounts.discord_username, "username"),
            "google_oauth" => (&mut accounts.google_email, "email"),
            "email" => (&mut accounts.email, "address"),
            _ => continue,
        };
        if slot.is_none() {
            *slot = account
                .get(field)
                .and_then(Value::as_str)
                .and_then(non_empty)
                .map(str::to_string);
        }
    }
    Ok(accounts)
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

mod common;

use common::serve;
use xp_terminal::error::HandleLookupError;
use xp_terminal::handles::{HandleService, HandleSource, PrivyDirectory, resolve_handle};

const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";

#[test]
fn handle_service_sends_wallet_and_returns_handle() {
    let (base, rx) = serve(vec![(200, r#"{"handle":"alice"}"#.to_string())]);
    let service = HandleService::new(base);

    let out = resolve_handle(Some(&service as &dyn HandleSource), WALLET);
    assert_eq!(out.handle, "alice");
    assert!(out.degraded.is_none());

    let head = rx.recv().expect("request head").to_ascii_lowercase();
    assert!(head.starts_with(&format!("get /api/getuserhandle?wallet={WALLET}")));
}

#[test]
fn handle_service_bad_request_falls_back_to_short_wallet() {
    let (base, _rx) = serve(vec![(
        400,
        r#"{"error":"Wallet address is required"}"#.to_string(),
    )]);
    let service = HandleService::new(format!("{base}/"));

    let out = resolve_handle(Some(&service as &dyn HandleSource), WALLET);
    assert_eq!(out.handle, "0x1234...345678");
    assert!(matches!(
        out.degraded,
        Some(HandleLookupError::Status { status: 400, .. })
    ));
}

#[test]
fn directory_uses_credentials_and_picks_discord() {
    let user = r#"{"id":"did:privy:1","linked_accounts":[
        {"type":"wallet","address":"0x1234567890abcdef1234567890abcdef12345678"},
        {"type":"discord_oauth","username":"alice#0"}
    ]}"#;
    let (base, rx) = serve(vec![(200, user.to_string())]);
    let directory = PrivyDirectory::new("app-1".to_string(), "shh".to_string())
        .with_lookup_url(format!("{base}/api/v1/users/wallet/address"));

    let out = resolve_handle(Some(&directory as &dyn HandleSource), WALLET);
    assert_eq!(out.handle, "alice");
    assert!(out.degraded.is_none());

    let request = rx.recv().expect("request");
    let lower = request.to_ascii_lowercase();
    assert!(lower.starts_with("post /api/v1/users/wallet/address"));
    assert!(lower.contains("privy-app-id: app-1"));
    // base64("app-1:shh")
    assert!(request.contains("YXBwLTE6c2ho"));
    assert!(request.contains(&format!(r#""address":"{WALLET}""#)));
}

#[test]
fn directory_unknown_wallet_is_short_wallet() {
    let (base, _rx) = serve(vec![(404, r#"{"error":"User not found"}"#.to_string())]);
    let directory = PrivyDirectory::new("app-1".to_string(), "shh".to_string())
        .with_lookup_url(format!("{base}/lookup"));

    assert_eq!(directory.lookup(WALLET).expect("404 is not an error"), "0x1234...345678");
}

#[test]
fn directory_server_error_is_degraded() {
    let (base, _rx) = serve(vec![(500, "oops".to_string())]);
    let directory = PrivyDirectory::new("app-1".to_string(), "shh".to_string())
        .with_lookup_url(format!("{base}/lookup"));

    let out = resolve_handle(Some(&directory as &dyn HandleSource), WALLET);
    assert_eq!(out.handle, "0x1234...345678");
    assert!(matches!(
        out.degraded,
        Some(HandleLookupError::Status { status: 500, .. })
    ));
}

use xp_terminal::handles::{LinkedAccounts, pick_handle, truncate_address};

const WALLET: &str = "0x1234567890abcdef1234567890abcdef12345678";

#[test]
fn truncation_matches_short_form() {
    assert_eq!(truncate_address(""), "");
    assert_eq!(truncate_address(WALLET), "0x1234...345678");
}

#[test]
fn handle_priority_order() {
    let mut accounts = LinkedAccounts {
        discord_username: Some("alice#0".to_string()),
        google_email: Some("alice@gmail.com".to_string()),
        email: Some("alice@example.com".to_string()),
    };
    assert_eq!(pick_handle(WALLET, Some(&accounts)), "alice");

    accounts.discord_username = None;
    assert_eq!(pick_handle(WALLET, Some(&accounts)), "alice@gmail.com");

    accounts.google_email = Some("   ".to_string());
    assert_eq!(pick_handle(WALLET, Some(&accounts)), "alice@example.com");

    accounts.email = None;
    assert_eq!(pick_handle(WALLET, Some(&accounts)), "0x1234...345678");
    assert_eq!(pick_handle(WALLET, None), "0x1234...345678");
}

#[test]
fn bare_suffix_username_falls_through() {
    let accounts = LinkedAccounts {
        discord_username: Some("#0".to_string()),
        google_email: None,
        email: Some("bob@example.com".to_string()),
    };
    assert_eq!(pick_handle(WALLET, Some(&accounts)), "bob@example.com");
}

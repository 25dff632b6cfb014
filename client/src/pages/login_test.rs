use super::*;

#[test]
fn validate_login_input_trims_email_only() {
    assert_eq!(
        validate_login_input("  alice@example.com ", " pw "),
        Ok(("alice@example.com".to_owned(), " pw ".to_owned()))
    );
}

#[test]
fn validate_login_input_requires_both_fields() {
    assert_eq!(validate_login_input("   ", "pw"), Err("Enter your email and password."));
    assert_eq!(validate_login_input("a@b.c", ""), Err("Enter your email and password."));
}

use super::*;

#[test]
fn validate_email_input_trims() {
    assert_eq!(validate_email_input("  a@b.io "), Ok("a@b.io".to_owned()));
}

#[test]
fn validate_email_input_rejects_blank_and_malformed() {
    assert!(validate_email_input("").is_err());
    assert!(validate_email_input("not-an-email").is_err());
}

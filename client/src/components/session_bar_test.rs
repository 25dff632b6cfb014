use super::*;
use serde_json::json;
use session::User;

fn with_user(user: serde_json::Value) -> SessionSnapshot {
    SessionSnapshot { token_present: true, user: User::from_value(user), loading: false, auth_error: None }
}

#[test]
fn identity_prefers_name_then_email() {
    assert_eq!(identity_label(&with_user(json!({ "name": "Ada", "email": "ada@x.io" }))), "Ada");
    assert_eq!(identity_label(&with_user(json!({ "name": " ", "email": "ada@x.io" }))), "ada@x.io");
    assert_eq!(identity_label(&with_user(json!({ "id": 7 }))), "Account");
}

#[test]
fn identity_without_user_is_signed_out() {
    assert_eq!(identity_label(&SessionSnapshot::bootstrapping()), "Signed out");
}

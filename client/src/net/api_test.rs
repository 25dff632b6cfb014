use super::*;

#[test]
fn bearer_header_prefixes_scheme() {
    assert_eq!(bearer_header("abc.def"), "Bearer abc.def");
}

#[test]
fn endpoint_url_joins_without_double_slash() {
    assert_eq!(endpoint_url("https://api.streampay.test/", "/api/auth/me"), "https://api.streampay.test/api/auth/me");
    assert_eq!(endpoint_url("http://127.0.0.1:8000", "api/auth/login"), "http://127.0.0.1:8000/api/auth/login");
}

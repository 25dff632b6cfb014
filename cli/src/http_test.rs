use super::*;

#[derive(Debug)]
struct Leaf;

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("connection refused")
    }
}

impl std::error::Error for Leaf {}

#[derive(Debug)]
struct Wrapper(Leaf);

impl std::fmt::Display for Wrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("error sending request")
    }
}

impl std::error::Error for Wrapper {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[test]
fn describe_includes_error_sources() {
    assert_eq!(describe(&Wrapper(Leaf)), "error sending request: connection refused");
    assert_eq!(describe(&Leaf), "connection refused");
}

#[test]
fn url_joins_base_and_path() {
    let api = ReqwestAuthApi::new("http://127.0.0.1:8000/").unwrap();
    assert_eq!(api.url("/api/auth/me"), "http://127.0.0.1:8000/api/auth/me");
}

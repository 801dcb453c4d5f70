use std::io::Write;

use mimic::dsl::{parse_document, parse_routes};
use mimic::http::mime::MediaType;
use mimic::http::request::Method;
use mimic::routes::{Body, DEFAULT_STATUS};

const DOCUMENT: &str = r#"GET "/users/[0-9]+" {
    status(200);
    header("Content-Type", "application/json");
    body("{\"id\": 1}");
}

post "/users" {
    status_code = 201
    header(key: "Location", value: "/users/2")
    body = str("created")
}

Delete "/users/.*" {
    statusCode(204)
}
"#;

#[test]
fn test_parse_full_document() {
    let routes = parse_routes(DOCUMENT);
    assert_eq!(routes.len(), 3);

    assert_eq!(routes[0].method, Method::GET);
    assert_eq!(routes[0].path.as_str(), "/users/[0-9]+");
    assert_eq!(routes[0].response.status, 200);
    assert_eq!(
        routes[0].response.headers,
        vec![("Content-Type".to_string(), "application/json".to_string())]
    );
    assert_eq!(routes[0].response.body, Body::text(r#"{"id": 1}"#));

    assert_eq!(routes[1].method, Method::POST);
    assert_eq!(routes[1].response.status, 201);
    assert_eq!(
        routes[1].response.headers,
        vec![("Location".to_string(), "/users/2".to_string())]
    );
    assert_eq!(routes[1].response.body, Body::text("created"));

    assert_eq!(routes[2].method, Method::DELETE);
    assert_eq!(routes[2].response.status, 204);
    assert_eq!(routes[2].response.body, Body::text(""));
}

#[test]
fn test_parse_is_repeatable() {
    assert_eq!(parse_routes(DOCUMENT), parse_routes(DOCUMENT));
}

#[test]
fn test_crlf_document_matches_lf_document() {
    let crlf = DOCUMENT.replace('\n', "\r\n");
    assert_eq!(parse_routes(&crlf), parse_routes(DOCUMENT));
}

#[test]
fn test_lfcr_document_matches_lf_document() {
    let lfcr = DOCUMENT.replace('\n', "\n\r");
    assert_eq!(parse_routes(&lfcr), parse_routes(DOCUMENT));
    assert_eq!(parse_routes(&lfcr).len(), 3);
}

#[test]
fn test_status_codes_are_not_range_checked() {
    let routes = parse_routes(
        "GET \"/a\" {\n  status(299)\n}\nGET \"/b\" {\n  status(70000)\n}\nGET \"/c\" {\n  status = 0\n}",
    );

    assert_eq!(routes.len(), 3);
    assert_eq!(routes[0].response.status, 299);
    assert_eq!(routes[1].response.status, 70000);
    assert_eq!(routes[2].response.status, 0);
}

#[test]
fn test_empty_string_literal_rejects_document() {
    assert!(parse_routes("GET \"\" {\n  status(200)\n}").is_empty());
    assert!(parse_routes("GET \"/\" {\n  body(\"\")\n}").is_empty());
    assert!(parse_routes("GET \"/\" {\n  header(\"X-Empty\", \"\")\n}").is_empty());
}

#[test]
fn test_defaults_when_only_a_header_is_declared() {
    let routes = parse_routes("GET \"/ping\" {\n  header(\"X-Foo\", \"bar\")\n}");

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].response.status, DEFAULT_STATUS);
    assert_eq!(routes[0].response.body, Body::text(""));
}

#[test]
fn test_later_declarations_win() {
    let routes = parse_routes(
        "GET \"/\" {\n  status(500)\n  body(\"first\")\n  status(202)\n  body(\"second\")\n}",
    );

    assert_eq!(routes[0].response.status, 202);
    assert_eq!(routes[0].response.body, Body::text("second"));
}

#[test]
fn test_duplicate_headers_are_kept_in_order() {
    let routes = parse_routes(
        "GET \"/\" {\n  header(\"Set-Cookie\", \"a=1\")\n  header(\"Set-Cookie\", \"b=2\")\n}",
    );

    assert_eq!(
        routes[0].response.headers,
        vec![
            ("Set-Cookie".to_string(), "a=1".to_string()),
            ("Set-Cookie".to_string(), "b=2".to_string()),
        ]
    );
}

#[test]
fn test_string_transforms_and_interpolation() {
    let routes = parse_routes(
        "GET \"/\" {\n  body(\"  ${str(\"padded\")}  \".trim())\n}",
    );
    assert_eq!(routes[0].response.body, Body::text("padded"));

    let routes = parse_routes("GET \"/\" {\n  body(\"--x--\".trim(charArrayOf('-')))\n}");
    assert_eq!(routes[0].response.body, Body::text("x"));

    let routes = parse_routes("GET \"/\" {\n  body(\"cost: \\$5 ${}\")\n}");
    assert_eq!(routes[0].response.body, Body::text("cost: $5 "));
}

#[test]
fn test_file_body_declarations() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(b"{}").unwrap();
    let path = file.path().display().to_string();

    for form in [
        format!("body.file(\"{path}\")"),
        format!("body = file(\"{path}\")"),
        format!("BODY.FILE(\"{path}\");"),
    ] {
        let routes = parse_routes(&format!("GET \"/f\" {{\n  {form}\n}}"));
        assert_eq!(routes.len(), 1, "{form}");

        let body = &routes[0].response.body;
        assert_eq!(body.path(), Some(file.path()));
        assert_eq!(body.content_length(), Some(2));
        assert_eq!(
            body.content_type().map(MediaType::essence),
            Some("application/json".to_string())
        );
    }
}

#[test]
fn test_file_hash_body_declarations() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();
    let path = file.path().display().to_string();

    for form in [
        format!("body.file_hash(\"{path}\", \"MD5\")"),
        format!("body.file_hash(file_path = \"{path}\", algorithm: \"md5\")"),
        format!("body = file_hash(path: \"{path}\", alg = \"MD5\")"),
    ] {
        let routes = parse_routes(&format!("GET \"/h\" {{\n  {form}\n}}"));
        assert_eq!(routes.len(), 1, "{form}");
        assert_eq!(
            routes[0].response.body,
            Body::text("900150983cd24fb0d6963f7d28e17f72"),
            "{form}"
        );
    }
}

#[test]
fn test_file_hash_with_unknown_algorithm_rejects_document() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"abc").unwrap();
    let doc = format!(
        "GET \"/h\" {{\n  body.file_hash(\"{}\", \"ROT13\")\n}}",
        file.path().display()
    );

    assert!(parse_routes(&doc).is_empty());
}

#[test]
fn test_any_error_yields_no_routes() {
    let broken = format!("{DOCUMENT}\nGET \"/late\" {{\n  status(abc)\n}}\n");
    assert!(parse_routes(&broken).is_empty());

    assert!(parse_routes("").is_empty());
    assert!(parse_routes("PURGE \"/\" {\n  status(200)\n}").is_empty());
    assert!(parse_routes("GET \"/\" { status(200) }").is_empty());
    assert!(parse_routes("GET \"/\" {\n  status()\n}").is_empty());
}

#[test]
fn test_error_position_is_reported() {
    let err = parse_document("GET \"/\" {\n  status(abc)\n}").unwrap_err();

    assert_eq!(err.line, 2);
    assert_eq!(err.column, 10);
}

use super::*;
use std::fs;
use tempfile::tempdir;

fn api(endpoint: &str) -> ApiConfig {
    ApiConfig::new(endpoint, "secret-token".to_string(), 9)
}

/// Minimal multipart parser: returns (headers, content) of each part.
fn parse_parts(body: &[u8], boundary: &str) -> Vec<(String, Vec<u8>)> {
    let delimiter = format!("--{boundary}");
    let terminal = format!("--{boundary}--\r\n");
    assert!(body.ends_with(terminal.as_bytes()), "missing terminal boundary");

    let mut parts = Vec::new();
    let mut rest = &body[..body.len() - terminal.len()];
    while !rest.is_empty() {
        let start = format!("{delimiter}\r\n");
        assert!(rest.starts_with(start.as_bytes()), "missing part boundary");
        rest = &rest[start.len()..];

        let header_end = rest
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("missing header terminator");
        let headers = String::from_utf8(rest[..header_end].to_vec()).unwrap();
        rest = &rest[header_end + 4..];

        let next = format!("\r\n{delimiter}\r\n");
        let end = rest
            .windows(next.len())
            .position(|w| w == next.as_bytes())
            .map(|pos| (pos, pos + 2))
            .unwrap_or_else(|| {
                assert!(rest.ends_with(b"\r\n"));
                (rest.len() - 2, rest.len())
            });
        parts.push((headers, rest[..end.0].to_vec()));
        rest = &rest[end.1..];
    }
    parts
}

#[test]
fn test_api_config_strips_trailing_slash() {
    assert_eq!(api("http://host:1234/").endpoint, "http://host:1234");
    assert_eq!(api("http://host:1234//").endpoint, "http://host:1234");
    assert_eq!(
        api("http://host:1234/").upload_url(),
        "http://host:1234/api/documents/post_document/"
    );
}

#[test]
fn test_build_request_layout() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, b"%PDF-1.4\n").unwrap();

    let req = UploadRequest::build_with_boundary(
        &api("http://host:1234"),
        &path,
        "abc123".to_string(),
    )
    .unwrap();

    assert_eq!(req.url, "http://host:1234/api/documents/post_document/");
    assert_eq!(req.filename, "report.pdf");

    let expected = "--abc123\r\n\
         Content-Disposition: form-data; name=\"document\"; filename=\"report.pdf\"\r\n\
         Content-Type: application/pdf\r\n\
         \r\n\
         %PDF-1.4\n\r\n\
         --abc123--\r\n";
    assert_eq!(req.body, expected.as_bytes());

    assert_eq!(req.header("Accept"), Some("application/json; version=9"));
    assert_eq!(req.header("Authorization"), Some("Token secret-token"));
    assert_eq!(req.header("Connection"), Some("keep-alive"));
    assert_eq!(
        req.header("content-type"),
        Some("multipart/form-data; boundary=abc123")
    );
    assert_eq!(
        req.header("Content-Length"),
        Some(expected.len().to_string().as_str())
    );
}

#[test]
fn test_round_trip_single_document_part() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Ünïcode scan.unknownext123");
    // Binary content including CR/LF and dashes
    let content: Vec<u8> = b"--\r\n\xff\x00\r\n\r\n--x"
        .iter()
        .copied()
        .chain(0..=255u8)
        .collect();
    fs::write(&path, &content).unwrap();

    let req = UploadRequest::build(&api("https://paperless.example"), &path)
        .unwrap();
    assert_eq!(req.boundary.len(), 32);
    assert_eq!(
        req.header("Content-Length").unwrap(),
        req.body.len().to_string()
    );

    let parts = parse_parts(&req.body, &req.boundary);
    assert_eq!(parts.len(), 1);
    let (headers, body) = &parts[0];
    assert!(headers.contains("name=\"document\""));
    assert!(headers.contains("filename=\"Ünïcode scan.unknownext123\""));
    assert!(headers.contains("Content-Type: application/octet-stream"));
    assert_eq!(body, &content);
}

#[test]
fn test_boundary_differs_per_request() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, b"a").unwrap();

    let api = api("http://localhost:8000");
    let first = UploadRequest::build(&api, &path).unwrap();
    let second = UploadRequest::build(&api, &path).unwrap();
    assert_ne!(first.boundary, second.boundary);
}

#[test]
fn test_invalid_scheme_is_rejected_before_reading() {
    // The file does not exist; the scheme check must fire first.
    let err = UploadRequest::build(
        &api("ftp://host"),
        Path::new("/definitely/not/here.pdf"),
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(ref url) if url == "ftp://host"));
}

#[test]
fn test_missing_file_is_file_access_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.pdf");

    let err =
        UploadRequest::build(&api("http://localhost:8000"), &path).unwrap_err();
    match err {
        BuildError::FileAccess { path: p, source } => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_directory_is_file_access_error() {
    let dir = tempdir().unwrap();
    let err = UploadRequest::build(&api("http://localhost:8000"), dir.path())
        .unwrap_err();
    assert!(matches!(err, BuildError::FileAccess { .. }));
}

#[test]
fn test_outcome_task_id_and_result() {
    let ok = Outcome::Success {
        status: 200,
        body: "\"4b5c1a2e-task\"".to_string(),
    };
    assert_eq!(ok.task_id().as_deref(), Some("4b5c1a2e-task"));
    assert_eq!(ok.into_result().unwrap(), "\"4b5c1a2e-task\"");

    let forbidden = Outcome::HttpFailure {
        status: 403,
        reason: "Forbidden".to_string(),
        body: "{\"detail\":\"nope\"}".to_string(),
    };
    assert_eq!(forbidden.task_id(), None);
    let err = forbidden.into_result().unwrap_err();
    assert_eq!(err.to_string(), "HTTP Error 403: Forbidden");

    let transport = Outcome::TransportFailure {
        reason: "connection refused".to_string(),
    };
    assert_eq!(
        transport.into_result().unwrap_err().to_string(),
        "URL Error: connection refused"
    );
}

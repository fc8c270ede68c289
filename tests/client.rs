mod common;

use reqwest::StatusCode;
use subdb::protocol::upload_body;
use subdb::{SubDbError, UploadOutcome};

use common::{client_for, movie_bytes, serve};

#[test]
fn lists_languages_in_server_order() {
    let (base_url, server) = serve(1, |_| (200, b"en,pt,fr".to_vec()));
    let client = client_for(&base_url);

    assert_eq!(client.list_languages().unwrap(), vec!["en", "pt", "fr"]);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].target, "/?action=languages");
    assert_eq!(seen[0].header("user-agent"), Some("SubDB/1.0 (UnitTest/1.0)"));
}

#[test]
fn language_list_error_status_is_empty_vocabulary() {
    let (base_url, server) = serve(1, |_| (500, b"oops".to_vec()));
    let client = client_for(&base_url);

    assert!(client.list_languages().unwrap().is_empty());
    server.join().unwrap();
}

#[test]
fn download_passes_status_through() {
    let (base_url, server) = serve(1, |_| (404, Vec::new()));
    let client = client_for(&base_url);

    let response = client.download("abc123", "en").unwrap();
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
    assert!(!response.is_success());

    let seen = server.join().unwrap();
    assert_eq!(seen[0].target, "/?action=download&hash=abc123&language=en");
}

#[test]
fn search_with_version() {
    let (base_url, server) = serve(1, |_| (200, b"en:1,pt:2".to_vec()));
    let client = client_for(&base_url);

    let hits = client.search_languages("abc123", Some("1")).unwrap();
    let languages: Vec<_> = hits.iter().map(|h| (h.language.as_str(), h.versions)).collect();
    assert_eq!(languages, vec![("en", Some(1)), ("pt", Some(2))]);

    let seen = server.join().unwrap();
    assert_eq!(seen[0].target, "/?action=search&hash=abc123&version=1");
}

#[test]
fn upload_sends_hand_built_multipart() {
    let (base_url, server) = serve(1, |_| (201, Vec::new()));
    let client = client_for(&base_url);

    let status = client.upload("abc123", "Hello").unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let seen = server.join().unwrap();
    let request = &seen[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.target, "/?action=upload&hash=abc123");
    assert_eq!(request.header("content-type"), Some("multipart/form-data; boundary=xYzZY"));
    assert_eq!(request.header("pragma"), Some("no-cache"));
    assert_eq!(request.body, upload_body("abc123", "Hello").into_bytes());
}

#[test]
fn upload_file_hashes_the_movie() {
    let dir = tempfile::tempdir().unwrap();
    let movie = dir.path().join("movie.mp4");
    let subtitle = dir.path().join("movie.en.srt");
    std::fs::write(&movie, movie_bytes(200_000)).unwrap();
    std::fs::write(&subtitle, "Hello").unwrap();

    let (base_url, server) = serve(1, |_| (403, Vec::new()));
    let client = client_for(&base_url);

    let outcome = client.upload_file(&movie, &subtitle).unwrap();
    assert_eq!(outcome, UploadOutcome::Duplicate);

    let seen = server.join().unwrap();
    let hash = "e5940c62e6acd4c805bfb97254f77de4";
    assert_eq!(seen[0].target, format!("/?action=upload&hash={}", hash));
    assert_eq!(seen[0].body, upload_body(hash, "Hello").into_bytes());
}

#[test]
fn connection_refused_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(&base_url);
    assert!(matches!(client.languages(), Err(SubDbError::Network(_))));
}

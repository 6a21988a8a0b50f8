//! End-to-end requests through the public API over real asset stores

use assetd::backend;
use assetd::config::{AppState, AssetSource, Config};
use assetd::handler::{handle_request, StaticServer};
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use zip::write::SimpleFileOptions;

fn site(root: &Path) {
    fs::write(root.join("index.html"), "root index file").unwrap();
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("sub/index.html"), "sub index file").unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join("trap/index.html")).unwrap();
    fs::write(root.join("data.bin"), (0u8..=255).collect::<Vec<_>>()).unwrap();
}

fn state_for(source: AssetSource) -> Arc<AppState> {
    let mut config = Config::default();
    config.logging.access_log = false;
    config.assets.source = Some(source.clone());
    let server = StaticServer::from_backend(backend::from_source(&source).unwrap());
    Arc::new(AppState::new(config, server))
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, hyper::HeaderMap, String) {
    let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
    let req = Request::get(uri).body(()).unwrap();
    let resp = handle_request(req, Arc::clone(state), peer).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn directory_backend() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let state = state_for(AssetSource::Dir {
        path: dir.path().to_path_buf(),
    });

    let (status, headers, body) = get(&state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "root index file");
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/html"));
    assert!(headers.contains_key("etag"));
    assert!(headers.contains_key("last-modified"));

    let (status, _, body) = get(&state, "/sub/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "sub index file");

    let (status, _, body) = get(&state, "/sub/../sub/./index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "sub index file");

    for missing in ["/empty/", "/trap/", "/nope.txt", "/%ff"] {
        let (status, _, _) = get(&state, missing).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{missing}");
    }
}

#[tokio::test]
async fn directory_backend_stays_inside_root() {
    let outer = tempfile::tempdir().unwrap();
    fs::write(outer.path().join("secret.txt"), "secret").unwrap();
    let root = outer.path().join("public");
    fs::create_dir_all(&root).unwrap();
    site(&root);

    let state = state_for(AssetSource::Dir { path: root });
    for uri in ["/../secret.txt", "/sub/../../secret.txt", "/%2e%2e/secret.txt"] {
        let (status, _, body) = get(&state, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_ne!(body, "secret");
    }

    let (status, _, body) = get(&state, "/../index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "root index file");
}

#[tokio::test]
async fn directory_backend_ranges() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let state = state_for(AssetSource::Dir {
        path: dir.path().to_path_buf(),
    });
    let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

    let req = Request::get("/data.bin")
        .header("Range", "bytes=10-13")
        .body(())
        .unwrap();
    let resp = handle_request(req, Arc::clone(&state), peer).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.headers()["content-range"], "bytes 10-13/256");
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], &[10, 11, 12, 13]);

    let req = Request::get("/data.bin")
        .header("Range", "bytes=300-")
        .body(())
        .unwrap();
    let resp = handle_request(req, Arc::clone(&state), peer).await.unwrap();
    assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);

    let (_, headers, _) = get(&state, "/data.bin").await;
    let etag = headers["etag"].to_str().unwrap().to_string();
    let req = Request::get("/data.bin")
        .header("If-None-Match", etag)
        .body(())
        .unwrap();
    let resp = handle_request(req, state, peer).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
}

#[tokio::test]
async fn zip_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.zip");
    {
        let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file("index.html", options).unwrap();
        zip.write_all(b"root index file").unwrap();
        zip.start_file("sub/index.html", options).unwrap();
        zip.write_all(b"sub index file").unwrap();
        zip.start_file("css/site.css", options).unwrap();
        zip.write_all(b"body { margin: 0 }").unwrap();
        zip.finish().unwrap();
    }
    let state = state_for(AssetSource::Zip { path });

    let (status, _, body) = get(&state, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "root index file");

    let (status, _, body) = get(&state, "/sub").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "sub index file");

    let (status, headers, body) = get(&state, "/css/site.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body { margin: 0 }");
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/css"));

    let (status, _, _) = get(&state, "/css/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn not_a_directory_is_a_setup_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    let err = backend::from_source(&AssetSource::Dir { path: file }).err().unwrap();
    assert!(matches!(err, assetd::SetupError::NotADirectory(_)));
}

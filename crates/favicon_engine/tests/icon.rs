mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use favicon_core::{DownloadFailure, FailureKind};
use favicon_engine::{
    decode_icon, FetchMetadata, FetchOutput, FetchSettings, Fetcher, IconFetcher, ReqwestFetcher,
};
use image::GenericImageView;
use pretty_assertions::assert_eq;
use support::{ico_bytes, png_bytes};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn icon_fetcher() -> IconFetcher {
    IconFetcher::new(Arc::new(ReqwestFetcher::new(FetchSettings::default())), 20)
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

async fn serve_bytes(server: &MockServer, route: &str, bytes: Vec<u8>, mime: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(bytes, mime))
        .mount(server)
        .await;
}

#[test]
fn decode_icon_reads_ico_and_sniffs_other_formats() {
    let ico = decode_icon(&ico_bytes(32, [0, 0, 255, 255])).unwrap();
    assert_eq!(ico.dimensions(), (32, 32));

    let png = decode_icon(&png_bytes(24, [0, 255, 0, 255])).unwrap();
    assert_eq!(png.dimensions(), (24, 24));
}

#[test]
fn decode_icon_rejects_garbage() {
    let failure = decode_icon(b"<html>not an icon</html>").unwrap_err();
    assert_eq!(failure.kind, FailureKind::DecodeError);
    assert!(failure.message.contains("ico:"));
}

#[tokio::test]
async fn ico_is_fetched_and_decoded() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/favicon.ico", ico_bytes(32, [255, 0, 0, 255]), "image/x-icon").await;

    let target = url(&server, "/favicon.ico");
    let raw = icon_fetcher().fetch_icon(&target).await.unwrap();
    assert_eq!(raw.image.dimensions(), (32, 32));
    assert_eq!(raw.source_url, target);
}

#[tokio::test]
async fn png_served_under_ico_name_is_accepted() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/favicon.ico", png_bytes(16, [1, 2, 3, 255]), "image/x-icon").await;

    let raw = icon_fetcher()
        .fetch_icon(&url(&server, "/favicon.ico"))
        .await
        .unwrap();
    assert_eq!(raw.image.dimensions(), (16, 16));
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    serve_bytes(&server, "/favicon.ico", b"GIF89a-truncated".to_vec(), "image/gif").await;

    let err = icon_fetcher()
        .fetch_icon(&url(&server, "/favicon.ico"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::DecodeError);
    assert!(err.message.starts_with("Could not decode icon from"));
}

#[tokio::test]
async fn redirected_icon_is_requested_again_at_its_new_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old.ico"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/assets/new.ico", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/new.ico"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(ico_bytes(16, [9, 9, 9, 255]), "image/x-icon"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let raw = icon_fetcher()
        .fetch_icon(&url(&server, "/old.ico"))
        .await
        .unwrap();
    assert_eq!(raw.source_url.path(), "/assets/new.ico");
}

#[tokio::test]
async fn network_failures_carry_a_user_facing_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let target = url(&server, "/favicon.ico");
    let err = icon_fetcher().fetch_icon(&target).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(err
        .message
        .starts_with(&format!("Could not download favicon from {target}.")));
    assert!(err.message.contains("Technical details: http status 503"));
}

/// Answers every request with a fixed body and lets the test pick the URL the
/// response claims to have landed on.
struct ScriptedFetcher {
    calls: AtomicUsize,
    body: Vec<u8>,
    land_on: fn(&Url, usize) -> Url,
}

impl ScriptedFetcher {
    fn new(body: Vec<u8>, land_on: fn(&Url, usize) -> Url) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            body,
            land_on,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchOutput, DownloadFailure> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let final_url = (self.land_on)(url, call);
        Ok(FetchOutput {
            bytes: self.body.clone(),
            metadata: FetchMetadata {
                original_url: url.clone(),
                final_url,
                redirect_count: 1,
                content_type: Some("image/x-icon".to_string()),
                byte_len: self.body.len() as u64,
            },
        })
    }
}

#[tokio::test]
async fn icon_that_keeps_moving_gives_up_after_hop_cap() {
    let fetcher = ScriptedFetcher::new(ico_bytes(16, [0, 0, 255, 255]), |url, call| {
        let mut next = url.clone();
        next.set_query(Some(&format!("hop={call}")));
        next
    });
    let icons = IconFetcher::new(fetcher.clone(), 3);

    let err = icons
        .fetch_icon(&Url::parse("http://example.com/favicon.ico").unwrap())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::RedirectLoop);
    assert_eq!(fetcher.calls(), 4);
}

#[tokio::test]
async fn final_url_differing_only_in_case_is_not_refetched() {
    let fetcher = ScriptedFetcher::new(ico_bytes(16, [0, 128, 0, 255]), |_, _| {
        Url::parse("http://example.com/FAVICON.ICO").unwrap()
    });
    let icons = IconFetcher::new(fetcher.clone(), 3);
    let requested = Url::parse("http://example.com/favicon.ico").unwrap();

    let asset = icons.fetch_icon(&requested).await.unwrap();

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(asset.source_url, requested);
    assert_eq!(asset.image.dimensions(), (16, 16));
}

//! Integration tests for the CLI commands against a mock endpoint.

use std::io::Write;
use std::path::PathBuf;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use formrelay::config::{FAILURE_MESSAGE, SUCCESS_HTML};
use formrelay::{Outcome, RelayConfig, RelayEvent};
use formrelay_cli::commands::{forms, submit};

const PAGE: &str = r#"
<html><body>
    <form class="demo__form" id="contact" action="/api/contact">
        <input type="email" name="email" />
        <input type="checkbox" name="updates" value="weekly" />
        <button>Send</button>
    </form>
    <form id="search" action="/search"><input name="q" /></form>
</body></html>
"#;

fn write_page(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("page.html");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(PAGE.as_bytes()).unwrap();
    path
}

fn args(page: PathBuf, base_url: String) -> submit::SubmitArgs {
    submit::SubmitArgs {
        page,
        base_url: Some(base_url),
        quiet: true,
        ..submit::SubmitArgs::default()
    }
}

#[tokio::test]
async fn submit_accepted_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut args = args(write_page(&dir), server.uri());
    args.id = Some("contact".to_string());
    args.set = vec!["email=ada@example.com".to_string()];
    args.check = vec!["updates=weekly".to_string()];

    let report = submit::execute(&args).await.unwrap();
    assert!(report.relayed);
    assert!(report.accepted());
    assert_eq!(report.outcomes, vec![Outcome::Accepted { status: 200 }]);
    assert_eq!(report.content, SUCCESS_HTML);
    assert!(report.alerts.is_empty());
    assert_eq!(report.events.len(), 2);
    assert!(matches!(
        report.events[1],
        RelayEvent::SubmissionAccepted { status: 200, .. }
    ));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_string();
    assert!(body.contains("ada@example.com"));
    assert!(body.contains("weekly"));
}

#[tokio::test]
async fn submit_rejected_form_reports_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let args = args(write_page(&dir), server.uri());

    let report = submit::execute(&args).await.unwrap();
    assert!(report.relayed);
    assert!(!report.accepted());
    assert_eq!(report.alerts, vec![FAILURE_MESSAGE.to_string()]);
    assert!(report.content.contains("name=\"email\""));

    assert!(submit::run(args, false).await.is_err());
}

#[tokio::test]
async fn submit_native_form_is_not_relayed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut args = args(write_page(&dir), server.uri());
    args.form = Some(1);

    let report = submit::execute(&args).await.unwrap();
    assert!(!report.relayed);
    assert!(report.outcomes.is_empty());
    assert!(report.events.is_empty());
    assert!(submit::run(args, false).await.is_ok());
}

#[tokio::test]
async fn submit_unknown_field_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = args(write_page(&dir), "http://127.0.0.1:9/".to_string());
    args.set = vec!["phone=555".to_string()];
    assert!(submit::execute(&args).await.is_err());

    let mut args = args.clone();
    args.set.clear();
    args.id = Some("missing".to_string());
    assert!(submit::execute(&args).await.is_err());
}

#[tokio::test]
async fn forms_lists_relayed_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config = RelayConfig {
        base_url: "https://example.com/".to_string(),
        ..RelayConfig::default()
    };
    let listings = forms::list(&write_page(&dir), &config).await.unwrap();

    assert_eq!(listings.len(), 2);
    assert!(listings[0].relayed);
    assert_eq!(listings[0].summary.action, "https://example.com/api/contact");
    assert!(!listings[1].relayed);
    assert_eq!(listings[1].summary.id.as_deref(), Some("search"));
}

#[tokio::test]
async fn missing_page_is_an_error() {
    let args = args(
        PathBuf::from("/definitely/not/here.html"),
        "https://example.com/".to_string(),
    );
    let err = submit::execute(&args).await.unwrap_err();
    assert!(format!("{err:#}").contains("failed to read page"));
}

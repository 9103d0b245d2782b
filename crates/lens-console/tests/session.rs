//! Scripted sessions against the demo page and fixtures

use lens_console::{render_entry, Author, EntryBody, Session, SessionError, DEMO_PAGE, WELCOME};
use lens_host::{FrameWidth, HostConfig, ToggleDelivery, ViewportMode};
use lens_protocol::TrustedOrigin;
use lens_test_utils::HERO_PAGE;
use pretty_assertions::assert_eq;
use std::time::Duration;

#[tokio::test]
async fn demo_page_clicks_become_log_entries() {
    let outcome = Session::new(HostConfig::default())
        .with_clicks(["#hero", "h1", "#start"])
        .run(DEMO_PAGE)
        .await
        .unwrap();

    assert!(outcome.unmatched.is_empty());
    let entries = outcome.log.entries();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].body, EntryBody::Text(WELCOME.to_string()));

    let tags: Vec<&str> = outcome.log.inspections().map(|e| e.tag_name()).collect();
    assert_eq!(tags, vec!["SECTION", "H1", "BUTTON"]);
    assert!(entries[1..].iter().all(|entry| entry.author == Author::System));

    let hero = outcome.log.inspections().next().unwrap();
    assert_eq!(hero.class_name(), Some("card primary"));
    assert_eq!(hero.styles().padding, "32px");
    assert!(hero.inner_html().chars().count() <= 200);
}

#[tokio::test]
async fn unmatched_selectors_are_reported() {
    let outcome = Session::new(HostConfig::default())
        .with_clicks(["#nope", "#hero", "div p"])
        .run(HERO_PAGE)
        .await
        .unwrap();
    assert_eq!(outcome.unmatched, vec!["#nope".to_string(), "div p".to_string()]);
    assert_eq!(outcome.log.inspections().count(), 1);
}

#[tokio::test]
async fn viewport_and_gate_show_in_chrome() {
    let config = HostConfig::default().with_toggle_delivery(ToggleDelivery::ReadyGate);
    let outcome = Session::new(config)
        .with_viewport(ViewportMode::Tablet)
        .with_clicks(["#more"])
        .run(HERO_PAGE)
        .await
        .unwrap();
    assert_eq!(outcome.chrome.width, FrameWidth::Fixed(768));
    assert_eq!(outcome.chrome.status_label, "Inspector Active");

    let rendered = render_entry(outcome.log.last().unwrap());
    assert!(rendered.contains("**Tag:** `A`"));
    assert!(rendered.contains("- href: \"/more\""));
}

#[tokio::test]
async fn repeated_inspection_shares_identity() {
    let outcome = Session::new(HostConfig::default())
        .with_clicks(["#hero", "h1", "#hero"])
        .run(HERO_PAGE)
        .await
        .unwrap();
    let hero = outcome.log.inspections().next().unwrap().key();
    assert_eq!(outcome.log.inspection_count(&hero), 2);
}

#[tokio::test]
async fn document_that_never_reports_ready_times_out() {
    // the sandbox posts from the host origin, which this config does not trust
    let config = HostConfig::default().with_trusted_origin(TrustedOrigin::exact("https://elsewhere.example"));
    let wait = Duration::from_millis(200);
    let err = Session::new(config)
        .with_ready_timeout(wait)
        .with_clicks(["#hero"])
        .run(HERO_PAGE)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotReady(d) if d == wait));
    assert_eq!(err.to_string(), "preview document did not become ready within 200ms");
}

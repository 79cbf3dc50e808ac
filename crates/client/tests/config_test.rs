use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use agenda_client::{HttpAgendaSource, SourceConfig};

fn config() -> SourceConfig {
    SourceConfig::new("https://backend.example.org/api/", "119", Duration::from_secs(10))
}

#[test]
fn test_base_url_trailing_slash_is_trimmed() {
    assert_eq!(config().base_url, "https://backend.example.org/api");
}

#[rstest]
#[case("timeslots", "https://backend.example.org/api/meeting/119/timeslots")]
#[case("/assignments", "https://backend.example.org/api/meeting/119/assignments")]
#[case(
    "session/42/constraints",
    "https://backend.example.org/api/meeting/119/session/42/constraints"
)]
fn test_meeting_url(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(config().meeting_url(path), expected);
}

#[rstest]
#[case("/group/httpbis/", "https://backend.example.org/api/group/httpbis/")]
#[case("https://other.example.org/person/7/", "https://other.example.org/person/7/")]
fn test_resolve_href(#[case] href: &str, #[case] expected: &str) {
    assert_eq!(config().resolve(href), expected);
}

#[test]
fn test_http_source_keeps_config() {
    let source = HttpAgendaSource::new(config()).expect("client should build");

    assert_eq!(source.config().meeting, "119");
    assert_eq!(source.config().fetch_timeout, Duration::from_secs(10));
}

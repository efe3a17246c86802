mod common;

use std::sync::Arc;
use std::time::Duration;

use omnisearch_core::config::Config;
use omnisearch_core::core_service::OmnisearchService;
use omnisearch_core::input_controller::{run, ControllerState, InputEvent, Renderer};
use omnisearch_core::model::SearchResult;
use omnisearch_core::transport::TransportError;
use serde_json::json;

use common::{fixture_data, FixtureTransport};
use tokio::sync::mpsc;

const QUIESCENCE: Duration = Duration::from_millis(100);

#[derive(Default)]
struct RecordingRenderer {
    renders: Vec<Vec<String>>,
    navigations: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, results: &[SearchResult]) {
        self.renders
            .push(results.iter().map(|r| r.label().to_string()).collect());
    }

    fn navigate(&mut self, destination: &str) {
        self.navigations.push(destination.to_string());
    }
}

/// Answers every term with a single tag labelled after it.
fn echo_transport(delay_for: fn(&str) -> Duration) -> Arc<FixtureTransport> {
    Arc::new(FixtureTransport::from_fn(move |term| {
        let data = fixture_data(
            vec![json!({"id": format!("t-{term}"), "name": format!("Tag {term}")})],
            vec![],
            vec![],
            vec![],
        );
        (delay_for(term), Ok(data))
    }))
}

fn service(transport: Arc<FixtureTransport>) -> Arc<OmnisearchService> {
    Arc::new(OmnisearchService::with_transport(&Config::default(), transport).unwrap())
}

async fn send_after(tx: &mpsc::Sender<InputEvent>, wait: Duration, event: InputEvent) {
    tokio::time::sleep(wait).await;
    tx.send(event).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn burst_of_keystrokes_runs_one_round() {
    let transport = echo_transport(|_| Duration::from_millis(20));
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        tx.send(InputEvent::Open).await.unwrap();
        for text in ["j", "ja", "jan", "jane"] {
            send_after(&tx, Duration::from_millis(30), InputEvent::Text(text.into())).await;
        }
    };
    let (_, controller) = tokio::join!(producer, run(service(Arc::clone(&transport)), QUIESCENCE, rx, &mut renderer));

    assert_eq!(transport.terms(), ["jane"]);
    assert_eq!(renderer.renders, [vec!["Tag jane".to_string()]]);
    assert_eq!(controller.session().text(), "jane");
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_round_never_overwrites_newer_results() {
    let transport = echo_transport(|term| {
        if term == "a" {
            Duration::from_millis(300)
        } else {
            Duration::from_millis(10)
        }
    });
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Text("a".into())).await;
        // Long enough for the first round to be dispatched.
        send_after(&tx, Duration::from_millis(150), InputEvent::Text("ab".into())).await;
    };
    let (_, controller) = tokio::join!(producer, run(service(Arc::clone(&transport)), QUIESCENCE, rx, &mut renderer));

    assert_eq!(transport.terms(), ["a", "ab"]);
    assert_eq!(renderer.renders, [vec!["Tag ab".to_string()]]);
    let displayed: Vec<&str> = controller.session().displayed().iter().map(|r| r.label()).collect();
    assert_eq!(displayed, ["Tag ab"]);
}

#[tokio::test(start_paused = true)]
async fn empty_text_still_runs_a_round() {
    let transport = echo_transport(|_| Duration::ZERO);
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Text(String::new())).await;
    };
    tokio::join!(producer, run(service(Arc::clone(&transport)), QUIESCENCE, rx, &mut renderer));

    assert_eq!(transport.terms(), [""]);
    assert_eq!(renderer.renders.len(), 1);
    assert_eq!(renderer.renders[0].len(), 10);
}

#[tokio::test(start_paused = true)]
async fn close_clears_the_display() {
    let transport = echo_transport(|_| Duration::from_millis(5));
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Open).await;
        send_after(&tx, Duration::ZERO, InputEvent::Text("jane".into())).await;
        send_after(&tx, Duration::from_millis(200), InputEvent::Close).await;
    };
    let (_, controller) = tokio::join!(producer, run(service(transport), QUIESCENCE, rx, &mut renderer));

    assert_eq!(renderer.renders, [vec!["Tag jane".to_string()], Vec::new()]);
    assert!(!controller.session().is_visible());
    assert!(controller.session().displayed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn activating_a_result_navigates_to_it() {
    let transport = echo_transport(|_| Duration::ZERO);
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Text("jane".into())).await;
        send_after(&tx, Duration::from_millis(200), InputEvent::MoveSelection(1)).await;
        send_after(&tx, Duration::ZERO, InputEvent::Activate).await;
    };
    tokio::join!(producer, run(service(transport), QUIESCENCE, rx, &mut renderer));

    assert_eq!(renderer.navigations, ["/tags/t-jane"]);
}

#[tokio::test(start_paused = true)]
async fn failed_round_leaves_previous_list_on_screen() {
    let transport = Arc::new(FixtureTransport::from_fn(|term| {
        if term == "janet" {
            return (Duration::from_millis(5), Err(TransportError::Status { status: 503 }));
        }
        let data = fixture_data(
            vec![json!({"id": "t1", "name": format!("Tag {term}")})],
            vec![],
            vec![],
            vec![],
        );
        (Duration::from_millis(5), Ok(data))
    }));
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Text("jane".into())).await;
        send_after(&tx, Duration::from_millis(200), InputEvent::Text("janet".into())).await;
    };
    let (_, controller) = tokio::join!(producer, run(service(Arc::clone(&transport)), QUIESCENCE, rx, &mut renderer));

    assert_eq!(transport.terms(), ["jane", "janet"]);
    assert_eq!(renderer.renders, [vec!["Tag jane".to_string()]]);
    let displayed: Vec<&str> = controller.session().displayed().iter().map(|r| r.label()).collect();
    assert_eq!(displayed, ["Tag jane"]);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn panicking_round_does_not_stall_shutdown() {
    let transport = Arc::new(FixtureTransport::from_fn(|term| {
        if term == "boom" {
            panic!("responder blew up");
        }
        (Duration::ZERO, Ok(fixture_data(vec![], vec![], vec![], vec![])))
    }));
    let (tx, rx) = mpsc::channel(16);
    let mut renderer = RecordingRenderer::default();

    let producer = async move {
        send_after(&tx, Duration::ZERO, InputEvent::Text("boom".into())).await;
    };
    let (_, controller) = tokio::join!(producer, run(service(transport), QUIESCENCE, rx, &mut renderer));

    assert!(renderer.renders.is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);
}

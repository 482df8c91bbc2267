//! End-to-end: the plugin's WebSocket transport against the display server.

use fob_dashboard::{
    BuildStatus, ConnectionState, DashboardConfig, DashboardOptions, DashboardPlugin, HostContext,
    LifecycleSignal, Message, StaticEnvironment, StatsSummary,
};
use fob_dashboard_cli::display::{DisplayState, ProblemCounts};
use fob_dashboard_cli::server::DisplayServer;
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep, timeout};

async fn start_display(minimal: bool) -> (u16, mpsc::UnboundedReceiver<Vec<Message>>) {
    let server = DisplayServer::bind("127.0.0.1", 0, minimal).await.unwrap();
    let port = server.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(server.run(tx));
    (port, rx)
}

fn plugin_for(port: u16) -> DashboardPlugin {
    DashboardPlugin::new(DashboardOptions::new(DashboardConfig {
        host: "127.0.0.1".to_string(),
        port,
        root: None,
    }))
}

async fn next_batch(rx: &mut mpsc::UnboundedReceiver<Vec<Message>>) -> Vec<Message> {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("batch within 5s")
        .expect("server still running")
}

#[tokio::test]
async fn test_plugin_streams_build_to_display() {
    let (port, mut rx) = start_display(true).await;

    let host = HostContext::new().with_environment(StaticEnvironment(Some("test".to_string())));
    let mut bridge = plugin_for(port).bridge(host);
    let connection = bridge.connection().unwrap().clone();
    assert_eq!(connection.wait_for_settled().await, ConnectionState::Connected);

    for _ in 0..200 {
        if connection.minimal() {
            break;
        }
        sleep(Duration::from_millis(10)).await;
    }
    assert!(connection.minimal());

    bridge.handle(LifecycleSignal::WatchRun);
    bridge.handle(LifecycleSignal::Compile);
    bridge.handle(LifecycleSignal::progress(0.5, "building"));
    bridge.handle(LifecycleSignal::done(StatsSummary {
        modules: 2,
        errors: vec!["Cannot resolve './missing'".to_string()],
        warnings: vec!["Unused export".to_string(), "Large chunk".to_string()],
        ..StatsSummary::default()
    }));

    assert_eq!(
        next_batch(&mut rx).await,
        vec![Message::NodeEnv("test".to_string())]
    );

    let mut state = DisplayState::new();
    for _ in 0..3 {
        let batch = next_batch(&mut rx).await;
        state.apply(&batch);
    }

    assert_eq!(state.status, Some(BuildStatus::Success));
    assert_eq!(state.progress, 0.0);
    assert!(state.operations.starts_with("idle ("));
    assert_eq!(
        state.problems,
        Some(ProblemCounts {
            errors: 1,
            warnings: 2
        })
    );
    assert!(state.log.as_deref().unwrap_or_default().contains("2 modules"));

    assert!(!bridge.cleanup());
    bridge.handle(LifecycleSignal::Run);
    assert!(bridge.cleanup());
}

#[tokio::test]
async fn test_full_mode_is_not_minimal() {
    let (port, mut rx) = start_display(false).await;

    let bridge = plugin_for(port).bridge(HostContext::new());
    let connection = bridge.connection().unwrap().clone();
    assert_eq!(connection.wait_for_settled().await, ConnectionState::Connected);

    assert_eq!(
        next_batch(&mut rx).await,
        vec![Message::NodeEnv("development".to_string())]
    );
    assert!(!connection.minimal());
}

#[tokio::test]
async fn test_no_display_leaves_plugin_inert() {
    // Grab a free port, then release it so nothing listens there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut bridge = plugin_for(port).bridge(HostContext::new());
    let state = bridge.connection().unwrap().wait_for_settled().await;
    assert_eq!(state, ConnectionState::Closed);

    bridge.handle(LifecycleSignal::Compile);
    bridge.handle(LifecycleSignal::done(StatsSummary::default()));
    assert!(!bridge.cleanup());
}

//! End-to-end driver lifecycle tests against the mock bulk loader and server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use graphbench_backend::{
    BackendError, BenchmarkPlan, Connector, Driver, MillenniumDriver, SamplingBenchmark,
    TcpConnector,
};
use graphbench_config::{MillenniumSettings, ServerSettings};
use graphbench_core::{node_label, read_dump, FeatureMatrix, Graph};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const STORE: &str = "feat";

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn settings(create_db: &Path) -> MillenniumSettings {
    MillenniumSettings {
        create_db_path: create_db.to_path_buf(),
        server_path: PathBuf::from(env!("CARGO_BIN_EXE_mock-server")),
        buffer_size: Some(1024),
        store_name: STORE.to_string(),
    }
}

fn server_settings(port: u16) -> ServerSettings {
    ServerSettings {
        host: "127.0.0.1".to_string(),
        port,
        poll_interval_ms: 25,
        ready_timeout_secs: 20,
    }
}

fn driver_with_loader(temp: &TempDir, create_db: &Path) -> MillenniumDriver {
    MillenniumDriver::new(
        &settings(create_db),
        temp.path().join("data"),
        &server_settings(free_port()),
    )
    .unwrap()
}

fn driver(temp: &TempDir) -> MillenniumDriver {
    driver_with_loader(temp, Path::new(env!("CARGO_BIN_EXE_mock-create-db")))
}

/// Ten nodes, twelve edges, three features per node.
fn small_graph() -> Graph {
    let edges = vec![
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 4),
        (4, 5),
        (5, 6),
        (6, 7),
        (7, 8),
        (8, 9),
        (9, 0),
        (0, 5),
        (3, 8),
    ];
    let rows = (0..10)
        .map(|i| vec![i as f32, i as f32 * 0.5, -(i as f32)])
        .collect();
    Graph::new(10, edges, Some(FeatureMatrix::new(3, rows).unwrap())).unwrap()
}

#[tokio::test]
async fn test_create_serve_sample_delete() {
    let temp = TempDir::new().unwrap();
    let mut driver = driver(&temp);
    let graph = small_graph();

    let db_path = driver.create("T1", &graph).await.unwrap();
    assert_eq!(db_path, temp.path().join("data").join("T1"));
    assert!(driver.exists("T1").await.unwrap());

    let dump = read_dump(&driver.dump_path("T1")).unwrap();
    assert_eq!(dump.node_count, 10);
    assert_eq!(dump.edges, graph.edges().to_vec());
    assert_eq!(dump.relation.as_deref(), Some("T"));

    let info = driver.start_server("T1").await.unwrap();
    assert_eq!(info.name, "T1");
    assert!(info.pid.is_some());

    let mut session = TcpConnector.connect(&info.host, info.port).await.unwrap();
    let keys: Vec<String> = (0..10).map(node_label).collect();
    let features = session.get_tensors(STORE, &keys).await.unwrap();
    assert_eq!(&features, &graph.features().unwrap().rows);

    let subgraph = session.subgraph(4, &[2, 2]).await.unwrap();
    assert!(subgraph.num_nodes() >= 4);
    assert!(subgraph.node_ids.iter().all(|&n| n < 10));
    for (s, t) in subgraph.global_edges() {
        assert!(graph.has_edge(s, t), "edge {s}->{t} not in graph");
    }
    session.close().await.unwrap();

    driver.stop_server().await.unwrap();
    assert!(driver.serving().is_none());

    driver.delete("T1").await.unwrap();
    assert!(!driver.exists("T1").await.unwrap());
    assert!(!driver.dump_path("T1").exists());
}

#[tokio::test]
async fn test_create_twice_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut driver = driver(&temp);
    let graph = small_graph();

    driver.create("T1", &graph).await.unwrap();
    let err = driver.create("T1", &graph).await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::AlreadyExists { ref name } if name == "T1"
    ));
    assert!(driver.exists("T1").await.unwrap());
}

#[tokio::test]
async fn test_double_start_is_lifecycle_error() {
    let temp = TempDir::new().unwrap();
    let mut driver = driver(&temp);
    driver.create("T1", &small_graph()).await.unwrap();

    driver.start_server("T1").await.unwrap();
    let err = driver.start_server("T1").await.unwrap_err();
    assert!(matches!(err, BackendError::Lifecycle(_)));

    let err = driver.delete("T1").await.unwrap_err();
    assert!(matches!(err, BackendError::Lifecycle(_)));

    driver.stop_server().await.unwrap();
    let err = driver.stop_server().await.unwrap_err();
    assert!(matches!(err, BackendError::Lifecycle(_)));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_stop_terminates_server_process() {
    let temp = TempDir::new().unwrap();
    let mut driver = driver(&temp);
    driver
        .create("T1", &Graph::topology(3, vec![(0, 1)]).unwrap())
        .await
        .unwrap();

    let info = driver.start_server("T1").await.unwrap();
    let pid = info.pid.unwrap();
    assert!(Path::new(&format!("/proc/{pid}")).exists());

    driver.stop_server().await.unwrap();
    assert!(!Path::new(&format!("/proc/{pid}")).exists());
    let still_open = graphbench_backend::is_port_open(&info.host, info.port).await;
    assert!(!still_open);
}

#[tokio::test]
async fn test_occupied_port_is_reported() {
    let temp = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut driver = MillenniumDriver::new(
        &settings(Path::new(env!("CARGO_BIN_EXE_mock-create-db"))),
        temp.path().join("data"),
        &server_settings(port),
    )
    .unwrap();
    driver
        .create("T1", &Graph::topology(2, vec![(0, 1)]).unwrap())
        .await
        .unwrap();

    let err = driver.start_server("T1").await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::PortInUse { port: p } if p == port
    ));
    assert!(driver.serving().is_none());
}

#[tokio::test]
async fn test_sampling_benchmark_end_to_end() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);

    let plan = BenchmarkPlan {
        trials: 5,
        num_seeds: 3,
        fan_out: vec![2, 2],
        fetch_features: true,
        store_name: STORE.to_string(),
    };
    let mut bench =
        SamplingBenchmark::new(Box::new(driver), Arc::new(TcpConnector)).with_plan(plan.clone());

    let report = bench.run("Fake_N10", Some(&small_graph())).await.unwrap();
    assert_eq!(report.backend, "millenniumdb");
    assert_eq!(report.database.as_deref(), Some("Fake_N10"));
    assert_eq!(report.plan, plan);
    assert_eq!(report.timings.len(), 5);
    assert_eq!(report.stats.count, 5);
    assert!(report.timings.iter().all(|t| *t >= 0.0));
    assert!(bench.driver().serving().is_none());

    // Second run reuses the database
    let report = bench.run("Fake_N10", None).await.unwrap();
    assert_eq!(report.stats.count, 5);
}

#[cfg(unix)]
#[tokio::test]
async fn test_bulk_load_failure_rolls_back() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let loader = temp.path().join("failing_create_db");
    std::fs::write(
        &loader,
        "#!/bin/sh\nmkdir -p \"$2\"\necho 'bad dump' >&2\nexit 3\n",
    )
    .unwrap();
    std::fs::set_permissions(&loader, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut driver = driver_with_loader(&temp, &loader);
    let err = driver.create("T1", &small_graph()).await.unwrap_err();
    match err {
        BackendError::BulkLoad { name, code, stderr } => {
            assert_eq!(name, "T1");
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "bad dump");
        }
        other => panic!("expected bulk load error, got {other:?}"),
    }

    assert!(!driver.exists("T1").await.unwrap());
    assert!(!driver.dump_path("T1").exists());
}

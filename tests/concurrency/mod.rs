use std::{thread, time::Duration};

use futures::future::join_all;
use rstest::rstest;
use sysmodel::{Clock, Model, Session, SimConfig};

const TICK: Duration = Duration::from_secs(1);

/// Retuning and rewiring from other tasks while the clock runs.
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn edit_while_running() {
    tokio::time::pause();

    let model = Model::load_balanced(SimConfig::default(), 2);
    let components = model.components();
    let client = components[0].clone();
    let lb = components[1].clone();
    let servers = components[2..].to_vec();

    let clock = Clock::builder().model(model.clone()).build().unwrap().start();

    let retune = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        for server in &servers {
            server.set_attribute("thread_count", "50").unwrap();
        }
    };
    let rewire = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let extra = model.add_sink("web server 3");
        extra.set_thread_count(50).unwrap();
        let mut session = Session::new(model.clone());
        session.begin_attach(lb.id()).unwrap();
        session.select(extra.id()).unwrap();
        extra
    };
    let pause_client = async {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        client.set_attribute("active", "False").unwrap();
    };

    let (_, extra, _) = tokio::join!(retune, rewire, pause_client);
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(clock.stop().await, 3);

    // Tick 1: 50 each. Tick 2: 33, 33, 34. Tick 3: the client is inactive, but still emits to
    // its active consumers.
    assert_eq!(servers[0].succeeded_total(), Some(50.0 + 33.0 + 33.0));
    assert_eq!(servers[1].succeeded_total(), Some(50.0 + 33.0 + 33.0));
    assert_eq!(extra.succeeded_total(), Some(34.0 + 34.0));
    assert_eq!(extra.failed_total(), Some(0.0));
}

/// Advancing from several threads at once while rewiring a self-loop never deadlocks.
#[test]
fn advance_concurrently_with_self_loop() {
    let model = Model::load_balanced(SimConfig::default(), 2);
    let components = model.components();
    let lb = &components[1];

    // A load balancer that feeds itself, and a second one chained after it.
    lb.add_consumer(lb);
    let other = model.add_distributor("other load balancer");
    lb.add_consumer(&other);
    other.add_consumer(&components[2]);

    thread::scope(|scope| {
        for _ in 0..4 {
            let model = model.clone();
            scope.spawn(move || {
                for _ in 0..25 {
                    let report = model.advance_all(TICK);
                    assert!(report.failures.is_empty());
                }
            });
        }

        scope.spawn(|| {
            for n in 0..25 {
                let server = model.add_sink(format!("late server {n}"));
                lb.add_consumer(&server);
                other.set_active(n % 2 == 0);
            }
        });
    });

    assert_eq!(model.components().len(), 2 + 2 + 1 + 25);
}

/// Every clone of a model sees the same components.
#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn clones_share_components() {
    let model = Model::default();

    let handles = join_all((0..10).map(|n| {
        let model = model.clone();
        async move { model.add_sink(format!("server {n}")).id() }
    }))
    .await;

    let ids: Vec<_> = model.components().iter().map(|c| c.id()).collect();
    assert_eq!(ids, handles);
}

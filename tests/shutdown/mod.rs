use std::time::Duration;

use rstest::rstest;
use sysmodel::{Clock, Model, SimConfig};

#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn stop_waits_for_the_loop_to_exit() {
    tokio::time::pause();

    let model = Model::load_balanced(SimConfig::default(), 2);
    let clock = Clock::builder().model(model.clone()).build().unwrap().start();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(clock.is_running());

    let ticks = tokio::time::timeout(Duration::from_secs(1), clock.stop())
        .await
        .expect("Clock should stop");
    assert_eq!(ticks, 2);

    // Nothing moves once stopped.
    let before = model.snapshot();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(model.snapshot(), before);
}

#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn dropping_the_handle_stops_the_clock() {
    tokio::time::pause();

    let model = Model::load_balanced(SimConfig::default(), 1);
    let clock = Clock::builder().model(model.clone()).build().unwrap().start();

    tokio::time::sleep(Duration::from_millis(1500)).await;
    drop(clock);

    tokio::time::sleep(Duration::from_secs(10)).await;

    let server = &model.components()[2];
    assert_eq!(server.succeeded_total(), Some(1.0));
    assert_eq!(server.failed_total(), Some(99.0));
}

#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn stop_before_first_tick(#[values(1, 5, 60)] tick_secs: u64) {
    tokio::time::pause();

    let clock = Clock::builder()
        .model(Model::load_balanced(SimConfig::default(), 1))
        .tick(Duration::from_secs(tick_secs))
        .build()
        .unwrap()
        .start();

    let stopped = tokio_test::task::spawn(clock.stop());

    let ticks = tokio::time::timeout(Duration::from_secs(1), stopped)
        .await
        .expect("Clock should stop");

    assert_eq!(ticks, 0);
}

#[tokio::test]
#[rstest]
#[timeout(Duration::from_secs(5))]
async fn many_clocks_stop_independently() {
    tokio::time::pause();

    let models: Vec<_> = (0..3)
        .map(|_| Model::load_balanced(SimConfig::default(), 1))
        .collect();
    let clocks: Vec<_> = models
        .iter()
        .map(|model| Clock::builder().model(model.clone()).build().unwrap().start())
        .collect();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    let ticks = futures::future::join_all(clocks.into_iter().map(|clock| clock.stop())).await;

    assert_eq!(ticks, vec![1, 1, 1]);
}

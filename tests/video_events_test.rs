use std::time::Duration;
use tokio::time::timeout;
use vidcrawl::config::CrawlBudget;
use vidcrawl::video_events::*;
use vidcrawl::youtube::VideoData;

fn video(id: &str) -> VideoData {
    VideoData {
        id: id.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_event_bus_creation() {
    let bus = VideoEventBus::new(100);
    assert_eq!(bus.subscriber_count(), 0);
    assert!(!bus.has_subscribers());
    assert!(!bus.is_shutdown());
}

#[tokio::test]
async fn test_publish_with_no_subscribers() {
    let bus = VideoEventBus::new(10);
    let event = VideoEvent::crawl_started("https://example.com".to_string(), CrawlBudget::Depth(2));

    match bus.publish(event).await {
        Err(EventBusError::NoSubscribers) => {}
        other => panic!("Expected EventBusError::NoSubscribers, got: {other:?}"),
    }
    assert_eq!(bus.metrics().snapshot().events_dropped, 1);
}

#[tokio::test]
async fn test_subscribe_and_publish() {
    let bus = VideoEventBus::new(10);
    let mut receiver = bus.subscribe();

    let count = bus
        .publish(VideoEvent::video_discovered(
            "https://example.com/watch?v=abc".to_string(),
            video("abc"),
        ))
        .await
        .expect("one subscriber");
    assert_eq!(count, 1);

    let received = timeout(Duration::from_millis(100), receiver.recv())
        .await
        .expect("event arrives")
        .expect("channel open");
    assert_eq!(received.video().map(|v| v.id.as_str()), Some("abc"));
}

#[tokio::test]
async fn test_filtered_subscription_skips_other_events() {
    let bus = VideoEventBus::new(10);
    let mut videos = bus.subscribe_filtered(|event: &VideoEvent| event.video().is_some());

    bus.publish(VideoEvent::crawl_started(
        "https://example.com".to_string(),
        CrawlBudget::Limit(3),
    ))
    .await
    .unwrap();
    bus.publish(VideoEvent::video_discovered(
        "https://example.com/watch?v=x".to_string(),
        video("x"),
    ))
    .await
    .unwrap();

    let event = timeout(Duration::from_millis(100), videos.recv())
        .await
        .expect("event arrives")
        .unwrap();
    assert_eq!(event.video().unwrap().id, "x");
    assert!(videos.try_recv().unwrap().is_none());
}

#[tokio::test]
async fn test_error_mode_reports_full_channel() {
    let bus = VideoEventBus::with_config(EventBusConfig {
        capacity: 2,
        backpressure_mode: BackpressureMode::Error,
        ..Default::default()
    });
    let _receiver = bus.subscribe();

    for n in 0..2 {
        bus.publish_with_backpressure(VideoEvent::video_discovered(format!("u{n}"), video("v")))
            .await
            .unwrap();
    }
    let result = bus
        .publish_with_backpressure(VideoEvent::video_discovered("u2".into(), video("v")))
        .await;
    assert!(matches!(result, Err(EventBusError::ChannelFull)));
}

#[tokio::test]
async fn test_block_mode_waits_for_slow_consumer() {
    let bus = VideoEventBus::with_config(EventBusConfig::for_crawl(2));
    let mut receiver = bus.subscribe();

    for n in 0..2 {
        bus.publish_with_backpressure(VideoEvent::video_discovered(format!("u{n}"), video("v")))
            .await
            .unwrap();
    }

    // Channel is full: the next publish must wait until the consumer reads
    let blocked = timeout(
        Duration::from_millis(50),
        bus.publish_with_backpressure(VideoEvent::video_discovered("u2".into(), video("v"))),
    )
    .await;
    assert!(blocked.is_err(), "publish should block while the channel is full");

    receiver.recv().await.unwrap();
    let published = timeout(
        Duration::from_secs(1),
        bus.publish_with_backpressure(VideoEvent::video_discovered("u3".into(), video("v"))),
    )
    .await;
    assert!(matches!(published, Ok(Ok(1))));
}

#[tokio::test]
async fn test_block_mode_resumes_waiting_after_consumer_recovers() {
    let bus = VideoEventBus::with_config(EventBusConfig {
        publish_timeout: Duration::from_millis(5),
        ..EventBusConfig::for_crawl(1)
    });
    let mut receiver = bus.subscribe();
    let discovered = |n: usize| VideoEvent::video_discovered(format!("u{n}"), video(&n.to_string()));

    bus.publish_with_backpressure(discovered(0)).await.unwrap();

    // Stalled consumer: enough timeouts in a row to trip the breaker
    for n in 1..=11 {
        let result = bus.publish_with_backpressure(discovered(n)).await;
        assert!(matches!(result, Err(EventBusError::PublishTimeout)), "{result:?}");
    }

    assert_eq!(receiver.recv().await.unwrap().video().unwrap().id, "0");

    assert!(matches!(
        bus.publish_with_backpressure(discovered(12)).await,
        Ok(1)
    ));
    // Channel is full again and the consumer is healthy: wait instead of overwriting
    assert!(matches!(
        bus.publish_with_backpressure(discovered(13)).await,
        Err(EventBusError::PublishTimeout)
    ));

    let next = receiver.recv().await.expect("nothing was overwritten");
    assert_eq!(next.video().unwrap().id, "12");
    assert_eq!(bus.metrics().snapshot().events_dropped, 0);
}

#[tokio::test]
async fn test_graceful_shutdown_delivers_shutdown_event() {
    let bus = VideoEventBus::with_config(EventBusConfig {
        drain_grace: Duration::from_millis(10),
        ..Default::default()
    });
    let mut receiver = bus.subscribe();

    bus.shutdown_gracefully(ShutdownReason::CrawlCompleted).await;

    let event = receiver.recv().await.unwrap();
    assert!(event.is_shutdown());
    assert!(bus.is_shutdown());
}

#[tokio::test]
async fn test_wait_for_shutdown_resolves_for_clones() {
    let bus = VideoEventBus::new(10);
    let clone = bus.clone();

    let waiter = tokio::spawn(async move { clone.wait_for_shutdown().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    bus.shutdown();

    timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter released")
        .unwrap();
}

#[tokio::test]
async fn test_json_lines_publisher_writes_one_record_per_video() {
    let bus = VideoEventBus::with_config(EventBusConfig {
        drain_grace: Duration::from_millis(10),
        ..EventBusConfig::for_crawl(16)
    });
    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    let publisher = tokio::spawn(JsonLinesPublisher::new(&bus, writer).run());

    bus.publish(VideoEvent::crawl_started("https://example.com".into(), CrawlBudget::Depth(1)))
        .await
        .unwrap();
    for id in ["a", "b"] {
        bus.publish_with_backpressure(VideoEvent::video_discovered(
            format!("https://example.com/watch?v={id}"),
            video(id),
        ))
        .await
        .unwrap();
    }
    bus.shutdown_gracefully(ShutdownReason::CrawlCompleted).await;

    let written = timeout(Duration::from_secs(2), publisher)
        .await
        .expect("publisher stops on shutdown")
        .unwrap()
        .unwrap();
    assert_eq!(written, 2);

    drop(bus);
    let mut output = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut output)
        .await
        .unwrap();
    let ids: Vec<String> = output
        .lines()
        .map(|line| serde_json::from_str::<VideoData>(line).unwrap().id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_event_serialization_is_tagged() {
    let event = VideoEvent::video_discovered("https://example.com/watch?v=a".into(), video("a"));
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "video_discovered");
    assert_eq!(json["video"]["id"], "a");
}

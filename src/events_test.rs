use super::*;

#[test]
fn dispatch_without_listeners_reaches_nobody() {
    let bus = EventBus::new();
    assert_eq!(bus.dispatch(AppEvent::BeforeLogout), 0);
}

#[tokio::test]
async fn dispatch_reaches_every_listener() {
    let bus = EventBus::new();
    let mut a = bus.subscribe();
    let mut b = bus.subscribe();

    assert_eq!(bus.dispatch(AppEvent::BeforeLogout), 2);
    assert_eq!(a.recv().await.unwrap(), AppEvent::BeforeLogout);
    assert_eq!(b.recv().await.unwrap(), AppEvent::BeforeLogout);
}

#[test]
fn late_subscriber_misses_earlier_events() {
    let bus = EventBus::new();
    let _early = bus.subscribe();
    bus.dispatch(AppEvent::BeforeLogout);

    let mut late = bus.subscribe();
    assert!(late.try_recv().is_err());
}

use proptest::prelude::*;
use stockchart_rs::core::{Point, Rect};
use stockchart_rs::interaction::{
    ClickGesture, ContextMenuGesture, DoubleClickGesture, EventHandling, EventKind, EventRouter,
    Gesture, GestureArray, GestureConfig, GestureKind, GestureSignal, GestureState, GestureTarget,
    Hittable, InputEnvironment, MouseHoverGesture, MouseWheelGesture, PanGesture, HoverOptions,
    TapLimits, WindowEvent,
};

#[derive(Debug, Default)]
struct Recorder {
    bounds: Rect,
    signals: Vec<(GestureKind, GestureState, Point)>,
    deltas: Vec<f64>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, 200.0, 100.0),
            ..Self::default()
        }
    }

    fn kinds(&self) -> Vec<GestureKind> {
        self.signals.iter().map(|(kind, _, _)| *kind).collect()
    }
}

impl Hittable for Recorder {
    fn hit_test(&self, point: Point) -> bool {
        self.bounds.contains_point(point)
    }
}

impl GestureTarget for Recorder {
    fn on_gesture(&mut self, signal: &GestureSignal<'_>) {
        self.signals.push((signal.kind, signal.state, signal.move_offset));
        self.deltas.push(signal.delta);
    }
}

fn event(kind: EventKind, x: f64, y: f64, timestamp_ms: i64) -> WindowEvent {
    WindowEvent::new(kind, Point::new(x, y), timestamp_ms)
}

fn tap_click() -> ClickGesture {
    ClickGesture::with_limits(
        GestureConfig::default(),
        TapLimits {
            max_touch_offset: 10.0,
            max_touch_interval_ms: 500,
        },
    )
    .expect("click gesture")
}

fn tap(gesture: &mut ClickGesture, end: WindowEvent) -> bool {
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();
    gesture.handle_event(&event(EventKind::TouchStart, 0.0, 0.0, 0), &mut env, &mut target);
    gesture.handle_event(&end, &mut env, &mut target)
}

#[test]
fn tap_within_limits_is_a_click() {
    let mut gesture = tap_click();
    assert!(tap(&mut gesture, event(EventKind::TouchEnd, 6.0, 0.0, 400)));
    // The click is reported as finished, then the gesture is ready again.
    assert_eq!(gesture.state(), GestureState::None);

    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();
    gesture.handle_event(&event(EventKind::TouchStart, 0.0, 0.0, 1_000), &mut env, &mut target);
    assert_eq!(gesture.state(), GestureState::Started);
    assert!(gesture.handle_event(&event(EventKind::TouchEnd, 2.0, 2.0, 1_100), &mut env, &mut target));
    assert_eq!(target.signals.last().map(|(_, state, _)| *state), Some(GestureState::Finished));
    assert_eq!(gesture.state(), GestureState::None);
}

#[test]
fn tap_too_far_or_too_slow_is_not_a_click() {
    let mut gesture = tap_click();
    assert!(!tap(&mut gesture, event(EventKind::TouchEnd, 11.0, 0.0, 400)));
    assert_eq!(gesture.state(), GestureState::None);

    let mut gesture = tap_click();
    assert!(!tap(&mut gesture, event(EventKind::TouchEnd, 6.0, 0.0, 600)));
}

#[test]
fn synthetic_click_after_touch_is_ignored() {
    let mut gesture = ClickGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(gesture.handle_event(&event(EventKind::Click, 5.0, 5.0, 0), &mut env, &mut target));
    assert_eq!(target.kinds(), [GestureKind::Click]);

    env.mark_touch();
    assert!(!gesture.handle_event(&event(EventKind::Click, 5.0, 5.0, 10), &mut env, &mut target));
    assert_eq!(target.signals.len(), 1);
}

#[test]
fn tap_limits_must_be_positive() {
    let limits = TapLimits {
        max_touch_offset: 0.0,
        max_touch_interval_ms: 500,
    };
    assert!(ClickGesture::with_limits(GestureConfig::default(), limits).is_err());
    assert!(ContextMenuGesture::with_long_tap(GestureConfig::default(), 10.0, 0).is_err());
}

#[test]
fn double_tap_fires_on_second_release() {
    let mut gesture = DoubleClickGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(gesture.handle_event(&event(EventKind::TouchStart, 10.0, 10.0, 0), &mut env, &mut target));
    assert!(!gesture.handle_event(&event(EventKind::TouchEnd, 10.0, 10.0, 100), &mut env, &mut target));
    assert!(gesture.handle_event(&event(EventKind::TouchStart, 12.0, 10.0, 300), &mut env, &mut target));
    assert!(gesture.handle_event(&event(EventKind::TouchEnd, 12.0, 10.0, 400), &mut env, &mut target));
    assert_eq!(target.kinds(), [GestureKind::DoubleClick]);
    assert_eq!(gesture.state(), GestureState::None);
}

#[test]
fn long_tap_opens_context_menu_on_poll() {
    let mut gesture = ContextMenuGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    gesture.handle_event(&event(EventKind::TouchStart, 20.0, 20.0, 0), &mut env, &mut target);
    assert!(!gesture.poll(1_000, &mut env, &mut target));
    assert!(gesture.poll(2_500, &mut env, &mut target));
    assert_eq!(target.kinds(), [GestureKind::ContextMenu]);

    // The release after the menu opened is swallowed.
    assert!(gesture.handle_event(&event(EventKind::TouchEnd, 20.0, 20.0, 2_600), &mut env, &mut target));
    assert_eq!(target.signals.len(), 1);
}

#[test]
fn pan_reports_offsets_between_steps() {
    let mut gesture = PanGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(gesture.handle_event(&event(EventKind::MouseDown, 50.0, 50.0, 0), &mut env, &mut target));
    assert!(gesture.handle_event(&event(EventKind::MouseMove, 60.0, 50.0, 16), &mut env, &mut target));
    // Sub-pixel jitter is consumed without a notification.
    assert!(gesture.handle_event(&event(EventKind::MouseMove, 60.5, 50.0, 32), &mut env, &mut target));
    assert!(gesture.handle_event(&event(EventKind::MouseMove, 45.0, 52.0, 48), &mut env, &mut target));
    // Releasing outside the target still finishes the drag.
    assert!(gesture.handle_event(&event(EventKind::MouseUp, 500.0, 52.0, 64), &mut env, &mut target));

    let states: Vec<GestureState> = target.signals.iter().map(|(_, state, _)| *state).collect();
    assert_eq!(
        states,
        [
            GestureState::Started,
            GestureState::Continued,
            GestureState::Continued,
            GestureState::Finished,
        ]
    );
    assert_eq!(target.signals[1].2, Point::new(10.0, 0.0));
    assert_eq!(target.signals[2].2, Point::new(-15.0, 2.0));
    assert!(!gesture.is_active());
}

#[test]
fn pan_ignores_presses_outside_the_target() {
    let mut gesture = PanGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(!gesture.handle_event(&event(EventKind::MouseDown, 300.0, 50.0, 0), &mut env, &mut target));
    assert!(!gesture.handle_event(&event(EventKind::MouseMove, 310.0, 50.0, 16), &mut env, &mut target));
    assert!(target.signals.is_empty());
}

#[test]
fn wheel_delta_sign_selects_zoom_direction() {
    let mut gesture = MouseWheelGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(gesture.handle_event(&WindowEvent::wheel(Point::new(10.0, 10.0), 120.0, 0), &mut env, &mut target));
    assert!(gesture.handle_event(&WindowEvent::wheel(Point::new(10.0, 10.0), -3.0, 5), &mut env, &mut target));
    assert_eq!(target.deltas, [1.0, -1.0]);
    assert!(!gesture.handle_event(&WindowEvent::wheel(Point::new(500.0, 10.0), 1.0, 9), &mut env, &mut target));
}

#[test]
fn pinch_closing_fingers_zooms_out() {
    let mut gesture = MouseWheelGesture::new(GestureConfig::default());
    let mut env = InputEnvironment::default();
    env.set_viewport_extent(200.0, 100.0);
    let mut target = Recorder::new();

    let start = event(EventKind::TouchStart, 0.0, 0.0, 0)
        .with_touches(&[Point::new(50.0, 50.0), Point::new(150.0, 50.0)]);
    assert!(gesture.handle_event(&start, &mut env, &mut target));
    let closer = event(EventKind::TouchMove, 0.0, 0.0, 16)
        .with_touches(&[Point::new(60.0, 50.0), Point::new(140.0, 50.0)]);
    assert!(gesture.handle_event(&closer, &mut env, &mut target));

    assert_eq!(target.deltas, [1.0]);
    assert!(env.has_seen_touch());
}

#[test]
fn gesture_array_keys_are_unique() {
    let mut gestures = GestureArray::new()
        .with(Box::new(PanGesture::new(GestureConfig::default())))
        .with(Box::new(ClickGesture::new(GestureConfig::default())));
    assert!(!gestures.add(Box::new(ClickGesture::new(GestureConfig::default()))));
    assert!(gestures.add(Box::new(ClickGesture::new(GestureConfig::default().with_key("secondClick")))));

    let keys: Vec<&str> = gestures.keys().collect();
    assert_eq!(keys, ["pan", "click", "secondClick"]);
    assert_eq!(gestures.get("pan").map(|g| g.kind()), Some(GestureKind::Pan));

    assert!(gestures.remove("click"));
    assert!(!gestures.remove("click"));
    assert_eq!(gestures.len(), 2);
}

#[test]
fn gesture_array_stops_at_first_consumer() {
    let mut gestures = GestureArray::new()
        .with(Box::new(MouseHoverGesture::new(GestureConfig::default(), HoverOptions::default())))
        .with(Box::new(ClickGesture::new(GestureConfig::default().with_key("first"))))
        .with(Box::new(ClickGesture::new(GestureConfig::default().with_key("second"))));
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    assert!(gestures.handle_event(&event(EventKind::Click, 5.0, 5.0, 0), true, &mut env, &mut target));
    assert_eq!(target.kinds(), [GestureKind::Click]);
    assert_eq!(target.signals.last().map(|(_, state, _)| *state), Some(GestureState::Finished));
    assert_eq!(gestures.get("first").map(|g| g.state()), Some(GestureState::None));
    assert_eq!(gestures.get("second").map(|g| g.state()), Some(GestureState::None));

    // Hover never claims an event, so it cannot block the gestures after it.
    assert!(!gestures.handle_event(&event(EventKind::MouseMove, 6.0, 6.0, 5), true, &mut env, &mut target));
    assert_eq!(target.kinds(), [GestureKind::Click, GestureKind::Hover]);
}

#[test]
fn gesture_array_out_of_bounds_forwards_release_only() {
    let mut gestures = GestureArray::new().with(Box::new(PanGesture::new(GestureConfig::default())));
    let mut env = InputEnvironment::default();
    let mut target = Recorder::new();

    gestures.handle_event(&event(EventKind::MouseDown, 5.0, 5.0, 0), true, &mut env, &mut target);
    assert!(gestures.has_active());

    gestures.handle_event(&event(EventKind::MouseMove, 400.0, 5.0, 10), false, &mut env, &mut target);
    assert_eq!(target.signals.len(), 1);

    gestures.handle_event(&event(EventKind::MouseUp, 400.0, 5.0, 20), false, &mut env, &mut target);
    assert!(!gestures.has_active());
    assert_eq!(target.signals.last().map(|(_, state, _)| *state), Some(GestureState::Finished));
}

#[derive(Debug)]
struct Layer {
    z: i32,
    bounds: Rect,
    accepts: bool,
    received: usize,
}

impl Layer {
    fn new(z: i32, bounds: Rect) -> Self {
        Self {
            z,
            bounds,
            accepts: true,
            received: 0,
        }
    }
}

impl EventHandling for Layer {
    fn z_index(&self) -> i32 {
        self.z
    }

    fn contains(&self, point: Point) -> bool {
        self.bounds.contains_point(point)
    }

    fn handle_event(&mut self, _event: &WindowEvent, _env: &mut InputEnvironment) -> bool {
        self.received += 1;
        self.accepts
    }
}

#[test]
fn router_prefers_highest_z_then_latest() {
    let area = Rect::new(0.0, 0.0, 100.0, 100.0);
    let mut layers = vec![Layer::new(0, area), Layer::new(5, area), Layer::new(5, area)];
    let mut router = EventRouter::new();
    let mut env = InputEnvironment::default();

    let hit = router.route(&mut layers, &event(EventKind::MouseMove, 10.0, 10.0, 0), &mut env);
    assert_eq!(hit, Some(2));

    layers[2].accepts = false;
    let hit = router.route(&mut layers, &event(EventKind::MouseMove, 10.0, 10.0, 5), &mut env);
    assert_eq!(hit, Some(1));

    let hit = router.route(&mut layers, &event(EventKind::MouseMove, 150.0, 10.0, 9), &mut env);
    assert_eq!(hit, None);
}

#[test]
fn router_keeps_capture_until_release() {
    let mut layers = vec![
        Layer::new(0, Rect::new(0.0, 0.0, 100.0, 100.0)),
        Layer::new(1, Rect::new(200.0, 0.0, 100.0, 100.0)),
    ];
    let mut router = EventRouter::new();
    let mut env = InputEnvironment::default();

    assert_eq!(router.route(&mut layers, &event(EventKind::MouseDown, 10.0, 10.0, 0), &mut env), Some(0));
    assert_eq!(router.captured(), Some(0));

    // Dragging over the other layer stays with the captured one.
    assert_eq!(router.route(&mut layers, &event(EventKind::MouseMove, 250.0, 10.0, 10), &mut env), Some(0));
    assert_eq!(layers[1].received, 0);

    assert_eq!(router.route(&mut layers, &event(EventKind::MouseUp, 250.0, 10.0, 20), &mut env), Some(0));
    assert_eq!(router.captured(), None);
}

#[test]
fn captured_layer_sees_each_event_once() {
    let mut layers = vec![
        Layer::new(0, Rect::new(0.0, 0.0, 100.0, 100.0)),
        Layer::new(1, Rect::new(200.0, 0.0, 100.0, 100.0)),
    ];
    let mut router = EventRouter::new();
    let mut env = InputEnvironment::default();

    router.route(&mut layers, &event(EventKind::MouseDown, 10.0, 10.0, 0), &mut env);
    assert_eq!(layers[0].received, 1);

    layers[0].accepts = false;
    let hit = router.route(&mut layers, &event(EventKind::MouseMove, 20.0, 10.0, 10), &mut env);
    assert_eq!(hit, None);
    assert_eq!(layers[0].received, 2);

    // An unconsumed release reaches the other layer but not the captor again.
    let hit = router.route(&mut layers, &event(EventKind::MouseUp, 20.0, 10.0, 20), &mut env);
    assert_eq!(hit, Some(1));
    assert_eq!(layers[0].received, 3);
    assert_eq!(layers[1].received, 1);
    assert_eq!(router.captured(), None);
}

proptest! {
    #[test]
    fn tap_is_accepted_exactly_within_limits(
        dx in -20.0f64..20.0,
        dy in -20.0f64..20.0,
        elapsed in 1i64..1_000,
    ) {
        let mut gesture = tap_click();
        let accepted = tap(&mut gesture, event(EventKind::TouchEnd, dx, dy, elapsed));
        let within = dx.abs() <= 10.0 && dy.abs() <= 10.0 && elapsed <= 500;
        // Negative offsets land outside the recorder, which never clicks.
        let hits = dx >= 0.0 && dy >= 0.0;
        prop_assert_eq!(accepted, within && hits);
    }
}

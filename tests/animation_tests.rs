use approx::assert_relative_eq;
use stockchart_rs::ChartError;
use stockchart_rs::animation::{
    Animation, AnimationConfig, AnimationController, AnimationStep, KineticPan, KineticPanConfig,
    ViewportTransition,
};
use stockchart_rs::core::{DateScale, DateScaleConfig, Rect, VisibleRange};

type Log = Vec<&'static str>;

fn push(label: &'static str) -> Animation<Log> {
    Animation::new(move |log: &mut Log| {
        log.push(label);
        Ok(AnimationStep::Continue)
    })
}

fn scale_with_range(first: f64, last: f64) -> DateScale {
    let mut scale = DateScale::new(DateScaleConfig::default()).expect("date scale");
    scale.set_frame(Rect::new(0.0, 0.0, 1000.0, 400.0));
    scale.set_visible_records(first, last).expect("visible records");
    scale
}

#[test]
fn tick_runs_animations_in_insertion_order() {
    let mut controller = AnimationController::default();
    controller.start(push("first"));
    controller.start(push("second"));
    let mut log = Log::new();

    assert_eq!(controller.tick(0, &mut log), 2);
    assert_eq!(log, ["first", "second"]);
}

#[test]
fn tick_is_throttled_by_interval() {
    let mut controller = AnimationController::new(AnimationConfig::desktop()).expect("controller");
    controller.start(push("frame"));
    let mut log = Log::new();

    assert_eq!(controller.tick(1_000, &mut log), 1);
    assert_eq!(controller.tick(1_010, &mut log), 0);
    assert_eq!(controller.tick(1_025, &mut log), 1);
    assert_eq!(log.len(), 2);
}

#[test]
fn one_shot_and_stopping_animations_leave_the_run_set() {
    let mut controller = AnimationController::new(AnimationConfig { interval_ms: 0.0 }).expect("controller");
    let once = controller.start(Animation::once(|log: &mut Log| {
        log.push("once");
        Ok(AnimationStep::Continue)
    }));
    let mut remaining = 2;
    let countdown = controller.start(Animation::new(move |log: &mut Log| {
        log.push("countdown");
        remaining -= 1;
        Ok(if remaining == 0 { AnimationStep::Stop } else { AnimationStep::Continue })
    }));
    let mut log = Log::new();

    controller.tick(0, &mut log);
    assert!(!controller.contains(once));
    assert!(controller.contains(countdown));
    assert!(controller.needs_frame());

    controller.tick(1, &mut log);
    assert!(!controller.needs_frame());
    assert_eq!(log, ["once", "countdown", "countdown"]);
    assert_eq!(controller.tick(2, &mut log), 0);

    // Stopped animations stay registered and can be restarted.
    assert!(controller.get(once).is_some_and(|animation| !animation.is_started()));
    assert!(controller.add(once));
    assert_eq!(controller.tick(3, &mut log), 1);
}

#[test]
fn failing_callback_keeps_running() {
    let mut controller = AnimationController::new(AnimationConfig { interval_ms: 0.0 }).expect("controller");
    let failing = controller.start(Animation::new(|_: &mut Log| {
        Err(ChartError::InvalidData("boom".to_owned()))
    }));
    controller.start(push("after"));
    let mut log = Log::new();

    assert_eq!(controller.tick(0, &mut log), 2);
    assert_eq!(log, ["after"]);
    assert!(controller.contains(failing));
}

#[test]
fn add_remove_and_unregister() {
    let mut controller = AnimationController::default();
    let id = controller.register(push("idle"));
    assert!(!controller.contains(id));
    assert!(controller.is_empty());

    assert!(controller.add(id));
    assert!(!controller.add(id));
    assert_eq!(controller.len(), 1);

    assert!(controller.remove(id));
    assert!(!controller.remove(id));

    controller.add(id);
    assert!(controller.unregister(id));
    assert!(!controller.contains(id));
    assert!(controller.get(id).is_none());
    assert!(!controller.unregister(id));
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(AnimationController::<Log>::new(AnimationConfig { interval_ms: -1.0 }).is_err());
    assert!(AnimationController::<Log>::new(AnimationConfig { interval_ms: f64::NAN }).is_err());
    assert_relative_eq!(AnimationConfig::for_environment(true).interval_ms, 50.0);

    let bad_decay = KineticPanConfig {
        decay_per_second: 1.0,
        ..KineticPanConfig::default()
    };
    assert!(KineticPan::new(bad_decay, 100.0).is_err());
    assert!(KineticPan::new(KineticPanConfig::default(), f64::INFINITY).is_err());
    assert!(ViewportTransition::new(VisibleRange { first: 10.0, last: 5.0 }).is_err());
}

#[test]
fn viewport_transition_settles_on_target() {
    let target = VisibleRange { first: 20.0, last: 69.0 };
    let mut controller = AnimationController::default();
    controller.start(ViewportTransition::new(target).expect("transition").into_animation());
    let mut scale = scale_with_range(0.0, 49.0);

    let mut now = 0;
    let mut previous_gap = f64::INFINITY;
    while controller.needs_frame() && now < 10_000 {
        controller.tick(now, &mut scale);
        let range = scale.visible_range().expect("range");
        let gap = (target.first - range.first).abs();
        assert!(gap <= previous_gap);
        previous_gap = gap;
        now += 25;
    }

    assert!(!controller.needs_frame());
    assert_eq!(scale.visible_range(), Some(target));
}

#[test]
fn kinetic_pan_decays_until_threshold() {
    let config = KineticPanConfig {
        decay_per_second: 0.5,
        stop_velocity_abs: 100.0,
    };
    let mut pan = KineticPan::new(config, 300.0).expect("kinetic pan");

    assert_relative_eq!(pan.step(1.0).expect("moving"), 300.0);
    assert_relative_eq!(pan.velocity(), 150.0);
    assert_relative_eq!(pan.step(1.0).expect("moving"), 150.0);
    assert!(!pan.is_active());
    assert_relative_eq!(pan.velocity(), 0.0);
    assert!(pan.step(1.0).is_none());
}

#[test]
fn kinetic_pan_scrolls_the_date_scale() {
    let pan = KineticPan::new(KineticPanConfig::default(), 400.0).expect("kinetic pan");
    let mut controller = AnimationController::default();
    controller.start(pan.into_animation(100, 0.05));
    let mut scale = scale_with_range(50.0, 99.0);

    controller.tick(0, &mut scale);
    let range = scale.visible_range().expect("range");
    assert_relative_eq!(range.first, 49.0);
    assert_relative_eq!(range.last, 98.0);
    assert!(controller.needs_frame());
}

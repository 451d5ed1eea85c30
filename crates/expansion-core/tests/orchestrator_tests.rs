mod common;

use common::*;
use expansion_core::domains::SHRINE_GRAVITY;
use expansion_core::*;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// Safely past charge + freeze, in frame indices.
fn past_freeze() -> u32 {
    frame_at(CHARGE_DURATION_SEC + FREEZE_DURATION_SEC) + 2
}

fn run_until_active(orch: &mut Orchestrator, rig: &mut Rig, key: &str) -> u32 {
    assert!(orch.on_gesture(key, 0.0, &mut rig.host()));
    let end = past_freeze();
    run_frames(orch, rig, 0, end);
    assert_eq!(orch.state(), ActivationState::Active);
    end
}

#[test]
fn enter_moves_from_intro_to_idle_once() {
    let mut rig = Rig::default();
    let mut orch = small_session(8);
    assert_eq!(orch.state(), ActivationState::Intro);
    assert!(!orch.on_gesture("shrine", 0.0, &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Intro);

    orch.enter(0.0, &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Idle);
    orch.enter(0.1, &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Idle);
    assert_eq!(rig.render.bloom, BASE_BLOOM);
}

#[test]
fn gestures_start_charging_only_from_idle_with_known_keys() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);

    for key in ["", "fire", "Shrine", "1"] {
        assert!(!orch.on_gesture(key, 0.0, &mut rig.host()), "key {key:?}");
        assert_eq!(orch.state(), ActivationState::Idle);
        assert_eq!(orch.active_domain(), None);
        assert_eq!(orch.pending_triggers(), 0);
    }

    assert!(orch.on_gesture("void", 0.5, &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Charging);
    assert_eq!(orch.active_domain(), Some(Domain::Void));
    assert_eq!(orch.charge_started_at(), Some(0.5));
    assert!(orch.effects().is_running(Overlay::Charge));
    assert_eq!(orch.pending_triggers(), 1);
}

#[test]
fn second_gesture_while_charging_is_ignored() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    assert!(orch.on_gesture("shrine", 0.0, &mut rig.host()));
    run_frames(&mut orch, &mut rig, 0, 20);

    let started = orch.effects().timer(Overlay::Charge).started_at();
    assert!(!orch.on_gesture("purple", frame_time(20), &mut rig.host()));
    assert!(!orch.on_gesture("shrine", frame_time(20), &mut rig.host()));

    assert_eq!(orch.active_domain(), Some(Domain::Shrine));
    assert_eq!(orch.charge_started_at(), Some(0.0));
    assert_eq!(orch.effects().timer(Overlay::Charge).started_at(), started);
    assert_eq!(orch.pending_triggers(), 1);
}

#[test]
fn shrine_scenario_reaches_active_through_one_freeze() {
    let mut rig = Rig::default();
    let mut orch = idle_session(4, &mut rig);
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let sink = transitions.clone();
    orch.on_state_change(move |next, prev| sink.borrow_mut().push((prev, next)));

    let radial: Vec<Vec3> = (0..4)
        .map(|i| orch.field().base_position(i).normalize())
        .collect();

    assert!(orch.on_gesture("shrine", 0.0, &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Charging);

    let mut freeze_windows = 0;
    let mut freezing = false;
    for i in 0..past_freeze() {
        orch.frame((1.0 / FPS) as f32, frame_time(i), &mut rig.host());
        let now = orch.effects().is_running(Overlay::Freeze);
        if now && !freezing {
            freeze_windows += 1;
        }
        freezing = now;
        if orch.state() == ActivationState::Charging && frame_time(i) < CHARGE_DURATION_SEC {
            assert!(!now, "freeze before the charge finished");
        }
    }

    assert_eq!(orch.state(), ActivationState::Active);
    assert_eq!(freeze_windows, 1);
    assert_eq!(
        *transitions.borrow(),
        [
            (ActivationState::Idle, ActivationState::Charging),
            (ActivationState::Charging, ActivationState::Active),
        ]
    );
    assert_eq!(rig.voice.plays.len(), 1);
    assert_eq!(rig.voice.plays[0].0, Domain::Shrine);
    assert_eq!(rig.captions.shown, [Domain::Shrine]);

    for (i, dir) in radial.iter().enumerate() {
        let v = orch.field().velocity(i);
        let outward = v - SHRINE_GRAVITY;
        assert!(outward.normalize().dot(*dir) > 0.9999, "particle {i}");
        assert_eq!(orch.field().color(i)[0], 1.0);
    }
}

#[test]
fn active_applies_the_domain_once() {
    let mut rig = Rig::default();
    let mut orch = idle_session(16, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "shrine");
    let velocities = orch.field().velocities().to_vec();
    let colors = orch.field().colors().to_vec();

    run_frames(&mut orch, &mut rig, end, end + 120);
    assert_eq!(orch.field().velocities(), velocities.as_slice());
    assert_eq!(orch.field().colors(), colors.as_slice());
    assert_eq!(rig.voice.plays.len(), 1);
    assert_eq!(rig.captions.shown.len(), 1);
}

#[test]
fn entering_active_starts_the_spike_and_burst_time_scale() {
    let mut rig = Rig::default();
    let mut orch = idle_session(16, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "purple");

    assert!(orch.effects().is_running(Overlay::Spike));
    assert!(!orch.effects().is_running(Overlay::Freeze));
    assert!(orch.time_scale_target() > 1.0);
    assert!(orch.ambient().bloom > ACTIVE_BLOOM);
    assert!(orch.registry().purple().base_speeds().is_some());

    let spike_end = frame_at(CHARGE_DURATION_SEC + FREEZE_DURATION_SEC + SPIKE_DURATION_SEC) + 3;
    run_frames(&mut orch, &mut rig, end, spike_end);
    assert!(!orch.effects().is_running(Overlay::Spike));
    assert_eq!(*orch.last_params(), FrameParameters::baseline(orch.ambient()));
    assert_eq!(rig.render.bloom, orch.ambient().bloom);
    assert_eq!(rig.render.backdrop, orch.ambient().backdrop);
}

#[test]
fn freeze_nearly_stops_time() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    assert!(orch.on_gesture("void", 0.0, &mut rig.host()));
    // the whole freeze window, stopping just short of its expiry
    let last = frame_at(CHARGE_DURATION_SEC + FREEZE_DURATION_SEC) - 1;
    run_frames(&mut orch, &mut rig, 0, last);
    assert_eq!(orch.state(), ActivationState::Charging);
    assert!(orch.effects().is_running(Overlay::Freeze));
    assert_eq!(orch.time_scale_target(), FREEZE_TIME_SCALE);
    assert!(orch.time_scale() < 0.5, "time scale {}", orch.time_scale());
}

#[test]
fn voice_completion_hands_over_camera_control() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "void");
    let token = rig.last_token();
    assert_eq!(orch.pending_voice(), Some(token));

    assert!(orch.voice_finished(token, frame_time(end), &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Control);
    assert!(orch.orbit().is_enabled());
    let profile = Domain::Void.camera_profile();
    assert_eq!(orch.orbit().sensitivity(), profile.sensitivity);
    assert_eq!(orch.orbit().inertia(), profile.inertia);

    // a second completion for the same line is ignored
    assert!(!orch.voice_finished(token, frame_time(end), &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Control);
}

#[test]
fn stale_voice_tokens_do_not_advance_a_later_session() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    run_until_active(&mut orch, &mut rig, "shrine");
    let stale = rig.last_token();
    orch.reset_to_idle(10.0, &mut rig.host());
    assert_eq!(orch.pending_voice(), None);

    // the old line finishing while idle must not resurrect anything
    assert!(!orch.voice_finished(stale, 10.5, &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Idle);

    assert!(orch.on_gesture("purple", 20.0, &mut rig.host()));
    let start = frame_at(20.0);
    let end = start + past_freeze();
    run_frames(&mut orch, &mut rig, start, end);
    assert_eq!(orch.state(), ActivationState::Active);

    let current = rig.last_token();
    assert_ne!(current, stale);
    assert!(current.generation() > stale.generation());
    assert!(!orch.voice_finished(stale, frame_time(end), &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Active);
    assert!(orch.voice_finished(current, frame_time(end), &mut rig.host()));
    assert_eq!(orch.state(), ActivationState::Control);
}

#[test]
fn rejected_playback_stays_active_until_reset() {
    let mut rig = Rig::default();
    rig.voice.reject = true;
    let mut orch = idle_session(8, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "purple");
    run_frames(&mut orch, &mut rig, end, end + 600);
    assert_eq!(orch.state(), ActivationState::Active);

    orch.reset_to_idle(frame_time(end + 600), &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Idle);
}

#[test]
fn idle_mid_freeze_cancels_the_pending_activation() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    assert!(orch.on_gesture("purple", 0.0, &mut rig.host()));
    let mid_freeze = frame_at(CHARGE_DURATION_SEC + FREEZE_DURATION_SEC / 2.0);
    run_frames(&mut orch, &mut rig, 0, mid_freeze);
    assert!(orch.effects().is_running(Overlay::Freeze));
    assert_eq!(orch.pending_triggers(), 1);

    orch.reset_to_idle(frame_time(mid_freeze), &mut rig.host());
    assert_eq!(orch.pending_triggers(), 0);
    assert!(!orch.effects().any_running());

    run_frames(&mut orch, &mut rig, mid_freeze, mid_freeze + 300);
    assert_eq!(orch.state(), ActivationState::Idle);
    assert!(rig.voice.plays.is_empty());
    assert!(rig.captions.shown.is_empty());
}

#[test]
fn idle_mid_charge_cancels_the_freeze() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    assert!(orch.on_gesture("shrine", 0.0, &mut rig.host()));
    run_frames(&mut orch, &mut rig, 0, 30);
    orch.reset_to_idle(frame_time(30), &mut rig.host());
    run_frames(&mut orch, &mut rig, 30, 300);
    assert_eq!(orch.state(), ActivationState::Idle);
    assert!(!orch.effects().is_running(Overlay::Freeze));
    assert_eq!(orch.field().positions(), orch.field().base_positions());
}

#[test]
fn idle_reentry_restores_the_field_for_every_domain() {
    for key in ["shrine", "void", "purple"] {
        let mut rig = Rig::default();
        let mut orch = idle_session(32, &mut rig);
        let end = run_until_active(&mut orch, &mut rig, key);
        let token = rig.last_token();
        assert!(orch.voice_finished(token, frame_time(end), &mut rig.host()));
        orch.pointer_moved(0.4, -0.3);
        run_frames(&mut orch, &mut rig, end, end + 90);
        assert_eq!(orch.state(), ActivationState::Control);

        orch.reset_to_idle(frame_time(end + 90), &mut rig.host());
        let field = orch.field();
        assert_eq!(field.positions(), field.base_positions(), "{key}");
        assert!(field.velocities().iter().all(|v| *v == 0.0), "{key}");
        assert!((0..field.len()).all(|i| field.color(i) == IDLE_COLOR));

        assert_eq!(orch.active_domain(), None);
        assert_eq!(orch.time_scale(), 1.0);
        assert_eq!(orch.time_scale_target(), 1.0);
        assert_eq!(orch.ambient(), Atmosphere::BASELINE);
        assert!(!orch.orbit().is_enabled());
        assert_eq!(orch.camera().eye, Vec3::new(0.0, 0.0, CAM_DISTANCE));
        assert_eq!(orch.applied_shake(), Vec3::ZERO);
        assert!(orch.registry().purple().base_speeds().is_none());

        assert_eq!(rig.voice.stops, 2, "stop on intro exit and on reset");
        assert_eq!(rig.captions.hides, 2);
        assert_eq!(rig.render.bloom, BASE_BLOOM);
        assert_eq!(rig.render.backdrop, [0.0, 0.0, 0.0]);
        assert_eq!(rig.render.fog, [0.0, 0.0, 0.0]);
        assert_eq!(rig.render.size, PARTICLE_SIZE);
        assert_eq!(rig.render.exposure, TONE_EXPOSURE);
    }
}

#[test]
fn shake_never_compounds_while_charging() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    run_frames(&mut orch, &mut rig, 0, 1);
    let base_eye = orch.camera().eye - orch.applied_shake();
    assert!(orch.on_gesture("shrine", frame_time(1), &mut rig.host()));

    let mut saw_shake = false;
    for i in 1..frame_at(CHARGE_DURATION_SEC) {
        orch.frame((1.0 / FPS) as f32, frame_time(i), &mut rig.host());
        let shake = orch.applied_shake();
        saw_shake |= shake != Vec3::ZERO;
        assert!((orch.camera().eye - shake - base_eye).length() < 1e-4, "frame {i}");
        assert_eq!(rig.render.eye, orch.camera().eye);
    }
    assert!(saw_shake);
}

#[test]
fn orbit_sees_the_unshaken_camera_in_control() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "shrine");
    assert!(orch.voice_finished(rig.last_token(), frame_time(end), &mut rig.host()));
    orch.pointer_moved(0.7, 0.4);
    let target = orch.orbit().target_position();
    let inertia = orch.orbit().inertia();

    // the spike is still shaking the camera for a while
    for i in end..end + 30 {
        let before = orch.camera().eye - orch.applied_shake();
        orch.frame((1.0 / FPS) as f32, frame_time(i), &mut rig.host());
        let base = orch.camera().eye - orch.applied_shake();
        let expected = before + (target - before) * inertia;
        assert!((base - expected).length() < 1e-3, "frame {i}");
    }
}

#[test]
fn pointer_is_ignored_outside_control() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    orch.pointer_moved(1.0, 1.0);
    assert_eq!(orch.orbit().target_angles().0, 0.0);
}

#[test]
fn idle_camera_drifts_gently() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    run_frames(&mut orch, &mut rig, 0, 600);
    let eye = orch.camera().eye;
    assert_eq!(eye, idle_drift(frame_time(599)));
    assert!(eye.x.abs() <= IDLE_DRIFT_AMPLITUDE[0]);
    assert!(eye.y.abs() <= IDLE_DRIFT_AMPLITUDE[1]);
    assert_eq!(eye.z, CAM_DISTANCE);
    assert_eq!(orch.applied_shake(), Vec3::ZERO);
}

#[test]
fn charge_collapses_the_field_and_spins_it() {
    let mut rig = Rig::default();
    let mut orch = idle_session(64, &mut rig);
    assert!(orch.on_gesture("void", 0.0, &mut rig.host()));
    run_frames(&mut orch, &mut rig, 0, frame_at(CHARGE_DURATION_SEC) - 1);
    let field = orch.field();
    for i in 0..field.len() {
        assert!(field.position(i).length() < field.base_position(i).length());
    }
    assert!(orch.rotation() > 0.0);
    assert!(rig.render.bloom > BASE_BLOOM);
    assert!(rig.render.size > PARTICLE_SIZE);
}

#[test]
fn named_requests_are_validated() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    let calls = Rc::new(RefCell::new(0));
    let sink = calls.clone();
    orch.on_state_change(move |_, _| *sink.borrow_mut() += 1);

    for name in ["bogus", "IDLE", "intro", "active", "control", "charging"] {
        orch.request_state(name, 0.0, &mut rig.host());
        assert_eq!(orch.state(), ActivationState::Idle, "{name}");
    }
    orch.request_state("idle", 0.0, &mut rig.host());
    assert_eq!(*calls.borrow(), 0);

    run_until_active(&mut orch, &mut rig, "void");
    orch.request_state("control", 2.0, &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Control);
    orch.request_state("idle", 2.1, &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Idle);
}

#[test]
fn every_frame_uploads_the_field() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    let before = rig.render.uploads;
    run_frames(&mut orch, &mut rig, 0, 10);
    assert_eq!(rig.render.uploads, before + 10);
    assert_eq!(rig.render.time_scale, 1.0);
}

#[test]
fn leaving_charge_by_name_stops_its_shake() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    assert!(orch.on_gesture("shrine", 0.0, &mut rig.host()));
    run_frames(&mut orch, &mut rig, 0, 30);
    assert!(orch.applied_shake() != Vec3::ZERO);

    orch.request_state("control", frame_time(30), &mut rig.host());
    assert_eq!(orch.state(), ActivationState::Control);
    assert!(!orch.effects().is_running(Overlay::Charge));
    assert!(!orch.effects().is_running(Overlay::Freeze));
    assert_eq!(orch.pending_triggers(), 0);

    run_frames(&mut orch, &mut rig, 30, 1200);
    assert_eq!(orch.state(), ActivationState::Control);
    assert_eq!(orch.last_params().shake_magnitude, 0.0);
    assert_eq!(orch.applied_shake(), Vec3::ZERO);
    assert!(!orch.effects().any_running());
}

#[test]
fn idle_drift_starts_from_the_front_after_a_reset() {
    let mut rig = Rig::default();
    let mut orch = idle_session(8, &mut rig);
    let end = run_until_active(&mut orch, &mut rig, "void");
    let reset_frame = end + 2000;
    orch.reset_to_idle(frame_time(reset_frame), &mut rig.host());
    assert_eq!(orch.camera().eye, front_camera_position());

    let mut prev = orch.camera().eye;
    for i in reset_frame..reset_frame + 120 {
        orch.frame((1.0 / FPS) as f32, frame_time(i), &mut rig.host());
        let eye = orch.camera().eye;
        // no jump: a couple of thousandths of a unit per frame at most
        assert!((eye - prev).length() < 0.01, "frame {i}");
        prev = eye;
    }
    let elapsed = frame_time(reset_frame + 119) - frame_time(reset_frame);
    assert_eq!(orch.camera().eye, idle_drift(elapsed));
}

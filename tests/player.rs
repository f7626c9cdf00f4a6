//! Tests for animation playback
//!
//! The clips here move a single joint along X so the sampled pose can be
//! checked through its translation.

use mocap_rig::{
    animation::{Animation, AnimationPlayer, Frame, Joint, PlayState, PlaybackEvent},
    interpolate, RigConfig,
};
use nalgebra_glm as glm;
use std::{cell::RefCell, rc::Rc, sync::Arc, sync::Once};

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

fn approx_eq(a: f32, b: f32) {
    assert!((b - a).abs() < EPSILON, "{a} != {b}");
}

/// One joint per frame, translated to `x`, with a child that stays put
fn clip(xs: &[f32], duration: f32) -> Arc<Animation> {
    let frames = xs
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let id = i32::try_from(i).unwrap();
            let root = Joint::new(
                0,
                "hips",
                None,
                glm::translation(&glm::vec3(*x, 0.0, 0.0)),
            );
            let child = Joint::new(1, "spine", Some(0), glm::Mat4::identity());
            Frame::new(id, 0.0, vec![root, child])
        })
        .collect();
    Arc::new(Animation::new(1, "walk", frames, duration).unwrap())
}

fn root_x(pose: &[glm::Mat4]) -> f32 {
    interpolate::translation(&pose[0]).x
}

fn player(looping: bool) -> (AnimationPlayer, Rc<RefCell<Vec<PlaybackEvent>>>) {
    let config = RigConfig {
        loop_playback: looping,
        ..RigConfig::default()
    };
    let mut player = AnimationPlayer::new(&config);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    player.add_event_listener(move |e| sink.borrow_mut().push(e));
    (player, events)
}

fn count(events: &RefCell<Vec<PlaybackEvent>>, event: PlaybackEvent) -> usize {
    events.borrow().iter().filter(|e| **e == event).count()
}

#[test]
fn first_update_is_first_frame() {
    init_tests();
    let (mut player, events) = player(false);
    player.play(clip(&[3.0, 5.0, 9.0], 2.0), 0.0);
    assert_eq!(*events.borrow(), [PlaybackEvent::Started]);
    let pose = player.update(0.0);
    assert_eq!(pose.len(), 2);
    approx_eq(root_x(&pose), 3.0);
    assert_eq!(player.state(), PlayState::Playing);
}

#[test]
fn halfway_blend() {
    init_tests();
    let (mut player, _) = player(false);
    player.play(clip(&[0.0, 2.0], 1.0), 0.0);
    let pose = player.update(0.5);
    approx_eq(root_x(&pose), 1.0);
    approx_eq(player.progress(), 0.5);
    // Child stays at identity
    let c = glm::equal_columns_eps(&pose[1], &glm::Mat4::identity(), EPSILON);
    assert!(c.x && c.y && c.z && c.w);
}

#[test]
fn completes_once() {
    init_tests();
    let (mut player, events) = player(false);
    player.play(clip(&[0.0, 2.0, 4.0], 1.0), 0.0);
    player.update(0.5);
    let pose = player.update(0.6);
    approx_eq(root_x(&pose), 4.0);
    assert_eq!(player.state(), PlayState::Stopped);
    assert_eq!(count(&events, PlaybackEvent::Completed), 1);
    assert_eq!(
        *events.borrow(),
        [
            PlaybackEvent::Started,
            PlaybackEvent::Stopped,
            PlaybackEvent::Completed
        ]
    );

    // Further updates hold the final pose without more events
    for _ in 0..3 {
        let pose = player.update(0.5);
        approx_eq(root_x(&pose), 4.0);
    }
    assert_eq!(count(&events, PlaybackEvent::Completed), 1);
    approx_eq(player.current_time(), 0.0);

    // Stop after completion is not a transition
    player.stop();
    assert_eq!(count(&events, PlaybackEvent::Stopped), 1);
    assert!(player.update(0.1).is_empty());
}

#[test]
fn loops_once_and_wraps() {
    init_tests();
    let (mut player, events) = player(true);
    player.play(clip(&[0.0, 1.0], 1.0), 0.0);
    player.update(0.5);
    let pose = player.update(0.7);
    assert_eq!(count(&events, PlaybackEvent::Looped), 1);
    assert_eq!(player.state(), PlayState::Playing);
    approx_eq(player.current_time(), 0.2);
    approx_eq(root_x(&pose), 0.2);
    assert!(player.current_time() < player.duration());
}

#[test]
fn reversed_playback() {
    init_tests();
    let (mut player, events) = player(false);
    player.set_reversed(true);
    // Start time is clamped to the clip
    player.play(clip(&[0.0, 4.0], 1.0), 5.0);
    approx_eq(player.current_time(), 1.0);
    let pose = player.update(0.25);
    approx_eq(player.current_time(), 0.75);
    approx_eq(root_x(&pose), 3.0);

    // Running off the start completes on the first frame
    let pose = player.update(1.0);
    approx_eq(root_x(&pose), 0.0);
    assert_eq!(count(&events, PlaybackEvent::Completed), 1);
}

#[test]
fn reversed_looping_wraps_to_end() {
    init_tests();
    let (mut player, events) = player(true);
    player.set_reversed(true);
    player.play(clip(&[0.0, 4.0], 1.0), 0.25);
    player.update(0.5);
    approx_eq(player.current_time(), 0.75);
    assert_eq!(count(&events, PlaybackEvent::Looped), 1);
}

#[test]
fn pause_and_resume() {
    init_tests();
    let (mut player, events) = player(false);
    player.play(clip(&[0.0, 1.0], 2.0), 0.0);
    player.update(0.5);
    player.pause();
    assert_eq!(player.state(), PlayState::Paused);
    assert!(player.update(0.5).is_empty());
    approx_eq(player.current_time(), 0.5);
    // Pausing twice is ignored
    player.pause();
    player.resume();
    player.update(0.5);
    approx_eq(player.current_time(), 1.0);
    assert_eq!(
        *events.borrow(),
        [
            PlaybackEvent::Started,
            PlaybackEvent::Paused,
            PlaybackEvent::Resumed
        ]
    );
}

#[test]
fn stop_resets() {
    init_tests();
    let (mut player, events) = player(false);
    // Stop while idle is not a transition
    player.stop();
    assert!(events.borrow().is_empty());
    player.play(clip(&[0.0, 1.0], 2.0), 1.0);
    player.stop();
    assert_eq!(player.state(), PlayState::Stopped);
    assert!(player.animation().is_none());
    approx_eq(player.current_time(), 0.0);
    assert_eq!(count(&events, PlaybackEvent::Stopped), 1);
    assert!(player.update(0.1).is_empty());
}

#[test]
fn speed_and_seek() {
    init_tests();
    let (mut player, _) = player(false);
    approx_eq(player.progress(), 0.0);
    player.set_playback_speed(0.0);
    approx_eq(player.speed(), 0.01);
    player.set_playback_speed(-3.0);
    approx_eq(player.speed(), 0.01);
    player.set_playback_speed(2.0);
    player.play(clip(&[0.0, 1.0], 2.0), 0.0);
    player.update(0.25);
    approx_eq(player.current_time(), 0.5);

    player.seek_to(0.75);
    approx_eq(player.current_time(), 1.5);
    approx_eq(player.progress(), 0.75);
    approx_eq(root_x(&player.current_pose()), 0.75);
    player.seek_to(4.0);
    approx_eq(player.progress(), 1.0);
}

#[test]
fn bad_delta_time() {
    init_tests();
    let (mut player, _) = player(false);
    player.play(clip(&[0.0, 1.0], 1.0), 0.5);
    player.update(-1.0);
    approx_eq(player.current_time(), 0.5);
    let pose = player.update(f32::NAN);
    approx_eq(player.current_time(), 0.5);
    approx_eq(root_x(&pose), 0.5);
}

#[test]
fn non_finite_speed() {
    init_tests();
    let (mut player, events) = player(true);
    player.set_playback_speed(2.0);
    player.set_playback_speed(f32::INFINITY);
    player.set_playback_speed(f32::NAN);
    approx_eq(player.speed(), 2.0);
    player.play(clip(&[0.0, 1.0], 1.0), 0.0);
    let pose = player.update(0.25);
    approx_eq(player.current_time(), 0.5);
    assert!(pose.iter().all(|m| m.iter().all(|v| v.is_finite())));

    // Largest finite speed still wraps to a time inside the clip, even when
    // the step overflows
    player.set_playback_speed(f32::MAX);
    for dt in [1.0, 2.0] {
        player.update(dt);
        let time = player.current_time();
        assert!((0.0..1.0).contains(&time), "time {time}");
    }
    assert_eq!(count(&events, PlaybackEvent::Looped), 2);
    assert_eq!(player.state(), PlayState::Playing);
}

#[test]
fn non_finite_seek_and_start() {
    init_tests();
    let (mut player, events) = player(false);
    player.play(clip(&[0.0, 1.0], 1.0), f32::NAN);
    approx_eq(player.current_time(), 0.0);
    player.update(0.25);
    player.seek_to(f32::NAN);
    player.seek_to(f32::NEG_INFINITY);
    approx_eq(player.current_time(), 0.25);
    approx_eq(player.progress(), 0.25);
    for _ in 0..5 {
        player.update(1.0);
    }
    assert_eq!(player.state(), PlayState::Stopped);
    assert_eq!(count(&events, PlaybackEvent::Completed), 1);
    approx_eq(root_x(&player.update(0.1)), 1.0);
}

#[test]
fn unplayable_clip_refused() {
    init_tests();
    let (mut player, events) = player(false);
    let empty = Arc::new(Animation::new(2, "empty", Vec::new(), 0.0).unwrap());
    player.play(empty, 0.0);
    assert_eq!(player.state(), PlayState::Stopped);
    assert!(events.borrow().is_empty());
    assert!(player.update(0.1).is_empty());
}

#[test]
fn single_frame_clip() {
    init_tests();
    let (mut player, _) = player(true);
    player.play(clip(&[7.0], 1.0), 0.0);
    approx_eq(root_x(&player.update(0.3)), 7.0);
    approx_eq(root_x(&player.update(0.9)), 7.0);
}

#[test]
fn remove_listener() {
    init_tests();
    let (mut player, events) = player(false);
    let other = Rc::new(RefCell::new(0));
    let sink = other.clone();
    let id = player.add_event_listener(move |_| *sink.borrow_mut() += 1);
    player.play(clip(&[0.0, 1.0], 1.0), 0.0);
    assert!(player.remove_event_listener(id));
    assert!(!player.remove_event_listener(id));
    player.pause();
    assert_eq!(*other.borrow(), 1);
    assert_eq!(events.borrow().len(), 2);

    player.remove_all_event_listeners();
    player.resume();
    assert_eq!(events.borrow().len(), 2);
}

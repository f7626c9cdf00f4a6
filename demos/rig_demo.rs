//! Headless demo of rigging with mocap-rig
//!
//! Loads a clip in the background, lassoes the forearm of a simple arm mesh,
//! binds it to the elbow and plays the clip, logging where the hand ends up.
//! Run with `RUST_LOG=info` to see the session's own logging.
use log::info;
use mocap_rig::{
    animation::{spawn_load, YamlClipSource},
    camera::{self, OrbitCamera},
    selection::SoftwareMaskRenderer,
    skin, RigConfig, RigSession, RiggedMesh,
};
use nalgebra_glm as glm;
use std::{path::Path, thread, time::Duration};

const CLIPS: &str = "./demos/assets/wave.yaml";
const CONFIG: &str = "./demos/assets/rig.yaml";
const SIM_RATE: f32 = 1.0 / 30.0;
const POLL: Duration = Duration::from_millis(5);
const SEGMENTS: u8 = 12;

fn arm_mesh() -> RiggedMesh {
    // Points along the arm from shoulder to hand, just above and below it
    let positions = (0..=SEGMENTS)
        .flat_map(|i| {
            let x = 0.2 + 0.55 * f32::from(i) / f32::from(SEGMENTS);
            [glm::vec3(x, 0.0, 1.43), glm::vec3(x, 0.0, 1.37)]
        })
        .collect();
    RiggedMesh::new(positions)
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let clip_path = if args.len() < 2 {
        CLIPS.to_string()
    } else {
        args[1].clone()
    };

    let config = RigConfig::load(Path::new(CONFIG)).unwrap_or_else(|e| {
        info!("using default config: {e}");
        RigConfig::default()
    });
    let mut session = RigSession::new(
        arm_mesh(),
        Box::new(SoftwareMaskRenderer),
        config,
    );

    let pending =
        spawn_load(YamlClipSource::new(Path::new(&clip_path))).unwrap();
    let clips = loop {
        // A UI would keep drawing frames here
        if let Some(result) = session.poll_clips(&pending) {
            break result.unwrap();
        }
        thread::sleep(POLL);
    };
    for clip in &clips {
        info!(
            "clip {} {:?} frames={} rate={} recorded={:?}",
            clip.id,
            clip.name,
            clip.frame_count(),
            clip.frame_rate(),
            clip.recording_date
        );
    }
    for node in session.hierarchy() {
        println!(
            "{}joint {}{}",
            "  ".repeat(node.depth),
            node.joint_id,
            if node.is_leaf { " (leaf)" } else { "" }
        );
    }

    // Looking at the elbow from the front
    let mut viewport = OrbitCamera::new(glm::vec3(0.5, 0.0, 1.4), 3.0);
    viewport.set_lens(1.0, camera::focal_length_to_fovy(50.0));

    // Lasso everything right of the elbow
    session.begin_lasso(glm::vec2(0.0, -0.5));
    for p in [glm::vec2(0.95, -0.5), glm::vec2(0.95, 0.5), glm::vec2(0.0, 0.5)]
    {
        session.drag_lasso(p);
    }
    let selected = session.complete_lasso(&viewport).unwrap();
    println!("lasso selected {selected} vertices");
    if !session.assign_selection(1) {
        println!("elbow binding rejected");
    }
    println!("elbow drives {} vertices", session.assignment_count(1));

    session.add_event_listener(|e| println!("event {e:?}"));
    session.play();
    let mut ticks = 0;
    loop {
        let pose = session.tick(SIM_RATE);
        ticks += 1;
        if ticks % 10 == 0 {
            let palette = skin::palette(&pose);
            info!(
                "tick {} palette {} bytes",
                ticks,
                skin::palette_bytes(&palette).len()
            );
        }
        let finished = session.player().animation().is_none();
        if finished || ticks > 1000 {
            break;
        }
    }

    let hand = session
        .mesh()
        .positions()
        .last()
        .copied()
        .unwrap_or_else(glm::Vec3::zeros);
    println!(
        "hand at {:.3} {:.3} {:.3} after {ticks} ticks",
        hand.x, hand.y, hand.z
    );
}

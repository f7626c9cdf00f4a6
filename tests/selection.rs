//! Tests for lasso selection
//!
//! Most tests use an identity camera so that mesh positions are already in
//! NDC and the expected selection can be read straight off the coordinates.

use mocap_rig::{
    camera::OrbitCamera,
    projection,
    selection::{
        SelectionMask, SelectionPolygon, SelectionResolver, SelectionTool,
        SoftwareMaskRenderer,
    },
    types::{CameraTrait, MaskRenderer},
    RigConfig, RigError,
};
use nalgebra_glm as glm;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

struct IdentityCamera;

impl CameraTrait for IdentityCamera {
    fn view_matrix(&self) -> glm::Mat4 {
        glm::Mat4::identity()
    }

    fn proj_matrix(&self) -> glm::Mat4 {
        glm::Mat4::identity()
    }
}

struct BrokenRenderer;

impl MaskRenderer for BrokenRenderer {
    fn render_mask(
        &mut self,
        _polygon: &SelectionPolygon,
        _dimensions: [u32; 2],
    ) -> Result<SelectionMask, RigError> {
        Err(RigError::DataNotConverted)
    }
}

/// Always hands back a 1x1 mask
struct TinyRenderer;

impl MaskRenderer for TinyRenderer {
    fn render_mask(
        &mut self,
        _polygon: &SelectionPolygon,
        _dimensions: [u32; 2],
    ) -> Result<SelectionMask, RigError> {
        SelectionMask::from_raw(1, 1, vec![255; 4])
    }
}

fn square(half: f32) -> [glm::Vec2; 4] {
    [
        glm::vec2(-half, -half),
        glm::vec2(half, -half),
        glm::vec2(half, half),
        glm::vec2(-half, half),
    ]
}

fn config() -> RigConfig {
    RigConfig {
        mask_size: [64, 64],
        ..RigConfig::default()
    }
}

fn lasso(tool: &mut SelectionTool, points: &[glm::Vec2]) {
    tool.begin(points[0]);
    for p in &points[1..] {
        tool.drag(*p);
    }
}

fn positions() -> Vec<glm::Vec3> {
    vec![
        glm::vec3(0.0, 0.0, 0.0),
        glm::vec3(0.25, -0.25, 0.0),
        glm::vec3(0.9, 0.9, 0.0),
        glm::vec3(2.0, 0.0, 0.0),
        glm::vec3(-0.4, 0.4, 0.0),
    ]
}

#[test]
fn square_lasso() {
    init_tests();
    let mut tool =
        SelectionTool::new(Box::new(SoftwareMaskRenderer), &config());
    lasso(&mut tool, &square(0.5));
    assert!(tool.is_dragging());
    let selected = tool
        .complete(&positions(), &glm::Mat4::identity(), &IdentityCamera)
        .unwrap();
    assert_eq!(selected, [0, 1, 4]);
    assert!(!tool.is_dragging());
    assert_eq!(tool.flags(), [true, true, false, false, true]);
}

#[test]
fn model_matrix_moves_mesh() {
    init_tests();
    let mut tool =
        SelectionTool::new(Box::new(SoftwareMaskRenderer), &config());
    lasso(&mut tool, &square(0.5));
    let model = glm::translation(&glm::vec3(-0.8, -0.8, 0.0));
    let selected = tool
        .complete(&positions(), &model, &IdentityCamera)
        .unwrap();
    // Only the vertex at (0.9, 0.9) lands inside after the shift
    assert_eq!(selected, [2]);
}

#[test]
fn too_few_points() {
    init_tests();
    let mut tool =
        SelectionTool::new(Box::new(SoftwareMaskRenderer), &config());
    lasso(&mut tool, &[glm::vec2(-0.5, -0.5), glm::vec2(0.5, 0.5)]);
    let selected = tool
        .complete(&positions(), &glm::Mat4::identity(), &IdentityCamera)
        .unwrap();
    assert!(selected.is_empty());
    assert_eq!(tool.flags().len(), 5);
}

#[test]
fn near_duplicate_points_collapse() {
    init_tests();
    let mut tool =
        SelectionTool::new(Box::new(SoftwareMaskRenderer), &config());
    tool.begin(glm::vec2(0.0, 0.0));
    assert!(!tool.drag(glm::vec2(0.0, 0.0001)));
    assert!(tool.drag(glm::vec2(0.5, 0.0)));
    assert_eq!(tool.polygon().points().len(), 2);
    // Dragging without a lasso in progress does nothing
    tool.cancel();
    assert!(!tool.drag(glm::vec2(0.9, 0.9)));
    assert!(tool.polygon().points().is_empty());
}

#[test]
fn renderer_failure() {
    init_tests();
    let mut tool = SelectionTool::new(Box::new(BrokenRenderer), &config());
    lasso(&mut tool, &square(0.5));
    let res = tool.complete(&positions(), &glm::Mat4::identity(), &IdentityCamera);
    assert!(matches!(
        &res,
        Err(RigError::MaskUnavailable(cause))
            if matches!(**cause, RigError::DataNotConverted)
    ));
    // The renderer's error is kept as the source
    let err = res.unwrap_err();
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().contains("could not convert"));
    assert!(tool.selected_indices().is_empty());
}

#[test]
fn degenerate_mask() {
    init_tests();
    let mut tool = SelectionTool::new(Box::new(TinyRenderer), &config());
    lasso(&mut tool, &square(0.5));
    let res = tool.complete(&positions(), &glm::Mat4::identity(), &IdentityCamera);
    assert!(matches!(
        res,
        Err(RigError::DegenerateMask {
            width: 1,
            height: 1
        })
    ));
    assert!(tool.flags().iter().all(|f| !f));
}

#[test]
fn resolver_threshold() {
    init_tests();
    // Left half faint, right half solid
    let mut bytes = Vec::new();
    for _y in 0..4 {
        for x in 0..4 {
            let alpha = if x < 2 { 20 } else { 200 };
            bytes.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }
    let mask = SelectionMask::from_raw(4, 4, bytes).unwrap();
    let points = [glm::vec3(-0.5, 0.0, 0.0), glm::vec3(0.5, 0.0, 0.0)];

    let mut resolver = SelectionResolver::default();
    let flags = resolver
        .resolve(&points, &glm::Mat4::identity(), &IdentityCamera, &mask)
        .unwrap();
    assert_eq!(flags, [false, true]);

    let mut resolver = SelectionResolver::new(0.05);
    resolver
        .resolve(&points, &glm::Mat4::identity(), &IdentityCamera, &mask)
        .unwrap();
    assert_eq!(resolver.selected_indices(), [0, 1]);
}

#[test]
fn with_viewport_camera() {
    init_tests();
    let camera = OrbitCamera::default();
    // Target of the default camera lands in the centre
    let centre = projection::project_point(
        &glm::vec3(0.0, 0.0, 1.0),
        &camera.mvp(&glm::Mat4::identity()),
        [64, 64],
    )
    .unwrap();
    assert!((centre.x - 32.0).abs() < 0.01 && (centre.y - 32.0).abs() < 0.01);

    let mesh = [
        glm::vec3(0.0, 0.0, 1.0),
        glm::vec3(0.3, 0.0, 1.0),
        glm::vec3(2.0, 0.0, 1.0),
        glm::vec3(50.0, 0.0, 1.0),
    ];
    let mut tool =
        SelectionTool::new(Box::new(SoftwareMaskRenderer), &config());
    lasso(&mut tool, &square(0.2));
    let selected = tool
        .complete(&mesh, &glm::Mat4::identity(), &camera)
        .unwrap();
    assert_eq!(selected, [0, 1]);
}

#[test]
fn offscreen_vertices_skipped() {
    init_tests();
    let projected = projection::project(
        &positions(),
        &glm::Mat4::identity(),
        &glm::Mat4::identity(),
        &glm::Mat4::identity(),
        [64, 64],
    );
    let indices: Vec<usize> = projected.iter().map(|p| p.index).collect();
    assert_eq!(indices, [0, 1, 2, 4]);
}

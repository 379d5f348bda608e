//! Matrix Tests
//!
//! Tests for:
//! - Column-major multiply, identity, associativity
//! - Element-wise sum and difference
//! - Inversion
//! - TRS composition against glam
//! - Fused perspective view-projection against its factored form

mod common;

use glam::{Mat4, Quat, Vec3};

use common::mat_approx;
use gltf_scene::Matrix4;
use gltf_scene::scene::camera::PerspectiveCamera;

fn sample_a() -> Matrix4 {
    Matrix4::from_trs(
        Vec3::new(1.0, -2.0, 3.0),
        Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 0.4),
        Vec3::new(2.0, 3.0, 0.5),
    )
}

fn sample_b() -> Matrix4 {
    Matrix4::from_trs(
        Vec3::new(-0.5, 0.25, 4.0),
        Quat::from_rotation_z(1.1),
        Vec3::splat(1.5),
    )
}

// ============================================================================
// Products
// ============================================================================

#[test]
fn identity_multiply_is_exact() {
    let a = sample_a();
    assert_eq!(Matrix4::IDENTITY.multiply(&a), a);
    assert_eq!(a.multiply(&Matrix4::IDENTITY), a);
    assert_eq!(Matrix4::default(), Matrix4::IDENTITY);
}

#[test]
fn multiply_is_associative() {
    let (a, b) = (sample_a(), sample_b());
    let c = Matrix4::from_translation(Vec3::new(7.0, 0.0, -1.0));

    let left = a.multiply(&b).multiply(&c);
    let right = a.multiply(&b.multiply(&c));
    assert!(mat_approx(&left, &right));
}

#[test]
fn multiply_matches_glam() {
    let (a, b) = (sample_a(), sample_b());
    let expected: Matrix4 = (Mat4::from(a) * Mat4::from(b)).into();
    assert!(mat_approx(&(a * b), &expected));
}

#[test]
fn translation_is_in_last_column() {
    let m = Matrix4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(m.0[12..15], [1.0, 2.0, 3.0]);
    assert_eq!(m.0[Matrix4::index(3, 0)], 1.0);
}

#[test]
fn add_then_subtract_restores_matrix() {
    let (a, b) = (sample_a(), sample_b());
    assert!(mat_approx(&(a + b - b), &a));
    assert_eq!(a - a, Matrix4([0.0; 16]));
}

#[test]
fn element_wise_sum_and_difference_match_glam() {
    let (a, b) = (sample_a(), sample_b());
    let sum: Matrix4 = (Mat4::from(a) + Mat4::from(b)).into();
    let difference: Matrix4 = (Mat4::from(a) - Mat4::from(b)).into();
    assert_eq!(a + b, sum);
    assert_eq!(a - b, difference);
    assert_eq!((a + b).0[13], a.0[13] + b.0[13]);
}

// ============================================================================
// Inversion & transposition
// ============================================================================

#[test]
fn invert_yields_identity_product() {
    let a = sample_a();
    let product = a.multiply(&a.invert());
    assert!(mat_approx(&product, &Matrix4::IDENTITY));

    let expected: Matrix4 = Mat4::from(a).inverse().into();
    assert!(mat_approx(&a.invert(), &expected));
}

#[test]
fn transpose_twice_is_identity_operation() {
    let a = sample_a();
    assert_eq!(a.transpose().transpose(), a);
    assert_eq!(a.transpose().0[1], a.0[4]);
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn rotation_matches_glam() {
    let q = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.2, 2.0);
    assert!(mat_approx(&Matrix4::from_rotation(q), &Mat4::from_quat(q).into()));
}

#[test]
fn trs_matches_glam() {
    let t = Vec3::new(3.0, -1.0, 0.5);
    let r = Quat::from_rotation_y(0.7);
    let s = Vec3::new(1.0, 2.0, 3.0);
    let expected: Matrix4 = Mat4::from_scale_rotation_translation(s, r, t).into();
    assert!(mat_approx(&Matrix4::from_trs(t, r, s), &expected));
    assert!(mat_approx(
        &Matrix4::from_trs(t, r, s),
        &(Matrix4::from_translation(t) * Matrix4::from_rotation(r) * Matrix4::from_scale(s))
    ));
}

#[test]
fn from_slice_requires_sixteen_values() {
    assert!(Matrix4::from_slice(&[0.0; 15]).is_none());
    let m = Matrix4::from_slice(&Matrix4::IDENTITY.to_cols_array()).unwrap();
    assert_eq!(m, Matrix4::IDENTITY);
}

// ============================================================================
// Perspective view-projection
// ============================================================================

fn factored(camera: &PerspectiveCamera) -> Matrix4 {
    let fx = (std::f32::consts::FRAC_PI_2 + camera.fov * 0.5).tan();
    let fy = fx * camera.aspect;
    let ir = 1.0 / (camera.near - camera.far);
    let dz = (camera.near + camera.far) * ir;
    let dw = 2.0 * camera.near * camera.far * ir;

    let projection = Mat4::from_cols_array(&[
        fx, 0.0, 0.0, 0.0, //
        0.0, fy, 0.0, 0.0, //
        0.0, 0.0, dz, -1.0, //
        0.0, 0.0, dw, 0.0,
    ]);
    let rotation = Mat4::from_rotation_x(camera.rotation.x)
        * Mat4::from_rotation_y(camera.rotation.y)
        * Mat4::from_rotation_z(camera.rotation.z);
    let translation = Mat4::from_translation(camera.position);

    (projection * rotation * translation).into()
}

#[test]
fn view_projection_without_transform() {
    let camera = PerspectiveCamera::new(1.5, 1.0, 0.1, 50.0);
    assert!(mat_approx(&camera.view_projection(), &factored(&camera)));
}

#[test]
fn view_projection_matches_factored_form() {
    let mut camera = PerspectiveCamera::new(16.0 / 9.0, 0.8, 0.01, 100.0);
    camera.position = Vec3::new(1.0, -2.0, 3.5);
    camera.rotation = Vec3::new(0.3, -0.7, 1.9);

    assert!(mat_approx(&camera.view_projection(), &factored(&camera)));
}

#[test]
fn view_projection_single_axis_rotations() {
    for rotation in [Vec3::X, Vec3::Y, Vec3::Z] {
        let mut camera = PerspectiveCamera::new(1.0, 1.2, 0.5, 20.0);
        camera.rotation = rotation * 0.9;
        camera.position = Vec3::new(0.5, 0.5, -4.0);
        assert!(mat_approx(&camera.view_projection(), &factored(&camera)));
    }
}

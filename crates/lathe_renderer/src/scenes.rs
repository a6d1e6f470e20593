//! Built-in demo scenes.

use crate::{
    Camera, Color, Disk, Group, Material, MaterialId, Plane, Rectangle, RevSurface, Scene, SceneResult, Sphere,
    Transform,
};
use lathe_core::{Curve, Texture};
use lathe_math::{DMat4, DVec3};
use std::sync::Arc;

/// Names accepted by [`by_name`].
pub const SCENE_NAMES: &[&str] = &["cornell", "vase"];

// Shared material table
const WHITE: MaterialId = MaterialId(0);
const BLACK: MaterialId = MaterialId(1);
const RED: MaterialId = MaterialId(2);
const GREEN: MaterialId = MaterialId(3);
const BLUE: MaterialId = MaterialId(4);
const MIRROR: MaterialId = MaterialId(5);
const GLASS: MaterialId = MaterialId(6);
const LIGHT: MaterialId = MaterialId(7);
const CHECKER: MaterialId = MaterialId(8);

fn materials() -> Vec<Material> {
    let checker = Texture::checkerboard(64, 8, Color::splat(0.9), Color::new(0.1, 0.1, 0.35));
    vec![
        Material::diffuse(Color::splat(0.75)),
        Material::diffuse(Color::ZERO),
        Material::diffuse(Color::new(0.75, 0.25, 0.25)),
        Material::diffuse(Color::new(0.25, 0.75, 0.25)),
        Material::diffuse(Color::new(0.25, 0.25, 0.75)),
        Material::specular(Color::splat(0.999)),
        Material::refractive(Color::splat(0.999), 1.5),
        Material::light(Color::splat(12.0)),
        Material::diffuse(Color::ONE).with_texture(Arc::new(checker)),
    ]
}

fn camera(width: u32, height: u32) -> Camera {
    Camera::new()
        .with_resolution(width, height)
        .with_position(DVec3::new(0.0, 0.0, 19.0), DVec3::new(0.0, -1.0, 0.0), DVec3::Y)
        .with_lens(55.0, 0.0, 1.0)
}

/// Six walls of a box spanning [-10, 10] on x and y, [-10, 20] on z.
///
/// The front wall is behind the camera.
fn walls(group: &mut Group) -> SceneResult<()> {
    group.add(Plane::new(DVec3::X, DVec3::new(-10.0, 0.0, 0.0), RED)?);
    group.add(Plane::new(-DVec3::X, DVec3::new(10.0, 0.0, 0.0), GREEN)?);
    group.add(Plane::new(DVec3::Y, DVec3::new(0.0, -10.0, 0.0), WHITE)?);
    group.add(Plane::new(-DVec3::Y, DVec3::new(0.0, 10.0, 0.0), WHITE)?);
    group.add(Plane::new(DVec3::Z, DVec3::new(0.0, 0.0, -10.0), WHITE)?);
    group.add(Plane::new(-DVec3::Z, DVec3::new(0.0, 0.0, 20.0), BLACK)?);
    Ok(())
}

/// Classic Cornell box: mirror sphere, glass sphere and a spherical light
/// poking through the ceiling.
pub fn cornell_box(width: u32, height: u32) -> SceneResult<Scene> {
    let mut root = Group::new();
    walls(&mut root)?;

    root.add(Sphere::new(DVec3::new(-4.5, -7.0, -4.0), 3.0, MIRROR)?);
    root.add(Sphere::new(DVec3::new(4.5, -7.0, 1.0), 3.0, GLASS)?);
    root.add(Sphere::new(DVec3::new(0.0, 12.0, 0.0), 3.0, LIGHT)?);

    Scene::new(camera(width, height), materials(), root)
}

/// Vase profile in the xy plane: x is the radius, y the height.
fn vase_profile() -> SceneResult<Curve> {
    let controls = [
        (1.0, 0.0),
        (3.0, 0.4),
        (3.6, 2.5),
        (2.2, 4.5),
        (1.2, 6.0),
        (1.6, 7.5),
        (2.3, 8.2),
    ];
    let controls = controls.iter().map(|&(x, y)| DVec3::new(x, y, 0.0)).collect();
    Ok(Curve::bspline(controls)?)
}

/// Cornell box holding a vase of revolution on a disk pedestal, a glass
/// ellipsoid, a checkered ball and a rectangular ceiling light.
pub fn vase_scene(width: u32, height: u32) -> SceneResult<Scene> {
    let mut root = Group::new();
    walls(&mut root)?;

    let vase = RevSurface::new(vase_profile()?, BLUE)?;
    root.add(Transform::new(DMat4::from_translation(DVec3::new(-4.0, -6.0, -3.0)), vase)?);
    root.add(Disk::new(DVec3::new(-4.0, -6.0, -3.0), 4.5, DVec3::Y, WHITE)?);

    let ellipsoid = Sphere::new(DVec3::ZERO, 1.0, GLASS)?;
    let placement = DMat4::from_translation(DVec3::new(5.0, -7.0, 2.0)) * DMat4::from_scale(DVec3::new(2.0, 3.0, 2.0));
    root.add(Transform::new(placement, ellipsoid)?);

    root.add(Sphere::new(DVec3::new(3.0, -8.0, -6.0), 2.0, CHECKER)?);

    root.add(Rectangle::new(
        DVec3::new(-3.0, 9.99, -3.0),
        DVec3::new(6.0, 0.0, 0.0),
        DVec3::new(0.0, 0.0, 6.0),
        LIGHT,
    )?);

    Scene::new(camera(width, height), materials(), root)
}

/// Build a demo scene by name, `None` if the name is unknown.
pub fn by_name(name: &str, width: u32, height: u32) -> Option<SceneResult<Scene>> {
    match name {
        "cornell" => Some(cornell_box(width, height)),
        "vase" => Some(vase_scene(width, height)),
        _ => None,
    }
}

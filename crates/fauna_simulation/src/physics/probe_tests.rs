//! Tests for headless probes.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::layers::LayerMask;
    use super::super::probe::{GroundProbe, HeadlessGeometry, LineOfSight, ObstacleBox, OpenField};

    fn wall_at_x(x: f32) -> ObstacleBox {
        ObstacleBox::new(Vec3::new(x - 0.1, -1.0, -10.0), Vec3::new(x + 0.1, 5.0, 10.0))
    }

    #[test]
    fn test_open_field_never_obstructs() {
        let field = OpenField;
        assert!(!field.is_obstructed(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), LayerMask::ALL));
        assert!(field.probe_ground(Vec3::Y, 10.0, LayerMask::ALL).is_none());
    }

    #[test]
    fn test_ground_probe_hits_plane() {
        let geometry = HeadlessGeometry::flat_ground(2.0);
        let hit = geometry
            .probe_ground(Vec3::new(3.0, 5.0, 1.0), 10.0, LayerMask::ENVIRONMENT)
            .expect("ground below");
        assert!((hit.y - 2.0).abs() < 1e-5);
        assert!((hit.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_ground_probe_respects_distance_and_mask() {
        let geometry = HeadlessGeometry::flat_ground(0.0);
        assert!(geometry.probe_ground(Vec3::new(0.0, 5.0, 0.0), 2.0, LayerMask::ENVIRONMENT).is_none());
        assert!(geometry.probe_ground(Vec3::new(0.0, 1.0, 0.0), 2.0, LayerMask::ACTORS).is_none());
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let geometry = HeadlessGeometry::default().with_obstacle(wall_at_x(2.0));
        let from = Vec3::new(0.0, 1.5, 0.0);

        assert!(geometry.is_obstructed(from, Vec3::new(4.0, 0.0, 0.0), LayerMask::ENVIRONMENT));
        // Цель перед стеной
        assert!(!geometry.is_obstructed(from, Vec3::new(1.5, 0.0, 0.0), LayerMask::ENVIRONMENT));
        // Стена не в маске
        assert!(!geometry.is_obstructed(from, Vec3::new(4.0, 0.0, 0.0), LayerMask::PROPS));
    }

    #[test]
    fn test_forward_ray_hits_nearest_obstacle() {
        let geometry = HeadlessGeometry::default()
            .with_obstacle(wall_at_x(5.0))
            .with_obstacle(wall_at_x(2.0));
        let hit = geometry
            .cast_ray(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 10.0, LayerMask::ENVIRONMENT)
            .expect("wall ahead");
        assert!((hit.distance - 1.9).abs() < 1e-4);
    }
}

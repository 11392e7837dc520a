//! Orthogonal connection routing between placed shapes.

use log::trace;

use spindle_core::{
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::structure::Graph;

/// Computes waypoints for every flow from the current node geometry.
///
/// Connections leave the side of the source that faces the target and enter
/// the opposite side of the target, both at vertical mid-height. Nearly
/// level endpoints get a straight segment; everything else gets a
/// horizontal/vertical/horizontal dogleg through the horizontal midpoint.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionRouter {
    straight_tolerance: f32,
}

impl ConnectionRouter {
    pub fn new(straight_tolerance: f32) -> Self {
        Self { straight_tolerance }
    }

    /// Routes a single connection between two shapes.
    pub fn route(&self, source: Bounds, target: Bounds) -> Vec<Point> {
        let (start, end) = if source.center().x() <= target.center().x() {
            (source.right_mid(), target.left_mid())
        } else {
            (source.left_mid(), target.right_mid())
        };

        if (end.y() - start.y()).abs() < self.straight_tolerance {
            return vec![start, end];
        }

        let mid_x = (start.x() + end.x()) / 2.0;
        vec![
            start,
            Point::new(mid_x, start.y()),
            Point::new(mid_x, end.y()),
            end,
        ]
    }

    /// Routes every edge of `graph` whose endpoints both have geometry.
    pub fn route_all(&self, graph: &Graph) -> Vec<(Id, Vec<Point>)> {
        graph
            .edges()
            .filter_map(|edge| {
                let source = graph.node(edge.source()).and_then(|node| node.bounds());
                let target = graph.node(edge.target()).and_then(|node| node.bounds());
                match (source, target) {
                    (Some(source), Some(target)) => Some((edge.id(), self.route(source, target))),
                    _ => {
                        trace!(flow:% = edge.id(); "Skipping flow without endpoint geometry");
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use spindle_core::{
        element::{Element, ElementKind},
        geometry::Size,
    };

    use super::*;

    fn bounds(x: f32, y: f32, w: f32, h: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_straight_when_level() {
        let router = ConnectionRouter::new(20.0);
        let route = router.route(bounds(100.0, 232.0, 36.0, 36.0), bounds(280.0, 210.0, 100.0, 80.0));

        assert_eq!(route, vec![Point::new(136.0, 250.0), Point::new(280.0, 250.0)]);
    }

    #[test]
    fn test_small_offset_stays_straight() {
        let router = ConnectionRouter::new(20.0);
        let route = router.route(bounds(0.0, 0.0, 40.0, 40.0), bounds(100.0, 19.0, 40.0, 40.0));

        assert_eq!(route.len(), 2);
        assert_approx_eq!(f32, route[0].y(), 20.0);
        assert_approx_eq!(f32, route[1].y(), 39.0);
    }

    #[test]
    fn test_dogleg_when_offset() {
        let router = ConnectionRouter::new(20.0);
        let route = router.route(bounds(0.0, 0.0, 40.0, 40.0), bounds(200.0, 100.0, 40.0, 40.0));

        assert_eq!(
            route,
            vec![
                Point::new(40.0, 20.0),
                Point::new(120.0, 20.0),
                Point::new(120.0, 120.0),
                Point::new(200.0, 120.0),
            ]
        );
    }

    #[test]
    fn test_backward_flow_uses_opposite_ports() {
        let router = ConnectionRouter::new(20.0);
        let route = router.route(bounds(300.0, 0.0, 40.0, 40.0), bounds(0.0, 0.0, 40.0, 40.0));

        assert_eq!(route, vec![Point::new(300.0, 20.0), Point::new(40.0, 20.0)]);
    }

    #[test]
    fn test_route_all_skips_missing_geometry() {
        let elements = vec![
            Element::new(Id::new("a"), ElementKind::Activity)
                .with_geometry(Point::new(0.0, 0.0), Size::new(40.0, 40.0)),
            Element::new(Id::new("b"), ElementKind::Activity)
                .with_geometry(Point::new(100.0, 0.0), Size::new(40.0, 40.0)),
            Element::new(Id::new("ghost"), ElementKind::Activity),
            Element::flow(Id::new("f1"), Id::new("a"), Id::new("b")),
            Element::flow(Id::new("f2"), Id::new("a"), Id::new("ghost")),
        ];
        let routes = ConnectionRouter::new(20.0).route_all(&Graph::extract(&elements));

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].0, Id::new("f1"));
    }
}

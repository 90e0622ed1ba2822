use glam::Vec2;
use jkit::geometry::*;

#[test]
fn test_rect_edges_and_center() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    assert_eq!(r.half_extents(), Vec2::new(15.0, 20.0));
}

#[test]
fn test_rect_from_center() {
    let r = Rect::from_center(Vec2::new(5.0, 5.0), Vec2::new(2.0, 3.0));
    assert_eq!(r, Rect::new(3.0, 2.0, 4.0, 6.0));
}

#[test]
fn test_rect_contains_point_is_half_open() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains_point(Vec2::ZERO));
    assert!(r.contains_point(Vec2::new(9.99, 9.99)));
    assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
    assert!(!r.contains_point(Vec2::new(5.0, 10.0)));
}

#[test]
fn test_rect_intersection() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(5.0, -5.0, 10.0, 10.0);
    assert!(a.intersects(&b) && b.intersects(&a));
    assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 0.0, 5.0, 5.0)));
}

#[test]
fn test_rect_corner_touch_is_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 10.0, 5.0, 5.0);
    assert!(!a.intersects(&b));
}

#[test]
fn test_rect_union_and_expand() {
    let a = Rect::new(0.0, 0.0, 2.0, 2.0);
    let b = Rect::new(5.0, 1.0, 1.0, 4.0);
    assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 6.0, 5.0));
    assert_eq!(a.expand(1.0), Rect::new(-1.0, -1.0, 4.0, 4.0));
}

#[test]
fn test_line_horizontal() {
    let points = line(0, 0, 5, 0);
    assert_eq!(points, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]);
}

#[test]
fn test_line_vertical_backwards() {
    let points = line(0, 3, 0, 0);
    assert_eq!(points, vec![(0, 3), (0, 2), (0, 1), (0, 0)]);
}

#[test]
fn test_line_diagonal() {
    let points = line(0, 0, 3, 3);
    assert_eq!(points, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}

#[test]
fn test_line_steps_one_cell_at_a_time() {
    let points = line(-2, 1, 7, -3);
    assert_eq!(points.first(), Some(&(-2, 1)));
    assert_eq!(points.last(), Some(&(7, -3)));
    for w in points.windows(2) {
        let (dx, dy) = (w[1].0 - w[0].0, w[1].1 - w[0].1);
        assert!(dx.abs() <= 1 && dy.abs() <= 1, "gap between {:?} and {:?}", w[0], w[1]);
    }
}

#[test]
fn test_walk_line_completes() {
    let mut visited = Vec::new();
    let completed = walk_line(0, 0, 3, 0, |x, y| {
        visited.push((x, y));
        true
    });
    assert!(completed);
    assert_eq!(visited, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
}

#[test]
fn test_walk_line_stops_early() {
    let mut count = 0;
    let completed = walk_line(0, 0, 5, 0, |_, _| {
        count += 1;
        count < 3
    });
    assert!(!completed);
    assert_eq!(count, 3);
}

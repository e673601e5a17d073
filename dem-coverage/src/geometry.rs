//! Opérations géométriques: union de la couverture et résidus hors couverture

use geo::{
    BooleanOps, Geometry, GeometryCollection, Intersects, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};

/// Union de polygones (le premier initialise, les suivants sont ajoutés un à un)
pub fn union_all<I>(polygons: I) -> MultiPolygon
where
    I: IntoIterator<Item = Polygon>,
{
    let mut total: Option<MultiPolygon> = None;
    for polygon in polygons {
        let next = MultiPolygon::new(vec![polygon]);
        total = Some(match total {
            Some(acc) => acc.union(&next),
            None => next,
        });
    }
    total.unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Polygones contenus dans une géométrie (les autres types sont ignorés)
pub fn polygons_of(geometry: &Geometry) -> Vec<Polygon> {
    match geometry {
        Geometry::Polygon(p) => vec![p.clone()],
        Geometry::MultiPolygon(mp) => mp.0.clone(),
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(polygons_of).collect(),
        _ => Vec::new(),
    }
}

/// Partie d'une géométrie située hors de la couverture
///
/// - polygones: différence booléenne
/// - lignes: tronçons hors couverture
/// - points: points qui n'intersectent pas la couverture (bord inclus)
pub fn difference(geometry: &Geometry, coverage: &MultiPolygon) -> Geometry {
    match geometry {
        Geometry::Point(p) => Geometry::MultiPoint(outside_points(&[*p], coverage)),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(outside_points(&mp.0, coverage)),
        Geometry::Line(l) => {
            let lines = MultiLineString::new(vec![LineString::from(*l)]);
            Geometry::MultiLineString(coverage.clip(&lines, true))
        }
        Geometry::LineString(ls) => {
            let lines = MultiLineString::new(vec![ls.clone()]);
            Geometry::MultiLineString(coverage.clip(&lines, true))
        }
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(coverage.clip(mls, true)),
        Geometry::Polygon(p) => {
            Geometry::MultiPolygon(MultiPolygon::new(vec![p.clone()]).difference(coverage))
        }
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.difference(coverage)),
        Geometry::Rect(r) => {
            Geometry::MultiPolygon(MultiPolygon::new(vec![r.to_polygon()]).difference(coverage))
        }
        Geometry::Triangle(t) => {
            Geometry::MultiPolygon(MultiPolygon::new(vec![t.to_polygon()]).difference(coverage))
        }
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter()
                .map(|g| difference(g, coverage))
                .filter(|g| !is_empty(g))
                .collect(),
        )),
    }
}

fn outside_points(points: &[Point], coverage: &MultiPolygon) -> MultiPoint {
    MultiPoint::new(
        points
            .iter()
            .filter(|p| !coverage.intersects(*p))
            .copied()
            .collect(),
    )
}

/// Vrai si la géométrie n'a aucune coordonnée
pub fn is_empty(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty),
    }
}

/// Combine plusieurs résidus en une seule géométrie
///
/// Les surfaces sont fusionnées (union), lignes et points concaténés. Un
/// mélange de dimensions donne une GeometryCollection.
pub fn combine(residuals: Vec<Geometry>) -> Geometry {
    let mut polygons = Vec::new();
    let mut lines = Vec::new();
    let mut points = Vec::new();

    for residual in residuals {
        collect_parts(residual, &mut polygons, &mut lines, &mut points);
    }

    let mut parts = Vec::new();
    if !polygons.is_empty() {
        parts.push(Geometry::MultiPolygon(union_all(polygons)));
    }
    if !lines.is_empty() {
        parts.push(Geometry::MultiLineString(MultiLineString::new(lines)));
    }
    if !points.is_empty() {
        parts.push(Geometry::MultiPoint(MultiPoint::new(points)));
    }

    match parts.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => single_form(parts.remove(0)),
        _ => Geometry::GeometryCollection(GeometryCollection(
            parts.into_iter().map(single_form).collect(),
        )),
    }
}

fn collect_parts(
    geometry: Geometry,
    polygons: &mut Vec<Polygon>,
    lines: &mut Vec<LineString>,
    points: &mut Vec<Point>,
) {
    match geometry {
        Geometry::Point(p) => points.push(p),
        Geometry::MultiPoint(mp) => points.extend(mp.0),
        Geometry::Line(l) => lines.push(LineString::from(l)),
        Geometry::LineString(ls) if !ls.0.is_empty() => lines.push(ls),
        Geometry::MultiLineString(mls) => lines.extend(mls.0.into_iter().filter(|ls| !ls.0.is_empty())),
        Geometry::Polygon(p) if !p.exterior().0.is_empty() => polygons.push(p),
        Geometry::MultiPolygon(mp) => polygons.extend(mp.0.into_iter().filter(|p| !p.exterior().0.is_empty())),
        Geometry::Rect(r) => polygons.push(r.to_polygon()),
        Geometry::Triangle(t) => polygons.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in gc.0 {
                collect_parts(g, polygons, lines, points);
            }
        }
        _ => {}
    }
}

/// Une géométrie multiple à un seul membre est rendue sous sa forme simple
pub fn single_form(geometry: Geometry) -> Geometry {
    match geometry {
        Geometry::MultiPolygon(mut mp) if mp.0.len() == 1 => Geometry::Polygon(mp.0.remove(0)),
        Geometry::MultiLineString(mut mls) if mls.0.len() == 1 => {
            Geometry::LineString(mls.0.remove(0))
        }
        Geometry::MultiPoint(mut mp) if mp.0.len() == 1 => Geometry::Point(mp.0.remove(0)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0)]
    }

    #[test]
    fn test_union_all_disjoint() {
        let coverage = union_all(vec![square(0.0, 0.0, 1.0, 1.0), square(2.0, 2.0, 3.0, 3.0)]);
        assert_eq!(coverage.0.len(), 2);
        assert!((coverage.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_all_overlapping() {
        let coverage = union_all(vec![square(0.0, 0.0, 2.0, 1.0), square(1.0, 0.0, 3.0, 1.0)]);
        assert_eq!(coverage.0.len(), 1);
        assert!((coverage.unsigned_area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_all_empty() {
        assert!(union_all(Vec::new()).0.is_empty());
    }

    #[test]
    fn test_contained_polygon_has_empty_residual() {
        let coverage = union_all(vec![square(0.0, 0.0, 1.0, 1.0), square(2.0, 2.0, 3.0, 3.0)]);
        let candidate = Geometry::Polygon(square(0.0, 0.0, 1.0, 1.0));

        assert!(is_empty(&difference(&candidate, &coverage)));
    }

    #[test]
    fn test_half_covered_polygon() {
        let coverage = union_all(vec![square(0.5, 0.0, 1.5, 1.0)]);
        let candidate = Geometry::Polygon(square(0.0, 0.0, 1.0, 1.0));

        let residual = difference(&candidate, &coverage);
        assert!(!is_empty(&residual));
        assert!((residual.unsigned_area() - 0.5).abs() < 1e-9);

        let Geometry::Polygon(left) = single_form(residual) else {
            panic!("Expected a single polygon");
        };
        assert!(left.exterior().coords().all(|c| c.x <= 0.5 + 1e-9));
    }

    #[test]
    fn test_line_difference() {
        let coverage = union_all(vec![square(0.0, 0.0, 1.0, 1.0)]);
        let line = Geometry::LineString(LineString::from(vec![(0.5, 0.5), (2.0, 0.5)]));

        let Geometry::MultiLineString(outside) = difference(&line, &coverage) else {
            panic!("Expected MultiLineString");
        };
        assert_eq!(outside.0.len(), 1);
        assert!(outside.0[0].coords().all(|c| c.x >= 1.0 - 1e-9));
    }

    #[test]
    fn test_point_difference() {
        let coverage = union_all(vec![square(0.0, 0.0, 1.0, 1.0)]);

        let inside = Geometry::Point(Point::new(0.5, 0.5));
        let on_edge = Geometry::Point(Point::new(1.0, 0.5));
        let outside = Geometry::Point(Point::new(5.0, 5.0));

        assert!(is_empty(&difference(&inside, &coverage)));
        assert!(is_empty(&difference(&on_edge, &coverage)));
        assert_eq!(
            single_form(difference(&outside, &coverage)),
            Geometry::Point(Point::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_empty_coverage_keeps_candidate() {
        let coverage = union_all(Vec::new());
        let candidate = Geometry::Polygon(square(0.0, 0.0, 1.0, 1.0));
        let residual = difference(&candidate, &coverage);
        assert!((residual.unsigned_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&Geometry::MultiPolygon(MultiPolygon::new(vec![]))));
        assert!(is_empty(&Geometry::MultiPoint(MultiPoint::new(vec![]))));
        assert!(is_empty(&Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::MultiLineString(MultiLineString::new(vec![]))
        ]))));
        assert!(!is_empty(&Geometry::Point(Point::new(0.0, 0.0))));
    }

    #[test]
    fn test_combine_polygons_are_merged() {
        let combined = combine(vec![
            Geometry::Polygon(square(0.0, 0.0, 2.0, 1.0)),
            Geometry::MultiPolygon(MultiPolygon::new(vec![square(1.0, 0.0, 3.0, 1.0)])),
        ]);
        let Geometry::Polygon(p) = combined else {
            panic!("Expected a single polygon");
        };
        assert!((p.unsigned_area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_combine_mixed_dimensions() {
        let combined = combine(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0, 1.0)),
            Geometry::MultiPoint(MultiPoint::new(vec![Point::new(5.0, 5.0)])),
            Geometry::MultiPolygon(MultiPolygon::new(vec![])),
        ]);
        let Geometry::GeometryCollection(gc) = combined else {
            panic!("Expected GeometryCollection");
        };
        assert_eq!(gc.0.len(), 2);
        assert!(matches!(gc.0[0], Geometry::Polygon(_)));
        assert!(matches!(gc.0[1], Geometry::Point(_)));
    }

    #[test]
    fn test_combine_nothing_is_empty() {
        assert!(is_empty(&combine(vec![Geometry::MultiPolygon(
            MultiPolygon::new(vec![])
        )])));
    }
}

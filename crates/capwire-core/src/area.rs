//! Geographic applicability entities: areas and their shapes.

use std::fmt;

use crate::parameter::Geocode;
use crate::validation::{self, Rule, Validatable};
use crate::version::CapVersion;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Point { lat, lon }
    }
}

impl fmt::Display for Point {
    /// `lat,lon` — the textual form used inside circle and polygon content.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

impl Validatable for Point {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Predicate {
                attribute: "lat",
                check: |p: &Point| (-90.0..=90.0).contains(&p.lat),
                message: "must be between -90 and 90",
            },
            Rule::Predicate {
                attribute: "lon",
                check: |p: &Point| (-180.0..=180.0).contains(&p.lon),
                message: "must be between -180 and 180",
            },
        ]
    }
}

/// A circular area: center point and radius in kilometers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    pub point: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(lat: f64, lon: f64, radius: f64) -> Self {
        Circle {
            point: Point::new(lat, lon),
            radius,
        }
    }
}

impl Validatable for Circle {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Predicate {
                attribute: "radius",
                check: |c: &Circle| c.radius >= 0.0,
                message: "must not be negative",
            },
            Rule::Collection {
                validate: |c: &Circle, version, prefix, out| {
                    validation::validate_into(&c.point, version, &format!("{prefix}point."), out);
                },
            },
        ]
    }
}

/// A polygon given as a closed ring of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, lat: f64, lon: f64) -> &mut Self {
        self.points.push(Point::new(lat, lon));
        self
    }

    /// A ring is closed when it has at least four points and the first and
    /// last coincide.
    pub fn is_closed_ring(&self) -> bool {
        self.points.len() >= 4 && self.points.first() == self.points.last()
    }
}

impl Validatable for Polygon {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Predicate {
                attribute: "points",
                check: Polygon::is_closed_ring,
                message: "must be a closed ring of at least four points",
            },
            Rule::Collection {
                validate: |p: &Polygon, version, prefix, out| {
                    for (i, point) in p.points.iter().enumerate() {
                        validation::validate_into(
                            point,
                            version,
                            &format!("{prefix}points[{i}]."),
                            out,
                        );
                    }
                },
            },
        ]
    }
}

/// The geographic applicability of an Info block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Area {
    pub area_desc: Option<String>,
    /// Floor of the area, in feet above sea level.
    pub altitude: Option<f64>,
    /// Ceiling of the area, in feet above sea level. Only meaningful
    /// together with `altitude`.
    pub ceiling: Option<f64>,
    pub circles: Vec<Circle>,
    pub geocodes: Vec<Geocode>,
    pub polygons: Vec<Polygon>,
}

impl Area {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `build` on a fresh circle, then appends it.
    pub fn add_circle(&mut self, build: impl FnOnce(&mut Circle)) -> &mut Circle {
        let mut circle = Circle::default();
        build(&mut circle);
        self.circles.push(circle);
        self.circles.last_mut().unwrap()
    }

    /// Runs `build` on a fresh geocode, then appends it.
    pub fn add_geocode(&mut self, build: impl FnOnce(&mut Geocode)) -> &mut Geocode {
        let mut geocode = Geocode::default();
        build(&mut geocode);
        self.geocodes.push(geocode);
        self.geocodes.last_mut().unwrap()
    }

    /// Runs `build` on a fresh polygon, then appends it.
    pub fn add_polygon(&mut self, build: impl FnOnce(&mut Polygon)) -> &mut Polygon {
        let mut polygon = Polygon::default();
        build(&mut polygon);
        self.polygons.push(polygon);
        self.polygons.last_mut().unwrap()
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.area_desc.as_deref().unwrap_or_default())
    }
}

impl Validatable for Area {
    fn validation_rules(_version: CapVersion) -> Vec<Rule<Self>> {
        vec![
            Rule::Presence {
                attribute: "area_desc",
                present: |a: &Area| validation::non_blank(&a.area_desc),
            },
            Rule::Dependency {
                attribute: "ceiling",
                present: |a: &Area| a.ceiling.is_some(),
                condition: |a: &Area| a.altitude.is_some(),
                message: "is only allowed when altitude is present",
            },
            Rule::Collection {
                validate: |a: &Area, version, prefix, out| {
                    for (i, circle) in a.circles.iter().enumerate() {
                        validation::validate_into(
                            circle,
                            version,
                            &format!("{prefix}circles[{i}]."),
                            out,
                        );
                    }
                },
            },
            Rule::Collection {
                validate: |a: &Area, version, prefix, out| {
                    for (i, geocode) in a.geocodes.iter().enumerate() {
                        validation::validate_into(
                            geocode,
                            version,
                            &format!("{prefix}geocodes[{i}]."),
                            out,
                        );
                    }
                },
            },
            Rule::Collection {
                validate: |a: &Area, version, prefix, out| {
                    for (i, polygon) in a.polygons.iter().enumerate() {
                        validation::validate_into(
                            polygon,
                            version,
                            &format!("{prefix}polygons[{i}]."),
                            out,
                        );
                    }
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;

    fn cape_town() -> Area {
        let mut area = Area::new();
        area.area_desc = Some("Cape Town CBD".to_string());
        area
    }

    #[test]
    fn test_area_desc_is_required() {
        let result = validate(&Area::new(), CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "area_desc");
    }

    #[test]
    fn test_ceiling_requires_altitude() {
        let mut area = cape_town();
        area.ceiling = Some(1000.0);
        let result = validate(&area, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "ceiling");

        area.altitude = Some(100.0);
        assert!(validate(&area, CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_open_polygon_is_invalid() {
        let mut area = cape_town();
        area.add_polygon(|polygon| {
            polygon.add_point(0.0, 0.0).add_point(0.0, 1.0).add_point(1.0, 1.0);
        });
        let result = validate(&area, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "polygons[0].points");
    }

    #[test]
    fn test_closed_polygon_is_valid() {
        let mut area = cape_town();
        area.add_polygon(|polygon| {
            polygon
                .add_point(0.0, 0.0)
                .add_point(0.0, 1.0)
                .add_point(1.0, 1.0)
                .add_point(0.0, 0.0);
        });
        assert!(validate(&area, CapVersion::V1_2).is_valid());
    }

    #[test]
    fn test_circle_point_range_checks() {
        let mut area = cape_town();
        area.add_circle(|circle| *circle = Circle::new(100.0, 0.0, 5.0));
        let result = validate(&area, CapVersion::V1_2);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].path, "circles[0].point.lat");
    }

    #[test]
    fn test_negative_radius_is_invalid() {
        let mut area = cape_town();
        area.add_circle(|circle| *circle = Circle::new(0.0, 0.0, -1.0));
        let result = validate(&area, CapVersion::V1_2);
        assert_eq!(result.violations[0].path, "circles[0].radius");
    }

    #[test]
    fn test_point_renders_as_comma_pair() {
        assert_eq!(Point::new(-33.9, 18.4).to_string(), "-33.9,18.4");
    }
}

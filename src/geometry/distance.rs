use geo::{Distance, Haversine, Point};

/// Great-circle distance between two (lat, lon) points in meters
///
/// Haversine on a spherical earth is accurate to well under 1% at the
/// distances a city search covers.
pub fn haversine_m(a: (f64, f64), b: (f64, f64)) -> f64 {
    // geo points are (x = lon, y = lat)
    let pa = Point::new(a.1, a.0);
    let pb = Point::new(b.1, b.0);
    Haversine::distance(pa, pb)
}

/// Arithmetic mean of (lat, lon) points
pub fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sum_lat, sum_lon) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), &(lat, lon)| (la + lat, lo + lon));
    Some((sum_lat / n, sum_lon / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let sf = (37.7749, -122.4194);
        assert!(haversine_m(sf, sf).abs() < 0.01);
    }

    #[test]
    fn test_1km_north() {
        // 0.009 degrees latitude ≈ 1 km
        let d = haversine_m((37.7749, -122.4194), (37.7749 + 0.009, -122.4194));
        assert!((d - 1000.0).abs() < 50.0);
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[(37.0, -122.0), (38.0, -121.0)]).unwrap();
        assert!((c.0 - 37.5).abs() < 1e-9);
        assert!((c.1 + 121.5).abs() < 1e-9);
    }
}

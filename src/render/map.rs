use serde_json::{Value, json};
use std::fs;
use std::path::Path;

use crate::domain::{BusinessRecord, ResultSet};
use crate::error::SearchError;
use crate::geometry::{Bounds, centroid};

const LEAFLET_VERSION: &str = "1.9.4";
const DEFAULT_ZOOM: u8 = 11;

/// Build a GeoJSON FeatureCollection with one point per record
pub fn to_geojson(results: &ResultSet) -> Value {
    let features: Vec<Value> = results.iter().map(feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn feature(record: &BusinessRecord) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            // GeoJSON positions are [lon, lat]
            "coordinates": [record.coordinates.lon(), record.coordinates.lat()],
        },
        "properties": {
            "name": record.name,
            "label": record.label(),
            "address": record.address,
            "category": record.category,
            "address_type": record.address_type.as_str(),
            "color": record.address_type.color(),
            "source": record.source.as_str(),
            "search_term": record.search_term,
            "phone": record.phone,
            "website": record.website,
            "link": safe_link(&record.website),
            "rating": record.rating,
            "review_count": record.review_count,
            "price": record.price,
            "distance_m": record.distance_m,
        },
    })
}

/// Render a self-contained Leaflet page showing every record as a marker.
///
/// Markers are colored by address type, tooltips show `name (category)`,
/// and popups list address, rating, phone and website. The view is fitted
/// to the markers, or centered on the search origin when there are none.
pub fn render_html(results: &ResultSet, title: &str) -> String {
    let points: Vec<(f64, f64)> = results
        .iter()
        .map(|r| (r.coordinates.lat(), r.coordinates.lon()))
        .collect();

    let center = centroid(&points)
        .or_else(|| results.origin().map(|o| (o.lat(), o.lon())))
        .unwrap_or((0.0, 0.0));
    let zoom = if points.is_empty() && results.origin().is_none() {
        2
    } else {
        DEFAULT_ZOOM
    };
    let bounds = Bounds::from_points(&points).map(|b| b.to_leaflet());

    let geojson = script_safe(&to_geojson(results).to_string());
    let bounds_js = match bounds {
        Some(b) => script_safe(&json!(b).to_string()),
        None => "null".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="stylesheet" href="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@{leaflet}/dist/leaflet.js"></script>
<style>
  html, body {{ margin: 0; height: 100%; }}
  #map {{ height: 100%; }}
</style>
</head>
<body>
<div id="map"></div>
<script>
const data = {geojson};
const bounds = {bounds_js};
const map = L.map('map').setView([{lat}, {lon}], {zoom});
L.tileLayer('https://{{s}}.basemaps.cartocdn.com/light_all/{{z}}/{{x}}/{{y}}{{r}}.png', {{
  attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
  maxZoom: 19
}}).addTo(map);

function esc(s) {{
  return String(s ?? '').replace(/[&<>"']/g, c => ({{'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}})[c]);
}}

L.geoJSON(data, {{
  pointToLayer: (f, latlng) => L.circleMarker(latlng, {{
    radius: 8, color: '#333', weight: 1, fillColor: f.properties.color, fillOpacity: 0.9
  }}),
  onEachFeature: (f, layer) => {{
    const p = f.properties;
    layer.bindTooltip(esc(p.label));
    const rating = p.rating == null ? 'n/a' : p.rating.toFixed(1) + ' (' + (p.review_count ?? 0) + ' reviews)';
    const site = p.link ? '<a href="' + esc(p.link) + '" target="_blank" rel="noopener">Website</a>' : '';
    layer.bindPopup('<b>' + esc(p.name) + '</b><br>Address: ' + esc(p.address)
      + '<br>Type: ' + esc(p.address_type) + '<br>Rating: ' + rating
      + '<br>Phone: ' + esc(p.phone) + '<br>Source: ' + esc(p.source) + '<br>' + site);
  }}
}}).addTo(map);

if (bounds) {{ map.fitBounds(bounds, {{ padding: [30, 30], maxZoom: 16 }}); }}
</script>
</body>
</html>
"#,
        title = html_escape(title),
        leaflet = LEAFLET_VERSION,
        geojson = geojson,
        bounds_js = bounds_js,
        lat = center.0,
        lon = center.1,
        zoom = zoom,
    )
}

/// Write the HTML map to `path`
pub fn write_map(path: &Path, results: &ResultSet, title: &str) -> Result<(), SearchError> {
    fs::write(path, render_html(results, title)).map_err(|e| SearchError::export(path, e))
}

/// Write the GeoJSON document to `path`
pub fn write_geojson(path: &Path, results: &ResultSet) -> Result<(), SearchError> {
    let body = serde_json::to_string_pretty(&to_geojson(results))
        .map_err(|e| SearchError::export(path, e))?;
    fs::write(path, body).map_err(|e| SearchError::export(path, e))
}

/// Website as a popup link, only for http and https URLs
fn safe_link(website: &str) -> Option<String> {
    let url = reqwest::Url::parse(website.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Keep embedded JSON from closing the surrounding script element
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result_set::fixtures::record;
    use crate::domain::{Coordinates, ProviderKind};

    fn sample() -> ResultSet {
        ResultSet::new(vec![
            record("Sightglass", 37.7770, -122.4085, ProviderKind::Here),
            record("Ritual", 37.7565, -122.4210, ProviderKind::Yelp),
        ])
    }

    #[test]
    fn test_geojson_features() {
        let geojson = to_geojson(&sample());
        let features = geojson["features"].as_array().unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["coordinates"][0], -122.4085);
        assert_eq!(features[0]["geometry"]["coordinates"][1], 37.7770);
        assert_eq!(features[0]["properties"]["label"], "Sightglass (Coffee Shop)");
        assert_eq!(features[1]["properties"]["source"], "Yelp");
        assert_eq!(features[1]["properties"]["color"], "#90EE90");
    }

    #[test]
    fn test_html_embeds_markers_and_bounds() {
        let html = render_html(&sample(), "coffee shop near SF");

        assert!(html.contains("<title>coffee shop near SF</title>"));
        assert!(html.contains("Sightglass (Coffee Shop)"));
        assert!(html.contains("fitBounds"));
        assert!(html.contains("[[37.7565,-122.421],[37.777,-122.4085]]"));
    }

    #[test]
    fn test_html_cannot_break_out_of_script() {
        let set = ResultSet::new(vec![record(
            "</script><script>alert(1)",
            37.7770,
            -122.4085,
            ProviderKind::Here,
        )]);
        let html = render_html(&set, "<b>x</b>");

        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains("<title>&lt;b&gt;x&lt;/b&gt;</title>"));
    }

    #[test]
    fn test_only_web_links_are_clickable() {
        let mut script = record("Sketchy", 37.7770, -122.4085, ProviderKind::Yelp);
        script.website = "javascript:alert(document.cookie)".to_string();
        let mut plain = record("Plain", 37.7565, -122.4210, ProviderKind::Yelp);
        plain.website = "https://sightglass.com/menu".to_string();
        let geojson = to_geojson(&ResultSet::new(vec![script, plain]));

        assert_eq!(geojson["features"][0]["properties"]["link"], Value::Null);
        assert_eq!(geojson["features"][1]["properties"]["link"], "https://sightglass.com/menu");
        assert_eq!(safe_link(" JavaScript:alert(1)"), None);
        assert_eq!(safe_link("data:text/html,<b>x</b>"), None);
        assert_eq!(safe_link("not a url"), None);
    }

    #[test]
    fn test_empty_map_centers_on_origin() {
        let origin = Coordinates::new(42.3314, -83.0458);
        let set = ResultSet::default().with_origin(origin);
        let html = render_html(&set, "empty");

        assert!(html.contains("setView([42.3314, -83.0458], 11)"));
        assert!(html.contains("const bounds = null;"));
    }

    #[test]
    fn test_write_map_and_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let map_path = dir.path().join("map.html");
        let geo_path = dir.path().join("map.geojson");

        write_map(&map_path, &sample(), "sample").unwrap();
        write_geojson(&geo_path, &sample()).unwrap();

        let html = std::fs::read_to_string(&map_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        let geo: Value = serde_json::from_str(&std::fs::read_to_string(&geo_path).unwrap()).unwrap();
        assert_eq!(geo["type"], "FeatureCollection");
    }

    #[test]
    fn test_write_map_to_missing_dir_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("map.html");
        let err = write_map(&path, &sample(), "sample").unwrap_err();
        assert!(matches!(err, SearchError::Export { .. }));
    }
}

//! Third-party map views for the displayed place.
//!
//! Each provider is a [`ProviderDescriptor`]: URL templates with `{placeholder}`
//! fields, filled from a [`MapTarget`]. Providers without a name-based embed, or
//! missing their credential, fall back to OpenStreetMap.

use std::{convert::TryFrom, f64::consts::PI, fmt};

use crate::model::Coordinates;

pub const DEFAULT_ZOOM: u8 = 12;

/// Half-width of the OpenStreetMap embed bounding box, in degrees.
const BBOX_SPAN: f64 = 0.02;

const PLACEHOLDER_MESSAGE: &str = "Search for a city to display the map";

/// What the map is asked to show.
#[derive(Debug, Clone, PartialEq)]
pub struct MapTarget {
    pub city: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapProvider {
    OpenStreetMap,
    Bing,
    Here,
    Google,
    Mapbox,
}

impl MapProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapProvider::OpenStreetMap => "openstreetmap",
            MapProvider::Bing => "bing",
            MapProvider::Here => "here",
            MapProvider::Google => "google",
            MapProvider::Mapbox => "mapbox",
        }
    }

    pub const fn all() -> &'static [MapProvider] {
        &[
            MapProvider::OpenStreetMap,
            MapProvider::Bing,
            MapProvider::Here,
            MapProvider::Google,
            MapProvider::Mapbox,
        ]
    }

    pub fn descriptor(&self) -> &'static ProviderDescriptor {
        match self {
            MapProvider::OpenStreetMap => &OPENSTREETMAP,
            MapProvider::Bing => &BING,
            MapProvider::Here => &HERE,
            MapProvider::Google => &GOOGLE,
            MapProvider::Mapbox => &MAPBOX,
        }
    }
}

impl fmt::Display for MapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MapProvider {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openstreetmap" | "osm" => Ok(MapProvider::OpenStreetMap),
            "bing" => Ok(MapProvider::Bing),
            "here" => Ok(MapProvider::Here),
            "google" => Ok(MapProvider::Google),
            "mapbox" => Ok(MapProvider::Mapbox),
            _ => Err(anyhow::anyhow!(
                "Unknown map provider '{value}'. Supported providers: openstreetmap, bing, here, google, mapbox."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapLayer {
    #[default]
    Standard,
    Satellite,
    Terrain,
}

impl MapLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapLayer::Standard => "standard",
            MapLayer::Satellite => "satellite",
            MapLayer::Terrain => "terrain",
        }
    }

    pub const fn all() -> &'static [MapLayer] {
        &[MapLayer::Standard, MapLayer::Satellite, MapLayer::Terrain]
    }

    fn index(&self) -> usize {
        match self {
            MapLayer::Standard => 0,
            MapLayer::Satellite => 1,
            MapLayer::Terrain => 2,
        }
    }

    /// Slippy-map tile source for this layer.
    pub fn tile_layer(&self) -> &'static TileLayer {
        &TILE_LAYERS[self.index()]
    }
}

impl fmt::Display for MapLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MapLayer {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "standard" | "roadmap" => Ok(MapLayer::Standard),
            "satellite" => Ok(MapLayer::Satellite),
            "terrain" => Ok(MapLayer::Terrain),
            _ => Err(anyhow::anyhow!(
                "Unknown map layer '{value}'. Supported layers: standard, satellite, terrain."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    None,
    GoogleMapsKey,
    MapboxToken,
}

/// URL grammar of one map provider.
#[derive(Debug)]
pub struct ProviderDescriptor {
    pub id: MapProvider,
    pub label: &'static str,
    pub credential: Credential,
    /// Embed is a static image rather than an interactive page.
    pub static_image: bool,
    /// Provider code for standard / satellite / terrain.
    pub layer_codes: [&'static str; 3],
    pub embed_by_coordinates: &'static str,
    pub embed_by_name: Option<&'static str>,
    pub link_by_coordinates: &'static str,
    pub link_by_name: &'static str,
}

static OPENSTREETMAP: ProviderDescriptor = ProviderDescriptor {
    id: MapProvider::OpenStreetMap,
    label: "OpenStreetMap",
    credential: Credential::None,
    static_image: false,
    layer_codes: ["mapnik", "mapnik", "mapnik"],
    embed_by_coordinates: "https://www.openstreetmap.org/export/embed.html?bbox={west},{south},{east},{north}&layer={layer}&marker={lat},{lon}",
    embed_by_name: Some(
        "https://www.openstreetmap.org/export/embed.html?bbox=-180,-90,180,90&layer={layer}&query={query}",
    ),
    link_by_coordinates: "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}&zoom={zoom}",
    link_by_name: "https://www.openstreetmap.org/search?query={query}",
};

static BING: ProviderDescriptor = ProviderDescriptor {
    id: MapProvider::Bing,
    label: "Bing Maps",
    credential: Credential::None,
    static_image: false,
    layer_codes: ["r", "a", "r"],
    embed_by_coordinates: "https://www.bing.com/maps/embed?h=400&w=600&cp={lat}~{lon}&lvl={zoom}&typ={layer}&sty=r&src=SHELL&FORM=MBEDV8",
    embed_by_name: Some(
        "https://www.bing.com/maps/embed?h=400&w=600&q={query}&lvl={zoom}&typ={layer}&sty=r&src=SHELL&FORM=MBEDV8",
    ),
    link_by_coordinates: "https://www.bing.com/maps?cp={lat}~{lon}&lvl={zoom}",
    link_by_name: "https://www.bing.com/maps?q={query}",
};

static HERE: ProviderDescriptor = ProviderDescriptor {
    id: MapProvider::Here,
    label: "HERE WeGo",
    credential: Credential::None,
    static_image: false,
    layer_codes: ["normal", "satellite", "terrain"],
    embed_by_coordinates: "https://wego.here.com/directions/mix/{lat},{lon}:{query}?map={lat},{lon},{zoom},{layer}&fb_locale=en_US",
    embed_by_name: None,
    link_by_coordinates: "https://wego.here.com/directions/mix/{lat},{lon}:{query}",
    link_by_name: "https://www.google.com/maps/search/{query}",
};

static GOOGLE: ProviderDescriptor = ProviderDescriptor {
    id: MapProvider::Google,
    label: "Google Maps",
    credential: Credential::GoogleMapsKey,
    static_image: false,
    layer_codes: ["roadmap", "satellite", "terrain"],
    embed_by_coordinates: "https://www.google.com/maps/embed/v1/view?key={key}&center={lat},{lon}&zoom={zoom}&maptype={layer}",
    embed_by_name: Some(
        "https://www.google.com/maps/embed/v1/place?key={key}&q={query}&zoom={zoom}&maptype={layer}",
    ),
    link_by_coordinates: "https://www.google.com/maps/@{lat},{lon},{zoom}z",
    link_by_name: "https://www.google.com/maps/search/{query}",
};

static MAPBOX: ProviderDescriptor = ProviderDescriptor {
    id: MapProvider::Mapbox,
    label: "Mapbox",
    credential: Credential::MapboxToken,
    static_image: true,
    layer_codes: ["streets-v11", "satellite-v9", "outdoors-v11"],
    embed_by_coordinates: "https://api.mapbox.com/styles/v1/mapbox/{layer}/static/pin-s-l+000({lon},{lat})/{lon},{lat},{zoom}/600x400?access_token={key}",
    embed_by_name: None,
    link_by_coordinates: "https://www.google.com/maps/@{lat},{lon},{zoom}z",
    link_by_name: "https://www.google.com/maps/search/{query}",
};

/// Tile source usable by any slippy-map renderer.
#[derive(Debug)]
pub struct TileLayer {
    /// `{s}` subdomain, `{z}/{x}/{y}` tile address.
    pub url_template: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
    pub subdomains: &'static [&'static str],
}

static TILE_LAYERS: [TileLayer; 3] = [
    TileLayer {
        url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
        attribution: "© OpenStreetMap contributors",
        max_zoom: 19,
        subdomains: &["a", "b", "c"],
    },
    TileLayer {
        url_template: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
        attribution: "© Esri, Maxar, Earthstar Geographics",
        max_zoom: 18,
        subdomains: &[],
    },
    TileLayer {
        url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        attribution: "© OpenTopoMap (CC-BY-SA)",
        max_zoom: 17,
        subdomains: &["a", "b", "c"],
    },
];

impl TileLayer {
    /// URL of the tile containing `coordinates` at `zoom` (clamped to `max_zoom`).
    pub fn tile_url(&self, coordinates: Coordinates, zoom: u8) -> String {
        let zoom = zoom.min(self.max_zoom);
        let (x, y) = tile_index(coordinates, zoom);
        let subdomain = self
            .subdomains
            .get((x + y) as usize % self.subdomains.len().max(1))
            .copied()
            .unwrap_or_default();

        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Web-Mercator tile column and row.
pub fn tile_index(coordinates: Coordinates, zoom: u8) -> (u32, u32) {
    let n = f64::from(1u32 << zoom);
    let lat = coordinates.lat.clamp(-85.0511, 85.0511).to_radians();
    let x = ((coordinates.lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapView {
    /// Interactive page suitable for an iframe or a browser.
    Embed { url: String },
    /// Static rendered image.
    Image { url: String, alt: String },
    Placeholder { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub provider: MapProvider,
    pub layer: MapLayer,
    pub zoom: u8,
    pub google_maps_key: Option<String>,
    pub mapbox_token: Option<String>,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            provider: MapProvider::OpenStreetMap,
            layer: MapLayer::Standard,
            zoom: DEFAULT_ZOOM,
            google_maps_key: None,
            mapbox_token: None,
        }
    }
}

impl MapSettings {
    fn credential(&self, credential: Credential) -> Option<&str> {
        match credential {
            Credential::None => Some(""),
            Credential::GoogleMapsKey => self.google_maps_key.as_deref(),
            Credential::MapboxToken => self.mapbox_token.as_deref(),
        }
    }

    /// Descriptor actually used, after credential fallback.
    pub fn effective_provider(&self) -> &'static ProviderDescriptor {
        let descriptor = self.provider.descriptor();
        if self.credential(descriptor.credential).is_some() {
            descriptor
        } else {
            tracing::warn!(provider = %self.provider, "map provider credential missing, using OpenStreetMap");
            &OPENSTREETMAP
        }
    }

    pub fn view(&self, target: Option<&MapTarget>) -> MapView {
        let Some(target) = target else {
            return MapView::Placeholder {
                message: PLACEHOLDER_MESSAGE.to_string(),
            };
        };

        let descriptor = self.effective_provider();

        let (descriptor, template) = match (target.coordinates, descriptor.embed_by_name) {
            (Some(_), _) => (descriptor, descriptor.embed_by_coordinates),
            (None, Some(by_name)) => (descriptor, by_name),
            (None, None) => (&OPENSTREETMAP, OPENSTREETMAP.embed_by_name.unwrap_or_default()),
        };

        let url = self.render(descriptor, template, target);

        if descriptor.static_image && target.coordinates.is_some() {
            MapView::Image {
                url,
                alt: format!("Map of {}", target.city),
            }
        } else {
            MapView::Embed { url }
        }
    }

    /// Link opening the place in the provider's full site.
    pub fn external_link(&self, target: &MapTarget) -> String {
        let descriptor = self.effective_provider();
        let template = match target.coordinates {
            Some(_) => descriptor.link_by_coordinates,
            None => descriptor.link_by_name,
        };
        self.render(descriptor, template, target)
    }

    fn render(&self, descriptor: &ProviderDescriptor, template: &str, target: &MapTarget) -> String {
        let mut url = template
            .replace("{zoom}", &self.zoom.to_string())
            .replace("{layer}", descriptor.layer_codes[self.layer.index()])
            .replace("{query}", &urlencoding::encode(&target.city))
            .replace("{key}", &urlencoding::encode(self.credential(descriptor.credential).unwrap_or_default()));

        if let Some(c) = target.coordinates {
            url = url
                .replace("{west}", &(c.lon - BBOX_SPAN).to_string())
                .replace("{south}", &(c.lat - BBOX_SPAN).to_string())
                .replace("{east}", &(c.lon + BBOX_SPAN).to_string())
                .replace("{north}", &(c.lat + BBOX_SPAN).to_string())
                .replace("{lat}", &c.lat.to_string())
                .replace("{lon}", &c.lon.to_string());
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> MapTarget {
        MapTarget {
            city: "Paris, FR".into(),
            coordinates: Some(Coordinates::new(48.85, 2.35)),
        }
    }

    fn by_name(city: &str) -> MapTarget {
        MapTarget {
            city: city.into(),
            coordinates: None,
        }
    }

    #[test]
    fn provider_as_str_roundtrip() {
        for id in MapProvider::all() {
            let parsed = MapProvider::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
            assert_eq!(id.descriptor().id, *id);
        }
        for layer in MapLayer::all() {
            assert_eq!(MapLayer::try_from(layer.as_str()).unwrap(), *layer);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = MapProvider::try_from("mapquest").unwrap_err();
        assert!(err.to_string().contains("Unknown map provider"));
    }

    #[test]
    fn no_target_is_placeholder() {
        let view = MapSettings::default().view(None);
        assert_eq!(
            view,
            MapView::Placeholder {
                message: "Search for a city to display the map".into()
            }
        );
    }

    #[test]
    fn openstreetmap_embed_by_coordinates() {
        let view = MapSettings::default().view(Some(&paris()));
        let MapView::Embed { url } = view else {
            panic!("expected embed");
        };

        assert!(url.starts_with("https://www.openstreetmap.org/export/embed.html?bbox="));
        assert!(url.ends_with("&layer=mapnik&marker=48.85,2.35"));
        assert!(!url.contains('{'));
    }

    #[test]
    fn openstreetmap_embed_by_name_is_encoded() {
        let view = MapSettings::default().view(Some(&by_name("São Paulo, BR")));
        assert_eq!(
            view,
            MapView::Embed {
                url: "https://www.openstreetmap.org/export/embed.html?bbox=-180,-90,180,90&layer=mapnik&query=S%C3%A3o%20Paulo%2C%20BR".into()
            }
        );
    }

    #[test]
    fn bing_uses_layer_code() {
        let settings = MapSettings {
            provider: MapProvider::Bing,
            layer: MapLayer::Satellite,
            ..MapSettings::default()
        };

        let MapView::Embed { url } = settings.view(Some(&paris())) else {
            panic!("expected embed");
        };
        assert!(url.contains("cp=48.85~2.35&lvl=12&typ=a"));
    }

    #[test]
    fn here_without_name_embed_falls_back_to_openstreetmap() {
        let settings = MapSettings {
            provider: MapProvider::Here,
            ..MapSettings::default()
        };

        let MapView::Embed { url } = settings.view(Some(&by_name("Oslo"))) else {
            panic!("expected embed");
        };
        assert!(url.starts_with("https://www.openstreetmap.org/export/embed.html"));
        assert!(url.ends_with("query=Oslo"));
    }

    #[test]
    fn google_without_key_falls_back() {
        let settings = MapSettings {
            provider: MapProvider::Google,
            ..MapSettings::default()
        };
        assert_eq!(settings.effective_provider().id, MapProvider::OpenStreetMap);

        let keyed = MapSettings {
            google_maps_key: Some("GKEY".into()),
            ..settings
        };
        let MapView::Embed { url } = keyed.view(Some(&paris())) else {
            panic!("expected embed");
        };
        assert_eq!(
            url,
            "https://www.google.com/maps/embed/v1/view?key=GKEY&center=48.85,2.35&zoom=12&maptype=roadmap"
        );
    }

    #[test]
    fn mapbox_renders_static_image() {
        let settings = MapSettings {
            provider: MapProvider::Mapbox,
            mapbox_token: Some("pk.token".into()),
            ..MapSettings::default()
        };

        match settings.view(Some(&paris())) {
            MapView::Image { url, alt } => {
                assert!(url.contains("/streets-v11/static/pin-s-l+000(2.35,48.85)/2.35,48.85,12/"));
                assert!(url.ends_with("access_token=pk.token"));
                assert_eq!(alt, "Map of Paris, FR");
            }
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn external_links() {
        let settings = MapSettings::default();
        assert_eq!(
            settings.external_link(&paris()),
            "https://www.openstreetmap.org/?mlat=48.85&mlon=2.35&zoom=12"
        );
        assert_eq!(
            settings.external_link(&by_name("New York")),
            "https://www.openstreetmap.org/search?query=New%20York"
        );
    }

    #[test]
    fn tile_index_at_origin_and_paris() {
        assert_eq!(tile_index(Coordinates::new(0.0, 0.0), 1), (1, 1));
        assert_eq!(tile_index(Coordinates::new(48.8566, 2.3522), 12), (2074, 1409));
    }

    #[test]
    fn tile_url_clamps_zoom() {
        let layer = MapLayer::Terrain.tile_layer();
        let url = layer.tile_url(Coordinates::new(0.0, 0.0), 19);
        assert!(url.starts_with("https://"));
        assert!(url.contains(".tile.opentopomap.org/17/"));

        let satellite = MapLayer::Satellite.tile_layer().tile_url(Coordinates::new(0.0, 0.0), 1);
        assert_eq!(
            satellite,
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/1/1/1"
        );
    }
}

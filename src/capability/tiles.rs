use serde::{Deserialize, Serialize};

/// Map style key selectable by the host's layer switcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapTypeKey {
    #[default]
    Standard,
    Satellite,
    Terrain,
}

impl std::fmt::Display for MapTypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapTypeKey::Standard => write!(f, "standard"),
            MapTypeKey::Satellite => write!(f, "satellite"),
            MapTypeKey::Terrain => write!(f, "terrain"),
        }
    }
}

/// Tile layer description handed to the rendering engine
#[derive(Debug, Clone, PartialEq)]
pub struct TileStyle {
    pub url_template: String,
    pub attribution: String,
}

/// Trait representing anything that can resolve a map-type key to a tile style.
pub trait TileStyleSource: Send + Sync {
    fn style(&self, key: MapTypeKey) -> TileStyle;
}

/// Default styles backed by public tile servers.
pub struct DefaultTileStyles;

impl TileStyleSource for DefaultTileStyles {
    fn style(&self, key: MapTypeKey) -> TileStyle {
        match key {
            MapTypeKey::Standard => TileStyle {
                url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "© OpenStreetMap contributors".to_string(),
            },
            MapTypeKey::Satellite => TileStyle {
                url_template:
                    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                        .to_string(),
                attribution: "Tiles © Esri".to_string(),
            },
            MapTypeKey::Terrain => TileStyle {
                url_template: "https://tile.opentopomap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "© OpenStreetMap contributors, SRTM | © OpenTopoMap".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles_differ_per_key() {
        let styles = DefaultTileStyles;
        let standard = styles.style(MapTypeKey::Standard);
        let satellite = styles.style(MapTypeKey::Satellite);
        let terrain = styles.style(MapTypeKey::Terrain);

        assert_ne!(standard.url_template, satellite.url_template);
        assert_ne!(satellite.url_template, terrain.url_template);
        assert!(standard.url_template.contains("{z}"));
    }

    #[test]
    fn test_map_type_key_display() {
        assert_eq!(MapTypeKey::Standard.to_string(), "standard");
        assert_eq!(MapTypeKey::Satellite.to_string(), "satellite");
        assert_eq!(MapTypeKey::Terrain.to_string(), "terrain");
    }
}

//! Great-circle distance and address-to-coordinate resolution.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub const TOKYO_STATION: Self = Self::new(35.6812, 139.7671);

    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Great-circle distance in kilometers between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Resolves an address string to approximate coordinates.
///
/// Resolution is best-effort and never fails: an address that cannot be placed
/// yields the implementation's default point.
pub trait Geocoder: Send + Sync + Debug {
    fn locate(&self, address: &str) -> Coordinates;
}

/// Places every address at one fixed point.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeocoder(pub Coordinates);

impl Geocoder for FixedGeocoder {
    fn locate(&self, _address: &str) -> Coordinates {
        self.0
    }
}

/// Designated cities, checked first so that "大阪市中央区" does not land in Tokyo.
const CITIES: &[(&str, Coordinates)] = &[
    ("札幌市", Coordinates::new(43.0618, 141.3545)),
    ("仙台市", Coordinates::new(38.2682, 140.8694)),
    ("横浜市", Coordinates::new(35.4437, 139.6380)),
    ("川崎市", Coordinates::new(35.5308, 139.7029)),
    ("名古屋市", Coordinates::new(35.1815, 136.9066)),
    ("京都市", Coordinates::new(35.0116, 135.7681)),
    ("大阪市", Coordinates::new(34.6937, 135.5023)),
    ("神戸市", Coordinates::new(34.6901, 135.1955)),
    ("広島市", Coordinates::new(34.3853, 132.4553)),
    ("福岡市", Coordinates::new(33.5904, 130.4017)),
    ("さいたま市", Coordinates::new(35.8617, 139.6455)),
    ("千葉市", Coordinates::new(35.6074, 140.1065)),
    ("相模原市", Coordinates::new(35.5714, 139.3733)),
    ("新潟市", Coordinates::new(37.9162, 139.0364)),
    ("静岡市", Coordinates::new(34.9756, 138.3828)),
    ("浜松市", Coordinates::new(34.7108, 137.7261)),
    ("堺市", Coordinates::new(34.5733, 135.4828)),
    ("岡山市", Coordinates::new(34.6551, 133.9195)),
    ("北九州市", Coordinates::new(33.8834, 130.8752)),
    ("熊本市", Coordinates::new(32.8031, 130.7079)),
];

/// Tokyo's 23 special wards. Only consulted through [`tokyo_ward`].
const TOKYO_WARDS: &[(&str, Coordinates)] = &[
    ("千代田区", Coordinates::new(35.6940, 139.7536)),
    ("中央区", Coordinates::new(35.6707, 139.7720)),
    ("港区", Coordinates::new(35.6581, 139.7516)),
    ("新宿区", Coordinates::new(35.6938, 139.7036)),
    ("文京区", Coordinates::new(35.7081, 139.7522)),
    ("台東区", Coordinates::new(35.7126, 139.7800)),
    ("墨田区", Coordinates::new(35.7107, 139.8015)),
    ("江東区", Coordinates::new(35.6730, 139.8170)),
    ("品川区", Coordinates::new(35.6092, 139.7302)),
    ("目黒区", Coordinates::new(35.6415, 139.6982)),
    ("大田区", Coordinates::new(35.5613, 139.7160)),
    ("世田谷区", Coordinates::new(35.6464, 139.6532)),
    ("渋谷区", Coordinates::new(35.6640, 139.6982)),
    ("中野区", Coordinates::new(35.7074, 139.6638)),
    ("杉並区", Coordinates::new(35.6995, 139.6364)),
    ("豊島区", Coordinates::new(35.7263, 139.7166)),
    ("北区", Coordinates::new(35.7528, 139.7335)),
    ("荒川区", Coordinates::new(35.7361, 139.7834)),
    ("板橋区", Coordinates::new(35.7512, 139.7093)),
    ("練馬区", Coordinates::new(35.7356, 139.6517)),
    ("足立区", Coordinates::new(35.7750, 139.8044)),
    ("葛飾区", Coordinates::new(35.7434, 139.8473)),
    ("江戸川区", Coordinates::new(35.7067, 139.8683)),
];

/// A Tokyo ward named in `address`, unless a city or another prefecture precedes
/// it. "埼玉県川口市北区" is not Tokyo's 北区; "東京都北区" and a bare "北区王子" are.
fn tokyo_ward(address: &str) -> Option<Coordinates> {
    TOKYO_WARDS.iter().find_map(|(name, coords)| {
        let at = address.find(*name)?;
        let prefix = &address[..at];
        (!prefix.contains(['市', '県', '府', '道'])).then_some(*coords)
    })
}

/// Prefecture capitals, the coarsest level before the default.
const PREFECTURES: &[(&str, Coordinates)] = &[
    ("東京都", Coordinates::new(35.6895, 139.6917)),
    ("北海道", Coordinates::new(43.0642, 141.3469)),
    ("大阪府", Coordinates::new(34.6863, 135.5200)),
    ("京都府", Coordinates::new(35.0214, 135.7556)),
    ("神奈川県", Coordinates::new(35.4478, 139.6425)),
    ("埼玉県", Coordinates::new(35.8569, 139.6489)),
    ("千葉県", Coordinates::new(35.6047, 140.1233)),
    ("愛知県", Coordinates::new(35.1802, 136.9066)),
    ("兵庫県", Coordinates::new(34.6913, 135.1830)),
    ("福岡県", Coordinates::new(33.6064, 130.4181)),
];

/// Table-driven geocoder for Japanese addresses.
///
/// Matches designated cities, then Tokyo wards not preceded by some other city
/// or prefecture, then prefectures by substring,
/// falling back to a default point. Accuracy is at the ward level at best.
#[derive(Debug, Clone, Copy)]
pub struct WardGeocoder {
    fallback: Coordinates,
}

impl WardGeocoder {
    pub const fn new(fallback: Coordinates) -> Self {
        Self { fallback }
    }
}

impl Default for WardGeocoder {
    fn default() -> Self {
        Self::new(Coordinates::TOKYO_STATION)
    }
}

impl Geocoder for WardGeocoder {
    fn locate(&self, address: &str) -> Coordinates {
        let in_table = |table: &[(&str, Coordinates)]| {
            table
                .iter()
                .find(|(name, _)| address.contains(*name))
                .map(|(_, coords)| *coords)
        };
        let found = in_table(CITIES)
            .or_else(|| tokyo_ward(address))
            .or_else(|| in_table(PREFECTURES));

        found.unwrap_or_else(|| {
            tracing::warn!("Could not place address '{}', using fallback", address);
            self.fallback
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    const SHIBUYA: Coordinates = Coordinates::new(35.6640, 139.6982);
    const OSAKA: Coordinates = Coordinates::new(34.6937, 135.5023);

    #[rstest]
    #[case(Coordinates::TOKYO_STATION)]
    #[case(Coordinates::new(0.0, 0.0))]
    #[case(Coordinates::new(-33.8688, 151.2093))]
    fn test_distance_to_self_is_zero(#[case] point: Coordinates) {
        check!(haversine_km(point, point) == 0.0);
    }

    #[rstest]
    #[case(SHIBUYA, OSAKA)]
    #[case(Coordinates::TOKYO_STATION, Coordinates::new(43.0618, 141.3545))]
    #[case(Coordinates::new(10.0, -170.0), Coordinates::new(-10.0, 170.0))]
    fn test_distance_is_symmetric(#[case] a: Coordinates, #[case] b: Coordinates) {
        check!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // Tokyo to Osaka is roughly 400 km as the crow flies
        let d = haversine_km(Coordinates::TOKYO_STATION, OSAKA);
        check!(d > 390.0);
        check!(d < 410.0);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        check!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_antipodal_points() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        check!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[rstest]
    #[case("東京都渋谷区神宮前1-2-3", SHIBUYA)]
    #[case("大阪府大阪市中央区難波5-1", OSAKA)]
    #[case("東京都中央区銀座4-5-6", Coordinates::new(35.6707, 139.7720))]
    #[case("神奈川県横浜市港北区", Coordinates::new(35.4437, 139.6380))]
    #[case("千葉県船橋市", Coordinates::new(35.6047, 140.1233))]
    fn test_ward_geocoder(#[case] address: &str, #[case] expected: Coordinates) {
        check!(WardGeocoder::default().locate(address) == expected);
    }

    #[rstest]
    #[case("埼玉県さいたま市北区宮原町1-1", Coordinates::new(35.8617, 139.6455))]
    #[case("新潟県新潟市北区葛塚1-1", Coordinates::new(37.9162, 139.0364))]
    #[case("福岡県北九州市小倉北区", Coordinates::new(33.8834, 130.8752))]
    #[case("埼玉県川口市北区1-1", Coordinates::new(35.8569, 139.6489))]
    #[case("東京都北区王子1-1", Coordinates::new(35.7528, 139.7335))]
    #[case("北区王子1-1", Coordinates::new(35.7528, 139.7335))]
    #[case("〒162-0845 東京都新宿区市谷本村町5-1", Coordinates::new(35.6938, 139.7036))]
    fn test_wards_outside_tokyo_are_not_tokyo(#[case] address: &str, #[case] expected: Coordinates) {
        check!(WardGeocoder::default().locate(address) == expected);
    }

    #[test]
    fn test_ward_geocoder_fallback() {
        let fallback = Coordinates::new(1.0, 2.0);
        check!(WardGeocoder::new(fallback).locate("unknown street") == fallback);
        check!(WardGeocoder::new(fallback).locate("") == fallback);
    }

    #[test]
    fn test_fixed_geocoder() {
        let geocoder = FixedGeocoder(SHIBUYA);
        check!(geocoder.locate("大阪府") == SHIBUYA);
    }
}

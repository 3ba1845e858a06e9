pub mod bearing;
pub mod coordinate;
pub mod places;

pub use bearing::{bearing_and_distance, elevation_degrees, wrap_360};
pub use coordinate::GeoCoordinate;
pub use places::{
    LoadedPlaces, PlaceRecord, PlaceSummary, PointOfInterest, load_places, parse_places,
    rank_by_distance,
};

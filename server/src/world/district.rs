// sprawl_world/server/src/world/district.rs
use crate::core::constants::*;
use crate::core::types::{ChunkCoord, DistrictType};
use std::f64::consts::{FRAC_PI_2, PI};

/// Maps a chunk coordinate to its district. Pure function of the coordinate.
///
/// Rings around the origin: corporate core, residential belt, a mixed belt split into
/// industrial/residential quadrants, an outer belt with scattered underground districts,
/// and wasteland beyond.
pub fn classify(coord: ChunkCoord) -> DistrictType {
    let x = coord.x as f64;
    let y = coord.y as f64;
    let distance = (x * x + y * y).sqrt();

    if distance < CORPORATE_RING_RADIUS {
        DistrictType::Corporate
    } else if distance < RESIDENTIAL_RING_RADIUS {
        DistrictType::Residential
    } else if distance < MIXED_RING_RADIUS {
        if quadrant(x, y) % 2 == 0 {
            DistrictType::Industrial
        } else {
            DistrictType::Residential
        }
    } else if distance < UNDERGROUND_RING_RADIUS && (coord.x as i64 + coord.y as i64).rem_euclid(3) == 0 {
        DistrictType::Underground
    } else {
        DistrictType::Wasteland
    }
}

/// Angular sector 0..=3, counted from the negative x axis.
fn quadrant(x: f64, y: f64) -> u8 {
    let angle = y.atan2(x) + PI;
    ((angle / FRAC_PI_2).floor() as u8).min(3)
}

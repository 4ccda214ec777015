/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! mapping of raster spatial reference systems into WPS geogrid projection vocabulary

use std::{collections::HashMap, fmt};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use gdal::spatial_ref::SpatialRef;
use tracing::warn;

use crate::errors::Result;

/// PROJ definition of the geographic reference system used for bounding boxes
pub const WGS84_LON_LAT_PROJ4: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// the projection names understood by the WPS geogrid index
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all="snake_case")]
pub enum WpsProjection {
    Lambert,
    Polar,
    Mercator,
    RegularLl,
    AlbersNad83,
    PolarWgs84,
}

impl WpsProjection {
    pub fn as_str (&self) -> &'static str {
        match *self {
            WpsProjection::Lambert => "lambert",
            WpsProjection::Polar => "polar",
            WpsProjection::Mercator => "mercator",
            WpsProjection::RegularLl => "regular_ll",
            WpsProjection::AlbersNad83 => "albers_nad83",
            WpsProjection::PolarWgs84 => "polar_wgs84",
        }
    }
}

impl fmt::Display for WpsProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str( self.as_str())
    }
}

lazy_static! {
    static ref PROJ_RE: Regex = Regex::new(r"\+proj=(\w+)").unwrap();

    // PROJ family name -> WPS projection. Polar stereographic on a WGS84 ellipsoid is refined
    // into PolarWgs84 by resolve_proj4()
    static ref WPS_PROJECTIONS: HashMap<&'static str, WpsProjection> = HashMap::from( [
        ("lcc", WpsProjection::Lambert),
        ("stere", WpsProjection::Polar),
        ("merc", WpsProjection::Mercator),
        ("latlong", WpsProjection::RegularLl),
        ("longlat", WpsProjection::RegularLl),
        ("aea", WpsProjection::AlbersNad83),
    ]);
}

// PROJ terms that define datum and ellipsoid (everything we need to keep for a lon/lat system of the same datum)
const DATUM_TERMS: &[&str] = &[ "+datum=", "+ellps=", "+a=", "+b=", "+rf=", "+f=", "+R=", "+towgs84=", "+nadgrids=", "+pm=" ];

/// the projection family ("+proj=<family>") of a PROJ definition
pub fn proj_family (proj4: &str) -> Option<&str> {
    PROJ_RE.captures( proj4).and_then( |caps| caps.get(1)).map( |m| m.as_str())
}

pub fn is_wgs84_based (proj4: &str) -> bool {
    proj4.split_whitespace().any( |t| t == "+datum=WGS84" || t == "+ellps=WGS84")
}

/// result of mapping a spatial reference to a WPS projection
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct ResolvedProjection {
    pub projection: WpsProjection,

    /// set if the native projection has no WPS counterpart. Since we don't reproject data the geogrid
    /// output of such rasters is geometrically incorrect and clients have to check this flag
    pub needs_reprojection: bool,
}

/// resolve a PROJ definition into a WPS projection, falling back to `lambert` for unknown projection families
///
/// Polar stereographic is only reported as `polar_wgs84` if the datum or ellipsoid is WGS84, other
/// `stere` definitions (e.g. spheres) resolve to `polar`. This intentionally differs from tools that map
/// every `stere` definition to `polar_wgs84`
pub fn resolve_proj4 (proj4: &str) -> ResolvedProjection {
    let family = proj_family( proj4);

    match family.and_then( |f| WPS_PROJECTIONS.get(f)) {
        Some(WpsProjection::Polar) if is_wgs84_based( proj4) => {
            ResolvedProjection { projection: WpsProjection::PolarWgs84, needs_reprojection: false }
        }
        Some(projection) => {
            ResolvedProjection { projection: *projection, needs_reprojection: false }
        }
        None => {
            warn!("no WPS projection for '{}', using lambert. Reprojection is not implemented, output geometry will be incorrect",
                  family.unwrap_or("?"));
            ResolvedProjection { projection: WpsProjection::Lambert, needs_reprojection: true }
        }
    }
}

pub fn resolve_projection (srs: &SpatialRef) -> Result<ResolvedProjection> {
    let proj4 = srs.to_proj4()?;
    Ok( resolve_proj4( &proj4) )
}

/// the PROJ definition of a lon/lat system that uses the same datum as the provided definition
pub fn lon_lat_proj4 (proj4: &str) -> String {
    let datum: Vec<&str> = proj4.split_whitespace()
        .filter( |t| DATUM_TERMS.iter().any( |p| t.starts_with(p)))
        .collect();

    if datum.is_empty() {
        WGS84_LON_LAT_PROJ4.to_string()
    } else {
        format!("+proj=longlat {} +no_defs", datum.join(" "))
    }
}

/* #region SpatialRefs used for point transformations ***********************************************************/

// we construct all SpatialRefs from PROJ definitions, which always use easting/northing (lon/lat) axis order.
// This avoids the authority-compliant lat/lon axis order GDAL would use for EPSG:4326

pub fn srs_wgs84_lon_lat () -> Result<SpatialRef> {
    Ok( SpatialRef::from_proj4( WGS84_LON_LAT_PROJ4)? )
}

pub fn srs_from_proj4 (proj4: &str) -> Result<SpatialRef> {
    Ok( SpatialRef::from_proj4( proj4)? )
}

pub fn srs_lon_lat_of (proj4: &str) -> Result<SpatialRef> {
    Ok( SpatialRef::from_proj4( &lon_lat_proj4(proj4))? )
}

/* #endregion SpatialRefs */

/// projection parameters WPS needs for its index file
#[derive(Debug,Clone,Copy,PartialEq,Default,Serialize,Deserialize)]
pub struct CrsParams {
    pub truelat1: f64,
    pub truelat2: f64,
    pub stdlon: f64,
}

impl CrsParams {
    /// missing parameters are reported as 0.0
    pub fn from_srs (srs: &SpatialRef) -> Result<CrsParams> {
        let truelat1 = srs.get_proj_param("standard_parallel_1")?.unwrap_or(0.0);
        let truelat2 = srs.get_proj_param("standard_parallel_2")?.unwrap_or(0.0);
        let stdlon = reference_longitude(
            srs.get_proj_param("longitude_of_center")?,
            srs.get_proj_param("central_meridian")?,
            srs.get_proj_param("longitude_of_origin")?
        );

        Ok( CrsParams { truelat1, truelat2, stdlon } )
    }
}

/// first available of longitude of center, central meridian and longitude of origin
pub fn reference_longitude (lon_center: Option<f64>, central_meridian: Option<f64>, lon_origin: Option<f64>) -> f64 {
    lon_center.or(central_meridian).or(lon_origin).unwrap_or(0.0)
}

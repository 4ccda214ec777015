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

//! geolocation of a grid in the form WPS expects in geogrid index files

use std::fmt;
use serde::{Deserialize, Serialize};
use gdal::{GeoTransformEx, spatial_ref::CoordTransform};
use tracing::info;

use crate::{
    coord_to_string, transform_point_2d,
    errors::Result,
    grid::GridGeometry,
    projection::{srs_from_proj4, srs_lon_lat_of, CrsParams, WpsProjection},
};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all="snake_case")]
pub enum RowOrder {
    BottomTop,
    TopBottom,
}

impl RowOrder {
    pub fn for_dy (dy: f64) -> RowOrder {
        if dy > 0.0 { RowOrder::BottomTop } else { RowOrder::TopBottom }
    }

    pub fn as_str (&self) -> &'static str {
        match *self {
            RowOrder::BottomTop => "bottom_top",
            RowOrder::TopBottom => "top_bottom",
        }
    }
}

impl fmt::Display for RowOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str( self.as_str())
    }
}

/// the geolocation record of a geogrid variable
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct IndexRecord {
    pub projection: WpsProjection,
    pub dx: f64,
    pub dy: f64,
    pub truelat1: f64,
    pub truelat2: f64,
    pub stdlon: f64,
    /// 1-based column of the known point on the mass-staggered grid
    pub known_x: f64,
    /// 1-based row of the known point on the mass-staggered grid
    pub known_y: f64,
    pub known_lon: f64,
    pub known_lat: f64,
    pub row_order: RowOrder,
}

/// renders the record as `key = value` lines of a WPS index file
impl fmt::Display for IndexRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "projection = {}", self.projection)?;
        writeln!(f, "dx = {}", self.dx)?;
        writeln!(f, "dy = {}", self.dy)?;
        writeln!(f, "truelat1 = {}", self.truelat1)?;
        writeln!(f, "truelat2 = {}", self.truelat2)?;
        writeln!(f, "stdlon = {}", self.stdlon)?;
        writeln!(f, "known_x = {}", self.known_x)?;
        writeln!(f, "known_y = {}", self.known_y)?;
        writeln!(f, "known_lon = {}", self.known_lon)?;
        writeln!(f, "known_lat = {}", self.known_lat)?;
        writeln!(f, "row_order = {}", self.row_order)
    }
}

/// the known point of a grid: its center cell in 1-based mass-staggered indices and its projected position
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct KnownPoint {
    pub known_x: f64,
    pub known_y: f64,
    pub x: f64,
    pub y: f64,
}

pub fn known_point (geometry: &GridGeometry) -> KnownPoint {
    let known_x = (geometry.nx + 1) as f64 / 2.0;
    let known_y = (geometry.ny + 1) as f64 / 2.0;

    // unstaggered grid starts at 0 in the cell corner
    let (x,y) = geometry.gt.apply( known_x - 0.5, known_y - 0.5);

    KnownPoint { known_x, known_y, x, y }
}

/// build the index record for the current grid geometry. `proj4` is the PROJ definition of the grid
/// spatial reference, the known point is converted into lon/lat of the same datum
pub fn build_index (geometry: &GridGeometry, projection: WpsProjection, params: &CrsParams, proj4: &str) -> Result<IndexRecord> {
    let kp = known_point( geometry);

    let transform = CoordTransform::new( &srs_from_proj4( proj4)?, &srs_lon_lat_of( proj4)?)?;
    let (known_lon, known_lat) = transform_point_2d( &transform, kp.x, kp.y)?;
    info!("center lon/lat coordinates: {}", coord_to_string( known_lon, known_lat));

    Ok( IndexRecord {
        projection,
        dx: geometry.dx(),
        dy: geometry.dy(),
        truelat1: params.truelat1,
        truelat2: params.truelat2,
        stdlon: params.stdlon,
        known_x: kp.known_x,
        known_y: kp.known_y,
        known_lon,
        known_lat,
        row_order: RowOrder::for_dy( geometry.dy())
    })
}

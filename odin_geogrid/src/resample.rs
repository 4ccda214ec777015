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

//! cropping of rasters to geographic (lon/lat) bounding boxes.
//!
//! The bounding box corners are transformed into the native projection of the raster, then we look for the
//! smallest index window of grid coordinates inside the projected box. This works for both increasing and
//! decreasing coordinate axes (e.g. north-up and south-up rasters)

use std::{fmt, str::FromStr};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use tracing::debug;

use crate::{
    coord_to_string, transform_point_2d,
    errors::{Result, bounds_error, geometry_error},
    grid::{build_grid, CoordinateGrid, GridGeometry, IndexWindow},
    projection::srs_wgs84_lon_lat,
};

/// WGS84 bounding box in decimal degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct LonLatBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl LonLatBox {
    pub fn new (lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        LonLatBox { lon_min, lon_max, lat_min, lat_max }
    }
}

/// parse from "lon_min,lon_max,lat_min,lat_max"
impl FromStr for LonLatBox {
    type Err = String;

    fn from_str (s: &str) -> std::result::Result<Self,Self::Err> {
        let vs: Vec<f64> = s.split(',')
            .map( |v| v.trim().parse::<f64>().map_err( |e| format!("invalid bounding box value '{v}': {e}")))
            .collect::<std::result::Result<Vec<f64>,String>>()?;

        if let [lon_min, lon_max, lat_min, lat_max] = vs[..] {
            Ok( LonLatBox { lon_min, lon_max, lat_min, lat_max } )
        } else {
            Err( format!("bounding box needs 4 values (lon_min,lon_max,lat_min,lat_max), got {}", vs.len()))
        }
    }
}

impl fmt::Display for LonLatBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", coord_to_string( self.lon_min, self.lat_min), coord_to_string( self.lon_max, self.lat_max))
    }
}

/// bounding box in native raster coordinates
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct ProjectedBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

/// transform the (lon_min,lat_min) and (lon_max,lat_max) corners into the provided native SpatialRef.
/// The transformation object only lives for this call
pub fn project_bbox (bbox: &LonLatBox, native_srs: &SpatialRef) -> Result<ProjectedBox> {
    let transform = CoordTransform::new( &srs_wgs84_lon_lat()?, native_srs)?;

    let (x_min,y_min) = transform_point_2d( &transform, bbox.lon_min, bbox.lat_min)?;
    let (x_max,y_max) = transform_point_2d( &transform, bbox.lon_max, bbox.lat_max)?;

    Ok( ProjectedBox { x_min, y_min, x_max, y_max } )
}

/// get the first and last index of axis coordinates that are within [lo,hi].
/// For increasing axes (spacing > 0) the range starts with the first coordinate >= lo, for decreasing axes with the
/// first coordinate <= hi. Returns None if there are no such coordinates
pub fn axis_window (coords: ArrayView1<f64>, spacing: f64, lo: f64, hi: f64) -> Option<(usize,usize)> {
    let above_lo = |(i,v): (usize,&f64)| if lo <= *v { Some(i) } else { None };
    let below_hi = |(i,v): (usize,&f64)| if *v <= hi { Some(i) } else { None };

    let (first, last) = if spacing > 0.0 {
        ( coords.iter().enumerate().filter_map( &above_lo).min()?,
          coords.iter().enumerate().filter_map( &below_hi).max()? )
    } else {
        ( coords.iter().enumerate().filter_map( &below_hi).min()?,
          coords.iter().enumerate().filter_map( &above_lo).max()? )
    };

    if first <= last { Some((first,last)) } else { None }
}

/// find the index window of the coordinate grid that is inside the projected box.
/// Columns are searched on the first grid row, rows on the first grid column
pub fn find_window (grid: &CoordinateGrid, dx: f64, dy: f64, pbox: &ProjectedBox) -> Result<IndexWindow> {
    let (col_first, col_last) = axis_window( grid.x_axis(), dx, pbox.x_min, pbox.x_max)
        .ok_or_else( || bounds_error( format!("no grid columns within x range [{}, {}]", pbox.x_min, pbox.x_max)))?;

    let (row_first, row_last) = axis_window( grid.y_axis(), dy, pbox.y_min, pbox.y_max)
        .ok_or_else( || bounds_error( format!("no grid rows within y range [{}, {}]", pbox.y_min, pbox.y_max)))?;

    Ok( IndexWindow::new( row_first, row_last + 1, col_first, col_last + 1) )
}

/// the result of a bounding box crop: the window into the source grid and the geometry of the cropped grid
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Crop {
    pub window: IndexWindow,
    pub geometry: GridGeometry,
}

/// compute the crop of a source grid for a projected box. The cropped geometry has the coordinate of the
/// first window cell as origin and keeps the source spacing
pub fn crop_projected (source: &GridGeometry, pbox: &ProjectedBox) -> Result<Crop> {
    if !source.is_axis_aligned() {
        return Err( geometry_error( format!("cannot crop rotated grid {:?}", source.gt)))
    }

    let grid = build_grid( &source.gt, source.nx, source.ny);
    let window = find_window( &grid, source.dx(), source.dy(), pbox)?;
    let geometry = source.cropped( &window)?;
    debug!("crop window {window} -> origin ({},{}), size {}x{}", geometry.x0(), geometry.y0(), geometry.nx, geometry.ny);

    Ok( Crop { window, geometry } )
}

pub fn crop_bbox (source: &GridGeometry, native_srs: &SpatialRef, bbox: &LonLatBox) -> Result<Crop> {
    let pbox = project_bbox( bbox, native_srs)?;
    debug!("bounding box {bbox} -> x: [{}, {}], y: [{}, {}]", pbox.x_min, pbox.x_max, pbox.y_min, pbox.y_max);
    crop_projected( source, &pbox)
}

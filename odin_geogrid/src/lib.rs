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

//! odin_geogrid turns georeferenced rasters (e.g. GeoTIFFs) into input for the WPS geogrid preprocessor.
//!
//! The main abstraction is [`GeoRaster`], which wraps a GDAL dataset, maps its spatial reference system into the
//! WPS projection vocabulary, optionally crops it to a lon/lat bounding box and exports the result as GeoTIFF or
//! through a [`GeogridWriter`]. Note that we do not reproject. Rasters with projections that have no WPS
//! counterpart report [`GeoRaster::needs_reprojection`] and should not be used for geogrid output.

pub mod errors;
pub mod grid;
pub mod projection;
pub mod resample;
pub mod index;
pub mod geogrid;
pub mod raster;
pub mod config;

use static_init::constructor;
use gdal::errors::CplErrType;
use tracing::{debug, warn};

// we re-export these so that other crates don't have to use a direct gdal depedency to import.
pub use gdal::{self, Dataset, DriverManager, GeoTransform, GeoTransformEx, errors::GdalError};
pub use gdal::spatial_ref::{CoordTransform, SpatialRef};

pub use errors::{OdinGeogridError, Result};
pub use grid::{build_grid, new_geotransform, CoordinateGrid, GridGeometry, IndexWindow};
pub use projection::{resolve_projection, CrsParams, ResolvedProjection, WpsProjection};
pub use resample::LonLatBox;
pub use index::{IndexRecord, RowOrder};
pub use geogrid::{GeogridWriter, write_index_file};
pub use raster::GeoRaster;
pub use config::{load_config, GeogridJob, GeogridJobs};

#[constructor(0)]
extern "C" fn _initialize_gdal() {
    gdal::config::set_error_handler(log_gdal_error);
}

// GDAL would otherwise print to stderr
fn log_gdal_error (cpl_et: CplErrType, ec: i32, msg: &str) {
    match cpl_et {
        CplErrType::Failure | CplErrType::Fatal => warn!("GDAL error {ec}: {msg}"),
        _ => debug!("GDAL {cpl_et:?} {ec}: {msg}")
    }
}

pub fn transform_point_2d (transform: &CoordTransform, x: f64, y: f64) -> Result<(f64,f64)> {
    let mut ax: [f64;1] = [x];
    let mut ay: [f64;1] = [y];
    let mut az: [f64;0] = [];

    transform.transform_coords(&mut ax, &mut ay, &mut az)?;
    Ok((ax[0],ay[0]))
}

/// human readable lon/lat position, e.g. "120.500000°W 42.500000°N". Only used for diagnostics
pub fn coord_to_string (lon: f64, lat: f64) -> String {
    let ew = if lon < 0.0 { 'W' } else { 'E' };
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    format!("{:.6}°{} {:.6}°{}", lon.abs(), ew, lat.abs(), ns)
}

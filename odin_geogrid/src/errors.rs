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

use std::path::Path;
use thiserror::Error;
use gdal::errors::GdalError;

pub type Result<T> = std::result::Result<T, OdinGeogridError>;

#[derive(Error,Debug)]
pub enum OdinGeogridError {

    /// the provided dataset can't be wrapped into a GeoRaster
    #[error("GeoRaster construction failed: {0}")]
    ConstructionError(String),

    #[error("failed to open raster {path}: {cause}")]
    OpenError { path: String, cause: String },

    /// requested bounding box does not intersect the raster extent
    #[error("bounding box out of raster bounds: {0}")]
    BoundsError(String),

    /// degenerate, rotated or otherwise unusable grid geometry
    #[error("invalid grid geometry: {0}")]
    GeometryError(String),

    #[error("GeoRaster already closed")]
    ClosedError,

    #[error("config error: {0}")]
    ConfigError(String),

    // pass through for errors reported by the GDAL binding
    #[error("GDAL error: {0}")]
    GdalError( #[from] GdalError),

    #[error("array shape error: {0}")]
    ArrayShapeError( #[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    IOError( #[from] std::io::Error),
}

pub fn construction_error (msg: impl ToString)->OdinGeogridError {
    OdinGeogridError::ConstructionError( format!("{} (use GeoRaster::from_file or GeoRaster::from_elements)", msg.to_string()))
}

pub fn open_error (path: impl AsRef<Path>, cause: impl ToString)->OdinGeogridError {
    OdinGeogridError::OpenError { path: path.as_ref().display().to_string(), cause: cause.to_string() }
}

pub fn bounds_error (msg: impl ToString)->OdinGeogridError {
    OdinGeogridError::BoundsError(msg.to_string())
}

pub fn geometry_error (msg: impl ToString)->OdinGeogridError {
    OdinGeogridError::GeometryError(msg.to_string())
}

pub fn config_error (msg: impl ToString)->OdinGeogridError {
    OdinGeogridError::ConfigError(msg.to_string())
}

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

//! RON configured conversion jobs, e.g.
//! ```ron
//! GeogridJobs(
//!     jobs: [
//!         GeogridJob(
//!             input: "fuel.tif",
//!             bbox: Some(LonLatBox( lon_min: -122.5, lon_max: -121.0, lat_min: 37.0, lat_max: 38.2 )),
//!             geotiff: Some("fuel_cropped.tif"),
//!             index: Some("index"),
//!         ),
//!     ]
//! )
//! ```

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::{
    errors::{Result, config_error},
    geogrid::write_index_file,
    raster::GeoRaster,
    resample::LonLatBox,
};

/// load a RON config file
pub fn load_config<C> (path: impl AsRef<Path>) -> Result<C> where C: DeserializeOwned {
    let path = path.as_ref();
    let data = std::fs::read( path).map_err( |e| config_error( format!("failed to read {:?}: {e}", path)))?;
    ron::de::from_bytes( data.as_slice()).map_err( |e| config_error( format!("failed to parse {:?}: {e}", path)))
}

/// a single conversion: read `input`, optionally crop to `bbox` and write a GeoTIFF and/or an index file
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct GeogridJob {
    pub input: PathBuf,

    #[serde(default)]
    pub bbox: Option<LonLatBox>,

    #[serde(default)]
    pub geotiff: Option<PathBuf>,

    #[serde(default)]
    pub index: Option<PathBuf>,
}

impl GeogridJob {
    pub fn run (&self) -> Result<()> {
        let mut raster = GeoRaster::from_file( &self.input)?;

        if let Some(bbox) = &self.bbox {
            raster.resample_bbox( bbox)?;
        }
        if raster.needs_reprojection()? {
            warn!("{:?} has no WPS projection, output is not reprojected", self.input);
        }

        if let Some(path) = &self.geotiff {
            raster.to_geotiff( path, None)?;
        }
        if let Some(path) = &self.index {
            info!("writing index {:?}", path);
            write_index_file( path, &raster.geogrid_index()?)?;
        }

        raster.close();
        Ok(())
    }
}

#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct GeogridJobs {
    pub jobs: Vec<GeogridJob>,
}

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

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_geogrid::{GeoRaster, LonLatBox};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "show the WPS geogrid index of a GDAL raster")]
pub struct Args {
    /// optional bounding box to crop to: lon_min,lon_max,lat_min,lat_max
    #[arg(short, long, allow_hyphen_values = true)]
    pub bbox: Option<LonLatBox>,

    /// path to GDAL raster (e.g. GeoTIFF)
    pub path: String
}

fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init(); // use RUST_LOG to set level

    let args = Args::parse();
    let mut raster = GeoRaster::from_file( &args.path)?;

    if let Some(bbox) = &args.bbox {
        raster.resample_bbox( bbox)?;
    }
    println!("{raster}");
    if raster.needs_reprojection()? {
        println!("WARNING - no WPS projection for '{}', index is not usable without reprojection", raster.proj4()?);
    }

    print!("{}", raster.geogrid_index()?);
    raster.close();

    Ok(())
}

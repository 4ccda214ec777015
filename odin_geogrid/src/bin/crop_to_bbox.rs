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
#[command(version, about, long_about = "crop a GDAL raster to a lon/lat bounding box and save it as GeoTIFF")]
pub struct Args {
    /// bounding box in WGS84 degrees: lon_min,lon_max,lat_min,lat_max
    #[arg(short, long, allow_hyphen_values = true)]
    pub bbox: LonLatBox,

    /// input filename
    pub src_path: String,

    /// output GeoTIFF filename
    pub tgt_path: String
}

fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let mut raster = GeoRaster::from_file( &args.src_path)?;
    raster.to_geotiff( &args.tgt_path, Some(&args.bbox))?;

    let gt = raster.geo_transform()?;
    println!("cropped to {}x{} with origin ({},{}) -> {}", raster.nx()?, raster.ny()?, gt[0], gt[3], args.tgt_path);
    Ok(())
}

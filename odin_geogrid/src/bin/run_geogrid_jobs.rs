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
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use odin_geogrid::{load_config, GeogridJobs};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "run geogrid conversion jobs from a RON config file")]
pub struct Args {
    /// continue with the remaining jobs if one fails
    #[arg(short, long)]
    pub keep_going: bool,

    /// path of the RON file with the GeogridJobs
    pub config: String
}

fn main()->Result<()> {
    tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let conf: GeogridJobs = load_config( &args.config)?;

    for (i,job) in conf.jobs.iter().enumerate() {
        info!("job {}/{}: {:?}", i+1, conf.jobs.len(), job.input);
        match job.run() {
            Ok(()) => println!("{:?} done", job.input),
            Err(e) if args.keep_going => warn!("job {:?} failed: {e}", job.input),
            Err(e) => return Err(e.into())
        }
    }

    Ok(())
}

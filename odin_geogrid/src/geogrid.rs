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
use ndarray::Array2;

use crate::{errors::Result, index::IndexRecord};

/// the abstraction for geogrid output. Implementors encode the (row,column) ordered `array` together with its
/// geolocation `index` into geogrid files below `path`, using `var` as the WPS variable name.
/// Callers guarantee that the array shape matches the grid the index record was computed for
pub trait GeogridWriter {
    fn write_var (&self, path: &Path, var: &str, array: &Array2<f64>, index: &IndexRecord) -> Result<()>;
}

/// write the `key = value` text rendering of an index record
pub fn write_index_file (path: impl AsRef<Path>, index: &IndexRecord) -> Result<()> {
    std::fs::write( path, index.to_string())?;
    Ok(())
}

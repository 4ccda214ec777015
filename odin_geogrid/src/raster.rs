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

use std::{fmt, path::{Path, PathBuf}};
use ndarray::Array2;
use gdal::{Dataset, DriverManager, GeoTransform};
use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use tracing::{debug, info, warn};

use crate::{
    errors::{Result, OdinGeogridError, construction_error, geometry_error, open_error},
    geogrid::GeogridWriter,
    grid::{build_windowed_grid, CoordinateGrid, GridGeometry, IndexWindow},
    index::{build_index, IndexRecord},
    projection::{resolve_proj4, srs_from_proj4, CrsParams, ResolvedProjection, WpsProjection},
    resample::{crop_bbox, LonLatBox},
};

/// everything that is only valid while the dataset is open
struct OpenRaster {
    ds: Dataset,
    srs: SpatialRef,
    proj4: String,
    resolved: ResolvedProjection,
    params: CrsParams,

    /// geometry of the underlying dataset. Resample windows always index into this grid
    source: GridGeometry,

    /// current geometry, which is the source geometry narrowed to `window`
    geometry: GridGeometry,
    window: Option<IndexWindow>,
}

/// a single band raster with a spatial reference system that can be cropped and exported as geogrid input.
///
/// GeoRasters are either opened from files ([`GeoRaster::from_file`]) or created from in-memory arrays
/// ([`GeoRaster::from_elements`]). Cropping with [`GeoRaster::resample_bbox`] changes the geometry of the
/// GeoRaster: from then on `nx`, `ny`, the geotransform, coordinates and arrays all refer to the cropped grid.
/// Once closed, all accessors (including [`GeoRaster::path`]) return [`OdinGeogridError::ClosedError`]
pub struct GeoRaster {
    path: Option<PathBuf>,
    raster: Option<OpenRaster>,
}

impl GeoRaster {

    /// wrap an opened dataset. This fails if the dataset has no raster band, no geotransform or no spatial reference
    pub fn from_dataset (ds: Dataset) -> Result<GeoRaster> {
        if ds.raster_count() < 1 {
            return Err( construction_error("dataset has no raster band"))
        }
        let gt = ds.geo_transform().map_err( |e| construction_error( format!("dataset has no geotransform: {e}")))?;
        let (nx, ny) = ds.raster_size();
        let source = GridGeometry::new( gt, nx, ny)?;

        let wkt = ds.projection();
        if wkt.is_empty() {
            return Err( construction_error("dataset has no spatial reference"))
        }
        let srs = SpatialRef::from_wkt( &wkt)?;
        let proj4 = srs.to_proj4()?;
        let resolved = resolve_proj4( &proj4);
        let params = CrsParams::from_srs( &srs)?;
        debug!("raster {nx}x{ny} '{proj4}' -> {}", resolved.projection);

        let raster = OpenRaster { ds, srs, proj4, resolved, params, source, geometry: source, window: None };
        Ok( GeoRaster { path: None, raster: Some(raster) } )
    }

    pub fn from_file (path: impl AsRef<Path>) -> Result<GeoRaster> {
        let path = path.as_ref();
        info!("reading file {:?}", path);

        let ds = Dataset::open( path).map_err( |e| open_error( path, e))?;
        let mut geo_raster = Self::from_dataset( ds)?;
        geo_raster.path = Some( path.to_path_buf());
        Ok(geo_raster)
    }

    /// create an in-memory GeoRaster from a (row,column) ordered data array, a spatial reference and a geotransform
    pub fn from_elements (data: &Array2<f64>, srs: &SpatialRef, gt: GeoTransform) -> Result<GeoRaster> {
        let (rows, cols) = data.dim();
        if rows == 0 || cols == 0 {
            return Err( construction_error("empty data array"))
        }
        GridGeometry::new( gt, cols, rows)?;

        let driver = DriverManager::get_driver_by_name("MEM")?;
        let mut ds = driver.create_with_band_type::<f64,_>( "", cols, rows, 1)?;
        ds.set_projection( &srs.to_wkt()?)?;
        ds.set_geo_transform( &gt)?;
        write_band( &mut ds, data.iter().copied().collect(), cols, rows)?;

        Self::from_dataset( ds)
    }

    fn open (&self) -> Result<&OpenRaster> {
        self.raster.as_ref().ok_or( OdinGeogridError::ClosedError)
    }

    /// release the underlying dataset. This can be called several times
    pub fn close (&mut self) {
        if self.raster.take().is_some() {
            debug!("closed raster {:?}", self.path);
        }
    }

    pub fn is_closed (&self) -> bool {
        self.raster.is_none()
    }

    //--- accessors

    /// path of the file this raster was read from (None for in-memory rasters)
    pub fn path (&self) -> Result<Option<&Path>> {
        self.open()?;
        Ok( self.path.as_deref() )
    }

    pub fn nx (&self) -> Result<usize> { Ok( self.open()?.geometry.nx ) }
    pub fn ny (&self) -> Result<usize> { Ok( self.open()?.geometry.ny ) }

    /// the current (possibly cropped) geotransform
    pub fn geo_transform (&self) -> Result<GeoTransform> { Ok( self.open()?.geometry.gt ) }

    pub fn geometry (&self) -> Result<GridGeometry> { Ok( self.open()?.geometry ) }

    /// geometry of the underlying dataset, regardless of crops
    pub fn source_geometry (&self) -> Result<GridGeometry> { Ok( self.open()?.source ) }

    /// the cached window into the source grid of the last crop
    pub fn resample_window (&self) -> Result<Option<IndexWindow>> { Ok( self.open()?.window ) }

    pub fn projection (&self) -> Result<WpsProjection> { Ok( self.open()?.resolved.projection ) }

    /// true if the native projection could not be mapped to WPS, in which case geogrid output is geometrically incorrect
    pub fn needs_reprojection (&self) -> Result<bool> { Ok( self.open()?.resolved.needs_reprojection ) }

    pub fn crs_params (&self) -> Result<CrsParams> { Ok( self.open()?.params ) }

    pub fn spatial_ref (&self) -> Result<&SpatialRef> { Ok( &self.open()?.srs ) }

    pub fn proj4 (&self) -> Result<&str> { Ok( self.open()?.proj4.as_str() ) }

    pub fn wkt (&self) -> Result<String> { Ok( self.open()?.srs.to_wkt()? ) }

    //--- data access

    /// get the data array in (row,column) order. If a bounding box is provided the raster is cropped first,
    /// otherwise a cached resample window is applied to the full dataset array
    pub fn get_array (&mut self, bbox: Option<&LonLatBox>) -> Result<Array2<f64>> {
        if let Some(bbox) = bbox {
            self.resample_bbox( bbox)
        } else {
            let raster = self.open()?;
            read_band( &raster.ds, raster.window.as_ref())
        }
    }

    /// projected coordinates of all cells of the current (possibly cropped) grid
    pub fn get_coordinates (&self) -> Result<CoordinateGrid> {
        let raster = self.open()?;
        Ok( build_windowed_grid( &raster.source, raster.window.as_ref()) )
    }

    /// crop to a WGS84 lon/lat bounding box and return the cropped data array.
    ///
    /// This is a state transition of the raster: on success the resample window is cached and `nx`, `ny` and the
    /// geotransform are set to the cropped grid (origin at the first window cell, spacing unchanged). The window is
    /// always computed on the full dataset grid, i.e. a subsequent crop replaces the previous one.
    /// Fails with a `BoundsError` if the bounding box does not intersect the raster, leaving the raster unchanged
    pub fn resample_bbox (&mut self, bbox: &LonLatBox) -> Result<Array2<f64>> {
        let raster = self.open()?;
        let crop = crop_bbox( &raster.source, &srs_from_proj4( &raster.proj4)?, bbox)?;
        let cropped = read_band( &raster.ds, Some(&crop.window))?;

        if let Some(raster) = self.raster.as_mut() {
            raster.window = Some(crop.window);
            raster.geometry = crop.geometry;
        }
        info!("cropped to {bbox}: {} ({}x{})", crop.window, crop.geometry.nx, crop.geometry.ny);
        Ok(cropped)
    }

    /// the geolocation of the current grid in geogrid index form
    pub fn geogrid_index (&self) -> Result<IndexRecord> {
        let raster = self.open()?;
        build_index( &raster.geometry, raster.resolved.projection, &raster.params, &raster.proj4)
    }

    //--- export

    /// write geogrid files through the provided writer, optionally cropping first
    pub fn to_geogrid (&mut self, writer: &dyn GeogridWriter, path: impl AsRef<Path>, var: &str, bbox: Option<&LonLatBox>) -> Result<()> {
        info!("getting array");
        let array = self.get_array( bbox)?;
        info!("creating index");
        let index = self.geogrid_index()?;

        let geometry = self.geometry()?;
        if array.dim() != (geometry.ny, geometry.nx) {
            return Err( geometry_error( format!("array shape {:?} does not match grid {}x{}", array.dim(), geometry.nx, geometry.ny)))
        }
        if self.needs_reprojection()? {
            warn!("writing geogrid variable {var} without reprojection, geometry will be incorrect");
        }

        info!("writing geogrid");
        writer.write_var( path.as_ref(), var, &array, &index)
    }

    /// write the (possibly cropped) raster as single band Float32 GeoTIFF
    pub fn to_geotiff (&mut self, path: impl AsRef<Path>, bbox: Option<&LonLatBox>) -> Result<()> {
        info!("getting array");
        let array = self.get_array( bbox)?;
        let raster = self.open()?;
        let (nx, ny) = raster.geometry.size();

        info!("writing geotiff {:?}", path.as_ref());
        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut ds = driver.create_with_band_type::<f32,_>( path.as_ref(), nx, ny, 1)?;
        ds.set_geo_transform( &raster.geometry.gt)?;
        ds.set_projection( &raster.srs.to_wkt()?)?;
        write_band( &mut ds, array.iter().map( |v| *v as f32).collect(), nx, ny)?;

        Ok(())
    }
}

impl Drop for GeoRaster {
    fn drop (&mut self) {
        self.close();
    }
}

impl fmt::Display for GeoRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raster {
            Some(raster) => {
                let src = match &self.path {
                    Some(path) => path.display().to_string(),
                    None => raster.ds.driver().short_name()
                };
                write!(f, "GeoRaster({src}, {}x{}, {})", raster.geometry.nx, raster.geometry.ny, raster.resolved.projection)
            }
            None => write!(f, "GeoRaster(closed)")
        }
    }
}

/// read the first band, only reading the cells within `window` if provided
fn read_band (ds: &Dataset, window: Option<&IndexWindow>) -> Result<Array2<f64>> {
    let band = ds.rasterband(1)?;
    let (cols, rows) = band.size();
    let w = match window {
        Some(w) => *w,
        None => IndexWindow::full( cols, rows)
    };
    let size = (w.n_cols(), w.n_rows());

    let buf: Buffer<f64> = band.read_as::<f64>( (w.col_min as isize, w.row_min as isize), size, size, None)?;
    Ok( Array2::from_shape_vec( (w.n_rows(), w.n_cols()), buf.data().to_vec())? )
}

fn write_band<T: GdalType + Copy> (ds: &mut Dataset, data: Vec<T>, cols: usize, rows: usize) -> Result<()> {
    let mut band = ds.rasterband(1)?;
    let mut buf = Buffer::new( (cols,rows), data);
    band.write( (0,0), (cols,rows), &mut buf)?;
    Ok(())
}

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
#![allow(unused)]

use std::{cell::RefCell, path::Path};
use ndarray::{s, Array2};
use odin_geogrid::{
    new_geotransform, transform_point_2d, CoordTransform, Dataset, DriverManager, GeoRaster, GeoTransform, GeogridWriter, IndexRecord, IndexWindow,
    LonLatBox, OdinGeogridError, Result, RowOrder, SpatialRef, WpsProjection
};

// run with "cargo test --test test_raster -- --nocapture"

const LON_LAT: &str = "+proj=longlat +datum=WGS84 +no_defs";
const LCC: &str = "+proj=lcc +lat_1=33 +lat_2=45 +lat_0=39 +lon_0=-96 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";
const WGS84_LON_LAT: &str = "+proj=longlat +datum=WGS84 +no_defs";
const SINUSOIDAL: &str = "+proj=sinu +lon_0=0 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";

/// 20x10 north-up lon/lat raster covering [-125,-115] x [40,45] with cell values row*100 + col
fn north_up_data() -> Array2<f64> {
    Array2::from_shape_fn( (10,20), |(r,c)| (r*100 + c) as f64)
}

fn north_up_gt() -> GeoTransform {
    new_geotransform( -125.0, 0.5, 0.0, 45.0, 0.0, -0.5)
}

fn north_up_raster() -> GeoRaster {
    let srs = SpatialRef::from_proj4( LON_LAT).unwrap();
    GeoRaster::from_elements( &north_up_data(), &srs, north_up_gt()).unwrap()
}

fn assert_gt_eq (a: &GeoTransform, b: &GeoTransform) {
    for i in 0..6 {
        assert!( (a[i] - b[i]).abs() < 1e-9, "geotransforms differ: {a:?} != {b:?}");
    }
}

#[test]
fn test_from_elements() {
    let mut raster = north_up_raster();
    println!("{raster}");

    assert_eq!( raster.nx().unwrap(), 20);
    assert_eq!( raster.ny().unwrap(), 10);
    assert_eq!( raster.geo_transform().unwrap(), north_up_gt());
    assert_eq!( raster.projection().unwrap(), WpsProjection::RegularLl);
    assert!( !raster.needs_reprojection().unwrap());
    assert_eq!( raster.resample_window().unwrap(), None);
    assert!( raster.path().unwrap().is_none());

    assert_eq!( raster.get_array( None).unwrap(), north_up_data());

    let coords = raster.get_coordinates().unwrap();
    assert_eq!( coords.shape(), (10,20));
    assert_eq!( coords.x[[0,19]], -115.5);
    assert_eq!( coords.y[[9,0]], 40.5);
}

#[test]
fn test_crop() {
    let mut raster = north_up_raster();
    let bbox = LonLatBox::new( -122.2, -117.9, 39.9, 43.1);

    let a = raster.get_array( Some(&bbox)).unwrap();
    println!("cropped {raster}:\n{a}");

    assert_eq!( raster.resample_window().unwrap(), Some( IndexWindow::new( 4, 10, 6, 15)));
    assert_eq!( a.dim(), (6,9));
    assert_eq!( a, north_up_data().slice( s![4..10, 6..15]));

    assert_eq!( raster.nx().unwrap(), 9);
    assert_eq!( raster.ny().unwrap(), 6);
    assert_gt_eq( &raster.geo_transform().unwrap(), &new_geotransform( -122.0, 0.5, 0.0, 43.0, 0.0, -0.5));

    // subsequent accesses honor the cached window
    assert_eq!( raster.get_array( None).unwrap(), a);
    let coords = raster.get_coordinates().unwrap();
    assert_eq!( coords.shape(), (6,9));
    assert_eq!( coords.x[[0,0]], -122.0);
    assert_eq!( coords.y[[0,0]], 43.0);

    // the source geometry is not changed
    assert_eq!( raster.source_geometry().unwrap().gt, north_up_gt());
}

#[test]
fn test_recrop_uses_source_grid() {
    let mut raster = north_up_raster();
    raster.resample_bbox( &LonLatBox::new( -122.2, -117.9, 39.9, 43.1)).unwrap();

    let bbox = LonLatBox::new( -124.1, -116.4, 41.4, 44.1);
    let a = raster.resample_bbox( &bbox).unwrap();

    let mut fresh = north_up_raster();
    let b = fresh.resample_bbox( &bbox).unwrap();

    assert_eq!( a, b);
    assert_eq!( raster.resample_window().unwrap(), fresh.resample_window().unwrap());
    assert_eq!( raster.geo_transform().unwrap(), fresh.geo_transform().unwrap());
}

#[test]
fn test_full_extent_crop() {
    let mut raster = north_up_raster();
    let a = raster.resample_bbox( &LonLatBox::new( -126.0, -114.0, 39.0, 46.0)).unwrap();

    assert_eq!( raster.resample_window().unwrap(), Some( IndexWindow::full( 20, 10)));
    assert_eq!( a, north_up_data());
    assert_gt_eq( &raster.geo_transform().unwrap(), &north_up_gt());
}

#[test]
fn test_flipped_axes() {
    let bbox = LonLatBox::new( -122.2, -117.9, 39.9, 43.1);
    let srs = SpatialRef::from_proj4( LON_LAT).unwrap();

    let mut north_up = north_up_raster();
    let a = north_up.resample_bbox( &bbox).unwrap();

    // same cell coordinates and values, but x decreasing with column and y increasing with row
    let data = north_up_data();
    let flipped_data = data.slice( s![..;-1, ..;-1]).to_owned();
    let flipped_gt = new_geotransform( -115.5, -0.5, 0.0, 40.5, 0.0, 0.5);
    let mut flipped = GeoRaster::from_elements( &flipped_data, &srs, flipped_gt).unwrap();
    assert_eq!( flipped.get_coordinates().unwrap().x[[0,19]], -125.0);

    let b = flipped.resample_bbox( &bbox).unwrap();
    println!("north-up:\n{a}\nflipped:\n{b}");

    assert_eq!( a.dim(), b.dim());
    assert_eq!( a, b.slice( s![..;-1, ..;-1]));

    assert_eq!( flipped.resample_window().unwrap(), Some( IndexWindow::new( 0, 6, 5, 14)));
    assert_gt_eq( &flipped.geo_transform().unwrap(), &new_geotransform( -118.0, -0.5, 0.0, 40.5, 0.0, 0.5));
}

#[test]
fn test_bbox_outside() {
    let mut raster = north_up_raster();

    let res = raster.resample_bbox( &LonLatBox::new( 10.0, 20.0, -10.0, 0.0));
    assert!( matches!( res, Err(OdinGeogridError::BoundsError(_))));

    // x range inside, y range outside
    let res = raster.get_array( Some(&LonLatBox::new( -122.0, -118.0, 50.0, 55.0)));
    assert!( matches!( res, Err(OdinGeogridError::BoundsError(_))));

    // failed crops don't change the raster
    assert_eq!( raster.resample_window().unwrap(), None);
    assert_eq!( raster.nx().unwrap(), 20);
    assert_eq!( raster.geo_transform().unwrap(), north_up_gt());
}

#[test]
fn test_geogrid_index() {
    let raster = north_up_raster();
    let index = raster.geogrid_index().unwrap();
    print!("{index}");

    assert_eq!( index.projection, WpsProjection::RegularLl);
    assert_eq!( index.dx, 0.5);
    assert_eq!( index.dy, -0.5);
    assert_eq!( index.known_x, 10.5);
    assert_eq!( index.known_y, 5.5);
    assert!( (index.known_lon - -120.0).abs() < 1e-9);
    assert!( (index.known_lat - 42.5).abs() < 1e-9);
    assert_eq!( index.row_order, RowOrder::TopBottom);

    let text = index.to_string();
    assert!( text.contains("projection = regular_ll\n"));
    assert!( text.contains("row_order = top_bottom\n"));
}

#[test]
fn test_anchor_invariance() {
    let mut raster = north_up_raster();
    let before = raster.geogrid_index().unwrap();

    // symmetric around the center cell: rows 2..8, cols 2..18
    raster.resample_bbox( &LonLatBox::new( -124.1, -116.4, 41.4, 44.1)).unwrap();
    assert_eq!( raster.resample_window().unwrap(), Some( IndexWindow::new( 2, 8, 2, 18)));
    let after = raster.geogrid_index().unwrap();
    println!("before: {before:?}\nafter:  {after:?}");

    assert_eq!( after.known_x, 8.5);
    assert_eq!( after.known_y, 3.5);
    assert!( (before.known_lon - after.known_lon).abs() < 1e-6);
    assert!( (before.known_lat - after.known_lat).abs() < 1e-6);
}

#[test]
fn test_lambert_index() {
    let srs = SpatialRef::from_proj4( LCC).unwrap();
    let data = Array2::<f64>::zeros( (100,100));
    let raster = GeoRaster::from_elements( &data, &srs, new_geotransform( -50000.0, 1000.0, 0.0, 50000.0, 0.0, -1000.0)).unwrap();
    let index = raster.geogrid_index().unwrap();
    print!("{index}");

    assert_eq!( index.projection, WpsProjection::Lambert);
    assert_eq!( index.truelat1, 33.0);
    assert_eq!( index.truelat2, 45.0);
    assert_eq!( index.stdlon, -96.0);
    assert_eq!( index.known_x, 50.5);
    assert_eq!( index.known_y, 50.5);

    // the grid center is the projection origin
    assert!( (index.known_lon - -96.0).abs() < 1e-6);
    assert!( (index.known_lat - 39.0).abs() < 1e-6);
}

/// 100x100 LCC raster with 1km cells centered on the projection origin (96°W 39°N)
fn lambert_raster() -> GeoRaster {
    let srs = SpatialRef::from_proj4( LCC).unwrap();
    let data = Array2::from_shape_fn( (100,100), |(r,c)| (r*1000 + c) as f64);
    GeoRaster::from_elements( &data, &srs, new_geotransform( -50000.0, 1000.0, 0.0, 50000.0, 0.0, -1000.0)).unwrap()
}

fn lcc_to_lon_lat (x: f64, y: f64) -> (f64,f64) {
    let transform = CoordTransform::new( &SpatialRef::from_proj4( LCC).unwrap(), &SpatialRef::from_proj4( WGS84_LON_LAT).unwrap()).unwrap();
    transform_point_2d( &transform, x, y).unwrap()
}

fn lon_lat_to_lcc (lon: f64, lat: f64) -> (f64,f64) {
    let transform = CoordTransform::new( &SpatialRef::from_proj4( WGS84_LON_LAT).unwrap(), &SpatialRef::from_proj4( LCC).unwrap()).unwrap();
    transform_point_2d( &transform, lon, lat).unwrap()
}

#[test]
fn test_lambert_crop() {
    let mut raster = lambert_raster();
    let bbox = LonLatBox::new( -96.3, -95.7, 38.8, 39.2);

    // project the corners ourselves and compute the expected window from the grid (x = -50000 + c*1000, y = 50000 - r*1000)
    let (x_min, y_min) = lon_lat_to_lcc( bbox.lon_min, bbox.lat_min);
    let (x_max, y_max) = lon_lat_to_lcc( bbox.lon_max, bbox.lat_max);
    println!("projected corners: ({x_min},{y_min}) ({x_max},{y_max})");
    assert!( x_min < -20000.0 && x_max > 20000.0);
    assert!( y_min < -15000.0 && y_max > 15000.0);

    let col_min = ((x_min + 50000.0) / 1000.0).ceil() as usize;
    let col_last = ((x_max + 50000.0) / 1000.0).floor() as usize;
    let row_min = ((50000.0 - y_max) / 1000.0).ceil() as usize;
    let row_last = ((50000.0 - y_min) / 1000.0).floor() as usize;
    let expected = IndexWindow::new( row_min, row_last + 1, col_min, col_last + 1);

    let a = raster.resample_bbox( &bbox).unwrap();
    println!("window: {expected}");

    assert_eq!( raster.resample_window().unwrap(), Some(expected));
    assert_eq!( a.dim(), (expected.n_rows(), expected.n_cols()));
    assert_eq!( a[[0,0]], (row_min*1000 + col_min) as f64);
    assert_gt_eq( &raster.geo_transform().unwrap(),
                  &new_geotransform( -50000.0 + col_min as f64 * 1000.0, 1000.0, 0.0, 50000.0 - row_min as f64 * 1000.0, 0.0, -1000.0));
}

#[test]
fn test_lambert_anchor_invariance() {
    let mut raster = lambert_raster();
    let before = raster.geogrid_index().unwrap();

    // lon/lat box whose corners project onto x: [-20300, 19300], y: [-19300, 20300], which selects the
    // 40x40 cells (rows 30..70, cols 30..70) around the grid center
    let (lon_min, lat_min) = lcc_to_lon_lat( -20300.0, -19300.0);
    let (lon_max, lat_max) = lcc_to_lon_lat( 19300.0, 20300.0);
    let bbox = LonLatBox::new( lon_min, lon_max, lat_min, lat_max);
    println!("bbox: {bbox}");

    raster.resample_bbox( &bbox).unwrap();
    assert_eq!( raster.resample_window().unwrap(), Some( IndexWindow::new( 30, 70, 30, 70)));
    assert_gt_eq( &raster.geo_transform().unwrap(), &new_geotransform( -20000.0, 1000.0, 0.0, 20000.0, 0.0, -1000.0));

    let after = raster.geogrid_index().unwrap();
    println!("before: {before:?}\nafter:  {after:?}");

    assert_eq!( after.known_x, 20.5);
    assert_eq!( after.known_y, 20.5);
    assert!( (before.known_lon - after.known_lon).abs() < 1e-6);
    assert!( (before.known_lat - after.known_lat).abs() < 1e-6);
}

#[test]
fn test_south_up_row_order() {
    let srs = SpatialRef::from_proj4( LON_LAT).unwrap();
    let raster = GeoRaster::from_elements( &north_up_data(), &srs, new_geotransform( -125.0, 0.5, 0.0, 40.0, 0.0, 0.5)).unwrap();
    assert_eq!( raster.geogrid_index().unwrap().row_order, RowOrder::BottomTop);
}

#[test]
fn test_projection_fallback() {
    let srs = SpatialRef::from_proj4( SINUSOIDAL).unwrap();
    let data = north_up_data();
    let mut raster = GeoRaster::from_elements( &data, &srs, new_geotransform( 0.0, 1000.0, 0.0, 0.0, 0.0, -1000.0)).unwrap();

    assert_eq!( raster.projection().unwrap(), WpsProjection::Lambert);
    assert!( raster.needs_reprojection().unwrap());
    assert_eq!( raster.get_array( None).unwrap(), data);
}

#[test]
fn test_close() {
    let mut raster = north_up_raster();
    raster.close();
    assert!( raster.is_closed());
    raster.close();
    assert!( raster.is_closed());
    println!("{raster}");

    assert!( matches!( raster.nx(), Err(OdinGeogridError::ClosedError)));
    assert!( matches!( raster.path(), Err(OdinGeogridError::ClosedError)));
    assert!( matches!( raster.get_array( None), Err(OdinGeogridError::ClosedError)));
    assert!( matches!( raster.get_coordinates(), Err(OdinGeogridError::ClosedError)));
    assert!( matches!( raster.geogrid_index(), Err(OdinGeogridError::ClosedError)));
    assert!( matches!( raster.resample_bbox( &LonLatBox::new( -122.0, -118.0, 41.0, 43.0)), Err(OdinGeogridError::ClosedError)));
}

#[test]
fn test_construction_errors() {
    let driver = DriverManager::get_driver_by_name("MEM").unwrap();

    let ds = driver.create_with_band_type::<f32,_>( "", 4, 4, 0).unwrap();
    match GeoRaster::from_dataset( ds) {
        Err(OdinGeogridError::ConstructionError(msg)) => {
            println!("no band: {msg}");
            assert!( msg.contains("GeoRaster::from_file") && msg.contains("GeoRaster::from_elements"));
        }
        _ => panic!("dataset without raster band accepted")
    }

    let ds = driver.create_with_band_type::<f32,_>( "", 4, 4, 1).unwrap();
    assert!( matches!( GeoRaster::from_dataset( ds), Err(OdinGeogridError::ConstructionError(_))));

    let srs = SpatialRef::from_proj4( LON_LAT).unwrap();
    let res = GeoRaster::from_elements( &north_up_data(), &srs, new_geotransform( -125.0, 0.0, 0.0, 45.0, 0.0, -0.5));
    assert!( matches!( res, Err(OdinGeogridError::GeometryError(_))));

    let res = GeoRaster::from_elements( &Array2::<f64>::zeros( (0,5)), &srs, north_up_gt());
    assert!( matches!( res, Err(OdinGeogridError::ConstructionError(_))));
}

#[test]
fn test_open_error() {
    match GeoRaster::from_file( "/nonexistent/dir/raster.tif") {
        Err(OdinGeogridError::OpenError{path,cause}) => println!("failed to open {path}: {cause}"),
        _ => panic!("opening non-existing file did not fail")
    }
}

#[test]
fn test_geotiff_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("north_up.tif");

    let mut raster = north_up_raster();
    raster.to_geotiff( &path, None).unwrap();

    let mut reread = GeoRaster::from_file( &path).unwrap();
    println!("{reread}");
    assert_eq!( reread.path().unwrap(), Some(path.as_path()));
    assert_eq!( reread.nx().unwrap(), 20);
    assert_eq!( reread.ny().unwrap(), 10);
    assert_gt_eq( &reread.geo_transform().unwrap(), &north_up_gt());
    assert_eq!( reread.projection().unwrap(), WpsProjection::RegularLl);
    assert_eq!( reread.get_array( None).unwrap(), north_up_data());
}

#[test]
fn test_cropped_geotiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cropped.tif");

    let mut raster = north_up_raster();
    raster.to_geotiff( &path, Some(&LonLatBox::new( -122.2, -117.9, 39.9, 43.1))).unwrap();

    let mut reread = GeoRaster::from_file( &path).unwrap();
    assert_eq!( reread.nx().unwrap(), 9);
    assert_eq!( reread.ny().unwrap(), 6);
    assert_gt_eq( &reread.geo_transform().unwrap(), &new_geotransform( -122.0, 0.5, 0.0, 43.0, 0.0, -0.5));
    assert_eq!( reread.get_array( None).unwrap(), north_up_data().slice( s![4..10, 6..15]));
}

#[test]
fn test_windowed_file_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("full.tif");
    north_up_raster().to_geotiff( &path, None).unwrap();

    let mut raster = GeoRaster::from_file( &path).unwrap();
    let a = raster.resample_bbox( &LonLatBox::new( -122.2, -117.9, 39.9, 43.1)).unwrap();
    let expected = north_up_data().slice( s![4..10, 6..15]).to_owned();

    assert_eq!( a, expected);
    assert_eq!( raster.get_array( None).unwrap(), expected);

    // re-crop from the full source grid
    let b = raster.resample_bbox( &LonLatBox::new( -126.0, -114.0, 39.0, 46.0)).unwrap();
    assert_eq!( b, north_up_data());
}

/// test writer that just records what it was asked to write
#[derive(Default)]
struct RecordingWriter {
    calls: RefCell<Vec<(String, (usize,usize), IndexRecord)>>
}

impl GeogridWriter for RecordingWriter {
    fn write_var (&self, path: &Path, var: &str, array: &Array2<f64>, index: &IndexRecord) -> Result<()> {
        self.calls.borrow_mut().push( (var.to_string(), array.dim(), index.clone()));
        Ok(())
    }
}

#[test]
fn test_to_geogrid() {
    let writer = RecordingWriter::default();
    let mut raster = north_up_raster();

    raster.to_geogrid( &writer, "geo_em", "NFUEL_CAT", Some(&LonLatBox::new( -124.1, -116.4, 41.4, 44.1))).unwrap();

    let calls = writer.calls.borrow();
    assert_eq!( calls.len(), 1);
    let (var, dim, index) = &calls[0];
    println!("{var} {dim:?}\n{index}");

    assert_eq!( var, "NFUEL_CAT");
    assert_eq!( *dim, (6,16));
    assert_eq!( index.known_x, 8.5);
    assert_eq!( index.known_y, 3.5);
    assert!( (index.known_lon - -120.0).abs() < 1e-6);
}

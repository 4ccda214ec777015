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

//! reconstruction of projected cell coordinates from affine geotransforms.
//!
//! All 2D arrays in this crate use (row,column) indexing, i.e. `a[[r,c]]` is the cell in raster line `r`
//! and pixel column `c`. Index windows follow the same order and are half-open on their max side.

use std::fmt;
use ndarray::{s, Array1, Array2, ArrayView1};
use gdal::GeoTransform;

use crate::errors::{Result, geometry_error};

pub fn new_geotransform (x_upper_left: f64, x_resolution: f64, row_rotation: f64,
                         y_upper_left: f64, col_rotation: f64, y_resolution: f64) -> GeoTransform {
    [x_upper_left,x_resolution,row_rotation,y_upper_left,col_rotation,y_resolution]
}

/// row/column window into a grid: `row_min..row_max` x `col_min..col_max` (max values are exclusive)
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct IndexWindow {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl IndexWindow {
    pub fn new (row_min: usize, row_max: usize, col_min: usize, col_max: usize) -> Self {
        IndexWindow { row_min, row_max, col_min, col_max }
    }

    pub fn full (nx: usize, ny: usize) -> Self {
        IndexWindow { row_min: 0, row_max: ny, col_min: 0, col_max: nx }
    }

    pub fn n_rows (&self) -> usize { self.row_max - self.row_min }
    pub fn n_cols (&self) -> usize { self.col_max - self.col_min }

    pub fn is_empty (&self) -> bool {
        self.row_max <= self.row_min || self.col_max <= self.col_min
    }

    /// does this window fit into a grid of the given dimensions
    pub fn fits (&self, nx: usize, ny: usize) -> bool {
        !self.is_empty() && self.row_max <= ny && self.col_max <= nx
    }

    pub fn slice<T: Clone> (&self, a: &Array2<T>) -> Array2<T> {
        a.slice( s![self.row_min..self.row_max, self.col_min..self.col_max]).to_owned()
    }
}

impl fmt::Display for IndexWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rows {}..{}, cols {}..{}", self.row_min, self.row_max, self.col_min, self.col_max)
    }
}

/// the affine geotransform together with the grid dimensions it applies to
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GridGeometry {
    pub gt: GeoTransform,
    pub nx: usize,
    pub ny: usize,
}

impl GridGeometry {
    /// note this rejects empty grids and zero pixel spacing
    pub fn new (gt: GeoTransform, nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 || ny == 0 {
            return Err( geometry_error( format!("empty grid {nx}x{ny}")))
        }
        if gt[1] == 0.0 || gt[5] == 0.0 {
            return Err( geometry_error( format!("zero pixel spacing in geotransform {gt:?}")))
        }
        if !gt.iter().all(|v| v.is_finite()) {
            return Err( geometry_error( format!("non-finite geotransform {gt:?}")))
        }
        Ok( GridGeometry { gt, nx, ny } )
    }

    #[inline] pub fn x0 (&self) -> f64 { self.gt[0] }
    #[inline] pub fn dx (&self) -> f64 { self.gt[1] }
    #[inline] pub fn y0 (&self) -> f64 { self.gt[3] }
    #[inline] pub fn dy (&self) -> f64 { self.gt[5] }

    pub fn is_axis_aligned (&self) -> bool {
        self.gt[2] == 0.0 && self.gt[4] == 0.0
    }

    /// (width,height) in the order GDAL uses for raster sizes
    pub fn size (&self) -> (usize,usize) { (self.nx, self.ny) }

    /// the geometry of a window into this grid. The new origin is the coordinate of the first window cell,
    /// spacing stays the same
    pub fn cropped (&self, window: &IndexWindow) -> Result<GridGeometry> {
        if !window.fits( self.nx, self.ny) {
            return Err( geometry_error( format!("window {window} outside of {}x{} grid", self.nx, self.ny)))
        }
        let (x0,dx,y0,dy) = (self.x0(), self.dx(), self.y0(), self.dy());
        let gt = new_geotransform( axis_coord(x0, dx, window.col_min), dx, 0.0,
                                   axis_coord(y0, dy, window.row_min), 0.0, dy);
        GridGeometry::new( gt, window.n_cols(), window.n_rows())
    }
}

#[inline]
fn axis_coord (origin: f64, spacing: f64, k: usize) -> f64 {
    origin + (k as f64) * spacing
}

/// the 1D coordinate sequence `origin + k*spacing` for k in [0,n)
pub fn axis_coords (origin: f64, spacing: f64, n: usize) -> Array1<f64> {
    Array1::from_iter( (0..n).map( |k| axis_coord( origin, spacing, k)))
}

/// projected x/y coordinates of each grid cell. Both arrays have shape (ny,nx)
#[derive(Debug,Clone,PartialEq)]
pub struct CoordinateGrid {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl CoordinateGrid {
    pub fn shape (&self) -> (usize,usize) { self.x.dim() }

    /// x coordinates along the columns. X is constant along rows for axis aligned transforms
    pub fn x_axis (&self) -> ArrayView1<'_,f64> { self.x.row(0) }

    /// y coordinates along the rows
    pub fn y_axis (&self) -> ArrayView1<'_,f64> { self.y.column(0) }

    pub fn window (&self, window: &IndexWindow) -> CoordinateGrid {
        CoordinateGrid { x: window.slice( &self.x), y: window.slice( &self.y) }
    }
}

/// mesh expansion of the geotransform axes: `x[[r,c]] = x0 + c*dx`, `y[[r,c]] = y0 + r*dy`.
/// Rotation terms of the transform are ignored
pub fn build_grid (gt: &GeoTransform, nx: usize, ny: usize) -> CoordinateGrid {
    let xx = axis_coords( gt[0], gt[1], nx);
    let yy = axis_coords( gt[3], gt[5], ny);

    let x = Array2::from_shape_fn( (ny,nx), |(_,c)| xx[c]);
    let y = Array2::from_shape_fn( (ny,nx), |(r,_)| yy[r]);

    CoordinateGrid { x, y }
}

/// coordinate grid of a geometry, optionally narrowed to a window
pub fn build_windowed_grid (geometry: &GridGeometry, window: Option<&IndexWindow>) -> CoordinateGrid {
    let grid = build_grid( &geometry.gt, geometry.nx, geometry.ny);
    match window {
        Some(w) => grid.window(w),
        None => grid
    }
}

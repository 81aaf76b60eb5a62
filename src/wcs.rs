//! Local world coordinate systems
//!
//! A local WCS is the linear mapping, around a single image position, between the
//! sky tangent plane (u,v) in arcsec and the image plane (x,y) in pixels.

use nalgebra as na;

/// Position in the image plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}
impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Local frame interface
pub trait LocalWcs: Send + Sync {
    /// Image position around which the local mapping is defined
    fn origin(&self) -> Position;
    /// Image plane x offset of the tangent plane offset (du,dv)
    fn x(&self, du: f64, dv: f64) -> f64;
    /// Image plane y offset of the tangent plane offset (du,dv)
    fn y(&self, du: f64, dv: f64) -> f64;
}

/// Uniform pixel scale, no rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    /// arcsec per pixel
    scale: f64,
    origin: Position,
}
impl PixelScale {
    pub fn new(scale: f64) -> Self {
        Self {
            scale,
            origin: Position::default(),
        }
    }
    pub fn origin_at(self, origin: Position) -> Self {
        Self { origin, ..self }
    }
}
impl LocalWcs for PixelScale {
    fn origin(&self) -> Position {
        self.origin
    }
    fn x(&self, du: f64, _dv: f64) -> f64 {
        du / self.scale
    }
    fn y(&self, _du: f64, dv: f64) -> f64 {
        dv / self.scale
    }
}

/// General linear mapping given by the Jacobian d(u,v)/d(x,y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianWcs {
    inverse: na::Matrix2<f64>,
    origin: Position,
}
impl JacobianWcs {
    /// Creates the WCS from the Jacobian elements, returns `None` if it is singular
    pub fn new(dudx: f64, dudy: f64, dvdx: f64, dvdy: f64) -> Option<Self> {
        na::Matrix2::new(dudx, dudy, dvdx, dvdy)
            .try_inverse()
            .map(|inverse| Self {
                inverse,
                origin: Position::default(),
            })
    }
    /// Pixel scale `scale` [arcsec/px] rotated by `theta` [rad]
    pub fn rotated(scale: f64, theta: f64) -> Option<Self> {
        let (s, c) = theta.sin_cos();
        Self::new(scale * c, -scale * s, scale * s, scale * c)
    }
    pub fn origin_at(self, origin: Position) -> Self {
        Self { origin, ..self }
    }
}
impl LocalWcs for JacobianWcs {
    fn origin(&self) -> Position {
        self.origin
    }
    fn x(&self, du: f64, dv: f64) -> f64 {
        self.inverse[(0, 0)] * du + self.inverse[(0, 1)] * dv
    }
    fn y(&self, du: f64, dv: f64) -> f64 {
        self.inverse[(1, 0)] * du + self.inverse[(1, 1)] * dv
    }
}

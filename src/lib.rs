//! Procedural texture graph compiler.
//!
//! A graph of operator nodes (shape generators, colour sources, boolean combiners,
//! filters and transforms) is walked from its root and compiled into an SVG document,
//! which can then be baked into a bitmap at any square resolution:
//!
//! - Load a [`Project`] or build a [`Graph`]
//! - [`evaluate`] it into an [`Artifact`], or [`compile_svg`] a standalone document
//! - [`export_png`] / [`export_raster`] to bake every effect into pixels
#![forbid(unsafe_code)]

mod foundation;

pub mod artifact;
pub mod composite;
pub mod eval;
pub mod export;
pub mod markup;
pub mod model;
pub mod ops;
pub mod params;
pub mod paths;
pub mod raster;

pub use crate::foundation::core::{
    Affine, BezPath, ExportResolution, MAX_DIM, Point, Resolution, Rgb, Vec2,
};
pub use crate::foundation::error::{TexError, TexResult};

pub use crate::artifact::{Artifact, Domain, Fragment};
pub use crate::eval::{BACKGROUND, Evaluator, compile_svg, evaluate};
pub use crate::export::{export_data_url, export_png, export_raster, export_raster_with};
pub use crate::markup::Document;
pub use crate::model::{Edge, Graph, Node, OperatorKind, Project};
pub use crate::params::{OpParams, parse_params};
pub use crate::raster::{RasterImage, Rasterizer, RasterizerOpts, ResvgRasterizer};

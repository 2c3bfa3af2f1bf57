//! Quill Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Quill parser and
//! renderers. It includes:
//!
//! - **Geometry**: Points, sizes and boxes ([`geometry`] module)
//! - **Transform**: 2D affine matrix algebra ([`transform::Transform`])
//! - **Colors**: CSS and HSB color handling ([`color::Color`])
//! - **Path**: The path command model, visitor engine and measurement ([`path`] module)
//! - **Paint**: Fill and stroke descriptors ([`paint`] module)
//! - **Font**: Cufón glyph tables ([`font`] module)

pub mod color;
pub mod font;
pub mod geometry;
pub mod paint;
pub mod path;
pub mod transform;

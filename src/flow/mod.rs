//! # Process Flow Diagrams
//!
//! Builds the process-flow diagram of an order:
//!
//! 1. [`grouper`] groups the order's operations by process
//! 2. [`layout`] positions one row per process and links the operations
//! 3. [`render`] hands the finished layout to a rendering surface
//!
//! [`service::FlowDiagramService`] runs the whole pipeline for an order loaded
//! from an [`OrderSource`](crate::client::OrderSource).

pub mod grouper;
pub mod layout;
pub mod render;
pub mod service;
pub mod style;

pub use grouper::{group_by_process, group_order, GroupedProcess, LineItemGroups, ProcessKey};
pub use layout::FlowLayoutEngine;
pub use render::{ExportFormat, ExportSurface, RenderSurface};
pub use service::FlowDiagramService;
pub use style::{status_style, StatusStyle};

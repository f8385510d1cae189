//! # Flow Diagram Service
//!
//! Loads an order, groups its operations and lays them out. Nothing is cached;
//! each call rebuilds the diagram from the order as it is now.

use std::sync::Arc;
use tracing::{info, instrument};

use super::grouper::group_order;
use super::layout::FlowLayoutEngine;
use super::render::RenderSurface;
use crate::client::OrderSource;
use crate::config::LayoutConfig;
use crate::error::{operations, RemoteResult};
use crate::logging::log_error;
use crate::models::{FlowLayout, Order, OrderId};

pub struct FlowDiagramService {
    orders: Arc<dyn OrderSource>,
    engine: FlowLayoutEngine,
}

impl std::fmt::Debug for FlowDiagramService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowDiagramService")
            .field("engine", &self.engine)
            .finish()
    }
}

impl FlowDiagramService {
    pub fn new(orders: Arc<dyn OrderSource>, config: LayoutConfig) -> Self {
        Self {
            orders,
            engine: FlowLayoutEngine::new(config),
        }
    }

    pub fn engine(&self) -> &FlowLayoutEngine {
        &self.engine
    }

    /// Layout of an order that is already loaded
    pub fn layout_order(&self, order: &Order) -> FlowLayout {
        self.engine.build_layout(&group_order(order))
    }

    /// Load an order and lay it out
    #[instrument(skip(self))]
    pub async fn build_for_order(&self, order_id: OrderId) -> RemoteResult<FlowLayout> {
        let order = self.orders.load_order(order_id).await.map_err(|error| {
            log_error(
                "FlowDiagramService",
                operations::LOAD_ORDER,
                &error.to_string(),
                Some(&format!("order_id={order_id}")),
            );
            error
        })?;

        let layout = self.layout_order(&order);
        info!(
            order_id,
            operations = order.operation_count(),
            rows = layout.row_count,
            "Flow diagram built"
        );
        Ok(layout)
    }

    /// Load an order, lay it out and hand the layout to `surface`
    pub async fn render_order<S>(&self, order_id: OrderId, surface: &mut S) -> RemoteResult<FlowLayout>
    where
        S: RenderSurface + ?Sized,
    {
        let layout = self.build_for_order(order_id).await?;
        surface.render(&layout);
        Ok(layout)
    }
}

//! # Flow Layout Exporter
//!
//! Command-line tool that lays out the process-flow diagram of an order read
//! from a JSON file and prints it as Mermaid or JSON.

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use mesflow_core::client::{remote_error, OrderSource};
use mesflow_core::config::{ConfigLoader, LoggingConfig};
use mesflow_core::error::{operations, RemoteOperationError, RemoteResult};
use mesflow_core::flow::{ExportFormat, ExportSurface, FlowDiagramService};
use mesflow_core::logging::init_structured_logging;
use mesflow_core::models::{Order, OrderId};

#[derive(Parser)]
#[command(name = "flow-layout")]
#[command(about = "Lay out the process-flow diagram of an order")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// JSON file holding one order or an array of orders
    orders: PathBuf,

    /// Order to lay out; defaults to the first order in the file
    #[arg(short, long)]
    order_id: Option<OrderId>,

    /// Output format (mermaid, json)
    #[arg(short, long, default_value = "mermaid")]
    format: ExportFormat,

    /// Configuration directory (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Draw links between consecutive processes of a line item
    #[arg(long)]
    link_processes: bool,
}

/// Order source backed by a JSON file
struct FileOrderSource {
    path: PathBuf,
}

impl FileOrderSource {
    async fn read_orders(&self) -> RemoteResult<Vec<Order>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(remote_error(operations::LOAD_ORDER))?;
        let value: serde_json::Value =
            serde_json::from_str(&contents).map_err(remote_error(operations::LOAD_ORDER))?;
        let orders = match value {
            serde_json::Value::Array(_) => serde_json::from_value(value),
            single => serde_json::from_value(single).map(|order| vec![order]),
        };
        orders.map_err(remote_error(operations::LOAD_ORDER))
    }
}

#[async_trait]
impl OrderSource for FileOrderSource {
    async fn load_order(&self, order_id: OrderId) -> RemoteResult<Order> {
        self.read_orders()
            .await?
            .into_iter()
            .find(|order| order.id == order_id)
            .ok_or_else(|| {
                RemoteOperationError::new(
                    operations::LOAD_ORDER,
                    format!("Order {order_id} not found in {}", self.path.display()),
                )
            })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(directory) = &cli.config_dir {
        loader = loader.with_directory(directory);
    }
    let mut config = loader.load().context("Failed to load configuration")?;
    if cli.link_processes {
        config.layout.link_processes = true;
    }

    // Diagram output goes to stdout, so logs default to warnings only
    init_structured_logging(&LoggingConfig {
        level: config.logging.level.clone().or_else(|| Some("warn".to_string())),
        format: config.logging.format,
    });

    let source = Arc::new(FileOrderSource {
        path: cli.orders.clone(),
    });
    let order_id = match cli.order_id {
        Some(order_id) => order_id,
        None => source
            .read_orders()
            .await?
            .first()
            .map(|order| order.id)
            .with_context(|| format!("{} contains no orders", cli.orders.display()))?,
    };

    let service = FlowDiagramService::new(source, config.layout);
    let mut surface = ExportSurface::new(cli.format);
    let layout = service.render_order(order_id, &mut surface).await?;
    info!(order_id, stats = ?layout.get_stats(), "Rendered flow layout");

    let rendered = surface
        .rendered()
        .with_context(|| format!("Failed to render order {order_id} as {}", cli.format))?;
    println!("{rendered}");
    Ok(())
}

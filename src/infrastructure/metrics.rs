// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 注册指标说明
pub fn describe_metrics() {
    describe_counter!(
        "pricesync_entries_processed_total",
        "Catalog entries processed by the price sync"
    );
    describe_counter!(
        "pricesync_entries_succeeded_total",
        "Catalog entries scraped successfully"
    );
    describe_counter!(
        "pricesync_entries_failed_total",
        "Catalog entries that failed, by reason"
    );
    describe_counter!(
        "pricesync_records_emitted_total",
        "Product records written to the output"
    );
    describe_counter!(
        "pricesync_entries_deleted_total",
        "Catalog entries deleted after an unrecoverable failure"
    );
    describe_counter!(
        "pricesync_fetch_attempts_total",
        "Page fetch attempts, by engine"
    );
    describe_gauge!("pricesync_live_workers", "Scrape workers currently running");
}

/// 按配置启动 Prometheus 导出
///
/// 未启用或地址无效时只记录日志，不影响同步运行
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

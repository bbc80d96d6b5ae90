//! Market data component
//!
//! Live streams (tick-by-tick, realtime bars, scanner rows, keep-up-to-date
//! historical bars) land in bounded windows read with the `fetch_*` methods.
//! One-shot historical requests and scanner parameters block on the
//! correlator.

use log::{debug, info, warn};
use relay_core::{
    Bar, HistoricalDataRequest, RealtimeBarRequest, RequestId, ScannerData, ScannerRequest, Tick,
    TickByTickDataRequest, reserved,
};
use relay_correlation::{Correlator, WindowBuffer};
use relay_ports::{OutboundRequest, Transport};
use std::sync::Arc;
use std::time::Duration;

use super::{RequestCanceller, bind, ensure_not_reserved, mismatched};
use crate::config::CorrelationSettings;
use crate::error::GatewayResult;
use crate::messages::{
    Event, HistoricalBar, HistoricalDataEnd, RealtimeBarUpdate, ScannerRow, TickByTickAllLast,
    TickByTickBidAsk, TickByTickMidPoint,
};
use crate::router::{EventHandler, HandlerTable};

pub struct MarketDataComponent {
    transport: Arc<dyn Transport>,
    window_length: usize,
    scanner_rows: usize,
    ticks: WindowBuffer<Tick>,
    realtime_bars: WindowBuffer<Bar>,
    /// Keep-up-to-date historical requests
    live_bars: WindowBuffer<Bar>,
    scanner: WindowBuffer<ScannerData>,
    /// One-shot historical requests
    historical: Correlator<Bar>,
    scanner_parameters: Correlator<String>,
}

impl MarketDataComponent {
    pub fn new(transport: Arc<dyn Transport>, settings: &CorrelationSettings) -> Self {
        let window_length = settings.window_length;
        Self {
            transport,
            window_length,
            scanner_rows: settings.scanner_rows,
            ticks: WindowBuffer::new(window_length),
            realtime_bars: WindowBuffer::new(window_length),
            live_bars: WindowBuffer::new(window_length),
            scanner: WindowBuffer::new(settings.scanner_rows),
            historical: Correlator::new(),
            scanner_parameters: Correlator::new(),
        }
    }

    // Tick-by-tick

    pub fn request_tick_by_tick_data(&self, request: TickByTickDataRequest) -> GatewayResult<()> {
        let request_id = request.request_id;
        ensure_not_reserved(request_id)?;
        info!(
            "Requesting {} ticks for {} ({})",
            request.tick_type.as_str(),
            request.contract.label(),
            request_id
        );
        self.ticks.init(request_id, self.window_length);
        self.send_or_release(OutboundRequest::RequestTickByTickData(request), || {
            self.ticks.remove(request_id);
        })
    }

    /// Latest ticks for `request_id`, oldest first
    pub fn fetch_tick_by_tick_data(&self, request_id: RequestId) -> Vec<Tick> {
        self.ticks.snapshot(request_id)
    }

    pub fn cancel_tick_by_tick_data(&self, request_id: RequestId) -> GatewayResult<()> {
        info!("Cancelling tick-by-tick data {}", request_id);
        self.ticks.remove(request_id);
        self.transport
            .send(OutboundRequest::CancelTickByTickData { request_id })?;
        Ok(())
    }

    pub fn on_tick_by_tick_all_last(&self, raw: &TickByTickAllLast) {
        self.push_tick(raw.request_id, Tick::Trade(raw.to_tick()));
    }

    pub fn on_tick_by_tick_bid_ask(&self, raw: &TickByTickBidAsk) {
        self.push_tick(raw.request_id, Tick::BidAsk(raw.to_tick()));
    }

    pub fn on_tick_by_tick_mid_point(&self, raw: &TickByTickMidPoint) {
        self.push_tick(raw.request_id, Tick::Midpoint(raw.to_tick()));
    }

    fn push_tick(&self, request_id: RequestId, tick: Tick) {
        if !self.ticks.append_if_present(request_id, tick) {
            debug!("Tick for inactive request {}", request_id);
        }
    }

    // Realtime bars

    pub fn request_realtime_bars(&self, request: RealtimeBarRequest) -> GatewayResult<()> {
        let request_id = request.request_id;
        ensure_not_reserved(request_id)?;
        info!(
            "Requesting {}s {} bars for {} ({})",
            request.bar_size,
            request.bar_type.as_str(),
            request.contract.label(),
            request_id
        );
        self.realtime_bars.init(request_id, self.window_length);
        self.send_or_release(OutboundRequest::RequestRealtimeBars(request), || {
            self.realtime_bars.remove(request_id);
        })
    }

    pub fn fetch_realtime_bars(&self, request_id: RequestId) -> Vec<Bar> {
        self.realtime_bars.snapshot(request_id)
    }

    pub fn cancel_realtime_bars(&self, request_id: RequestId) -> GatewayResult<()> {
        info!("Cancelling realtime bars {}", request_id);
        self.realtime_bars.remove(request_id);
        self.transport
            .send(OutboundRequest::CancelRealtimeBars { request_id })?;
        Ok(())
    }

    pub fn on_realtime_bar(&self, raw: &RealtimeBarUpdate) {
        match raw.to_bar() {
            Ok(bar) => {
                if !self.realtime_bars.append_if_present(raw.request_id, bar) {
                    debug!("Realtime bar for inactive request {}", raw.request_id);
                }
            }
            Err(e) => warn!("Dropping realtime bar for {}: {}", raw.request_id, e),
        }
    }

    // Historical data

    /// Request historical bars.
    ///
    /// One-shot requests block until `historicalDataEnd` and return the bars.
    /// Keep-up-to-date requests return `None` immediately; their bars are read
    /// with [`fetch_historical_data`](Self::fetch_historical_data).
    pub fn request_historical_data(
        &self,
        request: HistoricalDataRequest,
        timeout: Duration,
    ) -> GatewayResult<Option<Vec<Bar>>> {
        let request_id = request.request_id;
        ensure_not_reserved(request_id)?;
        info!(
            "Requesting historical data {} for {}: {} of {} {} bars",
            request_id,
            request.contract.label(),
            request.time_period,
            request.bar_size,
            request.bar_type.as_str()
        );

        if request.keep_up_to_date {
            self.live_bars.init(request_id, self.window_length);
            self.send_or_release(OutboundRequest::RequestHistoricalData(request), || {
                self.live_bars.remove(request_id);
            })?;
            return Ok(None);
        }

        let pending = self.historical.expect_sequence(request_id);
        self.transport
            .send(OutboundRequest::RequestHistoricalData(request))?;
        Ok(Some(pending.wait_sequence(timeout)?))
    }

    /// Latest bars of a keep-up-to-date request, oldest first
    pub fn fetch_historical_data(&self, request_id: RequestId) -> Vec<Bar> {
        self.live_bars.snapshot(request_id)
    }

    pub fn cancel_historical_data(&self, request_id: RequestId) -> GatewayResult<()> {
        info!("Cancelling historical data {}", request_id);
        self.live_bars.remove(request_id);
        self.historical.delete(request_id);
        self.transport
            .send(OutboundRequest::CancelHistoricalData { request_id })?;
        Ok(())
    }

    pub fn on_historical_data(&self, raw: &HistoricalBar) {
        let bar = match raw.bar.to_bar() {
            Ok(bar) => bar,
            Err(e) => {
                warn!("Dropping historical bar for {}: {}", raw.request_id, e);
                return;
            }
        };

        let request_id = raw.request_id;
        if self.live_bars.exists(request_id) {
            if !self.live_bars.append_if_present(request_id, bar) {
                debug!("Historical bar for cancelled request {}", request_id);
            }
        } else if !self.historical.append_if_present(request_id, bar) {
            debug!("Historical bar for inactive request {}", request_id);
        }
    }

    pub fn on_historical_data_update(&self, raw: &HistoricalBar) {
        if !self.live_bars.exists(raw.request_id) {
            debug!("Historical update for inactive request {}", raw.request_id);
            return;
        }
        let bar = match raw.bar.to_bar() {
            Ok(bar) => bar,
            Err(e) => {
                warn!("Dropping historical update for {}: {}", raw.request_id, e);
                return;
            }
        };
        let revised = self
            .live_bars
            .replace_or_append_if_present(raw.request_id, bar, |b: &Bar| b.time);
        if !revised {
            debug!("Historical update for cancelled request {}", raw.request_id);
        }
    }

    pub fn on_historical_data_end(&self, end: &HistoricalDataEnd) {
        debug!(
            "Historical data end for {} ({} - {})",
            end.request_id, end.start, end.end
        );
        if !self.live_bars.exists(end.request_id) {
            self.historical.end_sequence_if_present(end.request_id);
        }
    }

    // Scanner

    /// Scanner parameter XML
    pub fn request_scanner_parameters(&self, timeout: Duration) -> GatewayResult<String> {
        let pending = self.scanner_parameters.expect(reserved::SCANNER_PARAMETERS);
        info!("Requesting scanner parameters");
        self.transport.send(OutboundRequest::RequestScannerParameters)?;
        Ok(pending.wait_value(timeout)?)
    }

    pub fn on_scanner_parameters(&self, xml: &str) {
        info!("Received scanner parameters ({} bytes)", xml.len());
        self.scanner_parameters
            .store(reserved::SCANNER_PARAMETERS, xml.to_string());
    }

    /// Subscribe to a scanner; the window holds one page of rows
    pub fn request_scanner(&self, request: ScannerRequest) -> GatewayResult<()> {
        let request_id = request.request_id;
        ensure_not_reserved(request_id)?;
        let rows = request.subscription.rows().unwrap_or(self.scanner_rows);
        info!(
            "Requesting scanner {} ({} rows) as {}",
            request.subscription.scan_code, rows, request_id
        );
        self.scanner.init(request_id, rows);
        self.send_or_release(OutboundRequest::RequestScannerSubscription(request), || {
            self.scanner.remove(request_id);
        })
    }

    pub fn fetch_scanner_data(&self, request_id: RequestId) -> Vec<ScannerData> {
        self.scanner.snapshot(request_id)
    }

    pub fn cancel_scanner(&self, request_id: RequestId) -> GatewayResult<()> {
        info!("Cancelling scanner {}", request_id);
        self.scanner.remove(request_id);
        self.transport
            .send(OutboundRequest::CancelScannerSubscription { request_id })?;
        Ok(())
    }

    pub fn on_scanner_data(&self, row: &ScannerRow) {
        if !self.scanner.append_if_present(row.request_id, row.to_scanner_data()) {
            debug!("Scanner row for inactive request {}", row.request_id);
        }
    }

    pub fn on_scanner_data_end(&self, request_id: RequestId) {
        info!("Received scanner data end: {}", request_id);
    }

    /// Send `request`; on failure run `release` so no window is left behind
    fn send_or_release(
        &self,
        request: OutboundRequest,
        release: impl FnOnce(),
    ) -> GatewayResult<()> {
        if let Err(e) = self.transport.send(request) {
            release();
            return Err(e.into());
        }
        Ok(())
    }
}

impl RequestCanceller for MarketDataComponent {
    fn cancel_pending(&self, request_id: RequestId) -> bool {
        self.historical.delete(request_id)
    }
}

impl EventHandler for MarketDataComponent {
    fn name(&self) -> &str {
        "market_data"
    }

    fn handlers(self: Arc<Self>) -> HandlerTable {
        HandlerTable::new()
            .on(
                "on_tick_by_tick_all_last",
                bind(&self, |s, event| match event {
                    Event::TickByTickAllLast(raw) => s.on_tick_by_tick_all_last(raw),
                    other => mismatched("market_data", "on_tick_by_tick_all_last", other),
                }),
            )
            .on(
                "on_tick_by_tick_bid_ask",
                bind(&self, |s, event| match event {
                    Event::TickByTickBidAsk(raw) => s.on_tick_by_tick_bid_ask(raw),
                    other => mismatched("market_data", "on_tick_by_tick_bid_ask", other),
                }),
            )
            .on(
                "on_tick_by_tick_mid_point",
                bind(&self, |s, event| match event {
                    Event::TickByTickMidPoint(raw) => s.on_tick_by_tick_mid_point(raw),
                    other => mismatched("market_data", "on_tick_by_tick_mid_point", other),
                }),
            )
            .on(
                "on_realtime_bar",
                bind(&self, |s, event| match event {
                    Event::RealtimeBar(raw) => s.on_realtime_bar(raw),
                    other => mismatched("market_data", "on_realtime_bar", other),
                }),
            )
            .on(
                "on_historical_data",
                bind(&self, |s, event| match event {
                    Event::HistoricalData(raw) => s.on_historical_data(raw),
                    other => mismatched("market_data", "on_historical_data", other),
                }),
            )
            .on(
                "on_historical_data_update",
                bind(&self, |s, event| match event {
                    Event::HistoricalDataUpdate(raw) => s.on_historical_data_update(raw),
                    other => mismatched("market_data", "on_historical_data_update", other),
                }),
            )
            .on(
                "on_historical_data_end",
                bind(&self, |s, event| match event {
                    Event::HistoricalDataEnd(end) => s.on_historical_data_end(end),
                    other => mismatched("market_data", "on_historical_data_end", other),
                }),
            )
            .on(
                "on_scanner_parameters",
                bind(&self, |s, event| match event {
                    Event::ScannerParameters { xml } => s.on_scanner_parameters(xml),
                    other => mismatched("market_data", "on_scanner_parameters", other),
                }),
            )
            .on(
                "on_scanner_data",
                bind(&self, |s, event| match event {
                    Event::ScannerData(row) => s.on_scanner_data(row),
                    other => mismatched("market_data", "on_scanner_data", other),
                }),
            )
            .on(
                "on_scanner_data_end",
                bind(&self, |s, event| match event {
                    Event::ScannerDataEnd { request_id } => s.on_scanner_data_end(*request_id),
                    other => mismatched("market_data", "on_scanner_data_end", other),
                }),
            )
    }
}

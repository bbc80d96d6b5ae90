//! Account component
//!
//! Keeps the latest position per contract id. A position request blocks
//! until the peer's `positionEnd`, which lands on the reserved
//! `POSITIONS_END` key.

use dashmap::DashMap;
use log::{debug, info};
use relay_core::{ContractId, PositionData, reserved};
use relay_correlation::{CorrelationError, Correlator};
use relay_ports::{OutboundRequest, Transport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::{bind, mismatched};
use crate::error::GatewayResult;
use crate::messages::Event;
use crate::router::{EventHandler, HandlerTable};

pub struct AccountComponent {
    transport: Arc<dyn Transport>,
    positions: DashMap<ContractId, PositionData>,
    positions_end: Correlator<()>,
}

impl AccountComponent {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            positions: DashMap::new(),
            positions_end: Correlator::new(),
        }
    }

    /// Subscribe to position updates without waiting for the initial dump
    pub fn request_realtime_positions(&self) -> GatewayResult<()> {
        info!("Requesting realtime positions");
        self.transport.send(OutboundRequest::RequestPositions)?;
        Ok(())
    }

    /// Request positions and block until the peer has sent all of them
    pub fn request_positions(
        &self,
        timeout: Duration,
    ) -> GatewayResult<HashMap<ContractId, PositionData>> {
        let pending = self.positions_end.expect(reserved::POSITIONS_END);
        info!("Requesting positions");
        self.transport.send(OutboundRequest::RequestPositions)?;
        pending.wait_value(timeout)?;
        Ok(self.fetch_positions())
    }

    pub fn cancel_positions(&self) -> GatewayResult<()> {
        info!("Cancelling position updates");
        self.transport.send(OutboundRequest::CancelPositions)?;
        Ok(())
    }

    pub fn fetch_positions(&self) -> HashMap<ContractId, PositionData> {
        self.positions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn fetch_position(&self, contract_id: ContractId) -> GatewayResult<PositionData> {
        self.positions
            .get(&contract_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CorrelationError::NotFound(contract_id).into())
    }

    pub fn on_position(&self, position: &PositionData) {
        debug!(
            "Position {} {}: {} @ {}",
            position.account,
            position.contract.label(),
            position.position,
            position.avg_cost
        );
        self.positions
            .insert(position.contract.con_id, position.clone());
    }

    pub fn on_position_end(&self) {
        info!("Position dump complete, {} position(s)", self.positions.len());
        self.positions_end.store(reserved::POSITIONS_END, ());
    }
}

impl EventHandler for AccountComponent {
    fn name(&self) -> &str {
        "account"
    }

    fn handlers(self: Arc<Self>) -> HandlerTable {
        HandlerTable::new()
            .on(
                "on_position",
                bind(&self, |s, event| match event {
                    Event::Position(position) => s.on_position(position),
                    other => mismatched("account", "on_position", other),
                }),
            )
            .on(
                "on_position_end",
                bind(&self, |s, _| s.on_position_end()),
            )
    }
}

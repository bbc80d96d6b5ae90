use serde::{Deserialize, Serialize};

use crate::values::ContractId;

/// Security type of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityType {
    /// Stock (`STK`)
    Stock,
    /// Option (`OPT`)
    Option,
    /// Future (`FUT`)
    Future,
    /// Forex pair (`CASH`)
    Forex,
    /// Index (`IND`)
    Index,
}

impl SecurityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "STK",
            Self::Option => "OPT",
            Self::Future => "FUT",
            Self::Forex => "CASH",
            Self::Index => "IND",
        }
    }
}

/// Instrument description sent with market data and order requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Peer-assigned id, 0 until resolved
    pub con_id: ContractId,
    pub symbol: String,
    pub sec_type: SecurityType,
    pub exchange: String,
    pub primary_exchange: Option<String>,
    pub currency: String,
    pub local_symbol: Option<String>,
}

impl Contract {
    /// Create an unresolved contract
    pub fn new(
        symbol: impl Into<String>,
        sec_type: SecurityType,
        exchange: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            con_id: 0,
            symbol: symbol.into(),
            sec_type,
            exchange: exchange.into(),
            primary_exchange: None,
            currency: currency.into(),
            local_symbol: None,
        }
    }

    /// Set the peer contract id
    pub fn with_con_id(mut self, con_id: ContractId) -> Self {
        self.con_id = con_id;
        self
    }

    /// Short label for logs, e.g. `AAPL-STK`
    pub fn label(&self) -> String {
        format!("{}-{}", self.symbol, self.sec_type.as_str())
    }
}

/// Full contract description returned by a contract lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDetails {
    pub contract: Contract,
    pub market_name: String,
    pub long_name: String,
    pub min_tick: f64,
    pub industry: Option<String>,
    pub category: Option<String>,
    pub time_zone_id: Option<String>,
}

impl ContractDetails {
    pub fn new(contract: Contract, long_name: impl Into<String>, min_tick: f64) -> Self {
        Self {
            market_name: contract.symbol.clone(),
            contract,
            long_name: long_name.into(),
            min_tick,
            industry: None,
            category: None,
            time_zone_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_label() {
        let contract =
            Contract::new("AAPL", SecurityType::Stock, "SMART", "USD").with_con_id(265598);
        assert_eq!(contract.label(), "AAPL-STK");
        assert_eq!(contract.con_id, 265598);
    }
}

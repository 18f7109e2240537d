//! The analytic scope: which business entity a dashboard is filtered to.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumString;

/// Discriminant of a [`Scope`], as it appears in the `scope` query parameter.
///
/// Parsing is case-insensitive; display is always lowercase.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    None,
    All,
    Deal,
    So,
    Po,
    Contract,
}

/// Active analytic filter.
///
/// Exactly one variant is active at a time. Ids of deals, sales orders and
/// purchase orders are backend-owned integers; contract ids are opaque,
/// non-empty strings. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scope {
    /// No selection; the URL carries no scope marker.
    None,
    /// Consolidated view across all entities.
    #[default]
    All,
    #[serde(rename_all = "camelCase")]
    Deal { deal_id: i64 },
    #[serde(rename_all = "camelCase")]
    So { deal_id: i64, so_id: i64 },
    #[serde(rename_all = "camelCase")]
    Po { deal_id: i64, po_id: i64 },
    #[serde(rename_all = "camelCase")]
    Contract { deal_id: i64, contract_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("contract scope requires a non-empty contract id")]
    EmptyContractId,
}

impl Scope {
    /// Build a contract scope, rejecting an empty contract id.
    pub fn contract(deal_id: i64, contract_id: impl Into<String>) -> Result<Self, ScopeError> {
        let contract_id = contract_id.into();
        if contract_id.is_empty() {
            return Err(ScopeError::EmptyContractId);
        }
        Ok(Scope::Contract {
            deal_id,
            contract_id,
        })
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::None => ScopeKind::None,
            Scope::All => ScopeKind::All,
            Scope::Deal { .. } => ScopeKind::Deal,
            Scope::So { .. } => ScopeKind::So,
            Scope::Po { .. } => ScopeKind::Po,
            Scope::Contract { .. } => ScopeKind::Contract,
        }
    }

    /// Deal the scope belongs to, if it is deal-level or below.
    pub fn deal_id(&self) -> Option<i64> {
        match self {
            Scope::None | Scope::All => None,
            Scope::Deal { deal_id }
            | Scope::So { deal_id, .. }
            | Scope::Po { deal_id, .. }
            | Scope::Contract { deal_id, .. } => Some(*deal_id),
        }
    }

    /// True for `All` and `None`, i.e. when no specific entity is selected.
    pub fn is_unselected(&self) -> bool {
        matches!(self, Scope::None | Scope::All)
    }
}

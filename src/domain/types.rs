//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "item_category", rename_all = "snake_case")]
pub enum ItemCategory {
    Feed,
    Chemical,
    Equipment,
    Fuel,
    Other,
}

impl ItemCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemCategory::Feed => "feed",
            ItemCategory::Chemical => "chemical",
            ItemCategory::Equipment => "equipment",
            ItemCategory::Fuel => "fuel",
            ItemCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "adjustment_kind", rename_all = "snake_case")]
pub enum AdjustmentKind {
    InitialStock,
    Purchase,
    Usage,
    Correction,
}

impl AdjustmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentKind::InitialStock => "initial_stock",
            AdjustmentKind::Purchase => "purchase",
            AdjustmentKind::Usage => "usage",
            AdjustmentKind::Correction => "correction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "related_document_kind", rename_all = "snake_case")]
pub enum RelatedDocumentKind {
    WaterQualityReading,
    FeedEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&ItemCategory::Feed).expect("serialize");
        assert_eq!(json, "\"feed\"");
    }

    #[test]
    fn adjustment_kind_round_trips() {
        let kind: AdjustmentKind = serde_json::from_str("\"initial_stock\"").expect("deserialize");
        assert_eq!(kind, AdjustmentKind::InitialStock);
        assert_eq!(kind.as_str(), "initial_stock");
    }
}

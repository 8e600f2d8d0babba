//! Supplier API endpoints
//!
//! Each operation targets one fixed path and unwraps the response wrapper
//! (`result`, `data.cards`, ...) before returning.

use super::client::{Params, SupplierClient};
use crate::error::{WbError, WbResult};
use crate::types::Record;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

pub const CATALOG_INFO: &str = "/public/api/v1/info";
pub const SUPPLIER_ORDERS: &str = "/api/v1/supplier/orders";
pub const SUPPLIER_SALES: &str = "/api/v1/supplier/sales";
pub const CARDS_LIST: &str = "/content/v1/cards/list";
pub const CARD_BY_IMT_ID: &str = "/card/cardByImtID";
pub const GET_BARCODES: &str = "/card/getBarcodes";
pub const DELETE_NOMENCLATURE: &str = "/card/deleteNomenclature";

/// Filter and sort settings of the cards list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsQuery {
    pub limit: u32,
    pub offset: u32,
    pub search_value: String,
    pub sort_column: String,
    pub ascending: bool,
}

impl Default for CardsQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            search_value: String::new(),
            sort_column: "updateAt".to_string(),
            ascending: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct CardsListRequest<'a> {
    sort: &'a CardsQuery,
}

#[derive(Debug, Serialize)]
struct CardByImtIdRequest {
    #[serde(rename = "imtID")]
    imt_id: i64,
}

#[derive(Debug, Serialize)]
struct BarcodesRequest {
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct DeleteNomenclatureRequest {
    #[serde(rename = "nomenclatureID")]
    nomenclature_id: i64,
}

impl SupplierClient {
    /// Nomenclatures with their prices, discounts and promo codes.
    pub fn get_catalog_info(&self) -> WbResult<Vec<Record>> {
        let body = self.get(CATALOG_INFO, None, None)?;
        into_records(unwrap_path(body, &["result"])?, "result")
    }

    /// Orders updated since `date_from`. `flag = 1` returns only that day.
    pub fn get_orders(&self, date_from: NaiveDate, flag: u8) -> WbResult<Vec<Record>> {
        let body = self.get(SUPPLIER_ORDERS, Some(&date_params(date_from, flag)), None)?;
        into_records(unwrap_path(body, &["result"])?, "result")
    }

    /// Sales updated since `date_from`. `flag = 1` returns only that day.
    pub fn get_sales(&self, date_from: NaiveDate, flag: u8) -> WbResult<Vec<Record>> {
        let body = self.get(SUPPLIER_SALES, Some(&date_params(date_from, flag)), None)?;
        into_records(unwrap_path(body, &["result"])?, "result")
    }

    /// One page of supplier cards.
    pub fn list_cards(&self, query: &CardsQuery) -> WbResult<Vec<Record>> {
        let data = serde_json::to_value(CardsListRequest { sort: query })?;
        let body = self.post(CARDS_LIST, None, Some(&data), None, None)?;
        into_records(unwrap_path(body, &["data", "cards"])?, "data.cards")
    }

    /// The card of one imt (group) id.
    pub fn get_card_by_group_id(&self, imt_id: i64) -> WbResult<Value> {
        let data = serde_json::to_value(CardByImtIdRequest { imt_id })?;
        let body = self.post(CARD_BY_IMT_ID, None, Some(&data), None, None)?;
        unwrap_path(body, &["result"])
    }

    /// Generate `quantity` new barcodes.
    pub fn generate_barcodes(&self, quantity: u32) -> WbResult<Vec<String>> {
        let data = serde_json::to_value(BarcodesRequest { quantity })?;
        let body = self.post(GET_BARCODES, None, Some(&data), None, None)?;
        match unwrap_path(body, &["result", "barcodes"])? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    _ => Err(WbError::ResponseShape("result.barcodes".into())),
                })
                .collect(),
            _ => Err(WbError::ResponseShape("result.barcodes".into())),
        }
    }

    /// Remove one nomenclature from its card. Returns the raw reply.
    pub fn delete_item(&self, nomenclature_id: i64) -> WbResult<Value> {
        let data = serde_json::to_value(DeleteNomenclatureRequest { nomenclature_id })?;
        self.post(DELETE_NOMENCLATURE, None, Some(&data), None, None)
    }
}

fn date_params(date_from: NaiveDate, flag: u8) -> Params {
    let mut params = Params::new();
    params.insert(
        "dateFrom".to_string(),
        Value::String(date_from.format("%Y-%m-%d").to_string()),
    );
    params.insert("flag".to_string(), Value::from(flag));
    params
}

/// Walk `path` through nested objects, taking ownership of the leaf.
pub fn unwrap_path(value: Value, path: &[&str]) -> WbResult<Value> {
    let mut current = value;
    for (depth, key) in path.iter().enumerate() {
        current = match current {
            Value::Object(mut map) => map.remove(*key),
            _ => None,
        }
        .ok_or_else(|| WbError::ResponseShape(path[..=depth].join(".")))?;
    }
    Ok(current)
}

/// A JSON array of objects as records.
pub fn into_records(value: Value, path: &str) -> WbResult<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(WbError::ResponseShape(path.to_string()));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(WbError::ResponseShape(path.to_string())),
        })
        .collect()
}

//! POST /api/orders

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use harbor_core::{
    CreateOrder, Money, OrderLineRequest, OrderReceipt, DEFAULT_PAYMENT_METHOD_CODE,
};

use super::{default_company_id, default_store_id};
use crate::error::{ApiOk, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    #[serde(default = "default_company_id")]
    pub company_id: i64,
    #[serde(default = "default_store_id")]
    pub store_id: i64,
    /// 0 or absent means no cashier.
    #[serde(default)]
    pub cashier_user_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub payment: PaymentBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentBody {
    #[serde(default)]
    pub method_code: Option<String>,
    #[serde(default)]
    pub amount: Option<Money>,
}

impl From<CreateOrderBody> for CreateOrder {
    fn from(body: CreateOrderBody) -> Self {
        CreateOrder {
            company_id: body.company_id,
            store_id: body.store_id,
            cashier_id: body.cashier_user_id.filter(|id| *id > 0),
            items: body.items,
            payment_method_code: body
                .payment
                .method_code
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD_CODE.to_string()),
            payment_amount: body.payment.amount,
        }
    }
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateOrderBody>, JsonRejection>,
) -> ApiResult<OrderReceipt> {
    let Json(body) = body?;
    let receipt = state.db.orders().create_order(body.into()).await?;
    Ok(ApiOk(receipt))
}

// src/services/order_service.rs

use std::collections::HashMap;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{order_repo::OrderFilter, sale_repo::SaleFilter, OrderRepository},
    models::{
        auth::Caller,
        order::{Order, OrderStatus, OrderView},
        sale::SaleDetail,
    },
    services::sale_service::SaleService,
};

/// Anexa a venda completa a cada pedido. Pedidos sem venda correspondente são descartados.
pub fn attach_sales(orders: Vec<Order>, sales: Vec<SaleDetail>) -> Vec<OrderView> {
    let mut by_id: HashMap<i64, SaleDetail> = sales.into_iter().map(|s| (s.sale.id, s)).collect();
    orders
        .into_iter()
        .filter_map(|order| by_id.remove(&order.sale_id).map(|sale| OrderView { order, sale }))
        .collect()
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    sale_service: SaleService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, sale_service: SaleService, pool: PgPool) -> Self {
        Self { order_repo, sale_service, pool }
    }

    async fn with_sales(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, AppError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids = orders.iter().map(|o| o.sale_id).collect();
        let sales = self.sale_service.load_details(SaleFilter::Ids(ids)).await?;
        Ok(attach_sales(orders, sales))
    }

    pub async fn list_mine(&self, caller: &Caller) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.list(OrderFilter::Seller(caller.id)).await?;
        self.with_sales(orders).await
    }

    pub async fn list_all(&self) -> Result<Vec<OrderView>, AppError> {
        let orders = self.order_repo.list(OrderFilter::All).await?;
        self.with_sales(orders).await
    }

    pub async fn list_by_status(&self, raw_status: &str) -> Result<Vec<OrderView>, AppError> {
        let status = OrderStatus::parse(raw_status)
            .ok_or_else(|| AppError::BadRequest(format!("Estado de pedido inválido: {}", raw_status)))?;
        let orders = self.order_repo.list(OrderFilter::Status(status)).await?;
        self.with_sales(orders).await
    }

    /// Dono altera qualquer pedido; empregado só os das próprias vendas.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: i64,
        status: OrderStatus,
    ) -> Result<OrderView, AppError> {
        let current = self.order_repo
            .find(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado.".to_string()))?;
        // get_sale já recusa vendas de outro vendedor
        self.sale_service.get_sale(caller, current.sale_id).await?;

        let order = self.order_repo
            .update_status(&self.pool, id, status)
            .await?
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado.".to_string()))?;

        tracing::info!("🚚 Pedido {} agora {:?}", order.id, order.status);

        self.with_sales(vec![order])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Pedido no encontrado.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        auth::UserSummary,
        sale::{CustomerSummary, PaymentMethod, PaymentMethodKind, Sale},
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn order(id: i64, sale_id: i64) -> Order {
        Order {
            id,
            sale_id,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(id: i64) -> SaleDetail {
        SaleDetail {
            sale: Sale {
                id,
                seller_id: 1,
                customer_id: 1,
                payment_method_id: 1,
                cost: Decimal::ZERO,
                sale_price: Decimal::ZERO,
                profit: Decimal::ZERO,
                total: Decimal::ZERO,
                deposit: None,
                balance: Decimal::ZERO,
                discount: Decimal::ZERO,
                financed_discount: false,
                final_total: Decimal::ZERO,
                receipt_path: None,
                notes: None,
                created_at: Utc::now(),
            },
            customer: CustomerSummary { id: 1, name: "Cliente".into() },
            seller: UserSummary { id: 1, name: "Vendedor".into(), email: "v@vartan.test".into() },
            payment_method: PaymentMethod { id: 1, name: "Cash".into(), kind: PaymentMethodKind::Cash },
            items: Vec::new(),
        }
    }

    #[test]
    fn orders_keep_their_order_and_get_their_sale() {
        let views = attach_sales(vec![order(1, 20), order(2, 10)], vec![sale(10), sale(20)]);

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].order.id, 1);
        assert_eq!(views[0].sale.sale.id, 20);
        assert_eq!(views[1].sale.sale.id, 10);
    }

    #[test]
    fn orders_without_sale_are_dropped() {
        let views = attach_sales(vec![order(1, 99)], vec![sale(10)]);
        assert!(views.is_empty());
    }
}

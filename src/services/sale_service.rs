// src/services/sale_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{PgConnection, PgPool};

use crate::{
    common::{db_utils::period_of, error::AppError},
    db::{
        sale_repo::SaleFilter, CatalogRepository, CustomerRepository, OrderRepository,
        SaleRepository, UserRepository,
    },
    models::{
        auth::{Caller, User, UserSummary},
        sale::{
            CreateSalePayload, CustomerSummary, PaymentMethod, Sale, SaleDetail, SaleFigures,
            SaleHeaderRow, SaleLinePayload, SaleLineView, UpdateSalePayload,
        },
    },
    services::{
        commission_service::CommissionService,
        pricing::{compute_sale, line_cost, settle},
        receipt_store::{ReceiptStore, ReceiptUpload},
    },
};

/// Junta cabeçalhos e itens, preservando a ordem dos cabeçalhos.
pub fn assemble_details(headers: Vec<SaleHeaderRow>, lines: Vec<SaleLineView>) -> Vec<SaleDetail> {
    let mut lines_by_sale: HashMap<i64, Vec<SaleLineView>> = HashMap::new();
    for line in lines {
        lines_by_sale.entry(line.item.sale_id).or_default().push(line);
    }

    headers
        .into_iter()
        .map(|row| {
            let items = lines_by_sale.remove(&row.sale.id).unwrap_or_default();
            SaleDetail {
                customer: CustomerSummary {
                    id: row.sale.customer_id,
                    name: row.customer_name,
                },
                seller: UserSummary {
                    id: row.sale.seller_id,
                    name: row.seller_name,
                    email: row.seller_email,
                },
                payment_method: PaymentMethod {
                    id: row.sale.payment_method_id,
                    name: row.payment_method_name,
                    kind: row.payment_method_kind,
                },
                sale: row.sale,
                items,
            }
        })
        .collect()
}

fn deposit_exceeds_price(sale_price: Decimal, deposit: Decimal) -> AppError {
    AppError::business(
        "La seña no puede ser mayor al precio de venta.",
        json!({ "salePrice": sale_price, "deposit": deposit }),
    )
}

fn sale_not_found() -> AppError {
    AppError::NotFound("Venta no encontrada.".to_string())
}

#[derive(Clone)]
pub struct SaleService {
    sale_repo: SaleRepository,
    catalog_repo: CatalogRepository,
    customer_repo: CustomerRepository,
    user_repo: UserRepository,
    order_repo: OrderRepository,
    commission_service: CommissionService,
    receipts: Arc<dyn ReceiptStore>,
    pool: PgPool,
}

impl SaleService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sale_repo: SaleRepository,
        catalog_repo: CatalogRepository,
        customer_repo: CustomerRepository,
        user_repo: UserRepository,
        order_repo: OrderRepository,
        commission_service: CommissionService,
        receipts: Arc<dyn ReceiptStore>,
        pool: PgPool,
    ) -> Self {
        Self {
            sale_repo,
            catalog_repo,
            customer_repo,
            user_repo,
            order_repo,
            commission_service,
            receipts,
            pool,
        }
    }

    // ---
    // Leitura
    // ---

    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, AppError> {
        self.sale_repo.list_payment_methods().await
    }

    pub async fn load_details(&self, filter: SaleFilter) -> Result<Vec<SaleDetail>, AppError> {
        let headers = self.sale_repo.find_headers(&self.pool, filter).await?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = headers.iter().map(|h| h.sale.id).collect();
        let lines = self.sale_repo.find_line_views(&self.pool, &ids).await?;
        Ok(assemble_details(headers, lines))
    }

    pub async fn get_sale(&self, caller: &Caller, id: i64) -> Result<SaleDetail, AppError> {
        let detail = self
            .load_details(SaleFilter::Id(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(sale_not_found)?;
        if !caller.can_access(detail.sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }
        Ok(detail)
    }

    pub async fn list_for_seller(&self, seller_id: i64) -> Result<Vec<SaleDetail>, AppError> {
        self.load_details(SaleFilter::Seller(seller_id)).await
    }

    pub async fn list_all(&self) -> Result<Vec<SaleDetail>, AppError> {
        self.load_details(SaleFilter::All).await
    }

    // ---
    // Criação
    // ---

    /// Cria a venda, seus itens, a baixa de estoque e o pedido numa única transação.
    /// O comprovante (se houver) é gravado antes e removido se a transação falhar.
    pub async fn create_sale(
        &self,
        caller: &Caller,
        payload: CreateSalePayload,
        receipt: Option<ReceiptUpload>,
    ) -> Result<SaleDetail, AppError> {
        let receipt_extension = receipt.as_ref().map(ReceiptUpload::validate).transpose()?;

        // 1. Referências
        let seller = self.resolve_seller(payload.seller_id.unwrap_or(caller.id)).await?;
        if self.customer_repo.find(&self.pool, payload.customer_id).await?.is_none() {
            return Err(AppError::ReferenceNotFound("Cliente no encontrado.".to_string()));
        }
        let payment_method = self.sale_repo
            .find_payment_method(&self.pool, payload.payment_method_id)
            .await?
            .ok_or_else(|| AppError::ReferenceNotFound("Forma de pago no encontrada.".to_string()))?;

        // 2. Valores
        let cost = line_cost(payload.items.iter().map(|l| (l.quantity, &l.unit_price)));
        let figures = compute_sale(
            cost,
            payload.sale_price,
            payload.deposit,
            payload.apply_financed_discount,
            payment_method.kind,
        );
        if let Some(deposit) = figures.deposit {
            if deposit > figures.sale_price {
                return Err(deposit_exceeds_price(figures.sale_price, deposit));
            }
        }

        // 3. Arquivo primeiro, linha do banco depois
        let receipt_path = match (receipt, receipt_extension) {
            (Some(upload), Some(extension)) => Some(self.receipts.save(&extension, &upload.bytes).await?),
            _ => None,
        };

        let persisted = self
            .persist_sale(
                seller.id,
                payload.customer_id,
                payment_method.id,
                &figures,
                receipt_path.as_deref(),
                payload.notes.as_deref(),
                &payload.items,
            )
            .await;

        let sale = match persisted {
            Ok(sale) => sale,
            Err(e) => {
                if let Some(path) = &receipt_path {
                    if let Err(cleanup) = self.receipts.remove(path).await {
                        tracing::warn!("Comprovante órfão {} não removido: {}", path, cleanup);
                    }
                }
                return Err(e);
            }
        };

        tracing::info!(
            "🧾 Venda {} criada por {} (total final {})",
            sale.id,
            seller.id,
            sale.final_total
        );

        self.load_details(SaleFilter::Id(sale.id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(sale_not_found)
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist_sale(
        &self,
        seller_id: i64,
        customer_id: i64,
        payment_method_id: i64,
        figures: &SaleFigures,
        receipt_path: Option<&str>,
        notes: Option<&str>,
        items: &[SaleLinePayload],
    ) -> Result<Sale, AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self.sale_repo
            .insert_sale(&mut *tx, seller_id, customer_id, payment_method_id, figures, receipt_path, notes)
            .await?;

        // Baixa antes do item: produto inexistente cai em "sem estoque" (400).
        for line in items {
            self.decrement_stock(&mut *tx, line).await?;
            let subtotal = line.unit_price * Decimal::from(line.quantity);
            self.sale_repo
                .insert_line(&mut *tx, sale.id, line, subtotal)
                .await?;
        }

        self.order_repo.create_for_sale(&mut *tx, sale.id).await?;

        // Qualquer erro acima descarta a transação (rollback no drop).
        tx.commit().await?;
        Ok(sale)
    }

    /// Baixa atômica; zero linhas afetadas vira "sem estoque" ou "estoque insuficiente".
    async fn decrement_stock(&self, conn: &mut PgConnection, line: &SaleLinePayload) -> Result<(), AppError> {
        let remaining = self.catalog_repo
            .try_decrement_stock(&mut *conn, line.product_id, line.size, line.color, line.quantity)
            .await?;
        if remaining.is_some() {
            return Ok(());
        }

        let available = self.catalog_repo
            .find_stock_quantity(&mut *conn, line.product_id, line.size, line.color)
            .await?;
        let details = json!({
            "productId": line.product_id,
            "size": line.size,
            "color": line.color,
            "requested": line.quantity,
            "available": available.unwrap_or(0),
        });

        Err(match available {
            None => AppError::business(
                format!(
                    "No hay stock para el producto {} ({} / {}).",
                    line.product_id,
                    line.size.label(),
                    line.color.label()
                ),
                details,
            ),
            Some(available) => AppError::business(
                format!(
                    "Stock insuficiente para el producto {} ({} / {}): disponible {}, solicitado {}.",
                    line.product_id,
                    line.size.label(),
                    line.color.label(),
                    available,
                    line.quantity
                ),
                details,
            ),
        })
    }

    async fn resolve_seller(&self, seller_id: i64) -> Result<User, AppError> {
        match self.user_repo.find_by_id(&self.pool, seller_id).await? {
            Some(user) if user.active => Ok(user),
            _ => Err(AppError::ReferenceNotFound(format!(
                "Vendedor {} inválido o inactivo.",
                seller_id
            ))),
        }
    }

    // ---
    // Alterações
    // ---

    /// Atualiza só o cabeçalho. Trocar forma de pagamento ou seña recalcula
    /// saldo, desconto e total final a partir do total gravado.
    pub async fn update_sale(
        &self,
        caller: &Caller,
        id: i64,
        payload: UpdateSalePayload,
    ) -> Result<SaleDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut sale = self.sale_repo.lock_sale(&mut *tx, id).await?.ok_or_else(sale_not_found)?;
        if !caller.can_access(sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }

        if let Some(seller_id) = payload.seller_id {
            match self.user_repo.find_by_id(&mut *tx, seller_id).await? {
                Some(user) if user.active => sale.seller_id = user.id,
                _ => {
                    return Err(AppError::ReferenceNotFound(format!(
                        "Vendedor {} inválido o inactivo.",
                        seller_id
                    )))
                }
            }
        }

        if let Some(customer_id) = payload.customer_id {
            if self.customer_repo.find(&mut *tx, customer_id).await?.is_none() {
                return Err(AppError::ReferenceNotFound("Cliente no encontrado.".to_string()));
            }
            sale.customer_id = customer_id;
        }

        if payload.payment_method_id.is_some() || payload.deposit.is_some() {
            let method_id = payload.payment_method_id.unwrap_or(sale.payment_method_id);
            let method = self.sale_repo
                .find_payment_method(&mut *tx, method_id)
                .await?
                .ok_or_else(|| AppError::ReferenceNotFound("Forma de pago no encontrada.".to_string()))?;

            let deposit = payload.deposit.or(sale.deposit);
            if let Some(deposit) = deposit {
                if deposit > sale.sale_price {
                    return Err(deposit_exceeds_price(sale.sale_price, deposit));
                }
            }

            let settlement = settle(sale.total, deposit, sale.financed_discount, method.kind);
            sale.payment_method_id = method.id;
            sale.deposit = deposit;
            sale.balance = settlement.balance;
            sale.discount = settlement.discount;
            sale.financed_discount = settlement.financed_discount;
            sale.final_total = settlement.final_total;
        }

        if let Some(notes) = payload.notes {
            sale.notes = Some(notes);
        }

        self.sale_repo.update_sale(&mut *tx, &sale).await?;
        tx.commit().await?;

        self.get_sale(caller, id).await
    }

    /// Registra um novo valor de seña e, opcionalmente, troca o comprovante.
    /// Devolve a venda atualizada e o novo saldo.
    pub async fn update_payment(
        &self,
        caller: &Caller,
        id: i64,
        deposit: Decimal,
        receipt: Option<ReceiptUpload>,
    ) -> Result<(SaleDetail, Decimal), AppError> {
        if deposit < Decimal::ZERO {
            return Err(AppError::BadRequest("La seña no puede ser negativa.".to_string()));
        }
        let receipt_extension = receipt.as_ref().map(ReceiptUpload::validate).transpose()?;

        let mut tx = self.pool.begin().await?;

        let mut sale = self.sale_repo.lock_sale(&mut *tx, id).await?.ok_or_else(sale_not_found)?;
        if !caller.can_access(sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }
        if deposit > sale.sale_price {
            return Err(deposit_exceeds_price(sale.sale_price, deposit));
        }

        let method = self.sale_repo
            .find_payment_method(&mut *tx, sale.payment_method_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("venda {} sem forma de pagamento", sale.id))?;
        let settlement = settle(sale.total, Some(deposit), sale.financed_discount, method.kind);
        sale.deposit = Some(deposit);
        sale.balance = settlement.balance;
        sale.discount = settlement.discount;
        sale.financed_discount = settlement.financed_discount;
        sale.final_total = settlement.final_total;

        let previous_receipt = sale.receipt_path.clone();
        let new_receipt = match (receipt, receipt_extension) {
            (Some(upload), Some(extension)) => Some(self.receipts.save(&extension, &upload.bytes).await?),
            _ => None,
        };
        if new_receipt.is_some() {
            sale.receipt_path = new_receipt.clone();
        }

        let committed = match self.sale_repo.update_sale(&mut *tx, &sale).await {
            Ok(_) => tx.commit().await.map_err(AppError::from),
            Err(e) => Err(e),
        };

        match committed {
            Ok(()) => {
                if let (Some(_), Some(old)) = (&new_receipt, previous_receipt) {
                    self.remove_file_best_effort(&old).await;
                }
            }
            Err(e) => {
                if let Some(path) = &new_receipt {
                    self.remove_file_best_effort(path).await;
                }
                return Err(e);
            }
        }

        tracing::info!("Pagamento da venda {} atualizado (saldo {})", sale.id, sale.balance);
        let detail = self.get_sale(caller, id).await?;
        let balance = detail.sale.balance;
        Ok((detail, balance))
    }

    // ---
    // Remoção
    // ---

    /// Devolve o estoque, apaga pedido, itens e venda, e recalcula a comissão
    /// do período do vendedor. Tudo ou nada.
    pub async fn delete_sale(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let sale = self.sale_repo.lock_sale(&mut *tx, id).await?.ok_or_else(sale_not_found)?;
        if !caller.can_access(sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }

        let lines = self.sale_repo.find_lines(&mut *tx, sale.id).await?;
        for line in &lines {
            self.catalog_repo
                .add_stock(&mut *tx, line.product_id, line.size, line.color, line.quantity)
                .await?;
        }

        self.order_repo.delete_for_sale(&mut *tx, sale.id).await?;
        self.sale_repo.delete_lines(&mut *tx, sale.id).await?;
        self.sale_repo.delete_sale(&mut *tx, sale.id).await?;

        let (month, year) = period_of(sale.created_at);
        self.commission_service
            .refresh_existing(&mut *tx, sale.seller_id, month, year)
            .await?;

        tx.commit().await?;

        // O arquivo só sai depois do commit.
        if let Some(path) = &sale.receipt_path {
            self.remove_file_best_effort(path).await;
        }

        tracing::info!("🗑️ Venda {} removida ({} itens devolvidos ao estoque)", sale.id, lines.len());
        Ok(())
    }

    // ---
    // Comprovantes
    // ---

    pub async fn remove_receipt(&self, caller: &Caller, id: i64) -> Result<(), AppError> {
        let mut sale = self.sale_repo.find_sale(&self.pool, id).await?.ok_or_else(sale_not_found)?;
        if !caller.can_access(sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }
        let path = sale
            .receipt_path
            .take()
            .ok_or_else(|| AppError::NotFound("La venta no tiene comprobante.".to_string()))?;

        self.sale_repo.update_sale(&self.pool, &sale).await?;
        self.remove_file_best_effort(&path).await;
        Ok(())
    }

    /// (bytes, nome do arquivo)
    pub async fn read_receipt(&self, caller: &Caller, id: i64) -> Result<(Vec<u8>, String), AppError> {
        let sale = self.sale_repo.find_sale(&self.pool, id).await?.ok_or_else(sale_not_found)?;
        if !caller.can_access(sale.seller_id) {
            return Err(AppError::Forbidden("No tiene acceso a esta venta.".to_string()));
        }
        let path = sale
            .receipt_path
            .ok_or_else(|| AppError::NotFound("La venta no tiene comprobante.".to_string()))?;

        let bytes = self.receipts
            .read(&path)
            .await?
            .ok_or_else(|| AppError::NotFound("Archivo de comprobante no encontrado.".to_string()))?;
        Ok((bytes, path))
    }

    async fn remove_file_best_effort(&self, path: &str) {
        if let Err(e) = self.receipts.remove(path).await {
            tracing::warn!("Falha ao remover comprovante {}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        catalog::{ProductColor, ProductSize},
        sale::{PaymentMethodKind, SaleLineItem},
    };
    use chrono::Utc;

    fn header(id: i64) -> SaleHeaderRow {
        SaleHeaderRow {
            sale: Sale {
                id,
                seller_id: 3,
                customer_id: 9,
                payment_method_id: 1,
                cost: Decimal::new(250, 0),
                sale_price: Decimal::new(250, 0),
                profit: Decimal::ZERO,
                total: Decimal::new(250, 0),
                deposit: None,
                balance: Decimal::new(250, 0),
                discount: Decimal::ZERO,
                financed_discount: false,
                final_total: Decimal::new(250, 0),
                receipt_path: None,
                notes: None,
                created_at: Utc::now(),
            },
            customer_name: "Club Atlético".to_string(),
            seller_name: "Lucía".to_string(),
            seller_email: "lucia@vartan.test".to_string(),
            payment_method_name: "Cash".to_string(),
            payment_method_kind: PaymentMethodKind::Cash,
        }
    }

    fn line(id: i64, sale_id: i64) -> SaleLineView {
        SaleLineView {
            item: SaleLineItem {
                id,
                sale_id,
                product_id: 7,
                size: ProductSize::M,
                color: ProductColor::Azul,
                quantity: 1,
                unit_price: Decimal::new(50, 0),
                subtotal: Decimal::new(50, 0),
            },
            product_name: "Camiseta River".to_string(),
        }
    }

    #[test]
    fn assemble_keeps_header_order_and_groups_lines() {
        let details = assemble_details(
            vec![header(2), header(1)],
            vec![line(10, 1), line(11, 2), line(12, 1)],
        );

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].sale.id, 2);
        assert_eq!(details[0].items.len(), 1);
        assert_eq!(details[1].items.iter().map(|l| l.item.id).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(details[1].customer.name, "Club Atlético");
        assert_eq!(details[1].payment_method.kind, PaymentMethodKind::Cash);
    }

    #[test]
    fn detail_serializes_flat_sale_fields() {
        let details = assemble_details(vec![header(5)], vec![line(1, 5)]);
        let json = serde_json::to_value(&details[0]).unwrap();

        assert_eq!(json["id"], 5);
        assert_eq!(json["finalTotal"], 250.0);
        assert_eq!(json["seller"]["name"], "Lucía");
        assert_eq!(json["items"][0]["productName"], "Camiseta River");
        assert_eq!(json["items"][0]["color"], "Azul");
    }
}

// src/services/commission_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::{
    common::{
        db_utils::{month_bounds, period_of},
        error::AppError,
    },
    db::{CommissionRepository, UserRepository},
    models::{
        auth::{User, UserSummary},
        commission::{
            Commission, CommissionConfiguration, CommissionSummary, CommissionView,
            CurrentMonthSummary,
        },
    },
    services::pricing::round_money,
};

const SUMMARY_HISTORY_LEN: i64 = 6;

/// Comissão bruta e líquida de um período.
/// líquida = max(0, vendas × pct / 100 − gasto com publicidade)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionAmounts {
    pub gross: Decimal,
    pub net: Decimal,
}

pub fn commission_amounts(
    total_sales: Decimal,
    commission_percentage: Decimal,
    advertising_expense: Decimal,
) -> CommissionAmounts {
    let gross = round_money(total_sales * commission_percentage / Decimal::ONE_HUNDRED);
    let net = (gross - advertising_expense).max(Decimal::ZERO);
    CommissionAmounts { gross, net }
}

#[derive(Clone)]
pub struct CommissionService {
    commission_repo: CommissionRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl CommissionService {
    pub fn new(commission_repo: CommissionRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { commission_repo, user_repo, pool }
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Commission>, AppError> {
        self.commission_repo.list_for_user(user_id, None).await
    }

    pub async fn list_views(&self, user_id: Option<i64>) -> Result<Vec<CommissionView>, AppError> {
        self.commission_repo.list_views(user_id).await
    }

    pub async fn update_notes(&self, id: i64, notes: &str) -> Result<Commission, AppError> {
        self.commission_repo
            .update_notes(&self.pool, id, notes)
            .await?
            .ok_or_else(|| AppError::NotFound("Comisión no encontrada.".to_string()))
    }

    /// Recalcula o mês corrente (UTC) para todos os empregados ativos.
    /// Rodar duas vezes no mesmo mês atualiza as mesmas linhas.
    pub async fn recompute_current_period(&self) -> Result<Vec<Commission>, AppError> {
        let (month, year) = period_of(Utc::now());
        self.recompute_period(month, year).await
    }

    pub async fn recompute_period(&self, month: i32, year: i32) -> Result<Vec<Commission>, AppError> {
        let mut tx = self.pool.begin().await?;

        let employees = self.user_repo.list_active_employees(&mut *tx).await?;
        let mut rows = Vec::with_capacity(employees.len());
        for employee in &employees {
            let row = self.upsert_for_user(&mut *tx, employee, month, year).await?;
            rows.push(row);
        }

        tx.commit().await?;
        tracing::info!(
            "💰 Comissões recalculadas para {}/{} ({} empregados)",
            month,
            year,
            rows.len()
        );
        Ok(rows)
    }

    /// Se já existe comissão para (usuário, mês, ano), recalcula dentro da
    /// transação do chamador. Usado ao apagar uma venda.
    pub async fn refresh_existing(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        month: i32,
        year: i32,
    ) -> Result<Option<Commission>, AppError> {
        if self.commission_repo
            .find_for_period(&mut *conn, user_id, month, year)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let user = self.user_repo
            .find_by_id(&mut *conn, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".to_string()))?;

        let row = self.upsert_for_user(conn, &user, month, year).await?;
        Ok(Some(row))
    }

    async fn upsert_for_user(
        &self,
        conn: &mut PgConnection,
        user: &User,
        month: i32,
        year: i32,
    ) -> Result<Commission, AppError> {
        let (from, to) = month_bounds(year, month as u32)
            .ok_or_else(|| AppError::BadRequest(format!("Período inválido: {}/{}", month, year)))?;

        let totals = self.commission_repo
            .period_totals(&mut *conn, user.id, from, to)
            .await?;
        let amounts = commission_amounts(
            totals.total_sales,
            user.commission_percentage,
            user.advertising_expense,
        );

        self.commission_repo
            .upsert(
                &mut *conn,
                user.id,
                month,
                year,
                totals.total_sales,
                amounts.net,
                user.base_salary,
            )
            .await
    }

    /// Resumo ao vivo do mês corrente para o próprio usuário.
    /// Sem linha gravada no período, `recorded` vem falso e as notas vazias.
    pub async fn live_summary(&self, user_id: i64) -> Result<CommissionSummary, AppError> {
        let user = self.user_repo
            .find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado.".to_string()))?;

        let (month, year) = period_of(Utc::now());
        let (from, to) = month_bounds(year, month as u32)
            .ok_or_else(|| anyhow::anyhow!("mês corrente inválido: {}/{}", month, year))?;

        let totals = self.commission_repo
            .period_totals(&self.pool, user.id, from, to)
            .await?;
        let amounts = commission_amounts(
            totals.total_sales,
            user.commission_percentage,
            user.advertising_expense,
        );
        let recorded = self.commission_repo
            .find_for_period(&self.pool, user.id, month, year)
            .await?;
        let history = self.commission_repo
            .list_for_user(user.id, Some(SUMMARY_HISTORY_LEN))
            .await?;

        Ok(CommissionSummary {
            user: UserSummary {
                id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
            },
            configuration: CommissionConfiguration {
                commission_percentage: user.commission_percentage,
                advertising_expense: user.advertising_expense,
                base_salary: user.base_salary,
                notes: user.commission_notes.clone(),
            },
            current_month: CurrentMonthSummary {
                month,
                year,
                total_sales: totals.total_sales,
                sales_count: totals.sales_count,
                gross_commission: amounts.gross,
                advertising_expense: user.advertising_expense,
                net_commission: amounts.net,
                base_salary: user.base_salary,
                total_to_collect: user.base_salary + amounts.net,
                recorded: recorded.is_some(),
                notes: recorded.map(|c| c.notes).unwrap_or_default(),
            },
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn net_is_gross_minus_advertising() {
        let amounts = commission_amounts(dec(100_000, 0), dec(10, 0), dec(2_500, 0));
        assert_eq!(amounts.gross, dec(10_000, 0));
        assert_eq!(amounts.net, dec(7_500, 0));
    }

    #[test]
    fn advertising_above_gross_clamps_to_zero() {
        let amounts = commission_amounts(dec(10_000, 0), dec(10, 0), dec(5_000, 0));
        assert_eq!(amounts.gross, dec(1_000, 0));
        assert_eq!(amounts.net, Decimal::ZERO);
    }

    #[test]
    fn fractional_percentage_rounds_to_cents() {
        let amounts = commission_amounts(dec(33_333, 2), dec(75, 1), Decimal::ZERO);
        // 333.33 × 7.5% = 24.99975
        assert_eq!(amounts.gross, dec(2_500, 2));
    }

    #[test]
    fn no_sales_means_no_commission() {
        let amounts = commission_amounts(Decimal::ZERO, dec(15, 0), dec(100, 0));
        assert_eq!(amounts, CommissionAmounts { gross: Decimal::ZERO, net: Decimal::ZERO });
    }
}

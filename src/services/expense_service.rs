// src/services/expense_service.rs

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::{error::AppError, pagination::Page},
    db::ExpenseRepository,
    models::{
        auth::Caller,
        expense::{
            CategoryTotal, Expense, ExpenseCategory, ExpenseDraft, ExpenseFilter, ExpensePage,
            ExpensePaymentMethod, ExpenseSummary, MonthTotal,
        },
    },
};

/// Datas de gasto chegam como `YYYY-MM-DD`.
pub fn parse_expense_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest(format!("Fecha inválida '{}', use el formato YYYY-MM-DD.", raw))
    })
}

pub fn summarize(by_category: Vec<CategoryTotal>) -> ExpenseSummary {
    let grand_total = by_category.iter().map(|c| c.total).sum::<Decimal>();
    let count = by_category.iter().map(|c| c.count).sum::<i64>();
    ExpenseSummary { by_category, grand_total, count }
}

// Dados de gasto ainda crus (data como texto).
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: Decimal,
    pub date: String,
    pub category: ExpenseCategory,
    pub provider: Option<String>,
    pub payment_method: Option<ExpensePaymentMethod>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

impl ExpenseInput {
    pub fn into_draft(self) -> Result<ExpenseDraft, AppError> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::BadRequest("El monto debe ser mayor a cero.".to_string()));
        }
        let date = parse_expense_date(&self.date)?;
        Ok(ExpenseDraft {
            description: self.description.trim().to_string(),
            amount: self.amount,
            date,
            category: self.category,
            provider: self.provider.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
            payment_method: self.payment_method,
            receipt_number: self.receipt_number,
            notes: self.notes,
        })
    }
}

#[derive(Clone)]
pub struct ExpenseService {
    expense_repo: ExpenseRepository,
    pool: PgPool,
}

impl ExpenseService {
    pub fn new(expense_repo: ExpenseRepository, pool: PgPool) -> Self {
        Self { expense_repo, pool }
    }

    pub async fn create(&self, caller: &Caller, client_id: i64, input: ExpenseInput) -> Result<Expense, AppError> {
        let draft = input.into_draft()?;
        let expense = self.expense_repo
            .create(&self.pool, client_id, caller.id, &draft)
            .await?;
        tracing::info!("Gasto {} registrado ({} {:?})", expense.id, expense.amount, expense.category);
        Ok(expense)
    }

    pub async fn get(&self, client_id: i64, id: i64) -> Result<Expense, AppError> {
        self.expense_repo
            .find(&self.pool, client_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gasto no encontrado.".to_string()))
    }

    pub async fn update(&self, client_id: i64, id: i64, input: ExpenseInput) -> Result<Expense, AppError> {
        let draft = input.into_draft()?;
        self.expense_repo
            .update(&self.pool, client_id, id, &draft)
            .await?
            .ok_or_else(|| AppError::NotFound("Gasto no encontrado.".to_string()))
    }

    pub async fn delete(&self, client_id: i64, id: i64) -> Result<(), AppError> {
        if !self.expense_repo.delete(&self.pool, client_id, id).await? {
            return Err(AppError::NotFound("Gasto no encontrado.".to_string()));
        }
        Ok(())
    }

    pub async fn list(&self, client_id: i64, filter: &ExpenseFilter, page: Page) -> Result<ExpensePage, AppError> {
        let (expenses, total) = self.expense_repo.list(client_id, filter, page).await?;
        Ok(ExpensePage {
            expenses,
            total,
            page: page.page,
            limit: page.limit,
        })
    }

    pub async fn summary(
        &self,
        client_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<ExpenseSummary, AppError> {
        let rows = self.expense_repo
            .totals_by_category(client_id, date_from, date_to)
            .await?;
        Ok(summarize(rows))
    }

    pub async fn by_month(&self, client_id: i64, year: Option<i32>) -> Result<Vec<MonthTotal>, AppError> {
        let year = year.unwrap_or_else(|| Utc::now().year());
        self.expense_repo.totals_by_month(client_id, year).await
    }

    pub async fn providers(&self, client_id: i64) -> Result<Vec<String>, AppError> {
        self.expense_repo.providers(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: Decimal, date: &str) -> ExpenseInput {
        ExpenseInput {
            description: " Alquiler local ".to_string(),
            amount,
            date: date.to_string(),
            category: ExpenseCategory::Rent,
            provider: Some("   ".to_string()),
            payment_method: Some(ExpensePaymentMethod::Transfer),
            receipt_number: None,
            notes: None,
        }
    }

    #[test]
    fn valid_input_becomes_a_draft() {
        let draft = input(Decimal::new(150_000, 2), "2025-03-01").into_draft().unwrap();
        assert_eq!(draft.description, "Alquiler local");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(draft.provider, None);
    }

    #[test]
    fn zero_amount_and_bad_dates_are_rejected() {
        assert!(matches!(
            input(Decimal::ZERO, "2025-03-01").into_draft(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            input(Decimal::ONE, "01/03/2025").into_draft(),
            Err(AppError::BadRequest(_))
        ));
        assert!(parse_expense_date("2025-02-30").is_err());
    }

    #[test]
    fn summary_adds_up_categories() {
        let summary = summarize(vec![
            CategoryTotal { category: ExpenseCategory::Rent, total: Decimal::new(1_000, 0), count: 1 },
            CategoryTotal { category: ExpenseCategory::Supplier, total: Decimal::new(25_050, 2), count: 3 },
        ]);
        assert_eq!(summary.grand_total, Decimal::new(125_050, 2));
        assert_eq!(summary.count, 4);
    }
}

// src/services/pricing.rs
//
// Aritmética das vendas. Funções puras: nada aqui toca no banco.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::sale::{PaymentMethodKind, SaleFigures};

/// 3% sobre o saldo pendente.
pub fn financed_discount_rate() -> Decimal {
    Decimal::new(3, 2)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Σ(preço unitário × quantidade) dos itens informados.
pub fn line_cost<'a, I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, &'a Decimal)>,
{
    lines
        .into_iter()
        .map(|(quantity, unit_price)| *unit_price * Decimal::from(quantity))
        .sum()
}

/// Saldo, desconto e total final para um total e um sinal.
/// O desconto só vale com a flag ligada e forma de pagamento financiada;
/// caso contrário a flag volta desligada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub balance: Decimal,
    pub discount: Decimal,
    pub financed_discount: bool,
    pub final_total: Decimal,
}

pub fn settle(
    total: Decimal,
    deposit: Option<Decimal>,
    apply_financed_discount: bool,
    kind: PaymentMethodKind,
) -> Settlement {
    let balance = total - deposit.unwrap_or(Decimal::ZERO);
    let eligible = apply_financed_discount && kind.allows_financed_discount();
    let discount = if eligible {
        round_money(balance * financed_discount_rate())
    } else {
        Decimal::ZERO
    };

    Settlement {
        balance,
        discount,
        financed_discount: eligible,
        final_total: total - discount,
    }
}

/// Todos os valores de uma venda nova.
pub fn compute_sale(
    cost: Decimal,
    requested_price: Option<Decimal>,
    deposit: Option<Decimal>,
    apply_financed_discount: bool,
    kind: PaymentMethodKind,
) -> SaleFigures {
    // Preço ausente ou zero: usa o custo (compatibilidade com clientes antigos).
    let sale_price = match requested_price {
        Some(price) if !price.is_zero() => price,
        _ => cost,
    };
    let total = sale_price;
    let settlement = settle(total, deposit, apply_financed_discount, kind);

    SaleFigures {
        cost,
        sale_price,
        profit: sale_price - cost,
        total,
        deposit,
        balance: settlement.balance,
        discount: settlement.discount,
        financed_discount: settlement.financed_discount,
        final_total: settlement.final_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn two_lines_on_financed_transfer_get_three_percent_off_the_balance() {
        let lines = [(2, dec(100, 0)), (1, dec(50, 0))];
        let cost = line_cost(lines.iter().map(|(q, p)| (*q, p)));
        assert_eq!(cost, dec(250, 0));

        let figures = compute_sale(cost, None, Some(Decimal::ZERO), true, PaymentMethodKind::FinancedTransfer);
        assert_eq!(figures.total, dec(250, 0));
        assert_eq!(figures.balance, dec(250, 0));
        assert_eq!(figures.discount, dec(750, 2));
        assert_eq!(figures.final_total, dec(24250, 2));
        assert!(figures.financed_discount);
    }

    #[test]
    fn flag_without_financed_method_gives_no_discount() {
        let figures = compute_sale(dec(250, 0), None, None, true, PaymentMethodKind::BankTransfer);
        assert_eq!(figures.discount, Decimal::ZERO);
        assert_eq!(figures.final_total, figures.sale_price);
        assert!(!figures.financed_discount);
    }

    #[test]
    fn financed_method_without_flag_gives_no_discount() {
        let figures = compute_sale(dec(250, 0), None, None, false, PaymentMethodKind::FinancedTransfer);
        assert_eq!(figures.discount, Decimal::ZERO);
        assert_eq!(figures.final_total, dec(250, 0));
    }

    #[test]
    fn explicit_price_sets_profit_and_deposit_reduces_balance() {
        let figures = compute_sale(
            dec(250, 0),
            Some(dec(400, 0)),
            Some(dec(100, 0)),
            true,
            PaymentMethodKind::FinancedTransfer,
        );
        assert_eq!(figures.sale_price, dec(400, 0));
        assert_eq!(figures.profit, dec(150, 0));
        assert_eq!(figures.balance, dec(300, 0));
        assert_eq!(figures.discount, dec(9, 0));
        assert_eq!(figures.final_total, dec(391, 0));
    }

    #[test]
    fn zero_price_falls_back_to_cost() {
        let figures = compute_sale(dec(120, 0), Some(Decimal::ZERO), None, false, PaymentMethodKind::Cash);
        assert_eq!(figures.sale_price, dec(120, 0));
        assert_eq!(figures.profit, Decimal::ZERO);
    }

    #[test]
    fn discount_rounds_half_away_from_zero() {
        // 3% de 0.50 = 0.015
        let settlement = settle(dec(50, 2), None, true, PaymentMethodKind::FinancedTransfer);
        assert_eq!(settlement.discount, dec(2, 2));
    }
}

// src/services/pricing.rs
//
// Motor de precificação: funções puras, sem I/O.
// Arredondamento comercial (meio para cima) em 2 casas, aplicado uma vez por linha,
// para que as linhas impressas sempre somem exatamente o subtotal impresso.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    pricing::{ItemCategory, LineItem, LineItemInput, PricingSummary},
    product::Product,
};

pub const DECIMAL_PLACES: u32 = 2;
pub const DEFAULT_UNIT: &str = "Stück";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFieldError {
    Negative,
    Required,
    UnknownProduct,
    DuplicateId,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("posição {index}: campo '{field}' inválido ({reason:?})")]
    InvalidItem { index: usize, field: &'static str, reason: ItemFieldError },

    #[error("alíquota fora do intervalo 0..=100: {0}")]
    TaxRateOutOfRange(Decimal),

    #[error("sinal não pode ser negativo")]
    NegativeDeposit,

    #[error("sinal {deposit} maior que o total {total}")]
    DepositExceedsTotal { deposit: Decimal, total: Decimal },

    #[error("sinal sem data de vencimento")]
    DepositDueDateMissing,

    #[error("campo '{0}' com mais de 2 casas decimais")]
    TooManyDecimals(&'static str),

    #[error("total acima do máximo armazenável")]
    TotalTooLarge,
}

impl PricingError {
    /// Caminho do campo no payload (ex: "items[2].quantity").
    pub fn field_path(&self) -> String {
        match self {
            PricingError::InvalidItem { index, field, .. } => format!("items[{}].{}", index, field),
            PricingError::TaxRateOutOfRange(_) => "taxRate".to_string(),
            PricingError::NegativeDeposit | PricingError::DepositExceedsTotal { .. } => {
                "depositAmount".to_string()
            }
            PricingError::DepositDueDateMissing => "depositDueDate".to_string(),
            PricingError::TooManyDecimals(field) => field.to_string(),
            PricingError::TotalTooLarge => "items".to_string(),
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            PricingError::InvalidItem { reason, .. } => match reason {
                ItemFieldError::Negative => "validation.negative",
                ItemFieldError::Required => "validation.required",
                ItemFieldError::UnknownProduct => "validation.unknown_product",
                ItemFieldError::DuplicateId => "validation.duplicate_id",
                ItemFieldError::TooLarge => "validation.amount_too_large",
            },
            PricingError::TaxRateOutOfRange(_) => "validation.tax_rate_range",
            PricingError::NegativeDeposit => "validation.negative",
            PricingError::DepositExceedsTotal { .. } => "validation.deposit_exceeds_total",
            PricingError::DepositDueDateMissing => "validation.deposit_due_date",
            PricingError::TooManyDecimals(_) => "validation.decimal_places",
            PricingError::TotalTooLarge => "validation.amount_too_large",
        }
    }

    pub fn message_args(&self) -> Vec<(&'static str, String)> {
        match self {
            PricingError::TaxRateOutOfRange(value) => vec![("value", value.to_string())],
            PricingError::DepositExceedsTotal { deposit, total } => {
                vec![("deposit", deposit.to_string()), ("total", total.to_string())]
            }
            PricingError::InvalidItem { reason: ItemFieldError::TooLarge, .. } | PricingError::TotalTooLarge => {
                vec![("max", max_amount().to_string())]
            }
            _ => Vec::new(),
        }
    }
}

/// Maior valor que cabe numa coluna NUMERIC(12,2).
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, DECIMAL_PLACES)
}

#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Calcula subtotal, imposto, total e sinal a partir das posições.
///
/// - `subtotal` é a soma dos totais de linha JÁ arredondados
/// - `tax_amount = round2(subtotal * tax_rate / 100)`
/// - `total = subtotal + tax_amount`
///
/// Entradas inválidas geram erro apontando o campo. Nada é corrigido em silêncio.
pub fn compute_summary(
    items: &[LineItem],
    tax_rate: Decimal,
    deposit_amount: Option<Decimal>,
    deposit_due_date: Option<NaiveDate>,
) -> Result<PricingSummary, PricingError> {
    validate_tax_rate(tax_rate)?;

    let max = max_amount();
    let mut subtotal = Decimal::ZERO;
    for (index, item) in items.iter().enumerate() {
        if is_negative(item.quantity) {
            return Err(PricingError::InvalidItem { index, field: "quantity", reason: ItemFieldError::Negative });
        }
        if is_negative(item.unit_price) {
            return Err(PricingError::InvalidItem { index, field: "unitPrice", reason: ItemFieldError::Negative });
        }
        if item.unit_price > max {
            return Err(PricingError::InvalidItem { index, field: "unitPrice", reason: ItemFieldError::TooLarge });
        }

        let line_total = item
            .quantity
            .checked_mul(item.unit_price)
            .map(round2)
            .filter(|total| *total <= max)
            .ok_or(PricingError::InvalidItem { index, field: "quantity", reason: ItemFieldError::TooLarge })?;

        subtotal = subtotal
            .checked_add(line_total)
            .filter(|sum| *sum <= max)
            .ok_or(PricingError::TotalTooLarge)?;
    }

    let tax_amount = subtotal
        .checked_mul(tax_rate)
        .map(|v| round2(v / Decimal::ONE_HUNDRED))
        .ok_or(PricingError::TotalTooLarge)?;
    let total = subtotal
        .checked_add(tax_amount)
        .filter(|sum| *sum <= max)
        .ok_or(PricingError::TotalTooLarge)?;

    let deposit_amount = match deposit_amount {
        Some(deposit) if is_negative(deposit) => return Err(PricingError::NegativeDeposit),
        Some(deposit) if has_extra_decimals(deposit) => {
            return Err(PricingError::TooManyDecimals("depositAmount"));
        }
        Some(deposit) if deposit > total => {
            return Err(PricingError::DepositExceedsTotal { deposit, total });
        }
        Some(deposit) if deposit > Decimal::ZERO && deposit_due_date.is_none() => {
            return Err(PricingError::DepositDueDateMissing);
        }
        Some(deposit) => Some(round2(deposit)),
        None => None,
    };

    Ok(PricingSummary {
        subtotal,
        tax_rate,
        tax_amount,
        total,
        deposit_amount,
        deposit_due_date,
    })
}

/// Alíquota em pontos percentuais, 0 a 100 inclusive, no máximo 2 casas (NUMERIC(5,2)).
pub fn validate_tax_rate(tax_rate: Decimal) -> Result<(), PricingError> {
    if is_negative(tax_rate) || tax_rate > Decimal::ONE_HUNDRED {
        return Err(PricingError::TaxRateOutOfRange(tax_rate));
    }
    if has_extra_decimals(tax_rate) {
        return Err(PricingError::TooManyDecimals("taxRate"));
    }
    Ok(())
}

// 19.50 passa, 19.005 não
fn has_extra_decimals(value: Decimal) -> bool {
    value.normalize().scale() > DECIMAL_PLACES
}

// -0 conta como zero
fn is_negative(value: Decimal) -> bool {
    value < Decimal::ZERO
}

/// Monta as posições definitivas a partir do payload, completando com o catálogo
/// quando a linha referencia um produto.
pub fn build_line_items(
    inputs: &[LineItemInput],
    catalog: &HashMap<Uuid, Product>,
) -> Result<Vec<LineItem>, PricingError> {
    let mut seen_ids = HashSet::new();
    let mut items = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let product = match input.product_id {
            Some(product_id) => Some(catalog.get(&product_id).ok_or(PricingError::InvalidItem {
                index,
                field: "productId",
                reason: ItemFieldError::UnknownProduct,
            })?),
            None => None,
        };

        let name = non_blank(input.name.as_deref())
            .or_else(|| product.map(|p| p.name.clone()))
            .ok_or(PricingError::InvalidItem { index, field: "name", reason: ItemFieldError::Required })?;

        let unit_price = input
            .unit_price
            .or_else(|| product.map(|p| p.price))
            .ok_or(PricingError::InvalidItem { index, field: "unitPrice", reason: ItemFieldError::Required })?;

        let id = input.id.unwrap_or_else(Uuid::new_v4);
        if !seen_ids.insert(id) {
            return Err(PricingError::InvalidItem { index, field: "id", reason: ItemFieldError::DuplicateId });
        }

        items.push(LineItem {
            id,
            product_id: input.product_id,
            category: input
                .category
                .or_else(|| product.map(|p| p.category))
                .unwrap_or(ItemCategory::Other),
            name,
            description: non_blank(input.description.as_deref())
                .or_else(|| product.and_then(|p| p.description.clone())),
            quantity: input.quantity,
            unit: non_blank(input.unit.as_deref())
                .or_else(|| product.map(|p| p.unit.clone()))
                .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
            unit_price,
        });
    }

    Ok(items)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(category: ItemCategory, quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            product_id: None,
            category,
            name: "Posição".to_string(),
            description: None,
            quantity: dec(quantity),
            unit: "Stück".to_string(),
            unit_price: dec(unit_price),
        }
    }

    fn due() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 6, 1)
    }

    #[test]
    fn catering_scenario_totals() {
        let items = vec![
            item(ItemCategory::Food, "2", "45.00"),
            item(ItemCategory::Other, "1", "200.00"),
        ];

        let summary = compute_summary(&items, dec("19"), None, None).unwrap();

        assert_eq!(summary.subtotal, dec("290.00"));
        assert_eq!(summary.tax_amount, dec("55.10"));
        assert_eq!(summary.total, dec("345.10"));
        assert_eq!(summary.deposit_amount, None);
    }

    #[test]
    fn rounds_half_up_per_line_before_summing() {
        // 3 x 0.335 = 1.005 -> 1.01 por linha; sem arredondar por linha daria 2.01 no total
        let items = vec![
            item(ItemCategory::Food, "3", "0.335"),
            item(ItemCategory::Food, "3", "0.335"),
        ];

        let summary = compute_summary(&items, dec("0"), None, None).unwrap();

        assert_eq!(items[0].total_price(), dec("1.01"));
        assert_eq!(summary.subtotal, dec("2.02"));
    }

    #[test]
    fn line_totals_foot_to_subtotal_and_total() {
        let items = vec![
            item(ItemCategory::Food, "1.5", "12.99"),
            item(ItemCategory::Beverage, "7", "3.333"),
            item(ItemCategory::Staff, "4.25", "31.5"),
            item(ItemCategory::Equipment, "0.333", "9.99"),
        ];

        for rate in ["0", "7", "19", "16.5", "100"] {
            let summary = compute_summary(&items, dec(rate), None, None).unwrap();
            let footed: Decimal = items.iter().map(LineItem::total_price).sum();

            assert_eq!(footed, summary.subtotal);
            assert_eq!(summary.subtotal + summary.tax_amount, summary.total);
        }
    }

    #[test]
    fn recomputation_is_idempotent() {
        let items = vec![
            item(ItemCategory::Food, "2.5", "17.45"),
            item(ItemCategory::Staff, "6", "28.00"),
        ];

        let first = compute_summary(&items, dec("19"), Some(dec("50")), due()).unwrap();
        let second = compute_summary(&items, dec("19"), Some(dec("50")), due()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.subtotal.to_string(), second.subtotal.to_string());
        assert_eq!(first.total.to_string(), second.total.to_string());
    }

    #[test]
    fn raising_quantity_or_price_never_lowers_totals() {
        let base = vec![
            item(ItemCategory::Food, "3", "9.99"),
            item(ItemCategory::Beverage, "12", "2.49"),
        ];
        let before = compute_summary(&base, dec("19"), None, None).unwrap();

        for step in ["0.001", "0.01", "1", "10"] {
            let mut more_qty = base.clone();
            more_qty[1].quantity += dec(step);
            let mut more_price = base.clone();
            more_price[0].unit_price += dec(step);

            for changed in [more_qty, more_price] {
                let after = compute_summary(&changed, dec("19"), None, None).unwrap();
                assert!(after.subtotal >= before.subtotal);
                assert!(after.total >= before.total);
            }
        }
    }

    #[test]
    fn empty_items_yield_zero_summary() {
        let summary = compute_summary(&[], dec("19"), None, None).unwrap();

        assert!(summary.subtotal.is_zero());
        assert!(summary.tax_amount.is_zero());
        assert!(summary.total.is_zero());
    }

    #[test]
    fn rejects_negative_fields_with_item_index() {
        let items = vec![
            item(ItemCategory::Food, "1", "10"),
            item(ItemCategory::Food, "-1", "10"),
        ];
        let err = compute_summary(&items, dec("19"), None, None).unwrap_err();
        assert_eq!(
            err,
            PricingError::InvalidItem { index: 1, field: "quantity", reason: ItemFieldError::Negative }
        );
        assert_eq!(err.field_path(), "items[1].quantity");

        let items = vec![item(ItemCategory::Food, "1", "-0.01")];
        let err = compute_summary(&items, dec("19"), None, None).unwrap_err();
        assert_eq!(err.field_path(), "items[0].unitPrice");
    }

    #[test]
    fn rejects_tax_rate_outside_percentage_range() {
        let items = vec![item(ItemCategory::Food, "1", "10")];

        assert_eq!(
            compute_summary(&items, dec("100.01"), None, None).unwrap_err(),
            PricingError::TaxRateOutOfRange(dec("100.01"))
        );
        assert!(compute_summary(&items, dec("-1"), None, None).is_err());
        assert!(compute_summary(&items, dec("100"), None, None).is_ok());
        assert!(compute_summary(&items, dec("0"), None, None).is_ok());
    }

    #[test]
    fn deposit_may_equal_but_not_exceed_total() {
        let items = vec![item(ItemCategory::Food, "2", "45.00")];
        // 90.00 + 17.10 = 107.10
        let ok = compute_summary(&items, dec("19"), Some(dec("107.10")), due()).unwrap();
        assert_eq!(ok.deposit_amount, Some(dec("107.10")));
        assert!(ok.has_deposit());

        let err = compute_summary(&items, dec("19"), Some(dec("107.11")), due()).unwrap_err();
        assert!(matches!(err, PricingError::DepositExceedsTotal { .. }));
    }

    #[test]
    fn positive_deposit_requires_due_date() {
        let items = vec![item(ItemCategory::Food, "2", "45.00")];

        assert_eq!(
            compute_summary(&items, dec("19"), Some(dec("10")), None).unwrap_err(),
            PricingError::DepositDueDateMissing
        );
        let zero = compute_summary(&items, dec("19"), Some(Decimal::ZERO), None).unwrap();
        assert!(!zero.has_deposit());
        assert_eq!(
            compute_summary(&items, dec("19"), Some(dec("-5")), due()).unwrap_err(),
            PricingError::NegativeDeposit
        );
    }

    #[test]
    fn huge_amounts_are_rejected_instead_of_overflowing() {
        let items = vec![item(ItemCategory::Food, "1000000000000000", "1000000000000000")];
        let err = compute_summary(&items, dec("19"), None, None).unwrap_err();
        assert_eq!(err.field_path(), "items[0].quantity");
        assert_eq!(err.message_key(), "validation.amount_too_large");

        let items = vec![item(ItemCategory::Food, "1", "10000000000")];
        let err = compute_summary(&items, dec("0"), None, None).unwrap_err();
        assert_eq!(err.field_path(), "items[0].unitPrice");

        // cada linha cabe, a soma não
        let items = vec![
            item(ItemCategory::Food, "1", "9000000000"),
            item(ItemCategory::Food, "1", "9000000000"),
        ];
        assert_eq!(compute_summary(&items, dec("0"), None, None).unwrap_err(), PricingError::TotalTooLarge);

        // subtotal cabe, o imposto empurra o total para fora
        let items = vec![item(ItemCategory::Food, "1", "9000000000")];
        assert_eq!(compute_summary(&items, dec("19"), None, None).unwrap_err(), PricingError::TotalTooLarge);
    }

    #[test]
    fn largest_storable_total_is_accepted() {
        let items = vec![item(ItemCategory::Food, "1", "9999999999.99")];
        let summary = compute_summary(&items, dec("0"), None, None).unwrap();
        assert_eq!(summary.total, max_amount());
    }

    #[test]
    fn tax_rate_and_deposit_keep_two_decimal_places() {
        let items = vec![item(ItemCategory::Food, "2", "45.00")];

        let err = compute_summary(&items, dec("19.005"), None, None).unwrap_err();
        assert_eq!(err, PricingError::TooManyDecimals("taxRate"));
        assert_eq!(err.field_path(), "taxRate");
        assert!(compute_summary(&items, dec("19.50"), None, None).is_ok());
        assert!(compute_summary(&items, dec("7.000"), None, None).is_ok());

        let err = compute_summary(&items, dec("19"), Some(dec("10.005")), due()).unwrap_err();
        assert_eq!(err.field_path(), "depositAmount");
        assert_eq!(err.message_key(), "validation.decimal_places");
    }

    fn product(name: &str, price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some("Aus dem Katalog".to_string()),
            category: ItemCategory::Beverage,
            unit: "Liter".to_string(),
            price: dec(price),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(quantity: &str) -> LineItemInput {
        LineItemInput {
            id: None,
            product_id: None,
            category: None,
            name: None,
            description: None,
            quantity: dec(quantity),
            unit: None,
            unit_price: None,
        }
    }

    #[test]
    fn fills_missing_fields_from_catalog() {
        let apfelschorle = product("Apfelschorle", "4.20");
        let catalog = HashMap::from([(apfelschorle.id, apfelschorle.clone())]);

        let mut from_catalog = input("10");
        from_catalog.product_id = Some(apfelschorle.id);
        let mut overridden = from_catalog.clone();
        overridden.unit_price = Some(dec("3.90"));
        overridden.name = Some("Apfelschorle (Sonderpreis)".to_string());

        let items = build_line_items(&[from_catalog, overridden], &catalog).unwrap();

        assert_eq!(items[0].name, "Apfelschorle");
        assert_eq!(items[0].unit_price, dec("4.20"));
        assert_eq!(items[0].category, ItemCategory::Beverage);
        assert_eq!(items[0].unit, "Liter");
        assert_eq!(items[1].unit_price, dec("3.90"));
        assert_eq!(items[1].name, "Apfelschorle (Sonderpreis)");
    }

    #[test]
    fn free_lines_need_name_and_price() {
        let catalog = HashMap::new();

        let mut no_name = input("1");
        no_name.unit_price = Some(dec("10"));
        let err = build_line_items(&[no_name], &catalog).unwrap_err();
        assert_eq!(err.field_path(), "items[0].name");

        let mut no_price = input("1");
        no_price.name = Some("Servicepauschale".to_string());
        let err = build_line_items(&[no_price.clone()], &catalog).unwrap_err();
        assert_eq!(err.field_path(), "items[0].unitPrice");

        no_price.unit_price = Some(dec("150"));
        let items = build_line_items(&[no_price], &catalog).unwrap();
        assert_eq!(items[0].category, ItemCategory::Other);
        assert_eq!(items[0].unit, DEFAULT_UNIT);
    }

    #[test]
    fn rejects_unknown_products_and_duplicate_ids() {
        let catalog = HashMap::new();
        let mut unknown = input("1");
        unknown.product_id = Some(Uuid::new_v4());
        assert_eq!(
            build_line_items(&[unknown], &catalog).unwrap_err().field_path(),
            "items[0].productId"
        );

        let id = Uuid::new_v4();
        let mut a = input("1");
        a.id = Some(id);
        a.name = Some("A".to_string());
        a.unit_price = Some(dec("1"));
        let mut b = a.clone();
        b.name = Some("B".to_string());
        let err = build_line_items(&[a, b], &catalog).unwrap_err();
        assert_eq!(err, PricingError::InvalidItem { index: 1, field: "id", reason: ItemFieldError::DuplicateId });
    }
}

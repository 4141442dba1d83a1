// src/services/document_service.rs
//
// Monta a visão do documento de orçamento. A mesma visão alimenta a prévia JSON,
// a página de impressão (HTML) e o PDF. Nada aqui recalcula preço: o resumo gravado
// é apenas formatado.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    db::{ClientRepository, QuotationRepository, SettingsRepository},
    models::{
        client::Client,
        pricing::{ItemCategory, LineItem},
        quotation::{Quotation, QuotationStatus},
        settings::CompanySettings,
    },
    services::{document_render, pricing::round2},
};

// Limites do formato EPC (GiroCode)
const EPC_MAX_NAME: usize = 70;
const EPC_MAX_REMITTANCE: usize = 140;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub lang: String,
    pub title: String,
    pub number: String,
    pub status: QuotationStatus,
    pub status_label: String,
    pub company: CompanyBlock,
    pub client: ClientBlock,
    /// Pares rótulo/valor com os dados do orçamento e do evento
    pub details: Vec<LabeledValue>,
    pub columns: ColumnLabels,
    pub sections: Vec<DocumentSection>,
    /// Presente só quando não há posições
    pub empty_message: Option<String>,
    pub totals: Vec<TotalLine>,
    pub deposit: Option<TotalLine>,
    pub notes: Option<LabeledValue>,
    pub payment: Option<PaymentBlock>,
    /// Modelo com "{page}" para o cabeçalho das páginas seguintes
    pub page_label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBlock {
    pub name: Option<String>,
    pub lines: Vec<String>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientBlock {
    pub label: String,
    pub name: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLabels {
    pub position: String,
    pub item: String,
    pub quantity: String,
    pub unit: String,
    pub unit_price: String,
    pub total: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSection {
    pub category: ItemCategory,
    pub title: String,
    pub rows: Vec<DocumentRow>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRow {
    pub position: usize,
    pub name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub unit: String,
    pub unit_price: String,
    pub total: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalLine {
    pub label: String,
    pub amount: String,
    pub emphasis: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBlock {
    pub label: String,
    pub beneficiary: String,
    pub iban: String,
    pub bic: Option<String>,
    pub bank_name: Option<String>,
    pub amount: String,
    /// Conteúdo do QR Code (EPC069-12)
    pub qr_payload: String,
}

impl DocumentView {
    pub fn build(
        quotation: &Quotation,
        client: &Client,
        settings: &CompanySettings,
        lang: &str,
        i18n: &I18nStore,
        now: DateTime<Utc>,
    ) -> Self {
        let lang = i18n.resolve_lang(lang).to_string();
        let t = |key: &str| i18n.translate(&lang, key);
        let pricing = &quotation.pricing;
        let status = quotation.effective_status(now);

        let mut details = vec![
            LabeledValue { label: t("document.number"), value: quotation.number.clone() },
            LabeledValue { label: t("document.date"), value: format_date(quotation.created_at.date_naive(), &lang) },
            LabeledValue { label: t("document.valid_until"), value: format_date(quotation.valid_until, &lang) },
            LabeledValue { label: t("document.event"), value: quotation.event_name.clone() },
        ];
        if let Some(date) = quotation.event_date {
            details.push(LabeledValue { label: t("document.event_date"), value: format_date(date, &lang) });
        }
        if let Some(time) = format_time_range(quotation.start_time, quotation.end_time) {
            details.push(LabeledValue { label: t("document.time"), value: time });
        }
        if let Some(location) = join_non_empty(&[quotation.location.as_deref(), quotation.address.as_deref()], ", ") {
            details.push(LabeledValue { label: t("document.location"), value: location });
        }
        if let Some(guests) = quotation.guest_count {
            details.push(LabeledValue { label: t("document.guests"), value: guests.to_string() });
        }
        details.push(LabeledValue { label: t("document.fulfilment"), value: t(quotation.fulfilment.label_key()) });

        let sections = group_sections(&quotation.items)
            .into_iter()
            .map(|(category, items)| DocumentSection {
                category,
                title: t(&category.label_key()),
                rows: items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| DocumentRow {
                        position: index + 1,
                        name: item.name.clone(),
                        description: item.description.clone(),
                        quantity: format_number(item.quantity, &lang),
                        unit: item.unit.clone(),
                        unit_price: format_unit_price(item.unit_price, &lang),
                        total: format_money(item.total_price(), &lang),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        let empty_message = sections.is_empty().then(|| t("document.no_items"));

        let totals = vec![
            TotalLine { label: t("document.subtotal"), amount: format_money(pricing.subtotal, &lang), emphasis: false },
            TotalLine {
                label: i18n.translate_with(&lang, "document.tax_line", &[("rate", format_number(pricing.tax_rate, &lang))]),
                amount: format_money(pricing.tax_amount, &lang),
                emphasis: false,
            },
            TotalLine { label: t("document.total"), amount: format_money(pricing.total, &lang), emphasis: true },
        ];

        // Linha de sinal só com valor positivo
        let deposit = match (pricing.has_deposit(), pricing.deposit_amount) {
            (true, Some(amount)) => Some(TotalLine {
                label: i18n.translate_with(
                    &lang,
                    "document.deposit_line",
                    &[("date", pricing.deposit_due_date.map(|d| format_date(d, &lang)).unwrap_or_default())],
                ),
                amount: format_money(amount, &lang),
                emphasis: false,
            }),
            _ => None,
        };

        let payable = if pricing.has_deposit() { pricing.deposit_amount.unwrap_or(pricing.total) } else { pricing.total };

        Self {
            title: t("document.title"),
            number: quotation.number.clone(),
            status,
            status_label: t(&status.label_key()),
            company: company_block(settings),
            client: ClientBlock { label: t("document.client"), name: client.display_name(), lines: client_lines(client) },
            details,
            columns: ColumnLabels {
                position: t("document.col_position"),
                item: t("document.col_item"),
                quantity: t("document.col_quantity"),
                unit: t("document.col_unit"),
                unit_price: t("document.col_unit_price"),
                total: t("document.col_total"),
            },
            sections,
            empty_message,
            totals,
            deposit,
            notes: quotation
                .notes
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .map(|n| LabeledValue { label: t("document.notes"), value: n.to_string() }),
            payment: payment_block(settings, payable, &quotation.number, &lang, &t("document.payment_qr")),
            page_label: t("document.page"),
            lang,
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

// Agrupa por categoria na ordem da primeira aparição, preservando a ordem das posições.
fn group_sections(items: &[LineItem]) -> Vec<(ItemCategory, Vec<&LineItem>)> {
    let mut sections: Vec<(ItemCategory, Vec<&LineItem>)> = Vec::new();
    for item in items {
        match sections.iter_mut().find(|(category, _)| *category == item.category) {
            Some((_, rows)) => rows.push(item),
            None => sections.push((item.category, vec![item])),
        }
    }
    sections
}

fn company_block(settings: &CompanySettings) -> CompanyBlock {
    let mut lines = Vec::new();
    lines.extend(settings.address.clone());
    if let Some(contact) = join_non_empty(&[settings.phone.as_deref(), settings.email.as_deref()], " · ") {
        lines.push(contact);
    }
    lines.extend(settings.tax_id.clone());

    CompanyBlock {
        name: settings.company_name.clone(),
        lines: lines.into_iter().filter(|l| !l.trim().is_empty()).collect(),
        footer: settings.footer_text.clone(),
    }
}

fn client_lines(client: &Client) -> Vec<String> {
    let mut lines = client.address_lines();
    lines.extend(client.email.clone());
    lines.extend(client.phone.clone());
    lines
}

fn payment_block(
    settings: &CompanySettings,
    amount: Decimal,
    remittance: &str,
    lang: &str,
    label: &str,
) -> Option<PaymentBlock> {
    let iban = settings.normalized_iban()?;
    let beneficiary = settings.company_name.clone().filter(|n| !n.trim().is_empty())?;
    if amount <= Decimal::ZERO {
        return None;
    }

    Some(PaymentBlock {
        label: label.to_string(),
        qr_payload: epc_qr_payload(&beneficiary, &iban, settings.bic.as_deref(), amount, remittance),
        beneficiary,
        iban,
        bic: settings.bic.clone(),
        bank_name: settings.bank_name.clone(),
        amount: format_money(amount, lang),
    })
}

/// Conteúdo de um QR de transferência SEPA (EPC069-12, versão 002).
pub fn epc_qr_payload(beneficiary: &str, iban: &str, bic: Option<&str>, amount: Decimal, remittance: &str) -> String {
    let mut amount = round2(amount);
    amount.rescale(2);
    let name = truncate(beneficiary.trim(), EPC_MAX_NAME);
    let amount = format!("EUR{}", amount);
    let remittance = truncate(remittance, EPC_MAX_REMITTANCE);

    let lines: [&str; 11] = [
        "BCD",
        "002",
        "1",
        "SCT",
        bic.unwrap_or("").trim(),
        &name,
        iban,
        &amount,
        "",
        "",
        &remittance,
    ];
    lines.join("\n")
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn join_non_empty(parts: &[Option<&str>], separator: &str) -> Option<String> {
    let joined = parts
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    (!joined.is_empty()).then_some(joined)
}

// --- Formatação por idioma ---

/// Valor monetário com 2 casas: "1.234,56 €" (de) ou "€1,234.56" (en).
pub fn format_money(amount: Decimal, lang: &str) -> String {
    format_currency(round2(amount), 2, lang)
}

// Preço unitário pode ter mais casas (ex: 0,335 €). Nunca menos que 2.
pub fn format_unit_price(amount: Decimal, lang: &str) -> String {
    let places = amount.normalize().scale().max(2);
    format_currency(amount, places, lang)
}

fn format_currency(amount: Decimal, places: u32, lang: &str) -> String {
    let negative = amount.is_sign_negative() && !amount.is_zero();
    let mut value = amount.abs();
    value.rescale(places);
    let text = value.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let sign = if negative { "-" } else { "" };

    match lang {
        "en" => format!("{}€{}.{}", sign, group_thousands(int_part, ','), frac_part),
        _ => format!("{}{},{} €", sign, group_thousands(int_part, '.'), frac_part),
    }
}

fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Quantidades e alíquotas sem zeros à direita: "2", "1,5" (de) / "1.5" (en).
pub fn format_number(value: Decimal, lang: &str) -> String {
    let text = value.normalize().to_string();
    match lang {
        "en" => text,
        _ => text.replace('.', ","),
    }
}

pub fn format_date(date: NaiveDate, lang: &str) -> String {
    match lang {
        "en" => date.format("%Y-%m-%d").to_string(),
        _ => date.format("%d.%m.%Y").to_string(),
    }
}

fn format_time_range(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Option<String> {
    match (start, end) {
        (Some(s), Some(e)) => Some(format!("{} – {}", s.format("%H:%M"), e.format("%H:%M"))),
        (Some(s), None) => Some(s.format("%H:%M").to_string()),
        (None, Some(e)) => Some(format!("– {}", e.format("%H:%M"))),
        (None, None) => None,
    }
}

// --- Serviço ---

#[derive(Clone)]
pub struct DocumentService {
    quotation_repo: QuotationRepository,
    client_repo: ClientRepository,
    settings_repo: SettingsRepository,
    i18n: Arc<I18nStore>,
    font_dir: String,
    font_family: String,
    pool: sqlx::PgPool,
}

impl DocumentService {
    pub fn new(
        quotation_repo: QuotationRepository,
        client_repo: ClientRepository,
        settings_repo: SettingsRepository,
        i18n: Arc<I18nStore>,
        font_dir: String,
        font_family: String,
        pool: sqlx::PgPool,
    ) -> Self {
        Self { quotation_repo, client_repo, settings_repo, i18n, font_dir, font_family, pool }
    }

    pub async fn view(&self, quotation_id: Uuid, lang: &str, now: DateTime<Utc>) -> Result<DocumentView, AppError> {
        let quotation = self
            .quotation_repo
            .find_by_id(&self.pool, quotation_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.quotation".to_string()))?;
        let client = self
            .client_repo
            .find_by_id(&self.pool, quotation.client_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("resource.client".to_string()))?;
        let settings = self.settings_repo.get().await?;

        Ok(DocumentView::build(&quotation, &client, &settings, lang, &self.i18n, now))
    }

    pub async fn html(&self, quotation_id: Uuid, lang: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let view = self.view(quotation_id, lang, now).await?;
        document_render::render_html(&view)
    }

    /// Renderiza o PDF fora do runtime async. Devolve (nome do arquivo, bytes).
    pub async fn pdf(&self, quotation_id: Uuid, lang: &str, now: DateTime<Utc>) -> Result<(String, Vec<u8>), AppError> {
        let view = self.view(quotation_id, lang, now).await?;
        let filename = format!("{}.pdf", view.number);
        tracing::info!("Gerando PDF {} com {} posições", view.number, view.item_count());
        let font_dir = self.font_dir.clone();
        let font_family = self.font_family.clone();

        let bytes = tokio::task::spawn_blocking(move || document_render::render_pdf(&view, &font_dir, &font_family))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização do PDF: {}", e))??;

        Ok((filename, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{pricing::PricingSummary, quotation::FulfilmentMode};
    use crate::services::pricing::compute_summary;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(category: ItemCategory, name: &str, quantity: &str, unit_price: &str) -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            product_id: None,
            category,
            name: name.to_string(),
            description: None,
            quantity: dec(quantity),
            unit: "Stück".to_string(),
            unit_price: dec(unit_price),
        }
    }

    fn client() -> Client {
        Client {
            id: Uuid::new_v4(),
            name: "Anna Schmidt".to_string(),
            company: Some("Schmidt & Partner GmbH".to_string()),
            email: Some("anna@schmidt-partner.de".to_string()),
            phone: None,
            street: Some("Hauptstraße 12".to_string()),
            postal_code: Some("80331".to_string()),
            city: Some("München".to_string()),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn quotation(items: Vec<LineItem>, deposit: Option<(&str, NaiveDate)>) -> Quotation {
        let pricing = compute_summary(&items, dec("19"), deposit.map(|d| dec(d.0)), deposit.map(|d| d.1)).unwrap();
        Quotation {
            id: Uuid::new_v4(),
            number: "ANG-2024-001".to_string(),
            client_id: Uuid::new_v4(),
            event_name: "Sommerfest".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 7, 12),
            start_time: NaiveTime::from_hms_opt(18, 0, 0),
            end_time: NaiveTime::from_hms_opt(23, 0, 0),
            location: Some("Biergarten am See".to_string()),
            address: None,
            guest_count: Some(80),
            fulfilment: FulfilmentMode::DeliveryWithStaff,
            notes: None,
            items,
            pricing,
            status: QuotationStatus::Draft,
            valid_until: (Utc::now() + chrono::Duration::days(30)).date_naive(),
            version: 1,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn scenario_items() -> Vec<LineItem> {
        vec![
            item(ItemCategory::Food, "Fingerfood-Platte", "2", "45.00"),
            item(ItemCategory::Other, "Lieferpauschale", "1", "200.00"),
        ]
    }

    fn i18n() -> I18nStore {
        I18nStore::load().unwrap()
    }

    #[test]
    fn scenario_renders_german_totals() {
        let q = quotation(scenario_items(), None);

        let view = DocumentView::build(&q, &client(), &CompanySettings::default(), "de", &i18n(), Utc::now());

        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[0].rows[0].total, "90,00 €");
        assert_eq!(view.totals[0].amount, "290,00 €");
        assert_eq!(view.totals[1].label, "zzgl. MwSt. 19 %");
        assert_eq!(view.totals[1].amount, "55,10 €");
        assert_eq!(view.totals[2].amount, "345,10 €");
        assert!(view.totals[2].emphasis);
        assert!(view.deposit.is_none());
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn english_uses_english_separators_and_dates() {
        let q = quotation(scenario_items(), None);

        let view = DocumentView::build(&q, &client(), &CompanySettings::default(), "en", &i18n(), Utc::now());

        assert_eq!(view.totals[2].amount, "€345.10");
        let event_date = view.details.iter().find(|d| d.label == "Event date").unwrap();
        assert_eq!(event_date.value, "2024-07-12");
    }

    #[test]
    fn sections_follow_first_appearance_and_restart_positions() {
        let items = vec![
            item(ItemCategory::Beverage, "Apfelschorle", "20", "3.50"),
            item(ItemCategory::Food, "Antipasti", "4", "39.90"),
            item(ItemCategory::Beverage, "Wasser", "30", "2.00"),
            item(ItemCategory::Staff, "Servicekraft", "5", "35.00"),
        ];
        let view = DocumentView::build(&quotation(items, None), &client(), &CompanySettings::default(), "de", &i18n(), Utc::now());

        let order: Vec<_> = view.sections.iter().map(|s| s.category).collect();
        assert_eq!(order, vec![ItemCategory::Beverage, ItemCategory::Food, ItemCategory::Staff]);
        assert_eq!(view.sections[0].title, "Getränke");
        let beverages: Vec<_> = view.sections[0].rows.iter().map(|r| (r.position, r.name.as_str())).collect();
        assert_eq!(beverages, vec![(1, "Apfelschorle"), (2, "Wasser")]);
        assert_eq!(view.sections[1].rows[0].position, 1);
        assert_eq!(view.item_count(), 4);
    }

    #[test]
    fn empty_quotation_renders_placeholder_and_zero_totals() {
        let view = DocumentView::build(&quotation(Vec::new(), None), &client(), &CompanySettings::default(), "de", &i18n(), Utc::now());

        assert!(view.sections.is_empty());
        assert_eq!(view.empty_message.as_deref(), Some("Dieses Angebot enthält noch keine Positionen."));
        assert_eq!(view.totals[2].amount, "0,00 €");
    }

    #[test]
    fn deposit_line_appears_only_for_positive_deposit() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let with = DocumentView::build(
            &quotation(scenario_items(), Some(("100", due))),
            &client(),
            &CompanySettings::default(),
            "de",
            &i18n(),
            Utc::now(),
        );
        let zero = DocumentView::build(
            &quotation(scenario_items(), Some(("0", due))),
            &client(),
            &CompanySettings::default(),
            "de",
            &i18n(),
            Utc::now(),
        );

        let deposit = with.deposit.expect("linha de sinal");
        assert_eq!(deposit.label, "Anzahlung fällig am 01.06.2024");
        assert_eq!(deposit.amount, "100,00 €");
        assert!(zero.deposit.is_none());
    }

    #[test]
    fn view_never_recomputes_stored_pricing() {
        let mut q = quotation(scenario_items(), None);
        // Valor gravado diferente do que as posições dariam: a visão mostra o gravado
        q.pricing = PricingSummary { total: dec("999.99"), ..q.pricing.clone() };

        let view = DocumentView::build(&q, &client(), &CompanySettings::default(), "de", &i18n(), Utc::now());

        assert_eq!(view.totals[2].amount, "999,99 €");
    }

    #[test]
    fn expired_quotation_shows_effective_status() {
        let mut q = quotation(scenario_items(), None);
        q.valid_until = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let view = DocumentView::build(&q, &client(), &CompanySettings::default(), "de", &i18n(), Utc::now());

        assert_eq!(view.status, QuotationStatus::Expired);
        assert_eq!(view.status_label, "Abgelaufen");
    }

    #[test]
    fn money_formatting_groups_thousands() {
        assert_eq!(format_money(dec("1234.56"), "de"), "1.234,56 €");
        assert_eq!(format_money(dec("1234.56"), "en"), "€1,234.56");
        assert_eq!(format_money(dec("1234567.5"), "de"), "1.234.567,50 €");
        assert_eq!(format_money(dec("999"), "en"), "€999.00");
        assert_eq!(format_money(dec("0.005"), "de"), "0,01 €");
        assert_eq!(format_money(dec("-12.3"), "de"), "-12,30 €");
    }

    #[test]
    fn unit_prices_keep_extra_precision() {
        assert_eq!(format_unit_price(dec("0.335"), "de"), "0,335 €");
        assert_eq!(format_unit_price(dec("45"), "de"), "45,00 €");
        assert_eq!(format_unit_price(dec("45.500"), "en"), "€45.50");
    }

    #[test]
    fn numbers_and_dates_follow_locale() {
        assert_eq!(format_number(dec("1.50"), "de"), "1,5");
        assert_eq!(format_number(dec("2.000"), "en"), "2");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date, "de"), "09.03.2024");
        assert_eq!(format_date(date, "en"), "2024-03-09");
    }

    #[test]
    fn epc_payload_follows_girocode_layout() {
        let payload = epc_qr_payload("Kellers Catering GmbH", "DE89370400440532013000", Some("COBADEFFXXX"), dec("345.1"), "ANG-2024-001");
        let lines: Vec<_> = payload.split('\n').collect();

        assert_eq!(lines.len(), 11);
        assert_eq!(&lines[..4], &["BCD", "002", "1", "SCT"]);
        assert_eq!(lines[4], "COBADEFFXXX");
        assert_eq!(lines[5], "Kellers Catering GmbH");
        assert_eq!(lines[6], "DE89370400440532013000");
        assert_eq!(lines[7], "EUR345.10");
        assert_eq!(lines[10], "ANG-2024-001");
    }

    #[test]
    fn payment_block_needs_iban_and_company_name() {
        let q = quotation(scenario_items(), None);
        let mut settings = CompanySettings {
            iban: Some("de89 3704 0044 0532 0130 00".to_string()),
            ..CompanySettings::default()
        };
        let without_name = DocumentView::build(&q, &client(), &settings, "de", &i18n(), Utc::now());
        assert!(without_name.payment.is_none());

        settings.company_name = Some("Kellers Catering".to_string());
        let view = DocumentView::build(&q, &client(), &settings, "de", &i18n(), Utc::now());
        let payment = view.payment.expect("bloco de pagamento");
        assert_eq!(payment.iban, "DE89370400440532013000");
        assert_eq!(payment.amount, "345,10 €");
        assert!(payment.qr_payload.contains("EUR345.10"));
    }

    #[test]
    fn payment_targets_deposit_when_present() {
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let settings = CompanySettings {
            company_name: Some("Kellers Catering".to_string()),
            iban: Some("DE89370400440532013000".to_string()),
            ..CompanySettings::default()
        };
        let view = DocumentView::build(&quotation(scenario_items(), Some(("100", due))), &client(), &settings, "de", &i18n(), Utc::now());

        assert!(view.payment.unwrap().qr_payload.contains("EUR100.00"));
    }
}

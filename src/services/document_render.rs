// src/services/document_render.rs
//
// Saídas do DocumentView: HTML para impressão pelo navegador e PDF via genpdf.
// Ambos são layouts de fluxo: a tabela de posições quebra página em vez de
// sobrepor o rodapé.

use askama::Template;
use genpdf::{elements, style, Alignment, Element, Scale};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    services::document_service::{DocumentView, TotalLine},
};

// Pesos das colunas: Pos, Bezeichnung, Menge, Einheit, Einzelpreis, Gesamt
const COLUMN_WEIGHTS: [usize; 6] = [1, 6, 2, 2, 3, 3];

// --- HTML ---

// Versão imprimível pelo navegador. O askama escapa todo texto do usuário.
#[derive(Template)]
#[template(path = "quotation.html")]
struct QuotationPrintTemplate<'a> {
    view: &'a DocumentView,
}

pub fn render_html(view: &DocumentView) -> Result<String, AppError> {
    QuotationPrintTemplate { view }
        .render()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("Falha ao montar o HTML: {}", e)))
}

// --- PDF ---

fn pdf_error(e: genpdf::error::Error) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Falha ao montar o PDF: {}", e))
}

pub fn render_pdf(view: &DocumentView, font_dir: &str, font_family: &str) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta configurada
    let fonts = genpdf::fonts::from_files(font_dir, font_family, None)
        .map_err(|_| AppError::FontNotFound(format!("{}/{}", font_dir, font_family)))?;

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(format!("{} {}", view.title, view.number));
    doc.set_font_size(10);

    // Número da página a partir da segunda
    let page_label = view.page_label.clone();
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    decorator.set_header(move |page| {
        let mut header = elements::LinearLayout::vertical();
        if page > 1 {
            header.push(
                elements::Paragraph::new(page_label.replace("{page}", &page.to_string()))
                    .aligned(Alignment::Right)
                    .styled(style::Style::new().with_font_size(8)),
            );
            header.push(elements::Break::new(1));
        }
        header
    });
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    if let Some(name) = &view.company.name {
        doc.push(elements::Paragraph::new(name.as_str()).styled(style::Style::new().bold().with_font_size(16)));
        for line in &view.company.lines {
            doc.push(elements::Paragraph::new(line.as_str()).styled(style::Style::new().with_font_size(8)));
        }
        doc.push(elements::Break::new(1.5));
    }

    doc.push(elements::Paragraph::new(view.client.name.as_str()).styled(style::Style::new().bold()));
    for line in &view.client.lines {
        doc.push(elements::Paragraph::new(line.as_str()));
    }
    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(format!("{} {}", view.title, view.number))
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Break::new(0.5));

    let mut details = elements::TableLayout::new(vec![1, 3]);
    for detail in &view.details {
        details
            .row()
            .element(elements::Paragraph::new(detail.label.as_str()).styled(style::Style::new().bold()))
            .element(elements::Paragraph::new(detail.value.as_str()))
            .push()
            .map_err(pdf_error)?;
    }
    doc.push(details);
    doc.push(elements::Break::new(1.5));

    // --- POSIÇÕES ---
    match &view.empty_message {
        Some(message) => {
            doc.push(elements::Paragraph::new(message.as_str()).styled(style::Style::new().italic()));
        }
        None => doc.push(items_table(view)?),
    }
    doc.push(elements::Break::new(1.5));

    // --- TOTAIS ---
    for line in view.totals.iter().chain(view.deposit.iter()) {
        doc.push(total_paragraph(line));
    }

    if let Some(notes) = &view.notes {
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new(notes.label.as_str()).styled(style::Style::new().bold()));
        doc.push(elements::Paragraph::new(notes.value.as_str()));
    }

    // --- PAGAMENTO (GiroCode) ---
    if let Some(payment) = &view.payment {
        doc.push(elements::Break::new(1.5));
        doc.push(elements::Paragraph::new(payment.label.as_str()).styled(style::Style::new().bold()));

        let mut bank_line = format!("{} · {}", payment.beneficiary, payment.iban);
        if let Some(bic) = &payment.bic {
            bank_line.push_str(&format!(" · {}", bic));
        }
        if let Some(bank) = &payment.bank_name {
            bank_line.push_str(&format!(" · {}", bank));
        }
        doc.push(elements::Paragraph::new(bank_line).styled(style::Style::new().with_font_size(8)));
        doc.push(elements::Break::new(0.5));

        let code = QrCode::new(payment.qr_payload.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("QR Code inválido: {}", e)))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let qr_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
            .map_err(pdf_error)?
            .with_scale(Scale::new(0.5, 0.5));
        doc.push(qr_image);
    }

    // --- RODAPÉ ---
    if let Some(footer) = &view.company.footer {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new(footer.as_str()).styled(style::Style::new().italic().with_font_size(8)));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;
    Ok(buffer)
}

fn items_table(view: &DocumentView) -> Result<elements::TableLayout, AppError> {
    let mut table = elements::TableLayout::new(COLUMN_WEIGHTS.to_vec());
    table.set_cell_decorator(elements::FrameCellDecorator::new(false, false, false));

    let bold = style::Style::new().bold();
    let c = &view.columns;
    table
        .row()
        .element(elements::Paragraph::new(c.position.as_str()).styled(bold))
        .element(elements::Paragraph::new(c.item.as_str()).styled(bold))
        .element(elements::Paragraph::new(c.quantity.as_str()).aligned(Alignment::Right).styled(bold))
        .element(elements::Paragraph::new(c.unit.as_str()).styled(bold))
        .element(elements::Paragraph::new(c.unit_price.as_str()).aligned(Alignment::Right).styled(bold))
        .element(elements::Paragraph::new(c.total.as_str()).aligned(Alignment::Right).styled(bold))
        .push()
        .map_err(pdf_error)?;

    for section in &view.sections {
        // Linha de título da seção ocupa a coluna da descrição
        table
            .row()
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(section.title.as_str()).styled(style::Style::new().bold().italic()))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .element(elements::Paragraph::new(""))
            .push()
            .map_err(pdf_error)?;

        for row in &section.rows {
            let mut name = elements::LinearLayout::vertical()
                .element(elements::Paragraph::new(row.name.as_str()));
            if let Some(description) = &row.description {
                name.push(elements::Paragraph::new(description.as_str()).styled(style::Style::new().with_font_size(8)));
            }

            table
                .row()
                .element(elements::Paragraph::new(row.position.to_string()))
                .element(name)
                .element(elements::Paragraph::new(row.quantity.as_str()).aligned(Alignment::Right))
                .element(elements::Paragraph::new(row.unit.as_str()))
                .element(elements::Paragraph::new(row.unit_price.as_str()).aligned(Alignment::Right))
                .element(elements::Paragraph::new(row.total.as_str()).aligned(Alignment::Right))
                .push()
                .map_err(pdf_error)?;
        }
    }

    Ok(table)
}

fn total_paragraph(line: &TotalLine) -> elements::StyledElement<elements::Paragraph> {
    let style = if line.emphasis {
        style::Style::new().bold().with_font_size(12)
    } else {
        style::Style::new()
    };
    elements::Paragraph::new(format!("{}: {}", line.label, line.amount))
        .aligned(Alignment::Right)
        .styled(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::i18n::I18nStore,
        models::{
            client::Client,
            pricing::{ItemCategory, LineItem},
            quotation::{FulfilmentMode, Quotation, QuotationStatus},
            settings::CompanySettings,
        },
        services::pricing::compute_summary,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn view(items: Vec<LineItem>, notes: Option<&str>) -> DocumentView {
        view_with(items, notes, &CompanySettings::default())
    }

    fn view_with(items: Vec<LineItem>, notes: Option<&str>, settings: &CompanySettings) -> DocumentView {
        let pricing = compute_summary(&items, Decimal::from(19), None, None).unwrap();
        let quotation = Quotation {
            id: Uuid::new_v4(),
            number: "ANG-2024-010".to_string(),
            client_id: Uuid::new_v4(),
            event_name: "Grillabend <Team>".to_string(),
            event_date: None,
            start_time: None,
            end_time: None,
            location: None,
            address: None,
            guest_count: None,
            fulfilment: FulfilmentMode::SelfPickup,
            notes: notes.map(str::to_string),
            items,
            pricing,
            status: QuotationStatus::Draft,
            valid_until: (Utc::now() + chrono::Duration::days(10)).date_naive(),
            version: 1,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let client = Client {
            id: quotation.client_id,
            name: "Müller & Söhne".to_string(),
            company: None,
            email: None,
            phone: None,
            street: None,
            postal_code: None,
            city: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        DocumentView::build(&quotation, &client, settings, "de", &I18nStore::load().unwrap(), Utc::now())
    }

    fn bratwurst() -> LineItem {
        LineItem {
            id: Uuid::new_v4(),
            product_id: None,
            category: ItemCategory::Food,
            name: "Bratwurst".to_string(),
            description: Some("vom Holzkohlegrill".to_string()),
            quantity: Decimal::from(40),
            unit: "Stück".to_string(),
            unit_price: Decimal::new(350, 2),
        }
    }

    #[test]
    fn html_escapes_user_text() {
        let html = render_html(&view(vec![bratwurst()], Some("<script>alert(1)</script>"))).unwrap();

        assert!(html.contains("Müller &amp; Söhne"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn html_lists_sections_and_totals() {
        let html = render_html(&view(vec![bratwurst()], None)).unwrap();

        assert!(html.contains("<tr class=\"section\"><td colspan=\"6\">Speisen</td></tr>"));
        assert!(html.contains("140,00 €"));
        assert!(html.contains("166,60 €"));
        assert!(!html.contains("class=\"empty\""));
    }

    #[test]
    fn html_shows_placeholder_without_items() {
        let html = render_html(&view(Vec::new(), None)).unwrap();

        assert!(html.contains("Dieses Angebot enthält noch keine Positionen."));
        assert!(!html.contains("table class=\"items\""));
    }

    #[test]
    fn missing_fonts_are_reported() {
        let err = render_pdf(&view(vec![bratwurst()], None), "/nao/existe", "Roboto").unwrap_err();

        assert!(matches!(err, AppError::FontNotFound(_)));
    }

    // DejaVu Sans, copiada para tests/fonts com os nomes que o genpdf espera
    const TEST_FONT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts");

    fn count(haystack: &[u8], needle: &[u8]) -> usize {
        haystack.windows(needle.len()).filter(|w| *w == needle).count()
    }

    #[test]
    fn long_quotation_renders_several_pages_with_girocode() {
        let items: Vec<LineItem> = (0..150)
            .map(|n| LineItem { name: format!("Bratwurst {}", n + 1), ..bratwurst() })
            .collect();
        let settings = CompanySettings {
            company_name: Some("Kellers Catering".to_string()),
            iban: Some("DE89370400440532013000".to_string()),
            bic: Some("COBADEFFXXX".to_string()),
            ..CompanySettings::default()
        };
        let view = view_with(items, Some("Aufbau ab 16 Uhr"), &settings);
        assert!(view.payment.is_some());
        // 150 x 140,00 = 21.000,00 netto, 24.990,00 brutto
        assert_eq!(view.totals.last().unwrap().amount, "24.990,00 €");

        let pdf = render_pdf(&view, TEST_FONT_DIR, "DejaVuSans").unwrap();

        assert!(pdf.starts_with(b"%PDF"));
        // "/Type/Pages" é a árvore, o resto são páginas
        let pages = count(&pdf, b"/Type/Page") - count(&pdf, b"/Type/Pages");
        assert!(pages > 1, "esperava mais de uma página, veio {}", pages);
        assert!(count(&pdf, b"/Subtype/Image") >= 1);
        assert!(count(&pdf, b"ANG-2024-010") >= 1);
    }
}

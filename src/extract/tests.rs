use std::collections::HashSet;

use super::*;

fn extractor() -> PurchaseExtractor {
    PurchaseExtractor::new().expect("label tables compile")
}

fn run(markup: &str, year: i32) -> ExtractionReport {
    let document = RawDocument::new(markup, year).expect("valid document");
    extractor().extract(&document)
}

fn record(seller: &str, title: &str, total: &str, currency: &str, number: &str) -> PurchaseRecord {
    PurchaseRecord {
        seller: seller.to_string(),
        item_title: title.to_string(),
        order_total: total.to_string(),
        currency: currency.to_string(),
        order_number: number.to_string(),
    }
}

const WIRELESS_MOUSE_PAGE: &str = r#"<!doctype html>
<html><body>
<div class="order">
  <div class="item">
    <div class="info">
      <p><a href="https://www.ebay.co.uk/itm/123456">Wireless&nbsp;Mouse</a></p>
    </div>
    <div class="meta">Order total: £23.99 | Order number: 12-3456789-0 | Sold by: Acme Traders · 2024</div>
  </div>
</div>
</body></html>"#;

#[test]
fn normalize_collapses_whitespace_and_non_breaking_spaces() {
    assert_eq!(normalize("\u{a0}Hello\t\n  world\u{a0} "), "Hello world");
    assert_eq!(normalize("already clean"), "already clean");
    assert_eq!(normalize(""), "");
    assert_eq!(normalize(" \n\t\u{a0} "), "");
}

#[test]
fn normalize_fragments_separates_adjacent_nodes() {
    assert_eq!(normalize_fragments(["Order", "total:", " £5 "]), "Order total: £5");
}

#[test]
fn label_matcher_reads_english_fields() {
    let labels = LabelMatcher::new().expect("labels");
    let text = "Order total: £23.99 | Order number: 12-3456789-0 | Sold by: Acme Traders · 2024";

    assert_eq!(labels.order_total(text).as_deref(), Some("£23.99"));
    assert_eq!(labels.order_number(text).as_deref(), Some("12-3456789-0"));
    assert_eq!(labels.seller(text).as_deref(), Some("Acme Traders"));
}

#[test]
fn label_matcher_reads_other_locales() {
    let labels = LabelMatcher::new().expect("labels");

    let german = "Gesamtsumme: €45,00 | Bestellnummer: 07-12345-67890 | Verkauft von: Händler GmbH";
    assert_eq!(labels.order_total(german).as_deref(), Some("€45,00"));
    assert_eq!(labels.order_number(german).as_deref(), Some("07-12345-67890"));
    assert_eq!(labels.seller(german).as_deref(), Some("Händler GmbH"));

    let czech = "celkem objednávky: €10,00 · číslo objednávky: AB-12 · Prodává: Obchod s.r.o.";
    assert_eq!(labels.order_total(czech).as_deref(), Some("€10,00"));
    assert_eq!(labels.order_number(czech).as_deref(), Some("AB-12"));
    assert_eq!(labels.seller(czech).as_deref(), Some("Obchod s.r.o."));

    let spanish = "Total del pedido: €7,95 | Número de pedido: 55-1 | Vendido por: Tienda Sol";
    assert_eq!(labels.order_total(spanish).as_deref(), Some("€7,95"));
    assert_eq!(labels.order_number(spanish).as_deref(), Some("55-1"));
    assert_eq!(labels.seller(spanish).as_deref(), Some("Tienda Sol"));

    let french = "Total de la commande : €19,90 | Numéro de commande : 77-2 | Vendu par : La Boutique";
    assert_eq!(labels.order_total(french).as_deref(), Some("€19,90"));
    assert_eq!(labels.order_number(french).as_deref(), Some("77-2"));
    assert_eq!(labels.seller(french).as_deref(), Some("La Boutique"));

    let italian = "Totale ordine: €3,50 | Numero ordine: 88-3 | Venduto da: Negozio Blu";
    assert_eq!(labels.order_total(italian).as_deref(), Some("€3,50"));
    assert_eq!(labels.order_number(italian).as_deref(), Some("88-3"));
    assert_eq!(labels.seller(italian).as_deref(), Some("Negozio Blu"));
}

#[test]
fn label_matcher_ignores_case() {
    let labels = LabelMatcher::new().expect("labels");
    assert_eq!(labels.order_total("ORDER TOTAL: $5.00").as_deref(), Some("$5.00"));
    assert_eq!(labels.order_number("order NUMBER: x-9").as_deref(), Some("x-9"));
}

#[test]
fn label_matcher_takes_leftmost_match_regardless_of_locale() {
    let labels = LabelMatcher::new().expect("labels");
    let text = "Bestellnummer: B-2 | Order number: A-1 | Order total: $1.00 | Order total: $2.00";

    assert_eq!(labels.order_number(text).as_deref(), Some("B-2"));
    assert_eq!(labels.order_total(text).as_deref(), Some("$1.00"));
}

#[test]
fn label_matcher_total_stops_at_first_non_amount_character() {
    let labels = LabelMatcher::new().expect("labels");
    assert_eq!(
        labels.order_total("Order total: $1,234.50USD").as_deref(),
        Some("$1,234.50")
    );
    assert_eq!(labels.order_total("Order total: 23.99"), None);
}

#[test]
fn label_matcher_total_requires_ascii_digits() {
    let labels = LabelMatcher::new().expect("labels");
    assert_eq!(labels.order_total("Order total: £٢٣.٩٩"), None);
    assert_eq!(labels.extract_currency_symbol("£٢٣.٩٩"), None);
}

#[test]
fn label_matcher_seller_runs_to_end_without_separator() {
    let labels = LabelMatcher::new().expect("labels");
    assert_eq!(
        labels.seller("Sold by:   Big   Shop Ltd  ").as_deref(),
        Some("Big Shop Ltd")
    );
}

#[test]
fn label_matcher_reports_missing_labels_as_none() {
    let labels = LabelMatcher::new().expect("labels");
    let text = "Delivered on 3 March";

    for concept in LabelConcept::ALL {
        assert_eq!(labels.find_value(concept, text), None, "{concept}");
    }
}

#[test]
fn currency_symbol_reads_leading_symbol_only() {
    assert_eq!(currency_symbol("£23.99"), Some(Currency::Pound));
    assert_eq!(currency_symbol("  € 1.024,50"), Some(Currency::Euro));
    assert_eq!(currency_symbol("$0.99"), Some(Currency::Dollar));
    assert_eq!(currency_symbol("23.99"), None);
    assert_eq!(currency_symbol("$"), None);
    assert_eq!(currency_symbol("USD 5"), None);
    assert_eq!(currency_symbol(""), None);
}

#[test]
fn year_filter_is_conservative() {
    let years = YearFilter::new().expect("years");

    assert!(years.is_relevant("Ordered 2023 2024", 2024));
    assert!(!years.is_relevant("Ordered 12 May 2023", 2024));
    assert!(years.is_relevant("No dates here", 2024));
    assert!(years.is_relevant("No dates here", 1999));
    assert!(years.is_relevant("Ordered 2024", 2024));
    assert!(!years.is_relevant("2021 and 2022", 2024));
}

#[test]
fn year_filter_only_counts_whole_tokens_in_range() {
    let years = YearFilter::new().expect("years");

    assert!(years.years_in("Order number: 12-3456789-0").is_empty());
    assert!(years.years_in("1999 2100 120245").is_empty());
    assert_eq!(
        years.years_in("2023, 2024 and 2023").into_iter().collect::<Vec<i32>>(),
        vec![2023, 2024]
    );
}

#[test]
fn anchors_keep_item_links_in_document_order() {
    let page = PurchasePage::parse(
        r#"<html><body>
        <a href="/help">Help centre</a>
        <a href="/itm/1">Buy</a>
        <a href="/itm/2">  Garden   Hose </a>
        <a>No target</a>
        <a href="https://www.ebay.com/itm/3?var=1">Desk Lamp</a>
        </body></html>"#,
    );

    let titles = page
        .find_anchors()
        .into_iter()
        .map(|anchor| anchor.title)
        .collect::<Vec<String>>();

    assert_eq!(titles, vec!["Garden Hose", "Desk Lamp"]);
}

#[test]
fn anchor_positions_follow_kept_anchors() {
    let page = PurchasePage::parse(
        r#"<body><a href="/itm/1">Ok</a><a href="/itm/2">First item</a><a href="/itm/3">Second item</a></body>"#,
    );

    let positions = page
        .find_anchors()
        .iter()
        .map(|anchor| anchor.position)
        .collect::<Vec<usize>>();

    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn block_scope_walks_three_ancestors() {
    let page = PurchasePage::parse(
        r#"<html><body><div id="outer"><p>Outside note</p>
        <div id="block"><ul><li><a href="/itm/9">Tea Kettle</a></li></ul><span>Inside note</span></div>
        </div></body></html>"#,
    );
    let anchors = page.find_anchors();
    let scope = page.scope_for(&anchors[0]);

    assert_eq!(scope.depth(), 0);
    assert_eq!(scope.tag_name(), "div");
    assert_eq!(scope.text(), "Tea Kettle Inside note");

    let wider = page.widen(&scope);
    assert_eq!(wider.depth(), 1);
    assert!(!wider.same_region(&scope));
    assert!(wider.text().contains("Outside note"));
}

#[test]
fn block_scope_stops_at_shallow_root() {
    let page = PurchasePage::parse(r#"<a href="/itm/1">Phone Case</a>"#);
    let anchors = page.find_anchors();
    let scope = page.scope_for(&anchors[0]);

    assert_eq!(scope.tag_name(), "html");

    let wider = page.widen(&scope);
    assert!(wider.same_region(&scope));
    assert_eq!(wider.depth(), scope.depth());
}

#[test]
fn widen_stops_at_depth_limit() {
    let markup = format!(
        "<html><body>{}<a href=\"/itm/1\">Deep Item</a>{}</body></html>",
        "<div>".repeat(12),
        "</div>".repeat(12)
    );
    let page = PurchasePage::parse(&markup);
    let anchors = page.find_anchors();

    let mut scope = page.scope_for(&anchors[0]);
    for _ in 0..MAX_WIDEN_STEPS {
        let wider = page.widen(&scope);
        assert!(!wider.same_region(&scope));
        scope = wider;
    }

    assert_eq!(scope.depth(), MAX_WIDEN_STEPS);
    assert!(page.widen(&scope).same_region(&scope));
}

#[test]
fn extract_fields_fills_currency_from_total() {
    let labels = LabelMatcher::new().expect("labels");
    let fields = extract_fields(&labels, "Order total: $12.00 | Sold by: Corner Shop");

    assert_eq!(fields.order_total.as_deref(), Some("$12.00"));
    assert_eq!(fields.currency, Some(Currency::Dollar));
    assert_eq!(fields.order_number, None);
    assert_eq!(fields.seller.as_deref(), Some("Corner Shop"));
    assert!(!fields.is_complete());
}

#[test]
fn fill_from_never_overwrites_found_values() {
    let mut narrow = PartialRecord {
        order_total: Some("€12,50".to_string()),
        currency: Some(Currency::Euro),
        ..PartialRecord::default()
    };
    narrow.fill_from(PartialRecord {
        order_total: Some("$99.00".to_string()),
        currency: Some(Currency::Dollar),
        order_number: Some("99-1".to_string()),
        seller: Some("Shop".to_string()),
    });

    assert_eq!(narrow.order_total.as_deref(), Some("€12,50"));
    assert_eq!(narrow.currency, Some(Currency::Euro));
    assert_eq!(narrow.order_number.as_deref(), Some("99-1"));
    assert_eq!(narrow.seller.as_deref(), Some("Shop"));
}

#[test]
fn fill_from_takes_currency_only_with_its_total() {
    let mut missing_total = PartialRecord::default();
    missing_total.fill_from(PartialRecord {
        order_total: Some("€5.00".to_string()),
        currency: Some(Currency::Euro),
        ..PartialRecord::default()
    });
    assert_eq!(missing_total.order_total.as_deref(), Some("€5.00"));
    assert_eq!(missing_total.currency, Some(Currency::Euro));

    let mut bare_total = PartialRecord {
        order_total: Some("£ x".to_string()),
        ..PartialRecord::default()
    };
    bare_total.fill_from(PartialRecord {
        order_total: Some("€5.00".to_string()),
        currency: Some(Currency::Euro),
        ..PartialRecord::default()
    });
    assert_eq!(bare_total.order_total.as_deref(), Some("£ x"));
    assert_eq!(bare_total.currency, None);
}

#[test]
fn escalation_merges_parent_scope_without_overwriting() {
    let markup = r#"<html><body><section>
        <div class="header">Order total: $99.00 | Order number: 99-1 | Sold by: Shop |</div>
        <div class="a"><div class="b"><div class="c"><a href="/itm/7">Desk Lamp</a></div></div>
        <div>Order total: €12,50</div></div>
        </section></body></html>"#;
    let report = run(markup, 2024);

    assert_eq!(report.stats.anchors_escalated, 1);
    assert_eq!(
        report.records,
        vec![record("Shop", "Desk Lamp", "€12,50", "€", "99-1")]
    );
}

#[test]
fn escalated_currency_matches_escalated_total() {
    let markup = r#"<html><body><section>
        <div class="header">Order total: €5.00 | Order number: 5-5 | Sold by: Shop |</div>
        <div class="a"><div class="b"><div class="c"><a href="/itm/8">Reading Glasses</a></div></div>
        <div>Order total: £٢٣.٩٩</div></div>
        </section></body></html>"#;
    let report = run(markup, 2024);

    assert_eq!(report.stats.anchors_escalated, 1);
    assert_eq!(
        report.records,
        vec![record("Shop", "Reading Glasses", "€5.00", "€", "5-5")]
    );
    let total = &report.records[0].order_total;
    assert_eq!(
        currency_symbol(total).map(|currency| currency.to_string()),
        Some(report.records[0].currency.clone())
    );
}

#[test]
fn complete_block_scope_does_not_escalate() {
    let report = run(WIRELESS_MOUSE_PAGE, 2024);
    assert_eq!(report.stats.anchors_escalated, 0);
}

#[test]
fn escalation_is_bounded_to_one_parent() {
    let markup = r#"<html><body>
        <div>Order number: 42-42 | Sold by: Far Away</div>
        <div><div><div><div><span><a href="/itm/55">Phone Case</a></span></div></div></div></div>
        </body></html>"#;
    let page = PurchasePage::parse(markup);
    let labels = LabelMatcher::new().expect("labels");
    let anchors = page.find_anchors();
    let scope = page.scope_for(&anchors[0]);

    let resolution = resolve_fields(&page, &labels, &scope);
    assert!(resolution.escalated);
    assert_eq!(resolution.depth, 1);
    assert!(resolution.fields.is_empty());
}

#[test]
fn escalation_at_root_is_a_no_op() {
    let page = PurchasePage::parse(r#"<a href="/itm/1">Phone Case</a>"#);
    let labels = LabelMatcher::new().expect("labels");
    let anchors = page.find_anchors();
    let scope = page.scope_for(&anchors[0]);

    let resolution = resolve_fields(&page, &labels, &scope);
    assert!(!resolution.escalated);
    assert_eq!(resolution.depth, 0);
    assert!(resolution.fields.is_empty());
}

#[test]
fn wireless_mouse_page_yields_one_full_record() {
    let report = run(WIRELESS_MOUSE_PAGE, 2024);

    assert_eq!(
        report.records,
        vec![record(
            "Acme Traders",
            "Wireless Mouse",
            "£23.99",
            "£",
            "12-3456789-0"
        )]
    );
    assert_eq!(report.stats.anchors_found, 1);
    assert_eq!(report.stats.records_emitted, 1);
}

#[test]
fn anchor_without_labels_keeps_its_title() {
    let markup = r#"<html><body><div><div><div><span><a href="/itm/55">Phone Case</a></span></div></div></div></body></html>"#;
    let report = run(markup, 2024);

    assert_eq!(report.records, vec![record("", "Phone Case", "", "", "")]);
}

#[test]
fn foreign_year_blocks_are_dropped() {
    let markup = r#"<html><body>
        <div class="order"><div><div><a href="/itm/1">Old Purchase</a></div></div>
          <p>Ordered 4 Dec 2023 | Order total: £5.00</p></div>
        <div class="order"><div><div><a href="/itm/2">New Purchase</a></div></div>
          <p>Ordered 9 Jan 2024 | Order total: £6.00</p></div>
        </body></html>"#;
    let report = run(markup, 2024);

    assert_eq!(report.stats.anchors_year_filtered, 1);
    let titles = report
        .records
        .iter()
        .map(|record| record.item_title.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(titles, vec!["New Purchase"]);
}

#[test]
fn first_anchor_wins_for_repeated_titles() {
    let markup = r#"<html><body>
        <div class="order"><div><div><a href="/itm/1">USB Cable</a></div></div>
          <p>Order total: £5.00 | Order number: 1-1 | Sold by: First Seller |</p></div>
        <div class="order"><div><div><a href="/itm/1">USB Cable</a></div></div>
          <p>Order total: £9.00 | Order number: 2-2 | Sold by: Second Seller |</p></div>
        </body></html>"#;
    let report = run(markup, 2024);

    assert_eq!(report.stats.duplicate_titles, 1);
    assert_eq!(
        report.records,
        vec![record("First Seller", "USB Cable", "£5.00", "£", "1-1")]
    );
}

#[test]
fn records_follow_anchor_order() {
    let markup = r#"<html><body>
        <div><div><div><a href="/itm/3">Zebra Print Mug</a></div></div><p>Order total: $3.00</p></div>
        <div><div><div><a href="/itm/1">Apple Corer</a></div></div><p>Order total: $1.00</p></div>
        <div><div><div><a href="/itm/2">Mango Slicer</a></div></div><p>Order total: $2.00</p></div>
        </body></html>"#;
    let report = run(markup, 2024);

    let titles = report
        .records
        .iter()
        .map(|record| record.item_title.as_str())
        .collect::<Vec<&str>>();
    assert_eq!(titles, vec!["Zebra Print Mug", "Apple Corer", "Mango Slicer"]);
}

#[test]
fn extraction_is_idempotent_and_tuple_unique() {
    let first = run(WIRELESS_MOUSE_PAGE, 2024);
    let second = run(WIRELESS_MOUSE_PAGE, 2024);
    assert_eq!(first.records, second.records);

    let unique = first.records.iter().collect::<HashSet<&PurchaseRecord>>();
    assert_eq!(unique.len(), first.records.len());
}

#[test]
fn assemble_back_fills_currency_and_drops_blank_entries() {
    let assembly = assemble(vec![
        (
            "Garden Hose".to_string(),
            PartialRecord {
                order_total: Some("€ 8,00".to_string()),
                ..PartialRecord::default()
            },
        ),
        (String::new(), PartialRecord::default()),
        ("Garden Hose".to_string(), PartialRecord::default()),
    ]);

    assert_eq!(
        assembly.records,
        vec![record("", "Garden Hose", "€ 8,00", "€", "")]
    );
    assert_eq!(assembly.duplicate_titles, 1);
}

#[test]
fn merge_pages_keeps_repeated_titles_with_different_fields() {
    let mouse = record("Acme", "Wireless Mouse", "£23.99", "£", "1-1");
    let mouse_again = record("Acme", "Wireless Mouse", "£19.99", "£", "2-2");
    let no_currency = record("", "Cable Tie", "$4.00", "", "");
    let blank = record("Acme", "", "", "", "3-3");

    let merged = merge_pages(vec![
        vec![mouse.clone(), no_currency],
        vec![mouse.clone(), mouse_again.clone(), blank],
    ]);

    assert_eq!(
        merged,
        vec![
            mouse,
            record("", "Cable Tie", "$4.00", "$", ""),
            mouse_again
        ]
    );
}

#[test]
fn raw_document_rejects_contract_violations() {
    assert_eq!(
        RawDocument::new("", 2024).unwrap_err(),
        ExtractError::EmptyDocument
    );
    assert_eq!(
        RawDocument::new(" \n\t", 2024).unwrap_err(),
        ExtractError::EmptyDocument
    );
    assert_eq!(
        RawDocument::new("<p></p>", 0).unwrap_err(),
        ExtractError::InvalidYear(0)
    );
    assert_eq!(
        RawDocument::new("<p></p>", -5).unwrap_err(),
        ExtractError::InvalidYear(-5)
    );
}

#[test]
fn extract_records_uses_shared_extractor() {
    let records = extract_records(WIRELESS_MOUSE_PAGE, 2024).expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].seller, "Acme Traders");

    assert!(matches!(
        extract_records("", 2024),
        Err(ExtractError::EmptyDocument)
    ));
}

#[test]
fn shared_extractor_is_built_once() {
    let first = PurchaseExtractor::shared().expect("shared extractor");
    let second = PurchaseExtractor::shared().expect("shared extractor");
    assert!(std::ptr::eq(first, second));
}

#[test]
fn page_without_item_links_yields_nothing() {
    let report = run("<html><body><p>No purchases in this period.</p></body></html>", 2024);
    assert!(report.records.is_empty());
    assert_eq!(report.stats, ExtractionStats::default());
}

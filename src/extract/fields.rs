use super::document::{PurchasePage, TextScope};
use super::labels::{Currency, LabelMatcher};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialRecord {
    pub order_total: Option<String>,
    pub currency: Option<Currency>,
    pub order_number: Option<String>,
    pub seller: Option<String>,
}

impl PartialRecord {
    pub fn is_complete(&self) -> bool {
        self.order_total.is_some() && self.order_number.is_some() && self.seller.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.order_total.is_none()
            && self.currency.is_none()
            && self.order_number.is_none()
            && self.seller.is_none()
    }

    pub fn fill_from(&mut self, wider: PartialRecord) {
        // Currency travels with the total it was read from.
        if self.order_total.is_none() {
            self.order_total = wider.order_total;
            self.currency = wider.currency;
        }
        if self.order_number.is_none() {
            self.order_number = wider.order_number;
        }
        if self.seller.is_none() {
            self.seller = wider.seller;
        }
    }
}

pub fn extract_fields(labels: &LabelMatcher, text: &str) -> PartialRecord {
    let order_total = labels.order_total(text);
    let currency = order_total
        .as_deref()
        .and_then(|total| labels.extract_currency_symbol(total));

    PartialRecord {
        order_total,
        currency,
        order_number: labels.order_number(text),
        seller: labels.seller(text),
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub fields: PartialRecord,
    pub escalated: bool,
    pub depth: usize,
}

pub fn resolve_fields<'a>(
    page: &'a PurchasePage,
    labels: &LabelMatcher,
    scope: &TextScope<'a>,
) -> Resolution {
    let mut fields = extract_fields(labels, scope.text());
    if fields.is_complete() {
        return Resolution {
            fields,
            escalated: false,
            depth: scope.depth(),
        };
    }

    let wider = page.widen(scope);
    if wider.same_region(scope) {
        return Resolution {
            fields,
            escalated: false,
            depth: scope.depth(),
        };
    }

    fields.fill_from(extract_fields(labels, wider.text()));
    Resolution {
        fields,
        escalated: true,
        depth: wider.depth(),
    }
}

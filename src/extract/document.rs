use scraper::{ElementRef, Html};

use super::normalize::normalize_fragments;

pub const ITEM_PATH_MARKER: &str = "/itm/";
pub const MIN_TITLE_CHARS: usize = 4;
pub const BLOCK_SCOPE_LEVELS: usize = 3;
pub const MAX_WIDEN_STEPS: usize = 3;

pub struct PurchasePage {
    html: Html,
}

#[derive(Debug, Clone)]
pub struct ItemAnchor<'a> {
    pub title: String,
    pub position: usize,
    element: ElementRef<'a>,
}

#[derive(Debug, Clone)]
pub struct TextScope<'a> {
    element: ElementRef<'a>,
    depth: usize,
    text: String,
}

impl PurchasePage {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn find_anchors(&self) -> Vec<ItemAnchor<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == "a")
            .filter(|link| {
                link.value()
                    .attr("href")
                    .map(|href| href.contains(ITEM_PATH_MARKER))
                    .unwrap_or(false)
            })
            .filter_map(|link| {
                let title = element_text(link);
                if title.chars().count() < MIN_TITLE_CHARS {
                    return None;
                }
                Some((title, link))
            })
            .enumerate()
            .map(|(position, (title, element))| ItemAnchor {
                title,
                position,
                element,
            })
            .collect()
    }

    pub fn scope_for<'a>(&'a self, anchor: &ItemAnchor<'a>) -> TextScope<'a> {
        let mut element = anchor.element;
        for _ in 0..BLOCK_SCOPE_LEVELS {
            match parent_element(element) {
                Some(parent) => element = parent,
                None => break,
            }
        }

        TextScope::new(element, 0)
    }

    /// Next enclosing scope. Returns an identical scope once the root or the
    /// widen limit is reached.
    pub fn widen<'a>(&'a self, scope: &TextScope<'a>) -> TextScope<'a> {
        if scope.depth >= MAX_WIDEN_STEPS {
            return scope.clone();
        }

        match parent_element(scope.element) {
            Some(parent) => TextScope::new(parent, scope.depth + 1),
            None => scope.clone(),
        }
    }
}

impl<'a> TextScope<'a> {
    fn new(element: ElementRef<'a>, depth: usize) -> Self {
        Self {
            element,
            depth,
            text: element_text(element),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn tag_name(&self) -> &str {
        self.element.value().name()
    }

    pub fn same_region(&self, other: &TextScope<'_>) -> bool {
        self.element.id() == other.element.id()
    }
}

fn parent_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.parent().and_then(ElementRef::wrap)
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_fragments(element.text())
}

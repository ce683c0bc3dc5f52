//! Document-order linking of comment-page blocks.
//!
//! The reactions markup does not nest a reaction's date/meta block or its
//! replies group inside the reaction container; they follow it as loose
//! siblings (or worse). The only rule tying them together is document order:
//! a reaction owns the nearest meta block and the nearest replies group
//! *after* it. That convention is fragile, so it lives here as one explicit
//! collect-then-link pass instead of being spread through the extractor.

use scraper::{ElementRef, Html, Selector};

pub(crate) enum Block<'a> {
    /// `div.reactie` outside any replies group: a top-level reaction.
    Reaction(ElementRef<'a>),
    /// `div.reaksje_datum`: date line carrying the like count.
    Meta(ElementRef<'a>),
    /// `div.geneste-reacties`: group of one-level replies.
    NestedGroup(ElementRef<'a>),
}

pub(crate) struct LinkedReaction<'a> {
    pub container: ElementRef<'a>,
    pub meta: Option<ElementRef<'a>>,
    pub nested_group: Option<ElementRef<'a>>,
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn inside_nested_group(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| has_class(ancestor, "geneste-reacties"))
}

/// Walk every `div` in document order and classify the comment blocks.
/// Reply containers inside a `geneste-reacties` group are not collected as
/// top-level reactions; they are reached through their group.
pub(crate) fn collect_blocks(document: &Html) -> Vec<Block<'_>> {
    let div = Selector::parse("div").unwrap();
    let mut blocks = Vec::new();
    for el in document.select(&div) {
        if has_class(el, "reactie") {
            if !inside_nested_group(el) {
                blocks.push(Block::Reaction(el));
            }
        } else if has_class(el, "reaksje_datum") {
            blocks.push(Block::Meta(el));
        } else if has_class(el, "geneste-reacties") {
            blocks.push(Block::NestedGroup(el));
        }
    }
    blocks
}

/// Assign each reaction the nearest following meta block and replies group.
/// The search runs to the end of the document, not to the next reaction: a
/// reaction without a meta block of its own picks up the next reaction's.
/// That matches the source markup convention exactly and must stay that way.
pub(crate) fn link_reactions<'a>(blocks: &[Block<'a>]) -> Vec<LinkedReaction<'a>> {
    let mut linked = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        let Block::Reaction(container) = block else {
            continue;
        };
        let mut meta = None;
        let mut nested_group = None;
        for later in &blocks[i + 1..] {
            match later {
                Block::Meta(el) if meta.is_none() => meta = Some(*el),
                Block::NestedGroup(el) if nested_group.is_none() => nested_group = Some(*el),
                _ => {}
            }
            if meta.is_some() && nested_group.is_some() {
                break;
            }
        }
        linked.push(LinkedReaction {
            container: *container,
            meta,
            nested_group,
        });
    }
    linked
}

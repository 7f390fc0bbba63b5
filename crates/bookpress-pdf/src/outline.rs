//! Bookmark outline extraction
//!
//! Reads the `/Outlines` tree of a rendered document into a flat,
//! document-ordered list of entries with resolved page indices. The
//! outline is what drives table-of-contents generation, so an entry whose
//! destination cannot be resolved is dropped and counted rather than
//! failing the whole document.

use crate::types::{OutlineEntry, OutlineScan, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, HashSet};

/// Walk the document outline in document order.
///
/// Returns an empty scan for documents without an `/Outlines` entry.
pub fn read_outline(doc: &Document) -> Result<OutlineScan> {
    let mut scan = OutlineScan::default();

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(obj) => resolve_dict(doc, obj),
        Err(_) => return Ok(scan),
    };
    let Some(outlines) = outlines else {
        return Ok(scan);
    };

    // page object id -> zero-based page index
    let page_index: HashMap<ObjectId, usize> = doc
        .get_pages()
        .values()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    let mut visited = HashSet::new();
    if let Ok(first) = outlines.get(b"First") {
        walk_level(doc, first, 0, &page_index, &mut visited, &mut scan)?;
    }

    Ok(scan)
}

/// Walk one sibling chain, recursing into children one depth level down.
fn walk_level(
    doc: &Document,
    first: &Object,
    depth: u32,
    page_index: &HashMap<ObjectId, usize>,
    visited: &mut HashSet<ObjectId>,
    scan: &mut OutlineScan,
) -> Result<()> {
    let mut cursor = Some(first.clone());

    while let Some(obj) = cursor {
        let Ok(item_id) = obj.as_reference() else {
            break;
        };
        // Malformed chains can loop; bail out instead of walking forever.
        if !visited.insert(item_id) {
            break;
        }
        let Ok(item) = doc.get_dictionary(item_id) else {
            break;
        };

        match entry_for(doc, item, depth, page_index) {
            Some(entry) => scan.entries.push(entry),
            None => scan.dropped += 1,
        }

        if let Ok(child) = item.get(b"First") {
            walk_level(doc, child, depth + 1, page_index, visited, scan)?;
        }

        cursor = item.get(b"Next").ok().cloned();
    }

    Ok(())
}

fn entry_for(
    doc: &Document,
    item: &Dictionary,
    depth: u32,
    page_index: &HashMap<ObjectId, usize>,
) -> Option<OutlineEntry> {
    let title = match item.get(b"Title").ok()? {
        Object::String(bytes, _) => decode_text_string(bytes),
        _ => return None,
    };

    let page = destination_page(doc, item, page_index)?;

    Some(OutlineEntry {
        title,
        depth,
        page_index: page,
    })
}

/// Resolve an outline item's destination to a page index.
///
/// Handles direct `/Dest` arrays, referenced destination arrays, and
/// `/A` GoTo actions. Named destinations are not resolved; the entry is
/// reported as dropped.
fn destination_page(
    doc: &Document,
    item: &Dictionary,
    page_index: &HashMap<ObjectId, usize>,
) -> Option<usize> {
    let dest = match item.get(b"Dest") {
        Ok(d) => Some(d.clone()),
        Err(_) => match item.get(b"A") {
            Ok(action) => {
                let action = resolve_dict(doc, action)?;
                let is_goto = matches!(action.get(b"S"), Ok(Object::Name(n)) if n == b"GoTo");
                if !is_goto {
                    return None;
                }
                action.get(b"D").ok().cloned()
            }
            Err(_) => None,
        },
    }?;

    let dest = match dest {
        Object::Reference(id) => doc.get_object(id).ok()?.clone(),
        other => other,
    };

    let arr = dest.as_array().ok()?;
    match arr.first()? {
        Object::Reference(page_id) => page_index.get(page_id).copied(),
        // Some producers write a plain page index instead of a reference.
        Object::Integer(i) if *i >= 0 => Some(*i as usize),
        _ => None,
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Dictionary(d) => Some(d),
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, otherwise treated
/// as Latin-1 (a close-enough stand-in for PDFDocEncoding).
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

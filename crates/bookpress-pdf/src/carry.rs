//! Carrying pages between documents
//!
//! Concatenation and imposition both lift pages out of a source document
//! into a fresh output: merge keeps pages as pages, imposition wraps them
//! as placeable forms. A `DocumentPort` is bound to one source and tracks
//! which of its objects have already crossed, so shared resources land in
//! the output exactly once. Target ids are reserved *before* descending
//! into a referenced object; self-referential structures (annotation
//! back-pointers, link destinations) therefore terminate at the reserved
//! id instead of recursing.

use crate::geometry::media_box;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

pub struct DocumentPort<'a> {
    source: &'a Document,
    carried: HashMap<ObjectId, ObjectId>,
}

impl<'a> DocumentPort<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source,
            carried: HashMap::new(),
        }
    }

    /// Pre-assign an output id to every page of the source, in page order.
    ///
    /// Concatenation calls this before carrying anything: a link
    /// destination pointing at a sibling page then resolves to that
    /// page's reserved copy instead of re-importing the page (and the
    /// page tree hanging off its `Parent`) as an orphan.
    pub fn reserve_pages(&mut self, output: &mut Document) -> Vec<(ObjectId, ObjectId)> {
        let page_ids: Vec<ObjectId> = self.source.get_pages().values().copied().collect();
        page_ids
            .into_iter()
            .map(|page_id| {
                let reserved = output.new_object_id();
                self.carried.insert(page_id, reserved);
                (page_id, reserved)
            })
            .collect()
    }

    /// Carry a reserved page into `output` under a new parent node.
    ///
    /// The page keeps its boxes, rotation, content, and annotations; only
    /// `Parent` is rewritten, since the output grows its own page tree.
    pub fn fill_page(
        &mut self,
        output: &mut Document,
        page_id: ObjectId,
        reserved: ObjectId,
        parent: ObjectId,
    ) -> Result<()> {
        let source = self.source;
        let page = source.get_dictionary(page_id)?;

        let mut copied = Dictionary::new();
        for (key, value) in page.iter() {
            if key == b"Parent" {
                continue;
            }
            copied.set(key.clone(), self.carry(output, value)?);
        }
        copied.set("Parent", Object::Reference(parent));

        output.objects.insert(reserved, Object::Dictionary(copied));
        Ok(())
    }

    /// Wrap a source page as a Form XObject the imposer can place with a
    /// transformation matrix.
    pub fn page_form(&mut self, output: &mut Document, page_id: ObjectId) -> Result<ObjectId> {
        let source = self.source;
        let page = source.get_dictionary(page_id)?;

        let bbox = match page.get(b"MediaBox") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => source.get_object(*id)?.as_array()?.clone(),
            _ => {
                let (x0, y0, x1, y1) = media_box(source, page_id)?;
                vec![
                    Object::Real(x0),
                    Object::Real(y0),
                    Object::Real(x1),
                    Object::Real(y1),
                ]
            }
        };

        let mut form = Dictionary::new();
        form.set("Type", Object::Name(b"XObject".to_vec()));
        form.set("Subtype", Object::Name(b"Form".to_vec()));
        form.set("FormType", Object::Integer(1));
        form.set("BBox", Object::Array(bbox));
        if let Ok(resources) = page.get(b"Resources") {
            form.set("Resources", self.carry(output, resources)?);
        }

        let body = self.page_body(page)?;
        Ok(output.add_object(Stream::new(form, body)))
    }

    /// Source page extent (width, height) in points.
    pub fn page_extent(&self, page_id: ObjectId) -> Result<(f32, f32)> {
        let (x0, y0, x1, y1) = media_box(self.source, page_id)?;
        Ok((x1 - x0, y1 - y0))
    }

    /// Carry one object graph across, reserving target ids ahead of each
    /// descent so cyclic references terminate.
    fn carry(&mut self, output: &mut Document, obj: &Object) -> Result<Object> {
        Ok(match obj {
            Object::Reference(id) => {
                if let Some(&reserved) = self.carried.get(id) {
                    return Ok(Object::Reference(reserved));
                }
                let reserved = output.new_object_id();
                self.carried.insert(*id, reserved);

                let source = self.source;
                let value = self.carry(output, source.get_object(*id)?)?;
                output.objects.insert(reserved, value);
                Object::Reference(reserved)
            }
            Object::Dictionary(dict) => Object::Dictionary(self.carry_dict(output, dict)?),
            Object::Array(items) => {
                let mut carried = Vec::with_capacity(items.len());
                for item in items {
                    carried.push(self.carry(output, item)?);
                }
                Object::Array(carried)
            }
            Object::Stream(stream) => {
                let dict = self.carry_dict(output, &stream.dict)?;
                let mut carried = Stream::new(dict, stream.content.clone());
                carried.allows_compression = stream.allows_compression;
                Object::Stream(carried)
            }
            other => other.clone(),
        })
    }

    fn carry_dict(&mut self, output: &mut Document, dict: &Dictionary) -> Result<Dictionary> {
        let mut carried = Dictionary::new();
        for (key, value) in dict.iter() {
            carried.set(key.clone(), self.carry(output, value)?);
        }
        Ok(carried)
    }

    /// A page's drawing operations as one byte run, split streams joined.
    /// A page without contents yields an empty body and stays blank.
    fn page_body(&self, page: &Dictionary) -> Result<Vec<u8>> {
        let refs: Vec<ObjectId> = match page.get(b"Contents") {
            Ok(Object::Reference(id)) => vec![*id],
            Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => Vec::new(),
        };

        let mut body = Vec::new();
        for id in refs {
            if let Ok(stream) = self.source.get_object(id).and_then(|o| o.as_stream()) {
                let ops = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                body.extend_from_slice(&ops);
                body.push(b'\n');
            }
        }
        Ok(body)
    }
}

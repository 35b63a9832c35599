use crate::{Dictionary, Object, ObjectId};

pub(crate) const PAGES_ID: ObjectId = (1, 0);
pub(crate) const INFO_ID: ObjectId = (2, 0);
pub(crate) const CATALOG_ID: ObjectId = (3, 0);

/// An entry in the document's object table.
///
/// Adding a value to a [`Document`] promotes it to an indirect object: it
/// gains a number (its table index), a generation, and a byte offset that
/// the writer stamps during output.
#[derive(Debug, Clone)]
pub struct IndirectObject {
    pub number: u32,
    pub generation: u16,
    /// Byte position of the `N G obj` header, filled in during write.
    pub offset: usize,
    /// In-use (`n`) or free (`f`) in the cross-reference table.
    pub used: bool,
    pub object: Object,
}

impl IndirectObject {
    /// Whether the object may live inside an object stream. Streams carry
    /// their own payload and stay outside, as does anything free or with a
    /// non-zero generation.
    pub fn compressible(&self) -> bool {
        self.used && self.generation == 0 && !matches!(self.object, Object::Stream(_))
    }
}

/// PDF document under construction.
///
/// A new document owns four objects: the mandatory free zero object, the
/// Pages dictionary (object 1), the Info dictionary (object 2) and the
/// Catalog (object 3). Everything else is added by the caller; object
/// numbers are dense and assigned in insertion order.
pub struct Document {
    /// The object table. An object's number is its index in this table.
    pub objects: Vec<IndirectObject>,
}

impl Document {
    /// Create a new document with the zero object and the Pages, Info and
    /// Catalog dictionaries pre-populated.
    pub fn new() -> Document {
        let mut document = Document { objects: Vec::new() };

        let (zero, _) = document.add_object(Object::bytes(Vec::new()));
        document.objects[zero as usize].generation = 65535;
        document.objects[zero as usize].used = false;

        document.add_object(dictionary! {
            "Type" => "/Pages",
            "Kids" => vec![],
            "Count" => 0,
        });
        document.add_object(Dictionary::new());
        document.add_object(dictionary! {
            "Type" => "/Catalog",
            "Pages" => Object::Reference(PAGES_ID),
        });

        document
    }

    /// Add an object into the document's object table, returning its id.
    pub fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        let number = self.objects.len() as u32;
        self.objects.push(IndirectObject {
            number,
            generation: 0,
            offset: 0,
            used: true,
            object: object.into(),
        });
        (number, 0)
    }

    /// Add a page dictionary: registers the object, bumps the page tree's
    /// `/Count` and appends the page reference to `/Kids`.
    pub fn add_page(&mut self, page: Dictionary) -> ObjectId {
        let id = self.add_object(page);
        let pages = self.pages_mut();
        if let Some(count) = pages.get("Count").and_then(Object::as_i64) {
            pages.set("Count", count + 1);
        }
        if let Some(kids) = pages.get_mut("Kids").and_then(Object::as_array_mut) {
            kids.push(Object::Reference(id));
        }
        id
    }

    /// References to the page objects, in the order they were added.
    pub fn page_references(&self) -> Vec<Object> {
        self.pages()
            .get("Kids")
            .and_then(Object::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Id of the Pages dictionary, for use as a page's `/Parent`.
    pub fn pages_id(&self) -> ObjectId {
        PAGES_ID
    }

    pub fn pages(&self) -> &Dictionary {
        self.dictionary_at(PAGES_ID)
    }

    pub fn pages_mut(&mut self) -> &mut Dictionary {
        self.dictionary_at_mut(PAGES_ID)
    }

    /// The Info dictionary holding document metadata (Author, Title, ...).
    pub fn info(&self) -> &Dictionary {
        self.dictionary_at(INFO_ID)
    }

    pub fn info_mut(&mut self) -> &mut Dictionary {
        self.dictionary_at_mut(INFO_ID)
    }

    pub fn catalog(&self) -> &Dictionary {
        self.dictionary_at(CATALOG_ID)
    }

    pub fn catalog_mut(&mut self) -> &mut Dictionary {
        self.dictionary_at_mut(CATALOG_ID)
    }

    fn dictionary_at(&self, id: ObjectId) -> &Dictionary {
        match &self.objects[id.0 as usize].object {
            Object::Dictionary(dict) => dict,
            _ => unreachable!("table slots 1-3 hold the Pages, Info and Catalog dictionaries"),
        }
    }

    fn dictionary_at_mut(&mut self, id: ObjectId) -> &mut Dictionary {
        match &mut self.objects[id.0 as usize].object {
            Object::Dictionary(dict) => dict,
            _ => unreachable!("table slots 1-3 hold the Pages, Info and Catalog dictionaries"),
        }
    }
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_table() {
        let document = Document::new();
        assert_eq!(document.objects.len(), 4);

        let zero = &document.objects[0];
        assert!(!zero.used);
        assert_eq!(zero.generation, 65535);
        assert_eq!(zero.object, Object::Bytes(Vec::new()));

        assert_eq!(document.pages().get("Type").and_then(Object::as_name), Some("/Pages"));
        assert_eq!(document.pages().get("Count").and_then(Object::as_i64), Some(0));
        assert_eq!(document.pages().get("Kids"), Some(&Object::Array(Vec::new())));
        assert!(document.info().is_empty());
        assert_eq!(
            document.catalog().get("Pages"),
            Some(&Object::Reference((1, 0)))
        );
    }

    #[test]
    fn object_numbers_are_dense() {
        let mut document = Document::new();
        assert_eq!(document.add_object(true), (4, 0));
        assert_eq!(document.add_object(7), (5, 0));
        for (index, entry) in document.objects.iter().enumerate() {
            assert_eq!(entry.number as usize, index);
        }
    }

    #[test]
    fn add_page_updates_the_page_tree() {
        let mut document = Document::new();
        let first = document.add_page(dictionary! { "Type" => "/Page" });
        let second = document.add_page(dictionary! { "Type" => "/Page" });

        assert_eq!(document.pages().get("Count").and_then(Object::as_i64), Some(2));
        assert_eq!(
            document.page_references(),
            vec![Object::Reference(first), Object::Reference(second)]
        );
    }

    #[test]
    fn streams_are_never_compressible() {
        let mut document = Document::new();
        let id = document.add_object(crate::Stream::new(dictionary! {}, Vec::new()));
        assert!(!document.objects[id.0 as usize].compressible());
        assert!(document.objects[1].compressible());
        assert!(!document.objects[0].compressible());
    }
}

//! Certificate PDFs assembled directly with lopdf: A4 pages, Helvetica
//! text, rules and tick/cross marks drawn with path operators.

mod certificates;

pub use certificates::{assessment_record_pdf, session_log_pdf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to assemble PDF document: {0}")]
    Build(#[from] lopdf::Error),
    #[error("Failed to serialize PDF document: {0}")]
    Io(#[from] std::io::Error),
}

const A4_WIDTH_PT: f32 = 595.28;
const A4_HEIGHT_PT: f32 = 841.89;

pub(crate) fn mm(value: f32) -> f32 {
    value * 72.0 / 25.4
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub(crate) const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    fn resource_name(self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"F1",
            FontStyle::Bold => b"F2",
        }
    }
}

struct PlacedImage {
    stream: Stream,
    x_pt: f32,
    y_pt: f32,
    width_pt: f32,
    height_pt: f32,
}

#[derive(Default)]
struct Page {
    ops: Vec<Operation>,
    images: Vec<PlacedImage>,
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// Multi-page A4 document under construction. Coordinates given in mm from
/// the top-left corner, matching how the layouts are specified; conversion
/// to PDF space happens here.
pub(crate) struct CertificateDoc {
    pages: Vec<Page>,
}

impl CertificateDoc {
    pub(crate) fn new() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }

    pub(crate) fn new_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn current(&mut self) -> &mut Page {
        self.pages.last_mut().expect("document always has a page")
    }

    pub(crate) fn text(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
        text: &str,
    ) {
        let x = mm(x_mm);
        let y = A4_HEIGHT_PT - mm(y_mm);
        let ops = &mut self.current().ops;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(style.resource_name().to_vec()), real(size)],
        ));
        ops.push(Operation::new(
            "rg",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        ops.push(Operation::new("Td", vec![real(x), real(y)]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Rough Helvetica width estimate, good enough for centring footers.
    fn text_width_pt(text: &str, size: f32) -> f32 {
        text.len() as f32 * size * 0.5
    }

    pub(crate) fn text_centered(
        &mut self,
        y_mm: f32,
        size: f32,
        style: FontStyle,
        color: Rgb,
        text: &str,
    ) {
        let x_pt = (A4_WIDTH_PT - Self::text_width_pt(text, size)) / 2.0;
        let x_mm = x_pt * 25.4 / 72.0;
        self.text(x_mm, y_mm, size, style, color, text);
    }

    pub(crate) fn fill_rect(&mut self, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32, color: Rgb) {
        let x = mm(x_mm);
        let y = A4_HEIGHT_PT - mm(y_mm + h_mm);
        let ops = &mut self.current().ops;
        ops.push(Operation::new(
            "rg",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(mm(w_mm)), real(mm(h_mm))],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    pub(crate) fn line(
        &mut self,
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
        width_mm: f32,
        color: Rgb,
    ) {
        let ops = &mut self.current().ops;
        ops.push(Operation::new(
            "RG",
            vec![real(color.0), real(color.1), real(color.2)],
        ));
        ops.push(Operation::new("w", vec![real(mm(width_mm))]));
        ops.push(Operation::new(
            "m",
            vec![real(mm(x1_mm)), real(A4_HEIGHT_PT - mm(y1_mm))],
        ));
        ops.push(Operation::new(
            "l",
            vec![real(mm(x2_mm)), real(A4_HEIGHT_PT - mm(y2_mm))],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    /// Embed an image (PNG/JPEG bytes) at the given box. Fails when the
    /// bytes cannot be decoded; callers fall back to a text placeholder.
    pub(crate) fn image(
        &mut self,
        bytes: Vec<u8>,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
    ) -> Result<(), PdfError> {
        let stream = lopdf::xobject::image_from(bytes)?;
        self.current().images.push(PlacedImage {
            stream,
            x_pt: mm(x_mm),
            y_pt: A4_HEIGHT_PT - mm(y_mm + h_mm),
            width_pt: mm(w_mm),
            height_pt: mm(h_mm),
        });
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<Vec<u8>, PdfError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });

        let page_count = self.pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(page_count);

        for page in self.pages {
            let mut ops = page.ops;
            let mut xobjects = Dictionary::new();
            for (index, image) in page.images.into_iter().enumerate() {
                let name = format!("Im{}", index);
                let image_id = doc.add_object(image.stream);
                xobjects.set(name.clone(), Object::Reference(image_id));
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        real(image.width_pt),
                        real(0.0),
                        real(0.0),
                        real(image.height_pt),
                        real(image.x_pt),
                        real(image.y_pt),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
                ops.push(Operation::new("Q", vec![]));
            }

            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let mut resources = dictionary! {
                "Font" => dictionary! {
                    "F1" => Object::Reference(font_regular),
                    "F2" => Object::Reference(font_bold),
                },
            };
            if !xobjects.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![real(0.0), real(0.0), real(A4_WIDTH_PT), real(A4_HEIGHT_PT)],
                "Contents" => Object::Reference(content_id),
                "Resources" => Object::Dictionary(resources),
            });
            kids.push(Object::Reference(page_id));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

//! House PDF rasterization (spec §4.2, §4.3): the House fetcher hands the
//! Transformer raw PDF bytes; this renders each page to a PNG and base64
//! encodes it for the multimodal House-PDF prompt.

use crate::llm_provider::ImagePage;
use base64::Engine;
use pdfium_render::prelude::*;

const RENDER_WIDTH_PX: i32 = 1600;

pub fn rasterize_pdf(pdf_bytes: &[u8]) -> Result<Vec<ImagePage>, String> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| format!("failed to bind pdfium library: {e}"))?,
    );

    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| format!("failed to load PDF: {e}"))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(RENDER_WIDTH_PX)
        .set_maximum_height(RENDER_WIDTH_PX * 2);

    let mut pages = Vec::new();
    for (index, page) in document.pages().iter().enumerate() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| format!("failed to render page {index}: {e}"))?;
        let image = bitmap.as_image();

        let mut png_bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .map_err(|e| format!("failed to encode page {index} as PNG: {e}"))?;

        pages.push(ImagePage {
            page_number: index as u32 + 1,
            base64_png: base64::engine::general_purpose::STANDARD.encode(&png_bytes),
        });
    }

    Ok(pages)
}
